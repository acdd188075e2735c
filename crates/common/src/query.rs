//! Common list-query parameters shared by paginated endpoints.

use serde::{Deserialize, Serialize};

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters accepted by every paginated list endpoint.
///
/// All fields are optional; empty ones are stripped by the parameter
/// cleaner before serialization, so a default `ListQuery` produces an
/// empty query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<SortOrder>,

    /// Comma-separated projection of fields to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for list-query serialization.
    use super::*;
    use crate::params::to_query_string;

    #[test]
    fn default_query_serializes_to_nothing() {
        let value = serde_json::to_value(ListQuery::default()).unwrap();
        assert_eq!(to_query_string(&value), "");
    }

    #[test]
    fn populated_query_uses_camel_case_keys() {
        let query = ListQuery {
            page: Some(1),
            page_size: Some(50),
            sort_by: Some("createdAt".to_string()),
            order_by: Some(SortOrder::Desc),
            fields: None,
            search: Some("usdc".to_string()),
        };

        let value = serde_json::to_value(query).unwrap();
        let serialized = to_query_string(&value);

        assert!(serialized.contains("pageSize=50"));
        assert!(serialized.contains("orderBy=desc"));
        assert!(serialized.contains("sortBy=createdAt"));
        assert!(serialized.contains("search=usdc"));
    }
}
