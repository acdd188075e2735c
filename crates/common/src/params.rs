//! Query-parameter cleaning and serialization
//!
//! List endpoints take optional filters, and the UI happily passes empty
//! ones along. These helpers strip empty values from a parameter tree
//! before serialization so URLs stay free of noise, then serialize arrays
//! in repeated-key format (`type=A&type=B`), which is what the backend's
//! query parser expects.
//!
//! Cleaning operates on [`serde_json::Value`] so it stays type-safe over an
//! arbitrary parameter shape: any `Serialize` filter struct can be run
//! through `serde_json::to_value` first.

use serde_json::{Map, Value};

/// Whether a value counts as "empty" for cleaning purposes.
///
/// Empty means: null, an empty or whitespace-only string, an empty array,
/// or an empty object. Numbers and booleans are never empty (including `0`
/// and `false`).
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively remove empty entries from a parameter object.
///
/// Recurses into nested objects but not into arrays; a nested object that
/// becomes empty after cleaning is dropped as well. Non-object inputs are
/// returned unchanged. The function is pure and idempotent:
/// `clean_params(&clean_params(x)) == clean_params(x)`.
#[must_use]
pub fn clean_params(params: &Value) -> Value {
    let Value::Object(map) = params else {
        return params.clone();
    };

    let mut result = Map::new();
    for (key, value) in map {
        if is_empty_value(value) {
            continue;
        }

        match value {
            Value::Object(_) => {
                let nested = clean_params(value);
                if !is_empty_value(&nested) {
                    result.insert(key.clone(), nested);
                }
            }
            other => {
                result.insert(key.clone(), other.clone());
            }
        }
    }

    Value::Object(result)
}

/// Serialize a cleaned parameter object as a query string.
///
/// Arrays use repeated-key format (`type=A&type=B`, never `type[]=A`);
/// nested objects use bracket notation (`range[from]=x`). Keys and values
/// are percent-encoded. Returns an empty string for an empty object.
#[must_use]
pub fn to_query_string(params: &Value) -> String {
    let cleaned = clean_params(params);
    let Value::Object(map) = &cleaned else {
        return String::new();
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        push_pairs(&mut pairs, key, value);
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                pairs.push(encode_pair(key, item));
            }
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                push_pairs(pairs, &format!("{key}[{sub_key}]"), sub_value);
            }
        }
        other => pairs.push(encode_pair(key, other)),
    }
}

fn encode_pair(key: &str, value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(&text))
}

#[cfg(test)]
mod tests {
    //! Unit tests for parameter cleaning and query serialization.
    use serde_json::json;

    use super::*;

    #[test]
    fn removes_empty_values_at_every_depth() {
        let params = json!({
            "search": "  ",
            "page": 1,
            "type": [],
            "filters": {
                "chain": null,
                "status": "pending",
                "range": {}
            },
            "empty": {}
        });

        let cleaned = clean_params(&params);

        assert_eq!(
            cleaned,
            json!({
                "page": 1,
                "filters": { "status": "pending" }
            })
        );
    }

    #[test]
    fn cleaning_is_idempotent() {
        let params = json!({
            "a": "",
            "b": ["x", "y"],
            "c": { "d": null, "e": 5 },
            "f": 0,
            "g": false
        });

        let once = clean_params(&params);
        let twice = clean_params(&once);

        assert_eq!(once, twice);
        assert_eq!(once, json!({ "b": ["x", "y"], "c": { "e": 5 }, "f": 0, "g": false }));
    }

    #[test]
    fn zero_and_false_are_not_empty() {
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("   ")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
    }

    #[test]
    fn drops_nested_object_that_cleans_to_empty() {
        let params = json!({ "outer": { "inner": { "value": "" } } });
        assert_eq!(clean_params(&params), json!({}));
    }

    #[test]
    fn arrays_are_kept_without_recursion() {
        // Cleaning does not descend into arrays; their elements survive as-is.
        let params = json!({ "type": ["", "MINT"] });
        assert_eq!(clean_params(&params), json!({ "type": ["", "MINT"] }));
    }

    #[test]
    fn serializes_arrays_with_repeated_keys() {
        let params = json!({ "type": ["PAYMENT", "PAYOUT"], "page": 2 });
        let query = to_query_string(&params);

        assert_eq!(query, "page=2&type=PAYMENT&type=PAYOUT");
        assert!(!query.contains("%5B%5D"), "bracket array notation must not appear");
    }

    #[test]
    fn serializes_nested_objects_with_bracket_keys() {
        let params = json!({ "range": { "from": "2024-01-01", "to": "2024-02-01" } });
        let query = to_query_string(&params);

        assert_eq!(query, "range%5Bfrom%5D=2024-01-01&range%5Bto%5D=2024-02-01");
    }

    #[test]
    fn percent_encodes_values() {
        let params = json!({ "search": "mint & burn" });
        assert_eq!(to_query_string(&params), "search=mint%20%26%20burn");
    }

    #[test]
    fn empty_object_serializes_to_empty_string() {
        assert_eq!(to_query_string(&json!({})), "");
        assert_eq!(to_query_string(&json!({ "search": "" })), "");
    }
}
