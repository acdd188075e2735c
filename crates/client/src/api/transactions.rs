//! On-chain transaction endpoints.

use std::sync::Arc;

use mintgate_common::envelope::Paginated;
use mintgate_common::query::ListQuery;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ClientError;

mod keys {
    pub const TRANSACTIONS: &str = "/transactions";
}

/// A settled or in-flight on-chain transaction as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    /// Decimal string; amounts are never floats on the wire.
    pub amount: String,
    pub chain: String,
    pub crypto: String,
    pub network: String,
    pub status: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub block_timestamp: Option<String>,
    #[serde(default)]
    pub confirmations: Option<u32>,
    #[serde(default)]
    pub confirmed_at: Option<String>,
    #[serde(default)]
    pub first_seen_at: Option<String>,
    #[serde(default)]
    pub related_id: Option<u64>,
    #[serde(default)]
    pub related_type: Option<String>,
    #[serde(default)]
    pub smart_contract: Option<String>,
}

/// Filters for the transaction list endpoint.
///
/// Multi-valued filters serialize in repeated-key format
/// (`type=PAYMENT&type=PAYOUT`); empty ones are stripped before the URL is
/// built, so a default query fetches the unfiltered first page.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    #[serde(flatten)]
    pub list: ListQuery,

    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub tx_type: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crypto: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

/// Transaction endpoints.
pub struct TransactionsApi {
    client: Arc<ApiClient>,
}

impl TransactionsApi {
    /// Create a new transactions surface over the given client.
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List transactions matching the given filters.
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        query: &TransactionListQuery,
    ) -> Result<Paginated<Vec<Transaction>>, ClientError> {
        let options = RequestOptions::query(query)?;
        self.client.get_with(keys::TRANSACTIONS, options).await
    }

    /// Fetch one transaction by id.
    pub async fn detail(&self, id: u64) -> Result<Transaction, ClientError> {
        self.client.get(&format!("{}/{id}", keys::TRANSACTIONS)).await
    }
}
