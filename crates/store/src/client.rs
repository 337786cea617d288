use async_trait::async_trait;
use retrobot_core::config::StoreConfig;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::records::{ItemFields, ItemRecord, RecordPage, ReviewPatch};

pub const ITEMS_TABLE: &str = "Items";
pub const CURRENT_VIEW: &str = "Current View";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed during {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("record store returned {status} during {operation}")]
    UnexpectedStatus { operation: &'static str, status: reqwest::StatusCode },
    #[error("record store response could not be decoded during {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Access seam to the remote tabular-data service. One implementation talks
/// HTTP; tests script their own.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read all records of `table` through `view`, optionally narrowed by a
    /// filter formula.
    async fn list(
        &self,
        table: &str,
        view: &str,
        filter: Option<&str>,
    ) -> Result<Vec<ItemRecord>, StoreError>;

    /// Create a record. `Ok(None)` means the store answered without handing
    /// back a record, which callers treat as a write failure.
    async fn create(
        &self,
        table: &str,
        fields: ItemFields,
    ) -> Result<Option<ItemRecord>, StoreError>;

    /// Patch a single record by id.
    async fn update(
        &self,
        table: &str,
        record_id: &str,
        patch: ReviewPatch,
    ) -> Result<ItemRecord, StoreError>;
}

/// Existence-check formula for the duplicate guard: exact match on category
/// and normalized object text.
pub fn category_and_object_filter(category: &str, object: &str) -> String {
    format!(r#"AND(Category = "{category}", Object = "{}")"#, escape_formula_text(object))
}

fn escape_formula_text(value: &str) -> String {
    value.replace('"', "\\\"")
}

pub struct HttpRecordStore {
    client: reqwest::Client,
    api_base_url: String,
    base_id: String,
    api_key: SecretString,
}

impl HttpRecordStore {
    pub fn new(client: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            base_id: config.base_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.api_base_url, self.base_id, table)
    }

    fn record_url(&self, table: &str, record_id: &str) -> String {
        format!("{}/{}", self.table_url(table), record_id)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list(
        &self,
        table: &str,
        view: &str,
        filter: Option<&str>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut query: Vec<(&str, &str)> = vec![("view", view)];
        if let Some(formula) = filter {
            query.push(("filterByFormula", formula));
        }

        let response = self
            .client
            .get(self.table_url(table))
            .bearer_auth(self.api_key.expose_secret())
            .query(&query)
            .send()
            .await
            .map_err(|source| StoreError::Request { operation: "list", source })?;

        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus { operation: "list", status: response.status() });
        }

        let page: RecordPage = response
            .json()
            .await
            .map_err(|source| StoreError::Decode { operation: "list", source })?;
        debug!(
            event_name = "store.list.completed",
            table,
            view,
            record_count = page.records.len(),
            "record store read completed"
        );
        Ok(page.records)
    }

    async fn create(
        &self,
        table: &str,
        fields: ItemFields,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|source| StoreError::Request { operation: "create", source })?;

        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus {
                operation: "create",
                status: response.status(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|source| StoreError::Decode { operation: "create", source })?;
        Ok(serde_json::from_value::<ItemRecord>(body).ok())
    }

    async fn update(
        &self,
        table: &str,
        record_id: &str,
        patch: ReviewPatch,
    ) -> Result<ItemRecord, StoreError> {
        let response = self
            .client
            .patch(self.record_url(table, record_id))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "fields": patch }))
            .send()
            .await
            .map_err(|source| StoreError::Request { operation: "update", source })?;

        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus {
                operation: "update",
                status: response.status(),
            });
        }

        response.json().await.map_err(|source| StoreError::Decode { operation: "update", source })
    }
}
