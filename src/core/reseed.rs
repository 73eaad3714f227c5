use crate::domain::model::SaleRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::{DashboardError, Result};
use reqwest::Client;
use std::sync::Arc;

pub const DEFAULT_DATASET_URL: &str =
    "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// Replaces the record store contents with the remote dataset.
///
/// The fetch and decode both complete before anything is deleted. Deletion
/// and insertion are separate steps: if the insert fails the store is left
/// empty.
pub struct DatasetSeeder {
    store: Arc<dyn RecordStore>,
    dataset_url: String,
    client: Client,
}

impl DatasetSeeder {
    pub fn new(store: Arc<dyn RecordStore>, dataset_url: impl Into<String>) -> Self {
        Self {
            store,
            dataset_url: dataset_url.into(),
            client: Client::new(),
        }
    }

    pub fn dataset_url(&self) -> &str {
        &self.dataset_url
    }

    pub async fn fetch(&self) -> Result<Vec<SaleRecord>> {
        tracing::debug!("Fetching dataset from: {}", self.dataset_url);
        let response = self.client.get(&self.dataset_url).send().await?;

        let status = response.status();
        tracing::debug!("Dataset response status: {}", status);
        if !status.is_success() {
            return Err(DashboardError::DatasetError {
                message: format!("Dataset source responded with {}", status),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<SaleRecord> = serde_json::from_slice(&body)?;
        Ok(records)
    }

    /// Returns the number of inserted records.
    pub async fn seed(&self) -> Result<usize> {
        let records = self.fetch().await?;
        tracing::info!("📥 Fetched {} sale records", records.len());

        let removed = self.store.delete_all().await?;
        tracing::debug!("Deleted {} existing records", removed);

        let inserted = self.store.insert_many(records).await?;
        tracing::info!("✅ Database initialized with {} records", inserted);
        Ok(inserted)
    }
}
