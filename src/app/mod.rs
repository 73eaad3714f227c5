// Application wiring: shared state handed to the HTTP layer.

use crate::adapters::storage::open_store;
use crate::config::AppConfig;
use crate::core::analytics::AnalyticsService;
use crate::core::query::QueryBuilder;
use crate::core::reseed::DatasetSeeder;
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use std::sync::Arc;

pub struct AppState {
    pub analytics: AnalyticsService,
    pub seeder: DatasetSeeder,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> Result<Self> {
        let queries = QueryBuilder::new(config.anchor_window()?);

        Ok(Self {
            analytics: AnalyticsService::new(Arc::clone(&store), queries, config.sub_call_timeout),
            seeder: DatasetSeeder::new(store, config.dataset_url.clone()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = open_store(&config.database_url)?;
        Self::new(store, config)
    }
}
