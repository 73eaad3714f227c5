pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::{router, serve};
pub use crate::adapters::storage::{open_store, MemoryStore, SqliteStore};
pub use crate::app::AppState;
pub use crate::config::{AppConfig, CliConfig};
pub use crate::core::{analytics::AnalyticsService, query::QueryBuilder, reseed::DatasetSeeder};
pub use crate::utils::error::{DashboardError, Result};
