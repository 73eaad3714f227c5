pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::ports::RecordStore;
use crate::utils::error::{DashboardError, Result};
use std::sync::Arc;

/// 依連線字串建立記錄存儲
///
/// 支援 `sqlite://<path>`、`sqlite::memory:` 與 `memory://`。
pub fn open_store(database_url: &str) -> Result<Arc<dyn RecordStore>> {
    if database_url == "sqlite::memory:" {
        tracing::debug!("Opening in-memory SQLite record store");
        return Ok(Arc::new(SqliteStore::open_in_memory()?));
    }

    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if path.is_empty() {
            return Err(DashboardError::InvalidConfigValueError {
                field: "database_url".to_string(),
                value: database_url.to_string(),
                reason: "SQLite path cannot be empty".to_string(),
            });
        }
        tracing::debug!("Opening SQLite record store at {}", path);
        return Ok(Arc::new(SqliteStore::open(path)?));
    }

    if database_url == "memory://" {
        tracing::warn!("Using process-local memory store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    Err(DashboardError::InvalidConfigValueError {
        field: "database_url".to_string(),
        value: database_url.to_string(),
        reason: "Supported schemes: sqlite://<path>, sqlite::memory:, memory://".to_string(),
    })
}
