use crate::domain::model::{CategoryCount, SaleRecord, SaleStatistics};
use crate::domain::query::SaleFilter;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 銷售記錄存儲：查詢只讀，寫入僅限重新初始化
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self, filter: &SaleFilter) -> Result<u64>;

    /// Matching records in insertion order.
    async fn find(&self, filter: &SaleFilter, skip: u64, limit: u64) -> Result<Vec<SaleRecord>>;

    /// `None` when nothing matches.
    async fn statistics(&self, filter: &SaleFilter) -> Result<Option<SaleStatistics>>;

    async fn count_by_category(&self, filter: &SaleFilter) -> Result<Vec<CategoryCount>>;

    async fn delete_all(&self) -> Result<u64>;

    async fn insert_many(&self, records: Vec<SaleRecord>) -> Result<usize>;
}
