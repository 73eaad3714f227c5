pub mod analytics;
pub mod month_range;
pub mod query;
pub mod reseed;

pub use crate::domain::model::{
    BarChartEntry, CategoryCount, CombinedData, SaleRecord, SaleStatistics, TransactionsPage,
};
pub use crate::domain::ports::RecordStore;
pub use crate::domain::query::{DateRange, Month, SaleFilter};
pub use crate::utils::error::Result;
