use crate::core::query::QueryBuilder;
use crate::domain::model::{
    BarChartEntry, CategoryCount, CombinedData, SaleStatistics, TransactionsPage,
};
use crate::domain::ports::RecordStore;
use crate::domain::query::Month;
use crate::utils::error::{DashboardError, Result};
use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Validated transactions listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsQuery {
    pub month: Month,
    pub search: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

impl TransactionsQuery {
    pub fn first_page(month: Month) -> Self {
        Self {
            month,
            search: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// 儀表板查詢邏輯，HTTP 處理器與合併端點共用
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn RecordStore>,
    queries: QueryBuilder,
    sub_call_timeout: Duration,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn RecordStore>, queries: QueryBuilder, sub_call_timeout: Duration) -> Self {
        Self {
            store,
            queries,
            sub_call_timeout,
        }
    }

    pub async fn transactions(&self, query: &TransactionsQuery) -> Result<TransactionsPage> {
        let filter = self
            .queries
            .build_transaction_filter(query.month, query.search.as_deref())?;

        let total = self.store.count(&filter).await?;
        let products = self.store.find(&filter, query.skip(), query.per_page).await?;

        tracing::debug!(
            "Transactions month={} page={} matched {} records",
            query.month,
            query.page,
            total
        );

        Ok(TransactionsPage {
            total,
            page: query.page,
            per_page: query.per_page,
            products,
        })
    }

    /// Zero-valued when nothing matches.
    pub async fn statistics(&self, month: Month) -> Result<SaleStatistics> {
        let pipeline = self.queries.build_statistics_pipeline(month)?;
        let stats = self.store.statistics(&pipeline.filter).await?;
        Ok(stats.unwrap_or_default())
    }

    /// One entry per price bucket, in bucket order.
    pub async fn bar_chart(&self, month: Month) -> Result<Vec<BarChartEntry>> {
        let pipeline = self.queries.build_bar_chart_pipeline(month)?;

        let counts = pipeline.buckets.into_iter().map(|bucket| async move {
            let count = self.store.count(&bucket.filter).await?;
            Ok::<_, DashboardError>(BarChartEntry {
                range: bucket.label,
                count,
            })
        });

        try_join_all(counts).await
    }

    pub async fn pie_chart(&self, month: Month) -> Result<Vec<CategoryCount>> {
        let pipeline = self.queries.build_pie_chart_pipeline(month)?;
        self.store.count_by_category(&pipeline.filter).await
    }

    /// Runs the four dashboard queries concurrently; any failure or timeout
    /// fails the whole call.
    pub async fn combined(&self, month: Month) -> Result<CombinedData> {
        let listing = TransactionsQuery::first_page(month);

        let (transactions, statistics, bar_chart_data, pie_chart_data) = tokio::try_join!(
            self.bounded("transactions", self.transactions(&listing)),
            self.bounded("statistics", self.statistics(month)),
            self.bounded("bar-chart", self.bar_chart(month)),
            self.bounded("pie-chart", self.pie_chart(month)),
        )?;

        Ok(CombinedData {
            transactions,
            statistics,
            bar_chart_data,
            pie_chart_data,
        })
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.sub_call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "⏱️ Sub-call {} exceeded {:?}",
                    operation,
                    self.sub_call_timeout
                );
                Err(DashboardError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms: self.sub_call_timeout.as_millis() as u64,
                })
            }
        }
    }
}
