use crate::adapters::http::params::{
    month_request, transactions_request, Extracted, RawMonthParams, RawTransactionsParams,
};
use crate::app::AppState;
use crate::domain::model::{
    BarChartEntry, CategoryCount, CombinedData, SaleStatistics, TransactionsPage,
};
use crate::utils::error::{DashboardError, ErrorKind};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Transactions,
    Statistics,
    BarChart,
    PieChart,
    CombinedData,
    InitializeDb,
}

impl Endpoint {
    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Transactions => "Error fetching transactions",
            Endpoint::Statistics => "Error fetching statistics",
            Endpoint::BarChart => "Error fetching bar chart data",
            Endpoint::PieChart => "Error fetching pie chart data",
            Endpoint::CombinedData => "Error fetching combined data",
            Endpoint::InitializeDb => "Error initializing database",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// 端點失敗：回應固定訊息，詳細錯誤只寫入日誌
#[derive(Debug)]
pub struct ApiFailure {
    endpoint: Endpoint,
    error: DashboardError,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self.error.kind() {
            ErrorKind::InvalidParameter => {
                tracing::warn!("⚠️ {:?} rejected request: {}", self.endpoint, self.error)
            }
            kind => tracing::error!(
                "❌ {:?} failed: {} (Kind: {:?})",
                self.endpoint,
                self.error,
                kind
            ),
        }

        let body = ErrorBody {
            error: self.endpoint.failure_message(),
        };
        (self.error.status_code(), Json(body)).into_response()
    }
}

trait OrFail<T> {
    fn or_fail(self, endpoint: Endpoint) -> Result<T, ApiFailure>;
}

impl<T> OrFail<T> for crate::utils::error::Result<T> {
    fn or_fail(self, endpoint: Endpoint) -> Result<T, ApiFailure> {
        self.map_err(|error| ApiFailure { endpoint, error })
    }
}

type ApiResult<T> = Result<Json<T>, ApiFailure>;

pub async fn transactions(
    State(state): State<Arc<AppState>>,
    params: Extracted<RawTransactionsParams>,
) -> ApiResult<TransactionsPage> {
    let query = transactions_request(params).or_fail(Endpoint::Transactions)?;
    let page = state
        .analytics
        .transactions(&query)
        .await
        .or_fail(Endpoint::Transactions)?;
    Ok(Json(page))
}

pub async fn statistics(
    State(state): State<Arc<AppState>>,
    params: Extracted<RawMonthParams>,
) -> ApiResult<SaleStatistics> {
    let month = month_request(params).or_fail(Endpoint::Statistics)?;
    let stats = state
        .analytics
        .statistics(month)
        .await
        .or_fail(Endpoint::Statistics)?;
    Ok(Json(stats))
}

pub async fn bar_chart(
    State(state): State<Arc<AppState>>,
    params: Extracted<RawMonthParams>,
) -> ApiResult<Vec<BarChartEntry>> {
    let month = month_request(params).or_fail(Endpoint::BarChart)?;
    let bars = state
        .analytics
        .bar_chart(month)
        .await
        .or_fail(Endpoint::BarChart)?;
    Ok(Json(bars))
}

pub async fn pie_chart(
    State(state): State<Arc<AppState>>,
    params: Extracted<RawMonthParams>,
) -> ApiResult<Vec<CategoryCount>> {
    let month = month_request(params).or_fail(Endpoint::PieChart)?;
    let slices = state
        .analytics
        .pie_chart(month)
        .await
        .or_fail(Endpoint::PieChart)?;
    Ok(Json(slices))
}

pub async fn combined_data(
    State(state): State<Arc<AppState>>,
    params: Extracted<RawMonthParams>,
) -> ApiResult<CombinedData> {
    let month = month_request(params).or_fail(Endpoint::CombinedData)?;
    let combined = state
        .analytics
        .combined(month)
        .await
        .or_fail(Endpoint::CombinedData)?;
    Ok(Json(combined))
}

pub async fn initialize_db(State(state): State<Arc<AppState>>) -> ApiResult<MessageBody> {
    state.seeder.seed().await.or_fail(Endpoint::InitializeDb)?;
    Ok(Json(MessageBody {
        message: "Database initialized successfully",
    }))
}
