//! Query-string parsing into validated request values.

use crate::core::analytics::{TransactionsQuery, DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::domain::query::Month;
use crate::utils::error::{DashboardError, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use serde::Deserialize;

/// Raw `month` parameter, kept as text so validation errors stay ours.
#[derive(Debug, Default, Deserialize)]
pub struct RawMonthParams {
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionsParams {
    pub month: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

pub type Extracted<T> = std::result::Result<Query<T>, QueryRejection>;

pub fn month_request(extracted: Extracted<RawMonthParams>) -> Result<Month> {
    let Query(raw) = extracted.map_err(rejected)?;
    parse_month(raw.month.as_deref())
}

pub fn transactions_request(extracted: Extracted<RawTransactionsParams>) -> Result<TransactionsQuery> {
    let Query(raw) = extracted.map_err(rejected)?;
    TransactionsQuery::try_from(raw)
}

impl TryFrom<RawTransactionsParams> for TransactionsQuery {
    type Error = DashboardError;

    fn try_from(raw: RawTransactionsParams) -> Result<Self> {
        Ok(Self {
            month: parse_month(raw.month.as_deref())?,
            search: raw.search.filter(|s| !s.is_empty()),
            page: parse_at_least_one("page", raw.page.as_deref(), DEFAULT_PAGE)?,
            per_page: parse_at_least_one("perPage", raw.per_page.as_deref(), DEFAULT_PER_PAGE)?,
        })
    }
}

pub fn parse_month(raw: Option<&str>) -> Result<Month> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DashboardError::invalid_parameter("month", "", "Parameter is required"))?;

    let number: u32 = text
        .parse()
        .map_err(|_| DashboardError::invalid_parameter("month", text, "Expected an integer between 1 and 12"))?;

    Month::new(number)
}

fn parse_at_least_one(field: &str, raw: Option<&str>, default: u64) -> Result<u64> {
    let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match text.parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(DashboardError::invalid_parameter(
            field,
            text,
            "Expected a positive integer",
        )),
    }
}

fn rejected(rejection: QueryRejection) -> DashboardError {
    DashboardError::invalid_parameter("query", "", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(month: Option<&str>, search: Option<&str>, page: Option<&str>, per_page: Option<&str>) -> RawTransactionsParams {
        RawTransactionsParams {
            month: month.map(String::from),
            search: search.map(String::from),
            page: page.map(String::from),
            per_page: per_page.map(String::from),
        }
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(Some("3")).unwrap().number(), 3);
        assert_eq!(parse_month(Some(" 12 ")).unwrap().number(), 12);

        for bad in [None, Some(""), Some("0"), Some("13"), Some("march"), Some("-1"), Some("6.5")] {
            let err = parse_month(bad).unwrap_err();
            assert!(matches!(err, DashboardError::InvalidParameter { .. }), "{:?}", bad);
        }
    }

    #[test]
    fn test_transactions_defaults() {
        let query = TransactionsQuery::try_from(raw(Some("6"), None, None, None)).unwrap();
        assert_eq!(query.month.number(), 6);
        assert_eq!(query.search, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.skip(), 0);
    }

    #[test]
    fn test_transactions_explicit_values() {
        let query =
            TransactionsQuery::try_from(raw(Some("6"), Some("backpack"), Some("3"), Some("5"))).unwrap();
        assert_eq!(query.search.as_deref(), Some("backpack"));
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 5);
        assert_eq!(query.skip(), 10);
    }

    #[test]
    fn test_transactions_rejects_non_positive_paging() {
        assert!(TransactionsQuery::try_from(raw(Some("6"), None, Some("0"), None)).is_err());
        assert!(TransactionsQuery::try_from(raw(Some("6"), None, None, Some("0"))).is_err());
        assert!(TransactionsQuery::try_from(raw(Some("6"), None, Some("two"), None)).is_err());
        assert!(TransactionsQuery::try_from(raw(None, None, None, None)).is_err());
    }

    #[test]
    fn test_empty_search_is_absent() {
        let query = TransactionsQuery::try_from(raw(Some("6"), Some(""), None, None)).unwrap();
        assert_eq!(query.search, None);
    }
}
