//! Month-range resolution.
//!
//! A month resolves to a wide span: the first day of the month in the start
//! anchor year through the last day of the same month in the end anchor
//! year. Exact month matching is done separately by the filter's month
//! predicate; this range only rejects records outside the anchor years.

use crate::domain::query::{DateRange, Month};
use crate::utils::error::{DashboardError, Result};
use chrono::{DateTime, Months, NaiveDate, Utc};

pub const DEFAULT_START_YEAR: i32 = 2020;
pub const DEFAULT_END_YEAR: i32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorWindow {
    start_year: i32,
    end_year: i32,
}

impl Default for AnchorWindow {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }
}

impl AnchorWindow {
    pub fn new(start_year: i32, end_year: i32) -> Result<Self> {
        if start_year > end_year {
            return Err(DashboardError::InvalidConfigValueError {
                field: "analytics.anchor_start_year".to_string(),
                value: start_year.to_string(),
                reason: format!("Start year must not be after end year {}", end_year),
            });
        }

        let window = Self {
            start_year,
            end_year,
        };
        // 提前確認每個月份都能解析，之後 resolve 不會因年份失敗
        for m in 1..=12 {
            window.resolve(Month::new(m)?)?;
        }
        Ok(window)
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// `start` is midnight on the 1st of `month` in the start year, `end` is
    /// midnight at the start of the last day of `month` in the end year.
    pub fn resolve(&self, month: Month) -> Result<DateRange> {
        let start = first_day(self.start_year, month)?;
        let end = last_day(self.end_year, month)?;

        Ok(DateRange {
            start: midnight(start),
            end: midnight(end),
        })
    }
}

/// Resolves a raw month number against the default anchor years.
pub fn month_date_range(month: u32) -> Result<DateRange> {
    AnchorWindow::default().resolve(Month::new(month)?)
}

fn first_day(year: i32, month: Month) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.number(), 1).ok_or_else(|| out_of_range(year))
}

fn last_day(year: i32, month: Month) -> Result<NaiveDate> {
    first_day(year, month)?
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| out_of_range(year))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn out_of_range(year: i32) -> DashboardError {
    DashboardError::InvalidConfigValueError {
        field: "analytics.anchor_year".to_string(),
        value: year.to_string(),
        reason: "Year is outside the supported calendar range".to_string(),
    }
}
