//! Store-independent query values.
//!
//! Record store adapters translate a [`SaleFilter`] into their own query
//! language; [`SaleFilter::matches`] is the reference semantics they must
//! agree with.

use crate::domain::model::SaleRecord;
use crate::utils::error::{DashboardError, Result};
use chrono::{DateTime, Datelike, Utc};
use std::fmt;

/// Calendar month, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month(u32);

impl Month {
    pub fn new(month: u32) -> Result<Self> {
        if (1..=12).contains(&month) {
            Ok(Self(month))
        } else {
            Err(DashboardError::invalid_parameter(
                "month",
                &month.to_string(),
                "Value must be between 1 and 12",
            ))
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// Free-text search that also doubles as an exact price lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm {
    pub text: String,
    /// Lowercased `text`, compared against lowercased title/description.
    pub needle: String,
    pub price: f64,
}

/// `[min, max)`, unbounded above when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceBand {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price < max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleFilter {
    /// Exact calendar-month match on `dateOfSale` (UTC).
    pub month: Option<Month>,
    pub date_range: DateRange,
    pub search: Option<SearchTerm>,
    pub price: Option<PriceBand>,
}

impl SaleFilter {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(month) = self.month {
            if record.date_of_sale.month() != month.number() {
                return false;
            }
        }

        if !self.date_range.contains(&record.date_of_sale) {
            return false;
        }

        if let Some(search) = &self.search {
            let hit = record.title.to_lowercase().contains(&search.needle)
                || record.description.to_lowercase().contains(&search.needle)
                || record.price == search.price;
            if !hit {
                return false;
            }
        }

        if let Some(band) = &self.price {
            if !band.contains(record.price) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        assert!(Month::new(0).is_err());
        assert!(Month::new(13).is_err());
        for m in 1..=12 {
            assert_eq!(Month::new(m).unwrap().number(), m);
        }
    }

    #[test]
    fn test_price_band() {
        let band = PriceBand {
            min: 101.0,
            max: Some(201.0),
        };
        assert!(!band.contains(100.99));
        assert!(band.contains(101.0));
        assert!(band.contains(200.5));
        assert!(!band.contains(201.0));

        let open = PriceBand {
            min: 901.0,
            max: None,
        };
        assert!(open.contains(901.0));
        assert!(open.contains(1_000_000.0));
    }
}
