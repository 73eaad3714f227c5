//! Filter and aggregation construction for the dashboard endpoints.
//!
//! Everything here is pure: the builder only produces [`SaleFilter`] values
//! and pipeline descriptions, the record store executes them.

use crate::core::month_range::AnchorWindow;
use crate::domain::query::{Month, PriceBand, SaleFilter, SearchTerm};
use crate::utils::error::Result;

/// Price histogram buckets as `(min, label max)`; `None` is the open-ended
/// last bucket. A bucket covers prices up to the next bucket's minimum.
pub const PRICE_BUCKETS: [(u32, Option<u32>); 10] = [
    (0, Some(100)),
    (101, Some(200)),
    (201, Some(300)),
    (301, Some(400)),
    (401, Some(500)),
    (501, Some(600)),
    (601, Some(700)),
    (701, Some(800)),
    (801, Some(900)),
    (901, None),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsPipeline {
    pub filter: SaleFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketQuery {
    pub label: String,
    pub filter: SaleFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartPipeline {
    pub buckets: Vec<BucketQuery>,
}

/// Counts grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChartPipeline {
    pub filter: SaleFilter,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    window: AnchorWindow,
}

impl QueryBuilder {
    pub fn new(window: AnchorWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> AnchorWindow {
        self.window
    }

    /// Exact month AND anchor date range, plus the optional search clause.
    pub fn build_transaction_filter(&self, month: Month, search: Option<&str>) -> Result<SaleFilter> {
        let mut filter = self.month_filter(month)?;
        filter.search = search
            .filter(|s| !s.is_empty())
            .map(|text| SearchTerm {
                text: text.to_string(),
                needle: text.to_lowercase(),
                price: search_price(text),
            });
        Ok(filter)
    }

    pub fn build_statistics_pipeline(&self, month: Month) -> Result<StatisticsPipeline> {
        Ok(StatisticsPipeline {
            filter: self.month_filter(month)?,
        })
    }

    /// Bucket counts are bounded by the anchor date range only, without the
    /// exact month predicate the other aggregations apply.
    pub fn build_bar_chart_pipeline(&self, month: Month) -> Result<BarChartPipeline> {
        let date_range = self.window.resolve(month)?;

        let buckets = PRICE_BUCKETS
            .iter()
            .enumerate()
            .map(|(i, (min, label_max))| {
                let next_min = PRICE_BUCKETS.get(i + 1).map(|(next, _)| f64::from(*next));
                BucketQuery {
                    label: bucket_label(*min, *label_max),
                    filter: SaleFilter {
                        month: None,
                        date_range,
                        search: None,
                        price: Some(PriceBand {
                            min: f64::from(*min),
                            max: next_min,
                        }),
                    },
                }
            })
            .collect();

        Ok(BarChartPipeline { buckets })
    }

    pub fn build_pie_chart_pipeline(&self, month: Month) -> Result<PieChartPipeline> {
        Ok(PieChartPipeline {
            filter: self.month_filter(month)?,
        })
    }

    fn month_filter(&self, month: Month) -> Result<SaleFilter> {
        Ok(SaleFilter {
            month: Some(month),
            date_range: self.window.resolve(month)?,
            search: None,
            price: None,
        })
    }
}

fn bucket_label(min: u32, max: Option<u32>) -> String {
    match max {
        Some(max) => format!("{} - {}", min, max),
        None => format!("{} - above", min),
    }
}

/// Price a search term is compared against: its leading numeric prefix, or
/// `0` when there is none (or it is zero).
pub fn search_price(search: &str) -> f64 {
    match leading_float(search) {
        Some(value) if value != 0.0 && !value.is_nan() => value,
        _ => 0.0,
    }
}

/// Longest decimal prefix of `input` after leading whitespace, e.g.
/// `"150abc"` → `150`, `"abc"` → `None`.
fn leading_float(input: &str) -> Option<f64> {
    let text = input.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if digits > 0 || frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}
