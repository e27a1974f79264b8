use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily observation of a series.
///
/// `index` is the point's position in the chronologically sorted series. Loaders leave it
/// at zero; [`crate::drawdown::detect`] assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub change_pct: f64,
    #[serde(default)]
    pub index: usize,
}

/// A reference to a specific point acting as a peak, trough or recovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub date: NaiveDate,
    pub price: f64,
    pub index: usize,
}

impl Extremum {
    pub fn high_of(point: &PricePoint) -> Self {
        Self {
            date: point.date,
            price: point.high,
            index: point.index,
        }
    }

    pub fn low_of(point: &PricePoint) -> Self {
        Self {
            date: point.date,
            price: point.low,
            index: point.index,
        }
    }
}
