use crate::domain::price::{Extremum, PricePoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawdown {
    pub top: Extremum,
    pub bottom: Extremum,
    pub decline_pct: f64,
    /// `None` while the drawdown is still open at the end of the series.
    pub recovery: Option<Extremum>,
    /// Business days (Mon-Fri) from top to bottom.
    pub days_top_to_bottom: i64,
    pub days_bottom_to_recovery: Option<i64>,
}

impl Drawdown {
    pub fn is_open(&self) -> bool {
        self.recovery.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownReport {
    pub sorted_prices: Vec<PricePoint>,
    /// Ordered by `top.date`.
    pub drawdowns: Vec<Drawdown>,
}

impl DrawdownReport {
    /// The deepest drawdown. Ties go to the earliest one.
    pub fn max_drawdown(&self) -> Option<&Drawdown> {
        self.drawdowns.iter().fold(None, |best: Option<&Drawdown>, d| match best {
            Some(b) if b.decline_pct >= d.decline_pct => Some(b),
            _ => Some(d),
        })
    }

    /// The trailing drawdown that had not recovered when the series ended.
    pub fn open_drawdown(&self) -> Option<&Drawdown> {
        self.drawdowns.last().filter(|d| d.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ext(day: u32, price: f64, index: usize) -> Extremum {
        Extremum {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            price,
            index,
        }
    }

    fn drawdown(top: Extremum, bottom: Extremum, recovery: Option<Extremum>) -> Drawdown {
        Drawdown {
            top,
            bottom,
            decline_pct: -100.0 * (bottom.price - top.price) / top.price,
            recovery,
            days_top_to_bottom: 1,
            days_bottom_to_recovery: recovery.map(|_| 1),
        }
    }

    #[test]
    fn serializes_with_camel_case_schema() {
        let d = drawdown(ext(4, 10.0, 0), ext(5, 7.0, 1), None);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(
            v,
            json!({
                "top": {"date": "2024-03-04", "price": 10.0, "index": 0},
                "bottom": {"date": "2024-03-05", "price": 7.0, "index": 1},
                "declinePct": 30.0,
                "recovery": null,
                "daysTopToBottom": 1,
                "daysBottomToRecovery": null,
            })
        );
    }

    #[test]
    fn deserializes_its_own_output() {
        let d = drawdown(ext(4, 10.0, 0), ext(5, 7.0, 1), Some(ext(6, 12.0, 2)));
        let text = serde_json::to_string(&d).unwrap();
        let back: Drawdown = serde_json::from_str(&text).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn max_drawdown_prefers_earliest_on_ties() {
        let report = DrawdownReport {
            sorted_prices: vec![],
            drawdowns: vec![
                drawdown(ext(4, 10.0, 0), ext(5, 8.0, 1), Some(ext(6, 11.0, 2))),
                drawdown(ext(6, 11.0, 2), ext(7, 5.5, 3), Some(ext(8, 12.0, 4))),
                drawdown(ext(8, 12.0, 4), ext(11, 6.0, 5), None),
            ],
        };
        let max = report.max_drawdown().unwrap();
        assert_eq!(max.top.index, 2);
        assert_eq!(report.open_drawdown().unwrap().top.index, 4);
    }

    #[test]
    fn empty_report_has_no_max_or_open_drawdown() {
        let report = DrawdownReport::default();
        assert!(report.max_drawdown().is_none());
        assert!(report.open_drawdown().is_none());
    }
}
