//! Parser for daily price-history exports (investing.com layout).
//!
//! Columns are read by position: `Date, Price, Open, High, Low, Vol., Change %`. Volume is
//! ignored.

use crate::domain::price::PricePoint;
use crate::ingest::types::{ParsedPrices, RowError};
use anyhow::Context;
use chrono::NaiveDate;
use csv::StringRecord;

const DATE_FORMATS: [&str; 3] = ["%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

const COL_DATE: usize = 0;
const COL_PRICE: usize = 1;
const COL_OPEN: usize = 2;
const COL_HIGH: usize = 3;
const COL_LOW: usize = 4;
const COL_CHANGE: usize = 6;
const MIN_COLUMNS: usize = COL_CHANGE + 1;

pub fn parse_price_history<R: std::io::Read>(reader: R) -> anyhow::Result<ParsedPrices> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .headers()
        .context("failed to read price history header row")?;

    let mut out = ParsedPrices::default();
    for (idx, result) in reader.records().enumerate() {
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);
        match parse_row(&record) {
            Ok(point) => out.points.push(point),
            Err(message) => out.row_errors.push(RowError { line, message }),
        }
    }

    Ok(out)
}

fn parse_row(record: &StringRecord) -> Result<PricePoint, String> {
    if record.len() < MIN_COLUMNS {
        return Err(format!(
            "expected at least {MIN_COLUMNS} columns, got {}",
            record.len()
        ));
    }

    let field = |idx: usize| record.get(idx).unwrap_or_default();
    let number = |idx: usize, name: &str| {
        parse_number(field(idx)).ok_or_else(|| format!("invalid {name}: {:?}", field(idx)))
    };

    Ok(PricePoint {
        date: parse_date(field(COL_DATE))
            .ok_or_else(|| format!("invalid date: {:?}", field(COL_DATE)))?,
        price: number(COL_PRICE, "price")?,
        open: number(COL_OPEN, "open")?,
        high: number(COL_HIGH, "high")?,
        low: number(COL_LOW, "low")?,
        change_pct: number(COL_CHANGE, "change %")?,
        index: 0,
    })
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses `"1,234.50"`, `"-0.45%"` and similar cells. Signs are kept.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
