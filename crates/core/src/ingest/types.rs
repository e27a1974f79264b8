use crate::domain::price::PricePoint;

/// A row that could not be turned into a [`PricePoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line in the source file.
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedPrices {
    pub points: Vec<PricePoint>,
    pub row_errors: Vec<RowError>,
}
