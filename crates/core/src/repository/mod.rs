use crate::domain::drawdown::DrawdownReport;
use crate::domain::price::PricePoint;
use crate::drawdown::detect;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

pub mod csv_directory;

pub use csv_directory::CsvDirectorySource;

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Every known series keyed by name. Points need not be in date order.
    async fn load_all(&self) -> Result<HashMap<String, Vec<PricePoint>>>;
}

type SeriesMap = HashMap<String, Arc<Vec<PricePoint>>>;

/// Read-through cache over a [`PriceSource`].
///
/// The source is loaded once, on first use. Concurrent first callers share one load, and a
/// failed load is retried by the next caller. Drawdown reports are computed at most once per
/// series.
pub struct PriceRepository<S> {
    source: S,
    series: OnceCell<SeriesMap>,
    reports: Mutex<HashMap<String, Arc<DrawdownReport>>>,
}

impl<S: PriceSource> PriceRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            series: OnceCell::new(),
            reports: Mutex::new(HashMap::new()),
        }
    }

    async fn loaded(&self) -> Result<&SeriesMap> {
        self.series
            .get_or_try_init(|| async move {
                let t0 = std::time::Instant::now();
                let raw = self.source.load_all().await?;
                tracing::info!(
                    source = self.source.source_name(),
                    series_len = raw.len(),
                    elapsed_ms = t0.elapsed().as_millis(),
                    "price series loaded"
                );
                Ok::<_, anyhow::Error>(raw.into_iter().map(|(k, v)| (k, Arc::new(v))).collect())
            })
            .await
    }

    /// `Ok(None)` means the series does not exist; an existing series may still be empty.
    pub async fn prices(&self, name: &str) -> Result<Option<Arc<Vec<PricePoint>>>> {
        Ok(self.loaded().await?.get(name).cloned())
    }

    pub async fn series_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.loaded().await?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub async fn drawdowns(&self, name: &str) -> Result<Option<Arc<DrawdownReport>>> {
        let Some(prices) = self.prices(name).await? else {
            return Ok(None);
        };

        if let Some(report) = self.cached_report(name) {
            return Ok(Some(report));
        }

        // Two racing callers may both compute; the output is identical either way.
        let report = Arc::new(detect(&prices));
        tracing::debug!(
            series = name,
            points = report.sorted_prices.len(),
            drawdowns = report.drawdowns.len(),
            "computed drawdowns"
        );

        let mut reports = self.reports.lock().unwrap_or_else(PoisonError::into_inner);
        let report = reports
            .entry(name.to_string())
            .or_insert(report)
            .clone();
        Ok(Some(report))
    }

    fn cached_report(&self, name: &str) -> Option<Arc<DrawdownReport>> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
