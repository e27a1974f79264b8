use crate::domain::price::PricePoint;
use crate::ingest::history_csv::parse_price_history;
use crate::repository::PriceSource;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loads every `*.csv` file in a directory as one series, named by the file name up to its
/// first `.` (`smt.csv` and `smt.daily.csv` both map to `smt`).
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn csv_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("failed to read prices dir {}", self.dir.display()))?;

        let mut out = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to list prices dir {}", self.dir.display()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            // Follows symlinks.
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                out.push(path);
            }
        }

        out.sort();
        Ok(out)
    }
}

#[async_trait::async_trait]
impl PriceSource for CsvDirectorySource {
    fn source_name(&self) -> &'static str {
        "csv_directory"
    }

    async fn load_all(&self) -> Result<HashMap<String, Vec<PricePoint>>> {
        let mut out = HashMap::new();

        for path in self.csv_files().await? {
            let Some(name) = series_name(&path) else {
                continue;
            };

            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let parsed = parse_price_history(bytes.as_slice())
                .with_context(|| format!("failed to parse {}", path.display()))?;

            if let Some(first) = parsed.row_errors.first() {
                tracing::warn!(
                    file = %path.display(),
                    skipped_rows = parsed.row_errors.len(),
                    first_line = first.line,
                    first_error = %first.message,
                    "skipped unparseable price rows"
                );
            }

            if out.insert(name.to_string(), parsed.points).is_some() {
                tracing::warn!(series = name, file = %path.display(), "duplicate series name; later file wins");
            }
        }

        Ok(out)
    }
}

fn series_name(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|s| !s.is_empty())
}
