use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::stats::HistoryRecord;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Source of raw history records.
///
/// Errors are returned to the caller as-is; nothing downstream retries.
pub trait HistoryProvider {
    /// Records visited within the last `days_back` days.
    fn fetch(&self, days_back: u32) -> Result<Vec<HistoryRecord>>;
}

/// Oldest `lastVisitTime` (Unix millis) still inside a `days_back` window.
pub fn window_start_millis(days_back: u32) -> i64 {
    Utc::now().timestamp_millis() - i64::from(days_back) * MILLIS_PER_DAY
}

/// Reads a JSON array of history items as produced by the extension history API.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryProvider for JsonFileProvider {
    fn fetch(&self, days_back: u32) -> Result<Vec<HistoryRecord>> {
        let start_time = Instant::now();
        info!(action = "start", component = "json_provider", file_path = ?self.path, days_back, "Reading history export");

        if !self.path.exists() {
            anyhow::bail!("History export not found at {:?}", self.path);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        let records: Vec<HistoryRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history export {:?}", self.path))?;
        let total = records.len();

        // Entries without a timestamp cannot be placed in the window; keep them.
        let cutoff = window_start_millis(days_back);
        let records: Vec<HistoryRecord> = records
            .into_iter()
            .filter(|record| record.visit_time().map_or(true, |t| t >= cutoff))
            .collect();

        info!(
            action = "complete",
            component = "json_provider",
            record_count = records.len(),
            filtered_out = total - records.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "History export loaded"
        );
        Ok(records)
    }
}
