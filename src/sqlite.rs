use anyhow::{Context, Result};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::provider::{window_start_millis, HistoryProvider};
use crate::stats::HistoryRecord;

/// Upper bound on rows returned per fetch, matching the extension history API.
pub const MAX_RESULTS: i64 = 10_000;

/// Milliseconds between 1601-01-01 (Chromium's epoch) and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

pub fn webkit_to_unix_millis(webkit_micros: i64) -> Option<i64> {
    if webkit_micros <= 0 {
        return None;
    }
    Some(webkit_micros / 1000 - WEBKIT_EPOCH_OFFSET_MS)
}

pub fn unix_millis_to_webkit(unix_millis: i64) -> i64 {
    (unix_millis + WEBKIT_EPOCH_OFFSET_MS) * 1000
}

pub fn get_browser_history_path(browser: &str) -> Result<PathBuf> {
    let system = env::consts::OS;
    let home = env::var("HOME").or_else(|_| env::var("USERPROFILE"))?;

    let profile_dir = match (browser.to_lowercase().as_str(), system) {
        ("chrome", "linux") => PathBuf::from(home).join(".config/google-chrome"),
        ("chrome", "macos") => {
            PathBuf::from(home).join("Library/Application Support/Google/Chrome")
        }
        ("chrome", "windows") => {
            PathBuf::from(env::var("LOCALAPPDATA")?).join("Google/Chrome/User Data")
        }
        ("chromium", "linux") => PathBuf::from(home).join(".config/chromium"),
        ("chromium", "macos") => PathBuf::from(home).join("Library/Application Support/Chromium"),
        ("chromium", "windows") => {
            PathBuf::from(env::var("LOCALAPPDATA")?).join("Chromium/User Data")
        }
        ("brave", "linux") => PathBuf::from(home).join(".config/BraveSoftware/Brave-Browser"),
        ("brave", "macos") => {
            PathBuf::from(home).join("Library/Application Support/BraveSoftware/Brave-Browser")
        }
        ("brave", "windows") => {
            PathBuf::from(env::var("LOCALAPPDATA")?).join("BraveSoftware/Brave-Browser/User Data")
        }
        ("edge", "linux") => PathBuf::from(home).join(".config/microsoft-edge"),
        ("edge", "macos") => PathBuf::from(home).join("Library/Application Support/Microsoft Edge"),
        ("edge", "windows") => {
            PathBuf::from(env::var("LOCALAPPDATA")?).join("Microsoft/Edge/User Data")
        }
        ("vivaldi", "linux") => PathBuf::from(home).join(".config/vivaldi"),
        ("vivaldi", "macos") => PathBuf::from(home).join("Library/Application Support/Vivaldi"),
        ("vivaldi", "windows") => {
            PathBuf::from(env::var("LOCALAPPDATA")?).join("Vivaldi/User Data")
        }
        _ => anyhow::bail!(
            "Unsupported browser '{}' or operating system '{}'",
            browser,
            system
        ),
    };
    let path = profile_dir.join("Default").join("History");

    info!(action = "resolve", component = "browser_path", browser = browser, path = ?path, "Browser history path resolved");
    Ok(path)
}

pub fn copy_history_database(history_path: &Path, temp_path: Option<&Path>) -> Result<PathBuf> {
    let start_time = Instant::now();
    info!(action = "start", component = "database_copy", "Copying browser history database");

    let temp_path = temp_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| env::temp_dir().join("historee_history_copy.db"));

    info!(action = "copy", component = "database_copy", source = ?history_path, destination = ?temp_path, "Database copy paths");

    if !history_path.exists() {
        anyhow::bail!("History file not found at {:?}", history_path);
    }

    fs::copy(history_path, &temp_path)
        .with_context(|| format!("Failed to copy {:?} to {:?}", history_path, temp_path))?;

    let copy_time = start_time.elapsed();
    info!(action = "complete", component = "database_copy", duration_ms = copy_time.as_millis(), "Database copy completed");
    Ok(temp_path)
}

/// Rows of the `urls` table visited at or after `since_millis`, most recent first.
pub fn query_recent_urls(conn: &Connection, since_millis: i64) -> Result<Vec<HistoryRecord>> {
    let start_time = Instant::now();
    info!(action = "start", component = "history_query", "Querying recent history entries");

    let records = conn
        .prepare(
            "SELECT url, title, visit_count, typed_count, last_visit_time
             FROM urls
             WHERE last_visit_time >= ?1
             ORDER BY last_visit_time DESC
             LIMIT ?2",
        )?
        .query_map(params![unix_millis_to_webkit(since_millis), MAX_RESULTS], |row| {
            let url: Option<String> = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            let visit_count: Option<i64> = row.get(2)?;
            let typed_count: Option<i64> = row.get(3)?;
            let last_visit_time: Option<i64> = row.get(4)?;
            Ok(HistoryRecord {
                url: url.unwrap_or_default(),
                title: title.filter(|t| !t.is_empty()),
                last_visit_time: last_visit_time.and_then(webkit_to_unix_millis),
                visit_count: visit_count.and_then(|v| u32::try_from(v).ok()),
                typed_count: typed_count.and_then(|v| u32::try_from(v).ok()),
            })
        })?
        .collect::<SqliteResult<Vec<HistoryRecord>>>()
        .context("Failed to query history entries")?;

    info!(
        action = "complete",
        component = "history_query",
        record_count = records.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "History query completed"
    );
    Ok(records)
}

/// Reads a Chromium-family `History` database through a temporary copy.
#[derive(Debug, Clone)]
pub struct ChromiumHistoryProvider {
    history_path: PathBuf,
    temp_path: Option<PathBuf>,
}

impl ChromiumHistoryProvider {
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            temp_path: None,
        }
    }

    pub fn for_browser(browser: &str) -> Result<Self> {
        Ok(Self::new(get_browser_history_path(browser)?))
    }

    pub fn with_temp_path(mut self, temp_path: Option<PathBuf>) -> Self {
        self.temp_path = temp_path;
        self
    }
}

impl HistoryProvider for ChromiumHistoryProvider {
    fn fetch(&self, days_back: u32) -> Result<Vec<HistoryRecord>> {
        let temp_history_path =
            copy_history_database(&self.history_path, self.temp_path.as_deref())?;

        let result = Connection::open(&temp_history_path)
            .context("Failed to open history database copy")
            .and_then(|conn| {
                info!(action = "connect", component = "database", "Connected to database");
                query_recent_urls(&conn, window_start_millis(days_back))
            });

        if let Err(e) = fs::remove_file(&temp_history_path) {
            warn!(action = "cleanup", component = "database_copy", error = %e, "Failed to remove temporary file");
        }

        result
    }
}
