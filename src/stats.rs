use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const UNTITLED: &str = "Untitled";

/// A single entry as returned by the browser's history store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(
        default,
        deserialize_with = "deserialize_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_visit_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed_count: Option<u32>,
}

impl HistoryRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn visited_at(mut self, millis: i64) -> Self {
        self.last_visit_time = Some(millis);
        self
    }

    pub fn with_counts(mut self, visit_count: u32, typed_count: u32) -> Self {
        self.visit_count = Some(visit_count);
        self.typed_count = Some(typed_count);
        self
    }

    /// Visit time in Unix millis. A zero timestamp counts as missing.
    pub fn visit_time(&self) -> Option<i64> {
        self.last_visit_time.filter(|&t| t != 0)
    }

    /// Title for display, falling back to `"Untitled"` when absent or empty.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => UNTITLED,
        }
    }
}

// Chrome reports lastVisitTime as a float with sub-millisecond precision.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStat {
    pub domain: String,
    pub visit_count: u64,
    pub time_spent_minutes: u64,
    /// Records for this domain in input order.
    pub urls: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStat {
    pub day: &'static str,
    pub visit_count: u64,
    pub time_spent_minutes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn days_between(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    /// At most ten domains, busiest first.
    pub domain_stats: Vec<DomainStat>,
    /// Always seven entries, Sunday through Saturday.
    pub day_of_week_stats: Vec<DayStat>,
    pub total_visits: u64,
    pub date_range: DateRange,
    #[serde(skip)]
    pub all_history: Vec<HistoryRecord>,
}

impl AggregatedResult {
    pub fn find_domain(&self, domain: &str) -> Option<&DomainStat> {
        self.domain_stats.iter().find(|stat| stat.domain == domain)
    }
}
