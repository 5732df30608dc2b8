//! CSV rendering of an [`AggregatedResult`].
//!
//! Text fields are always double-quoted with embedded quotes doubled; numeric
//! fields are written bare. Rows are joined with `\n` and the output never ends
//! with a newline, so an empty view renders as the header line alone.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::domain::extract_domain;
use crate::stats::{AggregatedResult, HistoryRecord};

const DOMAINS_HEADER: &str = "Domain,Visit Count,Time Spent (minutes)";
const DAYS_HEADER: &str = "Day of Week,Visit Count,Time Spent (minutes)";
const DETAILED_HEADER: &str = "Title,URL,Domain,Visit Time,Visit Count,Typed Count";
const DOMAIN_DETAIL_HEADER: &str = "Title,URL,Visit Time,Visit Count,Typed Count";

static FILENAME_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("filename pattern is valid"));

/// Which view of the aggregated data to serialize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ExportKind {
    /// Top domains summary
    Domains,
    /// Weekly activity summary
    Days,
    /// Every history record
    Detailed,
    /// Records of a single top domain, most recent first
    DomainDetail,
}

/// Renders `kind` as CSV. `DomainDetail` needs `domain` to name one of the
/// top domains; otherwise the result is an empty string.
pub fn export_to_csv(result: &AggregatedResult, kind: ExportKind, domain: Option<&str>) -> String {
    match kind {
        ExportKind::Domains => render(
            DOMAINS_HEADER,
            result.domain_stats.iter().map(|stat| {
                format!(
                    "{},{},{}",
                    escape_csv_field(&stat.domain),
                    stat.visit_count,
                    stat.time_spent_minutes
                )
            }),
        ),
        ExportKind::Days => render(
            DAYS_HEADER,
            result.day_of_week_stats.iter().map(|stat| {
                format!(
                    "{},{},{}",
                    escape_csv_field(stat.day),
                    stat.visit_count,
                    stat.time_spent_minutes
                )
            }),
        ),
        ExportKind::Detailed => render(
            DETAILED_HEADER,
            result.all_history.iter().map(|record| {
                format!(
                    "{},{},{},{},{},{}",
                    escape_csv_field(record.display_title()),
                    escape_csv_field(&record.url),
                    escape_csv_field(&extract_domain(&record.url)),
                    escape_csv_field(&visit_time_iso(record)),
                    record.visit_count.unwrap_or(0),
                    record.typed_count.unwrap_or(0)
                )
            }),
        ),
        ExportKind::DomainDetail => {
            let Some(stat) = domain.and_then(|d| result.find_domain(d)) else {
                return String::new();
            };
            let mut records: Vec<&HistoryRecord> = stat.urls.iter().collect();
            records.sort_by_key(|record| std::cmp::Reverse(record.visit_time().unwrap_or(0)));
            render(
                DOMAIN_DETAIL_HEADER,
                records.into_iter().map(|record| {
                    format!(
                        "{},{},{},{},{}",
                        escape_csv_field(record.display_title()),
                        escape_csv_field(&record.url),
                        escape_csv_field(&visit_time_iso(record)),
                        record.visit_count.unwrap_or(0),
                        record.typed_count.unwrap_or(0)
                    )
                }),
            )
        }
    }
}

/// Like [`export_to_csv`], selecting the view by name (`"domains"`, `"days"`,
/// `"detailed"`, `"domain-detail"`). Unrecognized names produce an empty string.
pub fn export_to_csv_named(result: &AggregatedResult, kind: &str, domain: Option<&str>) -> String {
    match ExportKind::from_str(kind) {
        Ok(kind) => export_to_csv(result, kind, domain),
        Err(_) => String::new(),
    }
}

pub fn escape_csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `browsing-history-<kind>[-<domain>]-<date>.csv` with the domain reduced to `[A-Za-z0-9_]`.
pub fn export_filename(kind: ExportKind, domain: Option<&str>, date: NaiveDate) -> String {
    let mut name = format!("browsing-history-{}", kind.as_ref());
    if let Some(domain) = domain {
        name.push('-');
        name.push_str(&FILENAME_UNSAFE.replace_all(domain, "_"));
    }
    format!("{}-{}.csv", name, date.format("%Y-%m-%d"))
}

fn visit_time_iso(record: &HistoryRecord) -> String {
    record
        .visit_time()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn render(header: &str, rows: impl Iterator<Item = String>) -> String {
    let rows: Vec<String> = rows.collect();
    if rows.is_empty() {
        return header.to_string();
    }
    format!("{}\n{}", header, rows.join("\n"))
}
