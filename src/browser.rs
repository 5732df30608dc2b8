use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::process_history_data;
use crate::export::{export_filename, export_to_csv, ExportKind};
use crate::provider::HistoryProvider;
use crate::sink::DownloadSink;
use crate::stats::AggregatedResult;
use crate::utils::{format_number, redact_domain};

/// Fetches `days_back` days of history and aggregates it. Provider errors are
/// returned unchanged and aggregation does not run.
pub fn analyze_browser_history(
    provider: &dyn HistoryProvider,
    days_back: u32,
) -> Result<AggregatedResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", days_back, "Starting browser history analysis");

    let records = provider.fetch(days_back)?;
    let result = process_history_data(records);

    info!(
        action = "complete",
        component = "analysis",
        total_visits = result.total_visits,
        top_domains = result.domain_stats.len(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(result)
}

/// Renders `kind` and hands it to `sink`. Returns `false` without saving when
/// there is nothing to export (unknown domain for a domain-detail export).
pub fn export_history(
    result: &AggregatedResult,
    kind: ExportKind,
    domain: Option<&str>,
    sink: &dyn DownloadSink,
    date: NaiveDate,
) -> bool {
    let csv = export_to_csv(result, kind, domain);
    if csv.is_empty() {
        warn!(action = "export", component = "csv_export", kind = %kind, domain = ?domain, "Nothing to export");
        return false;
    }

    let filename = match kind {
        ExportKind::DomainDetail => export_filename(kind, domain, date),
        _ => export_filename(kind, None, date),
    };
    info!(action = "export", component = "csv_export", kind = %kind, filename = %filename, bytes = csv.len(), "Saving export");
    sink.save(&csv, &filename);
    true
}

pub fn print_analysis_results(result: &AggregatedResult, top: Option<usize>, redact: bool) {
    let start = result.date_range.start.with_timezone(&Local);
    let end = result.date_range.end.with_timezone(&Local);
    let days_between = result.date_range.days_between();

    println!("\n--- Browsing History Analysis ---");

    if days_between > 0 {
        println!(
            "Date range: {} to {} ({} days)",
            start.format("%B %-d, %Y"),
            end.format("%B %-d, %Y"),
            format_number(days_between as u64)
        );
    } else {
        println!(
            "Date range: {} to {}",
            start.format("%B %-d, %Y"),
            end.format("%B %-d, %Y")
        );
    }

    println!("Total visits: {}", format_number(result.total_visits));

    let shown = top.unwrap_or(result.domain_stats.len());
    println!(
        "\nTop {} domains by visits:",
        std::cmp::min(shown, result.domain_stats.len())
    );
    for stat in result.domain_stats.iter().take(shown) {
        let display_domain = if redact {
            redact_domain(&stat.domain)
        } else {
            stat.domain.clone()
        };
        println!(
            "- {}: {} visits (~{} min)",
            display_domain,
            format_number(stat.visit_count),
            format_number(stat.time_spent_minutes)
        );
    }

    println!("\nActivity by day of week:");
    for stat in &result.day_of_week_stats {
        println!("- {:<9} {} visits", stat.day, format_number(stat.visit_count));
    }
}
