pub mod aggregate;
pub mod args;
pub mod browser;
pub mod domain;
pub mod export;
pub mod provider;
pub mod sink;
pub mod sqlite;
pub mod stats;
pub mod utils;

pub use aggregate::{process_history_data, process_history_data_with};
pub use args::Args;
pub use browser::{analyze_browser_history, export_history, print_analysis_results};
pub use domain::extract_domain;
pub use export::{export_to_csv, export_to_csv_named, ExportKind};
pub use provider::{HistoryProvider, JsonFileProvider};
pub use sink::{DirectorySink, DownloadSink, StdoutSink};
pub use sqlite::ChromiumHistoryProvider;
pub use stats::{AggregatedResult, DateRange, DayStat, DomainStat, HistoryRecord};
