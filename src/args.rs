use clap::Parser;
use std::path::PathBuf;

use crate::export::ExportKind;

#[derive(Parser, Debug)]
#[command(
    name = "historee-export",
    about = "Summarize browser history by domain and weekday, with CSV export",
    version,
    long_about = None
)]
pub struct Args {
    /// Browser to analyze (chrome, chromium, brave, edge, vivaldi)
    #[arg(short, long, default_value = "Chrome")]
    pub browser: String,

    /// Read history from a JSON export instead of the browser profile
    #[arg(short, long, conflicts_with = "browser")]
    pub input: Option<PathBuf>,

    /// Number of days of history to include
    #[arg(short, long, default_value_t = 7)]
    pub days: u32,

    /// Number of top domains to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Export a CSV view
    #[arg(short, long, value_enum)]
    pub export: Option<ExportKind>,

    /// Domain for --export domain-detail
    #[arg(long)]
    pub domain: Option<String>,

    /// Directory to write exports into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Print exports to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Custom temporary file path for database copy
    #[arg(long)]
    pub temp_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Redact domain names for privacy
    #[arg(long)]
    pub redact: bool,
}
