use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::error;

use historee_export::utils::{setup_logging, validate_args};
use historee_export::{
    analyze_browser_history, export_history, print_analysis_results, Args,
    ChromiumHistoryProvider, DirectorySink, DownloadSink, HistoryProvider, JsonFileProvider,
    StdoutSink,
};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    validate_args(&args)?;

    let provider: Box<dyn HistoryProvider> = match &args.input {
        Some(path) => Box::new(JsonFileProvider::new(path)),
        None => Box::new(
            ChromiumHistoryProvider::for_browser(&args.browser)?
                .with_temp_path(args.temp_path.clone()),
        ),
    };

    let result = match analyze_browser_history(provider.as_ref(), args.days) {
        Ok(result) => result,
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize summary")?;
        println!("{}", json);
    } else if !args.stdout || args.export.is_none() {
        print_analysis_results(&result, args.top, args.redact);
    }

    if let Some(kind) = args.export {
        let sink: Box<dyn DownloadSink> = if args.stdout {
            Box::new(StdoutSink)
        } else {
            Box::new(DirectorySink::new(&args.output_dir))
        };
        let today = Utc::now().date_naive();
        if !export_history(&result, kind, args.domain.as_deref(), sink.as_ref(), today) {
            eprintln!(
                "Nothing to export: '{}' is not among the top domains",
                args.domain.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(())
}
