use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// Destination for rendered exports. Saving is fire-and-forget: implementations
/// report their own failures.
pub trait DownloadSink {
    fn save(&self, content: &str, filename: &str);
}

/// Writes each export as a file inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, content: &str, filename: &str) {
        let path = self.dir.join(filename);
        match fs::write(&path, content) {
            Ok(()) => {
                info!(action = "save", component = "directory_sink", file_path = ?path, bytes = content.len(), "Export written")
            }
            Err(e) => {
                error!(action = "save", component = "directory_sink", file_path = ?path, error = %e, "Failed to write export")
            }
        }
    }
}

/// Prints exports to standard output, byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DownloadSink for StdoutSink {
    fn save(&self, content: &str, filename: &str) {
        if let Err(e) = write_verbatim(&mut io::stdout().lock(), content) {
            error!(action = "save", component = "stdout_sink", filename, error = %e, "Failed to print export");
        }
    }
}

fn write_verbatim<W: Write>(writer: &mut W, content: &str) -> io::Result<()> {
    writer.write_all(content.as_bytes())?;
    writer.flush()
}
