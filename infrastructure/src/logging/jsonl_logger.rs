//! JSONL file writer for component diagnostics.
//!
//! Each [`ComponentSnapshot`] is serialized as a single JSON line with a
//! `component` field and `timestamp`, appended to the file via a buffered
//! writer.

use docent_application::ports::diagnostics::{ComponentSnapshot, DiagnosticsSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL diagnostics sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlDiagnosticsSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlDiagnosticsSink {
    /// Create a sink appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create diagnostics directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open diagnostics file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the diagnostics file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticsSink for JsonlDiagnosticsSink {
    fn record(&self, snapshot: ComponentSnapshot) {
        let timestamp = snapshot
            .recorded_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = serde_json::json!({
            "component": snapshot.component,
            "timestamp": timestamp,
            "data": snapshot.data,
        });

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // JSONL is append-only; flush so a crash keeps earlier lines
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlDiagnosticsSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
