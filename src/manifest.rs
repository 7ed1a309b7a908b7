//! Error records and the per-job error log.
//!
//! Every stage error is caught at its stage boundary and appended here as an
//! [`ErrorRecord`]. The log is append-only; [`ErrorLog::is_clean`] is what
//! the job runner consults before starting each later stage.
//!
//! ```text
//!  stage ──Err(e)──► ErrorLog::record ──► Vec<ErrorRecord>
//!                                              │
//!                         packaging ◄──────────┘  <stem>.error.json (if any)
//! ```

use crate::error::ErrorCode;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;
use tracing::error;

/// One failure, as written to `<stem>.error.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorRecord {
    /// Local time the failure was recorded (RFC 3339).
    pub time_stamp: String,
    /// Input file the failure concerns (archive name for job-level failures).
    pub file_name: String,
    pub active_step: String,
    pub code: Option<String>,
    pub message: String,
    /// `Debug` rendering plus the `source()` chain; empty unless debug mode.
    pub stack_trace: String,
    pub module: String,
}

/// Append-only collection of [`ErrorRecord`]s for one job.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage failure.
    pub fn record<E>(&mut self, file_name: &str, module: &str, step: &str, err: &E)
    where
        E: Error + ErrorCode,
    {
        let code = err.code();
        error!(
            file = file_name,
            module,
            step,
            code = code.unwrap_or("-"),
            "{err}"
        );
        self.records.push(ErrorRecord {
            time_stamp: Local::now().to_rfc3339(),
            file_name: file_name.to_string(),
            active_step: step.to_string(),
            code: code.map(str::to_string),
            message: err.to_string(),
            stack_trace: trace(err),
            module: module.to_string(),
        });
    }

    /// `true` while nothing has been recorded.
    pub fn is_clean(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Write the records as a JSON array. Traces are blanked unless `debug`.
    ///
    /// Nothing is written when the log is clean; returns whether a file was written.
    pub fn write_manifest(&self, path: &Path, debug: bool) -> std::io::Result<bool> {
        if self.is_clean() {
            return Ok(false);
        }
        let records: Vec<ErrorRecord> = self
            .records
            .iter()
            .cloned()
            .map(|mut r| {
                if !debug {
                    r.stack_trace.clear();
                }
                r
            })
            .collect();
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)?;
        Ok(true)
    }
}

/// `Debug` of the error followed by each `source()` on its own line.
fn trace(err: &dyn Error) -> String {
    let mut out = format!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\ncaused by: {cause}");
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PdfError, SplitError, ValidationError};

    fn out_of_range() -> SplitError {
        SplitError::OutOfRange {
            index: 1,
            file_name: "part.pdf".into(),
            first: 10,
            last: 12,
            page_count: 4,
        }
    }

    #[test]
    fn clean_log_writes_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.error.json");
        let log = ErrorLog::new();
        assert!(!log.write_manifest(&path, false).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn records_keep_occurrence_order_and_codes() {
        let mut log = ErrorLog::new();
        log.record("job.zip", "config", "validate", &ValidationError::NoActionSelected);
        log.record("src.pdf", "split", "extract", &out_of_range());

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, None);
        assert_eq!(records[1].code.as_deref(), Some("split.range"));
        assert_eq!(records[1].active_step, "extract");
        assert!(records[1].message.contains("4 pages"));
    }

    #[test]
    fn recording_ends_the_clean_state() {
        let mut log = ErrorLog::new();
        assert!(log.is_clean());
        log.record("a.pdf", "text", "extract", &PdfError::NoPages);
        assert!(!log.is_clean());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn trace_includes_source_chain() {
        let err = SplitError::Extraction {
            index: 2,
            file_name: "b.pdf".into(),
            source: PdfError::NoPages,
        };
        let t = trace(&err);
        assert!(t.starts_with("Extraction"));
        assert!(t.contains("caused by: Document has no pages"));
    }

    #[test]
    fn manifest_blanks_traces_unless_debug() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ErrorLog::new();
        log.record("src.pdf", "split", "extract", &out_of_range());

        let quiet = dir.path().join("quiet.json");
        assert!(log.write_manifest(&quiet, false).unwrap());
        let parsed: Vec<ErrorRecord> =
            serde_json::from_str(&std::fs::read_to_string(&quiet).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].stack_trace, "");
        let raw = std::fs::read_to_string(&quiet).unwrap();
        assert!(raw.contains("\"StackTrace\": \"\""), "{raw}");

        let verbose = dir.path().join("verbose.json");
        log.write_manifest(&verbose, true).unwrap();
        let raw = std::fs::read_to_string(&verbose).unwrap();
        assert!(raw.contains("\"StackTrace\": \"OutOfRange"));
        assert!(raw.contains("\"TimeStamp\""));
        assert!(raw.contains("\"ActiveStep\""));
    }
}
