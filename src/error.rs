//! Error types for the edgequake-pdfjob library.
//!
//! Errors fall into two groups that mirror the two ways a job can go wrong:
//!
//! * [`JobError`]: **Fatal**: the job cannot run or cannot be torn down
//!   (missing input archive, unusable workspace, cleanup failure). Returned
//!   as `Err(JobError)` from [`crate::job::run_job`]; the CLI maps it to
//!   exit status 1.
//!
//! * Stage errors ([`ConfigError`], [`ValidationError`], [`IndexError`],
//!   [`TransformError`], [`PdfError`], [`SplitError`], [`ConcatError`],
//!   [`ScaleError`], [`SmartSaveError`], [`TextError`], [`ArchiveError`]):
//!   **Recorded**: caught at the boundary of the stage that raised them and
//!   turned into an [`crate::manifest::ErrorRecord`]. The job still packages
//!   its output and exits 0.
//!
//! Every recorded error implements [`ErrorCode`] so the manifest carries a
//! stable machine-readable code next to the human message.

use crate::config::ProcessingAction;
use crate::geometry::TriggerPolicy;
use std::path::PathBuf;
use thiserror::Error;

/// Stable machine-readable code attached to every recorded error.
///
/// Validation failures deliberately report `None`; the manifest serialises
/// that as `"Code": null`.
pub trait ErrorCode {
    fn code(&self) -> Option<&'static str>;
}

// ── Fatal ────────────────────────────────────────────────────────────────

/// Errors that stop the job outright.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job archive passed on the command line does not exist.
    #[error("Input file does not exist: '{path}'")]
    InputNotFound { path: PathBuf },

    /// The per-job workspace could not be created or written.
    #[error("Workspace I/O failed at '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workspace could not be deleted after packaging.
    #[error("Failed to delete workspace '{path}': {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server configuration file is unreadable or malformed.
    #[error("Failed to load server config '{path}': {detail}")]
    ServerConfig { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ── Job preparation ──────────────────────────────────────────────────────

/// The job archive could not be turned into a usable action configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Extraction of the job archive failed.
    #[error("Failed to unpack job archive: {0}")]
    Archive(#[from] ArchiveError),

    /// No `*.config.json` file was found among the extracted entries.
    #[error("No action config (*.config.json) found in '{dir}'")]
    Missing { dir: PathBuf },

    /// The config file exists but could not be read.
    #[error("Failed to read action config '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::ActionConfig`].
    #[error("Action config '{path}' is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            ConfigError::Archive(_) => "config.archive",
            ConfigError::Missing { .. } => "config.missing",
            ConfigError::Unreadable { .. } => "config.io",
            ConfigError::Invalid { .. } => "config.json",
        })
    }
}

/// The action selection in the config is not exactly one action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All processing actions are false. Enable exactly one of Split, Concatenate, MakeCopies, ScaleAndRotate, SmartSave, TextConvert.")]
    NoActionSelected,

    #[error("Only a single action may be selected; the config has {} actions set to true: {}", .actions.len(), join_actions(.actions))]
    MultipleActionsSelected { actions: Vec<ProcessingAction> },
}

impl ErrorCode for ValidationError {
    fn code(&self) -> Option<&'static str> {
        None
    }
}

fn join_actions(actions: &[ProcessingAction]) -> String {
    actions
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(" & ")
}

/// An index file is missing or one of its records is malformed.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index file not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Failed to read index file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index line {line}: {detail}")]
    Malformed { line: usize, detail: String },

    /// A concatenation index names a file that is not in the job.
    #[error("Index entry {counter} references '{file_name}', which is not in the job")]
    MissingEntry { counter: u32, file_name: String },
}

impl ErrorCode for IndexError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            IndexError::NotFound { .. } => "index.missing",
            IndexError::Unreadable { .. } => "index.io",
            IndexError::Malformed { .. } => "index.malformed",
            IndexError::MissingEntry { .. } => "index.entry",
        })
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// A page transform request cannot be honoured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Rotation must be 0, 90, 180 or 270 degrees, got {degrees}")]
    InvalidRotation { degrees: i64 },

    #[error("Rotation of 180 degrees cannot be combined with the {trigger} trigger; orientation triggers only decide whether to turn a page a quarter")]
    HalfTurnWithOrientationTrigger { trigger: TriggerPolicy },

    #[error("Target page size must be positive, got {width} x {height}")]
    InvalidTargetSize { width: f64, height: f64 },

    #[error("Scale factors must not be negative, got {x} x {y}")]
    InvalidScale { x: f64, y: f64 },
}

impl ErrorCode for TransformError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            TransformError::InvalidRotation { .. } => "transform.rotation",
            TransformError::HalfTurnWithOrientationTrigger { .. } => "transform.policy",
            TransformError::InvalidTargetSize { .. } => "transform.size",
            TransformError::InvalidScale { .. } => "transform.scale",
        })
    }
}

// ── PDF layer ────────────────────────────────────────────────────────────

/// Failures reported by the PDF collaborator layer.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The file could not be parsed as a PDF.
    #[error("PDF '{path}' could not be opened: {detail}")]
    Load { path: PathBuf, detail: String },

    /// The document could not be serialised to disk.
    #[error("Failed to write PDF '{path}': {detail}")]
    Save { path: PathBuf, detail: String },

    /// The document carries an `/Encrypt` dictionary and removal was not requested.
    #[error("PDF '{path}' is password protected.\nEnable Settings.SmartSaving.RemovePassword to drop the protection.")]
    PasswordProtected { path: PathBuf },

    /// A page number outside `1..=total` was requested.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    /// The page tree or a page dictionary is not what the PDF format requires.
    #[error("Malformed PDF structure: {0}")]
    Structure(String),

    /// A document with no pages cannot be written.
    #[error("Document has no pages")]
    NoPages,

    /// lopdf rejected an object lookup or edit.
    #[error("PDF object error: {0}")]
    Object(#[from] lopdf::Error),

    /// pdfium failed to extract text from a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtraction { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs the pdfium shared library. You can:\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n"
    )]
    PdfiumBindingFailed(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorCode for PdfError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            PdfError::Load { .. } => "pdf.load",
            PdfError::Save { .. } => "pdf.save",
            PdfError::PasswordProtected { .. } => "pdf.password",
            PdfError::PageOutOfRange { .. } => "pdf.page_range",
            PdfError::Structure(_) => "pdf.structure",
            PdfError::NoPages => "pdf.empty",
            PdfError::Object(_) => "pdf.object",
            PdfError::TextExtraction { .. } => "pdf.text",
            PdfError::PdfiumBindingFailed(_) => "pdf.pdfium",
            PdfError::Io { .. } => "pdf.io",
        })
    }
}

// ── Executors ────────────────────────────────────────────────────────────

/// Failures of the split action.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Split needs exactly one PDF in the job, found {count}")]
    PdfCount { count: usize },

    #[error("Range {index} ('{file_name}') requests pages {first}-{last} but the PDF has {page_count} pages")]
    OutOfRange {
        index: u32,
        file_name: String,
        first: u32,
        last: u32,
        page_count: u32,
    },

    #[error("Range {index} ('{file_name}') is inverted: first page {first} is after last page {last}")]
    InvertedRange {
        index: u32,
        file_name: String,
        first: u32,
        last: u32,
    },

    #[error("Failed to extract range {index} ('{file_name}'): {source}")]
    Extraction {
        index: u32,
        file_name: String,
        #[source]
        source: PdfError,
    },

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

impl ErrorCode for SplitError {
    fn code(&self) -> Option<&'static str> {
        match self {
            SplitError::PdfCount { .. } => Some("split.precondition"),
            SplitError::OutOfRange { .. } => Some("split.range"),
            SplitError::InvertedRange { .. } => Some("split.range"),
            SplitError::Extraction { source, .. } => source.code(),
            SplitError::Pdf(e) => e.code(),
        }
    }
}

/// Failures of the concatenate and make-copies actions.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("Failed to add document break to unit {position} ('{file_name}'): {source}")]
    Annotation {
        position: usize,
        file_name: String,
        #[source]
        source: PdfError,
    },

    #[error("Failed to merge unit {position} ('{file_name}'): {source}")]
    Merge {
        position: usize,
        file_name: String,
        #[source]
        source: PdfError,
    },

    #[error("NumberOfCopies must be at least 1, got {copies}")]
    NoCopies { copies: i64 },

    #[error("Nothing to concatenate: the index lists no documents")]
    Empty,

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

impl ErrorCode for ConcatError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            ConcatError::Annotation { .. } => "concat.annotation",
            ConcatError::Merge { .. } => "concat.merge",
            ConcatError::NoCopies { .. } => "copies.count",
            ConcatError::Empty => "concat.empty",
            ConcatError::Pdf(_) => "concat.write",
        })
    }
}

/// Failures of the scale-and-rotate action.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Index-driven scaling needs exactly one PDF in the job, found {count}")]
    PdfCount { count: usize },
}

impl ErrorCode for ScaleError {
    fn code(&self) -> Option<&'static str> {
        match self {
            ScaleError::Transform(e) => e.code(),
            ScaleError::Pdf(e) => e.code(),
            ScaleError::PdfCount { .. } => Some("scale.precondition"),
        }
    }
}

/// Failures of the smart-save action, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum SmartSaveError {
    #[error("Flattening form fields failed: {0}")]
    Flatten(#[source] PdfError),

    #[error("Stripping annotations failed: {0}")]
    Strip(#[source] PdfError),

    #[error("Optimised write failed: {0}")]
    Write(#[source] PdfError),
}

impl SmartSaveError {
    /// Name of the smart-save step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            SmartSaveError::Flatten(_) => "flatten",
            SmartSaveError::Strip(_) => "strip",
            SmartSaveError::Write(_) => "write",
        }
    }
}

impl ErrorCode for SmartSaveError {
    fn code(&self) -> Option<&'static str> {
        match self {
            SmartSaveError::Flatten(e) | SmartSaveError::Strip(e) | SmartSaveError::Write(e) => {
                e.code()
            }
        }
    }
}

/// Failures of the text-extraction action.
#[derive(Debug, Error)]
pub enum TextError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Failed to write text file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorCode for TextError {
    fn code(&self) -> Option<&'static str> {
        match self {
            TextError::Pdf(e) => e.code(),
            TextError::Write { .. } => Some("text.write"),
        }
    }
}

// ── Archive ──────────────────────────────────────────────────────────────

/// Zip extraction / creation and working-set file handling failures.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry '{name}' is password protected")]
    PasswordProtected { name: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorCode for ArchiveError {
    fn code(&self) -> Option<&'static str> {
        Some(match self {
            ArchiveError::Zip(_) => "archive.zip",
            ArchiveError::PasswordProtected { .. } => "archive.password",
            ArchiveError::Io { .. } => "archive.io",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_actions_display_joins_names() {
        let e = ValidationError::MultipleActionsSelected {
            actions: vec![ProcessingAction::Split, ProcessingAction::SmartSave],
        };
        let msg = e.to_string();
        assert!(msg.contains("Split & SmartSave"), "got: {msg}");
        assert_eq!(e.code(), None);
    }

    #[test]
    fn split_range_display_embeds_page_count() {
        let e = SplitError::OutOfRange {
            index: 2,
            file_name: "part2.pdf".into(),
            first: 10,
            last: 12,
            page_count: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("10-12"), "got: {msg}");
        assert!(msg.contains("has 4 pages"), "got: {msg}");
        assert_eq!(e.code(), Some("split.range"));
    }

    #[test]
    fn concat_errors_carry_position_and_name() {
        let e = ConcatError::Merge {
            position: 3,
            file_name: "c.pdf".into(),
            source: PdfError::NoPages,
        };
        assert!(e.to_string().contains("unit 3"));
        assert!(e.to_string().contains("c.pdf"));
        assert_eq!(e.code(), Some("concat.merge"));
    }

    #[test]
    fn half_turn_policy_display() {
        let e = TransformError::HalfTurnWithOrientationTrigger {
            trigger: TriggerPolicy::XYDiff,
        };
        assert!(e.to_string().contains("XYDiff"));
    }

    #[test]
    fn smart_save_step_names() {
        assert_eq!(SmartSaveError::Flatten(PdfError::NoPages).step(), "flatten");
        assert_eq!(SmartSaveError::Strip(PdfError::NoPages).step(), "strip");
        assert_eq!(SmartSaveError::Write(PdfError::NoPages).step(), "write");
    }
}
