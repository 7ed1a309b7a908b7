//! # edgequake-pdfjob
//!
//! Single-action batch jobs over PDF documents delivered as zip archives.
//!
//! ## Why this crate?
//!
//! Print and document-handling back offices receive work as bundles: a zip
//! with a few PDFs, a JSON file saying what to do with them, and sometimes an
//! index that spells out page ranges or per-page geometry. This crate runs
//! one such bundle end to end and always hands back a result archive. Files
//! that fail are reported in an error manifest next to the ones that worked
//! instead of aborting the whole job.
//!
//! ## Pipeline Overview
//!
//! ```text
//! job.zip
//!  │
//!  ├─ 1. Unpack    extract into a per-job workspace, load *.config.json
//!  ├─ 2. Select    exactly one of six actions must be enabled
//!  ├─ 3. Execute   Split | Concatenate | MakeCopies | ScaleAndRotate
//!  │               | SmartSave | TextConvert
//!  ├─ 4. Manifest  <stem>.error.json when anything failed
//!  └─ 5. Package   <stem>.zip copied to the output directory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfjob::{run_job, JobConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig::builder()
//!         .out_dir("/srv/pdfjob/out")
//!         .work_dir("/srv/pdfjob/work")
//!         .build()?;
//!     let report = run_job(Path::new("incoming/batch-0042.zip"), &config)?;
//!     eprintln!(
//!         "{} files processed, {} errors",
//!         report.files_processed,
//!         report.errors.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfjob` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-pdfjob = { version = "0.1", default-features = false }
//! ```
//!
//! ## Actions
//!
//! | Action | Input | Output |
//! |--------|-------|--------|
//! | `Split` | one PDF + `<stem>.idx` ranges | one PDF per range |
//! | `Concatenate` | PDFs + `<stem>.idx` order | `<stem>.pdf` |
//! | `MakeCopies` | PDFs | `<source>.pdf` with N copies each |
//! | `ScaleAndRotate` | PDFs, or one PDF + per-page `<stem>.idx` | same names, new page geometry |
//! | `SmartSave` | PDFs | flattened, stripped, compressed PDFs |
//! | `TextConvert` | PDFs | `<source>.txt` |
//!
//! Text extraction binds the pdfium shared library at runtime; every other
//! action works on the document structure directly.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod job;
pub mod manifest;
pub mod pdf;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    Action, ActionConfig, JobConfig, JobConfigBuilder, ProcessingAction, ServerConfig,
};
pub use error::{
    ArchiveError, ConcatError, ConfigError, ErrorCode, IndexError, JobError, PdfError,
    ScaleError, SmartSaveError, SplitError, TextError, TransformError, ValidationError,
};
pub use geometry::{PageSize, PageTransformRequest, Rotation, TriggerPolicy};
pub use job::{run_job, JobReport};
pub use manifest::{ErrorLog, ErrorRecord};
pub use pdf::{PageTextExtractor, PdfDocument, PdfiumTextExtractor};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
