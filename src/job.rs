//! Job orchestration: unpack, select, execute, package.
//!
//! ## Why one sequential runner?
//!
//! A job touches a handful of documents that all live in one workspace, and
//! every stage depends on the one before it. Running the stages in order on
//! a single thread keeps the failure policy simple: once anything has been
//! recorded in the [`ErrorLog`], no later processing stage starts, while
//! packaging always runs.
//!
//! ```text
//!  archive.zip
//!      │ unpack + load *.config.json        (ConfigError)
//!      ▼
//!  select_action                            (ValidationError)
//!      │
//!      ▼
//!  one executor ── per file ──► output/     (PerFile / WholeAction errors)
//!      │
//!      ▼
//!  <stem>.error.json? ─► <stem>.zip ─► out_dir/    always
//!      │
//!      ▼
//!  delete workspace                         (JobError::Cleanup)
//! ```

use crate::archive;
use crate::config::{Action, ActionConfig, JobConfig, ProcessingAction, ScaleAndRotateSettings, SmartSaving};
use crate::error::{ConfigError, ErrorCode, JobError, PdfError, SmartSaveError};
use crate::geometry::{PageSize, PageTransformRequest};
use crate::index;
use crate::manifest::{ErrorLog, ErrorRecord};
use crate::pdf::{PageTextExtractor, PdfiumTextExtractor};
use crate::pipeline::{concat, discard, file_name, scale, smart_save, split, stem, text, Workspace};
use crate::progress::{JobProgressCallback, NoopProgressCallback};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one job, returned whenever the job ran to the end.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub archive: PathBuf,
    /// `None` when the job failed before an action was selected.
    pub action: Option<ProcessingAction>,
    /// Final location of `<stem>.zip`; `None` if packaging failed.
    pub output_archive: Option<PathBuf>,
    /// Whether `<stem>.error.json` was written into the output archive.
    pub manifest_written: bool,
    /// Documents the executor finished without error.
    pub files_processed: usize,
    pub errors: Vec<ErrorRecord>,
    pub duration_ms: u64,
}

impl JobReport {
    /// `true` when no error was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run one job archive end to end.
///
/// # Errors
/// Only fatal conditions are returned as `Err`:
/// - the archive does not exist
/// - the workspace cannot be created
/// - the workspace cannot be deleted afterwards
///
/// Every other failure is recorded in the report (and in the manifest inside
/// the output archive).
pub fn run_job(archive: &Path, config: &JobConfig) -> Result<JobReport, JobError> {
    let started = Instant::now();
    if !archive.is_file() {
        return Err(JobError::InputNotFound {
            path: archive.to_path_buf(),
        });
    }
    let archive_stem = stem(archive);
    info!("Starting job {}", archive.display());

    // ── Step 1: Create workspace ─────────────────────────────────────────
    std::fs::create_dir_all(&config.work_dir).map_err(|source| JobError::Workspace {
        path: config.work_dir.clone(),
        source,
    })?;
    let temp = tempfile::Builder::new()
        .prefix("pdfjob-")
        .tempdir_in(&config.work_dir)
        .map_err(|source| JobError::Workspace {
            path: config.work_dir.clone(),
            source,
        })?;
    let workspace = Workspace::create(temp.path(), &archive_stem).map_err(|source| {
        JobError::Workspace {
            path: temp.path().to_path_buf(),
            source,
        }
    })?;
    debug!("Workspace at {}", workspace.root.display());

    let noop: Arc<dyn JobProgressCallback> = Arc::new(NoopProgressCallback);
    let mut job = Job {
        archive_name: file_name(archive),
        workspace,
        config,
        progress: config.progress_callback.clone().unwrap_or(noop),
        log: ErrorLog::new(),
        files_processed: 0,
    };

    // ── Step 2: Unpack and load the action config ────────────────────────
    let action_config = job.unpack(archive);

    // ── Step 3: Select the action ────────────────────────────────────────
    let action = match action_config {
        Some(ref c) if job.log.is_clean() => job.select(c),
        _ => None,
    };

    // ── Step 4: Run the executor ─────────────────────────────────────────
    match action {
        Some(ref action) if job.log.is_clean() => job.execute(action),
        _ => debug!("Skipping execution: {} errors recorded", job.log.len()),
    }

    // ── Step 5: Manifest and packaging ───────────────────────────────────
    let debug_traces = action_config.as_ref().is_some_and(|c| c.enable_debug);
    let manifest_written = job.write_manifest(debug_traces);
    let output_archive = job.package();
    job.progress.on_job_complete(job.log.len());

    let report = JobReport {
        archive: archive.to_path_buf(),
        action: action.as_ref().map(Action::kind),
        output_archive,
        manifest_written,
        files_processed: job.files_processed,
        errors: job.log.records().to_vec(),
        duration_ms: started.elapsed().as_millis() as u64,
    };

    // ── Step 6: Delete workspace ─────────────────────────────────────────
    let root = temp.path().to_path_buf();
    temp.close()
        .map_err(|source| JobError::Cleanup { path: root, source })?;

    info!(
        "Job {} finished in {}ms: {} processed, {} errors",
        report.archive.display(),
        report.duration_ms,
        report.files_processed,
        report.errors.len()
    );
    Ok(report)
}

/// State of one running job.
struct Job<'a> {
    /// Archive file name; used as `FileName` of job-level error records.
    archive_name: String,
    workspace: Workspace,
    config: &'a JobConfig,
    progress: Arc<dyn JobProgressCallback>,
    log: ErrorLog,
    files_processed: usize,
}

impl Job<'_> {
    /// Record a failure that concerns the job as a whole.
    fn record_job_error<E: Error + ErrorCode>(&mut self, module: &str, step: &str, err: &E) {
        let name = self.archive_name.clone();
        self.log.record(&name, module, step, err);
    }

    // ── Preparation ──────────────────────────────────────────────────────

    fn unpack(&mut self, archive: &Path) -> Option<ActionConfig> {
        match self.try_unpack(archive) {
            Ok(config) => Some(config),
            Err(e) => {
                let module = match e {
                    ConfigError::Archive(_) => "archive",
                    _ => "config",
                };
                self.record_job_error(module, "unpack", &e);
                None
            }
        }
    }

    /// Extract the archive, then load the action config and move it out of
    /// the working set.
    fn try_unpack(&self, archive: &Path) -> Result<ActionConfig, ConfigError> {
        let entries = archive::extract(archive, &self.workspace.input)?;
        debug!("Extracted {} entries", entries.len());

        let path = ActionConfig::find_in(&self.workspace.input)?;
        let config = ActionConfig::load(&path)?;
        let parked = self.workspace.root.join(file_name(&path));
        std::fs::rename(&path, &parked)
            .map_err(|source| ConfigError::Unreadable { path, source })?;
        Ok(config)
    }

    fn select(&mut self, config: &ActionConfig) -> Option<Action> {
        match config.select_action() {
            Ok(action) => {
                info!("Selected action {}", action.kind());
                Some(action)
            }
            Err(e) => {
                self.record_job_error("selector", "validate", &e);
                None
            }
        }
    }

    // ── Execution ────────────────────────────────────────────────────────

    fn execute(&mut self, action: &Action) {
        match action {
            Action::Split => self.run_split(),
            Action::Concatenate { doc_break } => self.run_concatenate(doc_break.as_deref()),
            Action::MakeCopies { copies, doc_break } => {
                self.run_copies(*copies, doc_break.as_deref())
            }
            Action::ScaleAndRotate { target, settings } => self.run_scale(*target, settings),
            Action::SmartSave(settings) => self.run_smart_save(*settings),
            Action::TextConvert => self.run_text(),
        }
    }

    /// Read `<stem>.idx` from the input directory.
    fn read_index(&mut self) -> Option<String> {
        let path = index::index_path(&self.workspace.input, &self.workspace.archive_stem);
        match index::read_index(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                self.record_job_error("index", "index", &e);
                None
            }
        }
    }

    /// List the working-set PDFs, recording a listing failure.
    fn list_pdfs(&mut self) -> Option<Vec<PathBuf>> {
        match self.workspace.pdfs() {
            Ok(pdfs) => Some(pdfs),
            Err(e) => {
                self.record_job_error("archive", "list", &e);
                None
            }
        }
    }

    /// Move non-PDF inputs to the output; returns the PDFs to process.
    fn pass_through(&mut self) -> Option<Vec<PathBuf>> {
        match self.workspace.pass_through_others() {
            Ok(pdfs) => Some(pdfs),
            Err(e) => {
                self.record_job_error("archive", "passthrough", &e);
                None
            }
        }
    }

    fn run_split(&mut self) {
        let Some(text) = self.read_index() else { return };
        let ranges = match index::parse_split(&text) {
            Ok(ranges) => ranges,
            Err(e) => return self.record_job_error("index", "index", &e),
        };
        let Some(pdfs) = self.list_pdfs() else { return };
        self.progress.on_job_start(ProcessingAction::Split.name(), pdfs.len());

        match split::split(&pdfs, &ranges, &self.workspace.output) {
            Ok(written) => {
                self.files_processed += 1;
                debug!("Split wrote {} files", written.len());
            }
            Err(e) => {
                let name = pdfs.first().map(|p| file_name(p)).unwrap_or_default();
                self.log.record(&name, "split", "split", &e);
            }
        }
    }

    fn run_concatenate(&mut self, doc_break: Option<&str>) {
        let Some(text) = self.read_index() else { return };
        let parsed = index::parse_concat(&text)
            .and_then(|entries| index::verify_entries(&self.workspace.input, &entries).map(|_| entries));
        let entries = match parsed {
            Ok(entries) => entries,
            Err(e) => return self.record_job_error("index", "index", &e),
        };
        self.progress
            .on_job_start(ProcessingAction::Concatenate.name(), entries.len());

        let output = self
            .workspace
            .output_path(&format!("{}.pdf", self.workspace.archive_stem));
        match concat::concatenate(&self.workspace.input, &entries, doc_break, &output) {
            Ok(_) => self.files_processed += entries.len(),
            Err(e) => {
                discard(&output);
                self.record_job_error("concat", "concatenate", &e);
            }
        }
    }

    fn run_copies(&mut self, copies: i64, doc_break: Option<&str>) {
        let Some(pdfs) = self.pass_through() else { return };
        let output_dir = self.workspace.output.clone();
        self.per_file(
            ProcessingAction::MakeCopies,
            &pdfs,
            "copies",
            |_| "copy",
            |source| output_dir.join(format!("{}.pdf", stem(source))),
            |source, output| concat::make_copies(source, copies, doc_break, output).map(|_| ()),
        );
    }

    fn run_scale(&mut self, target: PageSize, settings: &ScaleAndRotateSettings) {
        let idx = index::index_path(&self.workspace.input, &self.workspace.archive_stem);
        if idx.is_file() {
            return self.run_scale_indexed(&idx);
        }

        let request = PageTransformRequest::new(
            target,
            settings.scale(),
            settings.shift(),
            settings.degrees_rotation,
            settings.trigger,
        );
        let request = match request {
            Ok(request) => request,
            Err(e) => return self.record_job_error("scale", "transform", &e),
        };
        let Some(pdfs) = self.pass_through() else { return };
        let output_dir = self.workspace.output.clone();
        self.per_file(
            ProcessingAction::ScaleAndRotate,
            &pdfs,
            "scale",
            |_| "scale",
            |source| output_dir.join(file_name(source)),
            |source, output| scale::scale_and_rotate(source, output, &request).map(|_| ()),
        );
    }

    /// Index-driven scaling: the `.idx` is consumed, not passed through.
    fn run_scale_indexed(&mut self, idx: &Path) {
        let Some(text) = self.read_index() else { return };
        let overrides = match index::parse_overrides(&text) {
            Ok(overrides) => overrides,
            Err(e) => return self.record_job_error("index", "index", &e),
        };
        discard(idx);
        let Some(pdfs) = self.pass_through() else { return };
        self.progress
            .on_job_start(ProcessingAction::ScaleAndRotate.name(), pdfs.len());

        match scale::scale_with_overrides(&pdfs, &overrides, &self.workspace.output) {
            Ok((output, summary)) => {
                self.files_processed += 1;
                debug!(
                    "Index-driven scale wrote {} ({} of {} pages placed)",
                    output.display(),
                    summary.placed,
                    summary.pages
                );
            }
            Err(e) => {
                if let [source] = pdfs.as_slice() {
                    discard(&self.workspace.output.join(file_name(source)));
                }
                self.record_job_error("scale", "scale", &e);
            }
        }
    }

    fn run_smart_save(&mut self, settings: SmartSaving) {
        let Some(pdfs) = self.pass_through() else { return };
        let scratch = self.workspace.root.clone();
        let output_dir = self.workspace.output.clone();
        self.per_file(
            ProcessingAction::SmartSave,
            &pdfs,
            "smartsave",
            |e: &SmartSaveError| e.step(),
            |source| output_dir.join(file_name(source)),
            |source, output| smart_save::smart_save(source, &scratch, output, settings),
        );
    }

    fn run_text(&mut self) {
        let extractor = match self.text_extractor() {
            Ok(extractor) => extractor,
            Err(e) => return self.record_job_error("text", "bind", &e),
        };
        let Some(pdfs) = self.pass_through() else { return };
        let output_dir = self.workspace.output.clone();
        self.per_file(
            ProcessingAction::TextConvert,
            &pdfs,
            "text",
            |_| "extract",
            |source| output_dir.join(format!("{}.txt", stem(source))),
            |source, _| text::convert_to_text(source, &output_dir, extractor.as_ref()).map(|_| ()),
        );
    }

    /// The injected extractor, or pdfium bound for this job.
    fn text_extractor(&self) -> Result<Arc<dyn PageTextExtractor>, PdfError> {
        if let Some(ref extractor) = self.config.text_extractor {
            return Ok(Arc::clone(extractor));
        }
        let pdfium = PdfiumTextExtractor::bind(self.config.pdfium_library.as_deref())?;
        Ok(Arc::new(pdfium))
    }

    /// Per-file isolation: a failing document is recorded and its output
    /// discarded, then the loop moves on. Every input is deleted afterwards.
    fn per_file<E, O, R>(
        &mut self,
        action: ProcessingAction,
        pdfs: &[PathBuf],
        module: &str,
        step: fn(&E) -> &'static str,
        output_for: O,
        mut run: R,
    ) where
        E: Error + ErrorCode,
        O: Fn(&Path) -> PathBuf,
        R: FnMut(&Path, &Path) -> Result<(), E>,
    {
        let total = pdfs.len();
        self.progress.on_job_start(action.name(), total);
        for (i, source) in pdfs.iter().enumerate() {
            let index = i + 1;
            let name = file_name(source);
            let output = output_for(source);
            self.progress.on_file_start(&name, index, total);

            match run(source, &output) {
                Ok(()) => {
                    self.files_processed += 1;
                    self.progress.on_file_complete(&name, index, total);
                }
                Err(e) => {
                    self.log.record(&name, module, step(&e), &e);
                    self.progress.on_file_error(&name, index, total, &e.to_string());
                    discard(&output);
                }
            }
            discard(source);
        }
    }

    // ── Packaging ────────────────────────────────────────────────────────

    fn write_manifest(&self, debug_traces: bool) -> bool {
        let path = self
            .workspace
            .output_path(&format!("{}.error.json", self.workspace.archive_stem));
        match self.log.write_manifest(&path, debug_traces) {
            Ok(written) => written,
            Err(e) => {
                warn!("Could not write error manifest {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Zip `output/` and copy the archive to the output directory.
    ///
    /// Packaging failures are logged only; there is nowhere left to record them.
    fn package(&self) -> Option<PathBuf> {
        let zip_name = format!("{}.zip", self.workspace.archive_stem);
        let staged = self.workspace.root.join(&zip_name);
        if let Err(e) = archive::create(&self.workspace.output, &staged) {
            warn!("Could not package {}: {}", staged.display(), e);
            return None;
        }

        let out_dir = &self.config.out_dir;
        let target = out_dir.join(&zip_name);
        let copied = std::fs::create_dir_all(out_dir).and_then(|_| std::fs::copy(&staged, &target));
        match copied {
            Ok(_) => {
                info!("Wrote {}", target.display());
                Some(target)
            }
            Err(e) => {
                warn!("Could not copy {} to {}: {}", staged.display(), out_dir.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_archive_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig::builder().out_dir(dir.path()).build().unwrap();
        let err = run_job(&dir.path().join("nope.zip"), &config).unwrap_err();
        assert!(matches!(err, JobError::InputNotFound { .. }));
    }

    #[test]
    fn unreadable_archive_is_recorded_and_still_packaged() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();
        let out = dir.path().join("out");
        let config = JobConfig::builder()
            .out_dir(&out)
            .work_dir(dir.path().join("work"))
            .build()
            .unwrap();

        let report = run_job(&archive, &config).unwrap();
        assert_eq!(report.action, None);
        assert!(report.manifest_written);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].module, "archive");
        assert_eq!(report.errors[0].active_step, "unpack");
        assert_eq!(report.output_archive, Some(out.join("broken.zip")));
        assert!(out.join("broken.zip").exists());
        assert_eq!(
            std::fs::read_dir(dir.path().join("work")).unwrap().count(),
            0,
            "workspace is removed"
        );
    }
}
