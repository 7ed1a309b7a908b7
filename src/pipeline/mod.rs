//! Document operation executors.
//!
//! Each submodule drives exactly one action against the PDF layer. The job
//! runner decides which one runs, feeds it the parsed index or settings, and
//! turns its `Err` into an error record.
//!
//! ## Data Flow
//!
//! ```text
//!             ┌────────────┐
//! input/ ───▶ │  executor  │ ───▶ output/ ───▶ <stem>.zip
//!             └────────────┘
//!                   │
//!            (intermediates stay in the workspace root)
//! ```
//!
//! 1. [`split`]: one PDF, many page-range outputs
//! 2. [`concat`]: many PDFs in index order, one output; also make-copies
//! 3. [`scale`]: per-page placement through the transform engine
//! 4. [`smart_save`]: flatten, strip, size-optimised rewrite
//! 5. [`text`]: one `.txt` per PDF

pub mod concat;
pub mod scale;
pub mod smart_save;
pub mod split;
pub mod text;

use crate::error::ArchiveError;
use crate::pdf::is_pdf;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory layout of one running job.
///
/// ```text
/// <work_dir>/pdfjob-XXXX/     root: config and intermediates
///   ├── input/                extracted archive
///   └── output/               everything that gets packaged
/// ```
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    /// File stem of the job archive; names the index, merged output and manifest.
    pub archive_stem: String,
}

impl Workspace {
    /// Lay out `input/` and `output/` under `root`.
    pub fn create(root: &Path, archive_stem: &str) -> std::io::Result<Self> {
        let ws = Self {
            root: root.to_path_buf(),
            input: root.join("input"),
            output: root.join("output"),
            archive_stem: archive_stem.to_string(),
        };
        std::fs::create_dir_all(&ws.input)?;
        std::fs::create_dir_all(&ws.output)?;
        Ok(ws)
    }

    /// Regular files at the top level of `input/`, sorted by name.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, ArchiveError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.input)
            .map_err(|source| ArchiveError::Io {
                path: self.input.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// The PDFs of the working set.
    pub fn pdfs(&self) -> Result<Vec<PathBuf>, ArchiveError> {
        Ok(self
            .input_files()?
            .into_iter()
            .filter(|p| is_pdf(p))
            .collect())
    }

    /// Move every non-PDF input into `output/` unchanged; returns the PDFs left behind.
    pub fn pass_through_others(&self) -> Result<Vec<PathBuf>, ArchiveError> {
        let (pdfs, others): (Vec<_>, Vec<_>) =
            self.input_files()?.into_iter().partition(|p| is_pdf(p));
        for path in others {
            let Some(name) = path.file_name() else {
                continue;
            };
            let target = self.output.join(name);
            move_file(&path, &target).map_err(|source| ArchiveError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Passed through {}", target.display());
        }
        Ok(pdfs)
    }

    /// `output/<name>`
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output.join(name)
    }
}

/// Rename, falling back to copy + delete across file systems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}

/// `file_stem` as UTF-8, lossily.
pub(crate) fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `file_name` as UTF-8, lossily.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Best-effort removal of a file that must not reach the output.
pub(crate) fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_moves_non_pdfs_only() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::create(dir.path(), "job").unwrap();
        std::fs::write(ws.input.join("a.pdf"), b"%PDF").unwrap();
        std::fs::write(ws.input.join("readme.txt"), b"hi").unwrap();
        std::fs::write(ws.input.join("job.idx"), b"1||a.pdf").unwrap();

        let pdfs = ws.pass_through_others().unwrap();
        assert_eq!(pdfs, vec![ws.input.join("a.pdf")]);
        assert!(ws.output.join("readme.txt").exists());
        assert!(ws.output.join("job.idx").exists());
        assert!(!ws.input.join("readme.txt").exists());
        assert!(!ws.output.join("a.pdf").exists());
    }

    #[test]
    fn pdfs_are_listed_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::create(dir.path(), "job").unwrap();
        for name in ["b.PDF", "a.pdf", "c.txt"] {
            std::fs::write(ws.input.join(name), b"").unwrap();
        }
        std::fs::create_dir(ws.input.join("nested.pdf")).unwrap();
        let names: Vec<String> = ws.pdfs().unwrap().iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn stem_and_name_helpers() {
        let p = Path::new("/tmp/report.final.pdf");
        assert_eq!(stem(p), "report.final");
        assert_eq!(file_name(p), "report.final.pdf");
    }
}
