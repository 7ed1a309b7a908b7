//! Smart-save: flatten forms, strip comments, size-optimised rewrite.
//!
//! ```text
//! source ──flatten?──▶ <stem>.flat.pdf ──strip?──▶ <stem>.annot.pdf ──write──▶ output/<stem>.pdf
//! ```
//!
//! Every step re-opens the previous step's file, so a step that is switched
//! off leaves no intermediate behind and the next step reads the file before.

use crate::config::SmartSaving;
use crate::error::{PdfError, SmartSaveError};
use crate::pdf::PdfDocument;
use std::path::Path;
use tracing::{debug, info};

/// Run the enabled smart-save steps for `source`.
///
/// Intermediates go to `scratch_dir`; the final document goes to `output`.
pub fn smart_save(
    source: &Path,
    scratch_dir: &Path,
    output: &Path,
    settings: SmartSaving,
) -> Result<(), SmartSaveError> {
    let stem = super::stem(source);
    let mut current = source.to_path_buf();

    if settings.flatten_acroforms {
        let target = scratch_dir.join(format!("{stem}.flat.pdf"));
        flatten_step(&current, &target, settings.remove_password).map_err(SmartSaveError::Flatten)?;
        current = target;
    }

    if settings.strip_comments {
        let target = scratch_dir.join(format!("{stem}.annot.pdf"));
        strip_step(&current, &target, settings.remove_password).map_err(SmartSaveError::Strip)?;
        current = target;
    }

    let mut document = open(&current, settings.remove_password).map_err(SmartSaveError::Write)?;
    document.save_optimized(output).map_err(SmartSaveError::Write)?;
    info!(
        "Smart-saved {} -> {}",
        source.display(),
        output.display()
    );
    Ok(())
}

fn open(path: &Path, remove_password: bool) -> Result<PdfDocument, PdfError> {
    let mut document = PdfDocument::open(path)?;
    document.ensure_unprotected(remove_password)?;
    Ok(document)
}

fn flatten_step(from: &Path, to: &Path, remove_password: bool) -> Result<(), PdfError> {
    let mut document = open(from, remove_password)?;
    let widgets = document.flatten_form_fields()?;
    document.save(to)?;
    debug!("Flattened {} widgets into {}", widgets, to.display());
    Ok(())
}

fn strip_step(from: &Path, to: &Path, remove_password: bool) -> Result<(), PdfError> {
    let mut document = open(from, remove_password)?;
    let removed = document.strip_annotations_and_outlines()?;
    document.save(to)?;
    debug!("Stripped {} annotations into {}", removed, to.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::sample_document;
    use std::path::PathBuf;

    fn settings(flatten: bool, strip: bool, remove_password: bool) -> SmartSaving {
        SmartSaving {
            strip_comments: strip,
            flatten_acroforms: flatten,
            remove_password,
        }
    }

    fn annotated_pdf(dir: &Path) -> PathBuf {
        let path = dir.join("report.pdf");
        let mut doc = PdfDocument::from_lopdf(sample_document(2, 612.0, 792.0), &path);
        doc.add_break_annotation("note", "a comment").unwrap();
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn steps_write_intermediates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = annotated_pdf(dir.path());
        let output = dir.path().join("final.pdf");

        smart_save(&source, dir.path(), &output, settings(true, true, false)).unwrap();
        assert!(dir.path().join("report.flat.pdf").exists());
        assert!(dir.path().join("report.annot.pdf").exists());
        assert_eq!(PdfDocument::open(&output).unwrap().page_count(), 2);
    }

    #[test]
    fn disabled_steps_leave_no_intermediate() {
        let dir = tempfile::tempdir().unwrap();
        let source = annotated_pdf(dir.path());
        let output = dir.path().join("final.pdf");

        smart_save(&source, dir.path(), &output, settings(false, true, false)).unwrap();
        assert!(!dir.path().join("report.flat.pdf").exists());
        assert!(dir.path().join("report.annot.pdf").exists());
    }

    #[test]
    fn failures_name_the_step_that_broke() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.pdf");
        std::fs::write(&source, b"not a pdf").unwrap();
        let output = dir.path().join("out.pdf");

        let err = smart_save(&source, dir.path(), &output, settings(true, true, false)).unwrap_err();
        assert_eq!(err.step(), "flatten");
        assert!(matches!(err, SmartSaveError::Flatten(PdfError::Load { .. })));

        let err = smart_save(&source, dir.path(), &output, settings(false, false, false)).unwrap_err();
        assert_eq!(err.step(), "write");
        assert!(!output.exists());
    }
}
