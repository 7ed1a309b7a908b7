//! Concatenate and make-copies: fold PDF "units" into one merged document.
//!
//! A unit is one source document (concatenate) or one copy of a source
//! (make-copies). When a break title is configured each unit gets an
//! invisible text annotation on its first page before it is merged, so
//! downstream tools can find where each unit starts.

use super::discard;
use crate::error::{ConcatError, PdfError};
use crate::index::ConcatEntry;
use crate::pdf::PdfDocument;
use std::path::Path;
use tracing::{debug, info};

/// Merge `entries` (files in `input_dir`) in order into `output`.
///
/// Each source is deleted once it has been folded in. Returns the merged
/// page count.
pub fn concatenate(
    input_dir: &Path,
    entries: &[ConcatEntry],
    doc_break: Option<&str>,
    output: &Path,
) -> Result<u32, ConcatError> {
    if entries.is_empty() {
        return Err(ConcatError::Empty);
    }
    let mut merged = PdfDocument::empty(output);
    for (i, entry) in entries.iter().enumerate() {
        let position = i + 1;
        let source = input_dir.join(&entry.file_name);
        let unit = PdfDocument::open(&source)
            .map_err(|e| open_error(e, position, &entry.file_name, doc_break))?;
        fold_unit(&mut merged, unit, position, &entry.file_name, doc_break)?;
        discard(&source);
    }
    merged.save(output)?;
    info!(
        "Concatenated {} documents into {} ({} pages)",
        entries.len(),
        output.display(),
        merged.page_count()
    );
    Ok(merged.page_count())
}

/// Merge `copies` copies of `source` into `output`. Returns the merged page count.
pub fn make_copies(
    source: &Path,
    copies: i64,
    doc_break: Option<&str>,
    output: &Path,
) -> Result<u32, ConcatError> {
    if copies < 1 {
        return Err(ConcatError::NoCopies { copies });
    }
    let file_name = super::file_name(source);
    let original =
        PdfDocument::open(source).map_err(|e| open_error(e, 1, &file_name, doc_break))?;
    let mut merged = PdfDocument::empty(output);
    for position in 1..=copies as usize {
        fold_unit(&mut merged, original.clone(), position, &file_name, doc_break)?;
    }
    merged.save(output)?;
    info!(
        "Wrote {} copies of {} ({} pages)",
        copies,
        file_name,
        merged.page_count()
    );
    Ok(merged.page_count())
}

/// An unreadable unit is reported against the first step that needed it.
fn open_error(source: PdfError, position: usize, file_name: &str, doc_break: Option<&str>) -> ConcatError {
    let file_name = file_name.to_string();
    match doc_break {
        Some(_) => ConcatError::Annotation {
            position,
            file_name,
            source,
        },
        None => ConcatError::Merge {
            position,
            file_name,
            source,
        },
    }
}

/// Annotate (optionally) and append one unit.
fn fold_unit(
    merged: &mut PdfDocument,
    mut unit: PdfDocument,
    position: usize,
    file_name: &str,
    doc_break: Option<&str>,
) -> Result<(), ConcatError> {
    if let Some(title) = doc_break {
        unit.add_break_annotation(title, file_name)
            .map_err(|source| ConcatError::Annotation {
                position,
                file_name: file_name.to_string(),
                source,
            })?;
    }
    let pages = merged.append(unit).map_err(|source| ConcatError::Merge {
        position,
        file_name: file_name.to_string(),
        source,
    })?;
    debug!("Merged unit {} ('{}', {} pages)", position, file_name, pages);
    Ok(())
}
