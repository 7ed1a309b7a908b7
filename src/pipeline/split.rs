//! Split one PDF into page-range outputs.
//!
//! Whole-action isolation: if any range fails, every file this call already
//! wrote is removed before the error is returned.

use super::discard;
use crate::error::SplitError;
use crate::index::SplitRange;
use crate::pdf::PdfDocument;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Split the single PDF in `pdfs` into `ranges`, writing each under `out_dir`.
///
/// Returns the written paths in index order.
pub fn split(pdfs: &[PathBuf], ranges: &[SplitRange], out_dir: &Path) -> Result<Vec<PathBuf>, SplitError> {
    let [source] = pdfs else {
        return Err(SplitError::PdfCount { count: pdfs.len() });
    };
    let document = PdfDocument::open(source)?;

    let mut written = Vec::with_capacity(ranges.len());
    if let Err(e) = write_ranges(&document, ranges, out_dir, &mut written) {
        for path in &written {
            discard(path);
        }
        return Err(e);
    }
    info!(
        "Split {} into {} files",
        source.display(),
        written.len()
    );
    Ok(written)
}

fn write_ranges(
    document: &PdfDocument,
    ranges: &[SplitRange],
    out_dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<(), SplitError> {
    let page_count = document.page_count();
    for range in ranges {
        check_range(range, page_count)?;
        let extraction = |source| SplitError::Extraction {
            index: range.counter,
            file_name: range.file_name.clone(),
            source,
        };
        let mut part = document
            .extract_range(range.first, range.last)
            .map_err(extraction)?;
        let path = out_dir.join(&range.file_name);
        part.save(&path).map_err(extraction)?;
        debug!(
            "Range {} pages {}-{} -> {}",
            range.counter,
            range.first,
            range.last,
            path.display()
        );
        written.push(path);
    }
    Ok(())
}

fn check_range(range: &SplitRange, page_count: u32) -> Result<(), SplitError> {
    if range.first == 0 || range.first > page_count || range.last > page_count {
        return Err(SplitError::OutOfRange {
            index: range.counter,
            file_name: range.file_name.clone(),
            first: range.first,
            last: range.last,
            page_count,
        });
    }
    if range.first > range.last {
        return Err(SplitError::InvertedRange {
            index: range.counter,
            file_name: range.file_name.clone(),
            first: range.first,
            last: range.last,
        });
    }
    Ok(())
}
