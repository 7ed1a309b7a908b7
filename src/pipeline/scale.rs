//! Scale, shift and rotate pages into a target page size.
//!
//! The transform engine decides what happens to each page; this module only
//! reads page geometry, asks for a [`PagePlan`](crate::geometry::PagePlan)
//! and applies it through [`PdfDocument::place_page`].

use crate::error::ScaleError;
use crate::geometry::{plan_override, PageTransformRequest, PerPageOverride};
use crate::pdf::PdfDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScaleSummary {
    pub pages: u32,
    /// Pages redrawn onto a new page box.
    pub placed: u32,
    /// Pages the trigger (or an override) selected for rotation.
    pub selected: u32,
}

/// Trigger-driven mode: apply `request` to every page of `source`.
pub fn scale_and_rotate(
    source: &Path,
    output: &Path,
    request: &PageTransformRequest,
) -> Result<ScaleSummary, ScaleError> {
    let mut document = PdfDocument::open(source)?;
    let mut summary = ScaleSummary {
        pages: document.page_count(),
        ..ScaleSummary::default()
    };
    for page in 1..=summary.pages {
        let geometry = document.page_geometry(page)?;
        let plan = request.plan(page, &geometry);
        debug!(
            page,
            selected = plan.selected,
            rotation = %plan.placement.rotation,
            "placing page"
        );
        document.place_page(page, plan.target, plan.matrix())?;
        summary.placed += 1;
        if plan.selected {
            summary.selected += 1;
        }
    }
    document.save(output)?;
    info!(
        "{}: {} pages, {} selected ({} trigger, {})",
        source.display(),
        summary.pages,
        summary.selected,
        request.trigger(),
        request.rotation()
    );
    Ok(summary)
}

/// Index-driven mode: apply per-page overrides to the job's single PDF.
///
/// Pages without an override keep their original size and content.
pub fn scale_with_overrides(
    pdfs: &[PathBuf],
    overrides: &[PerPageOverride],
    output_dir: &Path,
) -> Result<(PathBuf, ScaleSummary), ScaleError> {
    let [source] = pdfs else {
        return Err(ScaleError::PdfCount { count: pdfs.len() });
    };
    let mut document = PdfDocument::open(source)?;
    let mut summary = ScaleSummary {
        pages: document.page_count(),
        ..ScaleSummary::default()
    };
    for page in 1..=summary.pages {
        let geometry = document.page_geometry(page)?;
        let Some(plan) = plan_override(page, &geometry, overrides)? else {
            continue;
        };
        document.place_page(page, plan.target, plan.matrix())?;
        summary.placed += 1;
        if plan.selected {
            summary.selected += 1;
        }
    }
    let output = output_dir.join(super::file_name(source));
    document.save(&output)?;
    info!(
        "{}: {} of {} pages placed from {} overrides",
        source.display(),
        summary.placed,
        summary.pages,
        overrides.len()
    );
    Ok((output, summary))
}
