//! Page text extraction via pdfium.
//!
//! `lopdf` can decode content streams but has no layout model; pdfium
//! produces reading-order text for real-world fonts and encodings. The
//! binding is resolved once per job and shared across every PDF in it.

use crate::error::PdfError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of per-page plain text for a PDF file.
///
/// Implemented by [`PdfiumTextExtractor`]; tests inject their own.
pub trait PageTextExtractor: Send + Sync {
    /// One entry per page, in page order.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, PdfError>;
}

/// [`PageTextExtractor`] backed by a bound pdfium library.
pub struct PdfiumTextExtractor {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfiumTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumTextExtractor").finish_non_exhaustive()
    }
}

impl PdfiumTextExtractor {
    /// Bind to pdfium.
    ///
    /// Resolution order: `library` if given, then `PDFIUM_LIB_PATH`, then a
    /// library in the working directory, then the system library path.
    pub fn bind(library: Option<&Path>) -> Result<Self, PdfError> {
        let env_path = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
        let explicit = library.map(Path::to_path_buf).or(env_path);

        let bindings = match explicit {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path)
                    .map_err(|e| PdfError::PdfiumBindingFailed(format!("{}: {e}", path.display())))?
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| PdfError::PdfiumBindingFailed(e.to_string()))?,
        };
        info!("pdfium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageTextExtractor for PdfiumTextExtractor {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, PdfError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PdfError::Load {
                path: path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

        let mut texts = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let text = page.text().map_err(|e| PdfError::TextExtraction {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;
            texts.push(text.all());
        }
        debug!("Extracted text from {} pages of {}", texts.len(), path.display());
        Ok(texts)
    }
}
