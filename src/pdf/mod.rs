//! PDF collaborators: structural editing (`lopdf`) and text extraction (`pdfium`).

pub mod document;
pub mod text;

pub use document::PdfDocument;
pub use text::{PageTextExtractor, PdfiumTextExtractor};

use std::path::Path;

/// `true` when the file name ends in `.pdf`, case-insensitively.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf(Path::new("a.pdf")));
        assert!(is_pdf(Path::new("dir/B.PDF")));
        assert!(!is_pdf(Path::new("a.pdf.idx")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
