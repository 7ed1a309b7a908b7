//! Plain-text extraction: one `<stem>.txt` per PDF.
//!
//! Each page is introduced by a marker line so downstream tools can map text
//! back to pages:
//!
//! ```text
//!
//! ||P0000000001||
//!
//! first page text
//! ```

use crate::error::TextError;
use crate::pdf::PageTextExtractor;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// The block written for one page. `number` is 1-indexed.
pub fn page_block(number: usize, text: &str) -> String {
    format!("\n||P{number:010}||\n\n{text}\n")
}

/// Extract `source` into `output_dir/<stem>.txt`.
///
/// The text is gathered before the file is created, so an extraction failure
/// never leaves a partial output behind.
pub fn convert_to_text(
    source: &Path,
    output_dir: &Path,
    extractor: &dyn PageTextExtractor,
) -> Result<PathBuf, TextError> {
    let pages = extractor.page_texts(source)?;
    let output = output_dir.join(format!("{}.txt", super::stem(source)));

    let write_error = |source| TextError::Write {
        path: output.clone(),
        source,
    };
    let file = std::fs::File::create(&output).map_err(write_error)?;
    let mut writer = std::io::BufWriter::new(file);
    for (i, text) in pages.iter().enumerate() {
        writer
            .write_all(page_block(i + 1, text).as_bytes())
            .map_err(write_error)?;
    }
    writer.flush().map_err(write_error)?;

    info!("Extracted {} pages from {}", pages.len(), source.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;

    struct Fixed(Vec<&'static str>);

    impl PageTextExtractor for Fixed {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, PdfError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    impl PageTextExtractor for Failing {
        fn page_texts(&self, _path: &Path) -> Result<Vec<String>, PdfError> {
            Err(PdfError::TextExtraction {
                page: 2,
                detail: "bad font".into(),
            })
        }
    }

    #[test]
    fn page_marker_is_zero_padded() {
        assert_eq!(page_block(1, "hello"), "\n||P0000000001||\n\nhello\n");
        assert_eq!(page_block(1234, ""), "\n||P0000001234||\n\n\n");
    }

    #[test]
    fn writes_one_block_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let out = convert_to_text(
            &dir.path().join("report.pdf"),
            dir.path(),
            &Fixed(vec!["one", "two"]),
        )
        .unwrap();
        assert_eq!(out, dir.path().join("report.txt"));
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "\n||P0000000001||\n\none\n\n||P0000000002||\n\ntwo\n"
        );
    }

    #[test]
    fn extraction_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_to_text(&dir.path().join("report.pdf"), dir.path(), &Failing).unwrap_err();
        assert!(matches!(err, TextError::Pdf(PdfError::TextExtraction { page: 2, .. })));
        assert!(!dir.path().join("report.txt").exists());
    }
}
