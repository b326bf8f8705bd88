//! Embedded text-layer extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document as PdfDocument;
use tracing::{debug, trace};

use super::{Result, TextExtractor, TextGap, TextLayer};
use crate::error::PdfError;
use crate::models::{Document, ExtractedText};

/// Text-layer reader.
///
/// lopdf validates the file and removes empty-password encryption,
/// pdf-extract decodes the per-page text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read the text of every page, in page order.
    pub fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        let data = prepare(data)?;

        // pdf-extract panics on some malformed font and encoding tables.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&data)
        }))
        .map_err(|_| PdfError::TextExtraction("text decoder panicked".to_string()))?
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        trace!("Decoded text layer of {} pages", pages.len());
        Ok(pages)
    }
}

/// Load the PDF with lopdf; return bytes pdf-extract can read.
fn prepare(data: &[u8]) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

    if doc.get_pages().is_empty() {
        return Err(PdfError::NoPages);
    }

    if !doc.is_encrypted() {
        return Ok(data.to_vec());
    }

    if doc.decrypt("").is_err() {
        return Err(PdfError::Encrypted);
    }
    debug!("Decrypted PDF with empty password");

    let mut decrypted = Vec::new();
    doc.save_to(&mut decrypted)
        .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
    Ok(decrypted)
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &Document) -> TextLayer {
        match self.page_texts(&document.bytes) {
            Ok(pages) => {
                let pages: Vec<&str> = pages
                    .iter()
                    .map(|p| p.as_str())
                    .filter(|p| !p.trim().is_empty())
                    .collect();
                debug!("{}: {} pages with a text layer", document.name, pages.len());
                TextLayer::from_text(ExtractedText::from_pages(pages))
            }
            Err(e) => {
                debug!("{}: text layer unreadable: {}", document.name, e);
                TextLayer::Absent(TextGap::Unreadable(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{blank_pdf, text_pdf};
    use pretty_assertions::assert_eq;

    fn doc(bytes: Vec<u8>) -> Document {
        Document::new("test", "test.pdf", bytes)
    }

    #[test]
    fn test_text_layer_present() {
        let bytes = text_pdf(&[&["ACME Trading", "2024-03-15"], &["Total 12,345"]]);

        let layer = PdfTextExtractor::new().extract(&doc(bytes));
        let TextLayer::Present(text) = layer else {
            panic!("expected a text layer, got {:?}", layer);
        };

        let text = text.as_str();
        let acme = text.find("ACME Trading").unwrap();
        let total = text.find("12,345").unwrap();
        assert!(acme < total);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_blank_page_is_absent() {
        let layer = PdfTextExtractor::new().extract(&doc(blank_pdf()));
        assert_eq!(layer, TextLayer::Absent(TextGap::Empty));
    }

    #[test]
    fn test_garbage_is_absent_not_error() {
        let layer = PdfTextExtractor::new().extract(&doc(b"definitely not a pdf".to_vec()));
        assert!(matches!(layer, TextLayer::Absent(TextGap::Unreadable(_))));
    }
}
