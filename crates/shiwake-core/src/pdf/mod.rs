//! PDF processing: text-layer reads and page rasterization.

mod extractor;
mod render;

pub use extractor::PdfTextExtractor;
pub use render::PdfiumRasterizer;

use image::DynamicImage;

use crate::error::PdfError;
use crate::models::{Document, ExtractedText};

/// Resolution pages are rendered at before OCR.
pub const RENDER_DPI: u32 = 300;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Outcome of reading a document's embedded text layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLayer {
    /// The text layer had content.
    Present(ExtractedText),
    /// Nothing usable; the document needs OCR.
    Absent(TextGap),
}

/// Why a text layer was not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextGap {
    /// The read succeeded but produced only whitespace.
    Empty,
    /// The reader failed; the message is kept for logging.
    Unreadable(String),
}

impl TextLayer {
    /// Classify extracted text: whitespace-only text counts as absent.
    pub fn from_text(text: ExtractedText) -> Self {
        if text.is_blank() {
            TextLayer::Absent(TextGap::Empty)
        } else {
            TextLayer::Present(text)
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, TextLayer::Present(_))
    }
}

/// Reads the embedded text layer of a PDF.
///
/// Implementations never fail: any reader error becomes
/// [`TextLayer::Absent`].
pub trait TextExtractor {
    fn extract(&self, document: &Document) -> TextLayer;
}

/// Renders PDF pages to bitmaps, in page order.
pub trait Rasterizer {
    fn rasterize(&self, document: &Document) -> Result<Vec<DynamicImage>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory PDFs for tests.

    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a PDF with one page per entry, each showing its lines of text.
    pub fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("TL", vec![16.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            for line in lines.iter() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    /// A PDF with a single blank page and no text layer.
    pub fn blank_pdf() -> Vec<u8> {
        text_pdf(&[&[]])
    }
}
