//! Error types for the shiwake-core library.

use thiserror::Error;

/// Main error type for the shiwake library.
#[derive(Error, Debug)]
pub enum ShiwakeError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// A single document could not be turned into a row.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The pdfium library could not be bound.
    #[error("pdfium library unavailable: {0}")]
    Library(String),

    /// A page could not be rendered.
    #[error("failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models or language data.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// A failure that stops one document from producing a row.
///
/// Never aborts a batch; the caller decides whether to skip the document or
/// emit an empty row for it.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// No text layer and the pages could not be rasterized.
    #[error("rasterization failed for {document}: {source}")]
    Rasterize {
        document: String,
        #[source]
        source: PdfError,
    },

    /// No text layer and the OCR engine could not be started.
    #[error("OCR unavailable for {document}: {source}")]
    OcrUnavailable {
        document: String,
        #[source]
        source: OcrError,
    },

    /// The document bytes could not be retrieved from its source.
    #[error("failed to fetch {document}: {reason}")]
    Fetch { document: String, reason: String },
}

impl DocumentError {
    /// Identifier of the document that failed.
    pub fn document(&self) -> &str {
        match self {
            DocumentError::Rasterize { document, .. } => document,
            DocumentError::OcrUnavailable { document, .. } => document,
            DocumentError::Fetch { document, .. } => document,
        }
    }
}

/// Errors related to loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required option was not set.
    #[error("missing required option: {0}")]
    Missing(&'static str),
}

/// Result type for the shiwake library.
pub type Result<T> = std::result::Result<T, ShiwakeError>;
