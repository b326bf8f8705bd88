//! Core library for turning invoice PDFs into journal-ledger rows.
//!
//! This crate provides:
//! - PDF processing (text-layer reads, 300 DPI rasterization via pdfium)
//! - OCR over binarized pages with a Japanese + Latin language profile
//! - Rule-based extraction of transaction date, amount and counterparty
//! - The 44-column ledger schema and row construction
//! - The per-document pipeline that ties these together

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{DocumentError, Result, ShiwakeError};
pub use invoice::{FieldParser, ParsedFields, RuleFieldParser};
pub use ledger::{Column, OutputRow, RowBuilder, COLUMN_COUNT};
pub use models::{Document, ExtractedText, OnDocumentError, ShiwakeConfig};
pub use ocr::{create_engine, ImagePreprocessor, OcrEngine, PageImage};
pub use pdf::{PdfTextExtractor, PdfiumRasterizer, Rasterizer, TextExtractor, TextLayer};
pub use pipeline::{BatchReport, DefaultPipeline, DocumentReport, ExtractionPath, Pipeline};
