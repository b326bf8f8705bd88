//! Per-document orchestration: text layer first, OCR only when needed.

mod report;

pub use report::{BatchReport, DocumentReport, ExtractionPath, Outcome};

use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::DocumentError;
use crate::invoice::{FieldParser, RuleFieldParser};
use crate::ledger::RowBuilder;
use crate::models::{Document, ExtractedText, OnDocumentError, ShiwakeConfig};
use crate::ocr::{deferred_engine, DeferredEngine, ImagePreprocessor, OcrEngine};
use crate::pdf::{PdfTextExtractor, PdfiumRasterizer, Rasterizer, TextExtractor, TextGap, TextLayer};

/// Pipeline built from configuration with the bundled components.
pub type DefaultPipeline = Pipeline<PdfTextExtractor, PdfiumRasterizer, DeferredEngine>;

/// Turns invoice documents into ledger rows.
///
/// For each document the embedded text layer is read first. Only when it is
/// absent or blank are the pages rasterized, binarized and recognized.
pub struct Pipeline<E, R, O, P = RuleFieldParser> {
    extractor: E,
    rasterizer: R,
    ocr: O,
    parser: P,
    preprocessor: ImagePreprocessor,
    builder: RowBuilder,
}

impl<E, R, O> Pipeline<E, R, O, RuleFieldParser>
where
    E: TextExtractor,
    R: Rasterizer,
    O: OcrEngine,
{
    pub fn new(extractor: E, rasterizer: R, ocr: O) -> Self {
        Self {
            extractor,
            rasterizer,
            ocr,
            parser: RuleFieldParser::new(),
            preprocessor: ImagePreprocessor::new(),
            builder: RowBuilder::new(),
        }
    }
}

impl DefaultPipeline {
    /// Build the pipeline described by `config`. The OCR engine is not
    /// loaded until a document needs it.
    pub fn from_config(config: &ShiwakeConfig) -> Self {
        Pipeline::new(
            PdfTextExtractor::new(),
            PdfiumRasterizer::new().with_library(config.pdf.pdfium_library.clone()),
            deferred_engine(&config.ocr),
        )
    }
}

impl<E, R, O, P> Pipeline<E, R, O, P>
where
    E: TextExtractor,
    R: Rasterizer,
    O: OcrEngine,
    P: FieldParser,
{
    /// Replace the field parser.
    pub fn with_parser<Q: FieldParser>(self, parser: Q) -> Pipeline<E, R, O, Q> {
        Pipeline {
            extractor: self.extractor,
            rasterizer: self.rasterizer,
            ocr: self.ocr,
            parser,
            preprocessor: self.preprocessor,
            builder: self.builder,
        }
    }

    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    /// Process one document into a report holding its row.
    pub fn process(&self, document: &Document) -> Result<DocumentReport, DocumentError> {
        let start = Instant::now();

        let (text, path) = match self.extractor.extract(document) {
            TextLayer::Present(text) => {
                debug!("{}: using text layer ({} bytes)", document.name, text.as_str().len());
                (text, ExtractionPath::TextLayer)
            }
            TextLayer::Absent(gap) => {
                match &gap {
                    TextGap::Empty => debug!("{}: no text layer, falling back to OCR", document.name),
                    TextGap::Unreadable(reason) => warn!(
                        "{}: text layer unreadable ({}), falling back to OCR",
                        document.name, reason
                    ),
                }
                let images = self
                    .rasterizer
                    .rasterize(document)
                    .map_err(|source| DocumentError::Rasterize {
                        document: document.name.clone(),
                        source,
                    })?;
                self.recognize(&document.name, &images)?
            }
        };

        let report = self.finish(document.id.clone(), document.name.clone(), text, path, start);
        info!(
            "{}: {} -> {}/3 fields in {}ms",
            report.name,
            report.path,
            report.fields.found(),
            report.processing_time_ms
        );
        Ok(report)
    }

    /// Process already rasterized pages, skipping the PDF stages.
    pub fn process_images(
        &self,
        name: &str,
        images: &[DynamicImage],
    ) -> Result<DocumentReport, DocumentError> {
        let start = Instant::now();
        let (text, path) = self.recognize(name, images)?;
        Ok(self.finish(name.to_string(), name.to_string(), text, path, start))
    }

    /// Process documents in order. A failed document never stops the batch.
    pub fn process_batch<I>(&self, documents: I, policy: OnDocumentError) -> BatchReport
    where
        I: IntoIterator<Item = Document>,
    {
        let mut batch = BatchReport::new(policy);

        for document in documents {
            let result = self.process(&document);
            if let Err(e) = &result {
                warn!("Skipping {}: {}", e.document(), e);
            }
            batch.record(result);
        }

        info!(
            "Batch done: {} documents, {} text layer, {} OCR, {} failed",
            batch.len(),
            batch.text_layer_count(),
            batch.ocr_count(),
            batch.failed_count()
        );
        batch
    }

    fn recognize(
        &self,
        name: &str,
        images: &[DynamicImage],
    ) -> Result<(ExtractedText, ExtractionPath), DocumentError> {
        let pages = self.preprocessor.preprocess_all(images);
        debug!("{}: preprocessed {} pages", name, pages.len());

        let text = self
            .ocr
            .recognize_pages(&pages)
            .map_err(|source| DocumentError::OcrUnavailable {
                document: name.to_string(),
                source,
            })?;

        Ok((text, ExtractionPath::Ocr { pages: pages.len() }))
    }

    fn finish(
        &self,
        id: String,
        name: String,
        text: ExtractedText,
        path: ExtractionPath,
        start: Instant,
    ) -> DocumentReport {
        let fields = self.parser.parse(text.as_str());
        let row = self.builder.build(&fields);

        DocumentReport {
            id,
            name,
            path,
            text,
            fields,
            row,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
