//! What the pipeline reports per document and per batch.

use serde::Serialize;

use crate::error::DocumentError;
use crate::invoice::ParsedFields;
use crate::ledger::OutputRow;
use crate::models::{ExtractedText, OnDocumentError};

/// How a document's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExtractionPath {
    /// The embedded text layer had content; OCR was skipped.
    TextLayer,
    /// Pages were rasterized and recognized.
    Ocr { pages: usize },
}

impl ExtractionPath {
    pub fn is_ocr(&self) -> bool {
        matches!(self, ExtractionPath::Ocr { .. })
    }
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionPath::TextLayer => f.write_str("text layer"),
            ExtractionPath::Ocr { pages } => write!(f, "OCR ({} pages)", pages),
        }
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Which extraction path produced the text.
    pub path: ExtractionPath,
    /// Text the fields were parsed from.
    pub text: ExtractedText,
    /// Parsed fields.
    pub fields: ParsedFields,
    /// The ledger row.
    pub row: OutputRow,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Per-document outcome within a batch.
#[derive(Debug)]
pub enum Outcome {
    Processed(DocumentReport),
    Failed(DocumentError),
}

/// Outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport {
    policy: OnDocumentError,
    outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn new(policy: OnDocumentError) -> Self {
        Self {
            policy,
            outcomes: Vec::new(),
        }
    }

    /// Append the outcome of the next document.
    pub fn record(&mut self, result: Result<DocumentReport, DocumentError>) {
        self.outcomes.push(match result {
            Ok(report) => Outcome::Processed(report),
            Err(e) => Outcome::Failed(e),
        });
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn policy(&self) -> OnDocumentError {
        self.policy
    }

    /// Ledger rows in input order; failed documents follow the policy.
    pub fn rows(&self) -> Vec<OutputRow> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                Outcome::Processed(report) => Some(report.row.clone()),
                Outcome::Failed(_) => match self.policy {
                    OnDocumentError::Skip => None,
                    OnDocumentError::EmptyRow => Some(OutputRow::empty()),
                },
            })
            .collect()
    }

    pub fn reports(&self) -> impl Iterator<Item = &DocumentReport> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Processed(report) => Some(report),
            Outcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentError> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failed(e) => Some(e),
            Outcome::Processed(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Documents read from their text layer.
    pub fn text_layer_count(&self) -> usize {
        self.reports().filter(|r| !r.path.is_ocr()).count()
    }

    /// Documents that went through OCR.
    pub fn ocr_count(&self) -> usize {
        self.reports().filter(|r| r.path.is_ocr()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}
