//! Rule-based field extractors for invoice text.
//!
//! Every rule is a pure function of the whole text and reports the
//! leftmost match of its grammar, or nothing.

pub mod amounts;
pub mod counterparty;
pub mod dates;
pub mod patterns;

pub use amounts::{extract_amount, strip_group_separators, AmountExtractor};
pub use counterparty::{extract_counterparty, lines, CounterpartyExtractor};
pub use dates::{extract_date, normalize_date, DateExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text (leftmost occurrence).
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, left to right.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in the text, with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: (usize, usize),
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value,
            position: (start, end),
            source: source.into(),
        }
    }
}
