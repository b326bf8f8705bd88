//! Transaction date extraction.

use super::patterns::DATE_YMD;
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Grammar: four digits, `/` or `-`, one or two digits, `/` or `-`, one or
/// two digits. The matched text is kept verbatim.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_YMD
            .find(text)
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.as_str(), m.start(), m.end()))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_YMD
            .find_iter(text)
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.as_str(), m.start(), m.end()))
            .collect()
    }
}

/// First year-first numeric date in the text, verbatim.
pub fn extract_date(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Ledger date form: every `-` becomes `/`. No zero-padding.
pub fn normalize_date(date: &str) -> String {
    date.replace('-', "/")
}
