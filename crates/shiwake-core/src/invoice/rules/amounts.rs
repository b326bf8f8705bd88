//! Debit amount extraction.

use super::patterns::GROUPED_AMOUNT;
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor.
///
/// Matches whole-unit numerals with optional comma grouping. There is no
/// currency anchoring, so the first numeral in the text wins.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        GROUPED_AMOUNT.find(text).map(|m| {
            ExtractionMatch::new(strip_group_separators(m.as_str()), m.as_str(), m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        GROUPED_AMOUNT
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(strip_group_separators(m.as_str()), m.as_str(), m.start(), m.end())
            })
            .collect()
    }
}

/// Drop thousands separators: `1,234,567` -> `1234567`.
pub fn strip_group_separators(numeral: &str) -> String {
    numeral.chars().filter(|c| *c != ',').collect()
}

/// First grouped numeral in the text as a plain digit string.
pub fn extract_amount(text: &str) -> Option<String> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}
