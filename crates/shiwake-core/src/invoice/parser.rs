//! Rule-based field parser producing the three ledger fields.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{AmountExtractor, CounterpartyExtractor, DateExtractor, FieldExtractor};

/// Fields inferred from one document's text.
///
/// Each field is independently optional; a missing field leaves its ledger
/// cell empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFields {
    /// Transaction date as matched (`2024-03-15`, `2024/3/1`).
    pub date: Option<String>,
    /// Debit amount as a plain digit string.
    pub amount: Option<String>,
    /// Issuing party, the first non-blank line.
    pub counterparty: Option<String>,
}

impl ParsedFields {
    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.amount.is_none() && self.counterparty.is_none()
    }

    /// Number of fields found.
    pub fn found(&self) -> usize {
        [&self.date, &self.amount, &self.counterparty]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// Turns document text into [`ParsedFields`].
pub trait FieldParser {
    fn parse(&self, text: &str) -> ParsedFields;
}

/// Field parser running the date, amount and counterparty rules
/// independently over the whole text.
#[derive(Default)]
pub struct RuleFieldParser {
    dates: DateExtractor,
    amounts: AmountExtractor,
    counterparties: CounterpartyExtractor,
}

impl RuleFieldParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldParser for RuleFieldParser {
    fn parse(&self, text: &str) -> ParsedFields {
        let fields = ParsedFields {
            date: self.dates.extract(text).map(|m| m.value),
            amount: self.amounts.extract(text).map(|m| m.value),
            counterparty: self.counterparties.extract(text).map(|m| m.value),
        };

        debug!(
            "Parsed {}/3 fields: date={:?} amount={:?} counterparty={:?}",
            fields.found(),
            fields.date,
            fields.amount,
            fields.counterparty
        );
        fields
    }
}

impl<P: FieldParser + ?Sized> FieldParser for &P {
    fn parse(&self, text: &str) -> ParsedFields {
        (**self).parse(text)
    }
}

impl<P: FieldParser + ?Sized> FieldParser for Box<P> {
    fn parse(&self, text: &str) -> ParsedFields {
        (**self).parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_japanese_invoice() {
        let text = "株式会社サンプル商事\n\
                    〒100-0001 東京都千代田区\n\
                    請求書\n\
                    発行日 2024-03-15\n\
                    ご請求金額 ¥12,345\n";

        let fields = RuleFieldParser::new().parse(text);
        assert_eq!(
            fields,
            ParsedFields {
                date: Some("2024-03-15".to_string()),
                // The postal code is the first numeral.
                amount: Some("100".to_string()),
                counterparty: Some("株式会社サンプル商事".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_fields_independent() {
        let parser = RuleFieldParser::new();

        let fields = parser.parse("ACME\nTotal 1,234,567");
        assert_eq!(fields.date, None);
        assert_eq!(fields.amount.as_deref(), Some("1234567"));
        assert_eq!(fields.counterparty.as_deref(), Some("ACME"));
        assert_eq!(fields.found(), 2);
    }

    #[test]
    fn test_parse_empty_text() {
        let fields = RuleFieldParser::new().parse("");
        assert!(fields.is_empty());
        assert_eq!(fields, ParsedFields::default());
    }

    #[test]
    fn test_parse_whitespace_only() {
        assert!(RuleFieldParser::new().parse(" \n\t\n").is_empty());
    }

    #[test]
    fn test_dateless_document_still_has_counterparty() {
        let fields = RuleFieldParser::new().parse("\n\n  Globex KK\n請求書");
        assert_eq!(fields.counterparty.as_deref(), Some("Globex KK"));
        assert_eq!(fields.date, None);
        assert_eq!(fields.amount, None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = RuleFieldParser::new();
        let text = "Initech\n2024/3/1\n980";
        assert_eq!(parser.parse(text), parser.parse(text));
    }

    #[test]
    fn test_serialize_fields() {
        let fields = ParsedFields {
            date: Some("2024/3/1".to_string()),
            amount: None,
            counterparty: Some("Initech".to_string()),
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["date"], "2024/3/1");
        assert!(json["amount"].is_null());
    }
}
