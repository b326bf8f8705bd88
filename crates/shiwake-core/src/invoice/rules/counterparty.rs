//! Counterparty name extraction.

use super::{ExtractionMatch, FieldExtractor};

/// Characters that end a line: `\n`, `\r`, vertical tab, form feed, the
/// file/group/record separators, NEL and the Unicode line and paragraph
/// separators. `\r\n` counts as one break.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_blank_char(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Split text into lines with their byte offsets.
fn line_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        spans.push((start, &text[start..i]));
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }

    if start < text.len() {
        spans.push((start, &text[start..]));
    }
    spans
}

/// Split text into lines on every line-break character.
///
/// Unlike [`str::lines`], a lone `\r` and the Unicode separators also end a
/// line, and a trailing break does not yield an empty last line.
pub fn lines(text: &str) -> Vec<&str> {
    line_spans(text).into_iter().map(|(_, line)| line).collect()
}

/// Counterparty name extractor: the first non-blank line, trimmed.
pub struct CounterpartyExtractor;

impl CounterpartyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CounterpartyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CounterpartyExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        line_spans(text)
            .into_iter()
            .filter_map(|(offset, line)| {
                let trimmed = line.trim_matches(is_blank_char);
                if trimmed.is_empty() {
                    return None;
                }
                let start = offset + (line.len() - line.trim_start_matches(is_blank_char).len());
                Some(ExtractionMatch::new(
                    trimmed.to_string(),
                    trimmed,
                    start,
                    start + trimmed.len(),
                ))
            })
            .collect()
    }
}

/// First non-blank line of the text, trimmed.
pub fn extract_counterparty(text: &str) -> Option<String> {
    CounterpartyExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_line() {
        assert_eq!(
            extract_counterparty("株式会社サンプル\n請求書\n2024-03-15"),
            Some("株式会社サンプル".to_string())
        );
    }

    #[test]
    fn test_skips_blank_lines_and_trims() {
        assert_eq!(
            extract_counterparty("\n   \n\t  ACME Trading Co.  \nInvoice"),
            Some("ACME Trading Co.".to_string())
        );
    }

    #[test]
    fn test_ideographic_space_is_blank() {
        assert_eq!(
            extract_counterparty("\u{3000}\n\u{3000}山田商店\u{3000}\n"),
            Some("山田商店".to_string())
        );
    }

    #[test]
    fn test_all_blank() {
        assert_eq!(extract_counterparty(""), None);
        assert_eq!(extract_counterparty(" \n\r\n\t\n"), None);
    }

    #[test]
    fn test_lines_break_characters() {
        assert_eq!(lines("a\r\nb\rc\u{2028}d\u{0c}e\n"), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(lines(""), Vec::<&str>::new());
    }

    #[test]
    fn test_form_feed_page_boundary() {
        assert_eq!(extract_counterparty("\u{0c}Globex KK\n"), Some("Globex KK".to_string()));
    }

    #[test]
    fn test_match_position() {
        let text = "\n  Initech  \nrest";
        let m = CounterpartyExtractor::new().extract(text).unwrap();
        assert_eq!(&text[m.position.0..m.position.1], "Initech");
    }
}
