//! Regex grammars for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Numeric date, year first: 2024-03-15, 2024/3/1, 2024-3/01.
    // No calendar validation.
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\d{4}[/-]\d{1,2}[/-]\d{1,2}"
    ).unwrap();

    // Whole-unit amount with optional comma grouping: 980, 12,345, 1,234,567.
    pub static ref GROUPED_AMOUNT: Regex = Regex::new(
        r"[0-9]{1,3}(?:,[0-9]{3})*"
    ).unwrap();
}
