//! Ledger rows and the builder that fills them from parsed fields.

use serde::ser::{Serialize, Serializer};
use tracing::trace;

use super::schema::{Column, COLUMN_COUNT};
use crate::invoice::rules::normalize_date;
use crate::invoice::ParsedFields;

/// One ledger row: a cell per [`Column`], empty unless set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: [String; COLUMN_COUNT],
}

impl OutputRow {
    /// A row with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: std::array::from_fn(|_| String::new()),
        }
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells[column.index()] = value.into();
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    /// Cells in header order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Columns with a non-empty value, in header order.
    pub fn filled(&self) -> impl Iterator<Item = (Column, &str)> {
        Column::ALL
            .into_iter()
            .map(move |c| (c, self.get(c)))
            .filter(|(_, v)| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

impl Default for OutputRow {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.iter())
    }
}

/// Maps [`ParsedFields`] onto the ledger schema.
///
/// Only the transaction date, debit amount and counterparty name are
/// filled; account codes and tax treatment are left for manual entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct RowBuilder;

impl RowBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, fields: &ParsedFields) -> OutputRow {
        let mut row = OutputRow::empty();

        if let Some(date) = &fields.date {
            row.set(Column::TransactionDate, normalize_date(date));
        }
        if let Some(amount) = &fields.amount {
            row.set(Column::DebitAmount, amount.as_str());
        }
        if let Some(counterparty) = &fields.counterparty {
            row.set(Column::CounterpartyName, counterparty.as_str());
        }

        trace!("Built row with {} filled cells", row.filled().count());
        row
    }
}
