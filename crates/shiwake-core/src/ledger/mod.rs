//! Journal-ledger output: the column schema and row construction.

mod row;
mod schema;

pub use row::{OutputRow, RowBuilder};
pub use schema::{Column, COLUMN_COUNT};
