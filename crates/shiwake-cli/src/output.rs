//! Ledger CSV writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use shiwake_core::ledger::{Column, OutputRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the schema header, then one record per row.
pub struct LedgerWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl LedgerWriter<File> {
    /// Create `path` with a UTF-8 BOM so spreadsheets pick the encoding.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(File::create(path)?, true)
    }
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(mut writer: W, bom: bool) -> anyhow::Result<Self> {
        if bom {
            writer.write_all(UTF8_BOM)?;
        }

        let mut inner = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        inner.write_record(Column::header())?;

        Ok(Self { inner })
    }

    pub fn write_row(&mut self, row: &OutputRow) -> anyhow::Result<()> {
        self.inner.write_record(row.cells())?;
        Ok(())
    }

    pub fn write_rows<'a, I>(&mut self, rows: I) -> anyhow::Result<usize>
    where
        I: IntoIterator<Item = &'a OutputRow>,
    {
        let mut count = 0;
        for row in rows {
            self.write_row(row)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Render rows as CSV text without a BOM.
pub fn to_csv_string<'a, I>(rows: I) -> anyhow::Result<String>
where
    I: IntoIterator<Item = &'a OutputRow>,
{
    let mut buffer = Vec::new();
    {
        let mut writer = LedgerWriter::new(&mut buffer, false)?;
        writer.write_rows(rows)?;
        writer.finish()?;
    }
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shiwake_core::ledger::COLUMN_COUNT;

    #[test]
    fn test_file_has_bom_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ledger.csv");

        let mut row = OutputRow::empty();
        row.set(Column::TransactionDate, "2024/03/15");
        row.set(Column::CounterpartyName, "株式会社サンプル");

        let mut writer = LedgerWriter::create(&path).unwrap();
        writer.write_row(&row).unwrap();
        writer.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("月日,伝票番号,証憑番号,"));
        assert_eq!(lines[0].split(',').count(), COLUMN_COUNT);

        let cells: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[0], "2024/03/15");
        assert_eq!(cells[34], "株式会社サンプル");
    }

    #[test]
    fn test_header_only() {
        let csv = to_csv_string(std::iter::empty()).unwrap();
        assert!(csv.starts_with("月日,"));
        assert!(csv.ends_with("内訳区分名\r\n"));
    }

    #[test]
    fn test_commas_are_quoted() {
        let mut row = OutputRow::empty();
        row.set(Column::CounterpartyName, "ACME, Inc.");

        let csv = to_csv_string([&row]).unwrap();
        assert!(csv.contains("\"ACME, Inc.\""));
    }
}
