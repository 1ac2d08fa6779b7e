//! Plain CSV tables.
//!
//! Cells are kept as the text that was read so payload values are written
//! back unchanged. Only the time column is ever interpreted.

use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// A header row plus string records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Locate the time column: the first header containing "time" or "stamp"
    /// (any case), else the exact `fallback` name.
    pub fn find_time_column(&self, fallback: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| {
                let lower = h.to_lowercase();
                lower.contains("time") || lower.contains("stamp")
            })
            .or_else(|| self.column_index(fallback))
    }

    /// Cells of one column, in row order. Short rows yield empty cells.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

/// Read a headed CSV file.
pub fn read_table(path: &Path) -> Result<Table, csv::Error> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// Write a table as CSV, replacing any existing file.
pub fn write_table(path: &Path, table: &Table) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
