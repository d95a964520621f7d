//! Tabular data model shared by the validator and the enricher.
//!
//! A `Table` is an ordered set of named columns over rows of string cells,
//! read from and written to CSV. Column presence is checked once at the
//! entry point of each batch operation; rows are normalized to the header
//! width on insert so per-row code never sees a ragged row.

use std::path::Path;

use crate::models::{ChemtabError, Result};

/// An in-memory table of named string columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Create an empty table with this table's headers.
    ///
    /// The result is an explicitly-empty table: callers can distinguish
    /// "screened, nothing found" from "never screened".
    pub fn empty_like(&self) -> Self {
        Self::new(self.headers.clone())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (headers excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name to its index.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ChemtabError::ColumnNotFound {
                column: name.to_string(),
                available: self.headers.join(", "),
            })
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Get a cell by row and column index.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Overwrite a cell. Out-of-range indices are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if let Some(r) = self.rows.get_mut(row) {
            if let Some(c) = r.get_mut(col) {
                *c = value;
            }
        }
    }

    /// Index of the named column, adding it (with empty cells) if absent.
    pub fn add_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.headers.iter().position(|h| h == name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Read a table from a CSV file. The first record is the header row.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| ChemtabError::csv(format!("opening {}", path.display()), e))?;

        let headers = reader
            .headers()
            .map_err(|e| ChemtabError::csv(format!("reading headers of {}", path.display()), e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record
                .map_err(|e| ChemtabError::csv(format!("reading {}", path.display()), e))?;
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    /// Write the table to a CSV file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| ChemtabError::csv(format!("creating {}", path.display()), e))?;

        writer
            .write_record(&self.headers)
            .map_err(|e| ChemtabError::csv(format!("writing headers of {}", path.display()), e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| ChemtabError::csv(format!("writing {}", path.display()), e))?;
        }
        writer
            .flush()
            .map_err(|e| ChemtabError::io(format!("flushing {}", path.display()), e))
    }
}
