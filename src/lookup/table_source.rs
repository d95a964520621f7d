//! Reference-table lookup source.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::lookup::{LookupOutcome, LookupService};
use crate::models::{KeyNormalization, LookupError, Result, Table};

/// Lookup backed by a reference CSV of key/value pairs.
///
/// Keys are normalized with the same policy the enricher applies to row
/// keys, so the two sides always agree. When the reference lists a key more
/// than once, the last occurrence wins: a correction appended to the file
/// overrides the original entry. Rows with an empty value cell are treated
/// as absent.
#[derive(Debug)]
pub struct TableLookup {
    name: String,
    entries: HashMap<String, String>,
}

impl TableLookup {
    /// Build from an in-memory reference table.
    pub fn from_table(
        name: impl Into<String>,
        table: &Table,
        key_column: &str,
        value_column: &str,
        normalization: KeyNormalization,
    ) -> Result<Self> {
        let key_idx = table.column_index(key_column)?;
        let value_idx = table.column_index(value_column)?;

        let mut entries = HashMap::with_capacity(table.len());
        for row in table.rows() {
            let key = normalization.apply(row.get(key_idx).map(String::as_str).unwrap_or(""));
            let value = row.get(value_idx).map(String::as_str).unwrap_or("").trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            entries.insert(key, value.to_string());
        }

        Ok(Self {
            name: name.into(),
            entries,
        })
    }

    /// Load a reference CSV from disk.
    pub fn from_csv(
        path: &Path,
        key_column: &str,
        value_column: &str,
        normalization: KeyNormalization,
    ) -> Result<Self> {
        let table = Table::read_csv(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference".to_string());
        let source = Self::from_table(name, &table, key_column, value_column, normalization)?;
        info!(
            source = %source.name,
            entries = source.len(),
            "Loaded reference table"
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LookupService for TableLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &str) -> std::result::Result<LookupOutcome, LookupError> {
        match self.entries.get(key) {
            Some(value) => Ok(LookupOutcome::Found(value.clone())),
            None => Ok(LookupOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Table {
        let mut t = Table::new(vec!["key".to_string(), "value".to_string()]);
        t.push_row(vec!["50-00-0".to_string(), "HMDB0001426".to_string()]);
        t.push_row(vec!["'7732-18-5'".to_string(), "HMDB0002111".to_string()]);
        t.push_row(vec!["64-17-5".to_string(), String::new()]);
        t.push_row(vec!["50-00-0".to_string(), "HMDB0001859".to_string()]);
        t
    }

    #[tokio::test]
    async fn found_and_not_found() {
        let source = TableLookup::from_table(
            "hmdb",
            &reference(),
            "key",
            "value",
            KeyNormalization::Trimmed,
        )
        .unwrap();

        assert_eq!(
            source.lookup("7732-18-5").await.unwrap(),
            LookupOutcome::Found("HMDB0002111".to_string())
        );
        assert_eq!(
            source.lookup("80-05-7").await.unwrap(),
            LookupOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn later_rows_override_and_empty_values_are_absent() {
        let source = TableLookup::from_table(
            "hmdb",
            &reference(),
            "key",
            "value",
            KeyNormalization::Trimmed,
        )
        .unwrap();

        assert_eq!(
            source.lookup("50-00-0").await.unwrap(),
            LookupOutcome::Found("HMDB0001859".to_string())
        );
        assert_eq!(
            source.lookup("64-17-5").await.unwrap(),
            LookupOutcome::NotFound
        );
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn missing_reference_column_fails() {
        let err = TableLookup::from_table(
            "hmdb",
            &reference(),
            "cas",
            "value",
            KeyNormalization::Trimmed,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::models::ChemtabError::ColumnNotFound { .. }
        ));
    }
}
