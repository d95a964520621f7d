//! Resume state for batch enrichment.
//!
//! The output table itself is the resume artifact: every settled row's
//! outcome is encoded in its value cell, and a later run rebuilds its state
//! from that table. Invariants:
//! - a row is Pending (empty cell) or settled (Resolved / NotFound / Failed)
//! - settled outcomes survive resume unchanged; only pending rows are
//!   eligible for another lookup
//! - the table on disk is replaced atomically (write-then-rename), so an
//!   interruption never leaves a half-written artifact

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::{ChemtabError, KeyNormalization, Result, Table};

/// Terminal outcome recorded for one row key.
///
/// Cell encoding: `NOT_FOUND`, `ERROR: <reason>`, anything else non-empty is
/// a resolved value. Enrichment values in this domain (database ids, counts,
/// status labels) never collide with the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The source answered with a value
    Resolved(String),
    /// The source answered: no entry. Final, never retried on resume.
    NotFound,
    /// The key can never resolve (e.g. malformed); recorded so the row does
    /// not block forward progress
    Failed(String),
}

impl RowOutcome {
    pub const NOT_FOUND_MARKER: &'static str = "NOT_FOUND";
    pub const ERROR_PREFIX: &'static str = "ERROR: ";

    /// Encode the outcome as an output-table cell.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Resolved(value) => value.clone(),
            Self::NotFound => Self::NOT_FOUND_MARKER.to_string(),
            Self::Failed(reason) => format!("{}{}", Self::ERROR_PREFIX, reason),
        }
    }

    /// Decode a cell back into an outcome. Empty cells are pending rows.
    pub fn from_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }
        if cell == Self::NOT_FOUND_MARKER {
            return Some(Self::NotFound);
        }
        if let Some(reason) = cell.strip_prefix(Self::ERROR_PREFIX) {
            return Some(Self::Failed(reason.to_string()));
        }
        Some(Self::Resolved(cell.to_string()))
    }
}

/// Per-kind totals over a state's settled rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Settled outcomes keyed by normalized row key.
///
/// Keys absent from the map are pending. Duplicate keys in the input table
/// share one entry, so a substance listed twice costs one lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentState {
    entries: HashMap<String, RowOutcome>,
}

impl EnrichmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The settled outcome for a key, if any.
    pub fn get(&self, key: &str) -> Option<&RowOutcome> {
        self.entries.get(key)
    }

    /// Whether the key has a terminal outcome.
    pub fn is_settled(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Record a terminal outcome for a key.
    pub fn record(&mut self, key: &str, outcome: RowOutcome) {
        self.entries.insert(key.to_string(), outcome);
    }

    /// Merge another state into this one. Settled outcomes win over pending;
    /// where both states settled a key, this state's entry is kept (the
    /// newer run wins).
    pub fn merge(&mut self, prior: EnrichmentState) {
        for (key, outcome) in prior.entries {
            self.entries.entry(key).or_insert(outcome);
        }
    }

    /// Rebuild state from a prior output table.
    ///
    /// The key column must exist. A missing value column means the prior
    /// output predates this enrichment and nothing was settled.
    pub fn from_table(
        table: &Table,
        key_column: &str,
        value_column: &str,
        normalization: KeyNormalization,
    ) -> Result<Self> {
        let key_idx = table.column_index(key_column)?;
        let value_idx = match table.column_index(value_column) {
            Ok(idx) => idx,
            Err(ChemtabError::ColumnNotFound { .. }) => {
                warn!(
                    column = value_column,
                    "Prior output has no value column, starting fresh"
                );
                return Ok(Self::new());
            }
            Err(e) => return Err(e),
        };

        let mut state = Self::new();
        for row in table.rows() {
            let raw = row.get(key_idx).map(String::as_str).unwrap_or("");
            let key = normalization.apply(raw);
            let cell = row.get(value_idx).map(String::as_str).unwrap_or("");
            if let Some(outcome) = RowOutcome::from_cell(cell) {
                state.entries.insert(key, outcome);
            }
        }
        Ok(state)
    }

    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for outcome in self.entries.values() {
            match outcome {
                RowOutcome::Resolved(_) => counts.resolved += 1,
                RowOutcome::NotFound => counts.not_found += 1,
                RowOutcome::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }
}

/// Atomic persistence of the enrichment output table.
pub struct ProgressStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: &Path) -> Self {
        let mut temp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");
        Self {
            path: path.to_path_buf(),
            temp_path: path.with_file_name(temp_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the prior output table, if one exists.
    pub fn load(&self) -> Result<Option<Table>> {
        if !self.exists() {
            return Ok(None);
        }
        Ok(Some(Table::read_csv(&self.path)?))
    }

    /// Persist the table atomically: write a temp file, then rename over the
    /// target, so readers only ever see a complete artifact.
    pub fn save(&self, table: &Table) -> Result<()> {
        table.write_csv(&self.temp_path)?;
        fs::rename(&self.temp_path, &self.path)
            .map_err(|e| ChemtabError::io("replacing progress file", e))?;
        debug!(path = %self.path.display(), rows = table.len(), "Progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cell_encoding_round_trip() {
        for outcome in [
            RowOutcome::Resolved("HMDB0001859".to_string()),
            RowOutcome::NotFound,
            RowOutcome::Failed("malformed key".to_string()),
        ] {
            assert_eq!(RowOutcome::from_cell(&outcome.to_cell()), Some(outcome));
        }
        assert_eq!(RowOutcome::from_cell(""), None);
        assert_eq!(RowOutcome::from_cell("   "), None);
    }

    #[test]
    fn merge_prefers_newer_entries() {
        let mut newer = EnrichmentState::new();
        newer.record("50-00-0", RowOutcome::Resolved("HMDB0001426".to_string()));

        let mut prior = EnrichmentState::new();
        prior.record("50-00-0", RowOutcome::NotFound);
        prior.record("7732-18-5", RowOutcome::Resolved("HMDB0002111".to_string()));

        newer.merge(prior);
        assert_eq!(
            newer.get("50-00-0"),
            Some(&RowOutcome::Resolved("HMDB0001426".to_string()))
        );
        assert_eq!(
            newer.get("7732-18-5"),
            Some(&RowOutcome::Resolved("HMDB0002111".to_string()))
        );
    }

    #[test]
    fn state_round_trips_through_table() {
        let mut table = Table::new(vec!["CAS".to_string(), "hmdb_id".to_string()]);
        table.push_row(vec!["50-00-0".to_string(), "HMDB0001426".to_string()]);
        table.push_row(vec!["123-45-6".to_string(), "NOT_FOUND".to_string()]);
        table.push_row(vec!["bogus".to_string(), "ERROR: malformed key".to_string()]);
        table.push_row(vec!["7732-18-5".to_string(), String::new()]);

        let state =
            EnrichmentState::from_table(&table, "CAS", "hmdb_id", KeyNormalization::Trimmed)
                .unwrap();

        assert_eq!(state.len(), 3);
        assert!(state.is_settled("50-00-0"));
        assert_eq!(state.get("123-45-6"), Some(&RowOutcome::NotFound));
        assert_eq!(
            state.get("bogus"),
            Some(&RowOutcome::Failed("malformed key".to_string()))
        );
        assert!(!state.is_settled("7732-18-5"));

        let counts = state.counts();
        assert_eq!(counts.resolved, 1);
        assert_eq!(counts.not_found, 1);
        assert_eq!(counts.failed, 1);
    }

    #[test]
    fn missing_value_column_means_fresh_state() {
        let mut table = Table::new(vec!["CAS".to_string()]);
        table.push_row(vec!["50-00-0".to_string()]);

        let state =
            EnrichmentState::from_table(&table, "CAS", "hmdb_id", KeyNormalization::Trimmed)
                .unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn store_saves_atomically_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enriched.csv");
        let store = ProgressStore::new(&path);

        assert!(store.load().unwrap().is_none());

        let mut table = Table::new(vec!["CAS".to_string(), "hmdb_id".to_string()]);
        table.push_row(vec!["50-00-0".to_string(), "HMDB0001426".to_string()]);
        store.save(&table).unwrap();

        assert!(!dir.path().join("enriched.csv.tmp").exists());
        assert_eq!(store.load().unwrap(), Some(table));
    }
}
