//! Error types for chemtab.
//!
//! Per-row outcomes are data, not errors: a CAS number failing its checksum
//! is a `Validity`, a lookup answering "no entry" is a `RowOutcome`. Only
//! failures of a whole batch operation surface through `ChemtabError`.

use thiserror::Error;

/// Top-level error type for chemtab.
#[derive(Debug, Error)]
pub enum ChemtabError {
    // ═══════════════════════════════════════════════════════════════════
    // Expected failures — bad input, surfaced before any row is touched
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Column not found: '{column}' (available: {available})")]
    ColumnNotFound { column: String, available: String },

    // ═══════════════════════════════════════════════════════════════════
    // External failures — filesystem and the lookup collaborator
    // ═══════════════════════════════════════════════════════════════════

    #[error("Lookup source unreachable: first row failed {attempts} attempts: {last_error}")]
    LookupUnreachable { attempts: u32, last_error: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },
}

impl ChemtabError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a CSV error with context.
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }
}

/// Error returned by a lookup capability for a single key.
///
/// Transient errors leave the row pending (eligible for retry, this run or
/// the next); permanent errors settle the row as failed.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("transient lookup failure: {0}")]
    Transient(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("permanent lookup failure: {0}")]
    Permanent(String),
}

impl LookupError {
    /// Check if this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout(_))
    }
}

/// Result type alias for chemtab.
pub type Result<T> = std::result::Result<T, ChemtabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LookupError::Transient("hiccup".into()).is_transient());
        assert!(LookupError::Timeout(std::time::Duration::from_secs(20)).is_transient());
        assert!(!LookupError::Permanent("malformed key".into()).is_transient());
    }
}
