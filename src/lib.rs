//! chemtab - CAS Registry Number validation and resumable enrichment of
//! chemical datasets.
//!
//! ## Architecture
//!
//! Two independent components, applied to the same kind of input (a CSV
//! table keyed by a chemical identifier column):
//! - **Validator**: checksum validation of CAS Registry Numbers, single or
//!   batch (`cas`)
//! - **Enricher**: per-row external lookup with interruption/resume
//!   semantics (`enrich`, driven by a `LookupService`)
//!
//! ## Resumability
//!
//! The enricher's output CSV doubles as its resume artifact: settled rows
//! encode their outcome in the value column, pending rows stay empty, and a
//! later run rebuilds its state from the file and only fetches what is
//! still pending. Progress is persisted atomically, so an interrupted run
//! loses at most the last partial batch.

pub mod cas;
pub mod checkpoint;
pub mod enrich;
pub mod lookup;
pub mod models;

// Re-exports for convenience
pub use cas::{CasNumber, Finding, Screening, Validity, check_digit, find_invalid, validate};
pub use checkpoint::{EnrichmentState, ProgressStore, RowOutcome, StateCounts};
pub use enrich::{EnrichOptions, EnrichOutcome, Enricher, RunStats};
pub use lookup::{LookupOutcome, LookupService, Pacer, TableLookup};
pub use models::{ChemtabError, Config, ConfigError, KeyNormalization, LookupError, Result, Table};
