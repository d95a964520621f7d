//! Checkpoint module for resumable enrichment runs.
//!
//! Provides:
//! - `RowOutcome`: the terminal outcome of one row, and its cell encoding
//! - `EnrichmentState`: settled outcomes keyed by row key, with the merge
//!   rule "settled wins, pending retries"
//! - `ProgressStore`: atomic persistence of the output table

mod state;

pub use state::*;
