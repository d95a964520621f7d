//! Resumable batch enrichment.
//!
//! Flow: table rows -> (reuse settled outcome | paced lookup with bounded
//! retries) -> output column + updated state -> incremental atomic persist.

mod enricher;

pub use enricher::*;
