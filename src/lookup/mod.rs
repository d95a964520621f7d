//! Lookup capability layer.
//!
//! Provides:
//! - `LookupService`: the abstract key -> value capability the enricher
//!   consumes
//! - `TableLookup`: a reference-CSV-backed implementation
//! - `Pacer`: delay and backoff between lookup calls

mod pacer;
mod service;
mod table_source;

pub use pacer::*;
pub use service::*;
pub use table_source::*;
