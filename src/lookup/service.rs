//! The external lookup capability consumed by the enricher.

use crate::models::LookupError;

/// Successful answer from a lookup source for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The source has a value for this key
    Found(String),
    /// The source definitively has no entry for this key. This is a final
    /// answer, not an error; it is never retried on resume.
    NotFound,
}

/// A keyed external data source.
///
/// Implementations answer one key at a time; transport is out of scope.
/// Failures are classified by the implementation: `Transient` for anything
/// a later attempt might fix, `Permanent` for keys that can never resolve.
#[allow(async_fn_in_trait)]
pub trait LookupService {
    /// Source name, used in logs and run summaries.
    fn name(&self) -> &str;

    /// Look up a single key.
    async fn lookup(&self, key: &str) -> Result<LookupOutcome, LookupError>;
}
