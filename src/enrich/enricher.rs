//! Resumable batch enrichment of a table column.
//!
//! Row lifecycle: Pending -> (Resolved | NotFound | Failed). Only pending
//! rows cost a lookup call; the other outcomes are terminal and survive
//! resume unchanged, so re-running against a prior output is idempotent.
//! Rows are processed one at a time in input order; the lookup call is the
//! only suspension point.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::checkpoint::{EnrichmentState, ProgressStore, RowOutcome};
use crate::lookup::{LookupOutcome, LookupService, Pacer};
use crate::models::{ChemtabError, Config, LookupError, Result, Table};

/// Options for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Column holding the per-row lookup key; never mutated
    pub key_column: String,
    /// Column to create (or fill) with the lookup results
    pub value_column: String,
}

/// Statistics for one enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub total_rows: usize,
    /// Rows reused from the prior state with zero lookup calls
    pub reused: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
    /// Rows left pending after exhausting retries; retried next run
    pub unresolved: usize,
    pub lookup_calls: u64,
    pub runtime_secs: f64,
}

impl RunStats {
    fn new(total_rows: usize) -> Self {
        Self {
            started_at: Utc::now(),
            total_rows,
            reused: 0,
            resolved: 0,
            not_found: 0,
            failed: 0,
            unresolved: 0,
            lookup_calls: 0,
            runtime_secs: 0.0,
        }
    }
}

/// Result of one enrichment run.
#[derive(Debug)]
pub struct EnrichOutcome {
    /// The input table plus the populated value column
    pub table: Table,
    /// Final state; feed it (or the persisted table) into the next run
    pub state: EnrichmentState,
    pub stats: RunStats,
}

/// Result of the bounded retry loop for one key.
enum Attempt {
    Settled(RowOutcome),
    Exhausted(LookupError),
}

/// Applies a lookup capability to every pending row of a table.
pub struct Enricher<'a, L> {
    lookup: &'a L,
    config: &'a Config,
    pacer: Pacer,
}

impl<'a, L: LookupService> Enricher<'a, L> {
    pub fn new(lookup: &'a L, config: &'a Config) -> Self {
        Self {
            lookup,
            config,
            pacer: Pacer::new(Duration::from_millis(config.lookup.request_delay_ms)),
        }
    }

    /// Run enrichment over the table.
    ///
    /// Rows whose key is already settled in `prior` are reused without a
    /// lookup call. When a store is given, progress is persisted after every
    /// `persist_every` newly settled rows and once at the end, atomically.
    ///
    /// Fails with `LookupUnreachable` if the first attempted row exhausts
    /// its retries before the source has answered anything this run; later
    /// transient exhaustion leaves the row pending instead.
    pub async fn run(
        &mut self,
        table: &Table,
        options: &EnrichOptions,
        prior: EnrichmentState,
        store: Option<&ProgressStore>,
    ) -> Result<EnrichOutcome> {
        let run_id = Uuid::new_v4();
        let key_idx = table.column_index(&options.key_column)?;

        let mut out = table.clone();
        let value_idx = out.add_column(&options.value_column);

        let normalization = self.config.lookup.normalization;
        let persist_every = self.config.enrich.persist_every.max(1);

        let mut state = prior;
        let mut stats = RunStats::new(out.len());
        let start = Instant::now();

        info!(
            run_id = %run_id,
            rows = out.len(),
            source = self.lookup.name(),
            prior_settled = state.len(),
            "Starting enrichment"
        );

        let pb = ProgressBar::new(out.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        let mut contacted = false;
        let mut settled_since_persist = 0usize;

        for i in 0..out.len() {
            let raw = out.cell(i, key_idx).unwrap_or("").to_string();
            let key = normalization.apply(&raw);

            if let Some(outcome) = state.get(&key) {
                out.set_cell(i, value_idx, outcome.to_cell());
                stats.reused += 1;
                pb.inc(1);
                continue;
            }

            let outcome = if key.is_empty() {
                // An empty identifier can never resolve; settle it so the
                // row does not block forward progress.
                Some(RowOutcome::Failed("empty identifier".to_string()))
            } else {
                match self.attempt(&key, &mut stats).await {
                    Attempt::Settled(outcome) => {
                        contacted = true;
                        Some(outcome)
                    }
                    Attempt::Exhausted(last) => {
                        if !contacted {
                            pb.abandon();
                            return Err(ChemtabError::LookupUnreachable {
                                attempts: self.config.lookup.max_retries.max(1),
                                last_error: last.to_string(),
                            });
                        }
                        warn!(row = i, key = %key, error = %last, "Retries exhausted, row left pending");
                        stats.unresolved += 1;
                        None
                    }
                }
            };

            if let Some(outcome) = outcome {
                match &outcome {
                    RowOutcome::Resolved(_) => stats.resolved += 1,
                    RowOutcome::NotFound => stats.not_found += 1,
                    RowOutcome::Failed(_) => stats.failed += 1,
                }
                out.set_cell(i, value_idx, outcome.to_cell());
                state.record(&key, outcome);

                settled_since_persist += 1;
                if settled_since_persist >= persist_every {
                    if let Some(store) = store {
                        store.save(&out)?;
                    }
                    settled_since_persist = 0;
                }
            }

            pb.set_message(format!(
                "resolved: {}, not found: {}",
                stats.resolved, stats.not_found
            ));
            pb.inc(1);
        }

        if let Some(store) = store {
            store.save(&out)?;
        }

        pb.finish_with_message(format!(
            "Done! {} resolved, {} not found, {} pending",
            stats.resolved + stats.reused,
            stats.not_found,
            stats.unresolved
        ));

        stats.runtime_secs = start.elapsed().as_secs_f64();

        info!(
            reused = stats.reused,
            resolved = stats.resolved,
            not_found = stats.not_found,
            failed = stats.failed,
            unresolved = stats.unresolved,
            lookup_calls = stats.lookup_calls,
            "Enrichment complete"
        );

        Ok(EnrichOutcome {
            table: out,
            state,
            stats,
        })
    }

    /// Look one key up with bounded retries. Transient failures back off and
    /// retry; a definitive answer (value, not-found, or permanent failure)
    /// settles the key.
    async fn attempt(&mut self, key: &str, stats: &mut RunStats) -> Attempt {
        let timeout_after = Duration::from_secs(self.config.lookup.timeout_secs);
        let attempts = self.config.lookup.max_retries.max(1);
        let mut last = LookupError::Transient("no attempts were made".to_string());

        for attempt in 0..attempts {
            self.pacer.pause().await;
            stats.lookup_calls += 1;

            let result = match timeout(timeout_after, self.lookup.lookup(key)).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout(timeout_after)),
            };

            match result {
                Ok(LookupOutcome::Found(value)) => {
                    self.pacer.record_success();
                    return Attempt::Settled(RowOutcome::Resolved(value));
                }
                Ok(LookupOutcome::NotFound) => {
                    self.pacer.record_success();
                    return Attempt::Settled(RowOutcome::NotFound);
                }
                Err(e) if e.is_transient() => {
                    self.pacer.record_failure();
                    debug!(key, attempt, error = %e, "Transient lookup failure");
                    last = e;
                }
                Err(e) => {
                    // A permanent failure is still a definitive answer.
                    self.pacer.record_success();
                    return Attempt::Settled(RowOutcome::Failed(e.to_string()));
                }
            }
        }

        Attempt::Exhausted(last)
    }
}
