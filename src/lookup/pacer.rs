//! Request pacing for the lookup stream.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Longest backoff between calls, regardless of failure streak.
const MAX_BACKOFF_SECS: f64 = 60.0;

/// Paces lookup calls: a fixed floor delay between requests (external
/// sources rate-limit rapid successive queries), plus exponential backoff
/// that grows while the source keeps failing transiently and resets on the
/// first definitive answer.
#[derive(Debug)]
pub struct Pacer {
    min_delay: Duration,
    consecutive_failures: u32,
    last_call: Option<Instant>,
}

impl Pacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            consecutive_failures: 0,
            last_call: None,
        }
    }

    /// Sleep until the next call is allowed, then mark the call as made.
    pub async fn pause(&mut self) {
        let delay = self.current_delay();
        if let Some(last) = self.last_call {
            let since = last.elapsed();
            if since < delay {
                let wait = delay - since;
                debug!(wait_ms = wait.as_millis() as u64, "Pacing lookup call");
                tokio::time::sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }

    /// Record a transient failure; the next pause backs off further.
    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
    }

    /// Record a definitive answer; backoff resets to the floor delay.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn current_delay(&self) -> Duration {
        if self.consecutive_failures == 0 {
            return self.min_delay;
        }
        let backoff = 2.0_f64
            .powi(self.consecutive_failures as i32)
            .min(MAX_BACKOFF_SECS);
        self.min_delay.max(Duration::from_secs_f64(backoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_resets() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        assert_eq!(pacer.current_delay(), Duration::from_millis(100));

        pacer.record_failure();
        assert_eq!(pacer.current_delay(), Duration::from_secs(2));
        pacer.record_failure();
        assert_eq!(pacer.current_delay(), Duration::from_secs(4));

        pacer.record_success();
        assert_eq!(pacer.current_delay(), Duration::from_millis(100));
    }

    #[test]
    fn backoff_is_capped() {
        let mut pacer = Pacer::new(Duration::ZERO);
        for _ in 0..20 {
            pacer.record_failure();
        }
        assert_eq!(pacer.current_delay(), Duration::from_secs(60));
    }

    #[test]
    fn floor_delay_wins_over_small_backoff() {
        let mut pacer = Pacer::new(Duration::from_secs(5));
        pacer.record_failure();
        assert_eq!(pacer.current_delay(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_is_not_delayed() {
        let mut pacer = Pacer::new(Duration::from_secs(2));
        let start = Instant::now();
        pacer.pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
