//! Rate-limit retry and backoff supervision for oracle calls.
//!
//! Wraps oracle calls only; tool bridge calls have their own
//! fine-grained per-call handling in the agent loop. Only rate-limit
//! errors are retried here, everything else passes straight through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use wayfarer_protocols::error::OracleError;
use wayfarer_protocols::oracle::{DecisionContext, DecisionOracle, OracleReply};
use wayfarer_protocols::trace::RetryEvent;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Backoff delay for the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Cap applied to every computed delay, including provider hints.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Exponential backoff delay for a 0-based attempt, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.max_delay)
    }
}

/// Oracle wrapper that retries rate-limited calls with backoff.
///
/// Instantiated fresh per run; the recorded retry events are this
/// run's telemetry and feed the diagnostic artifact.
pub struct RetryOracle {
    inner: Arc<dyn DecisionOracle>,
    config: RetryConfig,
    events: Mutex<Vec<RetryEvent>>,
}

impl RetryOracle {
    pub fn new(inner: Arc<dyn DecisionOracle>, config: RetryConfig) -> Self {
        Self {
            inner,
            config,
            events: Mutex::new(Vec::new()),
        }
    }

    /// All retry events recorded so far, oldest first.
    pub fn events(&self) -> Vec<RetryEvent> {
        self.events.lock().clone()
    }

    /// How many times the inner oracle was re-asked.
    pub fn retry_count(&self) -> u32 {
        self.events.lock().len() as u32
    }

    fn record(&self, attempt: u32, delay: Duration, reason: String) {
        self.events.lock().push(RetryEvent {
            timestamp: Utc::now(),
            attempt,
            delay_ms: delay.as_millis() as u64,
            reason,
        });
    }
}

#[async_trait]
impl DecisionOracle for RetryOracle {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn decide(&self, ctx: &DecisionContext) -> Result<OracleReply, OracleError> {
        for attempt in 0..=self.config.max_retries {
            match self.inner.decide(ctx).await {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    if !e.is_rate_limited() || attempt == self.config.max_retries {
                        return Err(e);
                    }

                    let delay = match &e {
                        OracleError::RateLimited {
                            retry_after: Some(seconds),
                        } => Duration::from_secs(*seconds).min(self.config.max_delay),
                        _ => self.config.delay_for_attempt(attempt),
                    };

                    warn!(
                        "Oracle rate limited (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        self.config.max_retries + 1,
                        delay
                    );

                    self.record(attempt + 1, delay, e.to_string());
                    sleep(delay).await;
                    debug!("Retrying oracle call");
                }
            }
        }

        // The loop always returns on the final attempt.
        unreachable!("retry loop exits via return")
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
