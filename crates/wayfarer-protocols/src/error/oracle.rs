//! Decision oracle errors.

use thiserror::Error;

/// Failure surfaced by a [`crate::DecisionOracle`].
///
/// Only `RateLimited` is retried by the supervisor; the other variants
/// pass straight through to the agent loop, which re-asks on a
/// malformed response or a transient `Unavailable` within its budget.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The provider rejected the call for rate limiting. The optional
    /// hint is the provider-suggested wait in seconds.
    #[error("Rate limited{}", retry_after.map(|s| format!(": retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// The provider is unreachable or returned a server-side failure.
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    /// The provider answered, but the output is not a decision the loop
    /// can act on.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

impl OracleError {
    /// Whether the retry supervisor may retry this error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, OracleError::RateLimited { .. })
    }
}
