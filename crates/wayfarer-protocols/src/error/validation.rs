//! Journey report validation errors.

use thiserror::Error;

/// Why a terminal journey report candidate was rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The candidate does not match the report schema (unknown action
    /// discriminator, missing required field, wrong type).
    #[error("Schema violation: {0}")]
    Schema(String),

    /// `finalUrl` is present but does not parse as a URL.
    #[error("Invalid final URL: {0}")]
    InvalidFinalUrl(String),

    /// The candidate is not a JSON object at all.
    #[error("Not a JSON object: {0}")]
    NotAnObject(String),
}
