//! # Wayfarer OpenAI Oracle
//!
//! Production [`DecisionOracle`](wayfarer_protocols::oracle::DecisionOracle)
//! adapter speaking the OpenAI chat-completions wire format, including
//! OpenAI-compatible endpoints via a custom URL.

pub mod api;
pub mod converter;
pub mod oracle;

pub use oracle::OpenAIOracle;
