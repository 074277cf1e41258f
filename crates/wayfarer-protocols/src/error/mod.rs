//! Error types for the Wayfarer protocol layer.

mod oracle;
mod validation;

pub use oracle::*;
pub use validation::*;
