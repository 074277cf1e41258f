//! The journey report schema and its validation gate.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::action::Action;
use crate::error::ValidationError;

/// The validated terminal output of a run.
///
/// Produced exactly once, only on the terminal success transition of
/// the agent loop. Both the decision oracle adapter and the trace
/// reducer conform to this single contract; it is what keeps the
/// language-model output machine-checkable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyReport {
    /// A brief description of the site taken from the landing page.
    pub site_description: String,

    /// The ordered sequence of actions taken.
    pub journey: Vec<Action>,

    /// One human-readable narrative line per meaningful step. Not
    /// necessarily 1:1 with `journey`.
    pub steps_summary: Vec<String>,

    /// The URL the browser ended up on.
    pub final_url: String,
}

impl JourneyReport {
    /// Validate a candidate report.
    ///
    /// Accepts iff the candidate matches the schema (every action
    /// discriminator is one of the five permitted kinds with its
    /// required fields present) and `finalUrl` parses as a URL.
    /// Pure and idempotent.
    pub fn validate(candidate: &serde_json::Value) -> Result<JourneyReport, ValidationError> {
        if !candidate.is_object() {
            return Err(ValidationError::NotAnObject(candidate.to_string()));
        }

        let report: JourneyReport = serde_json::from_value(candidate.clone())
            .map_err(|e| ValidationError::Schema(e.to_string()))?;

        Url::parse(&report.final_url)
            .map_err(|_| ValidationError::InvalidFinalUrl(report.final_url.clone()))?;

        Ok(report)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
