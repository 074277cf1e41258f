//! Reduces a finished loop outcome into the caller-facing result.
//!
//! Success output is copied from the validated journey report, never
//! synthesized from the trace; a partial run yields no report fields at
//! all.

use wayfarer_protocols::run::{FinalResult, RunError, RunStatus};

use crate::agent_loop::LoopOutcome;

/// Fold a loop outcome (plus the supervisor's retry telemetry) into a
/// [`FinalResult`].
pub fn reduce(outcome: &LoopOutcome, retry_count: u32) -> FinalResult {
    match (&outcome.status, &outcome.report) {
        (RunStatus::Success, Some(report)) => FinalResult {
            status: RunStatus::Success,
            final_url: Some(report.final_url.clone()),
            site_description: Some(report.site_description.clone()),
            steps_summary: Some(report.steps_summary.clone()),
            journey: Some(report.journey.clone()),
            error: None,
            usage: outcome.usage,
        },
        _ => {
            let error = outcome.error.clone().unwrap_or_else(|| RunError {
                kind: "unknown".to_string(),
                message: "Run terminated without an error descriptor".to_string(),
                retry_count: None,
            });
            FinalResult {
                status: outcome.status,
                final_url: None,
                site_description: None,
                steps_summary: None,
                journey: None,
                error: Some(RunError {
                    retry_count: Some(retry_count),
                    ..error
                }),
                usage: outcome.usage,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_protocols::action::Action;
    use wayfarer_protocols::report::JourneyReport;
    use wayfarer_protocols::trace::Usage;

    fn success_outcome() -> LoopOutcome {
        LoopOutcome {
            status: RunStatus::Success,
            report: Some(JourneyReport {
                site_description: "An example site".to_string(),
                journey: vec![Action::Navigate {
                    url: "https://example.com".to_string(),
                }],
                steps_summary: vec!["Step 1: Navigated".to_string()],
                final_url: "https://example.com/welcome".to_string(),
            }),
            raw_report: Some(serde_json::json!({})),
            error: None,
            trace: Vec::new(),
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            steps_taken: 3,
        }
    }

    #[test]
    fn test_success_copies_report_fields() {
        let result = reduce(&success_outcome(), 0);
        assert!(result.is_success());
        assert_eq!(result.final_url.as_deref(), Some("https://example.com/welcome"));
        assert_eq!(result.site_description.as_deref(), Some("An example site"));
        assert_eq!(result.journey.as_ref().unwrap().len(), 1);
        assert!(result.error.is_none());
        assert_eq!(result.usage.total_tokens, 15);
    }

    #[test]
    fn test_error_carries_retry_count_and_no_output() {
        let outcome = LoopOutcome {
            status: RunStatus::Error,
            report: None,
            raw_report: None,
            error: Some(RunError {
                kind: "step_budget_exhausted".to_string(),
                message: "step budget exhausted".to_string(),
                retry_count: None,
            }),
            trace: Vec::new(),
            usage: Usage::default(),
            steps_taken: 35,
        };
        let result = reduce(&outcome, 2);
        assert!(!result.is_success());
        assert!(result.final_url.is_none());
        assert!(result.journey.is_none());
        let error = result.error.unwrap();
        assert_eq!(error.kind, "step_budget_exhausted");
        assert_eq!(error.retry_count, Some(2));
    }

    #[test]
    fn test_timeout_preserves_status() {
        let outcome = LoopOutcome {
            status: RunStatus::Timeout,
            report: None,
            raw_report: None,
            error: Some(RunError {
                kind: "timeout".to_string(),
                message: "Run exceeded its wall-clock budget".to_string(),
                retry_count: None,
            }),
            trace: Vec::new(),
            usage: Usage::default(),
            steps_taken: 7,
        };
        let result = reduce(&outcome, 0);
        assert_eq!(result.status, RunStatus::Timeout);
        assert_eq!(result.error.unwrap().kind, "timeout");
    }
}
