//! Per-run diagnostic artifact.
//!
//! One pretty-printed JSON document per run, written at termination and
//! named by run id and timestamp. The artifact is post-mortem
//! material only; a write failure must never fail the run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wayfarer_protocols::run::{FinalResult, RunStatus};
use wayfarer_protocols::trace::{RetryEvent, StepRecord, Usage};

/// Everything worth keeping about one finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunArtifact {
    pub run_id: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// The full policy instruction text in effect.
    pub instructions: String,
    pub task: String,

    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub step_count: u32,
    pub duration_ms: u64,
    pub usage: Usage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_summary: Option<Vec<String>>,

    pub trace: Vec<StepRecord>,
    pub retry_events: Vec<RetryEvent>,

    /// The terminal oracle payload exactly as produced, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_report: Option<serde_json::Value>,
}

impl RunArtifact {
    /// Assemble the artifact from the pieces the runner holds at
    /// termination.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        run_id: &str,
        url: &str,
        started_at: DateTime<Utc>,
        instructions: &str,
        task: &str,
        result: &FinalResult,
        trace: Vec<StepRecord>,
        retry_events: Vec<RetryEvent>,
        raw_report: Option<serde_json::Value>,
    ) -> Self {
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            run_id: run_id.to_string(),
            url: url.to_string(),
            started_at,
            finished_at,
            instructions: instructions.to_string(),
            task: task.to_string(),
            status: result.status,
            error_kind: result.error.as_ref().map(|e| e.kind.clone()),
            error_message: result.error.as_ref().map(|e| e.message.clone()),
            retry_count: result
                .error
                .as_ref()
                .and_then(|e| e.retry_count)
                .unwrap_or(retry_events.len() as u32),
            step_count: trace.len() as u32,
            duration_ms,
            usage: result.usage,
            final_url: result.final_url.clone(),
            steps_summary: result.steps_summary.clone(),
            trace,
            retry_events,
            raw_report,
        }
    }

    /// File name for this artifact, stable per run.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.finished_at.format("%Y%m%dT%H%M%S"),
            self.run_id
        )
    }
}

/// Write the artifact under `dir`, creating it if needed.
///
/// Failures are swallowed: the run's result has already been decided
/// and diagnostics must not change it. Returns the written path when
/// the write succeeded.
pub fn write_artifact(dir: &Path, artifact: &RunArtifact) -> Option<PathBuf> {
    match try_write(dir, artifact) {
        Ok(path) => {
            debug!("Run artifact written to {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Failed to write run artifact: {}", e);
            None
        }
    }
}

fn try_write(dir: &Path, artifact: &RunArtifact) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact.file_name());
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_protocols::run::RunError;

    fn sample_result() -> FinalResult {
        FinalResult {
            status: RunStatus::Error,
            final_url: None,
            site_description: None,
            steps_summary: None,
            journey: None,
            error: Some(RunError {
                kind: "oracle".to_string(),
                message: "backend down".to_string(),
                retry_count: Some(3),
            }),
            usage: Usage::default(),
        }
    }

    fn sample_artifact() -> RunArtifact {
        RunArtifact::assemble(
            "run-42",
            "https://example.com",
            Utc::now(),
            "instructions",
            "Given URL: https://example.com",
            &sample_result(),
            vec![StepRecord::new(1)],
            Vec::new(),
            Some(serde_json::json!({ "partial": true })),
        )
    }

    #[test]
    fn test_assemble_summarizes_result() {
        let artifact = sample_artifact();
        assert_eq!(artifact.status, RunStatus::Error);
        assert_eq!(artifact.error_kind.as_deref(), Some("oracle"));
        assert_eq!(artifact.retry_count, 3);
        assert_eq!(artifact.step_count, 1);
        assert!(artifact.file_name().ends_with("-run-42.json"));
    }

    #[test]
    fn test_write_artifact_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = sample_artifact();

        let path = write_artifact(dir.path(), &artifact).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let back: RunArtifact = serde_json::from_str(&contents).unwrap();
        assert_eq!(back.run_id, "run-42");
        assert_eq!(back.trace.len(), 1);
        assert_eq!(back.raw_report.unwrap()["partial"], true);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the directory should be makes create_dir_all fail.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "not a directory").unwrap();

        let artifact = sample_artifact();
        assert!(write_artifact(&blocked, &artifact).is_none());
    }

    #[test]
    fn test_artifact_serializes_camel_case() {
        let json = serde_json::to_value(sample_artifact()).unwrap();
        assert!(json.get("runId").is_some());
        assert!(json.get("retryEvents").is_some());
        assert!(json.get("durationMs").is_some());
        assert!(json.get("error_kind").is_none());
    }
}
