//! Generation-tagged page observations.
//!
//! Element references are namespaced by snapshot generation
//! (`s{n}e{m}`); any reference from generation `n` is invalid once
//! generation `n+1` exists. The tracker only observes; the agent loop
//! decides when to re-observe.

use serde::{Deserialize, Serialize};

/// One interactive element as seen in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotElement {
    /// Generation-namespaced reference (`s{n}e{m}`).
    #[serde(rename = "ref")]
    pub element_ref: String,

    /// Accessibility role ("button", "textbox", ...).
    pub role: String,

    /// Accessible label, if any.
    pub label: String,
}

/// A parsed point-in-time observation of page state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generation: u64,

    pub page_url: Option<String>,

    pub elements: Vec<SnapshotElement>,
}

/// Per-session snapshot generation counter and staleness oracle.
///
/// Owned by one bridge session; never shared across runs.
#[derive(Debug, Default)]
pub struct SnapshotTracker {
    generation: u64,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation; 0 until the first snapshot is recorded.
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Record a new observation, advancing the generation.
    ///
    /// The payload is the text form of the remote snapshot tool's
    /// output: a page URL line plus one line per element carrying a
    /// `[ref=...]` marker.
    pub fn record(&mut self, payload: &str) -> Snapshot {
        self.generation += 1;

        let mut page_url = None;
        let mut elements = Vec::new();

        for line in payload.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("- Page URL:") {
                page_url = Some(rest.trim().to_string());
                continue;
            }
            if let Some(rest) = line.strip_prefix("Page URL:") {
                page_url = Some(rest.trim().to_string());
                continue;
            }
            if let Some(element) = parse_element_line(line) {
                elements.push(element);
            }
        }

        Snapshot {
            generation: self.generation,
            page_url,
            elements,
        }
    }

    /// Whether a reference belongs to a superseded generation.
    ///
    /// References that do not carry a parsable generation are not
    /// judged here; the remote side reports on those.
    pub fn is_stale(&self, element_ref: &str) -> bool {
        match parse_ref(element_ref) {
            Some((generation, _)) => generation < self.generation,
            None => false,
        }
    }
}

/// Parse `s{n}e{m}` into (generation, element index).
pub fn parse_ref(element_ref: &str) -> Option<(u64, u64)> {
    let rest = element_ref.strip_prefix('s')?;
    let e_pos = rest.find('e')?;
    let generation = rest[..e_pos].parse().ok()?;
    let element = rest[e_pos + 1..].parse().ok()?;
    Some((generation, element))
}

/// Parse an element line of the form `- role "label" [ref=s1e2]`.
fn parse_element_line(line: &str) -> Option<SnapshotElement> {
    let marker = line.find("[ref=")?;
    let ref_start = marker + "[ref=".len();
    let ref_end = line[ref_start..].find(']')? + ref_start;
    let element_ref = line[ref_start..ref_end].to_string();

    let head = line[..marker].trim_start_matches('-').trim();
    let (role, label) = match head.find('"') {
        Some(quote) => {
            let role = head[..quote].trim().to_string();
            let label = head[quote..].trim_matches('"').to_string();
            (role, label)
        }
        None => (head.trim_end_matches(':').to_string(), String::new()),
    };

    Some(SnapshotElement {
        element_ref,
        role,
        label,
    })
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
