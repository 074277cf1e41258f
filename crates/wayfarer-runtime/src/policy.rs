//! Shipped instruction presets and prompt construction.
//!
//! Historical prompt variants collapse into two named presets plus the
//! numeric knobs on [`RunPolicy`]; there is no other configuration
//! surface for the oracle's behavioral policy.

use wayfarer_protocols::policy::RunPolicy;

const GROUND_RULES: &str = r##"
GROUND RULES:
- Act only on element references taken from the latest snapshot. References from older snapshots are stale; if a tool reports a stale or missing element, take a fresh snapshot before acting again.
- After every state-changing action (navigate, click, type, selectOption, press), wait briefly and take a new snapshot before planning the next action.
- Call exactly one state-changing browser tool per step.

When the journey is complete, output a single JSON object and nothing else:
{
  "siteDescription": "A concise description of the website based on the landing page, including its purpose and main features",
  "journey": [
    { "action": "navigate",     "url": "..." },
    { "action": "click",        "selector": "#buy-now" },
    { "action": "type",         "selector": "input#email", "text": "foo@bar.com" },
    { "action": "selectOption", "selector": "select#qty",  "values": ["2"] },
    { "action": "press",        "key": "PageDown" }
  ],
  "stepsSummary": ["Step 1: Navigated to the homepage", "Step 2: Clicked the buy now button"],
  "finalUrl": "<the URL you end up on>"
}
The "action" field may only be one of: navigate, click, type, selectOption, press."##;

const JOURNEY_INSTRUCTIONS: &str = r#"You are a senior QA engineer driving an autonomous expert tester through a website using only the browser tools provided.

Your goal is to discover the site's primary user journey and execute it end to end.

STRATEGY:
1. Take an initial snapshot and read the landing page to understand what the site is for.
2. Identify the main flow a first-time user would take (sign up, purchase, search, booking, ...).
3. Execute that flow step by step, observing the page after every action.
4. Stop when the journey reaches a natural completion state (confirmation page, success message, logged-in dashboard)."#;

const FORM_INSTRUCTIONS: &str = r#"You are a senior QA engineer driving an autonomous expert tester through a website using only the browser tools provided.

Your goal is to complete a form submission journey from start to finish.

FORM COMPLETION STRATEGY:
1. Take an initial snapshot to identify the type of form.
2. Fill fields strictly top to bottom. Identify required fields (* markers, required attributes, common patterns).
3. Fill each field with valid test data (emails, names, addresses, ...).
4. After filling each logical group of fields, look for Next/Continue/Submit buttons before proceeding.
5. On validation errors: take a snapshot, locate the error messages, correct the entries, and retry submission."#;

/// A named instruction preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyPreset {
    /// Discover and execute the site's primary user journey.
    Journey,
    /// Complete a form top to bottom.
    Form,
}

impl PolicyPreset {
    /// Full instruction text for this preset.
    pub fn instructions(&self) -> String {
        let strategy = match self {
            PolicyPreset::Journey => JOURNEY_INSTRUCTIONS,
            PolicyPreset::Form => FORM_INSTRUCTIONS,
        };
        format!("{strategy}\n{GROUND_RULES}")
    }

    /// A [`RunPolicy`] with this preset's instructions and default
    /// bounds.
    pub fn policy(&self) -> RunPolicy {
        RunPolicy::new(self.instructions())
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyPreset::Journey => "journey",
            PolicyPreset::Form => "form",
        }
    }
}

impl std::str::FromStr for PolicyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "journey" => Ok(PolicyPreset::Journey),
            "form" => Ok(PolicyPreset::Form),
            other => Err(format!("unknown policy preset: {other}")),
        }
    }
}

/// The user-facing task prompt for a run.
pub fn task_prompt(url: &str) -> String {
    format!(
        r#"Given URL: {url}

1. Each loop iteration:
   a. Take a snapshot and analyze the page state.
   b. If interacting, choose exactly one state-changing browser tool.
   c. Wait briefly, then take a new snapshot.
2. Repeat until the journey is complete or no further meaningful actions are possible.
3. Record each action into your journey array and build stepsSummary as you go.
4. When done, emit exactly the JSON object with keys siteDescription, journey, stepsSummary, finalUrl."#
    )
}
