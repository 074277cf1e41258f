//! The closed browser action vocabulary.

use serde::{Deserialize, Serialize};

/// One primitive browser operation in a journey.
///
/// The `action` discriminator is closed: exactly these five kinds may
/// appear in a [`crate::JourneyReport`]. Selector strings are opaque to
/// the core and interpreted by the remote browser bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Navigate to a URL.
    Navigate { url: String },

    /// Click an element.
    Click { selector: String },

    /// Type text into an element.
    Type { selector: String, text: String },

    /// Select one or more options in a select element.
    SelectOption {
        selector: String,
        values: Vec<String>,
    },

    /// Press a keyboard key.
    Press { key: String },
}

impl Action {
    /// The wire-format discriminator for this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Navigate { .. } => "navigate",
            Action::Click { .. } => "click",
            Action::Type { .. } => "type",
            Action::SelectOption { .. } => "selectOption",
            Action::Press { .. } => "press",
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
