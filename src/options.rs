//! Run configuration

use serde::{Deserialize, Serialize};

/// How the raw input should be interpreted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Detect a base64 outer envelope, fall back to raw
    #[default]
    Auto,
    /// Input is an RFC 5322 message as-is
    Raw,
    /// Input is a base64-encoded RFC 5322 message
    Base64,
}

/// Which body wins when several parts share the text or HTML role
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyPolicy {
    /// A later body part replaces an earlier one
    #[default]
    LastWins,
    /// The first body part is kept
    FirstWins,
}

impl BodyPolicy {
    /// Store `candidate` into `slot` according to the policy
    pub fn apply(self, slot: &mut Option<String>, candidate: String) {
        match self {
            Self::LastWins => *slot = Some(candidate),
            Self::FirstWins => {
                if slot.is_none() {
                    *slot = Some(candidate);
                }
            }
        }
    }
}

/// Options shared by extraction and summaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    pub input_mode: InputMode,
    pub body_policy: BodyPolicy,
    /// Maximum characters kept in summary previews
    pub preview_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Auto,
            body_policy: BodyPolicy::LastWins,
            preview_chars: 200,
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub const fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_body_policy(mut self, policy: BodyPolicy) -> Self {
        self.body_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }
}
