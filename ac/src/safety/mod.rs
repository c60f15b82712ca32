//! Command safety classification
//!
//! Decides whether a shell command may run at all and, when it may, how hard
//! its effects are to undo. Rules live in ordered tables (see [`rules`]) so
//! they can be audited and tested one by one.

mod classifier;
pub mod rules;

use serde::Serialize;
use thiserror::Error;

pub use classifier::{BlockingRule, CommandClassifier};
pub use rules::{BLOCK_RULES, BlockRule, CLASSIFY_RULES, ClassifyRule};

/// How hard a command's effects are to undo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReversibilityTier {
    /// Trivially undoable
    Easy,
    /// Undoable with deliberate extra work
    Effort,
    /// Cannot be undone by any standard means
    Irreversible,
}

impl std::fmt::Display for ReversibilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "EASY"),
            Self::Effort => write!(f, "EFFORT"),
            Self::Irreversible => write!(f, "IRREVERSIBLE"),
        }
    }
}

/// Result of classifying one command string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: ReversibilityTier,
    pub requires_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo_hint: Option<String>,

    /// A hard-block rule matched; the command must not run
    pub blocked: bool,

    /// Name of the rule that decided the outcome, `None` for the default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Classification {
    /// Outcome for a command no rule recognises
    pub fn unknown(requires_confirmation: bool) -> Self {
        Self {
            tier: ReversibilityTier::Effort,
            requires_confirmation,
            undo_hint: None,
            blocked: false,
            rule: None,
        }
    }

    pub fn is_irreversible(&self) -> bool {
        self.tier == ReversibilityTier::Irreversible
    }
}

/// Errors building a classifier
#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("Invalid pattern for rule '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_display() {
        assert_eq!(ReversibilityTier::Easy.to_string(), "EASY");
        assert_eq!(ReversibilityTier::Effort.to_string(), "EFFORT");
        assert_eq!(ReversibilityTier::Irreversible.to_string(), "IRREVERSIBLE");
    }

    #[test]
    fn test_classification_serializes_uppercase_tier() {
        let json = serde_json::to_value(Classification::unknown(false)).unwrap();
        assert_eq!(json["tier"], "EFFORT");
        assert_eq!(json["requires_confirmation"], false);
        assert!(json.get("undo_hint").is_none());
        assert!(json.get("rule").is_none());
    }
}
