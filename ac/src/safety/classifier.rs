//! CommandClassifier - ordered first-match evaluation of the rule tables

use regex::Regex;
use tracing::debug;

use super::rules::{BLOCK_RULES, CLASSIFY_RULES, ClassifyRule};
use super::{Classification, SafetyError};

/// A compiled hard-block rule
#[derive(Debug, Clone)]
pub struct BlockingRule {
    name: String,
    reason: String,
    regex: Regex,
}

impl BlockingRule {
    fn compile(name: impl Into<String>, pattern: &str, reason: impl Into<String>) -> Result<Self, SafetyError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| SafetyError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            reason: reason.into(),
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ClassifyRule,
    regex: Regex,
}

/// Classifies shell commands by reversibility
///
/// Blocking rules are evaluated strictly before classification rules and both
/// lists stop at the first match. Construct once and share; classification
/// only reads the compiled tables.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    blocking: Vec<BlockingRule>,
    rules: Vec<CompiledRule>,
    unknown_requires_confirmation: bool,
}

impl CommandClassifier {
    /// Compile the built-in rule tables
    pub fn new() -> Result<Self, SafetyError> {
        debug!(
            block_rules = BLOCK_RULES.len(),
            classify_rules = CLASSIFY_RULES.len(),
            "CommandClassifier::new: called"
        );
        let blocking = BLOCK_RULES
            .iter()
            .map(|r| BlockingRule::compile(r.name, r.pattern, r.reason))
            .collect::<Result<Vec<_>, _>>()?;

        let rules = CLASSIFY_RULES
            .iter()
            .map(|r| {
                Regex::new(r.pattern)
                    .map(|regex| CompiledRule { rule: *r, regex })
                    .map_err(|source| SafetyError::InvalidPattern {
                        name: r.name.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            blocking,
            rules,
            unknown_requires_confirmation: false,
        })
    }

    /// Append a hard-block rule after the built-in ones
    pub fn with_extra_block(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        reason: impl Into<String>,
    ) -> Result<Self, SafetyError> {
        let rule = BlockingRule::compile(name, pattern, reason)?;
        debug!(name = %rule.name, %pattern, "CommandClassifier::with_extra_block: called");
        self.blocking.push(rule);
        Ok(self)
    }

    /// Whether commands matching no rule need confirmation (default: false)
    pub fn with_unknown_requires_confirmation(mut self, value: bool) -> Self {
        debug!(%value, "CommandClassifier::with_unknown_requires_confirmation: called");
        self.unknown_requires_confirmation = value;
        self
    }

    /// First hard-block rule matching the command, if any
    pub fn blocking_rule(&self, command: &str) -> Option<&BlockingRule> {
        self.blocking.iter().find(|r| r.regex.is_match(command))
    }

    /// Whether the command must be refused outright
    pub fn is_blocked(&self, command: &str) -> bool {
        self.blocking_rule(command).is_some()
    }

    /// Classify a command. Never fails.
    pub fn classify(&self, command: &str) -> Classification {
        debug!(%command, "CommandClassifier::classify: called");

        if let Some(block) = self.blocking_rule(command) {
            debug!(rule = %block.name, "CommandClassifier::classify: blocked");
            return Classification {
                tier: super::ReversibilityTier::Irreversible,
                requires_confirmation: true,
                undo_hint: None,
                blocked: true,
                rule: Some(block.name.clone()),
            };
        }

        match self.rules.iter().find(|r| r.regex.is_match(command)) {
            Some(compiled) => {
                let rule = &compiled.rule;
                debug!(rule = %rule.name, tier = %rule.tier, "CommandClassifier::classify: rule matched");
                Classification {
                    tier: rule.tier,
                    requires_confirmation: rule.requires_confirmation,
                    undo_hint: rule.undo_hint.map(str::to_string),
                    blocked: false,
                    rule: Some(rule.name.to_string()),
                }
            }
            None => {
                debug!("CommandClassifier::classify: no rule matched, using default");
                Classification::unknown(self.unknown_requires_confirmation)
            }
        }
    }

    pub fn block_rule_count(&self) -> usize {
        self.blocking.len()
    }
}
