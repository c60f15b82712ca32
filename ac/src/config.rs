//! agentcore configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::safety::{CommandClassifier, SafetyError};
use crate::stream::DEFAULT_MAX_TOOL_CALLS;

/// Main agentcore configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (overridden by --log-level)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Command execution settings for `run_command`
    pub command: CommandConfig,

    /// Classifier policy
    pub safety: SafetyConfig,

    /// Stream reassembly limits
    pub stream: StreamConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .agentcore.yml
        let local_config = PathBuf::from(".agentcore.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/agentcore/agentcore.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("agentcore").join("agentcore.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed here; `load` reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// `run_command` execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Shell used as `<shell> -c <command>`
    pub shell: String,

    /// Default timeout when the call does not give one
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Merged output is truncated past this many bytes
    #[serde(rename = "max-output-chars")]
    pub max_output_chars: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            timeout_ms: 120_000,
            max_output_chars: 30_000,
        }
    }
}

/// Classifier policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Require confirmation for commands no rule recognizes
    #[serde(rename = "unknown-requires-confirmation")]
    pub unknown_requires_confirmation: bool,

    /// Site-specific blocking rules, checked after the built-in ones
    #[serde(rename = "extra-blocked")]
    pub extra_blocked: Vec<ExtraBlockRule>,
}

impl SafetyConfig {
    /// Compile the built-in rules plus this config's additions
    pub fn build_classifier(&self) -> Result<CommandClassifier, SafetyError> {
        let mut classifier =
            CommandClassifier::new()?.with_unknown_requires_confirmation(self.unknown_requires_confirmation);
        for rule in &self.extra_blocked {
            classifier = classifier.with_extra_block(&rule.name, &rule.pattern, &rule.reason)?;
        }
        Ok(classifier)
    }
}

/// A blocking rule supplied through config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraBlockRule {
    pub name: String,
    pub pattern: String,
    pub reason: String,
}

/// Stream reassembly limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Highest accepted tool call index is `max-tool-calls - 1`
    #[serde(rename = "max-tool-calls")]
    pub max_tool_calls: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
        }
    }
}
