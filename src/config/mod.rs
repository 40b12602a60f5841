//! Configuration module for the status core.
//!
//! Configuration is a TOML file with support for environment variable
//! interpolation using `${VAR_NAME}` syntax. Every section is optional
//! with sensible defaults; credentials come in through interpolation
//! rather than ambient environment reads at use sites.
//!
//! # Example
//!
//! ```toml
//! [pricing]
//! price_in_per_million = 0.35
//! price_out_per_million = 1.05
//!
//! [services.gemini]
//! url = "https://generativelanguage.googleapis.com/v1beta/models"
//! api_key = "${GOOGLE_API_KEY}"
//! api_key_header = "x-goog-api-key"
//! requires_api_key = true
//! metering = "tokens"
//! usage_log = "intelligence/usage/gemini_log.json"
//!
//! [services.tavus]
//! url = "https://api.tavus.io/v2/replicas"
//! requires_api_key = true
//! timeout_secs = 10
//! metering = "duration"
//! usage_log = "intelligence/usage/tavus_log.json"
//!
//! [services.ollama]
//! url = "http://localhost:11434/api/tags"
//! ```

mod services;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
pub use services::*;

use crate::pricing::TokenPricing;

/// Root configuration for the status core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusConfig {
    /// Token pricing used for cost estimation on token-metered logs.
    #[serde(default)]
    pub pricing: TokenPricing,

    /// Services to probe and summarize, keyed by display name.
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

impl StatusConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: StatusConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, service) in &self.services {
            service
                .validate()
                .map_err(|e| ConfigError::Validation(format!("service {name}: {e}")))?;
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in the format `${VAR_NAME}`.
/// Skips commented lines (lines where content before the variable is a comment).
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');

        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let match_start = cap.get(0).unwrap().start();

            // Skip if this variable is inside a comment
            if let Some(pos) = comment_pos
                && match_start >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..match_start]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = cap.get(0).unwrap().end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    // Remove trailing newline if input didn't have one
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
