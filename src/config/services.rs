//! Per-service configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::DEFAULT_API_KEY_HEADER;

/// Which usage log shape a service is metered by.
///
/// Explicit, per the service being configured — the summarizer is never
/// chosen by sniffing record fields at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteringMode {
    /// Token-metered log (LLM calls); summaries carry token counts and cost.
    Tokens,
    /// Duration-metered log (sessions); summaries carry billable minutes.
    Duration,
    /// No usage log for this service.
    #[default]
    None,
}

/// Configuration for one external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// URL the reachability probe GETs. Omit for log-only services,
    /// which report `unknown` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// API key sent with the probe, typically interpolated from the
    /// environment. Leave unset to have a key-requiring service report
    /// `no_key` instead of probing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Header the API key is sent in.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Whether this service needs an API key at all. Services that don't
    /// (local daemons) probe unauthenticated.
    #[serde(default)]
    pub requires_api_key: bool,

    /// Per-probe deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Usage log shape for this service.
    #[serde(default)]
    pub metering: MeteringMode,

    /// Path to the service's usage log. Required when `metering` is not
    /// `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_log: Option<PathBuf>,
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            api_key_header: default_api_key_header(),
            requires_api_key: false,
            timeout_secs: default_timeout_secs(),
            metering: MeteringMode::None,
            usage_log: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check this service's configuration for internal consistency.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        if self.timeout_secs > 300 {
            return Err(format!(
                "timeout_secs must be at most 300, got {}",
                self.timeout_secs
            ));
        }
        if self.metering != MeteringMode::None && self.usage_log.is_none() {
            return Err(format!(
                "metering = \"{}\" requires usage_log to be set",
                match self.metering {
                    MeteringMode::Tokens => "tokens",
                    MeteringMode::Duration => "duration",
                    MeteringMode::None => unreachable!(),
                }
            ));
        }
        Ok(())
    }
}
