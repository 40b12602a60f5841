//! Call-record data model.
//!
//! Records are produced by external API-call loggers as append-only JSON
//! arrays, one log per service. Two metering shapes exist: token-metered
//! (LLM calls) and duration-metered (conversation sessions). Which shape a
//! log uses is decided by the caller per service, never inferred from the
//! fields present in a record.
//!
//! All fields default when absent so that a malformed record is counted
//! rather than dropped: missing counters contribute zero, a missing
//! `success` flag counts as success.

use serde::{Deserialize, Serialize};

/// One logged token-metered API call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenCallRecord {
    /// ISO-8601 timestamp as written by the logger. Kept opaque; the
    /// aggregator never orders or filters by time.
    #[serde(default)]
    pub timestamp: String,

    /// Model identifier, when the logger recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Prompt tokens consumed by this call.
    #[serde(default)]
    pub input_tokens: u64,

    /// Completion tokens produced by this call.
    #[serde(default)]
    pub output_tokens: u64,

    /// Whether the call succeeded. Absent means success.
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// Lifecycle state of a duration-metered session record.
///
/// Loggers write free-form status strings; anything other than `started`
/// or `ended` maps to [`SessionState::Other`] and is excluded from both
/// the completed and active counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Started,
    Ended,
    #[default]
    #[serde(other)]
    Other,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Ended => "ended",
            Self::Other => "other",
        }
    }
}

/// One logged duration-metered session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationCallRecord {
    /// ISO-8601 timestamp as written by the logger.
    #[serde(default)]
    pub timestamp: String,

    /// Session lifecycle state.
    #[serde(default)]
    pub status: SessionState,

    /// Session length in seconds. Absent for sessions the logger never
    /// closed out; billing rules for absent durations live in the
    /// aggregator, not here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}
