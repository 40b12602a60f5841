//! Usage aggregation over call-record logs.
//!
//! Both summarizers are pure reductions: deterministic, O(n) over the
//! record slice, no I/O, no hidden state. They never fail — a record with
//! missing fields contributes zeros (or the documented default) but is
//! still counted.

use serde::Serialize;

use crate::pricing::TokenPricing;
use crate::records::{DurationCallRecord, SessionState, TokenCallRecord};

/// Duration assumed for a completed session whose logger never wrote a
/// duration: 60 seconds, billed as one minute.
const DEFAULT_SESSION_SECONDS: f64 = 60.0;

/// Aggregate counters for a token-metered log.
///
/// Invariants: `total_tokens == total_input_tokens + total_output_tokens`
/// and `successful_calls + failed_calls == total_calls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenUsageSummary {
    pub total_calls: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    /// Estimated spend in USD, rounded half-up to 4 decimal places.
    pub estimated_cost_usd: f64,
    pub successful_calls: u64,
    pub failed_calls: u64,
}

/// Aggregate counters for a duration-metered log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationUsageSummary {
    pub total_calls: u64,
    /// Billable minutes: each completed session rounded up to whole
    /// minutes with a floor of one minute per session.
    pub total_minutes: u64,
    /// Raw recorded seconds across completed sessions. Sessions without a
    /// duration contribute nothing here even though they bill one minute.
    pub total_seconds: f64,
    pub completed_calls: u64,
    pub active_calls: u64,
}

/// A usage summary tagged by metering shape.
///
/// The variant is chosen by the caller based on which service it is
/// summarizing; nothing in this crate selects it by inspecting record
/// fields at runtime. Serializes untagged so reports keep the flat shape
/// the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsageSummary {
    Tokens(TokenUsageSummary),
    Duration(DurationUsageSummary),
}

/// Reduce a token-metered log to summary counters and estimated cost.
///
/// Empty input yields an all-zero summary with zero cost.
pub fn summarize_token_usage(
    records: &[TokenCallRecord],
    pricing: &TokenPricing,
) -> TokenUsageSummary {
    let mut total_input_tokens = 0u64;
    let mut total_output_tokens = 0u64;
    let mut successful_calls = 0u64;

    for record in records {
        total_input_tokens += record.input_tokens;
        total_output_tokens += record.output_tokens;
        if record.success {
            successful_calls += 1;
        }
    }

    let total_calls = records.len() as u64;

    TokenUsageSummary {
        total_calls,
        total_input_tokens,
        total_output_tokens,
        total_tokens: total_input_tokens + total_output_tokens,
        estimated_cost_usd: pricing.estimate_cost_usd(total_input_tokens, total_output_tokens),
        successful_calls,
        failed_calls: total_calls - successful_calls,
    }
}

/// Reduce a duration-metered log to summary counters.
///
/// Only sessions with `status == ended` bill minutes; `started` sessions
/// count as active, anything else counts toward `total_calls` only.
pub fn summarize_duration_usage(records: &[DurationCallRecord]) -> DurationUsageSummary {
    let mut summary = DurationUsageSummary {
        total_calls: records.len() as u64,
        ..Default::default()
    };

    for record in records {
        match record.status {
            SessionState::Ended => {
                summary.completed_calls += 1;
                summary.total_seconds += record.duration_seconds.unwrap_or(0.0);
                summary.total_minutes += billable_minutes(record.duration_seconds);
            }
            SessionState::Started => summary.active_calls += 1,
            SessionState::Other => {}
        }
    }

    summary
}

/// Minutes billed for one completed session: duration rounded up to whole
/// minutes, floor of one minute, missing duration treated as 60 seconds.
fn billable_minutes(duration_seconds: Option<f64>) -> u64 {
    let seconds = duration_seconds.unwrap_or(DEFAULT_SESSION_SECONDS).max(0.0);
    ((seconds / 60.0).ceil() as u64).max(1)
}
