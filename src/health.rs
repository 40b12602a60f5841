//! Quota health classification.
//!
//! Maps a used/limit pair to a discrete tier for rendering progress
//! indicators. Pure and total: a zero limit classifies as
//! [`HealthTier::NotApplicable`] instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::status::StatusPresentation;

/// Usage ratio (percent) at or above which a quota is critical.
pub const CRITICAL_THRESHOLD_PERCENT: f64 = 90.0;
/// Usage ratio (percent) at or above which a quota is running low.
pub const LOW_THRESHOLD_PERCENT: f64 = 70.0;

/// How close a quota-bound resource is to exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    /// Comfortably below the warning threshold.
    Ok,
    /// At or above 70% of the limit.
    Low,
    /// At or above 90% of the limit.
    Critical,
    /// No meaningful ratio exists (zero limit).
    NotApplicable,
}

impl HealthTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Low => "low",
            Self::Critical => "critical",
            Self::NotApplicable => "not_applicable",
        }
    }

    /// Display entry for progress indicators.
    pub fn presentation(&self) -> StatusPresentation {
        match self {
            Self::Ok => StatusPresentation::new("bg-green-500", "\u{1F7E2}", "OK"),
            Self::Low => StatusPresentation::new("bg-yellow-500", "\u{1F7E1}", "LOW"),
            Self::Critical => StatusPresentation::new("bg-red-500", "\u{1F534}", "CRITICAL"),
            Self::NotApplicable => StatusPresentation::new("bg-slate-500", "\u{26AA}", "N/A"),
        }
    }
}

impl std::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified quota state for one service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaHealth {
    pub tier: HealthTier,
    /// Usage as a percentage of the limit, clamped to 100.
    pub ratio_percent: f64,
    pub used: u64,
    pub limit: u64,
}

/// Classify a used/limit pair into a health tier.
///
/// A zero limit means the service has no meaningful quota; the ratio is
/// reported as 0 and the tier as `not_applicable`. Otherwise the ratio is
/// `min(used/limit, 1) * 100` with both thresholds boundary-inclusive.
pub fn classify_quota(used: u64, limit: u64) -> QuotaHealth {
    if limit == 0 {
        return QuotaHealth {
            tier: HealthTier::NotApplicable,
            ratio_percent: 0.0,
            used,
            limit,
        };
    }

    // used * 100 / limit keeps integer-valued boundaries (70%, 90%) exact
    // in f64, so the inclusive threshold comparisons are reliable.
    let ratio_percent = ((used as f64) * 100.0 / (limit as f64)).min(100.0);

    let tier = if ratio_percent >= CRITICAL_THRESHOLD_PERCENT {
        HealthTier::Critical
    } else if ratio_percent >= LOW_THRESHOLD_PERCENT {
        HealthTier::Low
    } else {
        HealthTier::Ok
    };

    QuotaHealth {
        tier,
        ratio_percent,
        used,
        limit,
    }
}
