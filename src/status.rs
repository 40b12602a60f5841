//! Service status vocabulary, probe outcomes, and the composite report.
//!
//! A [`ServiceStatus`] is computed fresh on every status request and never
//! persisted. Probe failures are kept as explicit [`ProbeOutcome`]
//! variants rather than collapsed into a single "offline" bucket, so the
//! presentation layer can distinguish a timeout from a refused connection
//! from a missing credential.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health::QuotaHealth;
use crate::usage::UsageSummary;

/// Coarse reachability classification for an external service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Reachable and answering with a success status code.
    Online,
    /// Connection could not be established.
    Offline,
    /// Reachable but answering with a non-success status code.
    Error,
    /// No answer within the probe's deadline.
    Timeout,
    /// No API key configured for a service that requires one.
    NoKey,
    /// Not yet probed, or no probe configured.
    #[default]
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::NoKey => "no_key",
            Self::Unknown => "unknown",
        }
    }

    /// Display entry for this status. Anything without a dedicated entry
    /// falls back to the neutral one.
    pub fn presentation(&self) -> StatusPresentation {
        match self {
            Self::Online => StatusPresentation::new("bg-green-500", "\u{1F7E2}", "ONLINE"),
            Self::Offline => StatusPresentation::new("bg-red-500", "\u{1F534}", "OFFLINE"),
            Self::Error => StatusPresentation::new("bg-red-500", "\u{1F534}", "ERROR"),
            Self::Timeout => StatusPresentation::new("bg-yellow-500", "\u{1F7E1}", "TIMEOUT"),
            Self::NoKey => StatusPresentation::new("bg-slate-500", "\u{26AA}", "NO KEY"),
            Self::Unknown => StatusPresentation::neutral(),
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display attributes for a status or tier: a CSS color token, an emoji,
/// and a short uppercase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    pub color_token: &'static str,
    pub emoji: &'static str,
    pub label: &'static str,
}

impl StatusPresentation {
    pub const fn new(color_token: &'static str, emoji: &'static str, label: &'static str) -> Self {
        Self {
            color_token,
            emoji,
            label,
        }
    }

    /// The fallback entry for unknown or unmapped statuses.
    pub const fn neutral() -> Self {
        Self::new("bg-slate-400", "\u{26AA}", "UNKNOWN")
    }
}

/// Outcome of one reachability probe.
///
/// Upstream I/O failure is data here, not an error: every way a probe can
/// end maps deterministically onto a [`ServiceStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The service answered within the deadline.
    Responded { latency_ms: u64, status_code: u16 },
    /// No answer before the deadline elapsed.
    TimedOut { after: Duration },
    /// The connection failed outright.
    Unreachable { error: String },
    /// The probe was skipped because a required API key is not configured.
    NoCredentials,
}

impl ProbeOutcome {
    /// Map this outcome onto the status vocabulary.
    pub fn status(&self) -> ServiceStatus {
        match self {
            Self::Responded { status_code, .. } => {
                if (200..300).contains(status_code) {
                    ServiceStatus::Online
                } else {
                    ServiceStatus::Error
                }
            }
            Self::TimedOut { .. } => ServiceStatus::Timeout,
            Self::Unreachable { .. } => ServiceStatus::Offline,
            Self::NoCredentials => ServiceStatus::NoKey,
        }
    }

    /// Observed latency, where one exists. Timeouts report the deadline
    /// they waited; skipped and failed probes report zero.
    pub fn latency_ms(&self) -> u64 {
        match self {
            Self::Responded { latency_ms, .. } => *latency_ms,
            Self::TimedOut { after } => after.as_millis() as u64,
            Self::Unreachable { .. } | Self::NoCredentials => 0,
        }
    }

    /// Failure detail for the report, when there is one.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Responded { status_code, .. } if !(200..300).contains(status_code) => {
                Some(format!("unexpected status code {status_code}"))
            }
            Self::TimedOut { after } => {
                Some(format!("no response within {}s", after.as_secs()))
            }
            Self::Unreachable { error } => Some(error.clone()),
            _ => None,
        }
    }
}

/// Per-service entry in the composite report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceReport {
    pub status: ServiceStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaHealth>,
}

impl ServiceReport {
    /// Build a report entry from a probe outcome, with no usage or quota
    /// attached yet.
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        Self {
            status: outcome.status(),
            latency_ms: outcome.latency_ms(),
            error: outcome.error_message(),
            usage: None,
            quota: None,
        }
    }

    /// An entry for a service that has no probe configured.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// The composite status object consumed by the presentation layer.
///
/// Services are keyed by their configured name; `BTreeMap` keeps the
/// serialized order stable across requests.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, ServiceReport>,
}

impl StatusReport {
    pub fn new(services: BTreeMap<String, ServiceReport>) -> Self {
        Self {
            timestamp: Utc::now(),
            services,
        }
    }

    pub fn get(&self, service: &str) -> Option<&ServiceReport> {
        self.services.get(service)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ProbeOutcome::Responded { latency_ms: 12, status_code: 200 }, ServiceStatus::Online)]
    #[case(ProbeOutcome::Responded { latency_ms: 12, status_code: 204 }, ServiceStatus::Online)]
    #[case(ProbeOutcome::Responded { latency_ms: 12, status_code: 401 }, ServiceStatus::Error)]
    #[case(ProbeOutcome::Responded { latency_ms: 12, status_code: 503 }, ServiceStatus::Error)]
    #[case(ProbeOutcome::TimedOut { after: Duration::from_secs(5) }, ServiceStatus::Timeout)]
    #[case(ProbeOutcome::Unreachable { error: "refused".into() }, ServiceStatus::Offline)]
    #[case(ProbeOutcome::NoCredentials, ServiceStatus::NoKey)]
    fn test_outcome_to_status(#[case] outcome: ProbeOutcome, #[case] expected: ServiceStatus) {
        assert_eq!(outcome.status(), expected);
    }

    #[test]
    fn test_outcome_latency() {
        let responded = ProbeOutcome::Responded {
            latency_ms: 42,
            status_code: 200,
        };
        assert_eq!(responded.latency_ms(), 42);

        let timed_out = ProbeOutcome::TimedOut {
            after: Duration::from_secs(5),
        };
        assert_eq!(timed_out.latency_ms(), 5_000);

        assert_eq!(ProbeOutcome::NoCredentials.latency_ms(), 0);
    }

    #[test]
    fn test_outcome_error_messages() {
        let ok = ProbeOutcome::Responded {
            latency_ms: 10,
            status_code: 200,
        };
        assert!(ok.error_message().is_none());

        let error = ProbeOutcome::Responded {
            latency_ms: 10,
            status_code: 500,
        };
        assert_eq!(
            error.error_message().unwrap(),
            "unexpected status code 500"
        );

        let timed_out = ProbeOutcome::TimedOut {
            after: Duration::from_secs(10),
        };
        assert_eq!(timed_out.error_message().unwrap(), "no response within 10s");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ServiceStatus::NoKey).unwrap(),
            "\"no_key\""
        );
        assert_eq!(
            serde_json::to_string(&ServiceStatus::Online).unwrap(),
            "\"online\""
        );
    }

    #[test]
    fn test_presentation_table() {
        assert_eq!(
            ServiceStatus::Online.presentation().color_token,
            "bg-green-500"
        );
        assert_eq!(
            ServiceStatus::Timeout.presentation().color_token,
            "bg-yellow-500"
        );
        assert_eq!(ServiceStatus::NoKey.presentation().label, "NO KEY");
    }

    #[test]
    fn test_unknown_status_uses_neutral_presentation() {
        assert_eq!(
            ServiceStatus::Unknown.presentation(),
            StatusPresentation::neutral()
        );
        assert_eq!(StatusPresentation::neutral().color_token, "bg-slate-400");
    }

    #[test]
    fn test_report_skips_empty_fields() {
        let report = ServiceReport::from_outcome(&ProbeOutcome::Responded {
            latency_ms: 8,
            status_code: 200,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["latency_ms"], 8);
        assert!(json.get("error").is_none());
        assert!(json.get("usage").is_none());
        assert!(json.get("quota").is_none());
    }

    #[test]
    fn test_unprobed_service_reports_unknown() {
        let report = ServiceReport::unknown();
        assert_eq!(report.status, ServiceStatus::Unknown);
        assert_eq!(report.latency_ms, 0);
    }

    #[test]
    fn test_status_report_stable_key_order() {
        let mut services = BTreeMap::new();
        services.insert("tavus".to_string(), ServiceReport::unknown());
        services.insert("gemini".to_string(), ServiceReport::unknown());
        services.insert("ollama".to_string(), ServiceReport::unknown());

        let report = StatusReport::new(services);
        let keys: Vec<_> = report.services.keys().cloned().collect();
        assert_eq!(keys, ["gemini", "ollama", "tavus"]);
        assert!(report.get("gemini").is_some());
        assert!(report.get("missing").is_none());
    }
}
