//! Usage metering, cost estimation, and service health core for the
//! agent-factory control panel.
//!
//! The crate has a small pure core and a thin I/O shell around it:
//!
//! - [`usage`] reduces JSON call-record logs ([`records`]) to summary
//!   counters, with cost estimation from [`pricing`].
//! - [`health`] classifies quota used/limit pairs into discrete tiers.
//! - [`status`] defines the status vocabulary, explicit probe outcomes,
//!   and the composite per-service report.
//! - [`probe`], [`store`], and [`collector`] are the shell: reachability
//!   probes with independent deadlines, log loading with
//!   missing-file-as-empty semantics, and assembly of the composite
//!   report. The shell never fails a collection; degraded inputs produce
//!   degraded-but-well-formed reports.
//!
//! Everything is recomputed per request from the source logs; nothing is
//! cached or persisted.

pub mod collector;
pub mod config;
pub mod health;
pub mod pricing;
pub mod probe;
pub mod records;
pub mod status;
pub mod store;
pub mod usage;

#[cfg(test)]
mod tests;

pub use collector::{StatusCollector, UsageLog};
pub use config::{ConfigError, ServiceConfig, StatusConfig};
pub use health::{HealthTier, QuotaHealth, classify_quota};
pub use pricing::TokenPricing;
pub use status::{ProbeOutcome, ServiceReport, ServiceStatus, StatusReport};
pub use usage::{
    DurationUsageSummary, TokenUsageSummary, UsageSummary, summarize_duration_usage,
    summarize_token_usage,
};
