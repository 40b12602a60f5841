//! Composite status collection.
//!
//! A [`StatusCollector`] holds the registered services — each with an
//! optional probe and an optional usage log — and assembles the composite
//! [`StatusReport`] on demand. Probes run concurrently, each bounded by
//! its own deadline. The report is always well-formed: a log that fails
//! to load degrades to an empty summary with a warning rather than
//! failing the whole collection.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{MeteringMode, StatusConfig};
use crate::health::classify_quota;
use crate::pricing::TokenPricing;
use crate::probe::{HttpProbe, ServiceProbe};
use crate::status::{ServiceReport, StatusReport};
use crate::store;
use crate::usage::{self, DurationUsageSummary, TokenUsageSummary, UsageSummary};

/// Which usage log a service is metered by. Chosen explicitly at
/// registration; never inferred from the log contents.
#[derive(Debug, Clone)]
pub enum UsageLog {
    Tokens {
        path: PathBuf,
        pricing: TokenPricing,
    },
    Duration {
        path: PathBuf,
    },
}

struct ServiceEntry {
    name: String,
    probe: Option<Arc<dyn ServiceProbe>>,
    usage: Option<UsageLog>,
}

/// Registry of services to probe and summarize.
pub struct StatusCollector {
    client: reqwest::Client,
    services: Vec<ServiceEntry>,
}

impl std::fmt::Debug for StatusCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCollector")
            .field(
                "services",
                &self.services.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl StatusCollector {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            services: Vec::new(),
        }
    }

    /// Build a collector from configuration, constructing an [`HttpProbe`]
    /// for every service with a URL. Fails only on configuration problems
    /// (an unparseable URL); runtime trouble stays inside the report.
    pub fn from_config(config: &StatusConfig) -> Result<Self, crate::config::ConfigError> {
        let mut collector = Self::new(reqwest::Client::new());

        for (name, service) in &config.services {
            let probe = match &service.url {
                Some(raw) => {
                    let url = url::Url::parse(raw).map_err(|e| {
                        crate::config::ConfigError::Validation(format!(
                            "service {name}: invalid url {raw:?}: {e}"
                        ))
                    })?;
                    let mut probe =
                        HttpProbe::new(name.clone(), url).with_timeout(service.timeout());
                    if service.requires_api_key {
                        probe = probe
                            .with_api_key(service.api_key_header.clone(), service.api_key.clone());
                    }
                    Some(Arc::new(probe) as Arc<dyn ServiceProbe>)
                }
                None => None,
            };

            let usage = match service.metering {
                MeteringMode::Tokens => service.usage_log.clone().map(|path| UsageLog::Tokens {
                    path,
                    pricing: config.pricing,
                }),
                MeteringMode::Duration => service
                    .usage_log
                    .clone()
                    .map(|path| UsageLog::Duration { path }),
                MeteringMode::None => None,
            };

            collector.register(name.clone(), probe, usage);
        }

        Ok(collector)
    }

    /// Register a service by name.
    ///
    /// A service without a probe reports `unknown` status; a service
    /// without a usage log reports no usage summary.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        probe: Option<Arc<dyn ServiceProbe>>,
        usage: Option<UsageLog>,
    ) {
        self.services.push(ServiceEntry {
            name: name.into(),
            probe,
            usage,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Probe every registered service and assemble the composite report.
    ///
    /// Probes run concurrently; each is bounded by its own timeout, so
    /// collection latency is the slowest single deadline, not the sum.
    pub async fn collect(&self) -> StatusReport {
        let checks = self.services.iter().map(|entry| async {
            let report = collect_service(&self.client, entry).await;
            (entry.name.clone(), report)
        });

        let services = futures::future::join_all(checks).await.into_iter().collect();
        StatusReport::new(services)
    }
}

async fn collect_service(client: &reqwest::Client, entry: &ServiceEntry) -> ServiceReport {
    let mut report = match &entry.probe {
        Some(probe) => {
            let reading = probe.probe(client).await;
            let mut report = ServiceReport::from_outcome(&reading.outcome);
            if let Some(sample) = reading.quota {
                report.quota = Some(classify_quota(sample.used, sample.limit));
            }
            report
        }
        None => ServiceReport::unknown(),
    };

    match report.error.as_deref() {
        Some(error) => tracing::warn!(
            service = %entry.name,
            status = %report.status,
            latency_ms = report.latency_ms,
            error,
            "Service probe failed"
        ),
        None => tracing::debug!(
            service = %entry.name,
            status = %report.status,
            latency_ms = report.latency_ms,
            "Service probe completed"
        ),
    }

    report.usage = entry.usage.as_ref().map(|log| summarize_log(&entry.name, log));
    report
}

/// Load and reduce one usage log. Store failures degrade to an empty
/// summary of the right shape so the report stays well-formed.
fn summarize_log(service: &str, log: &UsageLog) -> UsageSummary {
    match log {
        UsageLog::Tokens { path, pricing } => match store::load_token_log(path) {
            Ok(records) => UsageSummary::Tokens(usage::summarize_token_usage(&records, pricing)),
            Err(e) => {
                tracing::warn!(
                    service,
                    path = %path.display(),
                    error = %e,
                    "Failed to load token usage log, reporting empty summary"
                );
                UsageSummary::Tokens(TokenUsageSummary::default())
            }
        },
        UsageLog::Duration { path } => match store::load_duration_log(path) {
            Ok(records) => UsageSummary::Duration(usage::summarize_duration_usage(&records)),
            Err(e) => {
                tracing::warn!(
                    service,
                    path = %path.display(),
                    error = %e,
                    "Failed to load duration usage log, reporting empty summary"
                );
                UsageSummary::Duration(DurationUsageSummary::default())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use async_trait::async_trait;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::probe::{ProbeReading, QuotaSample};
    use crate::status::{ProbeOutcome, ServiceStatus};

    struct FixedProbe {
        name: String,
        reading: ProbeReading,
    }

    impl FixedProbe {
        fn new(name: &str, reading: ProbeReading) -> Arc<dyn ServiceProbe> {
            Arc::new(Self {
                name: name.to_string(),
                reading,
            })
        }
    }

    #[async_trait]
    impl ServiceProbe for FixedProbe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn probe(&self, _client: &reqwest::Client) -> ProbeReading {
            self.reading.clone()
        }
    }

    fn online_reading() -> ProbeReading {
        ProbeReading::new(ProbeOutcome::Responded {
            latency_ms: 12,
            status_code: 200,
        })
    }

    #[tokio::test]
    async fn test_empty_collector_yields_empty_report() {
        let collector = StatusCollector::new(reqwest::Client::new());
        assert!(collector.is_empty());

        let report = collector.collect().await;
        assert!(report.services.is_empty());
    }

    #[tokio::test]
    async fn test_service_without_probe_is_unknown() {
        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register("log-only", None, None);

        let report = collector.collect().await;
        assert_eq!(report.get("log-only").unwrap().status, ServiceStatus::Unknown);
    }

    #[tokio::test]
    async fn test_quota_sample_is_classified() {
        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register(
            "elevenlabs",
            Some(FixedProbe::new(
                "elevenlabs",
                online_reading().with_quota(QuotaSample {
                    used: 9_500,
                    limit: 10_000,
                }),
            )),
            None,
        );

        let report = collector.collect().await;
        let quota = report.get("elevenlabs").unwrap().quota.unwrap();
        assert_eq!(quota.ratio_percent, 95.0);
        assert_eq!(quota.tier, crate::health::HealthTier::Critical);
    }

    #[tokio::test]
    async fn test_token_log_is_summarized() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"input_tokens": 1000, "output_tokens": 500},
                {"input_tokens": 2000, "output_tokens": 1000, "success": false}]"#,
        )
        .unwrap();

        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register(
            "gemini",
            Some(FixedProbe::new("gemini", online_reading())),
            Some(UsageLog::Tokens {
                path: file.path().to_path_buf(),
                pricing: TokenPricing::default(),
            }),
        );

        let report = collector.collect().await;
        let entry = report.get("gemini").unwrap();
        assert_eq!(entry.status, ServiceStatus::Online);

        match entry.usage.as_ref().unwrap() {
            UsageSummary::Tokens(summary) => {
                assert_eq!(summary.total_calls, 2);
                assert_eq!(summary.total_tokens, 4_500);
                assert_eq!(summary.failed_calls, 1);
            }
            other => panic!("expected token summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_log_reports_empty_summary() {
        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register(
            "tavus",
            Some(FixedProbe::new("tavus", online_reading())),
            Some(UsageLog::Duration {
                path: PathBuf::from("/nonexistent/tavus_log.json"),
            }),
        );

        let report = collector.collect().await;
        match report.get("tavus").unwrap().usage.as_ref().unwrap() {
            UsageSummary::Duration(summary) => {
                assert_eq!(*summary, DurationUsageSummary::default());
            }
            other => panic!("expected duration summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_corrupt_log_degrades_to_empty_summary() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ definitely not a json array").unwrap();

        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register(
            "gemini",
            None,
            Some(UsageLog::Tokens {
                path: file.path().to_path_buf(),
                pricing: TokenPricing::default(),
            }),
        );

        let report = collector.collect().await;
        match report.get("gemini").unwrap().usage.as_ref().unwrap() {
            UsageSummary::Tokens(summary) => {
                assert_eq!(*summary, TokenUsageSummary::default());
            }
            other => panic!("expected token summary, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_one_failing_probe_does_not_poison_others() {
        let mut collector = StatusCollector::new(reqwest::Client::new());
        collector.register(
            "up",
            Some(FixedProbe::new("up", online_reading())),
            None,
        );
        collector.register(
            "down",
            Some(FixedProbe::new(
                "down",
                ProbeReading::new(ProbeOutcome::Unreachable {
                    error: "connection refused".to_string(),
                }),
            )),
            None,
        );

        let report = collector.collect().await;
        assert_eq!(report.get("up").unwrap().status, ServiceStatus::Online);

        let down = report.get("down").unwrap();
        assert_eq!(down.status, ServiceStatus::Offline);
        assert_eq!(down.error.as_deref(), Some("connection refused"));
    }
}
