//! Reachability probes for external services.
//!
//! Each service gets an independent probe with its own deadline, so one
//! slow API cannot hold up the rest of a status collection. Probes never
//! return errors: every failure mode is a [`ProbeOutcome`] variant.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use url::Url;

use crate::status::ProbeOutcome;

/// Default per-probe deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default header carrying the API key, for services that take one.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// A used/limit pair read from a service during a probe.
///
/// Most probes report `None`; quota-bound services (character or credit
/// budgets) attach a sample so the collector can classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSample {
    pub used: u64,
    pub limit: u64,
}

/// Everything one probe run learned about a service.
#[derive(Debug, Clone)]
pub struct ProbeReading {
    pub outcome: ProbeOutcome,
    pub quota: Option<QuotaSample>,
}

impl ProbeReading {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: QuotaSample) -> Self {
        self.quota = Some(quota);
        self
    }
}

impl From<ProbeOutcome> for ProbeReading {
    fn from(outcome: ProbeOutcome) -> Self {
        Self::new(outcome)
    }
}

/// A reachability check against one external service.
///
/// Implementations must not fail: network trouble belongs in the returned
/// outcome. [`HttpProbe`] covers the common case; services with richer
/// client behavior supply their own implementation.
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// The configured service name, used for logging and report keys.
    fn name(&self) -> &str;

    /// Run one probe.
    async fn probe(&self, client: &reqwest::Client) -> ProbeReading;
}

/// Generic HTTP GET probe: request a configured URL, optionally with an
/// API-key header, and classify the result.
///
/// When the service is declared to require a key and none is configured,
/// the probe short-circuits to [`ProbeOutcome::NoCredentials`] without
/// touching the network.
pub struct HttpProbe {
    name: String,
    url: Url,
    timeout: Duration,
    api_key: Option<String>,
    api_key_header: String,
    requires_key: bool,
}

impl HttpProbe {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
            timeout: DEFAULT_PROBE_TIMEOUT,
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            requires_key: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Declare that this service requires an API key, sent in `header`.
    /// Passing `None` (or an empty string) for the key makes the probe
    /// report `no_key` instead of going out on the wire.
    pub fn with_api_key(mut self, header: impl Into<String>, key: Option<String>) -> Self {
        self.api_key_header = header.into();
        self.api_key = key.filter(|k| !k.is_empty());
        self.requires_key = true;
        self
    }
}

#[async_trait]
impl ServiceProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self, client: &reqwest::Client) -> ProbeReading {
        if self.requires_key && self.api_key.is_none() {
            tracing::debug!(service = %self.name, "No API key configured, skipping probe");
            return ProbeOutcome::NoCredentials.into();
        }

        let mut request = client.get(self.url.clone());
        if let Some(key) = &self.api_key {
            request = request.header(&self.api_key_header, key);
        }

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => ProbeOutcome::Responded {
                latency_ms: start.elapsed().as_millis() as u64,
                status_code: response.status().as_u16(),
            },
            Ok(Err(e)) => ProbeOutcome::Unreachable {
                error: e.to_string(),
            },
            Err(_) => ProbeOutcome::TimedOut {
                after: self.timeout,
            },
        };

        outcome.into()
    }
}
