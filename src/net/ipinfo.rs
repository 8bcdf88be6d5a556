//! Egress IP lookup against a public IP-metadata endpoint

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::core::config::NetConfig;
use crate::Result;

/// The subset of the endpoint's JSON document we report on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(default)]
    pub ip: Option<String>,
    /// ASN and organisation, e.g. `AS13335 Cloudflare, Inc.`
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IpReport {
    pub info: IpInfo,
    pub latency: Duration,
}

impl IpReport {
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

pub struct IpInfoProbe<'a> {
    client: &'a Client,
    endpoint: String,
    timeout: Duration,
}

impl<'a> IpInfoProbe<'a> {
    pub fn new(client: &'a Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(NetConfig::default().probe_timeout_secs),
        }
    }

    pub fn from_config(client: &'a Client, config: &NetConfig) -> Self {
        Self::new(client, config.ipinfo_endpoint.clone())
            .with_timeout(Duration::from_secs(config.probe_timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One GET; latency covers the request and decoding the body.
    pub fn probe(&self) -> Result<IpReport> {
        let start = Instant::now();
        let body = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()?
            .error_for_status()?
            .text()?;
        let info: IpInfo = serde_json::from_str(&body)?;
        let latency = start.elapsed();

        debug!(endpoint = %self.endpoint, ?latency, ?info, "ip lookup complete");
        Ok(IpReport { info, latency })
    }
}
