use reqwest::blocking::Client;
use reqwest::Proxy;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

use crate::core::config::NetConfig;
use crate::speed::worker::BodySource;
use crate::{NetprobeError, Result};

/// Build the one client configuration every request of a run goes through.
///
/// System proxy environment variables are ignored: traffic is either direct or
/// routed through the configured proxy.
pub fn build_client(config: &NetConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.download_timeout_secs));

    builder = match config.proxy_url.as_deref() {
        Some(url) => {
            let proxy = Proxy::all(url).map_err(|e| {
                NetprobeError::Configuration(format!("Invalid proxy URL '{}': {}", url, e))
            })?;
            debug!(proxy = url, "routing traffic through proxy");
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| NetprobeError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Streams response bodies over a shared blocking client.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &NetConfig) -> Result<Self> {
        Ok(Self::new(build_client(config)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl BodySource for HttpSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        debug!(
            url,
            status = %response.status(),
            content_length = ?response.content_length(),
            "response headers received"
        );
        Ok(Box::new(response))
    }
}
