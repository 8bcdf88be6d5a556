/// The `netprobe` command: egress IP lookup followed by the download speed test
use anyhow::Context;
use reqwest::blocking::Client;
use std::sync::Arc;
use tracing::warn;
use url::Url;

use crate::cli::{output, Cli};
use crate::core::config::NetConfig;
use crate::net::{HttpSource, IpInfoProbe};
use crate::speed::{SpeedTest, SpeedTestReport};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = NetConfig::from_cli(cli.proxy_url, cli.thread_count);
    run_with_config(&config).map(|_| ())
}

pub fn run_with_config(config: &NetConfig) -> anyhow::Result<SpeedTestReport> {
    output::banner("Speed Test");
    output::info(&format!(
        "Proxy:   {}",
        config
            .proxy_url
            .as_deref()
            .map(redact_proxy)
            .unwrap_or_else(|| "direct".to_string())
    ));
    output::info(&format!("Threads: {}", config.threads));

    let source = HttpSource::from_config(config).context("Failed to set up HTTP client")?;

    display_ip_information(source.client(), config);

    output::section_header("Download test");
    output::info(&format!("Test file URL: {}", config.test_url));
    output::info(&format!("Threads:       {}", config.threads));

    let report = SpeedTest::from_config(Arc::new(source), config).run()?;
    display_report(&report);
    Ok(report)
}

/// Look up and print the egress IP. Failures are reported and swallowed.
pub fn display_ip_information(client: &Client, config: &NetConfig) {
    match IpInfoProbe::from_config(client, config).probe() {
        Ok(report) => {
            output::section_header(&format!("Egress IP lookup took {:.0} ms", report.latency_ms()));
            let or_unknown =
                |v: &Option<String>| v.clone().unwrap_or_else(|| "unknown".to_string());
            output::tree_section(&[
                ("IP", or_unknown(&report.info.ip)),
                ("ASN", or_unknown(&report.info.org)),
                ("Country", or_unknown(&report.info.country)),
            ]);
        }
        Err(e) => {
            warn!(endpoint = %config.ipinfo_endpoint, error = %e, "ip lookup failed");
            output::error(&format!("IP lookup failed: {}", e));
        }
    }
}

fn display_report(report: &SpeedTestReport) {
    println!();
    output::success(&format!(
        "Downloaded: {:.2} MB  Time: {:.1} s",
        report.megabytes(),
        report.elapsed_secs()
    ));
    output::success(&format!("Average speed: {}", report.formatted_throughput()));
    if report.total_bytes == 0 {
        output::warning("No data was received; check the connection or proxy");
    }
}

/// Hide proxy credentials before echoing the URL.
pub fn redact_proxy(proxy_url: &str) -> String {
    match Url::parse(proxy_url) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("****"));
            url.to_string()
        }
        _ => proxy_url.to_string(),
    }
}
