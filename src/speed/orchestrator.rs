use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::aggregator::Aggregator;
use super::format::{bytes_to_megabytes, format_human_readable_speed};
use super::worker::{BodySource, FetchWorker};
use crate::core::config::{NetConfig, DEFAULT_CHUNK_SIZE};
use crate::{NetprobeError, Result};

/// Floor applied to the measured window before dividing by it
pub const MIN_ELAPSED_SECS: f64 = 1e-6;

/// Mutable state of one run, owned by the consumer thread
#[derive(Debug)]
pub struct TransferSession {
    pub url: String,
    pub threads: usize,
    pub started: Instant,
    pub total_bytes: u64,
    pub done_events: usize,
}

impl TransferSession {
    fn start(url: &str, threads: usize) -> Self {
        Self {
            url: url.to_string(),
            threads,
            started: Instant::now(),
            total_bytes: 0,
            done_events: 0,
        }
    }

    fn finish(self) -> SpeedTestReport {
        SpeedTestReport {
            elapsed: self.started.elapsed(),
            url: self.url,
            threads: self.threads,
            total_bytes: self.total_bytes,
            done_events: self.done_events,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedTestReport {
    pub url: String,
    pub threads: usize,
    pub total_bytes: u64,
    pub elapsed: Duration,
    pub done_events: usize,
}

impl SpeedTestReport {
    pub fn megabytes(&self) -> f64 {
        bytes_to_megabytes(self.total_bytes)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Bytes per second over the whole test window
    pub fn throughput(&self) -> f64 {
        compute_throughput(self.total_bytes, self.elapsed_secs())
    }

    pub fn formatted_throughput(&self) -> String {
        format_human_readable_speed(self.throughput())
    }
}

/// Divide without ever dividing by zero: windows shorter than
/// [`MIN_ELAPSED_SECS`] (or not finite) are clamped to it.
pub fn compute_throughput(total_bytes: u64, elapsed_secs: f64) -> f64 {
    let secs = if elapsed_secs.is_finite() {
        elapsed_secs.max(MIN_ELAPSED_SECS)
    } else {
        MIN_ELAPSED_SECS
    };
    total_bytes as f64 / secs
}

/// Runs N concurrent downloads of one URL and measures aggregate throughput.
pub struct SpeedTest {
    source: Arc<dyn BodySource>,
    url: String,
    threads: usize,
    chunk_size: usize,
    show_progress: bool,
}

impl SpeedTest {
    pub fn new(source: Arc<dyn BodySource>, url: impl Into<String>, threads: usize) -> Self {
        Self {
            source,
            url: url.into(),
            threads: threads.max(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            show_progress: true,
        }
    }

    pub fn from_config(source: Arc<dyn BodySource>, config: &NetConfig) -> Self {
        Self::new(source, config.test_url.clone(), config.threads)
            .with_chunk_size(config.chunk_size)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Spawn the workers, drain their events and summarise.
    ///
    /// Worker failures only reduce the byte total. The run fails only when no
    /// worker thread could be started at all.
    pub fn run(&self) -> Result<SpeedTestReport> {
        let mut session = TransferSession::start(&self.url, self.threads);
        let (sink, aggregator) = Aggregator::new();

        let mut spawned = 0;
        for id in 0..self.threads {
            let source = Arc::clone(&self.source);
            let worker = FetchWorker::new(id, self.url.clone(), source, sink.clone())
                .with_chunk_size(self.chunk_size);
            // Handles are dropped: workers are detached and never joined.
            match worker.spawn() {
                Ok(_) => spawned += 1,
                Err(e) => error!(worker = id, error = %e, "failed to start download worker"),
            }
        }
        drop(sink);

        if spawned == 0 {
            return Err(NetprobeError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no download worker could be started",
            )));
        }
        debug!(spawned, url = %self.url, "download workers started");

        let progress = self.progress_bar();
        let summary = aggregator.drain(spawned, |n| progress.inc(n as u64));
        progress.finish_and_clear();

        session.total_bytes = summary.total_bytes;
        session.done_events = summary.done_events;
        let report = session.finish();

        info!(
            bytes = report.total_bytes,
            elapsed_secs = report.elapsed_secs(),
            throughput = %report.formatted_throughput(),
            "speed test complete"
        );
        Ok(report)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})",
        ) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}
