use std::io::{self, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use super::aggregator::EventSink;
use super::counter::ChunkCounter;
use super::event::ChunkEvent;
use crate::cli::output;
use crate::core::config::DEFAULT_CHUNK_SIZE;
use crate::{NetprobeError, Result};

/// Opens a streaming body for a URL.
///
/// Implementations must report transport failures, including non-success
/// statuses, as errors from `open` or from reads on the returned body.
pub trait BodySource: Send + Sync {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>>;
}

#[derive(Debug, Clone, Default)]
pub struct WorkerOutcome {
    pub bytes: u64,
    pub error: Option<String>,
}

impl WorkerOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Pushes the terminal `Done` when dropped, including during a panic unwind.
struct DoneGuard {
    sink: EventSink,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.sink.push(ChunkEvent::Done);
    }
}

/// Streams one copy of the payload and reports every chunk to the aggregator.
pub struct FetchWorker {
    id: usize,
    url: String,
    source: Arc<dyn BodySource>,
    sink: EventSink,
    chunk_size: usize,
}

impl FetchWorker {
    pub fn new(
        id: usize,
        url: impl Into<String>,
        source: Arc<dyn BodySource>,
        sink: EventSink,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            source,
            sink,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Download to completion or first failure. Failures are logged, never
    /// returned; exactly one `Done` is emitted either way.
    pub fn run(self) -> WorkerOutcome {
        let _done = DoneGuard {
            sink: self.sink.clone(),
        };

        let mut bytes = 0u64;
        match self.stream(&mut bytes) {
            Ok(()) => {
                debug!(worker = self.id, bytes, "download finished");
                WorkerOutcome { bytes, error: None }
            }
            Err(e) => {
                warn!(
                    worker = self.id,
                    url = %self.url,
                    bytes,
                    error = %e,
                    "download worker failed"
                );
                output::error(&format!("Download worker {} failed: {}", self.id, e));
                WorkerOutcome {
                    bytes,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Run on a named background thread. The handle may be dropped to detach it.
    pub fn spawn(self) -> io::Result<JoinHandle<WorkerOutcome>> {
        thread::Builder::new()
            .name(format!("fetch-worker-{}", self.id))
            .spawn(move || self.run())
    }

    fn stream(&self, bytes: &mut u64) -> Result<()> {
        let body = self.source.open(&self.url)?;
        let mut counter = ChunkCounter::new(body, self.chunk_size);

        while let Some(n) = counter
            .next_chunk()
            .map_err(|e| NetprobeError::Network(format!("body read failed: {}", e)))?
        {
            self.sink.push(ChunkEvent::Data(n));
            *bytes += n as u64;
        }
        Ok(())
    }
}
