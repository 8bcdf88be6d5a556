//! Multi-threaded download speed test.
//!
//! A fixed number of fetch workers stream the same payload concurrently and report
//! the size of every chunk they read through a shared queue. A single consumer
//! drains the queue until every worker has signalled completion, then turns the
//! byte total and the wall-clock window into a throughput figure.

pub mod aggregator;
pub mod counter;
pub mod event;
pub mod format;
pub mod orchestrator;
pub mod worker;

pub use aggregator::{Aggregator, DrainSummary, EventSink};
pub use counter::ChunkCounter;
pub use event::ChunkEvent;
pub use format::{bytes_to_megabytes, format_human_readable_speed};
pub use orchestrator::{
    compute_throughput, SpeedTest, SpeedTestReport, TransferSession, MIN_ELAPSED_SECS,
};
pub use worker::{BodySource, FetchWorker, WorkerOutcome};
