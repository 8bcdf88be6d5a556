use crossbeam::channel::{unbounded, Receiver, Sender};

use super::event::ChunkEvent;

/// Producer side of the aggregator queue, one clone per fetch worker.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<ChunkEvent>,
}

impl EventSink {
    /// Never blocks. Events sent after the consumer has gone away are dropped.
    pub fn push(&self, event: ChunkEvent) {
        let _ = self.tx.send(event);
    }
}

/// Single-consumer side of an unbounded multi-producer queue of chunk events.
///
/// Events from one producer arrive in the order they were pushed; nothing is
/// promised about the interleaving of different producers.
pub struct Aggregator {
    rx: Receiver<ChunkEvent>,
}

/// Totals collected while draining the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub total_bytes: u64,
    pub done_events: usize,
    pub data_events: usize,
}

impl Aggregator {
    pub fn new() -> (EventSink, Aggregator) {
        let (tx, rx) = unbounded();
        (EventSink { tx }, Aggregator { rx })
    }

    /// Block until an event is available. `None` once every sink has been dropped
    /// and the queue is empty.
    pub fn recv(&self) -> Option<ChunkEvent> {
        self.rx.recv().ok()
    }

    /// Pop events until `expected_done` completion signals have been seen,
    /// handing each data chunk size to `on_data`.
    ///
    /// Stops early if all producers disconnect, so a lost worker cannot hang the
    /// consumer.
    pub fn drain<F>(&self, expected_done: usize, mut on_data: F) -> DrainSummary
    where
        F: FnMut(usize),
    {
        let mut summary = DrainSummary::default();

        while summary.done_events < expected_done {
            match self.recv() {
                Some(ChunkEvent::Data(n)) => {
                    summary.total_bytes += n as u64;
                    summary.data_events += 1;
                    on_data(n);
                }
                Some(ChunkEvent::Done) => summary.done_events += 1,
                None => {
                    tracing::warn!(
                        received = summary.done_events,
                        expected = expected_done,
                        "all producers disconnected before signalling completion"
                    );
                    break;
                }
            }
        }

        summary
    }
}
