//! Structured domain events and the sink/bus plumbing that carries them.
//!
//! The core emits discrete events at every observable transition; rendering
//! them (console text, log lines) is a sink concern, never a core concern.
//! Events travel over a channel to a dedicated drain thread so emitters
//! never block on a slow sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::resource::ResourceId;
use crate::core::task_queue::TaskId;
use crate::util::clock::now_ms;

/// A domain event observable at the system boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SimEvent {
    /// A producer pushed a new work item.
    TaskArrived {
        /// Item identifier.
        task: TaskId,
        /// Producer that created it.
        source: u32,
        /// Queue depth right after the push.
        depth: usize,
    },
    /// A consumer leased a resource and began service.
    ServiceStarted {
        /// Item identifier.
        task: TaskId,
        /// Resource performing the service.
        resource: ResourceId,
    },
    /// Service finished normally and the lease was returned.
    ServiceCompleted {
        /// Item identifier.
        task: TaskId,
        /// Resource that performed the service.
        resource: ResourceId,
        /// Total completions including this one.
        completed: u64,
    },
    /// Service was abandoned because the resource failed mid-service.
    ServiceAborted {
        /// Item identifier.
        task: TaskId,
        /// Resource that failed.
        resource: ResourceId,
    },
    /// No resource became available within the acquire timeout; the item
    /// was dropped. Recoverable.
    AcquireTimedOut {
        /// Item identifier.
        task: TaskId,
    },
    /// A resource was marked permanently broken.
    ResourceBroken {
        /// The broken resource.
        resource: ResourceId,
        /// Healthy resources left in rotation.
        healthy_remaining: u32,
    },
    /// Pool capacity changed (expansion or contraction).
    CapacityChanged {
        /// Capacity after the change.
        capacity: u32,
        /// Signed size of the change in units.
        delta: i64,
    },
    /// Degraded (accelerated-service) mode was entered or left.
    ModeChanged {
        /// New mode: `true` when degraded.
        degraded: bool,
    },
    /// A producer exhausted its quota and exited.
    ProducerFinished {
        /// The finished producer.
        source: u32,
    },
    /// All resources are broken; the system stopped admitting work.
    /// Terminal, emitted exactly once per run.
    SystemHalted {
        /// Number of broken resources at the halt.
        broken: usize,
    },
}

/// An event stamped with a monotonic sequence number and wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing per-run sequence number.
    pub seq: u64,
    /// Wall-clock milliseconds since epoch at emission.
    pub at_ms: u128,
    /// The event itself.
    pub event: SimEvent,
}

/// Event sink abstraction. Sinks run on the drain thread.
pub trait EventSink: Send {
    /// Record one event.
    fn record(&mut self, record: EventRecord);
}

/// Shared view over the records collected by an [`InMemoryEventSink`].
#[derive(Clone)]
pub struct EventLog {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl EventLog {
    /// Snapshot of all records collected so far, in emission order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }

    /// Number of records collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing was collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory event sink for tests and development.
pub struct InMemoryEventSink {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl InMemoryEventSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle that stays readable after the sink moves into the bus.
    #[must_use]
    pub fn log(&self) -> EventLog {
        EventLog {
            records: Arc::clone(&self.records),
        }
    }
}

impl Default for InMemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, record: EventRecord) {
        self.records.lock().push(record);
    }
}

/// Sink that renders events as structured tracing output.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&mut self, record: EventRecord) {
        match &record.event {
            SimEvent::TaskArrived { task, source, depth } => {
                tracing::info!(seq = record.seq, task, source, depth, "task arrived");
            }
            SimEvent::ServiceStarted { task, resource } => {
                tracing::info!(seq = record.seq, task, resource, "service started");
            }
            SimEvent::ServiceCompleted {
                task,
                resource,
                completed,
            } => {
                tracing::info!(seq = record.seq, task, resource, completed, "service completed");
            }
            SimEvent::ServiceAborted { task, resource } => {
                tracing::warn!(seq = record.seq, task, resource, "service aborted");
            }
            SimEvent::AcquireTimedOut { task } => {
                tracing::warn!(seq = record.seq, task, "acquire timed out, item dropped");
            }
            SimEvent::ResourceBroken {
                resource,
                healthy_remaining,
            } => {
                tracing::warn!(seq = record.seq, resource, healthy_remaining, "resource broken");
            }
            SimEvent::CapacityChanged { capacity, delta } => {
                tracing::info!(seq = record.seq, capacity, delta, "capacity changed");
            }
            SimEvent::ModeChanged { degraded } => {
                tracing::info!(seq = record.seq, degraded, "mode changed");
            }
            SimEvent::ProducerFinished { source } => {
                tracing::info!(seq = record.seq, source, "producer finished");
            }
            SimEvent::SystemHalted { broken } => {
                tracing::error!(seq = record.seq, broken, "all resources broken, system halted");
            }
        }
    }
}

/// Wire format between emitters and the drain thread.
enum BusMessage {
    Record(EventRecord),
    Shutdown,
}

/// Cloneable emitter handed to every producer and consumer thread.
#[derive(Clone)]
pub struct EventEmitter {
    tx: Sender<BusMessage>,
    seq: Arc<AtomicU64>,
}

impl EventEmitter {
    /// Stamp and send one event. Sending never blocks; after the bus is
    /// closed the event is discarded.
    pub fn emit(&self, event: SimEvent) {
        let record = EventRecord {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            at_ms: now_ms(),
            event,
        };
        let _ = self.tx.send(BusMessage::Record(record));
    }
}

/// Channel-fed event pipeline: emitters on one side, a single sink drained
/// by a dedicated thread on the other.
pub struct EventBus {
    tx: Sender<BusMessage>,
    drain: Option<JoinHandle<()>>,
    seq: Arc<AtomicU64>,
}

impl EventBus {
    /// Start the drain thread over `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        let (tx, rx) = unbounded::<BusMessage>();
        let drain = thread::Builder::new()
            .name("event-drain".into())
            .spawn(move || {
                let mut sink = sink;
                for msg in rx.iter() {
                    match msg {
                        BusMessage::Record(record) => sink.record(record),
                        BusMessage::Shutdown => break,
                    }
                }
            })
            .expect("failed to spawn event drain thread");
        Self {
            tx,
            drain: Some(drain),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create an emitter for a worker thread.
    #[must_use]
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            tx: self.tx.clone(),
            seq: Arc::clone(&self.seq),
        }
    }

    /// Close the bus: every event sent before this call reaches the sink,
    /// anything emitted afterwards is discarded. Idempotent.
    ///
    /// The shutdown marker queues behind already-sent events, so this never
    /// blocks on live emitters.
    pub fn close(&mut self) {
        if let Some(handle) = self.drain.take() {
            let _ = self.tx.send(BusMessage::Shutdown);
            if handle.join().is_err() {
                tracing::error!("event drain thread panicked");
            }
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_delivers_in_emission_order() {
        let sink = InMemoryEventSink::new();
        let log = sink.log();
        let mut bus = EventBus::new(Box::new(sink));
        let emitter = bus.emitter();

        for i in 0..10u64 {
            emitter.emit(SimEvent::TaskArrived {
                task: i,
                source: 1,
                depth: i as usize,
            });
        }
        drop(emitter);
        bus.close();

        let records = log.snapshot();
        assert_eq!(records.len(), 10);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.seq, i as u64);
        }
    }

    #[test]
    fn emit_after_close_is_discarded() {
        let sink = InMemoryEventSink::new();
        let log = sink.log();
        let mut bus = EventBus::new(Box::new(sink));
        let emitter = bus.emitter();
        emitter.emit(SimEvent::ModeChanged { degraded: true });
        // Close with an emitter still live: delivered events are flushed,
        // later ones go nowhere.
        bus.close();
        emitter.emit(SimEvent::ModeChanged { degraded: false });
        assert_eq!(log.len(), 1);
    }
}
