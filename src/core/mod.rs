//! Core coordination components: pool, queue, controller, failure tracking.

pub mod context;
pub mod controller;
pub mod coordinator;
pub mod elastic_pool;
pub mod error;
pub mod events;
pub mod failure;
pub mod resource;
pub mod stimulus;
pub mod task_queue;

pub use context::SimContext;
pub use controller::{ControlPolicy, LoadController};
pub use coordinator::{RunSummary, WorkerCoordinator};
pub use elastic_pool::{AcquireOutcome, BreakReport, ElasticPool, PoolHealth, ResourceGrant};
pub use error::{AppResult, PoolError};
pub use events::{
    EventBus, EventEmitter, EventLog, EventRecord, EventSink, InMemoryEventSink, SimEvent,
    TracingEventSink,
};
pub use failure::{FailureSeverity, FailureTracker};
pub use resource::{Health, Resource, ResourceId};
pub use stimulus::Stimulus;
pub use task_queue::{task_id, TaskId, WorkItem, WorkQueue};
