//! Producer/consumer thread orchestration.
//!
//! The coordinator owns every thread in a run. Producers push work and pace
//! themselves; consumers pop, lease a resource, service the item, and run
//! the controller checkpoints. Shutdown is cooperative: every loop checks
//! the shared running flag and no thread is ever interrupted mid-service.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::{QueueDiscipline, SimConfig};
use crate::core::context::SimContext;
use crate::core::controller::{ControlPolicy, LoadController};
use crate::core::elastic_pool::{AcquireOutcome, ElasticPool};
use crate::core::error::PoolError;
use crate::core::events::{EventBus, EventEmitter, EventSink, SimEvent};
use crate::core::failure::FailureTracker;
use crate::core::resource::ResourceId;
use crate::core::stimulus::Stimulus;
use crate::core::task_queue::{WorkItem, WorkQueue};
use crate::infra::queue::{ArrivalQueue, RankedQueue};

/// Final accounting for one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Services that finished normally.
    pub completed: u64,
    /// Items dropped on acquire timeout.
    pub dropped: u64,
    /// Services abandoned to resource failures.
    pub aborted: u64,
    /// Ids of every resource broken during the run.
    pub broken: Vec<ResourceId>,
    /// Healthy resources left at the end.
    pub healthy_remaining: u32,
    /// Whether the run ended in the terminal all-broken halt.
    pub halted: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Drives N producer and M consumer threads over one shared queue and pool.
pub struct WorkerCoordinator {
    cfg: SimConfig,
    consumers: usize,
    pool: Arc<ElasticPool>,
    queue: Arc<Mutex<Box<dyn WorkQueue>>>,
    controller: Arc<LoadController>,
    tracker: Arc<FailureTracker>,
    ctx: Arc<SimContext>,
    stimulus: Arc<dyn Stimulus>,
    bus: EventBus,
}

impl WorkerCoordinator {
    /// Wire a coordinator from validated configuration, a stimulus source,
    /// and an event sink.
    ///
    /// # Errors
    ///
    /// `PoolError::InvalidConfig` when the configuration fails validation.
    pub fn new(
        cfg: SimConfig,
        stimulus: Arc<dyn Stimulus>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, PoolError> {
        cfg.validate().map_err(PoolError::InvalidConfig)?;

        let bus = EventBus::new(sink);
        let pool = Arc::new(ElasticPool::new(cfg.base_capacity));
        let queue: Box<dyn WorkQueue> = match cfg.discipline {
            QueueDiscipline::Arrival => Box::new(ArrivalQueue::new()),
            QueueDiscipline::Priority => Box::new(RankedQueue::new()),
        };
        let ctx = Arc::new(SimContext::new());
        let controller = Arc::new(LoadController::new(
            ControlPolicy {
                queue_high_watermark: cfg.queue_high_watermark,
                queue_low_watermark: cfg.queue_low_watermark,
                grow_step: cfg.grow_step,
                completion_low_watermark: cfg.completion_low_watermark,
                service_floor: Duration::from_millis(cfg.service_floor_ms),
                shrink_wait: Duration::from_millis(cfg.shrink_wait_ms),
            },
            Arc::clone(&pool),
            Arc::clone(&ctx),
            bus.emitter(),
        ));
        let tracker = Arc::new(FailureTracker::new(
            Arc::clone(&pool),
            Arc::clone(&ctx),
            bus.emitter(),
        ));
        let consumers = if cfg.consumers == 0 {
            num_cpus::get().clamp(2, 8)
        } else {
            cfg.consumers
        };

        Ok(Self {
            cfg,
            consumers,
            pool,
            queue: Arc::new(Mutex::new(queue)),
            controller,
            tracker,
            ctx,
            stimulus,
            bus,
        })
    }

    /// Shared context, mainly for tests that inspect counters mid-run.
    #[must_use]
    pub fn context(&self) -> Arc<SimContext> {
        Arc::clone(&self.ctx)
    }

    /// Run the scenario to completion and return the final accounting.
    pub fn run(mut self) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            %run_id,
            producers = self.cfg.producers,
            consumers = self.consumers,
            base_capacity = self.cfg.base_capacity,
            "run started"
        );

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for source in 1..=self.cfg.producers {
            handles.push(self.spawn_producer(source));
        }
        for worker in 0..self.consumers {
            handles.push(self.spawn_consumer(worker));
        }
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
        self.bus.close();

        let health = self.pool.health();
        let summary = RunSummary {
            run_id,
            completed: self.ctx.completed(),
            dropped: self.ctx.dropped(),
            aborted: self.ctx.aborted(),
            broken: self.pool.broken_ids(),
            healthy_remaining: health.capacity + health.parked,
            halted: !self.ctx.running(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            %run_id,
            completed = summary.completed,
            dropped = summary.dropped,
            aborted = summary.aborted,
            halted = summary.halted,
            "run finished"
        );
        summary
    }

    fn spawn_producer(&self, source: u32) -> JoinHandle<()> {
        let quota = self.cfg.tasks_per_producer;
        let cycle = self.cfg.priority_cycle.clone();
        let queue = Arc::clone(&self.queue);
        let ctx = Arc::clone(&self.ctx);
        let controller = Arc::clone(&self.controller);
        let stimulus = Arc::clone(&self.stimulus);
        let emitter = self.bus.emitter();

        thread::Builder::new()
            .name(format!("producer-{source}"))
            .spawn(move || {
                producer_loop(source, quota, &cycle, &queue, &ctx, &controller, &stimulus, &emitter);
            })
            .expect("failed to spawn producer thread")
    }

    fn spawn_consumer(&self, worker: usize) -> JoinHandle<()> {
        let producers = self.cfg.producers;
        let acquire_timeout = Duration::from_millis(self.cfg.acquire_timeout_ms);
        let idle_backoff = Duration::from_millis(self.cfg.idle_backoff_ms);
        let pool = Arc::clone(&self.pool);
        let queue = Arc::clone(&self.queue);
        let ctx = Arc::clone(&self.ctx);
        let controller = Arc::clone(&self.controller);
        let tracker = Arc::clone(&self.tracker);
        let stimulus = Arc::clone(&self.stimulus);
        let emitter = self.bus.emitter();

        thread::Builder::new()
            .name(format!("worker-{worker}"))
            .spawn(move || {
                consumer_loop(
                    producers,
                    acquire_timeout,
                    idle_backoff,
                    &pool,
                    &queue,
                    &ctx,
                    &controller,
                    &tracker,
                    &stimulus,
                    &emitter,
                );
            })
            .expect("failed to spawn consumer thread")
    }
}

#[allow(clippy::too_many_arguments)]
fn producer_loop(
    source: u32,
    quota: u32,
    cycle: &[u8],
    queue: &Arc<Mutex<Box<dyn WorkQueue>>>,
    ctx: &Arc<SimContext>,
    controller: &Arc<LoadController>,
    stimulus: &Arc<dyn Stimulus>,
    emitter: &EventEmitter,
) {
    for seq in 1..=quota {
        if !ctx.running() {
            tracing::debug!(source, "producer stopping, system halted");
            break;
        }
        let priority = if cycle.is_empty() {
            0
        } else {
            cycle[(seq as usize - 1) % cycle.len()]
        };
        let item = WorkItem::new(source, seq, priority);
        let task = item.id;
        let depth = {
            let mut q = queue.lock();
            q.push(item);
            q.len()
        };
        emitter.emit(SimEvent::TaskArrived {
            task,
            source,
            depth,
        });
        controller.on_arrival(depth);
        thread::sleep(stimulus.arrival_delay(source));
    }
    ctx.record_producer_finished();
    emitter.emit(SimEvent::ProducerFinished { source });
}

#[allow(clippy::too_many_arguments)]
fn consumer_loop(
    producers: u32,
    acquire_timeout: Duration,
    idle_backoff: Duration,
    pool: &Arc<ElasticPool>,
    queue: &Arc<Mutex<Box<dyn WorkQueue>>>,
    ctx: &Arc<SimContext>,
    controller: &Arc<LoadController>,
    tracker: &Arc<FailureTracker>,
    stimulus: &Arc<dyn Stimulus>,
    emitter: &EventEmitter,
) {
    while ctx.running() {
        let item = queue.lock().pop();
        let Some(item) = item else {
            if ctx.finished_producers() == producers && queue.lock().is_empty() {
                break;
            }
            thread::sleep(idle_backoff);
            continue;
        };

        controller.pre_service();
        match pool.acquire(acquire_timeout) {
            AcquireOutcome::Granted(grant) => {
                let resource = grant.id();
                emitter.emit(SimEvent::ServiceStarted {
                    task: item.id,
                    resource,
                });
                thread::sleep(controller.service_duration(stimulus.service_time(&item)));
                if stimulus.breaks_during_service(&item) {
                    if let Err(err) = tracker.report_failure(resource) {
                        tracing::error!(resource, %err, "failure report rejected");
                    }
                    ctx.record_aborted();
                    emitter.emit(SimEvent::ServiceAborted {
                        task: item.id,
                        resource,
                    });
                    // The grant drop below still releases; the permit
                    // retires inside the pool because the unit is broken.
                    drop(grant);
                } else {
                    drop(grant);
                    let completed = ctx.record_completed();
                    emitter.emit(SimEvent::ServiceCompleted {
                        task: item.id,
                        resource,
                        completed,
                    });
                    let depth = queue.lock().len();
                    controller.on_completion(depth);
                }
            }
            AcquireOutcome::TimedOut => {
                ctx.record_dropped();
                emitter.emit(SimEvent::AcquireTimedOut { task: item.id });
            }
        }
    }
}
