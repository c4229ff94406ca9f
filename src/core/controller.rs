//! Load-responsive capacity and service-mode control.
//!
//! The controller is evaluated opportunistically at producer/consumer
//! checkpoints rather than by a timer thread. Expansion and contraction
//! use two distinct watermarks (hysteresis) so a pressure episode cannot
//! flap the pool, and the degraded-mode toggle is edge-triggered so a
//! repeated check never emits duplicate notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::context::SimContext;
use crate::core::elastic_pool::ElasticPool;
use crate::core::events::{EventEmitter, SimEvent};

/// Thresholds and steps driving the controller.
#[derive(Debug, Clone)]
pub struct ControlPolicy {
    /// Queue depth above which the pool expands.
    pub queue_high_watermark: usize,
    /// Queue depth at or below which an expanded pool contracts. Must be
    /// strictly below the high watermark.
    pub queue_low_watermark: usize,
    /// Units added per expansion and removed per contraction.
    pub grow_step: u32,
    /// Completion count below which degraded (accelerated) mode engages.
    pub completion_low_watermark: u64,
    /// Lower bound on a degraded-mode service time.
    pub service_floor: Duration,
    /// Bounded wait for a contraction to reclaim its permits.
    pub shrink_wait: Duration,
}

/// Decides expansion, contraction, and degraded-mode transitions from
/// observed queue depth and completion counts.
pub struct LoadController {
    policy: ControlPolicy,
    pool: Arc<ElasticPool>,
    ctx: Arc<SimContext>,
    emitter: EventEmitter,
    /// Expansion-episode gate. The depth check and the flag check-and-set
    /// share this critical section, so one pressure episode grows at most
    /// once no matter how many producers observe it.
    expanded: Mutex<bool>,
    degraded: AtomicBool,
}

impl LoadController {
    /// Wire a controller to the pool and shared context it steers.
    #[must_use]
    pub fn new(
        policy: ControlPolicy,
        pool: Arc<ElasticPool>,
        ctx: Arc<SimContext>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            policy,
            pool,
            ctx,
            emitter,
            expanded: Mutex::new(false),
            degraded: AtomicBool::new(false),
        }
    }

    /// Producer checkpoint, run after a push. `depth` is the queue depth
    /// observed right after the push.
    pub fn on_arrival(&self, depth: usize) {
        self.check_degraded_entry();
        let mut expanded = self.expanded.lock();
        if depth > self.policy.queue_high_watermark && !*expanded {
            self.pool.grow(self.policy.grow_step);
            *expanded = true;
            // Emitted under the gate so capacity events appear in the
            // order the transitions actually happened.
            self.emitter.emit(SimEvent::CapacityChanged {
                capacity: self.pool.health().capacity,
                delta: i64::from(self.policy.grow_step),
            });
        }
    }

    /// Consumer checkpoint, run before acquiring a resource.
    pub fn pre_service(&self) {
        self.check_degraded_entry();
    }

    /// Consumer checkpoint, run after a completed service and release.
    /// `depth` is the queue depth observed at the checkpoint.
    pub fn on_completion(&self, depth: usize) {
        self.check_degraded_exit();
        let mut expanded = self.expanded.lock();
        if depth <= self.policy.queue_low_watermark && *expanded {
            if self
                .pool
                .try_shrink(self.policy.grow_step, self.policy.shrink_wait)
            {
                *expanded = false;
                self.emitter.emit(SimEvent::CapacityChanged {
                    capacity: self.pool.health().capacity,
                    delta: -i64::from(self.policy.grow_step),
                });
            }
            // A failed shrink is not an error; the pool stays expanded and
            // a later checkpoint retries.
        }
    }

    /// Service time for one item: halved under degraded mode, floored.
    #[must_use]
    pub fn service_duration(&self, nominal: Duration) -> Duration {
        if self.degraded.load(Ordering::Acquire) {
            (nominal / 2).max(self.policy.service_floor)
        } else {
            nominal
        }
    }

    /// Whether degraded mode is currently engaged.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Whether the pool is currently expanded.
    #[must_use]
    pub fn expanded(&self) -> bool {
        *self.expanded.lock()
    }

    fn check_degraded_entry(&self) {
        if self.ctx.completed() < self.policy.completion_low_watermark
            && self
                .degraded
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            tracing::info!("degraded mode engaged, completions behind");
            self.emitter.emit(SimEvent::ModeChanged { degraded: true });
        }
    }

    fn check_degraded_exit(&self) {
        if self.ctx.completed() >= self.policy.completion_low_watermark
            && self
                .degraded
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            tracing::info!("degraded mode released");
            self.emitter.emit(SimEvent::ModeChanged { degraded: false });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{EventBus, InMemoryEventSink};

    fn fixture(policy: ControlPolicy) -> (LoadController, Arc<ElasticPool>, Arc<SimContext>, EventBus, crate::core::events::EventLog)
    {
        let sink = InMemoryEventSink::new();
        let log = sink.log();
        let bus = EventBus::new(Box::new(sink));
        let pool = Arc::new(ElasticPool::new(2));
        let ctx = Arc::new(SimContext::new());
        let controller = LoadController::new(
            policy,
            Arc::clone(&pool),
            Arc::clone(&ctx),
            bus.emitter(),
        );
        (controller, pool, ctx, bus, log)
    }

    fn policy() -> ControlPolicy {
        ControlPolicy {
            queue_high_watermark: 5,
            queue_low_watermark: 3,
            grow_step: 1,
            completion_low_watermark: 3,
            service_floor: Duration::from_millis(1),
            shrink_wait: Duration::from_millis(50),
        }
    }

    #[test]
    fn expansion_fires_once_per_episode() {
        let (controller, pool, _ctx, mut bus, log) = fixture(policy());
        controller.on_arrival(6);
        controller.on_arrival(7);
        controller.on_arrival(8);
        assert_eq!(pool.health().capacity, 3);
        assert!(controller.expanded());
        bus.close();
        let grows = log
            .snapshot()
            .iter()
            .filter(|r| matches!(r.event, SimEvent::CapacityChanged { delta, .. } if delta > 0))
            .count();
        assert_eq!(grows, 1);
    }

    #[test]
    fn no_expansion_at_or_below_watermark() {
        let (controller, pool, _ctx, _bus, _log) = fixture(policy());
        controller.on_arrival(5);
        assert_eq!(pool.health().capacity, 2);
        assert!(!controller.expanded());
    }

    #[test]
    fn contraction_needs_expansion_and_low_depth() {
        let (controller, pool, _ctx, _bus, _log) = fixture(policy());
        // Not expanded: depth below the low watermark does nothing.
        controller.on_completion(0);
        assert_eq!(pool.health().capacity, 2);

        controller.on_arrival(6);
        assert_eq!(pool.health().capacity, 3);

        // Expanded but depth still in the hysteresis band: hold.
        controller.on_completion(4);
        assert_eq!(pool.health().capacity, 3);

        controller.on_completion(3);
        assert_eq!(pool.health().capacity, 2);
        assert!(!controller.expanded());
    }

    #[test]
    fn degraded_mode_is_edge_triggered() {
        let (controller, _pool, ctx, mut bus, log) = fixture(policy());
        // Zero completions: engage once, repeats are silent.
        controller.on_arrival(0);
        controller.pre_service();
        controller.on_arrival(0);
        assert!(controller.degraded());

        for _ in 0..3 {
            ctx.record_completed();
        }
        controller.on_completion(0);
        controller.on_completion(0);
        assert!(!controller.degraded());

        bus.close();
        let toggles: Vec<bool> = log
            .snapshot()
            .iter()
            .filter_map(|r| match r.event {
                SimEvent::ModeChanged { degraded } => Some(degraded),
                _ => None,
            })
            .collect();
        assert_eq!(toggles, vec![true, false]);
    }

    #[test]
    fn degraded_service_time_is_halved_with_floor() {
        let (controller, _pool, _ctx, _bus, _log) = fixture(policy());
        let nominal = Duration::from_millis(40);
        assert_eq!(controller.service_duration(nominal), nominal);

        controller.pre_service();
        assert!(controller.degraded());
        assert_eq!(controller.service_duration(nominal), Duration::from_millis(20));
        // The floor wins for very short nominal times.
        assert_eq!(
            controller.service_duration(Duration::from_micros(100)),
            Duration::from_millis(1)
        );
    }
}
