//! Scenario configuration structures.

use serde::{Deserialize, Serialize};

/// Ordering policy of the shared work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueDiscipline {
    /// Strict insertion order (FIFO).
    Arrival,
    /// Highest priority first, insertion order within equal priorities.
    Priority,
}

/// Full configuration of one simulation run, fixed for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Resources created at pool initialization.
    pub base_capacity: u32,
    /// Number of producer threads.
    pub producers: u32,
    /// Work items each producer creates before finishing.
    pub tasks_per_producer: u32,
    /// Number of consumer threads; 0 derives a default from the CPU count.
    pub consumers: usize,
    /// Queue ordering policy.
    pub discipline: QueueDiscipline,
    /// Priorities assigned to successive items of each producer, cycled.
    /// Empty means a single uniform priority.
    pub priority_cycle: Vec<u8>,
    /// Queue depth above which the pool expands.
    pub queue_high_watermark: usize,
    /// Queue depth at or below which an expanded pool contracts. Must be
    /// strictly below the high watermark (hysteresis).
    pub queue_low_watermark: usize,
    /// Units added per expansion and reclaimed per contraction.
    pub grow_step: u32,
    /// Completion count below which degraded (accelerated) mode engages.
    pub completion_low_watermark: u64,
    /// Lower bound on a degraded-mode service time, in milliseconds.
    pub service_floor_ms: u64,
    /// Bounded wait for one resource acquisition, in milliseconds.
    pub acquire_timeout_ms: u64,
    /// Bounded wait for a contraction to reclaim permits, in milliseconds.
    pub shrink_wait_ms: u64,
    /// Consumer back-off when the queue is empty, in milliseconds.
    pub idle_backoff_ms: u64,
}

impl SimConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// A human-readable description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_capacity == 0 {
            return Err("base_capacity must be greater than 0".into());
        }
        if self.producers == 0 {
            return Err("producers must be greater than 0".into());
        }
        if self.tasks_per_producer == 0 {
            return Err("tasks_per_producer must be greater than 0".into());
        }
        if self.queue_high_watermark <= self.queue_low_watermark {
            return Err(
                "queue_high_watermark must be strictly above queue_low_watermark".into(),
            );
        }
        if self.grow_step == 0 {
            return Err("grow_step must be greater than 0".into());
        }
        if self.acquire_timeout_ms == 0 {
            return Err("acquire_timeout_ms must be greater than 0".into());
        }
        if self.idle_backoff_ms == 0 {
            return Err("idle_backoff_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// A parse or validation error description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Scenario preset: a fleet of arrivals competing for loading bays.
    ///
    /// Five bays, ten arrivals on a fixed cadence, FIFO service. The pool
    /// expands past a queue depth of five and contracts once the backlog
    /// falls to three; service accelerates until the first three
    /// completions land.
    #[must_use]
    pub fn loading_bays() -> Self {
        Self {
            base_capacity: 5,
            producers: 1,
            tasks_per_producer: 10,
            consumers: 6,
            discipline: QueueDiscipline::Arrival,
            priority_cycle: Vec::new(),
            queue_high_watermark: 5,
            queue_low_watermark: 3,
            grow_step: 1,
            completion_low_watermark: 3,
            service_floor_ms: 1000,
            acquire_timeout_ms: 10_000,
            shrink_wait_ms: 100,
            idle_backoff_ms: 100,
        }
    }

    /// Scenario preset: a priority-ordered feed over a degrading grid of
    /// processing units.
    ///
    /// Three units serve six sources of twenty items each, alternating
    /// normal/high priority. No elastic scaling; units fail permanently at
    /// random until the grid is gone and the run halts.
    #[must_use]
    pub fn degrading_grid() -> Self {
        Self {
            base_capacity: 3,
            producers: 6,
            tasks_per_producer: 20,
            consumers: 6,
            discipline: QueueDiscipline::Priority,
            priority_cycle: vec![1, 2],
            queue_high_watermark: 10_000,
            queue_low_watermark: 0,
            grow_step: 1,
            completion_low_watermark: 0,
            service_floor_ms: 1,
            acquire_timeout_ms: 10_000,
            shrink_wait_ms: 100,
            idle_backoff_ms: 100,
        }
    }
}
