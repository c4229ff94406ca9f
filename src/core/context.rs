//! Shared run state passed by reference to every thread.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Process-wide mutable run state.
///
/// Every field is an atomic; readers take unlocked snapshots, which is
/// acceptable because these counts feed hysteresis-gated heuristics, not
/// correctness-critical invariants. The one exception is [`halt`], whose
/// swap makes the terminal transition observable exactly once.
///
/// [`halt`]: SimContext::halt
#[derive(Debug)]
pub struct SimContext {
    running: AtomicBool,
    completed: AtomicU64,
    dropped: AtomicU64,
    aborted: AtomicU64,
    finished_producers: AtomicU32,
}

impl SimContext {
    /// Fresh context with the system running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            completed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            finished_producers: AtomicU32::new(0),
        }
    }

    /// Whether producers may create work and consumers may start service.
    #[must_use]
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Flip `running` to false. Returns `true` only for the single caller
    /// that performed the transition; the flag never reverses.
    pub fn halt(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    /// Record one completed service; returns the new total.
    pub fn record_completed(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Completed service count.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Record one item dropped on acquire timeout; returns the new total.
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Dropped item count.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    /// Record one service abandoned to a resource failure; returns the new
    /// total.
    pub fn record_aborted(&self) -> u64 {
        self.aborted.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Abandoned service count.
    #[must_use]
    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Acquire)
    }

    /// Record one producer reaching its quota; returns the new total.
    pub fn record_producer_finished(&self) -> u32 {
        self.finished_producers.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of producers that exhausted their quota.
    #[must_use]
    pub fn finished_producers(&self) -> u32 {
        self.finished_producers.load(Ordering::Acquire)
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}
