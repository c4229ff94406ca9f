//! Elastic bounded-resource pool with permit accounting and a free list.
//!
//! The pool owns every [`Resource`] it ever created. Permit accounting and
//! the broken set share one exclusion domain (a single `parking_lot` mutex
//! plus a condvar for waiters), so the invariant
//! `available + in_use == capacity` holds at every point no operation is
//! mid-critical-section, including expansion and contraction racing
//! acquire/release.
//!
//! `acquire` pops a healthy resource id off an explicit free list instead
//! of re-checking a broken set in a retry loop: a broken id is removed from
//! the free list inside `mark_broken`'s critical section, so a broken
//! resource is structurally unreachable from `acquire`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::error::PoolError;
use crate::core::resource::{Resource, ResourceId};

/// Outcome of a bounded acquire.
pub enum AcquireOutcome {
    /// A healthy resource was leased; dropping the grant releases it.
    Granted(ResourceGrant),
    /// No permit became available within the timeout. Recoverable.
    TimedOut,
}

impl AcquireOutcome {
    /// Whether a lease was granted.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Report of one `mark_broken` call.
#[derive(Debug, Clone, Copy)]
pub struct BreakReport {
    /// `true` only for the call that performed the transition.
    pub newly_broken: bool,
    /// Healthy resources left anywhere in the pool (in rotation or parked).
    pub healthy_remaining: u32,
    /// Broken resources so far.
    pub broken_total: u32,
}

/// Read-only snapshot of pool accounting.
#[derive(Debug, Clone, Copy)]
pub struct PoolHealth {
    /// Configured base capacity.
    pub base_capacity: u32,
    /// Healthy in-rotation resources (base + active expansions − broken).
    pub capacity: u32,
    /// Permits currently grantable (free-list length).
    pub available: u32,
    /// Permits currently leased out.
    pub in_use: u32,
    /// Resources broken so far.
    pub broken: u32,
    /// Healthy resources reclaimed by contraction, out of rotation.
    pub parked: u32,
}

struct PoolState {
    /// Every resource ever created; index equals id.
    resources: Vec<Resource>,
    /// Healthy, unleased, in-rotation ids. Length is the available count.
    free: VecDeque<ResourceId>,
    /// Healthy ids reclaimed by contraction; revived before minting new ids.
    parked: Vec<ResourceId>,
    /// Healthy in-rotation count (free + leased).
    capacity: u32,
    broken: u32,
}

impl PoolState {
    fn healthy_remaining(&self) -> u32 {
        self.capacity + self.parked.len() as u32
    }

    fn check_accounting(&self) {
        debug_assert!(self.free.len() as u32 <= self.capacity);
    }
}

/// Elastic pool of resources with runtime capacity growth and contraction.
pub struct ElasticPool {
    base_capacity: u32,
    state: Mutex<PoolState>,
    /// Signaled when permits return to the free list or capacity grows.
    freed: Condvar,
}

impl ElasticPool {
    /// Create a pool with `base_capacity` healthy resources, ids `0..base`.
    #[must_use]
    pub fn new(base_capacity: u32) -> Self {
        let resources: Vec<Resource> = (0..base_capacity).map(Resource::new).collect();
        let free: VecDeque<ResourceId> = (0..base_capacity).collect();
        Self {
            base_capacity,
            state: Mutex::new(PoolState {
                resources,
                free,
                parked: Vec::new(),
                capacity: base_capacity,
                broken: 0,
            }),
            freed: Condvar::new(),
        }
    }

    /// Block until a healthy resource can be leased or `timeout` elapses.
    pub fn acquire(self: &Arc<Self>, timeout: Duration) -> AcquireOutcome {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(id) = state.free.pop_front() {
                state.check_accounting();
                tracing::trace!(resource = id, "permit granted");
                return AcquireOutcome::Granted(ResourceGrant {
                    pool: Arc::clone(self),
                    id,
                });
            }
            let now = Instant::now();
            if now >= deadline {
                return AcquireOutcome::TimedOut;
            }
            if self.freed.wait_for(&mut state, deadline - now).timed_out() {
                // One last look: a release may have slipped in between the
                // timeout and reacquiring the lock.
                return match state.free.pop_front() {
                    Some(id) => AcquireOutcome::Granted(ResourceGrant {
                        pool: Arc::clone(self),
                        id,
                    }),
                    None => AcquireOutcome::TimedOut,
                };
            }
        }
    }

    /// Raise capacity by `extra` units, reviving parked resources before
    /// minting new ids. Safe to call concurrently with acquire/release.
    pub fn grow(&self, extra: u32) {
        let mut state = self.state.lock();
        for _ in 0..extra {
            let id = match state.parked.pop() {
                Some(id) => id,
                None => {
                    let id = state.resources.len() as ResourceId;
                    state.resources.push(Resource::new(id));
                    id
                }
            };
            state.free.push_back(id);
            state.capacity += 1;
        }
        let capacity = state.capacity;
        drop(state);
        self.freed.notify_all();
        tracing::info!(extra, capacity, "pool grew");
    }

    /// Attempt to retire `permits` units of capacity within `max_wait`.
    ///
    /// The permits to remove are taken off the free list, so contraction
    /// can never pull capacity out from under a lease. If the full amount
    /// cannot be reclaimed in time, anything partially taken is restored
    /// and the shrink is a no-op.
    pub fn try_shrink(&self, permits: u32, max_wait: Duration) -> bool {
        let deadline = Instant::now() + max_wait;
        let mut state = self.state.lock();
        let mut taken: Vec<ResourceId> = Vec::with_capacity(permits as usize);
        while (taken.len() as u32) < permits {
            if let Some(id) = state.free.pop_front() {
                taken.push(id);
                continue;
            }
            let now = Instant::now();
            if now >= deadline || self.freed.wait_for(&mut state, deadline - now).timed_out() {
                break;
            }
        }
        if taken.len() as u32 == permits {
            state.capacity -= permits;
            state.parked.extend(taken);
            state.check_accounting();
            tracing::info!(permits, capacity = state.capacity, "pool shrank");
            true
        } else {
            let restored = !taken.is_empty();
            for id in taken {
                state.free.push_back(id);
            }
            drop(state);
            if restored {
                self.freed.notify_all();
            }
            tracing::debug!(permits, "shrink skipped, permits busy");
            false
        }
    }

    /// Flag a resource permanently unusable. Idempotent: repeat calls on a
    /// broken id change nothing. Effective capacity drops exactly once.
    pub fn mark_broken(&self, id: ResourceId) -> Result<BreakReport, PoolError> {
        let mut state = self.state.lock();
        if id as usize >= state.resources.len() {
            return Err(PoolError::UnknownResource(id));
        }
        if !state.resources[id as usize].break_down() {
            return Ok(BreakReport {
                newly_broken: false,
                healthy_remaining: state.healthy_remaining(),
                broken_total: state.broken,
            });
        }
        state.broken += 1;
        if let Some(pos) = state.free.iter().position(|&f| f == id) {
            // Idle unit: pull it out of rotation before anyone leases it.
            let _ = state.free.remove(pos);
            state.capacity -= 1;
        } else if let Some(pos) = state.parked.iter().position(|&p| p == id) {
            let _ = state.parked.swap_remove(pos);
        } else {
            // Leased unit: capacity drops now, the permit retires when the
            // holder releases.
            state.capacity -= 1;
        }
        state.check_accounting();
        let report = BreakReport {
            newly_broken: true,
            healthy_remaining: state.healthy_remaining(),
            broken_total: state.broken,
        };
        drop(state);
        tracing::warn!(
            resource = id,
            healthy_remaining = report.healthy_remaining,
            "resource marked broken"
        );
        Ok(report)
    }

    /// Read-only accounting snapshot.
    pub fn health(&self) -> PoolHealth {
        let state = self.state.lock();
        let available = state.free.len() as u32;
        PoolHealth {
            base_capacity: self.base_capacity,
            capacity: state.capacity,
            available,
            in_use: state.capacity - available,
            broken: state.broken,
            parked: state.parked.len() as u32,
        }
    }

    /// Ids of every broken resource, for the final summary.
    pub fn broken_ids(&self) -> Vec<ResourceId> {
        let state = self.state.lock();
        state
            .resources
            .iter()
            .filter(|r| !r.is_healthy())
            .map(Resource::id)
            .collect()
    }

    fn release(&self, id: ResourceId) {
        let mut state = self.state.lock();
        if state.resources[id as usize].is_healthy() {
            debug_assert!(!state.free.contains(&id));
            state.free.push_back(id);
            state.check_accounting();
            drop(state);
            self.freed.notify_one();
        } else {
            // The unit broke mid-service; capacity already dropped in
            // mark_broken, so the permit retires with it and accounting
            // stays exact.
            tracing::trace!(resource = id, "permit retired with broken resource");
        }
    }
}

/// Scoped lease on one resource. Dropping the grant returns the permit on
/// every exit path, including failure paths.
pub struct ResourceGrant {
    pool: Arc<ElasticPool>,
    id: ResourceId,
}

impl ResourceGrant {
    /// Id of the leased resource.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for ResourceGrant {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}
