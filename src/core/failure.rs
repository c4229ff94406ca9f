//! Resource breakage tracking and the terminal exhaustion transition.

use std::sync::Arc;

use crate::core::context::SimContext;
use crate::core::elastic_pool::ElasticPool;
use crate::core::error::PoolError;
use crate::core::events::{EventEmitter, SimEvent};
use crate::core::resource::ResourceId;

/// How bad one reported failure turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSeverity {
    /// The resource was already broken; nothing changed.
    AlreadyBroken,
    /// One resource lost, service continues on the remainder.
    ResourceLost {
        /// Healthy resources left.
        healthy_remaining: u32,
    },
    /// The last healthy resource is gone: the system halted. Reported only
    /// by the call that performed the terminal transition.
    Fatal,
}

/// Records breakage events and flips the system-wide running flag when the
/// pool is exhausted.
pub struct FailureTracker {
    pool: Arc<ElasticPool>,
    ctx: Arc<SimContext>,
    emitter: EventEmitter,
}

impl FailureTracker {
    /// Wire a tracker to the pool and shared context.
    #[must_use]
    pub fn new(pool: Arc<ElasticPool>, ctx: Arc<SimContext>, emitter: EventEmitter) -> Self {
        Self { pool, ctx, emitter }
    }

    /// Report that `id` failed during service.
    ///
    /// Marks the resource broken (idempotently) and, when the pool's
    /// healthy count reaches zero, performs the terminal halt. The
    /// healthy-remaining count comes out of the pool's critical section,
    /// so exactly one reporter observes the transition to zero and the
    /// halt fires exactly once even when several resources fail in the
    /// same instant.
    ///
    /// # Errors
    ///
    /// `PoolError::UnknownResource` when `id` was never issued by the pool.
    pub fn report_failure(&self, id: ResourceId) -> Result<FailureSeverity, PoolError> {
        let report = self.pool.mark_broken(id)?;
        if !report.newly_broken {
            return Ok(FailureSeverity::AlreadyBroken);
        }
        self.emitter.emit(SimEvent::ResourceBroken {
            resource: id,
            healthy_remaining: report.healthy_remaining,
        });
        if report.healthy_remaining == 0 {
            // mark_broken reports zero from inside its critical section,
            // so only the reporter that broke the last unit lands here.
            self.ctx.halt();
            tracing::error!(
                broken = report.broken_total,
                "pool exhausted, halting admission"
            );
            self.emitter.emit(SimEvent::SystemHalted {
                broken: report.broken_total as usize,
            });
            return Ok(FailureSeverity::Fatal);
        }
        Ok(FailureSeverity::ResourceLost {
            healthy_remaining: report.healthy_remaining,
        })
    }
}
