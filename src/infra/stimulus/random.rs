//! Random stimulus generators.

use std::time::Duration;

use rand::Rng;

use crate::core::stimulus::Stimulus;
use crate::core::task_queue::WorkItem;

/// Roll a one-in-`odds` chance; `odds` of zero never fires.
fn one_in(odds: u32) -> bool {
    odds > 0 && rand::rng().random_range(0..odds) == 0
}

/// Uniformly distributed pacing and service times with one-in-N failure
/// odds per service.
pub struct UniformStimulus {
    arrival_ms: (u64, u64),
    service_ms: (u64, u64),
    failure_one_in: u32,
}

impl UniformStimulus {
    /// Bounds are inclusive milliseconds; equal bounds give a fixed value.
    /// `failure_one_in` of zero disables failure injection.
    #[must_use]
    pub const fn new(arrival_ms: (u64, u64), service_ms: (u64, u64), failure_one_in: u32) -> Self {
        Self {
            arrival_ms,
            service_ms,
            failure_one_in,
        }
    }
}

impl Stimulus for UniformStimulus {
    fn arrival_delay(&self, _source: u32) -> Duration {
        let (lo, hi) = self.arrival_ms;
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    fn service_time(&self, _item: &WorkItem) -> Duration {
        let (lo, hi) = self.service_ms;
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    fn breaks_during_service(&self, _item: &WorkItem) -> bool {
        one_in(self.failure_one_in)
    }
}

/// Per-priority service times: items at or above a priority threshold get
/// the fast tier, everything else the slow tier.
pub struct TieredStimulus {
    arrival_ms: (u64, u64),
    fast: Duration,
    slow: Duration,
    fast_at_or_above: u8,
    failure_one_in: u32,
}

impl TieredStimulus {
    /// `fast_at_or_above` is the priority threshold for the fast tier.
    #[must_use]
    pub const fn new(
        arrival_ms: (u64, u64),
        fast: Duration,
        slow: Duration,
        fast_at_or_above: u8,
        failure_one_in: u32,
    ) -> Self {
        Self {
            arrival_ms,
            fast,
            slow,
            fast_at_or_above,
            failure_one_in,
        }
    }
}

impl Stimulus for TieredStimulus {
    fn arrival_delay(&self, _source: u32) -> Duration {
        let (lo, hi) = self.arrival_ms;
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    fn service_time(&self, item: &WorkItem) -> Duration {
        if item.priority >= self.fast_at_or_above {
            self.fast
        } else {
            self.slow
        }
    }

    fn breaks_during_service(&self, _item: &WorkItem) -> bool {
        one_in(self.failure_one_in)
    }
}
