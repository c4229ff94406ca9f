//! Deterministic stimulus playback for tests.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::stimulus::Stimulus;
use crate::core::task_queue::WorkItem;

/// Fixed pacing and service times plus a scripted failure sequence.
///
/// Failure decisions pop from a shared script in the order services roll
/// them; once the script runs dry every further roll is a pass. This makes
/// scenario outcomes reproducible without real randomness.
pub struct ScriptedStimulus {
    arrival: Duration,
    service: Duration,
    failures: Mutex<VecDeque<bool>>,
}

impl ScriptedStimulus {
    /// Fixed arrival pacing and service time, no failures scripted.
    #[must_use]
    pub fn new(arrival: Duration, service: Duration) -> Self {
        Self {
            arrival,
            service,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Script the next failure rolls; `true` entries break the serving
    /// resource.
    #[must_use]
    pub fn with_failures(self, rolls: impl IntoIterator<Item = bool>) -> Self {
        self.failures.lock().extend(rolls);
        self
    }
}

impl Stimulus for ScriptedStimulus {
    fn arrival_delay(&self, _source: u32) -> Duration {
        self.arrival
    }

    fn service_time(&self, _item: &WorkItem) -> Duration {
        self.service
    }

    fn breaks_during_service(&self, _item: &WorkItem) -> bool {
        self.failures.lock().pop_front().unwrap_or(false)
    }
}
