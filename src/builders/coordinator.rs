//! Builder wiring a coordinator from configuration and collaborators.

use std::sync::Arc;

use crate::config::SimConfig;
use crate::core::error::PoolError;
use crate::core::events::{EventSink, TracingEventSink};
use crate::core::stimulus::Stimulus;
use crate::core::coordinator::WorkerCoordinator;
use crate::infra::stimulus::UniformStimulus;

/// Builds a [`WorkerCoordinator`] with optional collaborator overrides.
///
/// Without overrides the coordinator gets a mild uniform stimulus with no
/// failure injection and renders events through tracing.
pub struct CoordinatorBuilder {
    cfg: SimConfig,
    stimulus: Option<Arc<dyn Stimulus>>,
    sink: Option<Box<dyn EventSink>>,
}

impl CoordinatorBuilder {
    /// Start from a configuration.
    #[must_use]
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            stimulus: None,
            sink: None,
        }
    }

    /// Override the stimulus source (pacing, service times, failures).
    #[must_use]
    pub fn with_stimulus(mut self, stimulus: Arc<dyn Stimulus>) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// Override the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate the configuration and wire the coordinator.
    ///
    /// # Errors
    ///
    /// `PoolError::InvalidConfig` when the configuration fails validation.
    pub fn build(self) -> Result<WorkerCoordinator, PoolError> {
        let stimulus = self
            .stimulus
            .unwrap_or_else(|| Arc::new(UniformStimulus::new((50, 150), (100, 200), 0)));
        let sink = self.sink.unwrap_or_else(|| Box::new(TracingEventSink));
        WorkerCoordinator::new(self.cfg, stimulus, sink)
    }
}
