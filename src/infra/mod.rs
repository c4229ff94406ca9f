//! Infrastructure backends for queues and stimulus generators.

pub mod queue;
pub mod stimulus;

pub use queue::{ArrivalQueue, RankedQueue};
pub use stimulus::{ScriptedStimulus, TieredStimulus, UniformStimulus};
