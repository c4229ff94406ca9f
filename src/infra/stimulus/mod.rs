//! Stimulus backends: random generators for runs, scripted playback for
//! tests.

pub mod random;
pub mod scripted;

pub use random::{TieredStimulus, UniformStimulus};
pub use scripted::ScriptedStimulus;
