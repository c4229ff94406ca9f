//! Configuration models and scenario presets.

pub mod sim;

pub use sim::{QueueDiscipline, SimConfig};
