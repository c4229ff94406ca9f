//! In-memory queue backends.

pub mod arrival;
pub mod ranked;

pub use arrival::ArrivalQueue;
pub use ranked::RankedQueue;
