//! Error types for pool and coordinator operations.

use thiserror::Error;

use crate::core::resource::ResourceId;

/// Errors produced by pool and coordinator components.
///
/// Recoverable conditions are not errors here: an acquire timeout is a
/// tagged [`AcquireOutcome`](crate::core::elastic_pool::AcquireOutcome)
/// variant, and shrink contention is a silent no-op.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A resource id that the pool has never issued.
    #[error("unknown resource id {0}")]
    UnknownResource(ResourceId),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
