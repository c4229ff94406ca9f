//! A single unit of pool capacity with binary health.

use serde::{Deserialize, Serialize};

/// Identifier of one resource, stable for the lifetime of the pool.
pub type ResourceId = u32;

/// Health of a resource. The `Healthy -> Broken` transition is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    /// Resource can be leased.
    Healthy,
    /// Resource failed permanently and will never be leased again.
    Broken,
}

/// One allocatable unit of capacity (a loading station, a processing unit).
///
/// Resources are owned exclusively by the pool and are never destroyed;
/// a unit reclaimed during contraction is parked out of rotation and may
/// be revived by a later expansion.
#[derive(Debug, Clone)]
pub struct Resource {
    id: ResourceId,
    health: Health,
}

impl Resource {
    /// Create a fresh healthy resource.
    #[must_use]
    pub const fn new(id: ResourceId) -> Self {
        Self {
            id,
            health: Health::Healthy,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Whether the resource can still be leased.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self.health, Health::Healthy)
    }

    /// Mark the resource permanently broken. Returns `true` if this call
    /// performed the transition, `false` if it was already broken.
    pub fn break_down(&mut self) -> bool {
        if self.is_healthy() {
            self.health = Health::Broken;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_down_is_one_way() {
        let mut r = Resource::new(3);
        assert!(r.is_healthy());
        assert!(r.break_down());
        assert_eq!(r.health(), Health::Broken);
        // Second transition reports no change.
        assert!(!r.break_down());
        assert_eq!(r.health(), Health::Broken);
    }
}
