//! Collision-host inbox.
//!
//! The hosting physics/overlap layer detects contacts and reports them as
//! [`CollisionEvent`]s; the simulation turns them into damage and attack
//! calls on its next update.

use serde::{Deserialize, Serialize};

use emberwood_common::EntityId;

/// An overlap reported by the collision host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// A projectile overlapped a damageable entity
    ProjectileHit {
        /// The projectile entity
        projectile: EntityId,
        /// The entity that was struck
        target: EntityId,
    },
    /// The player overlapped a non-player entity
    PlayerTouched {
        /// The touched entity
        npc: EntityId,
    },
}
