//! Event bus for inter-system communication.
//!
//! Behaviors publish gameplay events; the hosting scene, HUD, and audio
//! layers drain them once per frame. Publishing never blocks the frame
//! loop: a full channel drops the event with a warning.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::EntityKind;
use emberwood_common::EntityId;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entity entered the world
    EntitySpawned {
        /// Entity ID
        entity: EntityId,
        /// Kind tag
        kind: EntityKind,
    },
    /// Entity took damage
    EntityDamaged {
        /// Entity ID
        entity: EntityId,
        /// Damage applied
        amount: i32,
        /// Hit points remaining after the damage
        remaining: i32,
        /// Source entity (None for environmental damage)
        source: Option<EntityId>,
    },
    /// Entity hit zero hit points and left the live set
    EntityDied {
        /// Entity ID
        entity: EntityId,
        /// Kind tag
        kind: EntityKind,
        /// Last world position (x, y)
        position: (f32, f32),
    },
    /// The player hit zero hit points
    PlayerDied,
    /// A ranged attacker fired a projectile
    ProjectileFired {
        /// Shooting entity
        shooter: EntityId,
        /// Projectile entity
        projectile: EntityId,
    },
    /// A dialog line was produced by an interaction
    DialogLine {
        /// Speaking entity
        speaker: EntityId,
        /// Line of dialog
        line: String,
    },
}

/// Event bus for broadcasting gameplay events.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Publishes an event. Never blocks; drops the event if the bus is full.
    pub fn publish(&self, event: GameEvent) {
        if self.sender.try_send(event).is_err() {
            warn!("event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
