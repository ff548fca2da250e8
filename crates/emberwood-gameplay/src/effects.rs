//! Detached, self-cleaning visual effects.
//!
//! A death burst is not part of any entity's lifecycle: the entity is gone
//! by the time the effect plays. Effects live in this pool with a TTL and
//! are pruned once per frame; the render host draws whatever is currently
//! alive.

use serde::{Deserialize, Serialize};

use emberwood_common::Vec2;

/// Kind of pooled visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Terminal burst played where an entity died
    DeathBurst,
}

/// A live visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualEffect {
    /// Pool-local identifier
    pub id: u64,
    /// Effect kind
    pub kind: EffectKind,
    /// World position
    pub position: Vec2,
    /// Frame timestamp when spawned, in milliseconds
    pub spawned_ms: u64,
    /// Lifetime in milliseconds
    pub ttl_ms: u64,
}

impl VisualEffect {
    /// Returns whether the effect has outlived its TTL at `now_ms`.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.spawned_ms + self.ttl_ms
    }
}

/// Pool of live visual effects, pruned by TTL each frame.
#[derive(Debug, Default)]
pub struct EffectPool {
    effects: Vec<VisualEffect>,
    next_id: u64,
}

impl EffectPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an effect, returning its pool-local id.
    pub fn spawn(&mut self, kind: EffectKind, position: Vec2, now_ms: u64, ttl_ms: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.effects.push(VisualEffect {
            id,
            kind,
            position,
            spawned_ms: now_ms,
            ttl_ms,
        });
        id
    }

    /// Removes expired effects. Returns how many were pruned.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !e.is_expired(now_ms));
        before - self.effects.len()
    }

    /// Iterates over live effects.
    pub fn iter(&self) -> impl Iterator<Item = &VisualEffect> {
        self.effects.iter()
    }

    /// Returns the number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns true if no effects are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
