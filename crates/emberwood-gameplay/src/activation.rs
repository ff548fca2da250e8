//! Distance-based entity activation.
//!
//! Only entities near the player are simulated. Each pass rebuilds the
//! spatial index from live entity positions (entities move every frame, so
//! incremental maintenance buys nothing), queries a square around the
//! player, and confirms candidates with an exact squared-distance test.
//! Startled entities stay active regardless of distance so that a fleeing
//! player cannot despawn a pursuer mid-chase.

use ahash::AHashSet;
use emberwood_common::{EntityId, Rect, Vec2};
use emberwood_kernel::Quadtree;

use crate::config::SimConfig;
use crate::entity::{EntityArena, EntityKind, EntityState};

/// Membership changes produced by one activation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivationDelta {
    /// Entities that entered the active set this pass
    pub activated: Vec<EntityId>,
    /// Entities that left the active set this pass
    pub deactivated: Vec<EntityId>,
}

impl ActivationDelta {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Tracks which entities are close enough to the player to simulate.
#[derive(Debug)]
pub struct ActivationTracker {
    index: Quadtree,
    active: AHashSet<EntityId>,
    radius: f32,
    margin: f32,
    registration_scale: f32,
    query_buf: Vec<EntityId>,
}

impl ActivationTracker {
    /// Creates a tracker over the configured world bounds.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.world_width, config.world_height);
        Self {
            index: Quadtree::with_limits(
                bounds,
                config.quadtree_max_objects,
                config.quadtree_max_levels,
            ),
            active: AHashSet::new(),
            radius: config.activation_radius,
            margin: config.activation_margin,
            registration_scale: config.registration_radius_scale,
            query_buf: Vec::new(),
        }
    }

    /// Returns the activation radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the currently active entity ids.
    #[must_use]
    pub const fn active(&self) -> &AHashSet<EntityId> {
        &self.active
    }

    /// Whether an entity is in the active set.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Drops an entity from the active set without a full pass. Used when
    /// an entity dies or despawns mid-frame.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.active.remove(&id)
    }

    /// Initial pass at world load, using the activation radius scaled by
    /// the registration factor. The wider ring activates entities slightly
    /// before they matter, avoiding a thrash of activations on the first
    /// few frames of movement.
    pub fn prime(
        &mut self,
        arena: &mut EntityArena,
        viewport: Rect,
        player_pos: Vec2,
    ) -> ActivationDelta {
        let radius = self.radius * self.registration_scale;
        self.pass(arena, viewport, player_pos, radius)
    }

    /// Per-frame activation pass.
    pub fn update(
        &mut self,
        arena: &mut EntityArena,
        viewport: Rect,
        player_pos: Vec2,
    ) -> ActivationDelta {
        let radius = self.radius;
        self.pass(arena, viewport, player_pos, radius)
    }

    fn pass(
        &mut self,
        arena: &mut EntityArena,
        viewport: Rect,
        player_pos: Vec2,
        radius: f32,
    ) -> ActivationDelta {
        let tracked = viewport.expanded(self.margin);

        self.index.clear();
        let mut startled: Vec<EntityId> = Vec::new();
        for entity in arena.iter() {
            if entity.kind() == EntityKind::Player || !entity.has_valid_position() {
                continue;
            }
            if entity.state() == EntityState::Death {
                continue;
            }
            if entity.is_startled() {
                startled.push(entity.id());
            }
            if tracked.contains(entity.position()) {
                self.index.insert(entity.id(), entity.position());
            }
        }

        // Square query first, exact circle test second.
        self.query_buf.clear();
        let window = Rect::from_center(player_pos, radius, radius);
        self.index.query_into(&window, &mut self.query_buf);

        let r2 = radius * radius;
        let mut next: AHashSet<EntityId> = AHashSet::with_capacity(self.query_buf.len());
        for &id in &self.query_buf {
            if let Ok(entity) = arena.get(id) {
                if entity.position().distance_squared(player_pos) <= r2 {
                    next.insert(id);
                }
            }
        }
        next.extend(startled);

        let mut delta = ActivationDelta::default();
        for &id in &next {
            if !self.active.contains(&id) {
                delta.activated.push(id);
            }
        }
        for &id in &self.active {
            if !next.contains(&id) {
                delta.deactivated.push(id);
            }
        }

        for &id in &delta.activated {
            if let Ok(entity) = arena.get_mut(id) {
                entity.set_active(true);
            }
        }
        for &id in &delta.deactivated {
            if let Ok(entity) = arena.get_mut(id) {
                entity.set_active(false);
            }
        }

        self.active = next;
        delta
    }
}
