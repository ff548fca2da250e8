//! Entity model and arena-based storage.
//!
//! Entities are stored in an arena indexed by stable [`EntityId`]s. The
//! spatial index, active set, and timer owners all refer to entities by id,
//! so an entity destroyed mid-frame simply fails lookup rather than leaving
//! a dangling reference.

use emberwood_common::{EntityId, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for entity operations.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity not found
    #[error("entity not found: {0:?}")]
    NotFound(EntityId),
    /// Entity already despawned
    #[error("entity already despawned: {0:?}")]
    AlreadyDespawned(EntityId),
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Kind tag for an entity, selecting its archetype and animation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player character
    Player,
    /// Friendly villager offering dialog
    Villager,
    /// Melee hostile
    Wolf,
    /// Ranged hostile
    Skeleton,
    /// In-flight projectile
    Projectile,
}

impl EntityKind {
    /// Returns the asset key prefix used by the animation catalog.
    #[must_use]
    pub const fn asset_prefix(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Villager => "villager",
            Self::Wolf => "wolf",
            Self::Skeleton => "skeleton",
            Self::Projectile => "arrow",
        }
    }

    /// Whether this kind attacks the player on sight.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Wolf | Self::Skeleton)
    }

    /// Whether this kind is a simulated non-player character.
    #[must_use]
    pub const fn is_npc(self) -> bool {
        matches!(self, Self::Villager | Self::Wolf | Self::Skeleton)
    }
}

/// One of four cardinal facing directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing up (away from camera)
    Up,
    /// Facing down (toward camera)
    #[default]
    Down,
    /// Facing left
    Left,
    /// Facing right
    Right,
}

impl Facing {
    /// Picks the facing for a movement direction by dominant axis.
    ///
    /// Ties resolve horizontally. A zero direction keeps no preference and
    /// returns the default.
    #[must_use]
    pub fn from_direction(dir: Vec2) -> Self {
        if dir.x.abs() >= dir.y.abs() {
            if dir.x < 0.0 {
                Self::Left
            } else if dir.x > 0.0 {
                Self::Right
            } else {
                Self::default()
            }
        } else if dir.y < 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Logical state of an entity, driving animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityState {
    /// Standing still
    #[default]
    Idle,
    /// Moving
    Walk,
    /// Performing a melee attack
    Attack,
    /// Firing a projectile
    Shoot,
    /// Recently damaged
    Hit,
    /// Dying (terminal)
    Death,
}

impl EntityState {
    /// Returns the clip suffix used by the animation catalog.
    #[must_use]
    pub const fn clip_suffix(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Attack => "attack",
            Self::Shoot => "shoot",
            Self::Hit => "hit",
            Self::Death => "death",
        }
    }
}

/// Hit points for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    /// Creates a health component at full hit points.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Returns current hit points.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Returns maximum hit points.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Applies damage, clamping at zero.
    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    /// Applies healing, clamping at the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Checks if hit points are exhausted.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// An entity in the game world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Vec2,
    velocity: Vec2,
    half_extents: Vec2,
    facing: Facing,
    state: EntityState,
    health: Health,
    attack_damage: i32,
    speed: f32,
    active: bool,
    startled: bool,
}

impl Entity {
    /// Creates an entity of the given kind at a position.
    #[must_use]
    pub fn new(kind: EntityKind, position: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            velocity: Vec2::ZERO,
            half_extents: Vec2::new(8.0, 8.0),
            facing: Facing::default(),
            state: EntityState::default(),
            health: Health::new(10),
            attack_damage: 1,
            speed: 80.0,
            active: false,
            startled: false,
        }
    }

    /// Sets maximum (and current) hit points.
    #[must_use]
    pub fn with_health(mut self, max_hp: i32) -> Self {
        self.health = Health::new(max_hp);
        self
    }

    /// Sets attack damage.
    #[must_use]
    pub const fn with_damage(mut self, damage: i32) -> Self {
        self.attack_damage = damage;
        self
    }

    /// Sets movement speed in world units per second.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Sets bounding-box half-extents.
    #[must_use]
    pub fn with_half_extents(mut self, half_width: f32, half_height: f32) -> Self {
        self.half_extents = Vec2::new(half_width, half_height);
        self
    }

    /// Returns the entity's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the world position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Sets the world position.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns the current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Sets the current velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Returns the axis-aligned bounding box at the current position.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.half_extents.x, self.half_extents.y)
    }

    /// Returns the facing direction.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Sets the facing direction.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Returns the logical state.
    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Sets the logical state.
    pub fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    /// Returns the entity's health.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Returns mutable health.
    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    /// Returns attack damage.
    #[must_use]
    pub const fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    /// Returns movement speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Returns whether the entity is in the active set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Sets the active flag.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns whether the entity is startled (forced pursuit).
    #[must_use]
    pub const fn is_startled(&self) -> bool {
        self.startled
    }

    /// Sets the startled flag.
    pub fn set_startled(&mut self, startled: bool) {
        self.startled = startled;
    }

    /// Returns whether the position is usable for spatial queries.
    #[must_use]
    pub fn has_valid_position(&self) -> bool {
        self.position.is_finite()
    }

    /// Returns whether the entity is alive and not mid-death.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_dead() && self.state != EntityState::Death
    }
}

/// Arena-based entity storage with stable ids.
///
/// Free slots are reused via a free list; lookup goes through an id → slot
/// map so despawned ids fail cleanly.
#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    free: Vec<usize>,
    index: ahash::AHashMap<EntityId, usize>,
}

impl EntityArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: ahash::AHashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Adds an entity to the arena, returning its id.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        let slot = if let Some(free) = self.free.pop() {
            self.slots[free] = Some(entity);
            free
        } else {
            self.slots.push(Some(entity));
            self.slots.len() - 1
        };
        self.index.insert(id, slot);
        id
    }

    /// Removes an entity, returning it on success.
    pub fn despawn(&mut self, id: EntityId) -> EntityResult<Entity> {
        let slot = self.index.remove(&id).ok_or(EntityError::NotFound(id))?;
        let entity = self.slots[slot]
            .take()
            .ok_or(EntityError::AlreadyDespawned(id))?;
        self.free.push(slot);
        Ok(entity)
    }

    /// Gets a reference to an entity.
    pub fn get(&self, id: EntityId) -> EntityResult<&Entity> {
        let slot = self.index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*slot].as_ref().ok_or(EntityError::NotFound(id))
    }

    /// Gets a mutable reference to an entity.
    pub fn get_mut(&mut self, id: EntityId) -> EntityResult<&mut Entity> {
        let slot = self.index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*slot].as_mut().ok_or(EntityError::NotFound(id))
    }

    /// Checks if an entity is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterates over live entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates mutably over live entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Iterates over entities of a specific kind.
    pub fn iter_by_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.kind() == kind)
    }

    /// Returns all live entity ids.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.index.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_get() {
        let mut arena = EntityArena::new();
        let id = arena.spawn(Entity::new(EntityKind::Wolf, Vec2::new(10.0, 20.0)));

        let entity = arena.get(id).expect("entity should exist");
        assert_eq!(entity.kind(), EntityKind::Wolf);
        assert_eq!(entity.position(), Vec2::new(10.0, 20.0));
        assert!(entity.id().is_valid());
    }

    #[test]
    fn test_despawn_frees_slot() {
        let mut arena = EntityArena::new();
        let id = arena.spawn(Entity::new(EntityKind::Villager, Vec2::ZERO));
        assert_eq!(arena.len(), 1);

        let entity = arena.despawn(id).expect("despawn should succeed");
        assert_eq!(entity.kind(), EntityKind::Villager);
        assert!(arena.get(id).is_err());
        assert!(arena.despawn(id).is_err());

        // Slot reused without growing storage
        let id2 = arena.spawn(Entity::new(EntityKind::Wolf, Vec2::ZERO));
        assert_ne!(id, id2);
        assert_eq!(arena.slots.len(), 1);
    }

    #[test]
    fn test_iter_by_kind() {
        let mut arena = EntityArena::new();
        arena.spawn(Entity::new(EntityKind::Wolf, Vec2::ZERO));
        arena.spawn(Entity::new(EntityKind::Wolf, Vec2::ZERO));
        arena.spawn(Entity::new(EntityKind::Villager, Vec2::ZERO));

        assert_eq!(arena.iter_by_kind(EntityKind::Wolf).count(), 2);
        assert_eq!(arena.iter_by_kind(EntityKind::Skeleton).count(), 0);
    }

    #[test]
    fn test_health_damage_and_death() {
        let mut health = Health::new(3);
        health.damage(1);
        assert_eq!(health.current(), 2);
        assert!(!health.is_dead());

        health.damage(5);
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());

        health.heal(10);
        assert_eq!(health.current(), 3);
    }

    #[test]
    fn test_facing_from_direction() {
        assert_eq!(Facing::from_direction(Vec2::new(1.0, 0.2)), Facing::Right);
        assert_eq!(Facing::from_direction(Vec2::new(-1.0, 0.2)), Facing::Left);
        assert_eq!(Facing::from_direction(Vec2::new(0.1, -1.0)), Facing::Up);
        assert_eq!(Facing::from_direction(Vec2::new(0.1, 1.0)), Facing::Down);
        // Ties resolve horizontally
        assert_eq!(Facing::from_direction(Vec2::new(1.0, 1.0)), Facing::Right);
        assert_eq!(Facing::from_direction(Vec2::ZERO), Facing::Down);
    }

    #[test]
    fn test_invalid_position_detected() {
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        assert!(entity.has_valid_position());
        entity.set_position(Vec2::new(f32::NAN, 0.0));
        assert!(!entity.has_valid_position());
    }

    #[test]
    fn test_is_alive_considers_state() {
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(5);
        assert!(entity.is_alive());
        entity.set_state(EntityState::Death);
        assert!(!entity.is_alive());
    }
}
