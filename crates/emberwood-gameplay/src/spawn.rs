//! Archetypes and entity construction.
//!
//! An archetype is data: stats plus tags naming which strategy goes in each
//! behavior slot. The factory turns an archetype into an arena entity and a
//! wired [`NpcController`], so adding a new creature is a registry entry
//! rather than new code.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use emberwood_common::{EntityId, Vec2};

use crate::animation::AnimationCatalog;
use crate::behavior::animation::SpriteAnimation;
use crate::behavior::combat::{MeleeCombat, RangedCombat};
use crate::behavior::interaction::{DialogInteraction, NoInteraction};
use crate::behavior::movement::{ChaseMovement, IdleMovement};
use crate::behavior::{BehaviorSet, Combat, Interaction, Movement, NpcController};
use crate::config::SimConfig;
use crate::entity::{Entity, EntityArena, EntityKind};

/// Movement slot selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    /// Stand still
    Idle,
    /// Pursue the player
    Chase,
}

/// Combat slot selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatKind {
    /// Melee, attacks only on request
    Melee,
    /// Melee, attacks the player on sight
    MeleeAggressive,
    /// Fires projectiles at the player on sight
    Ranged,
}

/// Stats and behavior wiring for one creature type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    /// Entity kind tag
    pub kind: EntityKind,
    /// Maximum hit points
    pub max_hp: i32,
    /// Damage per attack
    pub attack_damage: i32,
    /// Movement speed in world units per second
    pub speed: f32,
    /// Bounding-box half extents (width, height)
    pub half_extents: (f32, f32),
    /// Movement slot
    pub movement: MovementKind,
    /// Combat slot
    pub combat: CombatKind,
    /// Dialog lines; empty means no interaction
    pub dialog: Vec<String>,
}

/// Named archetype table.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ArchetypeRegistry {
    entries: AHashMap<String, Archetype>,
}

impl ArchetypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the registry with the shipped creature set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "villager",
            Archetype {
                kind: EntityKind::Villager,
                max_hp: 5,
                attack_damage: 0,
                speed: 60.0,
                half_extents: (8.0, 12.0),
                movement: MovementKind::Idle,
                combat: CombatKind::Melee,
                dialog: vec![
                    "Fine weather today.".to_owned(),
                    "The woods have been restless lately.".to_owned(),
                ],
            },
        );
        registry.insert(
            "wolf",
            Archetype {
                kind: EntityKind::Wolf,
                max_hp: 3,
                attack_damage: 1,
                speed: 100.0,
                half_extents: (10.0, 8.0),
                movement: MovementKind::Chase,
                combat: CombatKind::MeleeAggressive,
                dialog: Vec::new(),
            },
        );
        registry.insert(
            "skeleton",
            Archetype {
                kind: EntityKind::Skeleton,
                max_hp: 4,
                attack_damage: 1,
                speed: 70.0,
                half_extents: (8.0, 12.0),
                movement: MovementKind::Chase,
                combat: CombatKind::Ranged,
                dialog: Vec::new(),
            },
        );
        registry
    }

    /// Adds or replaces an archetype.
    pub fn insert(&mut self, name: impl Into<String>, archetype: Archetype) {
        self.entries.insert(name.into(), archetype);
    }

    /// Looks up an archetype by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Archetype> {
        self.entries.get(name)
    }

    /// Returns the number of registered archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no archetypes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds entities and controllers from archetypes.
pub struct EntityFactory {
    archetypes: ArchetypeRegistry,
    catalog: Arc<AnimationCatalog>,
}

impl EntityFactory {
    /// Creates a factory over the given registry and animation catalog.
    #[must_use]
    pub fn new(archetypes: ArchetypeRegistry, catalog: Arc<AnimationCatalog>) -> Self {
        Self {
            archetypes,
            catalog,
        }
    }

    /// Returns the archetype registry.
    #[must_use]
    pub const fn archetypes(&self) -> &ArchetypeRegistry {
        &self.archetypes
    }

    fn build_movement(&self, archetype: &Archetype, config: &SimConfig) -> Box<dyn Movement> {
        match archetype.movement {
            MovementKind::Idle => Box::new(IdleMovement),
            MovementKind::Chase => Box::new(ChaseMovement::new(config.chase_distance)),
        }
    }

    fn build_combat(&self, archetype: &Archetype, config: &SimConfig) -> Box<dyn Combat> {
        match archetype.combat {
            CombatKind::Melee => Box::new(MeleeCombat::new(
                config.melee_cooldown_ms,
                config.melee_range,
            )),
            CombatKind::MeleeAggressive => Box::new(MeleeCombat::aggressive(
                config.melee_cooldown_ms,
                config.melee_range,
            )),
            CombatKind::Ranged => Box::new(RangedCombat::new(
                config.ranged_cooldown_ms,
                config.ranged_attack_range,
                config.projectile_speed,
            )),
        }
    }

    fn build_interaction(&self, archetype: &Archetype) -> Box<dyn Interaction> {
        if archetype.dialog.is_empty() {
            Box::new(NoInteraction)
        } else {
            Box::new(DialogInteraction::new(archetype.dialog.clone()))
        }
    }

    /// Spawns a named archetype into the arena and wires its controller.
    ///
    /// Returns `None` for an unknown archetype name.
    pub fn spawn_named(
        &self,
        name: &str,
        position: Vec2,
        config: &SimConfig,
        arena: &mut EntityArena,
    ) -> Option<(EntityId, NpcController)> {
        let Some(archetype) = self.archetypes.get(name) else {
            warn!(name, "unknown archetype, spawn skipped");
            return None;
        };

        let entity = Entity::new(archetype.kind, position)
            .with_health(archetype.max_hp)
            .with_damage(archetype.attack_damage)
            .with_speed(archetype.speed)
            .with_half_extents(archetype.half_extents.0, archetype.half_extents.1);
        let id = arena.spawn(entity);

        let behaviors = BehaviorSet {
            movement: self.build_movement(archetype, config),
            combat: self.build_combat(archetype, config),
            interaction: self.build_interaction(archetype),
            animation: Box::new(SpriteAnimation::new(Arc::clone(&self.catalog))),
        };

        Some((id, NpcController::new(id, behaviors)))
    }

    /// Spawns the player entity.
    pub fn spawn_player(&self, position: Vec2, arena: &mut EntityArena) -> EntityId {
        arena.spawn(
            Entity::new(EntityKind::Player, position)
                .with_health(10)
                .with_damage(1)
                .with_speed(120.0)
                .with_half_extents(8.0, 12.0),
        )
    }

    /// Spawns an in-flight projectile.
    pub fn spawn_projectile(
        &self,
        position: Vec2,
        velocity: Vec2,
        damage: i32,
        arena: &mut EntityArena,
    ) -> EntityId {
        let mut projectile = Entity::new(EntityKind::Projectile, position)
            .with_health(1)
            .with_damage(damage)
            .with_half_extents(4.0, 4.0);
        projectile.set_velocity(velocity);
        arena.spawn(projectile)
    }
}
