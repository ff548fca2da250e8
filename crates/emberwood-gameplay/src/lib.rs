//! # Emberwood Gameplay
//!
//! Simulation core for a 2D tile-world action game:
//! - Arena-stored entities addressed by stable ids
//! - Distance-based activation so only entities near the player simulate
//! - NPCs composed from swappable movement/combat/interaction/animation
//!   strategies
//! - Timer-driven chase pursuit with cancel-on-destroy
//! - Event bus and render command queue decoupling the core from its host
//!
//! The crate never draws, plays audio, or reads input. The host feeds
//! [`intent::PlayerIntent`] and collision reports in, and drains render
//! commands and [`events::GameEvent`]s out, once per frame through
//! [`simulation::Simulation::update`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod activation;
pub mod animation;
pub mod behavior;
pub mod collision;
pub mod config;
pub mod effects;
pub mod entity;
pub mod events;
pub mod intent;
pub mod render;
pub mod simulation;
pub mod spawn;

/// Commonly used types.
pub mod prelude {
    pub use crate::activation::{ActivationDelta, ActivationTracker};
    pub use crate::animation::{AnimationCatalog, AnimationClip};
    pub use crate::behavior::{
        AttackOutcome, BehaviorCtx, BehaviorSet, DamageOutcome, NpcController, TargetRef,
        TimerKind,
    };
    pub use crate::collision::CollisionEvent;
    pub use crate::config::{SimConfig, StartlePolicy};
    pub use crate::effects::{EffectKind, EffectPool, VisualEffect};
    pub use crate::entity::{
        Entity, EntityArena, EntityKind, EntityState, Facing, Health,
    };
    pub use crate::events::{EventBus, GameEvent};
    pub use crate::intent::PlayerIntent;
    pub use crate::render::{RenderCommand, Tint};
    pub use crate::simulation::Simulation;
    pub use crate::spawn::{Archetype, ArchetypeRegistry, EntityFactory};
    pub use emberwood_common::{EntityId, Rect, TimerId, Vec2};
}
