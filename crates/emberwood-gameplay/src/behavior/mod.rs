//! Composable NPC behaviors.
//!
//! Each NPC is driven by an [`NpcController`] holding four strategy slots:
//! movement, combat, interaction, and animation. Archetypes differ only in
//! which strategies they are wired with, and a slot can be swapped at
//! runtime (a pacified wolf gets [`movement::IdleMovement`] without
//! touching its other behaviors).
//!
//! Behaviors never hold entity references. They receive the owning entity
//! and a [`BehaviorCtx`] of frame-scoped services each call, so a despawned
//! entity simply stops receiving calls.

pub mod animation;
pub mod combat;
pub mod interaction;
pub mod movement;

use emberwood_common::{EntityId, Vec2};
use emberwood_kernel::Scheduler;

use crate::config::SimConfig;
use crate::effects::EffectPool;
use crate::entity::{Entity, EntityState, Facing};
use crate::events::{EventBus, GameEvent};
use crate::render::RenderCommand;

/// Payload of gameplay timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Recurring chase redirection for a pursuing entity
    ChaseTick,
    /// Clear a feedback tint from an entity's sprite
    ClearTint,
    /// Clear the startled flag after the de-aggro delay
    ClearStartle,
}

/// Frame-scoped services passed to every behavior call.
pub struct BehaviorCtx<'a> {
    /// Current frame timestamp in milliseconds
    pub now_ms: u64,
    /// Frame delta time in seconds
    pub dt: f32,
    /// The player's entity id
    pub player_id: EntityId,
    /// The player's position this frame
    pub player_pos: Vec2,
    /// Simulation tunables
    pub config: &'a SimConfig,
    /// Timer scheduler
    pub scheduler: &'a mut Scheduler<TimerKind>,
    /// Gameplay event bus
    pub events: &'a EventBus,
    /// Render command queue for this frame
    pub render: &'a mut Vec<RenderCommand>,
    /// Detached visual effect pool
    pub effects: &'a mut EffectPool,
}

/// A target for an attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRef {
    /// Target entity id
    pub id: EntityId,
    /// Target position this frame
    pub position: Vec2,
}

/// Result of an attack request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// The attack was refused (cooldown, range, or dead attacker)
    Rejected,
    /// A melee hit to resolve against the target
    Melee {
        /// Entity to damage
        target: EntityId,
        /// Damage to apply
        damage: i32,
    },
    /// A projectile to spawn at the attacker's position
    Projectile {
        /// Projectile velocity
        velocity: Vec2,
        /// Damage the projectile carries
        damage: i32,
    },
}

/// Result of applying damage to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Hit points remaining
    pub remaining: i32,
    /// Whether the damage was lethal
    pub died: bool,
}

/// Movement strategy.
pub trait Movement {
    /// Per-frame movement decision for the owning entity.
    fn update(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>);

    /// Reacts to a fired movement timer. Default: ignore.
    fn on_timer(&mut self, _entity: &mut Entity, _ctx: &mut BehaviorCtx<'_>) {}

    /// Halts movement and releases any scheduled timers.
    fn stop(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>);
}

/// Combat strategy.
pub trait Combat {
    /// Per-frame combat decision. Aggressive strategies may initiate an
    /// attack here; passive ones return `None`.
    fn update(&mut self, _entity: &mut Entity, _ctx: &mut BehaviorCtx<'_>) -> Option<AttackOutcome> {
        None
    }

    /// Requests an attack on `target`, subject to range and cooldown.
    fn attack(
        &mut self,
        entity: &mut Entity,
        target: TargetRef,
        ctx: &mut BehaviorCtx<'_>,
    ) -> AttackOutcome;

    /// Applies incoming damage to the owning entity.
    fn take_damage(
        &mut self,
        entity: &mut Entity,
        amount: i32,
        source: Option<EntityId>,
        ctx: &mut BehaviorCtx<'_>,
    ) -> DamageOutcome;
}

/// Interaction strategy.
pub trait Interaction {
    /// Whether the player can currently interact with the owning entity.
    fn can_interact(&self, entity: &Entity, player_pos: Vec2, config: &SimConfig) -> bool;

    /// Performs an interaction, returning any dialog line produced.
    fn interact(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) -> Option<String>;
}

/// Animation strategy.
pub trait Animation {
    /// Emits the initial clip when the entity enters the world.
    fn setup(&mut self, entity: &Entity, ctx: &mut BehaviorCtx<'_>);

    /// Transitions the entity to `state`/`facing` and emits the matching
    /// clip plus any feedback side effects. A dying entity refuses
    /// transitions away from death.
    fn play(
        &mut self,
        entity: &mut Entity,
        state: EntityState,
        facing: Facing,
        ctx: &mut BehaviorCtx<'_>,
    );
}

/// The four strategy slots driving one NPC.
pub struct BehaviorSet {
    /// Movement slot
    pub movement: Box<dyn Movement>,
    /// Combat slot
    pub combat: Box<dyn Combat>,
    /// Interaction slot
    pub interaction: Box<dyn Interaction>,
    /// Animation slot
    pub animation: Box<dyn Animation>,
}

/// Composition root for one NPC.
///
/// Owns the strategy set and sequences the calls: combat decides before
/// movement each frame, and state or facing changes made by either are
/// animated exactly once afterward.
pub struct NpcController {
    id: EntityId,
    behaviors: BehaviorSet,
}

impl NpcController {
    /// Creates a controller for the entity with the given strategy set.
    #[must_use]
    pub fn new(id: EntityId, behaviors: BehaviorSet) -> Self {
        Self { id, behaviors }
    }

    /// Returns the controlled entity's id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Emits the entity's initial clip.
    pub fn setup(&mut self, entity: &Entity, ctx: &mut BehaviorCtx<'_>) {
        self.behaviors.animation.setup(entity, ctx);
    }

    /// Runs one frame of behavior for an active entity.
    ///
    /// Returns an attack the simulation must resolve, if the combat
    /// strategy initiated one.
    pub fn update(
        &mut self,
        entity: &mut Entity,
        ctx: &mut BehaviorCtx<'_>,
    ) -> Option<AttackOutcome> {
        let before = (entity.state(), entity.facing());

        let outcome = self.behaviors.combat.update(entity, ctx);
        self.behaviors.movement.update(entity, ctx);

        let facing = entity.facing();
        match outcome {
            Some(AttackOutcome::Melee { .. }) => {
                self.behaviors
                    .animation
                    .play(entity, EntityState::Attack, facing, ctx);
            },
            Some(AttackOutcome::Projectile { .. }) => {
                self.behaviors
                    .animation
                    .play(entity, EntityState::Shoot, facing, ctx);
            },
            _ => {
                let after = (entity.state(), entity.facing());
                if after != before {
                    self.behaviors.animation.play(entity, after.0, after.1, ctx);
                }
            },
        }

        outcome.filter(|o| *o != AttackOutcome::Rejected)
    }

    /// Routes a fired timer to the movement strategy.
    pub fn on_timer(&mut self, kind: TimerKind, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) {
        if kind == TimerKind::ChaseTick {
            let before = (entity.state(), entity.facing());
            self.behaviors.movement.on_timer(entity, ctx);
            let after = (entity.state(), entity.facing());
            if after != before {
                self.behaviors.animation.play(entity, after.0, after.1, ctx);
            }
        }
    }

    /// Applies incoming damage: hit feedback first, then the death
    /// transition if the damage was lethal.
    pub fn take_damage(
        &mut self,
        entity: &mut Entity,
        amount: i32,
        source: Option<EntityId>,
        ctx: &mut BehaviorCtx<'_>,
    ) -> DamageOutcome {
        let outcome = self
            .behaviors
            .combat
            .take_damage(entity, amount, source, ctx);

        let facing = entity.facing();
        self.behaviors
            .animation
            .play(entity, EntityState::Hit, facing, ctx);

        if outcome.died {
            self.behaviors.movement.stop(entity, ctx);
            self.behaviors
                .animation
                .play(entity, EntityState::Death, facing, ctx);
            ctx.events.publish(GameEvent::EntityDied {
                entity: entity.id(),
                kind: entity.kind(),
                position: (entity.position().x, entity.position().y),
            });
        }

        outcome
    }

    /// Requests an attack through the combat slot.
    pub fn attack(
        &mut self,
        entity: &mut Entity,
        target: TargetRef,
        ctx: &mut BehaviorCtx<'_>,
    ) -> AttackOutcome {
        let outcome = self.behaviors.combat.attack(entity, target, ctx);
        let facing = entity.facing();
        match outcome {
            AttackOutcome::Melee { .. } => {
                self.behaviors
                    .animation
                    .play(entity, EntityState::Attack, facing, ctx);
            },
            AttackOutcome::Projectile { .. } => {
                self.behaviors
                    .animation
                    .play(entity, EntityState::Shoot, facing, ctx);
            },
            AttackOutcome::Rejected => {},
        }
        outcome
    }

    /// Whether the player can interact with the entity right now.
    #[must_use]
    pub fn can_interact(&self, entity: &Entity, player_pos: Vec2, config: &SimConfig) -> bool {
        self.behaviors.interaction.can_interact(entity, player_pos, config)
    }

    /// Performs an interaction.
    pub fn interact(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) -> Option<String> {
        self.behaviors.interaction.interact(entity, ctx)
    }

    /// Halts movement when the entity leaves the active set.
    pub fn deactivate(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) {
        self.behaviors.movement.stop(entity, ctx);
    }

    /// Swaps the movement strategy, stopping the old one first.
    pub fn set_movement(
        &mut self,
        movement: Box<dyn Movement>,
        entity: &mut Entity,
        ctx: &mut BehaviorCtx<'_>,
    ) {
        self.behaviors.movement.stop(entity, ctx);
        self.behaviors.movement = movement;
    }

    /// Swaps the combat strategy.
    pub fn set_combat(&mut self, combat: Box<dyn Combat>) {
        self.behaviors.combat = combat;
    }

    /// Swaps the interaction strategy.
    pub fn set_interaction(&mut self, interaction: Box<dyn Interaction>) {
        self.behaviors.interaction = interaction;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::animation::AnimationCatalog;
    use crate::behavior::animation::SpriteAnimation;
    use crate::behavior::combat::MeleeCombat;
    use crate::behavior::interaction::NoInteraction;
    use crate::behavior::movement::ChaseMovement;

    /// Bundle of owned frame services for behavior tests.
    pub struct TestFrame {
        pub config: SimConfig,
        pub scheduler: Scheduler<TimerKind>,
        pub events: EventBus,
        pub render: Vec<RenderCommand>,
        pub effects: EffectPool,
        pub player_id: EntityId,
        pub player_pos: Vec2,
        pub now_ms: u64,
    }

    impl TestFrame {
        pub fn new() -> Self {
            Self {
                config: SimConfig::default(),
                scheduler: Scheduler::new(),
                events: EventBus::default(),
                render: Vec::new(),
                effects: EffectPool::new(),
                player_id: EntityId::new(),
                player_pos: Vec2::ZERO,
                now_ms: 0,
            }
        }

        pub fn ctx(&mut self) -> BehaviorCtx<'_> {
            BehaviorCtx {
                now_ms: self.now_ms,
                dt: 1.0 / 60.0,
                player_id: self.player_id,
                player_pos: self.player_pos,
                config: &self.config,
                scheduler: &mut self.scheduler,
                events: &self.events,
                render: &mut self.render,
                effects: &mut self.effects,
            }
        }
    }

    pub fn hostile_behaviors(config: &SimConfig) -> BehaviorSet {
        BehaviorSet {
            movement: Box::new(ChaseMovement::new(config.chase_distance)),
            combat: Box::new(MeleeCombat::aggressive(
                config.melee_cooldown_ms,
                config.melee_range,
            )),
            interaction: Box::new(NoInteraction),
            animation: Box::new(SpriteAnimation::new(Arc::new(
                AnimationCatalog::with_defaults(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{hostile_behaviors, TestFrame};
    use super::*;
    use crate::entity::{Entity, EntityKind};

    #[test]
    fn test_damage_plays_hit_before_death() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(1);
        let behaviors = hostile_behaviors(&frame.config);
        let mut controller = NpcController::new(entity.id(), behaviors);

        let source = frame.player_id;
        let outcome = {
            let mut ctx = frame.ctx();
            controller.take_damage(&mut entity, 1, Some(source), &mut ctx)
        };

        assert!(outcome.died);
        assert_eq!(entity.state(), EntityState::Death);

        // The red hit tint must be queued before the death clip.
        let tint_idx = frame
            .render
            .iter()
            .position(|c| matches!(c, RenderCommand::SetTint { .. }))
            .expect("hit tint queued");
        let death_idx = frame
            .render
            .iter()
            .position(|c| matches!(c, RenderCommand::Play { clip, .. } if clip.contains("death")))
            .expect("death clip queued");
        assert!(tint_idx < death_idx);
    }

    #[test]
    fn test_nonlethal_damage_keeps_entity_alive() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(3);
        let behaviors = hostile_behaviors(&frame.config);
        let mut controller = NpcController::new(entity.id(), behaviors);

        let outcome = {
            let mut ctx = frame.ctx();
            controller.take_damage(&mut entity, 1, None, &mut ctx)
        };

        assert!(!outcome.died);
        assert_eq!(outcome.remaining, 2);
        assert_eq!(entity.state(), EntityState::Hit);
        assert!(entity.is_alive());
    }

    #[test]
    fn test_movement_swap_stops_old_strategy() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(50.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let behaviors = hostile_behaviors(&frame.config);
        let mut controller = NpcController::new(entity.id(), behaviors);

        {
            let mut ctx = frame.ctx();
            controller.update(&mut entity, &mut ctx);
        }
        assert_eq!(frame.scheduler.len(), 1);

        {
            let mut ctx = frame.ctx();
            controller.set_movement(
                Box::new(crate::behavior::movement::IdleMovement),
                &mut entity,
                &mut ctx,
            );
        }
        assert!(frame.scheduler.is_empty());
        assert_eq!(entity.velocity(), Vec2::ZERO);
    }
}
