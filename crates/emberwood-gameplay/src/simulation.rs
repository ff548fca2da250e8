//! Simulation facade: one update call per frame.
//!
//! Owns the arena, controllers, activation tracker, scheduler, and event
//! bus, and sequences the frame:
//!
//! 1. advance the clock
//! 2. apply player intent and integrate the player
//! 3. run the activation pass and show/hide entities that crossed it
//! 4. resolve collision reports from the host
//! 5. run active NPC controllers, collecting attack outcomes
//! 6. integrate velocities and cull escaped projectiles
//! 7. fire due timers, re-validating owners
//! 8. apply queued damage, then process deaths
//! 9. prune expired effects
//!
//! Everything is single-threaded; within one update every timestamp read
//! sees the same frame time.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, info};

use emberwood_common::{EntityId, Rect, Vec2};
use emberwood_kernel::{FrameClock, Scheduler};

use crate::activation::ActivationTracker;
use crate::animation::AnimationCatalog;
use crate::behavior::animation::SpriteAnimation;
use crate::behavior::combat::MeleeCombat;
use crate::behavior::{
    Animation, AttackOutcome, BehaviorCtx, Combat, NpcController, TargetRef, TimerKind,
};
use crate::collision::CollisionEvent;
use crate::config::SimConfig;
use crate::effects::EffectPool;
use crate::entity::{EntityArena, EntityKind, EntityState, Facing};
use crate::events::{EventBus, GameEvent};
use crate::intent::PlayerIntent;
use crate::render::RenderCommand;
use crate::spawn::{ArchetypeRegistry, EntityFactory};

/// The whole simulation behind a single per-frame update.
pub struct Simulation {
    config: SimConfig,
    clock: FrameClock,
    arena: EntityArena,
    controllers: AHashMap<EntityId, NpcController>,
    activation: ActivationTracker,
    scheduler: Scheduler<TimerKind>,
    events: EventBus,
    render: Vec<RenderCommand>,
    effects: EffectPool,
    factory: EntityFactory,
    player_id: EntityId,
    player_combat: MeleeCombat,
    player_animation: SpriteAnimation,
    collisions: Vec<CollisionEvent>,
    projectile_sources: AHashMap<EntityId, EntityId>,
}

impl Simulation {
    /// Creates a simulation with the default archetype set and spawns the
    /// player at the world center.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let catalog = Arc::new(AnimationCatalog::with_defaults());
        Self::with_registry(config, ArchetypeRegistry::with_defaults(), catalog)
    }

    /// Creates a simulation with a caller-supplied archetype registry and
    /// animation catalog.
    #[must_use]
    pub fn with_registry(
        config: SimConfig,
        registry: ArchetypeRegistry,
        catalog: Arc<AnimationCatalog>,
    ) -> Self {
        let factory = EntityFactory::new(registry, Arc::clone(&catalog));
        let mut arena = EntityArena::new();
        let center = Vec2::new(config.world_width / 2.0, config.world_height / 2.0);
        let player_id = factory.spawn_player(center, &mut arena);

        let events = EventBus::default();
        events.publish(GameEvent::EntitySpawned {
            entity: player_id,
            kind: EntityKind::Player,
        });
        info!(?player_id, "simulation initialized");

        Self {
            activation: ActivationTracker::new(&config),
            player_combat: MeleeCombat::new(config.melee_cooldown_ms, config.melee_range),
            player_animation: SpriteAnimation::new(catalog),
            config,
            clock: FrameClock::new(),
            arena,
            controllers: AHashMap::new(),
            scheduler: Scheduler::new(),
            events,
            render: Vec::new(),
            effects: EffectPool::new(),
            factory,
            player_id,
            collisions: Vec::new(),
            projectile_sources: AHashMap::new(),
        }
    }

    /// Returns the player's entity id.
    #[must_use]
    pub const fn player_id(&self) -> EntityId {
        self.player_id
    }

    /// Returns the simulation configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the entity arena.
    #[must_use]
    pub const fn arena(&self) -> &EntityArena {
        &self.arena
    }

    /// Returns mutable access to the entity arena.
    pub fn arena_mut(&mut self) -> &mut EntityArena {
        &mut self.arena
    }

    /// Returns the currently active entity ids, sorted for determinism.
    #[must_use]
    pub fn active_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.activation.active().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the gameplay event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the live visual effects.
    #[must_use]
    pub const fn effects(&self) -> &EffectPool {
        &self.effects
    }

    /// Returns the current frame timestamp in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Takes the render commands queued since the last call.
    pub fn drain_render(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.render)
    }

    /// Queues a collision report from the hosting physics layer. Resolved
    /// on the next update.
    pub fn report_collision(&mut self, event: CollisionEvent) {
        self.collisions.push(event);
    }

    /// Spawns a named archetype, wiring its controller and initial clip.
    pub fn spawn_npc(&mut self, name: &str, position: Vec2) -> Option<EntityId> {
        let (id, mut controller) =
            self.factory
                .spawn_named(name, position, &self.config, &mut self.arena)?;

        let Self {
            config,
            scheduler,
            events,
            render,
            effects,
            arena,
            clock,
            player_id,
            ..
        } = self;
        let player_pos = arena
            .get(*player_id)
            .map(|p| p.position())
            .unwrap_or_default();
        let mut ctx = BehaviorCtx {
            now_ms: clock.now_ms(),
            dt: 0.0,
            player_id: *player_id,
            player_pos,
            config,
            scheduler,
            events,
            render,
            effects,
        };
        if let Ok(entity) = arena.get(id) {
            controller.setup(entity, &mut ctx);
            events.publish(GameEvent::EntitySpawned {
                entity: id,
                kind: entity.kind(),
            });
        }

        self.controllers.insert(id, controller);
        Some(id)
    }

    /// Runs the initial activation pass with the widened registration
    /// radius. Call once after populating the world.
    pub fn prime(&mut self, viewport: Rect) {
        let player_pos = self.player_position();
        let delta = self.activation.prime(&mut self.arena, viewport, player_pos);
        for &id in &delta.activated {
            self.render.push(RenderCommand::SetVisible {
                entity: id,
                visible: true,
            });
        }
        for &id in &delta.deactivated {
            self.render.push(RenderCommand::SetVisible {
                entity: id,
                visible: false,
            });
        }
    }

    fn player_position(&self) -> Vec2 {
        self.arena
            .get(self.player_id)
            .map(|p| p.position())
            .unwrap_or_default()
    }

    /// Advances the simulation by one frame.
    pub fn update(&mut self, viewport: Rect, intent: &PlayerIntent, dt: f32) {
        let dt = self.clock.advance(dt);
        let now_ms = self.clock.now_ms();

        self.step_player_intent(intent, now_ms, dt);
        let player_pos = self.player_position();

        // Activation pass: stop and hide entities that dropped out, show
        // entities that came in.
        {
            let delta = self
                .activation
                .update(&mut self.arena, viewport, player_pos);
            let Self {
                config,
                controllers,
                arena,
                scheduler,
                events,
                render,
                effects,
                player_id,
                ..
            } = self;
            for &id in &delta.deactivated {
                if let (Some(controller), Ok(entity)) = (controllers.get_mut(&id), arena.get_mut(id))
                {
                    let mut ctx = BehaviorCtx {
                        now_ms,
                        dt,
                        player_id: *player_id,
                        player_pos,
                        config,
                        scheduler: &mut *scheduler,
                        events,
                        render: &mut *render,
                        effects: &mut *effects,
                    };
                    controller.deactivate(entity, &mut ctx);
                }
                render.push(RenderCommand::SetVisible {
                    entity: id,
                    visible: false,
                });
            }
            for &id in &delta.activated {
                render.push(RenderCommand::SetVisible {
                    entity: id,
                    visible: true,
                });
            }
            if !delta.is_empty() {
                debug!(
                    activated = delta.activated.len(),
                    deactivated = delta.deactivated.len(),
                    "activation delta"
                );
            }
        }

        // Queued damage to apply after behaviors run: (target, amount, source).
        let mut pending_damage: Vec<(EntityId, i32, Option<EntityId>)> = Vec::new();

        self.step_collisions(now_ms, dt, player_pos, &mut pending_damage);
        self.step_player_actions(intent, now_ms, dt, player_pos, &mut pending_damage);
        self.step_controllers(now_ms, dt, player_pos, &mut pending_damage);
        self.step_integration(dt);
        self.step_timers(now_ms, dt, player_pos);
        self.step_damage(now_ms, dt, player_pos, pending_damage);

        self.effects.prune(now_ms);
    }

    /// Applies movement intent to the player and integrates its position.
    fn step_player_intent(&mut self, intent: &PlayerIntent, now_ms: u64, dt: f32) {
        let Self {
            config,
            arena,
            scheduler,
            events,
            render,
            effects,
            player_id,
            player_animation,
            ..
        } = self;
        let Ok(player) = arena.get_mut(*player_id) else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        let dir = intent.move_dir.normalize_or_zero();
        player.set_velocity(dir * player.speed());
        let pos = player.position() + player.velocity() * dt;
        player.set_position(Vec2::new(
            pos.x.clamp(0.0, config.world_width),
            pos.y.clamp(0.0, config.world_height),
        ));

        let current = (player.state(), player.facing());
        let desired = if dir != Vec2::ZERO {
            (EntityState::Walk, Facing::from_direction(dir))
        } else if player.state() == EntityState::Walk {
            (EntityState::Idle, player.facing())
        } else {
            current
        };

        if desired != current {
            let player_pos = player.position();
            let mut ctx = BehaviorCtx {
                now_ms,
                dt,
                player_id: *player_id,
                player_pos,
                config,
                scheduler,
                events,
                render,
                effects,
            };
            player_animation.play(player, desired.0, desired.1, &mut ctx);
        }
    }

    /// Resolves collision reports queued by the host.
    fn step_collisions(
        &mut self,
        now_ms: u64,
        dt: f32,
        player_pos: Vec2,
        pending_damage: &mut Vec<(EntityId, i32, Option<EntityId>)>,
    ) {
        let reports = std::mem::take(&mut self.collisions);
        for report in reports {
            match report {
                CollisionEvent::ProjectileHit { projectile, target } => {
                    let Ok(proj) = self.arena.get(projectile) else {
                        continue;
                    };
                    let source = self.projectile_sources.get(&projectile).copied();
                    if source == Some(target) {
                        continue;
                    }
                    pending_damage.push((target, proj.attack_damage(), source));
                    self.despawn_projectile(projectile);
                },
                CollisionEvent::PlayerTouched { npc } => {
                    let Self {
                        config,
                        controllers,
                        arena,
                        scheduler,
                        events,
                        render,
                        effects,
                        player_id,
                        ..
                    } = self;
                    let (Some(controller), Ok(entity)) =
                        (controllers.get_mut(&npc), arena.get_mut(npc))
                    else {
                        continue;
                    };
                    if !entity.kind().is_hostile() {
                        continue;
                    }
                    let mut ctx = BehaviorCtx {
                        now_ms,
                        dt,
                        player_id: *player_id,
                        player_pos,
                        config,
                        scheduler: &mut *scheduler,
                        events,
                        render: &mut *render,
                        effects: &mut *effects,
                    };
                    let target = TargetRef {
                        id: *player_id,
                        position: player_pos,
                    };
                    if let AttackOutcome::Melee { target, damage } =
                        controller.attack(entity, target, &mut ctx)
                    {
                        pending_damage.push((target, damage, Some(npc)));
                    }
                },
            }
        }
    }

    /// Handles the player's attack and interact intents.
    fn step_player_actions(
        &mut self,
        intent: &PlayerIntent,
        now_ms: u64,
        dt: f32,
        player_pos: Vec2,
        pending_damage: &mut Vec<(EntityId, i32, Option<EntityId>)>,
    ) {
        if !intent.attack && !intent.interact {
            return;
        }
        let Ok(player) = self.arena.get(self.player_id) else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        if intent.attack {
            let target = self.nearest_npc(player_pos, self.config.melee_range);
            if let Some((target_id, target_pos)) = target {
                let Self {
                    config,
                    arena,
                    scheduler,
                    events,
                    render,
                    effects,
                    player_id,
                    player_combat,
                    player_animation,
                    ..
                } = self;
                if let Ok(player) = arena.get_mut(*player_id) {
                    let mut ctx = BehaviorCtx {
                        now_ms,
                        dt,
                        player_id: *player_id,
                        player_pos,
                        config,
                        scheduler: &mut *scheduler,
                        events,
                        render: &mut *render,
                        effects: &mut *effects,
                    };
                    let outcome = player_combat.attack(
                        player,
                        TargetRef {
                            id: target_id,
                            position: target_pos,
                        },
                        &mut ctx,
                    );
                    if let AttackOutcome::Melee { target, damage } = outcome {
                        let facing = player.facing();
                        player_animation.play(player, EntityState::Attack, facing, &mut ctx);
                        pending_damage.push((target, damage, Some(*player_id)));
                    }
                }
            }
        }

        if intent.interact {
            self.step_interact(now_ms, dt, player_pos);
        }
    }

    fn step_interact(&mut self, now_ms: u64, dt: f32, player_pos: Vec2) {
        let mut best: Option<(EntityId, f32)> = None;
        for (&id, controller) in &self.controllers {
            let Ok(entity) = self.arena.get(id) else {
                continue;
            };
            if !controller.can_interact(entity, player_pos, &self.config) {
                continue;
            }
            let d2 = entity.position().distance_squared(player_pos);
            if best.map_or(true, |(_, bd2)| d2 < bd2) {
                best = Some((id, d2));
            }
        }
        let Some((id, _)) = best else {
            return;
        };

        let Self {
            config,
            controllers,
            arena,
            scheduler,
            events,
            render,
            effects,
            player_id,
            ..
        } = self;
        if let (Some(controller), Ok(entity)) = (controllers.get_mut(&id), arena.get_mut(id)) {
            let mut ctx = BehaviorCtx {
                now_ms,
                dt,
                player_id: *player_id,
                player_pos,
                config,
                scheduler,
                events,
                render,
                effects,
            };
            controller.interact(entity, &mut ctx);
        }
    }

    fn nearest_npc(&self, from: Vec2, range: f32) -> Option<(EntityId, Vec2)> {
        let r2 = range * range;
        self.arena
            .iter()
            .filter(|e| e.kind().is_npc() && e.is_alive())
            .map(|e| (e.id(), e.position(), e.position().distance_squared(from)))
            .filter(|(_, _, d2)| *d2 <= r2)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, pos, _)| (id, pos))
    }

    /// Runs every active NPC controller, queuing attack outcomes.
    fn step_controllers(
        &mut self,
        now_ms: u64,
        dt: f32,
        player_pos: Vec2,
        pending_damage: &mut Vec<(EntityId, i32, Option<EntityId>)>,
    ) {
        let active = self.active_ids();
        let mut projectiles: Vec<(EntityId, Vec2, Vec2, i32)> = Vec::new();

        {
            let Self {
                config,
                controllers,
                arena,
                scheduler,
                events,
                render,
                effects,
                player_id,
                ..
            } = self;
            for id in active {
                let (Some(controller), Ok(entity)) = (controllers.get_mut(&id), arena.get_mut(id))
                else {
                    continue;
                };
                if !entity.is_alive() {
                    continue;
                }
                let mut ctx = BehaviorCtx {
                    now_ms,
                    dt,
                    player_id: *player_id,
                    player_pos,
                    config,
                    scheduler: &mut *scheduler,
                    events,
                    render: &mut *render,
                    effects: &mut *effects,
                };
                match controller.update(entity, &mut ctx) {
                    Some(AttackOutcome::Melee { target, damage }) => {
                        pending_damage.push((target, damage, Some(id)));
                    },
                    Some(AttackOutcome::Projectile { velocity, damage }) => {
                        projectiles.push((id, entity.position(), velocity, damage));
                    },
                    _ => {},
                }
            }
        }

        for (shooter, position, velocity, damage) in projectiles {
            let projectile =
                self.factory
                    .spawn_projectile(position, velocity, damage, &mut self.arena);
            self.projectile_sources.insert(projectile, shooter);
            self.events.publish(GameEvent::ProjectileFired {
                shooter,
                projectile,
            });
            self.render.push(RenderCommand::SetVisible {
                entity: projectile,
                visible: true,
            });
        }
    }

    /// Integrates NPC and projectile velocities; culls escaped projectiles.
    fn step_integration(&mut self, dt: f32) {
        let world = Rect::new(0.0, 0.0, self.config.world_width, self.config.world_height);
        let mut escaped: Vec<EntityId> = Vec::new();

        for entity in self.arena.iter_mut() {
            if entity.kind() == EntityKind::Player || entity.velocity() == Vec2::ZERO {
                continue;
            }
            let pos = entity.position() + entity.velocity() * dt;
            entity.set_position(pos);
            if entity.kind() == EntityKind::Projectile && !world.contains(pos) {
                escaped.push(entity.id());
            }
        }

        for id in escaped {
            self.despawn_projectile(id);
        }
    }

    fn despawn_projectile(&mut self, id: EntityId) {
        self.projectile_sources.remove(&id);
        self.activation.remove(id);
        if self.arena.despawn(id).is_ok() {
            self.render.push(RenderCommand::SetVisible {
                entity: id,
                visible: false,
            });
        }
    }

    /// Fires due timers, re-validating owner liveness for each.
    fn step_timers(&mut self, now_ms: u64, dt: f32, player_pos: Vec2) {
        let fired = self.scheduler.advance(now_ms);
        if fired.is_empty() {
            return;
        }
        let Self {
            config,
            controllers,
            arena,
            activation,
            scheduler,
            events,
            render,
            effects,
            player_id,
            ..
        } = self;

        for timer in fired {
            match timer.kind {
                TimerKind::ClearTint => {
                    if arena.contains(timer.owner) {
                        render.push(RenderCommand::ClearTint {
                            entity: timer.owner,
                        });
                    }
                },
                TimerKind::ClearStartle => {
                    if let Ok(entity) = arena.get_mut(timer.owner) {
                        entity.set_startled(false);
                    }
                },
                TimerKind::ChaseTick => {
                    if !activation.is_active(timer.owner) {
                        continue;
                    }
                    let (Some(controller), Ok(entity)) = (
                        controllers.get_mut(&timer.owner),
                        arena.get_mut(timer.owner),
                    ) else {
                        continue;
                    };
                    let mut ctx = BehaviorCtx {
                        now_ms,
                        dt,
                        player_id: *player_id,
                        player_pos,
                        config,
                        scheduler: &mut *scheduler,
                        events,
                        render: &mut *render,
                        effects: &mut *effects,
                    };
                    controller.on_timer(TimerKind::ChaseTick, entity, &mut ctx);
                },
            }
        }
    }

    /// Applies queued damage, then removes the dead.
    fn step_damage(
        &mut self,
        now_ms: u64,
        dt: f32,
        player_pos: Vec2,
        pending_damage: Vec<(EntityId, i32, Option<EntityId>)>,
    ) {
        let mut died: Vec<EntityId> = Vec::new();

        for (target, amount, source) in pending_damage {
            if target == self.player_id {
                self.damage_player(now_ms, dt, player_pos, amount, source);
                continue;
            }
            let Self {
                config,
                controllers,
                arena,
                scheduler,
                events,
                render,
                effects,
                player_id,
                ..
            } = self;
            let (Some(controller), Ok(entity)) =
                (controllers.get_mut(&target), arena.get_mut(target))
            else {
                continue;
            };
            if !entity.is_alive() {
                continue;
            }
            let mut ctx = BehaviorCtx {
                now_ms,
                dt,
                player_id: *player_id,
                player_pos,
                config,
                scheduler: &mut *scheduler,
                events,
                render: &mut *render,
                effects: &mut *effects,
            };
            let outcome = controller.take_damage(entity, amount, source, &mut ctx);
            if outcome.died {
                died.push(target);
            }
        }

        for id in died {
            // The death clip and burst effect are already queued; what is
            // left is removing every trace of the entity this frame.
            self.scheduler.cancel_owner(id);
            self.controllers.remove(&id);
            self.activation.remove(id);
            if self.arena.despawn(id).is_ok() {
                self.render.push(RenderCommand::SetVisible {
                    entity: id,
                    visible: false,
                });
            }
            debug!(?id, "entity removed after death");
        }
    }

    fn damage_player(
        &mut self,
        now_ms: u64,
        dt: f32,
        player_pos: Vec2,
        amount: i32,
        source: Option<EntityId>,
    ) {
        let Self {
            config,
            arena,
            scheduler,
            events,
            render,
            effects,
            player_id,
            player_animation,
            ..
        } = self;
        let Ok(player) = arena.get_mut(*player_id) else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        player.health_mut().damage(amount);
        let remaining = player.health().current();
        events.publish(GameEvent::EntityDamaged {
            entity: *player_id,
            amount,
            remaining,
            source,
        });

        let mut ctx = BehaviorCtx {
            now_ms,
            dt,
            player_id: *player_id,
            player_pos,
            config,
            scheduler,
            events,
            render,
            effects,
        };
        let facing = player.facing();
        player_animation.play(player, EntityState::Hit, facing, &mut ctx);
        if player.health().is_dead() {
            player.set_velocity(Vec2::ZERO);
            player_animation.play(player, EntityState::Death, facing, &mut ctx);
            ctx.events.publish(GameEvent::PlayerDied);
            info!("player died");
        }
    }
}
