//! Combat strategies.
//!
//! Cooldowns are timestamp checks against the frame clock, not scheduled
//! timers: an attack records its millisecond timestamp and later requests
//! compare elapsed time against the cooldown. A rejected attack leaves the
//! timestamp untouched.

use emberwood_common::{EntityId, Vec2};

use crate::behavior::{AttackOutcome, BehaviorCtx, Combat, DamageOutcome, TargetRef, TimerKind};
use crate::config::StartlePolicy;
use crate::entity::{Entity, Facing};
use crate::events::GameEvent;

/// Applies damage to `entity` and publishes the event.
///
/// Damage from the player startles the victim, forcing pursuit regardless
/// of distance; the configured policy decides if and when that wears off.
fn apply_damage(
    entity: &mut Entity,
    amount: i32,
    source: Option<EntityId>,
    ctx: &mut BehaviorCtx<'_>,
) -> DamageOutcome {
    entity.health_mut().damage(amount);
    let remaining = entity.health().current();

    if source == Some(ctx.player_id) {
        entity.set_startled(true);
        if let StartlePolicy::Timed { ms } = ctx.config.startle_policy {
            ctx.scheduler
                .after(entity.id(), ctx.now_ms, ms, TimerKind::ClearStartle);
        }
    }

    ctx.events.publish(GameEvent::EntityDamaged {
        entity: entity.id(),
        amount,
        remaining,
        source,
    });

    DamageOutcome {
        remaining,
        died: entity.health().is_dead(),
    }
}

fn off_cooldown(last_attack_ms: Option<u64>, cooldown_ms: u64, now_ms: u64) -> bool {
    last_attack_ms.map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms)
}

/// Close-range strikes with a cooldown.
///
/// In aggressive mode the strategy attacks the player on its own whenever
/// the player is in reach; in passive mode (the player's own combat slot,
/// or a pacified hostile) it only attacks on request.
#[derive(Debug)]
pub struct MeleeCombat {
    cooldown_ms: u64,
    range: f32,
    aggressive: bool,
    last_attack_ms: Option<u64>,
}

impl MeleeCombat {
    /// Creates a passive melee strategy.
    #[must_use]
    pub const fn new(cooldown_ms: u64, range: f32) -> Self {
        Self {
            cooldown_ms,
            range,
            aggressive: false,
            last_attack_ms: None,
        }
    }

    /// Creates an aggressive melee strategy that attacks the player on
    /// sight.
    #[must_use]
    pub const fn aggressive(cooldown_ms: u64, range: f32) -> Self {
        Self {
            cooldown_ms,
            range,
            aggressive: true,
            last_attack_ms: None,
        }
    }
}

impl Combat for MeleeCombat {
    fn update(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) -> Option<AttackOutcome> {
        if !self.aggressive || !entity.is_alive() {
            return None;
        }
        let target = TargetRef {
            id: ctx.player_id,
            position: ctx.player_pos,
        };
        match self.attack(entity, target, ctx) {
            AttackOutcome::Rejected => None,
            outcome => Some(outcome),
        }
    }

    fn attack(
        &mut self,
        entity: &mut Entity,
        target: TargetRef,
        ctx: &mut BehaviorCtx<'_>,
    ) -> AttackOutcome {
        if !entity.is_alive() || !off_cooldown(self.last_attack_ms, self.cooldown_ms, ctx.now_ms) {
            return AttackOutcome::Rejected;
        }
        let to_target = target.position - entity.position();
        if to_target.length_squared() > self.range * self.range {
            return AttackOutcome::Rejected;
        }

        self.last_attack_ms = Some(ctx.now_ms);
        entity.set_facing(Facing::from_direction(to_target));
        AttackOutcome::Melee {
            target: target.id,
            damage: entity.attack_damage(),
        }
    }

    fn take_damage(
        &mut self,
        entity: &mut Entity,
        amount: i32,
        source: Option<EntityId>,
        ctx: &mut BehaviorCtx<'_>,
    ) -> DamageOutcome {
        apply_damage(entity, amount, source, ctx)
    }
}

/// Projectile attacks from a distance, with a cooldown.
#[derive(Debug)]
pub struct RangedCombat {
    cooldown_ms: u64,
    attack_range: f32,
    projectile_speed: f32,
    last_attack_ms: Option<u64>,
}

impl RangedCombat {
    /// Creates a ranged strategy firing within `attack_range`.
    #[must_use]
    pub const fn new(cooldown_ms: u64, attack_range: f32, projectile_speed: f32) -> Self {
        Self {
            cooldown_ms,
            attack_range,
            projectile_speed,
            last_attack_ms: None,
        }
    }
}

impl Combat for RangedCombat {
    fn update(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) -> Option<AttackOutcome> {
        if !entity.is_alive() {
            return None;
        }
        let target = TargetRef {
            id: ctx.player_id,
            position: ctx.player_pos,
        };
        match self.attack(entity, target, ctx) {
            AttackOutcome::Rejected => None,
            outcome => Some(outcome),
        }
    }

    fn attack(
        &mut self,
        entity: &mut Entity,
        target: TargetRef,
        ctx: &mut BehaviorCtx<'_>,
    ) -> AttackOutcome {
        if !entity.is_alive() || !off_cooldown(self.last_attack_ms, self.cooldown_ms, ctx.now_ms) {
            return AttackOutcome::Rejected;
        }
        let to_target = target.position - entity.position();
        if to_target.length_squared() > self.attack_range * self.attack_range {
            return AttackOutcome::Rejected;
        }
        let dir = to_target.normalize_or_zero();
        if dir == Vec2::ZERO {
            return AttackOutcome::Rejected;
        }

        self.last_attack_ms = Some(ctx.now_ms);
        entity.set_facing(Facing::from_direction(dir));
        AttackOutcome::Projectile {
            velocity: dir * self.projectile_speed,
            damage: entity.attack_damage(),
        }
    }

    fn take_damage(
        &mut self,
        entity: &mut Entity,
        amount: i32,
        source: Option<EntityId>,
        ctx: &mut BehaviorCtx<'_>,
    ) -> DamageOutcome {
        apply_damage(entity, amount, source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_support::TestFrame;
    use crate::entity::EntityKind;

    #[test]
    fn test_melee_cooldown_gates_attacks() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_damage(2);
        let mut combat = MeleeCombat::new(1000, 48.0);
        let target = TargetRef {
            id: frame.player_id,
            position: Vec2::new(10.0, 0.0),
        };

        {
            let mut ctx = frame.ctx();
            assert_eq!(
                combat.attack(&mut entity, target, &mut ctx),
                AttackOutcome::Melee {
                    target: target.id,
                    damage: 2
                }
            );
        }

        // 500 ms later: still cooling down.
        frame.now_ms = 500;
        {
            let mut ctx = frame.ctx();
            assert_eq!(
                combat.attack(&mut entity, target, &mut ctx),
                AttackOutcome::Rejected
            );
        }

        // 1100 ms after the first attack: accepted again.
        frame.now_ms = 1100;
        let mut ctx = frame.ctx();
        assert!(matches!(
            combat.attack(&mut entity, target, &mut ctx),
            AttackOutcome::Melee { .. }
        ));
    }

    #[test]
    fn test_melee_rejects_out_of_range() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let mut combat = MeleeCombat::new(1000, 48.0);
        let target = TargetRef {
            id: frame.player_id,
            position: Vec2::new(100.0, 0.0),
        };

        let mut ctx = frame.ctx();
        assert_eq!(
            combat.attack(&mut entity, target, &mut ctx),
            AttackOutcome::Rejected
        );

        // A rejected attack must not start the cooldown.
        let near = TargetRef {
            id: target.id,
            position: Vec2::new(10.0, 0.0),
        };
        assert!(matches!(
            combat.attack(&mut entity, near, &mut ctx),
            AttackOutcome::Melee { .. }
        ));
    }

    #[test]
    fn test_ranged_fires_toward_target() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Skeleton, Vec2::ZERO).with_damage(1);
        let mut combat = RangedCombat::new(1500, 300.0, 320.0);
        let target = TargetRef {
            id: frame.player_id,
            position: Vec2::new(200.0, 0.0),
        };

        let mut ctx = frame.ctx();
        let outcome = combat.attack(&mut entity, target, &mut ctx);
        assert_eq!(
            outcome,
            AttackOutcome::Projectile {
                velocity: Vec2::new(320.0, 0.0),
                damage: 1
            }
        );
        assert_eq!(entity.facing(), Facing::Right);
    }

    #[test]
    fn test_player_damage_startles_victim() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(5);
        let mut combat = MeleeCombat::aggressive(1000, 48.0);

        let source = frame.player_id;
        let mut ctx = frame.ctx();
        let outcome = combat.take_damage(&mut entity, 2, Some(source), &mut ctx);

        assert_eq!(outcome.remaining, 3);
        assert!(!outcome.died);
        assert!(entity.is_startled());
        // Permanent policy: no de-aggro timer scheduled.
        assert!(ctx.scheduler.is_empty());
    }

    #[test]
    fn test_timed_startle_schedules_clear() {
        let mut frame = TestFrame::new();
        frame.config.startle_policy = StartlePolicy::Timed { ms: 5000 };
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(5);
        let mut combat = MeleeCombat::aggressive(1000, 48.0);

        let source = frame.player_id;
        let mut ctx = frame.ctx();
        combat.take_damage(&mut entity, 1, Some(source), &mut ctx);

        assert!(entity.is_startled());
        assert_eq!(ctx.scheduler.len(), 1);
    }

    #[test]
    fn test_npc_damage_does_not_startle() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(5);
        let mut combat = MeleeCombat::new(1000, 48.0);

        let other = EntityId::new();
        let mut ctx = frame.ctx();
        combat.take_damage(&mut entity, 1, Some(other), &mut ctx);
        assert!(!entity.is_startled());
    }

    #[test]
    fn test_dead_attacker_rejected() {
        let mut frame = TestFrame::new();
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_health(1);
        entity.health_mut().damage(1);
        let mut combat = MeleeCombat::aggressive(1000, 48.0);

        let target = TargetRef {
            id: frame.player_id,
            position: Vec2::new(10.0, 0.0),
        };
        let mut ctx = frame.ctx();
        assert_eq!(
            combat.attack(&mut entity, target, &mut ctx),
            AttackOutcome::Rejected
        );
    }
}
