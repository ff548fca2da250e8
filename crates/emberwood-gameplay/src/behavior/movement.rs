//! Movement strategies.

use emberwood_common::Vec2;

use crate::behavior::{BehaviorCtx, Movement, TimerKind};
use crate::entity::{Entity, EntityState, Facing};

/// Stands still. Used by villagers and pacified hostiles.
#[derive(Debug, Default)]
pub struct IdleMovement;

impl Movement for IdleMovement {
    fn update(&mut self, _entity: &mut Entity, _ctx: &mut BehaviorCtx<'_>) {}

    fn stop(&mut self, entity: &mut Entity, _ctx: &mut BehaviorCtx<'_>) {
        entity.set_velocity(Vec2::ZERO);
    }
}

/// Pursues the player while in range or startled.
///
/// Pursuit is driven by a recurring redirection timer rather than per-frame
/// steering: every tick re-aims the velocity at the player's current
/// position, which gives the characteristic stepped homing of tile-based
/// chases. The timer is scheduled once when pursuit begins and cancelled
/// exactly once when it ends, on deactivation, or on death.
#[derive(Debug)]
pub struct ChaseMovement {
    chase_distance: f32,
    timer: Option<emberwood_kernel::TimerHandle>,
}

impl ChaseMovement {
    /// Creates a chase strategy triggering within `chase_distance`.
    #[must_use]
    pub const fn new(chase_distance: f32) -> Self {
        Self {
            chase_distance,
            timer: None,
        }
    }

    /// Whether the chase timer is currently scheduled.
    #[must_use]
    pub const fn is_chasing(&self) -> bool {
        self.timer.is_some()
    }

    fn should_chase(&self, entity: &Entity, ctx: &BehaviorCtx<'_>) -> bool {
        if entity.is_startled() {
            return true;
        }
        let d2 = entity.position().distance_squared(ctx.player_pos);
        d2 <= self.chase_distance * self.chase_distance
    }
}

impl Movement for ChaseMovement {
    fn update(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) {
        if !entity.is_alive() {
            self.stop(entity, ctx);
            return;
        }
        if self.should_chase(entity, ctx) {
            if self.timer.is_none() {
                self.timer = Some(ctx.scheduler.every(
                    entity.id(),
                    ctx.now_ms,
                    ctx.config.chase_period_ms,
                    ctx.config.chase_start_delay_ms,
                    TimerKind::ChaseTick,
                ));
            }
        } else if self.timer.is_some() {
            self.stop(entity, ctx);
        }
    }

    fn on_timer(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) {
        // The timer may fire after circumstances changed; re-validate.
        if !entity.is_alive() || !self.should_chase(entity, ctx) {
            self.stop(entity, ctx);
            return;
        }
        let dir = (ctx.player_pos - entity.position()).normalize_or_zero();
        entity.set_velocity(dir * entity.speed());
        if dir != Vec2::ZERO {
            entity.set_facing(Facing::from_direction(dir));
        }
        if entity.state() == EntityState::Idle {
            entity.set_state(EntityState::Walk);
        }
    }

    fn stop(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) {
        if let Some(handle) = self.timer.take() {
            ctx.scheduler.cancel(handle);
        }
        entity.set_velocity(Vec2::ZERO);
        if entity.state() == EntityState::Walk {
            entity.set_state(EntityState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_support::TestFrame;
    use crate::entity::EntityKind;

    #[test]
    fn test_chase_starts_within_distance() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(100.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let mut movement = ChaseMovement::new(200.0);

        let mut ctx = frame.ctx();
        movement.update(&mut entity, &mut ctx);
        assert!(movement.is_chasing());
        assert_eq!(ctx.scheduler.len(), 1);

        // A second update must not schedule a second timer.
        movement.update(&mut entity, &mut ctx);
        assert_eq!(ctx.scheduler.len(), 1);
    }

    #[test]
    fn test_chase_ignores_distant_player() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(500.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let mut movement = ChaseMovement::new(200.0);

        let mut ctx = frame.ctx();
        movement.update(&mut entity, &mut ctx);
        assert!(!movement.is_chasing());
        assert!(ctx.scheduler.is_empty());
    }

    #[test]
    fn test_startled_overrides_distance() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(500.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        entity.set_startled(true);
        let mut movement = ChaseMovement::new(200.0);

        let mut ctx = frame.ctx();
        movement.update(&mut entity, &mut ctx);
        assert!(movement.is_chasing());
    }

    #[test]
    fn test_tick_aims_velocity_at_player() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(100.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO).with_speed(80.0);
        let mut movement = ChaseMovement::new(200.0);

        let mut ctx = frame.ctx();
        movement.update(&mut entity, &mut ctx);
        movement.on_timer(&mut entity, &mut ctx);

        assert_eq!(entity.velocity(), Vec2::new(80.0, 0.0));
        assert_eq!(entity.facing(), Facing::Right);
        assert_eq!(entity.state(), EntityState::Walk);
    }

    #[test]
    fn test_tick_after_player_escapes_stops_chase() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(100.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let mut movement = ChaseMovement::new(200.0);

        {
            let mut ctx = frame.ctx();
            movement.update(&mut entity, &mut ctx);
            movement.on_timer(&mut entity, &mut ctx);
        }
        assert!(movement.is_chasing());

        frame.player_pos = Vec2::new(1000.0, 0.0);
        let mut ctx = frame.ctx();
        movement.on_timer(&mut entity, &mut ctx);

        assert!(!movement.is_chasing());
        assert_eq!(entity.velocity(), Vec2::ZERO);
        assert_eq!(entity.state(), EntityState::Idle);
        assert!(ctx.scheduler.is_empty());
    }

    #[test]
    fn test_stop_cancels_timer_exactly_once() {
        let mut frame = TestFrame::new();
        frame.player_pos = Vec2::new(50.0, 0.0);
        let mut entity = Entity::new(EntityKind::Wolf, Vec2::ZERO);
        let mut movement = ChaseMovement::new(200.0);

        let mut ctx = frame.ctx();
        movement.update(&mut entity, &mut ctx);
        assert_eq!(ctx.scheduler.len(), 1);

        movement.stop(&mut entity, &mut ctx);
        assert!(ctx.scheduler.is_empty());

        // Repeated stops are harmless no-ops.
        movement.stop(&mut entity, &mut ctx);
        assert!(!movement.is_chasing());
    }
}
