//! Interaction strategies.

use emberwood_common::Vec2;

use crate::behavior::{BehaviorCtx, Interaction};
use crate::config::SimConfig;
use crate::entity::{Entity, Facing};
use crate::events::GameEvent;

/// No interaction. Hostiles and projectiles use this.
#[derive(Debug, Default)]
pub struct NoInteraction;

impl Interaction for NoInteraction {
    fn can_interact(&self, _entity: &Entity, _player_pos: Vec2, _config: &SimConfig) -> bool {
        false
    }

    fn interact(&mut self, _entity: &mut Entity, _ctx: &mut BehaviorCtx<'_>) -> Option<String> {
        None
    }
}

/// Cycles through a fixed set of dialog lines.
///
/// Each interaction turns the speaker toward the player, publishes the
/// next line on the event bus, and wraps around at the end. Accepted
/// interactions start a cooldown, so a held interact input advances one
/// line per cooldown window rather than one per frame.
#[derive(Debug)]
pub struct DialogInteraction {
    lines: Vec<String>,
    next: usize,
    last_interact_ms: Option<u64>,
}

impl DialogInteraction {
    /// Creates a dialog strategy with the given lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            next: 0,
            last_interact_ms: None,
        }
    }

    fn off_cooldown(&self, now_ms: u64, cooldown_ms: u64) -> bool {
        self.last_interact_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms)
    }
}

impl Interaction for DialogInteraction {
    fn can_interact(&self, entity: &Entity, player_pos: Vec2, config: &SimConfig) -> bool {
        if self.lines.is_empty() || !entity.is_alive() {
            return false;
        }
        let d2 = entity.position().distance_squared(player_pos);
        d2 <= config.interact_range * config.interact_range
    }

    fn interact(&mut self, entity: &mut Entity, ctx: &mut BehaviorCtx<'_>) -> Option<String> {
        if self.lines.is_empty() || !self.off_cooldown(ctx.now_ms, ctx.config.interact_cooldown_ms)
        {
            return None;
        }
        self.last_interact_ms = Some(ctx.now_ms);
        let line = self.lines[self.next].clone();
        self.next = (self.next + 1) % self.lines.len();

        entity.set_facing(Facing::from_direction(ctx.player_pos - entity.position()));
        ctx.events.publish(GameEvent::DialogLine {
            speaker: entity.id(),
            line: line.clone(),
        });
        Some(line)
    }
}
