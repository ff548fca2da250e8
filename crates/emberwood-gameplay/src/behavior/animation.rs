//! Sprite animation strategy.

use std::sync::Arc;

use tracing::trace;

use crate::animation::AnimationCatalog;
use crate::behavior::{Animation, BehaviorCtx, TimerKind};
use crate::effects::EffectKind;
use crate::entity::{Entity, EntityState, Facing};
use crate::render::{RenderCommand, Tint};

/// Catalog-backed animation playback.
///
/// Resolves `(kind, state, facing)` against a shared [`AnimationCatalog`]
/// and emits render commands. Feedback effects piggyback on state
/// transitions: Hit applies the red tint, Attack/Shoot the highlight, and
/// Death spawns the detached burst effect.
pub struct SpriteAnimation {
    catalog: Arc<AnimationCatalog>,
}

impl SpriteAnimation {
    /// Creates an animation strategy over the shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<AnimationCatalog>) -> Self {
        Self { catalog }
    }

    fn emit_clip(&self, entity: &Entity, state: EntityState, facing: Facing, ctx: &mut BehaviorCtx<'_>) {
        match self.catalog.resolve(entity.kind(), state, facing) {
            Some(clip) => ctx.render.push(RenderCommand::Play {
                entity: entity.id(),
                clip: clip.key.clone(),
                flip_x: clip.flip_x,
            }),
            None => trace!(
                kind = ?entity.kind(),
                state = ?state,
                "no clip mapped, skipping playback"
            ),
        }
    }
}

impl Animation for SpriteAnimation {
    fn setup(&mut self, entity: &Entity, ctx: &mut BehaviorCtx<'_>) {
        self.emit_clip(entity, entity.state(), entity.facing(), ctx);
    }

    fn play(
        &mut self,
        entity: &mut Entity,
        state: EntityState,
        facing: Facing,
        ctx: &mut BehaviorCtx<'_>,
    ) {
        // Death is terminal: a tint timer or late chase tick must not
        // animate a corpse back to life.
        if entity.state() == EntityState::Death && state != EntityState::Death {
            return;
        }
        entity.set_state(state);
        entity.set_facing(facing);
        self.emit_clip(entity, state, facing, ctx);

        match state {
            EntityState::Hit => {
                ctx.render.push(RenderCommand::SetTint {
                    entity: entity.id(),
                    tint: Tint::HIT,
                });
                ctx.scheduler.after(
                    entity.id(),
                    ctx.now_ms,
                    ctx.config.hit_tint_ms,
                    TimerKind::ClearTint,
                );
            },
            EntityState::Attack | EntityState::Shoot => {
                ctx.render.push(RenderCommand::SetTint {
                    entity: entity.id(),
                    tint: Tint::HIGHLIGHT,
                });
                ctx.scheduler.after(
                    entity.id(),
                    ctx.now_ms,
                    ctx.config.attack_tint_ms,
                    TimerKind::ClearTint,
                );
            },
            EntityState::Death => {
                ctx.effects.spawn(
                    EffectKind::DeathBurst,
                    entity.position(),
                    ctx.now_ms,
                    ctx.config.death_effect_ms,
                );
            },
            EntityState::Idle | EntityState::Walk => {},
        }
    }
}
