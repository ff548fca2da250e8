//! Render-host command queue.
//!
//! The simulation core never draws. It emits [`RenderCommand`]s describing
//! the visual mutations the hosting render layer must apply before the next
//! paint: clip playback, flip, tint, and visibility.

use serde::{Deserialize, Serialize};

use emberwood_common::EntityId;

/// An RGBA tint multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    /// Red channel (0.0 - 1.0)
    pub r: f32,
    /// Green channel (0.0 - 1.0)
    pub g: f32,
    /// Blue channel (0.0 - 1.0)
    pub b: f32,
    /// Alpha channel (0.0 - 1.0)
    pub a: f32,
}

impl Tint {
    /// Red damage-feedback tint.
    pub const HIT: Self = Self {
        r: 1.0,
        g: 0.25,
        b: 0.25,
        a: 1.0,
    };

    /// Brief highlight applied while attacking.
    pub const HIGHLIGHT: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 0.6,
        a: 1.0,
    };
}

/// A visual mutation for the render host to apply before the next paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Play an animation clip on an entity's sprite
    Play {
        /// Target entity
        entity: EntityId,
        /// Animation clip key
        clip: String,
        /// Whether to mirror the sprite horizontally
        flip_x: bool,
    },
    /// Apply a tint to an entity's sprite
    SetTint {
        /// Target entity
        entity: EntityId,
        /// Tint to apply
        tint: Tint,
    },
    /// Remove any tint from an entity's sprite
    ClearTint {
        /// Target entity
        entity: EntityId,
    },
    /// Show or hide an entity's sprite
    SetVisible {
        /// Target entity
        entity: EntityId,
        /// Whether the sprite is visible
        visible: bool,
    },
}
