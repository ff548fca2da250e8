//! Per-frame player intent.
//!
//! The input layer polls the keyboard and produces one of these per frame;
//! the simulation consumes it and never sees raw input.

use serde::{Deserialize, Serialize};

use emberwood_common::Vec2;

/// Movement/attack/interact intent for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Desired movement direction (not necessarily normalized)
    pub move_dir: Vec2,
    /// Whether an attack was requested this frame
    pub attack: bool,
    /// Whether an interaction was requested this frame
    pub interact: bool,
}

impl PlayerIntent {
    /// An intent with no input.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// An intent moving in the given direction.
    #[must_use]
    pub fn moving(dir: Vec2) -> Self {
        Self {
            move_dir: dir,
            ..Self::default()
        }
    }
}
