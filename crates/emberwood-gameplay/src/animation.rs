//! Animation catalog: mapping logical state to concrete clips.
//!
//! The catalog is immutable configuration data built once at startup and
//! shared by reference. It maps `(kind, state, facing)` to a clip key plus a
//! horizontal-flip flag; left-facing clips reuse the right-facing art
//! mirrored. A state with no entry falls back to the Idle mapping.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, EntityState, Facing};

/// A concrete animation clip reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip key known to the render host
    pub key: String,
    /// Whether the sprite is mirrored horizontally
    pub flip_x: bool,
}

impl AnimationClip {
    /// Creates a clip reference.
    #[must_use]
    pub fn new(key: impl Into<String>, flip_x: bool) -> Self {
        Self {
            key: key.into(),
            flip_x,
        }
    }
}

/// Immutable `(kind, state, facing)` → clip table.
#[derive(Debug, Default)]
pub struct AnimationCatalog {
    clips: AHashMap<(EntityKind, EntityState, Facing), AnimationClip>,
}

impl AnimationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the default catalog covering every shipped entity kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        let character_kinds = [
            (EntityKind::Player, EntityState::Attack),
            (EntityKind::Villager, EntityState::Attack),
            (EntityKind::Wolf, EntityState::Attack),
            (EntityKind::Skeleton, EntityState::Shoot),
        ];

        for (kind, attack_state) in character_kinds {
            for state in [
                EntityState::Idle,
                EntityState::Walk,
                attack_state,
                EntityState::Hit,
                EntityState::Death,
            ] {
                catalog.insert_directional(kind, state);
            }
        }

        // Projectiles have a single spinning clip, no facing variants.
        for facing in Facing::ALL {
            catalog.insert(
                EntityKind::Projectile,
                EntityState::Idle,
                facing,
                AnimationClip::new("arrow_fly", false),
            );
        }

        catalog
    }

    /// Inserts up/down/side entries for one `(kind, state)` pair, with the
    /// left variant mirroring the side clip.
    fn insert_directional(&mut self, kind: EntityKind, state: EntityState) {
        let prefix = kind.asset_prefix();
        let suffix = state.clip_suffix();
        self.insert(
            kind,
            state,
            Facing::Up,
            AnimationClip::new(format!("{prefix}_{suffix}_up"), false),
        );
        self.insert(
            kind,
            state,
            Facing::Down,
            AnimationClip::new(format!("{prefix}_{suffix}_down"), false),
        );
        self.insert(
            kind,
            state,
            Facing::Right,
            AnimationClip::new(format!("{prefix}_{suffix}_side"), false),
        );
        self.insert(
            kind,
            state,
            Facing::Left,
            AnimationClip::new(format!("{prefix}_{suffix}_side"), true),
        );
    }

    /// Inserts a single clip entry.
    pub fn insert(
        &mut self,
        kind: EntityKind,
        state: EntityState,
        facing: Facing,
        clip: AnimationClip,
    ) {
        self.clips.insert((kind, state, facing), clip);
    }

    /// Looks up an exact entry without fallback.
    #[must_use]
    pub fn get(&self, kind: EntityKind, state: EntityState, facing: Facing) -> Option<&AnimationClip> {
        self.clips.get(&(kind, state, facing))
    }

    /// Resolves a clip, falling back to the Idle mapping for unmapped
    /// states. Returns `None` only when Idle is also unmapped.
    #[must_use]
    pub fn resolve(
        &self,
        kind: EntityKind,
        state: EntityState,
        facing: Facing,
    ) -> Option<&AnimationClip> {
        self.get(kind, state, facing)
            .or_else(|| self.get(kind, EntityState::Idle, facing))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns true if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl Facing {
    /// All four facings, for table construction.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_wolf_walk() {
        let catalog = AnimationCatalog::with_defaults();
        let clip = catalog
            .resolve(EntityKind::Wolf, EntityState::Walk, Facing::Right)
            .expect("wolf walk should be mapped");
        assert_eq!(clip.key, "wolf_walk_side");
        assert!(!clip.flip_x);
    }

    #[test]
    fn test_left_facing_mirrors_side_clip() {
        let catalog = AnimationCatalog::with_defaults();
        let left = catalog
            .resolve(EntityKind::Player, EntityState::Walk, Facing::Left)
            .expect("mapped");
        let right = catalog
            .resolve(EntityKind::Player, EntityState::Walk, Facing::Right)
            .expect("mapped");
        assert_eq!(left.key, right.key);
        assert!(left.flip_x);
        assert!(!right.flip_x);
    }

    #[test]
    fn test_unmapped_state_falls_back_to_idle() {
        let catalog = AnimationCatalog::with_defaults();
        // Wolves never shoot; the Idle clip stands in.
        let clip = catalog
            .resolve(EntityKind::Wolf, EntityState::Shoot, Facing::Down)
            .expect("idle fallback");
        assert_eq!(clip.key, "wolf_idle_down");
    }

    #[test]
    fn test_empty_catalog_resolves_none() {
        let catalog = AnimationCatalog::new();
        assert!(catalog
            .resolve(EntityKind::Wolf, EntityState::Walk, Facing::Down)
            .is_none());
    }
}
