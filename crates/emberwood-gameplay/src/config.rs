//! Simulation configuration.
//!
//! All tunables the simulation reads at runtime, loadable from JSON. Every
//! field has a default so partial configs work.

use serde::{Deserialize, Serialize};

/// Policy for clearing the startled flag set when an entity takes damage.
///
/// The flag forces pursuit regardless of distance; whether it ever clears is
/// a design choice, so it is configuration rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartlePolicy {
    /// Once startled, always startled (permanent aggro).
    Permanent,
    /// Startle wears off after the given number of milliseconds without a
    /// fresh hit.
    Timed {
        /// De-aggro delay in milliseconds
        ms: u64,
    },
}

impl Default for StartlePolicy {
    fn default() -> Self {
        Self::Permanent
    }
}

/// Simulation configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === World ===
    /// World width in world units
    pub world_width: f32,
    /// World height in world units
    pub world_height: f32,

    // === Activation ===
    /// Radius around the player within which entities are simulated
    pub activation_radius: f32,
    /// Margin added to the viewport when deciding which entities to track
    pub activation_margin: f32,
    /// Multiplier applied to the activation radius during initial
    /// registration, to avoid activation thrash at world load
    pub registration_radius_scale: f32,
    /// Spatial index capacity per node before subdivision
    pub quadtree_max_objects: usize,
    /// Spatial index maximum subdivision depth
    pub quadtree_max_levels: usize,

    // === Chase ===
    /// Distance at which hostiles start chasing the player
    pub chase_distance: f32,
    /// Period of the recurring chase redirection timer, in milliseconds
    pub chase_period_ms: u64,
    /// Delay before the first chase redirection, in milliseconds
    pub chase_start_delay_ms: u64,
    /// How the startled flag clears
    pub startle_policy: StartlePolicy,

    // === Combat ===
    /// Minimum delay between accepted melee attacks, in milliseconds
    pub melee_cooldown_ms: u64,
    /// Melee attack reach in world units
    pub melee_range: f32,
    /// Minimum delay between accepted ranged attacks, in milliseconds
    pub ranged_cooldown_ms: u64,
    /// Distance at which ranged attackers open fire
    pub ranged_attack_range: f32,
    /// Projectile speed in world units per second
    pub projectile_speed: f32,

    // === Feedback ===
    /// Duration of the red damage tint, in milliseconds
    pub hit_tint_ms: u64,
    /// Duration of the attack highlight tint, in milliseconds
    pub attack_tint_ms: u64,
    /// Lifetime of the detached death effect, in milliseconds
    pub death_effect_ms: u64,

    // === Interaction ===
    /// Distance at which the player can interact with friendly entities
    pub interact_range: f32,
    /// Minimum delay between accepted interactions, in milliseconds, so a
    /// held interact input does not burn through dialog one line per frame
    pub interact_cooldown_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 2048.0,
            world_height: 2048.0,
            activation_radius: 400.0,
            activation_margin: 100.0,
            registration_radius_scale: 1.5,
            quadtree_max_objects: 8,
            quadtree_max_levels: 5,
            chase_distance: 200.0,
            chase_period_ms: 400,
            chase_start_delay_ms: 150,
            startle_policy: StartlePolicy::default(),
            melee_cooldown_ms: 1000,
            melee_range: 48.0,
            ranged_cooldown_ms: 1500,
            ranged_attack_range: 300.0,
            projectile_speed: 320.0,
            hit_tint_ms: 300,
            attack_tint_ms: 120,
            death_effect_ms: 1000,
            interact_range: 64.0,
            interact_cooldown_ms: 400,
        }
    }
}

impl SimConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = SimConfig::default();
        assert!(config.activation_radius > 0.0);
        assert!(config.registration_radius_scale >= 1.0);
        assert_eq!(config.startle_policy, StartlePolicy::Permanent);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{"activation_radius": 250.0}"#)
            .expect("valid partial config");
        assert!((config.activation_radius - 250.0).abs() < f32::EPSILON);
        assert_eq!(config.melee_cooldown_ms, SimConfig::default().melee_cooldown_ms);
    }

    #[test]
    fn test_startle_policy_round_trip() {
        let config = SimConfig {
            startle_policy: StartlePolicy::Timed { ms: 5000 },
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back = SimConfig::from_json(&json).expect("deserialize");
        assert_eq!(back.startle_policy, StartlePolicy::Timed { ms: 5000 });
    }
}
