//! # Emberwood Sim
//!
//! Headless runner for the Emberwood simulation core. Spawns a small demo
//! world, drives the player on a fixed script, and logs the gameplay events
//! each frame. Useful for smoke-testing the simulation without a render
//! host attached.
//!
//! Usage: `emberwood [config.json]`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emberwood_common::{Rect, Vec2};
use emberwood_gameplay::config::SimConfig;
use emberwood_gameplay::intent::PlayerIntent;
use emberwood_gameplay::simulation::Simulation;

/// Frames to simulate: ten seconds at sixty frames per second.
const FRAMES: usize = 600;

const DT: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("emberwood=info".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    let viewport = Rect::new(0.0, 0.0, config.world_width, config.world_height);

    let mut sim = Simulation::new(config);
    let player_pos = sim.arena().get(sim.player_id())?.position();
    info!(x = player_pos.x, y = player_pos.y, "player spawned");

    for (name, offset) in [
        ("villager", Vec2::new(-80.0, 0.0)),
        ("wolf", Vec2::new(250.0, 40.0)),
        ("wolf", Vec2::new(-300.0, -120.0)),
        ("skeleton", Vec2::new(0.0, 280.0)),
    ] {
        sim.spawn_npc(name, player_pos + offset);
    }
    sim.prime(viewport);

    for frame in 0..FRAMES {
        // Walk east for the first two seconds, then stand and fight.
        let intent = if frame < 120 {
            PlayerIntent::moving(Vec2::new(1.0, 0.0))
        } else {
            PlayerIntent {
                attack: true,
                ..PlayerIntent::default()
            }
        };
        sim.update(viewport, &intent, DT);

        for event in sim.events().drain() {
            info!(frame, ?event, "gameplay event");
        }
        // No render host attached; commands are dropped.
        let _ = sim.drain_render();
    }

    info!(
        entities = sim.arena().len(),
        active = sim.active_ids().len(),
        now_ms = sim.now_ms(),
        "run complete"
    );
    Ok(())
}
