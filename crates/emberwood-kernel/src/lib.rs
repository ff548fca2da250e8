//! # Emberwood Kernel
//!
//! Engine facilities with no game semantics:
//! - Rebuildable point quadtree for spatial queries
//! - Frame-bound timer scheduler with cancel-by-owner
//! - Monotonic frame clock with clamped delta
//!
//! Gameplay crates own the policy; this crate only provides the mechanisms.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod quadtree;
pub mod scheduler;

pub use clock::FrameClock;
pub use quadtree::Quadtree;
pub use scheduler::{Fired, Scheduler, TimerHandle};
