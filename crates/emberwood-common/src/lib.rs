//! # Emberwood Common
//!
//! Foundational types shared by all Emberwood subsystems:
//! - ID types (`EntityId`, `TimerId`)
//! - Geometry (`Rect`, re-exported `Vec2`)
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
