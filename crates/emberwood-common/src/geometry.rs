//! Geometry types: axis-aligned rectangles and 2D vectors.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Axis-aligned rectangle in world space.
///
/// Used for entity bounds, viewport rectangles, and spatial index regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl Rect {
    /// Creates a new rectangle from min/max corners.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a rectangle from a center point and half-extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Returns the center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Checks if this rectangle overlaps another (inclusive edges).
    ///
    /// Touching edges count as overlap, matching [`Rect::contains`]: a point
    /// sitting exactly on a shared edge is inside both rectangles.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Checks if a point lies within the rectangle (inclusive edges).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Expands the rectangle by a margin on all sides.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Splits the rectangle into four equal quadrants.
    ///
    /// Order: top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub fn quadrants(&self) -> [Rect; 4] {
        let c = self.center();
        [
            Rect::new(self.min_x, self.min_y, c.x, c.y),
            Rect::new(c.x, self.min_y, self.max_x, c.y),
            Rect::new(self.min_x, c.y, c.x, self.max_y),
            Rect::new(c.x, c.y, self.max_x, self.max_y),
        ]
    }

    /// Returns the index of the quadrant a point falls into.
    ///
    /// Points on the center lines resolve to the right/bottom quadrant, so
    /// every point maps to exactly one quadrant.
    #[must_use]
    pub fn quadrant_index(&self, point: Vec2) -> usize {
        let c = self.center();
        let right = usize::from(point.x >= c.x);
        let bottom = usize::from(point.y >= c.y);
        bottom * 2 + right
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(10.0, 20.0), 5.0, 2.5);
        assert_eq!(r, Rect::new(5.0, 17.5, 15.0, 22.5));
        assert_eq!(r.center(), Vec2::new(10.0, 20.0));
        assert!((r.width() - 10.0).abs() < f32::EPSILON);
        assert!((r.height() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(!a.overlaps(&Rect::new(20.0, 20.0, 30.0, 30.0)));
        // Touching edges overlap, consistent with inclusive containment
        assert!(a.overlaps(&Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.1, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_contains_inclusive_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(!r.contains(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn test_expanded() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).expanded(5.0);
        assert_eq!(r, Rect::new(-5.0, -5.0, 15.0, 15.0));
    }

    #[test]
    fn test_quadrants_partition() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        let quads = r.quadrants();
        assert_eq!(quads[0], Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(quads[3], Rect::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn test_quadrant_index_is_deterministic_on_center() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        // Center point resolves to bottom-right, not multiple quadrants
        assert_eq!(r.quadrant_index(Vec2::new(50.0, 50.0)), 3);
        assert_eq!(r.quadrant_index(Vec2::new(10.0, 10.0)), 0);
        assert_eq!(r.quadrant_index(Vec2::new(60.0, 10.0)), 1);
        assert_eq!(r.quadrant_index(Vec2::new(10.0, 60.0)), 2);
    }

    proptest! {
        #[test]
        fn prop_quadrant_index_lands_in_its_quadrant(
            x in 0.0f32..=100.0,
            y in 0.0f32..=100.0,
        ) {
            let r = Rect::new(0.0, 0.0, 100.0, 100.0);
            let point = Vec2::new(x, y);
            let quads = r.quadrants();
            let idx = r.quadrant_index(point);
            prop_assert!(idx < 4);
            prop_assert!(quads[idx].contains(point));
            prop_assert!(r.overlaps(&quads[idx]));
        }
    }
}
