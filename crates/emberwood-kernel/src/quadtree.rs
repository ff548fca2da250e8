//! Point quadtree over entity positions.
//!
//! The tree is a pure data structure: it stores `(EntityId, Vec2)` pairs and
//! knows nothing about entities beyond their ids. It is designed to be
//! cleared and rebuilt from scratch every frame by its single owner, which
//! keeps insertion trivial at the entity counts this game targets (tens to
//! low hundreds). An incremental structure would scale further but is not
//! needed here.

use emberwood_common::{EntityId, Rect, Vec2};
use tracing::trace;

/// Default maximum entries per node before it subdivides.
pub const DEFAULT_MAX_OBJECTS: usize = 8;

/// Default maximum subdivision depth.
pub const DEFAULT_MAX_LEVELS: usize = 5;

/// A node region: either a leaf holding points or four child quadrants.
#[derive(Debug)]
struct Node {
    bounds: Rect,
    level: usize,
    points: Vec<(EntityId, Vec2)>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn new(bounds: Rect, level: usize) -> Self {
        Self {
            bounds,
            level,
            points: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, id: EntityId, pos: Vec2, max_objects: usize, max_levels: usize) {
        if let Some(children) = self.children.as_mut() {
            let idx = self.bounds.quadrant_index(pos);
            children[idx].insert(id, pos, max_objects, max_levels);
            return;
        }

        self.points.push((id, pos));

        if self.points.len() > max_objects && self.level < max_levels {
            self.split(max_objects, max_levels);
        }
    }

    fn split(&mut self, max_objects: usize, max_levels: usize) {
        let quads = self.bounds.quadrants();
        let level = self.level + 1;
        let mut children = Box::new([
            Node::new(quads[0], level),
            Node::new(quads[1], level),
            Node::new(quads[2], level),
            Node::new(quads[3], level),
        ]);

        for (id, pos) in self.points.drain(..) {
            let idx = self.bounds.quadrant_index(pos);
            children[idx].insert(id, pos, max_objects, max_levels);
        }

        self.children = Some(children);
    }

    fn query(&self, region: &Rect, out: &mut Vec<EntityId>) {
        if !self.bounds.overlaps(region) {
            return;
        }

        for (id, pos) in &self.points {
            if region.contains(*pos) {
                out.push(*id);
            }
        }

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(region, out);
            }
        }
    }

    fn len(&self) -> usize {
        let child_count = self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Node::len).sum());
        self.points.len() + child_count
    }
}

/// Rebuildable 2D spatial index over entity positions.
///
/// Each inserted point lives in exactly one node (boundary points resolve to
/// a single quadrant), so queries never return the same entity twice.
#[derive(Debug)]
pub struct Quadtree {
    root: Node,
    max_objects: usize,
    max_levels: usize,
}

impl Quadtree {
    /// Creates an index covering the given root bounds with default limits.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_LEVELS)
    }

    /// Creates an index with explicit capacity and depth limits.
    #[must_use]
    pub fn with_limits(bounds: Rect, max_objects: usize, max_levels: usize) -> Self {
        Self {
            root: Node::new(bounds, 0),
            max_objects: max_objects.max(1),
            max_levels,
        }
    }

    /// Returns the root bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    /// Removes all entries, keeping the root bounds.
    pub fn clear(&mut self) {
        self.root = Node::new(self.root.bounds, 0);
    }

    /// Inserts an entity position.
    ///
    /// Positions outside the root bounds are silently dropped; the caller is
    /// expected to have filtered to the tracked region already.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        if !self.root.bounds.contains(pos) {
            trace!(?id, x = pos.x, y = pos.y, "quadtree insert outside root bounds, dropped");
            return;
        }
        self.root
            .insert(id, pos, self.max_objects, self.max_levels);
    }

    /// Returns every entity whose stored point lies within `region`.
    ///
    /// Node bounds prune the traversal; the point itself decides membership.
    #[must_use]
    pub fn query(&self, region: &Rect) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.root.query(region, &mut out);
        out
    }

    /// Queries into a caller-provided buffer (cleared first).
    pub fn query_into(&self, region: &Rect, out: &mut Vec<EntityId>) {
        out.clear();
        self.root.query(region, out);
    }

    /// Returns the number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns true if no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree() -> Quadtree {
        Quadtree::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn test_query_contains_inserted_point() {
        let mut qt = tree();
        let id = EntityId::new();
        qt.insert(id, Vec2::new(10.0, 10.0));

        let hits = qt.query(&Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(hits, vec![id]);
    }

    #[test]
    fn test_disjoint_query_misses_point() {
        let mut qt = tree();
        let id = EntityId::new();
        qt.insert(id, Vec2::new(10.0, 10.0));

        let hits = qt.query(&Rect::new(60.0, 60.0, 100.0, 100.0));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_out_of_bounds_insert_is_noop() {
        let mut qt = tree();
        qt.insert(EntityId::new(), Vec2::new(500.0, 500.0));
        qt.insert(EntityId::new(), Vec2::new(-1.0, 50.0));
        assert!(qt.is_empty());
    }

    #[test]
    fn test_subdivision_preserves_all_points() {
        let mut qt = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 2, 4);
        let ids: Vec<EntityId> = (0..20).map(|_| EntityId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            let x = (i as f32 * 4.7) % 100.0;
            let y = (i as f32 * 9.3) % 100.0;
            qt.insert(*id, Vec2::new(x, y));
        }
        assert_eq!(qt.len(), 20);

        let mut hits = qt.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        hits.sort_unstable();
        let mut expected = ids.clone();
        expected.sort_unstable();
        assert_eq!(hits, expected);
    }

    #[test]
    fn test_depth_limit_stops_subdivision() {
        // All points identical: without the depth cap this would recurse
        // forever trying to separate them.
        let mut qt = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 3);
        for _ in 0..10 {
            qt.insert(EntityId::new(), Vec2::new(25.0, 25.0));
        }
        assert_eq!(qt.len(), 10);
        assert_eq!(qt.query(&Rect::new(0.0, 0.0, 30.0, 30.0)).len(), 10);
    }

    #[test]
    fn test_clear_keeps_bounds() {
        let mut qt = tree();
        qt.insert(EntityId::new(), Vec2::new(10.0, 10.0));
        qt.clear();
        assert!(qt.is_empty());
        assert_eq!(qt.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
        // Still usable after clear
        let id = EntityId::new();
        qt.insert(id, Vec2::new(10.0, 10.0));
        assert_eq!(qt.query(&Rect::new(0.0, 0.0, 20.0, 20.0)), vec![id]);
    }

    #[test]
    fn test_boundary_point_returned_once() {
        // A point on the exact center line of a split node must land in one
        // quadrant only.
        let mut qt = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 4);
        let id = EntityId::new();
        qt.insert(id, Vec2::new(50.0, 50.0));
        qt.insert(EntityId::new(), Vec2::new(10.0, 10.0));
        qt.insert(EntityId::new(), Vec2::new(90.0, 90.0));

        let hits = qt.query(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(hits.iter().filter(|h| **h == id).count(), 1);
    }

    #[test]
    fn test_query_ending_on_split_line_finds_boundary_point() {
        // A point on the center line lives in the bottom-right child after a
        // split; a query whose max corner sits exactly on that line still has
        // to reach it.
        let mut qt = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 4);
        let id = EntityId::new();
        qt.insert(EntityId::new(), Vec2::new(60.0, 60.0));
        qt.insert(id, Vec2::new(50.0, 50.0));

        let hits = qt.query(&Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(hits, vec![id]);
    }

    proptest! {
        #[test]
        fn prop_containment_and_no_duplicates(
            points in prop::collection::vec((0f32..100.0, 0f32..100.0), 1..60),
            (qx, qy, qw, qh) in (0f32..100.0, 0f32..100.0, 1f32..100.0, 1f32..100.0),
        ) {
            let mut qt = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 3, 5);
            let entries: Vec<(EntityId, Vec2)> = points
                .iter()
                .map(|(x, y)| (EntityId::new(), Vec2::new(*x, *y)))
                .collect();
            for (id, pos) in &entries {
                qt.insert(*id, *pos);
            }

            let region = Rect::new(qx, qy, (qx + qw).min(100.0), (qy + qh).min(100.0));
            let mut hits = qt.query(&region);

            // No duplicates
            let total = hits.len();
            hits.sort_unstable();
            hits.dedup();
            prop_assert_eq!(hits.len(), total);

            // Exactly the contained points
            let mut expected: Vec<EntityId> = entries
                .iter()
                .filter(|(_, pos)| region.contains(*pos))
                .map(|(id, _)| *id)
                .collect();
            expected.sort_unstable();
            prop_assert_eq!(hits, expected);
        }
    }
}
