//! Rectangle-collection quadtree answering "which rectangles contain this point"
//!
//! A rectangle is pushed down the tree while it fits entirely inside one quadrant of the
//! current cell. A rectangle that straddles the cell's center lines stays at that cell, in
//! one of two local collections: those crossing the vertical center line, and the rest
//! (crossing the horizontal one). A lookup therefore only visits the cells along a single
//! root-to-leaf path.

use crate::{Config, Point, Pole, QuadtreeError, Rectangle, Result, utils};
use rayon::prelude::*;
use std::sync::Arc;

/// A single cell of the rectangle-collection quadtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RectNode {
    /// Cell covered by this node
    pub(crate) bounds: Rectangle,
    /// Rectangles crossing the vertical center line of `bounds`
    pub(crate) vertical: Vec<Rectangle>,
    /// Remaining local rectangles, crossing the horizontal center line (or stored in a
    /// unit cell that cannot be split)
    pub(crate) horizontal: Vec<Rectangle>,
    /// Child cells (NW, NE, SW, SE), created on demand
    pub(crate) children: [Option<Arc<RectNode>>; 4],
}

impl RectNode {
    fn empty(bounds: Rectangle) -> Self {
        Self {
            bounds,
            vertical: Vec::new(),
            horizontal: Vec::new(),
            children: [None, None, None, None],
        }
    }

    #[inline]
    pub(crate) fn child(&self, pole: Pole) -> Option<&RectNode> {
        self.children[pole.index()].as_deref()
    }

    /// Local rectangles, vertical collection first
    pub(crate) fn local(&self) -> impl Iterator<Item = &Rectangle> {
        self.vertical.iter().chain(self.horizontal.iter())
    }

    /// Quadrant that fully contains `rect`, if any
    fn route(&self, rect: &Rectangle) -> Option<Pole> {
        if self.bounds.width() <= 1 {
            return None;
        }
        Pole::ALL
            .into_iter()
            .find(|&pole| self.bounds.quadrant(pole).contains_rect(rect))
    }

    fn retain(&mut self, rect: Rectangle) {
        let center = self.bounds.center();
        if rect.left < center.x && rect.right > center.x {
            self.vertical.push(rect);
        } else {
            self.horizontal.push(rect);
        }
    }

    fn collect(&self, out: &mut Vec<Rectangle>) {
        out.extend(self.local().copied());
        for child in self.children.iter().flatten() {
            child.collect(out);
        }
    }
}

/// Persistent rectangle-collection quadtree over a power-of-two surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectQuadtree {
    /// Root cell, `None` until the first insertion
    root: Option<Arc<RectNode>>,
    /// Rectangle covered by the root
    surface: Rectangle,
    /// Number of stored rectangles
    len: usize,
}

impl Default for RectQuadtree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RectQuadtree {
    /// Create an empty tree over the base surface
    pub fn new() -> Self {
        Self {
            root: None,
            surface: utils::BASE_SURFACE,
            len: 0,
        }
    }

    /// Create an empty tree over the configured surface
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: None,
            surface: config.surface,
            len: 0,
        })
    }

    /// Build a tree over the base surface by inserting `rects` in order
    pub fn from_rects<I>(rects: I) -> Result<Self>
    where
        I: IntoIterator<Item = Rectangle>,
    {
        Self::new().insert_all(rects)
    }

    #[inline]
    pub fn surface(&self) -> Rectangle {
        self.surface
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn root_node(&self) -> Option<&RectNode> {
        self.root.as_deref()
    }

    /// Insert a rectangle, returning the new tree
    ///
    /// Fails with `InvalidRectangle` for an empty or inverted rectangle and with
    /// `RectangleOutOfRange` if it does not fit inside the surface.
    pub fn insert(&self, rect: Rectangle) -> Result<Self> {
        if !rect.is_valid() {
            tracing::debug!("Rejecting degenerate rectangle {rect}");
            return Err(QuadtreeError::InvalidRectangle(rect));
        }
        if !self.surface.contains_rect(&rect) {
            tracing::debug!("Rejecting rectangle {rect} outside {}", self.surface);
            return Err(QuadtreeError::RectangleOutOfRange {
                rect,
                surface: self.surface,
            });
        }

        Ok(Self {
            root: Some(insert_rect(self.root.as_ref(), self.surface, rect)),
            surface: self.surface,
            len: self.len + 1,
        })
    }

    /// Insert every rectangle in order, returning the final tree
    pub fn insert_all<I>(&self, rects: I) -> Result<Self>
    where
        I: IntoIterator<Item = Rectangle>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("rect_collection::insert_all");

        rects
            .into_iter()
            .try_fold(self.clone(), |tree, rect| tree.insert(rect))
    }

    /// Every stored rectangle containing `point`, from the root cell downwards
    pub fn query(&self, point: Point) -> Vec<Rectangle> {
        let mut found = Vec::new();
        if !self.surface.contains(point) {
            return found;
        }

        let mut current = self.root.as_deref();
        while let Some(node) = current {
            found.extend(node.local().filter(|rect| rect.contains(point)).copied());
            current = node.child(Pole::of(point, node.bounds));
        }
        found
    }

    /// Results of [`RectQuadtree::query`] for each point, looked up in parallel
    pub fn query_many(&self, points: &[Point]) -> Vec<Vec<Rectangle>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("rect_collection::query_many");

        points.par_iter().map(|&point| self.query(point)).collect()
    }

    /// All stored rectangles, cell by cell in depth-first order
    pub fn rects(&self) -> Vec<Rectangle> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.collect(&mut out);
        }
        out
    }
}

/// Rebuild the path down to the cell that keeps `rect`
fn insert_rect(node: Option<&Arc<RectNode>>, bounds: Rectangle, rect: Rectangle) -> Arc<RectNode> {
    let mut next = node.map_or_else(|| RectNode::empty(bounds), |node| RectNode::clone(node));

    match next.route(&rect) {
        Some(pole) => {
            tracing::trace!("Routing {rect} {pole} of {bounds}");
            let child = insert_rect(
                next.children[pole.index()].as_ref(),
                bounds.quadrant(pole),
                rect,
            );
            next.children[pole.index()] = Some(child);
        }
        None => {
            tracing::trace!("Keeping {rect} at {bounds}");
            next.retain(rect);
        }
    }

    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic rectangles spread over the base surface
    fn scattered_rects(count: usize) -> Vec<Rectangle> {
        let mut state: u32 = 0x2545_f491;
        let mut next = move |bound: i32| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 8) % bound as u32) as i32
        };

        (0..count)
            .map(|_| {
                let left = next(500);
                let bottom = next(500);
                let width = 1 + next(512 - left);
                let height = 1 + next(512 - bottom);
                Rectangle::new(
                    (bottom + height).min(512),
                    (left + width).min(512),
                    bottom,
                    left,
                )
            })
            .collect()
    }

    #[test]
    fn test_scenario_query() {
        let rect = Rectangle::new(460, 310, 310, 230);
        let tree = RectQuadtree::new().insert(rect).unwrap();

        assert_eq!(tree.query(Point::new(250, 400)), vec![rect]);
        assert!(tree.query(Point::new(10, 10)).is_empty());
        assert!(tree.query(Point::new(400, 400)).is_empty());
    }

    #[test]
    fn test_straddling_rect_stays_at_root() {
        // Crosses x = 256, the center line of the base surface
        let rect = Rectangle::new(460, 310, 310, 230);
        let tree = RectQuadtree::new().insert(rect).unwrap();

        let root = tree.root_node().unwrap();
        assert_eq!(root.vertical, vec![rect]);
        assert!(root.horizontal.is_empty());
        assert!(root.children.iter().all(Option::is_none));

        // Crosses y = 256 only
        let rect = Rectangle::new(300, 100, 200, 50);
        let tree = tree.insert(rect).unwrap();
        assert_eq!(tree.root_node().unwrap().horizontal, vec![rect]);
    }

    #[test]
    fn test_contained_rect_is_routed_down() {
        let rect = Rectangle::new(40, 40, 20, 20);
        let tree = RectQuadtree::new().insert(rect).unwrap();

        // [20, 40) fits the SW quadrants down to the 64-wide cell, then crosses its center 32
        let mut node = tree.root_node().unwrap();
        let mut depth = 0;
        while node.local().next().is_none() {
            node = node.child(Pole::SW).unwrap();
            depth += 1;
        }
        assert_eq!(depth, 3);
        assert_eq!(node.bounds, Rectangle::square(64));
        assert_eq!(tree.query(Point::new(25, 25)), vec![rect]);
    }

    #[test]
    fn test_unit_rect_in_unit_cell() {
        let rect = Rectangle::new(8, 8, 7, 7);
        let tree = RectQuadtree::new().insert(rect).unwrap();

        assert_eq!(tree.query(Point::new(7, 7)), vec![rect]);
        assert!(tree.query(Point::new(8, 8)).is_empty());
        assert!(tree.query(Point::new(6, 7)).is_empty());
    }

    #[test]
    fn test_query_collects_every_depth() {
        let big = Rectangle::square(512);
        let medium = Rectangle::new(256, 256, 0, 0);
        let small = Rectangle::new(20, 20, 10, 10);
        let elsewhere = Rectangle::new(500, 500, 400, 400);
        let tree = RectQuadtree::from_rects([small, big, elsewhere, medium]).unwrap();

        let mut found = tree.query(Point::new(15, 15));
        found.sort_by_key(|r| r.top);
        assert_eq!(found, vec![small, medium, big]);
        assert_eq!(tree.query(Point::new(450, 450)).len(), 2);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_query_matches_linear_scan() {
        let rects = scattered_rects(200);
        let tree = RectQuadtree::from_rects(rects.clone()).unwrap();
        assert_eq!(tree.len(), rects.len());
        assert_eq!(tree.rects().len(), rects.len());

        for x in (0..512).step_by(17) {
            for y in (0..512).step_by(23) {
                let p = Point::new(x, y);
                let mut expected: Vec<Rectangle> =
                    rects.iter().filter(|r| r.contains(p)).copied().collect();
                let mut found = tree.query(p);
                expected.sort_by_key(|r| (r.top, r.right, r.bottom, r.left));
                found.sort_by_key(|r| (r.top, r.right, r.bottom, r.left));
                assert_eq!(found, expected, "mismatch at {p}");
            }
        }
    }

    #[test]
    fn test_query_many_matches_query() {
        let tree = RectQuadtree::from_rects(scattered_rects(50)).unwrap();
        let points: Vec<Point> = (0..40).map(|i| Point::new(i * 12, 511 - i * 12)).collect();

        let batch = tree.query_many(&points);
        for (point, found) in points.iter().zip(batch) {
            assert_eq!(found, tree.query(*point));
        }
    }

    #[test]
    fn test_empty_tree_and_outside_points() {
        let tree = RectQuadtree::new();
        assert!(tree.is_empty());
        assert!(tree.query(Point::new(3, 3)).is_empty());

        let tree = tree.insert(Rectangle::square(512)).unwrap();
        assert!(tree.query(Point::new(-1, 3)).is_empty());
        assert!(tree.query(Point::new(512, 3)).is_empty());
    }

    #[test]
    fn test_insert_errors() {
        let tree = RectQuadtree::new();
        let inverted = Rectangle::new(10, 10, 20, 0);
        assert_eq!(
            tree.insert(inverted),
            Err(QuadtreeError::InvalidRectangle(inverted))
        );

        let outside = Rectangle::new(600, 100, 500, 0);
        assert_eq!(
            tree.insert(outside),
            Err(QuadtreeError::RectangleOutOfRange {
                rect: outside,
                surface: utils::BASE_SURFACE,
            })
        );

        assert!(
            RectQuadtree::with_config(Config {
                surface: Rectangle::square(100),
                ..Config::default()
            })
            .is_err()
        );
    }

    #[test]
    fn test_insert_keeps_previous_root() {
        let a = Rectangle::new(40, 40, 20, 20);
        let b = Rectangle::new(500, 500, 400, 400);
        let first = RectQuadtree::new().insert(a).unwrap();
        let second = first.insert(b).unwrap();

        assert_eq!(first.query(Point::new(450, 450)), vec![]);
        assert_eq!(second.query(Point::new(450, 450)), vec![b]);

        // The SW subtree holding `a` is shared
        let old = first.root.as_ref().unwrap().children[Pole::SW.index()].as_ref();
        let new = second.root.as_ref().unwrap().children[Pole::SW.index()].as_ref();
        assert!(Arc::ptr_eq(old.unwrap(), new.unwrap()));
    }
}
