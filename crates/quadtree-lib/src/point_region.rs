//! Point-region quadtree for exact point storage and membership
//!
//! Every node stores one point together with the power-of-two rectangle it covers. A new
//! point is routed by its pole against each visited node's own rectangle until an empty
//! child is found, so the shape of the tree is fixed by insertion order alone. Inserting
//! rebuilds only the visited path; all other subtrees are shared with the previous root.

use crate::{Config, Point, Pole, QuadtreeError, Rectangle, Result, utils};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Poles from the root to a node, in visiting order
pub type Path = SmallVec<[Pole; 16]>;

/// A single node of a point-region quadtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrNode {
    /// Stored point
    point: Point,
    /// Rectangle covered by this node
    bounds: Rectangle,
    /// Child nodes (NW, NE, SW, SE)
    children: [Option<Arc<PrNode>>; 4],
}

impl PrNode {
    /// Build a node from raw parts
    ///
    /// No invariant is checked here; trees assembled by hand can be checked with
    /// [`PrQuadtree::is_consistent`].
    pub fn new(point: Point, bounds: Rectangle, children: [Option<Arc<PrNode>>; 4]) -> Self {
        Self {
            point,
            bounds,
            children,
        }
    }

    /// Build a node without children
    pub fn leaf(point: Point, bounds: Rectangle) -> Self {
        Self::new(point, bounds, [None, None, None, None])
    }

    #[inline]
    pub fn point(&self) -> Point {
        self.point
    }

    #[inline]
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    #[inline]
    pub fn child(&self, pole: Pole) -> Option<&PrNode> {
        self.children[pole.index()].as_deref()
    }

    /// Child nodes in `NW, NE, SW, SE` order
    #[inline]
    pub fn children(&self) -> &[Option<Arc<PrNode>>; 4] {
        &self.children
    }

    /// Copy of this node with one child replaced; the other children are shared
    fn with_child(&self, pole: Pole, child: Arc<PrNode>) -> Self {
        let mut children = self.children.clone();
        children[pole.index()] = Some(child);
        Self::new(self.point, self.bounds, children)
    }

    /// First node, in depth-first order, whose rectangle is not power-of-two or does not
    /// contain its point
    fn first_violation(&self) -> Option<&PrNode> {
        if !self.bounds.is_power_of_two() || !self.bounds.contains(self.point) {
            return Some(self);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.first_violation())
    }

    fn len(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.len())
            .sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    fn collect_points(&self, out: &mut Vec<Point>) {
        out.push(self.point);
        for child in self.children.iter().flatten() {
            child.collect_points(out);
        }
    }
}

/// Persistent point-region quadtree over a power-of-two surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrQuadtree {
    /// Root node, `None` for the empty tree
    root: Option<Arc<PrNode>>,
    /// Rectangle covered by the root
    surface: Rectangle,
}

impl Default for PrQuadtree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PrQuadtree {
    /// Create an empty tree over the base surface
    pub fn new() -> Self {
        Self {
            root: None,
            surface: utils::BASE_SURFACE,
        }
    }

    /// Create an empty tree over the given surface
    pub fn with_surface(surface: Rectangle) -> Result<Self> {
        Self::with_config(Config {
            surface,
            ..Config::default()
        })
    }

    /// Create an empty tree over the configured surface
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            "New point-region quadtree over {} ({:?} levels)",
            config.surface,
            utils::subdivision_levels(&config.surface)
        );
        Ok(Self {
            root: None,
            surface: config.surface,
        })
    }

    /// Wrap an existing root without checking it
    ///
    /// Operations on the resulting tree report [`QuadtreeError::InconsistentTree`] or
    /// [`QuadtreeError::InvalidSurface`] if the parts turn out to be malformed.
    pub fn from_root(root: Option<Arc<PrNode>>, surface: Rectangle) -> Self {
        Self { root, surface }
    }

    /// Build a tree over the base surface by inserting `points` in order
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        Self::new().insert_all(points)
    }

    #[inline]
    pub fn root(&self) -> Option<&PrNode> {
        self.root.as_deref()
    }

    #[inline]
    pub fn surface(&self) -> Rectangle {
        self.surface
    }

    /// Whether every node's rectangle is power-of-two and contains its point
    ///
    /// The empty tree is consistent.
    pub fn is_consistent(&self) -> bool {
        self.root
            .as_ref()
            .is_none_or(|root| root.first_violation().is_none())
    }

    /// Insert a point, returning the new tree
    ///
    /// Fails with `InvalidSurface` if the surface is not power-of-two, `PointOutOfRange` if
    /// the point lies outside it and `InconsistentTree` if this tree is malformed. Inserting
    /// a point that is already stored returns an equal tree.
    pub fn insert(&self, point: Point) -> Result<Self> {
        self.ensure_surface()?;
        self.ensure_in_range(point)?;
        self.ensure_consistent()?;
        Ok(self.insert_unchecked(point))
    }

    /// Insert every point in order, returning the final tree
    ///
    /// The tree is validated once up front; each intermediate tree is built by insertion
    /// and therefore consistent. On error no partial tree is returned.
    pub fn insert_all<I>(&self, points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("point_region::insert_all");

        self.ensure_surface()?;
        self.ensure_consistent()?;
        points.into_iter().try_fold(self.clone(), |tree, point| -> Result<Self> {
            tree.ensure_in_range(point)?;
            Ok(tree.insert_unchecked(point))
        })
    }

    fn insert_unchecked(&self, point: Point) -> Self {
        Self {
            root: Some(insert_node(self.root.as_ref(), point, self.surface)),
            surface: self.surface,
        }
    }

    /// Whether a node storing exactly `point` is reachable from the root
    ///
    /// Fails with `InconsistentTree` if the tree is malformed.
    pub fn contains(&self, point: Point) -> Result<bool> {
        self.ensure_consistent()?;
        Ok(self.find(point).is_some())
    }

    /// Membership of every point in `points`, looked up in parallel
    ///
    /// The tree is validated once for the whole batch.
    pub fn contains_many(&self, points: &[Point]) -> Result<Vec<bool>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("point_region::contains_many");

        self.ensure_consistent()?;
        Ok(points
            .par_iter()
            .map(|&point| self.find(point).is_some())
            .collect())
    }

    fn find(&self, point: Point) -> Option<&PrNode> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if node.point == point {
                return Some(node);
            }
            current = node.child(Pole::of(point, node.bounds));
        }
        None
    }

    /// Poles leading from the root to the node storing `point`
    ///
    /// Fails with `NoPathFound` if the point is not stored, including on an empty tree.
    pub fn path_to(&self, point: Point) -> Result<Path> {
        let mut path = Path::new();
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            if node.point == point {
                return Ok(path);
            }
            let pole = Pole::of(point, node.bounds);
            path.push(pole);
            current = node.child(pole);
        }

        tracing::debug!("No path to {point}");
        Err(QuadtreeError::NoPathFound(point))
    }

    /// Node reached by following `path` from the root
    pub fn node_at(&self, path: &[Pole]) -> Option<&PrNode> {
        path.iter()
            .try_fold(self.root.as_deref()?, |node, &pole| node.child(pole))
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Stored points in depth-first order (node before its `NW, NE, SW, SE` children)
    pub fn points(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(root) = &self.root {
            root.collect_points(&mut out);
        }
        out
    }

    fn ensure_surface(&self) -> Result<()> {
        if !self.surface.is_power_of_two() {
            tracing::debug!("Rejecting insertion over surface {}", self.surface);
            return Err(QuadtreeError::InvalidSurface(self.surface));
        }
        Ok(())
    }

    fn ensure_in_range(&self, point: Point) -> Result<()> {
        if !self.surface.contains(point) {
            tracing::debug!("Rejecting point {point} outside {}", self.surface);
            return Err(QuadtreeError::PointOutOfRange {
                point,
                surface: self.surface,
            });
        }
        Ok(())
    }

    fn ensure_consistent(&self) -> Result<()> {
        match self.root.as_ref().and_then(|root| root.first_violation()) {
            None => Ok(()),
            Some(node) => {
                tracing::debug!("Inconsistent node {} in {}", node.point, node.bounds);
                Err(QuadtreeError::InconsistentTree(format!(
                    "node {} does not fit its bounds {}",
                    node.point, node.bounds
                )))
            }
        }
    }
}

/// Rebuild the path towards the first empty child on `point`'s route
fn insert_node(node: Option<&Arc<PrNode>>, point: Point, rect: Rectangle) -> Arc<PrNode> {
    let Some(node) = node else {
        tracing::trace!("Storing {point} in new leaf {rect}");
        return Arc::new(PrNode::leaf(point, rect));
    };

    if node.point == point {
        return Arc::clone(node);
    }

    let pole = Pole::of(point, node.bounds);
    let existing = node.children[pole.index()].as_ref();
    let child = insert_node(existing, point, node.bounds.quadrant(pole));

    // Point was already stored below; keep this subtree as is
    if existing.is_some_and(|existing| Arc::ptr_eq(existing, &child)) {
        return Arc::clone(node);
    }
    Arc::new(node.with_child(pole, child))
}

impl fmt::Display for PrQuadtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            None => writeln!(f, "empty tree over {}", self.surface),
            Some(root) => write_node(f, root, 0),
        }
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &PrNode, indent: usize) -> fmt::Result {
    let pad = "  ".repeat(indent);
    writeln!(f, "{pad}point: {}", node.point)?;
    writeln!(f, "{pad}rect: {}", node.bounds)?;
    for pole in Pole::ALL {
        match node.child(pole) {
            None => writeln!(f, "{pad}{pole}: -")?,
            Some(child) => {
                writeln!(f, "{pad}{pole}:")?;
                write_node(f, child, indent + 1)?;
            }
        }
    }
    Ok(())
}
