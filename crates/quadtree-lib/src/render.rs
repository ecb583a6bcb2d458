//! Draw-command traversal for an external presentation layer
//!
//! The crate never draws anything itself. A renderer asks a tree for its draw commands
//! under a [`Viewport`] (scale factor and origin offset) and paints them in order; commands
//! are produced depth-first, a node before its `NW, NE, SW, SE` children.

use crate::rect_collection::RectNode;
use crate::{Color, Point, PrNode, PrQuadtree, RectQuadtree, Rectangle, RegionQuadtree};
use geo::{Coord, Rect};

/// Mapping from tree coordinates to drawing coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Drawing units per tree unit
    pub scale: f64,
    /// Drawing position of the tree origin
    pub origin: Coord<f64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin: Coord { x: 0.0, y: 0.0 },
        }
    }
}

impl Viewport {
    pub fn new(scale: f64, origin: Coord<f64>) -> Self {
        Self { scale, origin }
    }

    #[inline]
    pub fn project_point(&self, point: Point) -> geo::Point<f64> {
        geo::Point::new(
            self.origin.x + point.x as f64 * self.scale,
            self.origin.y + point.y as f64 * self.scale,
        )
    }

    #[inline]
    pub fn project_rect(&self, rect: Rectangle) -> Rect<f64> {
        let min = self.project_point(Point::new(rect.left, rect.bottom));
        let max = self.project_point(Point::new(rect.right, rect.top));
        Rect::new(min.0, max.0)
    }
}

/// What to paint inside a command's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    /// Region leaf filled with a color
    Fill(Color),
    /// Point-region node outline with its stored point
    Point(geo::Point<f64>),
    /// Rectangle-collection cell outline
    Cell,
    /// Rectangle stored in a rectangle-collection cell
    Stored,
}

/// A single item to paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub bounds: Rect<f64>,
    pub mark: Mark,
}

/// Anything that can be turned into draw commands
pub trait Drawable {
    /// Append this item's commands to `out`, depth-first
    fn draw(&self, viewport: &Viewport, out: &mut Vec<DrawCommand>);

    fn draw_commands(&self, viewport: &Viewport) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        self.draw(viewport, &mut out);
        out
    }
}

impl Drawable for PrQuadtree {
    fn draw(&self, viewport: &Viewport, out: &mut Vec<DrawCommand>) {
        if let Some(root) = self.root() {
            draw_point_node(root, viewport, out);
        }
    }
}

fn draw_point_node(node: &PrNode, viewport: &Viewport, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand {
        bounds: viewport.project_rect(node.bounds()),
        mark: Mark::Point(viewport.project_point(node.point())),
    });
    for child in node.children().iter().flatten() {
        draw_point_node(child, viewport, out);
    }
}

impl Drawable for RectQuadtree {
    fn draw(&self, viewport: &Viewport, out: &mut Vec<DrawCommand>) {
        if let Some(root) = self.root_node() {
            draw_rect_node(root, viewport, out);
        }
    }
}

fn draw_rect_node(node: &RectNode, viewport: &Viewport, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand {
        bounds: viewport.project_rect(node.bounds),
        mark: Mark::Cell,
    });
    out.extend(node.local().map(|rect| DrawCommand {
        bounds: viewport.project_rect(*rect),
        mark: Mark::Stored,
    }));
    for child in node.children.iter().flatten() {
        draw_rect_node(child, viewport, out);
    }
}

/// A region tree laid over a surface, ready to be drawn
#[derive(Debug, Clone, Copy)]
pub struct RegionLayout<'a> {
    tree: &'a RegionQuadtree,
    surface: Rectangle,
}

impl RegionQuadtree {
    /// Lay this tree over `surface` for drawing
    pub fn on_surface(&self, surface: Rectangle) -> RegionLayout<'_> {
        RegionLayout {
            tree: self,
            surface,
        }
    }
}

impl Drawable for RegionLayout<'_> {
    fn draw(&self, viewport: &Viewport, out: &mut Vec<DrawCommand>) {
        draw_region(self.tree, self.surface, viewport, out);
    }
}

fn draw_region(
    tree: &RegionQuadtree,
    rect: Rectangle,
    viewport: &Viewport,
    out: &mut Vec<DrawCommand>,
) {
    match tree {
        RegionQuadtree::Leaf(color) => out.push(DrawCommand {
            bounds: viewport.project_rect(rect),
            mark: Mark::Fill(*color),
        }),
        RegionQuadtree::Internal(children) => {
            for (child, quadrant) in children.iter().zip(rect.quadrants()) {
                draw_region(child, quadrant, viewport, out);
            }
        }
    }
}
