//! Geometry primitives shared by every quadtree variant
//!
//! All coordinates are integers. Rectangles are half-open on their top and right edges so
//! that recursive quartering partitions a surface with no gaps or overlaps.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable integer point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for geo::Point<i32> {
    #[inline]
    fn from(p: Point) -> Self {
        geo::Point::new(p.x, p.y)
    }
}

/// Axis-aligned integer rectangle
///
/// A rectangle is valid when `top > bottom` and `right > left`. Construction does not
/// check this; the public insertion entry points do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rectangle {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Rectangle {
    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Square of side `size` with its bottom-left corner at the origin
    #[inline]
    pub const fn square(size: i32) -> Self {
        Self::new(size, size, 0, 0)
    }

    /// Horizontal extent, widened so that any pair of `i32` edges fits
    #[inline]
    pub const fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    #[inline]
    pub const fn height(&self) -> i64 {
        self.top as i64 - self.bottom as i64
    }

    /// Whether `top > bottom` and `right > left`
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.top > self.bottom && self.right > self.left
    }

    /// Whether this is a square whose side is a power of two
    #[inline]
    pub fn is_power_of_two(&self) -> bool {
        let width = self.width();
        width == self.height() && width > 0 && (width as u64).is_power_of_two()
    }

    /// Center of the rectangle, rounded towards the bottom-left corner
    #[inline]
    pub const fn center(&self) -> Point {
        // Halfway between two i32 edges always fits back into i32
        Point::new(
            (self.left as i64 + self.width() / 2) as i32,
            (self.bottom as i64 + self.height() / 2) as i32,
        )
    }

    /// Half-open containment: `x ∈ [left, right)` and `y ∈ [bottom, top)`
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.bottom && point.y < self.top
    }

    /// Whether `other` lies entirely inside this rectangle (edges may touch)
    #[inline]
    pub const fn contains_rect(&self, other: &Rectangle) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.bottom >= self.bottom
            && other.top <= self.top
    }

    /// Half-sized sub-rectangle for the given quadrant
    ///
    /// Every quadrant shares the center of `self` as one of its corners.
    #[inline]
    pub const fn quadrant(&self, pole: Pole) -> Rectangle {
        let c = self.center();
        match pole {
            Pole::NW => Rectangle::new(self.top, c.x, c.y, self.left),
            Pole::NE => Rectangle::new(self.top, self.right, c.y, c.x),
            Pole::SW => Rectangle::new(c.y, c.x, self.bottom, self.left),
            Pole::SE => Rectangle::new(c.y, self.right, self.bottom, c.x),
        }
    }

    /// All four quadrants in `NW, NE, SW, SE` order
    #[inline]
    pub const fn quadrants(&self) -> [Rectangle; 4] {
        [
            self.quadrant(Pole::NW),
            self.quadrant(Pole::NE),
            self.quadrant(Pole::SW),
            self.quadrant(Pole::SE),
        ]
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[top={}, right={}, bottom={}, left={}]",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl From<Rectangle> for geo::Rect<i32> {
    #[inline]
    fn from(r: Rectangle) -> Self {
        geo::Rect::new(
            geo::Coord {
                x: r.left,
                y: r.bottom,
            },
            geo::Coord {
                x: r.right,
                y: r.top,
            },
        )
    }
}

/// One of the four quadrant directions relative to a rectangle's center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pole {
    NW,
    NE,
    SW,
    SE,
}

impl Pole {
    /// Child order used by every tree in this crate
    pub const ALL: [Pole; 4] = [Pole::NW, Pole::NE, Pole::SW, Pole::SE];

    /// Quadrant of `point` relative to the center of `rect`
    ///
    /// Points on the center lines belong to the north/east halves.
    #[inline]
    pub const fn of(point: Point, rect: Rectangle) -> Pole {
        let c = rect.center();
        let is_east = point.x >= c.x;
        let is_north = point.y >= c.y;

        match (is_east, is_north) {
            (false, true) => Pole::NW,
            (true, true) => Pole::NE,
            (false, false) => Pole::SW,
            (true, false) => Pole::SE,
        }
    }

    /// Position of this pole in `Pole::ALL`
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Pole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pole::NW => "NW",
            Pole::NE => "NE",
            Pole::SW => "SW",
            Pole::SE => "SE",
        };
        f.write_str(name)
    }
}
