//! Region quadtree: a compressed black/white bitmap with a boolean algebra
//!
//! A tree is either a colored leaf or an internal node with exactly four children in
//! `NW, NE, SW, SE` order. Trees carry no surface of their own; a surface is only needed to
//! map leaves to pixels. Binary operations assume both operands were built for the same
//! surface.

use crate::codec::{self, Bits};
use crate::{Point, Pole, Rectangle, Result, Semantics};
use bitvec::prelude::*;
use std::array;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Color of a region leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// Persistent region quadtree
///
/// Children are shared behind an `Arc`, so cloning a tree and combining it with others
/// never copies untouched subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionQuadtree {
    Leaf(Color),
    Internal(Arc<[RegionQuadtree; 4]>),
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RegionQuadtree {
    #[inline]
    pub fn leaf(color: Color) -> Self {
        Self::Leaf(color)
    }

    #[inline]
    pub fn black() -> Self {
        Self::Leaf(Color::Black)
    }

    #[inline]
    pub fn white() -> Self {
        Self::Leaf(Color::White)
    }

    /// Internal node with the given children; no canonicalization is applied
    ///
    /// Nesting is not limited here, but [`codec::decode`] only accepts trees up to
    /// [`MAX_DEPTH`](crate::utils::MAX_DEPTH) levels deep.
    pub fn internal(nw: Self, ne: Self, sw: Self, se: Self) -> Self {
        Self::Internal(Arc::new([nw, ne, sw, se]))
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Leaf color, `None` for an internal node
    #[inline]
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Leaf(color) => Some(*color),
            Self::Internal(_) => None,
        }
    }

    /// Children in `NW, NE, SW, SE` order, `None` for a leaf
    #[inline]
    pub fn children(&self) -> Option<&[RegionQuadtree; 4]> {
        match self {
            Self::Leaf(_) => None,
            Self::Internal(children) => Some(&**children),
        }
    }

    #[inline]
    pub fn child(&self, pole: Pole) -> Option<&RegionQuadtree> {
        self.children().map(|children| &children[pole.index()])
    }

    /// Number of internal levels above the deepest leaf (0 for a leaf)
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Internal(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Internal(children) => children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Color of the pixel at `point` when this tree is laid over `surface`
    ///
    /// Returns `None` if the point lies outside the surface.
    pub fn color_at(&self, surface: Rectangle, point: Point) -> Option<Color> {
        if !surface.contains(point) {
            return None;
        }

        let mut node = self;
        let mut rect = surface;
        loop {
            match node {
                Self::Leaf(color) => return Some(*color),
                Self::Internal(children) => {
                    let pole = Pole::of(point, rect);
                    node = &children[pole.index()];
                    rect = rect.quadrant(pole);
                }
            }
        }
    }

    /// Number of black pixels when this tree is laid over a power-of-two `surface`
    pub fn black_area(&self, surface: Rectangle) -> u64 {
        match self {
            Self::Leaf(Color::Black) => surface.width() as u64 * surface.height() as u64,
            Self::Leaf(Color::White) => 0,
            Self::Internal(children) => children
                .iter()
                .zip(surface.quadrants())
                .map(|(child, quadrant)| child.black_area(quadrant))
                .sum(),
        }
    }

    /// Flip every leaf's color; the structure is unchanged
    pub fn invert(&self) -> Self {
        match self {
            Self::Leaf(color) => Self::Leaf(color.inverted()),
            Self::Internal(children) => {
                Self::Internal(Arc::new(array::from_fn(|i| children[i].invert())))
            }
        }
    }

    /// Pixel-wise AND with the default semantics
    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_with(other, Semantics::default())
    }

    /// Pixel-wise AND
    ///
    /// Black against an internal node yields an internal node of the pairwise results.
    /// With [`Semantics::Reference`] its south-east child repeats the south-west result.
    /// Four equal children are never merged.
    pub fn intersection_with(&self, other: &Self, semantics: Semantics) -> Self {
        match (self, other) {
            (Self::Internal(a), Self::Internal(b)) => Self::Internal(Arc::new(array::from_fn(
                |i| a[i].intersection_with(&b[i], semantics),
            ))),
            (Self::Leaf(Color::Black), Self::Internal(children))
            | (Self::Internal(children), Self::Leaf(Color::Black)) => {
                let black = Self::black();
                let combine = |pole: Pole| children[pole.index()].intersection_with(&black, semantics);
                match semantics {
                    Semantics::Corrected => Self::Internal(Arc::new(Pole::ALL.map(combine))),
                    Semantics::Reference => {
                        let sw = combine(Pole::SW);
                        Self::internal(combine(Pole::NW), combine(Pole::NE), sw.clone(), sw)
                    }
                }
            }
            (Self::Leaf(Color::Black), Self::Leaf(Color::Black)) => Self::black(),
            _ => Self::white(),
        }
    }

    /// Pixel-wise OR
    ///
    /// After combining two internal nodes, four Black leaf children collapse into a single
    /// Black leaf. This is the only canonicalization the algebra performs.
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Internal(a), Self::Internal(b)) => {
                let children: [Self; 4] = array::from_fn(|i| a[i].union(&b[i]));
                if children
                    .iter()
                    .all(|child| *child == Self::Leaf(Color::Black))
                {
                    Self::black()
                } else {
                    Self::Internal(Arc::new(children))
                }
            }
            (Self::Leaf(Color::White), Self::Internal(children))
            | (Self::Internal(children), Self::Leaf(Color::White)) => {
                let white = Self::white();
                Self::Internal(Arc::new(array::from_fn(|i| children[i].union(&white))))
            }
            (Self::Leaf(Color::White), Self::Leaf(Color::White)) => Self::white(),
            _ => Self::black(),
        }
    }

    /// Mirror across the vertical center line
    pub fn vertical_symmetry(&self) -> Self {
        match self {
            Self::Leaf(_) => self.clone(),
            Self::Internal(c) => Self::internal(
                c[1].vertical_symmetry(),
                c[0].vertical_symmetry(),
                c[3].vertical_symmetry(),
                c[2].vertical_symmetry(),
            ),
        }
    }

    /// Mirror across the horizontal center line with the default semantics
    pub fn horizontal_symmetry(&self) -> Self {
        self.horizontal_symmetry_with(Semantics::default())
    }

    /// Mirror across the horizontal center line
    ///
    /// With [`Semantics::Reference`] the relocated children are mirrored vertically, which
    /// only matches a true top-to-bottom mirror for trees of depth one.
    pub fn horizontal_symmetry_with(&self, semantics: Semantics) -> Self {
        match self {
            Self::Leaf(_) => self.clone(),
            Self::Internal(c) => {
                let mirror = |child: &Self| match semantics {
                    Semantics::Corrected => child.horizontal_symmetry_with(semantics),
                    Semantics::Reference => child.vertical_symmetry(),
                };
                Self::internal(mirror(&c[2]), mirror(&c[3]), mirror(&c[0]), mirror(&c[1]))
            }
        }
    }

    /// Bit-exact encoding, see [`codec::encode`]
    pub fn encode(&self) -> Bits {
        codec::encode(self)
    }

    /// Decode the first tree in `bits`, see [`codec::decode`]
    pub fn decode(bits: &BitSlice<u8, Msb0>) -> Result<Self> {
        codec::decode(bits)
    }
}

impl From<Color> for RegionQuadtree {
    #[inline]
    fn from(color: Color) -> Self {
        Self::Leaf(color)
    }
}
