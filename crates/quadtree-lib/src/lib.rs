//! Quadtree Library - Spatial Indices over Power-of-Two Integer Surfaces
//!
//! This library provides three complementary quadtree variants over a bounded,
//! power-of-two-sized 2D integer coordinate space. All trees are persistent values:
//! inserting or transforming returns a new root, previous roots stay valid and share
//! every untouched subtree with the new one.
//!
//! # Architecture
//!
//! - **[`PrQuadtree`]**: Point-region quadtree for exact point storage and membership
//! - **[`RegionQuadtree`]**: Black/white bitmap with a boolean algebra and a bit-exact
//!   binary exchange format ([`codec`])
//! - **[`RectQuadtree`]**: Rectangle-collection quadtree answering "which rectangles
//!   contain this point"
//! - **[`render`]**: Depth-first draw-command traversal for an external presentation layer
//!
//! # Performance Characteristics
//!
//! - **Insert / Lookup**: O(D) where D = log2(surface side), after one O(N) consistency
//!   check at the public boundary for point trees
//! - **Region algebra**: O(N) in the number of nodes of the operands
//! - **Memory**: O(D) new nodes per insertion, the rest is shared

pub mod codec;
mod config;
mod geometry;
mod point_region;
mod rect_collection;
mod region;
pub mod render;
pub mod utils;

// Public API exports
pub use config::{Config, Semantics};
pub use geometry::{Point, Pole, Rectangle};
pub use point_region::{Path, PrNode, PrQuadtree};
pub use rect_collection::RectQuadtree;
pub use region::{Color, RegionQuadtree};

/// Error types for every tree operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuadtreeError {
    #[error("Inconsistent tree: {0}")]
    InconsistentTree(String),

    #[error("Invalid surface {0}: expected a power-of-two square")]
    InvalidSurface(Rectangle),

    #[error("Point {point} is out of range of {surface}")]
    PointOutOfRange { point: Point, surface: Rectangle },

    #[error("No path found to point {0}")]
    NoPathFound(Point),

    #[error("Inconsistent encoding at bit {position}: {reason}")]
    InconsistentEncoding {
        position: usize,
        reason: &'static str,
    },

    #[error("Invalid rectangle {0}: expected top > bottom and right > left")]
    InvalidRectangle(Rectangle),

    #[error("Rectangle {rect} is out of range of {surface}")]
    RectangleOutOfRange { rect: Rectangle, surface: Rectangle },
}

pub type Result<T> = std::result::Result<T, QuadtreeError>;
