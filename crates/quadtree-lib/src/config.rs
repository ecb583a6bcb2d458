//! Configuration shared by the tree constructors

use crate::{QuadtreeError, Rectangle, Result, utils};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behavior of the region operations whose historical results differ from a plain
/// pixel-wise combination
///
/// The historical behavior of `intersection` fills the south-east child of a
/// Black-with-Internal combination with the south-west result, and `horizontal_symmetry`
/// mirrors the relocated children with a vertical mirror. `Reference` reproduces both for
/// compatibility with existing encoded data; `Corrected` combines and mirrors each
/// quadrant independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Semantics {
    #[default]
    Corrected,
    Reference,
}

/// Configuration for the trees
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Surface new point and rectangle trees are built over.
    /// Must be a power-of-two square.
    /// Default: `{top=512, right=512, bottom=0, left=0}`
    pub surface: Rectangle,
    /// Semantics of the region algebra (default `Corrected`)
    pub semantics: Semantics,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            surface: utils::BASE_SURFACE,
            semantics: Semantics::default(),
        }
    }
}

impl Config {
    /// Check that the configured surface can be quartered recursively
    pub fn validate(&self) -> Result<()> {
        if !self.surface.is_power_of_two() {
            tracing::debug!("Rejecting configured surface {}", self.surface);
            return Err(QuadtreeError::InvalidSurface(self.surface));
        }
        Ok(())
    }
}
