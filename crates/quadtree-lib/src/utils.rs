//! Surface constants and small helpers shared by the trees

use crate::geometry::Rectangle;

/// Side length of the default base surface
pub const BASE_SIZE: i32 = 512;

/// Default surface every tree is built over unless configured otherwise
pub const BASE_SURFACE: Rectangle = Rectangle::square(BASE_SIZE);

/// Deepest nesting any tree can reach: the side of an `i32` surface is at most 2^31
pub const MAX_DEPTH: usize = 31;

/// Number of times a power-of-two surface can be quartered before reaching unit cells
///
/// Returns `None` if the surface is not a power-of-two square.
#[inline]
pub fn subdivision_levels(surface: &Rectangle) -> Option<u32> {
    surface
        .is_power_of_two()
        .then(|| surface.width().trailing_zeros())
}
