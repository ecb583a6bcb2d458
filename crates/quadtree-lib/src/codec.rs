//! Binary exchange format for region quadtrees
//!
//! The stream is written depth-first, most significant bit first:
//!
//! - `0` internal node, followed by the encodings of its `NW, NE, SW, SE` children
//! - `10` White leaf
//! - `11` Black leaf
//!
//! Decoding reads exactly one tree and ignores whatever follows it, so a stream packed
//! into bytes can carry zero padding in its last byte.
//!
//! Decoding refuses streams nested deeper than [`MAX_DEPTH`] levels. Trees built by hand
//! through [`RegionQuadtree::internal`] can nest further; such a tree still encodes, but
//! its stream does not decode back.

use crate::utils::MAX_DEPTH;
use crate::{Color, QuadtreeError, RegionQuadtree, Result};
use bitvec::prelude::*;

/// Bit stream produced by [`encode`]
pub type Bits = BitVec<u8, Msb0>;

/// Encode a tree into its bit stream
///
/// Any tree encodes. Only trees at most [`MAX_DEPTH`] levels deep decode back.
pub fn encode(tree: &RegionQuadtree) -> Bits {
    let mut bits = Bits::with_capacity(tree.leaf_count() * 3);
    encode_into(tree, &mut bits);
    bits
}

fn encode_into(tree: &RegionQuadtree, bits: &mut Bits) {
    match tree {
        RegionQuadtree::Internal(children) => {
            bits.push(false);
            for child in children.iter() {
                encode_into(child, bits);
            }
        }
        RegionQuadtree::Leaf(color) => {
            bits.push(true);
            bits.push(*color == Color::Black);
        }
    }
}

/// Decode the first tree of a bit stream
///
/// Fails with `InconsistentEncoding` if the stream ends in the middle of a node or nests
/// deeper than [`MAX_DEPTH`]. Bits after the first complete tree are ignored.
pub fn decode(bits: &BitSlice<u8, Msb0>) -> Result<RegionQuadtree> {
    let mut reader = BitReader::new(bits);
    let tree = reader.read_node(0)?;

    if reader.remaining() > 0 {
        tracing::trace!(
            "Ignoring {} trailing bits after a {}-bit tree",
            reader.remaining(),
            reader.position
        );
    }
    Ok(tree)
}

/// Encode a tree and pack it into bytes; the last byte is padded with zeros
pub fn encode_bytes(tree: &RegionQuadtree) -> Vec<u8> {
    encode(tree).into_vec()
}

/// Decode the first tree of a byte-packed stream
pub fn decode_bytes(bytes: &[u8]) -> Result<RegionQuadtree> {
    decode(bytes.view_bits::<Msb0>())
}

/// Render a bit stream as a string of `0` and `1`
pub fn to_bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

/// Cursor over a bit stream
#[derive(Debug)]
struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitReader<'a> {
    fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, position: 0 }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.position)
    }

    fn next_bit(&mut self) -> Result<bool> {
        let bit = self
            .bits
            .get(self.position)
            .map(|bit| *bit)
            .ok_or(QuadtreeError::InconsistentEncoding {
                position: self.position,
                reason: "bit stream exhausted",
            })?;
        self.position += 1;
        Ok(bit)
    }

    fn read_node(&mut self, depth: usize) -> Result<RegionQuadtree> {
        if self.next_bit()? {
            let color = if self.next_bit()? {
                Color::Black
            } else {
                Color::White
            };
            return Ok(RegionQuadtree::Leaf(color));
        }

        if depth >= MAX_DEPTH {
            return Err(QuadtreeError::InconsistentEncoding {
                position: self.position - 1,
                reason: "nesting exceeds the deepest supported surface",
            });
        }

        let nw = self.read_node(depth + 1)?;
        let ne = self.read_node(depth + 1)?;
        let sw = self.read_node(depth + 1)?;
        let se = self.read_node(depth + 1)?;
        Ok(RegionQuadtree::internal(nw, ne, sw, se))
    }
}
