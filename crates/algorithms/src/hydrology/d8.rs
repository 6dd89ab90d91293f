//! D8 flow-model constants
//!
//! Direction encoding, shared by every hydrology algorithm and by callers
//! that construct flow-direction rasters themselves:
//!
//! ```text
//!   4  3  2
//!   5  0  1
//!   6  7  8
//! ```
//!
//! `0` is [`NO_FLOW`]: a terminal cell (sink or outlet) with no downstream
//! neighbor. Codes 1-8 index [`D8_OFFSETS`].

/// Sentinel direction for a cell with no downstream neighbor.
///
/// Distinct from the no-data value of a direction raster.
pub const NO_FLOW: u8 = 0;

/// D8 neighbor offsets as (row, col) deltas, indexed by `direction - 1`.
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (0, 1),   // 1: E
    (-1, 1),  // 2: NE
    (-1, 0),  // 3: N
    (-1, -1), // 4: NW
    (0, -1),  // 5: W
    (1, -1),  // 6: SW
    (1, 0),   // 7: S
    (1, 1),   // 8: SE
];

/// Inverse direction table: `D8_INVERSE[d]` points back at the cell `d`
/// came from. Index 0 ([`NO_FLOW`]) maps to itself.
pub const D8_INVERSE: [u8; 9] = [0, 5, 6, 7, 8, 1, 2, 3, 4];

/// Offset of the neighbor that `dir` (1-8) points to.
#[inline]
pub fn offset(dir: u8) -> (isize, isize) {
    D8_OFFSETS[(dir - 1) as usize]
}

/// The direction opposite to `dir`.
#[inline]
pub fn inverse(dir: u8) -> u8 {
    D8_INVERSE[dir as usize]
}
