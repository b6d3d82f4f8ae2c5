//! 8-neighbor adjacency bitmasks
//!
//! The same mask encoding drives the road legality check during city growth
//! and the road geometry keys handed to the placement layer.
//!
//! Bits run clockwise from north-west:
//!
//! ```text
//!   NW=1   N=2   NE=4
//!   W=128   .    E=8
//!   SW=64  S=32  SE=16
//! ```

use crate::coords::{Direction, GridCoordinate};

pub const MASK_NW: u8 = 1;
pub const MASK_N: u8 = 2;
pub const MASK_NE: u8 = 4;
pub const MASK_E: u8 = 8;
pub const MASK_SE: u8 = 16;
pub const MASK_S: u8 = 32;
pub const MASK_SW: u8 = 64;
pub const MASK_W: u8 = 128;

pub const CARDINAL_MASK: u8 = MASK_N | MASK_E | MASK_S | MASK_W;

/// A cardinal pair plus the diagonal between them: a 2x2 road square.
pub const FILLED_QUADRANTS: [u8; 4] = [
    MASK_N | MASK_NE | MASK_E,
    MASK_E | MASK_SE | MASK_S,
    MASK_S | MASK_SW | MASK_W,
    MASK_W | MASK_NW | MASK_N,
];

/// The four three-way "roundabout" half-planes (each holds two quadrants).
pub const ROUNDABOUT_MASKS: [u8; 4] = [248, 62, 143, 227];

pub fn direction_bit(dir: Direction) -> u8 {
    match dir {
        Direction::NorthWest => MASK_NW,
        Direction::North => MASK_N,
        Direction::NorthEast => MASK_NE,
        Direction::East => MASK_E,
        Direction::SouthEast => MASK_SE,
        Direction::South => MASK_S,
        Direction::SouthWest => MASK_SW,
        Direction::West => MASK_W,
    }
}

/// Mask of the neighbors of `at` that satisfy `predicate`.
pub fn neighbor_mask<F>(at: GridCoordinate, predicate: F) -> u8
where
    F: Fn(GridCoordinate) -> bool,
{
    Direction::ALL
        .iter()
        .filter(|dir| predicate(at.step(**dir)))
        .fold(0u8, |mask, dir| mask | direction_bit(*dir))
}

/// A road tile with this neighborhood would be part of a double-width blob,
/// a roundabout half-plane or a fully surrounded interior.
pub fn is_illegal_road_mask(mask: u8) -> bool {
    FILLED_QUADRANTS.iter().any(|q| mask & q == *q)
}

pub fn cardinal_count(mask: u8) -> u32 {
    (mask & CARDINAL_MASK).count_ones()
}

/// Road geometry key for a tile with the given road mask. Only the cardinal
/// bits matter for geometry; T pieces are named after their stem.
pub fn road_key_for_mask(mask: u8, is_bridge: bool) -> &'static str {
    let n = mask & MASK_N != 0;
    let e = mask & MASK_E != 0;
    let s = mask & MASK_S != 0;
    let w = mask & MASK_W != 0;

    if is_bridge {
        return if (e || w) && !(n || s) { "bridge_ew" } else { "bridge_ns" };
    }

    match (n, e, s, w) {
        (false, false, false, false) => "road_isolated",
        (true, false, false, false) => "road_end_n",
        (false, true, false, false) => "road_end_e",
        (false, false, true, false) => "road_end_s",
        (false, false, false, true) => "road_end_w",
        (true, false, true, false) => "road_straight_ns",
        (false, true, false, true) => "road_straight_ew",
        (true, true, false, false) => "road_corner_ne",
        (false, true, true, false) => "road_corner_se",
        (false, false, true, true) => "road_corner_sw",
        (true, false, false, true) => "road_corner_nw",
        (true, true, false, true) => "road_t_n",
        (true, true, true, false) => "road_t_e",
        (false, true, true, true) => "road_t_s",
        (true, false, true, true) => "road_t_w",
        (true, true, true, true) => "road_cross",
    }
}
