//! Grid coordinates, compass directions and the city-local coordinate frame.
//!
//! The world origin is the south-west corner; north is +y and east is +x.

use serde::{Deserialize, Serialize};

/// An integer tile coordinate. Signed so river paths can hold tiles in the
/// off-map margin; [`GridCoordinate::in_bounds`] tells the two apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self, map_size: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < map_size && (self.y as usize) < map_size
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        self.offset(dx, dy)
    }

    pub fn chebyshev(&self, other: &GridCoordinate) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// True if the two tiles touch, diagonals included.
    pub fn is_adjacent_8(&self, other: &GridCoordinate) -> bool {
        self != other && self.chebyshev(other) == 1
    }

    /// Unsigned coordinates; only valid after an in-bounds check.
    pub fn as_usize(&self) -> (usize, usize) {
        (self.x as usize, self.y as usize)
    }
}

impl From<(usize, usize)> for GridCoordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x as i32, y as i32)
    }
}

impl std::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight compass directions, clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const DIAGONALS: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Tile offset (dx, dy) for one step.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    /// Index clockwise from north (0..8).
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::NorthWest => 7,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Rotate by `steps` eighth-turns; positive is clockwise.
    pub fn rotate(self, steps: i32) -> Self {
        Self::from_index((self.index() as i32 + steps).rem_euclid(8) as usize)
    }

    pub fn opposite(self) -> Self {
        self.rotate(4)
    }

    pub fn is_cardinal(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn is_diagonal(self) -> bool {
        !self.is_cardinal()
    }

    /// Smallest number of eighth-turns between two directions (0..=4).
    pub fn turn_distance(self, other: Direction) -> i32 {
        let diff = (self.index() as i32 - other.index() as i32).rem_euclid(8);
        diff.min(8 - diff)
    }
}

/// Translation between world tiles and a bounded city-local map.
///
/// `local_center` is the local index that `world_center` maps to; the local
/// map spans `0..local_size` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFrame {
    pub world_center: GridCoordinate,
    pub local_center: GridCoordinate,
    pub local_size: usize,
}

impl CoordinateFrame {
    /// Build a frame of `local_size` tiles around `world_center`, shifting the
    /// local center when the world center is too close to a world edge so
    /// every local index still maps onto the world.
    pub fn centered(world_center: GridCoordinate, local_size: usize, map_size: usize) -> Self {
        let local_size = local_size.min(map_size);
        let half = (local_size / 2) as i32;
        let shift = |center: i32| -> i32 {
            let low = center - half;
            let high = low + local_size as i32;
            if low < 0 {
                center
            } else if high > map_size as i32 {
                center - (map_size as i32 - local_size as i32)
            } else {
                half
            }
        };
        Self {
            world_center,
            local_center: GridCoordinate::new(shift(world_center.x), shift(world_center.y)),
            local_size,
        }
    }

    /// World tile to local index, or `None` outside the local map.
    pub fn to_local(&self, world: GridCoordinate) -> Option<(usize, usize)> {
        let lx = world.x - self.world_center.x + self.local_center.x;
        let ly = world.y - self.world_center.y + self.local_center.y;
        if lx >= 0 && ly >= 0 && (lx as usize) < self.local_size && (ly as usize) < self.local_size {
            Some((lx as usize, ly as usize))
        } else {
            None
        }
    }

    pub fn to_world(&self, local: (usize, usize)) -> GridCoordinate {
        GridCoordinate::new(
            local.0 as i32 - self.local_center.x + self.world_center.x,
            local.1 as i32 - self.local_center.y + self.world_center.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_rotation() {
        assert_eq!(Direction::North.rotate(1), Direction::NorthEast);
        assert_eq!(Direction::North.rotate(-1), Direction::NorthWest);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::NorthWest.turn_distance(Direction::NorthEast), 2);
        assert_eq!(Direction::North.turn_distance(Direction::South), 4);
        assert!(Direction::South.is_cardinal());
        assert!(Direction::SouthWest.is_diagonal());
    }

    #[test]
    fn test_frame_round_trip_in_middle_of_world() {
        let frame = CoordinateFrame::centered(GridCoordinate::new(100, 80), 64, 256);
        assert_eq!(frame.local_center, GridCoordinate::new(32, 32));
        assert_eq!(frame.to_local(GridCoordinate::new(100, 80)), Some((32, 32)));
        assert_eq!(frame.to_world((0, 0)), GridCoordinate::new(68, 48));
        assert_eq!(frame.to_local(GridCoordinate::new(67, 80)), None);
    }

    #[test]
    fn test_frame_shifts_near_world_edges() {
        let frame = CoordinateFrame::centered(GridCoordinate::new(5, 250), 64, 256);
        // Local index 0 must still be world 0 on the x axis.
        assert_eq!(frame.to_world((0, 0)).x, 0);
        // And the top of the local map must not run past the world.
        assert_eq!(frame.to_world((0, 63)).y, 255);
        for lx in [0, 31, 63] {
            let world = frame.to_world((lx, lx));
            assert!(world.in_bounds(256));
            assert_eq!(frame.to_local(world), Some((lx, lx)));
        }
    }

    #[test]
    fn test_frame_clamps_to_small_worlds() {
        let frame = CoordinateFrame::centered(GridCoordinate::new(25, 25), 128, 50);
        assert_eq!(frame.local_size, 50);
        assert_eq!(frame.to_local(GridCoordinate::new(0, 49)), Some((0, 49)));
    }
}
