//! City blocks and the growth state carried between expansion calls.

use serde::{Deserialize, Serialize};

use crate::coords::{CoordinateFrame, GridCoordinate};
use crate::tilemap::Tilemap;

use super::zoning::{ZoneCounts, ZoneType, ZoningParameters};

/// Axis-aligned lot rectangle. The bounding road ring lies one tile outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRect {
    /// South-west lot tile
    pub origin: GridCoordinate,
    pub width: usize,
    pub height: usize,
}

impl BlockRect {
    pub fn new(origin: GridCoordinate, width: usize, height: usize) -> Self {
        Self { origin, width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Last lot column and row.
    pub fn max_x(&self) -> i32 {
        self.origin.x + self.width as i32 - 1
    }

    pub fn max_y(&self) -> i32 {
        self.origin.y + self.height as i32 - 1
    }

    pub fn center(&self) -> GridCoordinate {
        self.origin
            .offset(self.width as i32 / 2, self.height as i32 / 2)
    }

    pub fn contains(&self, at: GridCoordinate) -> bool {
        at.x >= self.origin.x && at.x <= self.max_x() && at.y >= self.origin.y && at.y <= self.max_y()
    }

    /// Lot tiles, row by row from the south.
    pub fn tiles(&self) -> Vec<GridCoordinate> {
        (self.origin.y..=self.max_y())
            .flat_map(|y| (self.origin.x..=self.max_x()).map(move |x| GridCoordinate::new(x, y)))
            .collect()
    }

    /// The one-tile road ring around the lots, corners included.
    pub fn ring(&self) -> Vec<GridCoordinate> {
        let (x0, y0) = (self.origin.x - 1, self.origin.y - 1);
        let (x1, y1) = (self.max_x() + 1, self.max_y() + 1);
        let mut ring = Vec::with_capacity(2 * (self.width + self.height) + 4);
        for x in x0..=x1 {
            ring.push(GridCoordinate::new(x, y0));
            ring.push(GridCoordinate::new(x, y1));
        }
        for y in self.origin.y..=self.max_y() {
            ring.push(GridCoordinate::new(x0, y));
            ring.push(GridCoordinate::new(x1, y));
        }
        ring
    }

    /// True for the four ring corners.
    pub fn is_ring_corner(&self, at: GridCoordinate) -> bool {
        (at.x == self.origin.x - 1 || at.x == self.max_x() + 1)
            && (at.y == self.origin.y - 1 || at.y == self.max_y() + 1)
    }
}

/// A built block of lots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityBlock {
    /// Object id stamped on every lot tile
    pub id: u32,
    pub origin: GridCoordinate,
    /// (width, height) in lots
    pub footprint: (usize, usize),
    pub zone_type: ZoneType,
    pub zoning_parameters: ZoningParameters,
    /// Lot coordinates, `tiles[row][column]` from the south-west corner
    pub tiles: Vec<Vec<GridCoordinate>>,
    /// Lots not yet taken by a building
    pub available_tiles: usize,
}

impl CityBlock {
    pub fn new(id: u32, rect: BlockRect, zone_type: ZoneType, zoning_parameters: ZoningParameters) -> Self {
        let tiles = (0..rect.height as i32)
            .map(|row| {
                (0..rect.width as i32)
                    .map(|col| rect.origin.offset(col, row))
                    .collect()
            })
            .collect();
        Self {
            id,
            origin: rect.origin,
            footprint: (rect.width, rect.height),
            zone_type,
            zoning_parameters,
            tiles,
            available_tiles: rect.area(),
        }
    }

    pub fn rect(&self) -> BlockRect {
        BlockRect::new(self.origin, self.footprint.0, self.footprint.1)
    }

    pub fn center(&self) -> GridCoordinate {
        self.rect().center()
    }
}

/// Everything city growth needs to resume where the last call stopped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityGrowthState {
    pub city_center: GridCoordinate,
    /// World/city-local translation; its `local_center` is the city map center
    pub frame: CoordinateFrame,
    /// City-local claim map: true for every lot and road the city owns
    pub city_map: Tilemap<bool>,
    pub current_expansion_band: u32,
    pub bridges_built: u32,
    pub rci_counts: ZoneCounts,
    pub blocks: Vec<CityBlock>,
    pub downtown_built: bool,
    next_object_id: u32,
}

impl CityGrowthState {
    pub fn new(city_center: GridCoordinate, frame: CoordinateFrame, initial_band: u32) -> Self {
        Self {
            city_center,
            frame,
            city_map: Tilemap::new_with(frame.local_size, frame.local_size, false),
            current_expansion_band: initial_band,
            bridges_built: 0,
            rci_counts: ZoneCounts::default(),
            blocks: Vec::new(),
            downtown_built: false,
            next_object_id: 1,
        }
    }

    pub fn city_map_center(&self) -> GridCoordinate {
        self.frame.local_center
    }

    pub fn in_frame(&self, at: GridCoordinate) -> bool {
        self.frame.to_local(at).is_some()
    }

    /// Tiles outside the city frame are never claimed.
    pub fn is_claimed(&self, at: GridCoordinate) -> bool {
        self.frame
            .to_local(at)
            .is_some_and(|(lx, ly)| *self.city_map.get(lx, ly))
    }

    /// Mark a tile as city-owned. Returns false if it lies outside the frame.
    pub fn claim(&mut self, at: GridCoordinate) -> bool {
        match self.frame.to_local(at) {
            Some((lx, ly)) => {
                self.city_map.set(lx, ly, true);
                true
            }
            None => false,
        }
    }

    pub fn claimed_tiles(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.city_map
            .iter()
            .filter(|(_, _, claimed)| **claimed)
            .map(|(lx, ly, _)| self.frame.to_world((lx, ly)))
    }

    pub fn allocate_object_id(&mut self) -> u32 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
