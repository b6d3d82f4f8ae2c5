//! The land grid: per-cell plots, read accessors and the placement seam.

use serde::{Deserialize, Serialize};

use crate::adjacency::{self, road_key_for_mask};
use crate::coords::GridCoordinate;
use crate::plot::{LandPlot, TerrainBand, TerrainRotation};
use crate::tilemap::Tilemap;

/// Records tile placements. Generation and growth write every water, terrain,
/// road and object tile through this trait so a presentation layer can mirror
/// the grid into its own index.
pub trait TilePlacer {
    fn place_water(&mut self, at: GridCoordinate);

    fn place_terrain(
        &mut self,
        at: GridCoordinate,
        band: TerrainBand,
        variant: u8,
        rotation: TerrainRotation,
        land_value: f32,
    );

    /// Lay a road (or a bridge when the tile is water) with a geometry key.
    fn place_road(&mut self, at: GridCoordinate, road_key: &str);

    fn place_object(&mut self, at: GridCoordinate, object_id: u32, owner_id: i32);
}

/// Square grid of [`LandPlot`]s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandGrid {
    plots: Tilemap<LandPlot>,
}

impl LandGrid {
    /// All-land grid of unclassified plots.
    pub fn new(size: usize) -> Self {
        Self {
            plots: Tilemap::new(size, size),
        }
    }

    pub fn size(&self) -> usize {
        self.plots.width
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.plots.in_bounds(x, y)
    }

    pub fn get(&self, x: usize, y: usize) -> &LandPlot {
        self.plots.get(x, y)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut LandPlot {
        self.plots.get_mut(x, y)
    }

    pub fn set(&mut self, x: usize, y: usize, plot: LandPlot) {
        self.plots.set(x, y, plot);
    }

    /// Plot at a signed coordinate. Panics off the grid.
    pub fn plot(&self, at: GridCoordinate) -> &LandPlot {
        if !at.in_bounds(self.size()) {
            panic!("out of bounds plot access at {} on a {}x{} grid", at, self.size(), self.size());
        }
        let (x, y) = at.as_usize();
        self.get(x, y)
    }

    pub fn plot_mut(&mut self, at: GridCoordinate) -> &mut LandPlot {
        if !at.in_bounds(self.size()) {
            panic!("out of bounds plot access at {} on a {}x{} grid", at, self.size(), self.size());
        }
        let (x, y) = at.as_usize();
        self.get_mut(x, y)
    }

    pub fn try_plot(&self, at: GridCoordinate) -> Option<&LandPlot> {
        if at.in_bounds(self.size()) {
            Some(self.plot(at))
        } else {
            None
        }
    }

    pub fn is_water(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_water
    }

    pub fn has_road(&self, x: usize, y: usize) -> bool {
        self.get(x, y).has_road
    }

    pub fn owner_of(&self, x: usize, y: usize) -> i32 {
        self.get(x, y).owner_id
    }

    pub fn current_land_value(&self, x: usize, y: usize) -> f32 {
        self.get(x, y).current_land_value
    }

    /// Iterate over all plots with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoordinate, &LandPlot)> {
        self.plots.iter().map(|(x, y, plot)| (GridCoordinate::from((x, y)), plot))
    }

    /// 8-neighbor mask of plots matching `predicate`; off-grid neighbors never match.
    pub fn neighbor_mask<F>(&self, x: usize, y: usize, predicate: F) -> u8
    where
        F: Fn(&LandPlot) -> bool,
    {
        adjacency::neighbor_mask(GridCoordinate::from((x, y)), |c| {
            self.try_plot(c).is_some_and(&predicate)
        })
    }

    pub fn road_mask(&self, at: GridCoordinate) -> u8 {
        let (x, y) = at.as_usize();
        self.neighbor_mask(x, y, |p| p.has_road)
    }

    /// Recompute the geometry key of a road tile from its current neighbors.
    pub fn refresh_road_key(&mut self, at: GridCoordinate) {
        if !at.in_bounds(self.size()) || !self.plot(at).has_road {
            return;
        }
        let mask = self.road_mask(at);
        let plot = self.plot_mut(at);
        plot.road_key = Some(road_key_for_mask(mask, plot.has_bridge).to_string());
    }

    pub fn road_tiles(&self) -> Vec<GridCoordinate> {
        self.iter().filter(|(_, p)| p.has_road).map(|(c, _)| c).collect()
    }

    pub fn water_tile_count(&self) -> usize {
        self.plots.iter().filter(|(_, _, p)| p.is_water).count()
    }

    /// Copy of the water layer, for passes that only need the mask.
    pub fn water_mask(&self) -> Tilemap<bool> {
        let mut mask = Tilemap::new_with(self.size(), self.size(), false);
        for (x, y, plot) in self.plots.iter() {
            mask.set(x, y, plot.is_water);
        }
        mask
    }
}

impl TilePlacer for LandGrid {
    fn place_water(&mut self, at: GridCoordinate) {
        *self.plot_mut(at) = LandPlot::water();
    }

    fn place_terrain(
        &mut self,
        at: GridCoordinate,
        band: TerrainBand,
        variant: u8,
        rotation: TerrainRotation,
        land_value: f32,
    ) {
        let plot = self.plot_mut(at);
        plot.is_water = false;
        plot.terrain_band = Some(band);
        plot.terrain_key = band.terrain_key().to_string();
        plot.terrain_variant = variant;
        plot.terrain_rotation = rotation;
        plot.base_land_value = land_value;
        plot.current_land_value = land_value;
    }

    fn place_road(&mut self, at: GridCoordinate, road_key: &str) {
        let plot = self.plot_mut(at);
        plot.has_road = true;
        plot.has_bridge = plot.is_water;
        plot.road_key = Some(road_key.to_string());
    }

    fn place_object(&mut self, at: GridCoordinate, object_id: u32, owner_id: i32) {
        let plot = self.plot_mut(at);
        plot.object_on_tile_id = object_id;
        plot.owner_id = owner_id;
    }
}
