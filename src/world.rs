//! Generated map bundle and the terrain pipeline
//!
//! Runs rivers, moisture and terrain classification in order and bundles the
//! results into a single struct for easy passing between phases.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::GenerationConfig;
use crate::coords::GridCoordinate;
use crate::error::Result;
use crate::grid::LandGrid;
use crate::moisture::MoistureField;
use crate::rivers::{self, RiverPath};
use crate::road_graph::RoadGraph;
use crate::terrain::{self, BandBreakpoints};

/// All generated map data bundled together
#[derive(Debug)]
pub struct GeneratedMap {
    /// Seed used for generation (allows recreation)
    pub seed: u64,
    pub config: GenerationConfig,
    pub grid: LandGrid,
    /// Road network; empty until a city has grown
    pub road_graph: RoadGraph,
    pub moisture: MoistureField,
    /// River paths, trimmed to the map
    pub rivers: Vec<RiverPath>,
    pub breakpoints: BandBreakpoints,
    /// Land cells per terrain band, wettest first
    pub band_counts: [usize; 5],
    /// The generator stream, positioned after terrain classification so city
    /// growth continues it
    pub rng: ChaCha8Rng,
}

impl GeneratedMap {
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Rebuild the road graph after the grid's roads changed.
    pub fn refresh_road_graph(&mut self) {
        self.road_graph = RoadGraph::from_grid(&self.grid);
    }

    pub fn into_parts(self) -> (LandGrid, RoadGraph) {
        (self.grid, self.road_graph)
    }
}

/// Generate a map from the three headline parameters and defaults for the rest.
pub fn generate_map(
    map_size: usize,
    base_land_value: f32,
    river_count: usize,
    seed: u64,
) -> Result<GeneratedMap> {
    generate_map_with_config(&GenerationConfig::new(map_size, base_land_value, river_count), seed)
}

/// Generate a map. Each phase builds its output locally; nothing is returned
/// unless every phase succeeded.
pub fn generate_map_with_config(config: &GenerationConfig, seed: u64) -> Result<GeneratedMap> {
    config.validate()?;
    let size = config.map_size;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(size, seed, rivers = config.river_count, "generating map");

    let mut rivers = rivers::generate_rivers(size, config.river_count, &config.rivers, &mut rng)?;
    let breakpoints = BandBreakpoints::roll(&config.terrain, &mut rng)?;

    let mut grid = LandGrid::new(size);
    for river in &rivers {
        river.apply(&mut grid, size);
    }
    let water = grid.water_mask();
    info!(water_tiles = grid.water_tile_count(), "rivers carved");

    // Off-map river tiles seed moisture along the edges, then go away.
    let virtual_water: HashSet<GridCoordinate> =
        rivers.iter().flat_map(|r| r.off_map_tiles(size)).collect();
    let far = breakpoints.highest() + config.moisture.far_margin;
    let margin = config.rivers.border_offset + config.rivers.width_limits(size).1 + 1;
    let moisture = MoistureField::build(&water, &virtual_water, far, margin);
    for river in &mut rivers {
        river.trim_to_map(size);
    }
    info!(far, breakpoints = ?breakpoints.values, "moisture diffused");

    let band_counts = terrain::classify_terrain(
        &mut grid,
        &water,
        &moisture,
        &breakpoints,
        config.base_land_value,
        &config.terrain,
        &mut rng,
    );
    info!(bands = ?band_counts, "terrain classified");

    let road_graph = RoadGraph::from_grid(&grid);

    Ok(GeneratedMap {
        seed,
        config: config.clone(),
        grid,
        road_graph,
        moisture,
        rivers,
        breakpoints,
        band_counts,
        rng,
    })
}
