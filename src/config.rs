//! Generation parameters and configuration
//!
//! Every tuned constant of the generator lives here so it can be adjusted
//! from a JSON file without touching the algorithms.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Smallest map edge that still fits a river and the downtown blocks.
pub const MIN_MAP_SIZE: usize = 24;
/// Largest map edge; keeps tile coordinates and frame arithmetic well inside `i32`.
pub const MAX_MAP_SIZE: usize = 8192;

/// Top-level configuration for one generated map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Edge length of the square map in tiles
    pub map_size: usize,
    /// Base land value every classified cell is randomized around
    pub base_land_value: f32,
    /// Number of rivers to carve
    pub river_count: usize,
    pub rivers: RiverParams,
    pub moisture: MoistureParams,
    pub terrain: TerrainParams,
    pub city: CityParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            map_size: 128,
            base_land_value: 1000.0,
            river_count: 1,
            rivers: RiverParams::default(),
            moisture: MoistureParams::default(),
            terrain: TerrainParams::default(),
            city: CityParams::default(),
        }
    }
}

impl GenerationConfig {
    /// Defaults with the three headline parameters overridden.
    pub fn new(map_size: usize, base_land_value: f32, river_count: usize) -> Self {
        Self {
            map_size,
            base_land_value,
            river_count,
            ..Self::default()
        }
    }

    /// Load a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GenerationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&self.map_size) {
            return Err(GenerationError::InvalidMapSize {
                size: self.map_size,
                min: MIN_MAP_SIZE,
                max: MAX_MAP_SIZE,
            });
        }
        if !self.base_land_value.is_finite() || self.base_land_value < 0.0 {
            return invalid(format!("base_land_value {} must be finite and >= 0", self.base_land_value));
        }
        self.rivers.validate()?;
        self.terrain.validate()?;
        self.city.validate(self.map_size)?;
        Ok(())
    }
}

fn invalid<T>(message: String) -> Result<T> {
    Err(GenerationError::InvalidConfig(message))
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        invalid(format!("{} must be within 0..=1, got {}", name, value))
    }
}

fn check_weights<T>(name: &str, weights: &[(T, u32)]) -> Result<()> {
    if weights.iter().map(|(_, w)| *w as u64).sum::<u64>() == 0 {
        invalid(format!("{} needs at least one positive weight", name))
    } else {
        Ok(())
    }
}

/// River path synthesis parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// How far outside the map the start border lies, and how far the pen
    /// may wander off-map before the river ends
    pub border_offset: i32,
    /// Start tiles closer than this to a map corner (along the edge) are
    /// re-rolled. Clamped to a quarter of the map size.
    pub corner_margin: usize,
    /// Start tile draws before giving up with `RiverSeedNotFound`
    pub max_start_attempts: usize,
    /// Safety bound on pen steps per river
    pub max_steps: usize,
    pub min_width: i32,
    /// Clamped to a sixth of the map size
    pub max_width: i32,
    /// Minimum steps between width changes
    pub width_change_interval: u32,
    /// Chance of re-rolling the width once the interval has passed
    pub width_change_chance: f64,
    /// Width delta outcomes and their weights
    pub width_delta_weights: Vec<(i32, u32)>,
    /// Minimum steps between direction changes
    pub turn_interval: u32,
    /// Chance of consulting the direction weights once the interval has
    /// passed. The heading persists with probability
    /// `1 - turn_chance * (1 - keep share)`, so at 1.0 the weights alone
    /// decide (60% keep by default).
    pub turn_chance: f64,
    /// Weight of keeping the current heading
    pub keep_direction_weight: u32,
    /// Weight of turning 45 degrees counter-clockwise
    pub turn_left_weight: u32,
    /// Weight of turning 45 degrees clockwise
    pub turn_right_weight: u32,
    /// Steps at the start of a river during which turns are dampened and
    /// held within 45 degrees of the initial heading
    pub dampening_steps: u32,
    /// Multiplier on `turn_chance` during the dampening window
    pub dampening_factor: f64,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            border_offset: 10,
            corner_margin: 25,
            max_start_attempts: 1000,
            max_steps: 500,
            min_width: 3,
            max_width: 16,
            width_change_interval: 4,
            width_change_chance: 0.3,
            width_delta_weights: vec![(-2, 10), (-1, 25), (0, 30), (1, 25), (2, 10)],
            turn_interval: 12,
            turn_chance: 1.0,
            keep_direction_weight: 60,
            turn_left_weight: 20,
            turn_right_weight: 20,
            dampening_steps: 20,
            dampening_factor: 0.5,
        }
    }
}

impl RiverParams {
    /// Width range actually used on a map of `map_size` tiles.
    pub fn width_limits(&self, map_size: usize) -> (i32, i32) {
        let cap = (map_size / 6) as i32;
        (self.min_width, self.max_width.min(cap).max(self.min_width))
    }

    /// Corner margin actually used on a map of `map_size` tiles.
    pub fn effective_corner_margin(&self, map_size: usize) -> usize {
        self.corner_margin.min(map_size / 4)
    }

    fn validate(&self) -> Result<()> {
        if self.border_offset < 0 {
            return invalid(format!("border_offset {} must be >= 0", self.border_offset));
        }
        if self.min_width < 1 || self.max_width < self.min_width {
            return invalid(format!(
                "river width range {}..={} is empty or non-positive",
                self.min_width, self.max_width
            ));
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be positive".to_string());
        }
        check_probability("width_change_chance", self.width_change_chance)?;
        check_probability("turn_chance", self.turn_chance)?;
        check_probability("dampening_factor", self.dampening_factor)?;
        check_weights("width_delta_weights", &self.width_delta_weights)?;
        check_weights(
            "direction weights",
            &[
                ((), self.keep_direction_weight),
                ((), self.turn_left_weight),
                ((), self.turn_right_weight),
            ],
        )
    }
}

/// Moisture diffusion parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureParams {
    /// Distance added to the highest band breakpoint to get the "far" value
    pub far_margin: i32,
}

impl Default for MoistureParams {
    fn default() -> Self {
        Self { far_margin: 6 }
    }
}

/// Terrain band classification and land value parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Default upper moisture bound of Wettest, Wet, Normal and Dry
    pub default_breakpoints: [i32; 4],
    /// Per-map perturbation of each breakpoint
    pub breakpoint_jitter_weights: Vec<(i32, u32)>,
    /// Per-cell breakpoint jitter amplitude. Non-zero values soften band
    /// edges further but give up strict moisture monotonicity.
    pub cell_jitter: i32,
    /// Relative spread of each cell's base land value (0.1 = +/-10%)
    pub land_value_variation: f32,
    /// Largest relative bonus for sitting right next to water
    pub water_proximity_swing: f32,
    /// Number of visual variants per terrain key
    pub terrain_variants: u8,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            default_breakpoints: [2, 6, 11, 17],
            breakpoint_jitter_weights: vec![(-2, 15), (-1, 20), (0, 30), (1, 20), (2, 15)],
            cell_jitter: 0,
            land_value_variation: 0.1,
            water_proximity_swing: 0.25,
            terrain_variants: 4,
        }
    }
}

impl TerrainParams {
    fn validate(&self) -> Result<()> {
        if self.default_breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return invalid(format!(
                "default_breakpoints {:?} must be strictly ascending",
                self.default_breakpoints
            ));
        }
        if self.default_breakpoints[0] < 0 || self.cell_jitter < 0 {
            return invalid("breakpoints and cell_jitter must be >= 0".to_string());
        }
        if self.terrain_variants == 0 {
            return invalid("terrain_variants must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.land_value_variation)
            || !(0.0..=1.0).contains(&self.water_proximity_swing)
        {
            return invalid("land value variation and swing must be fractions".to_string());
        }
        check_weights("breakpoint_jitter_weights", &self.breakpoint_jitter_weights)
    }
}

/// City seeding and growth parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityParams {
    /// Side of the water-free square the city seed must sit in
    pub seed_clearance: usize,
    /// Minimum distance between the seed square and the map edge
    pub seed_edge_offset: usize,
    /// Random seed candidates before falling back
    pub max_seed_attempts: usize,
    /// Side of the city-local occupancy map
    pub local_map_size: usize,
    /// Side of the four downtown blocks and of bridge landings
    pub initial_block_size: usize,
    /// Block side length outcomes and their weights
    pub block_size_weights: Vec<(usize, u32)>,
    /// Chance the zone type follows demand instead of being fully random
    pub demand_roll_chance: f64,
    /// Residential blocks wanted per commercial block
    pub residential_per_commercial: f32,
    pub residential_per_industrial: f32,
    pub residential_per_office: f32,
    pub residential_per_agricultural: f32,
    pub residential_per_park: f32,
    /// Tie-break weights: pick among the tied zones / Mixed / fully random
    pub tie_break_weights: [u32; 3],
    /// Wave width (Chebyshev tiles from the city center)
    pub wave_bucket: i32,
    pub corner_skip_chance: f64,
    pub edge_skip_chance: f64,
    /// Candidate placements examined before a search gives up
    pub max_placement_candidates: usize,
    /// Longest run of water a bridge may span
    pub max_bridge_length: usize,
    /// Expansion band of a freshly founded city
    pub initial_band: u32,
}

impl Default for CityParams {
    fn default() -> Self {
        Self {
            seed_clearance: 13,
            seed_edge_offset: 2,
            max_seed_attempts: 200,
            local_map_size: 160,
            initial_block_size: 5,
            block_size_weights: vec![(3, 10), (4, 20), (5, 40), (6, 20), (7, 10)],
            demand_roll_chance: 0.9,
            residential_per_commercial: 3.0,
            residential_per_industrial: 4.0,
            residential_per_office: 6.0,
            residential_per_agricultural: 5.0,
            residential_per_park: 5.0,
            tie_break_weights: [60, 25, 15],
            wave_bucket: 7,
            corner_skip_chance: 0.15,
            edge_skip_chance: 0.3,
            max_placement_candidates: 600,
            max_bridge_length: 15,
            initial_band: 1,
        }
    }
}

impl CityParams {
    fn validate(&self, map_size: usize) -> Result<()> {
        // Four downtown blocks, the road cross between them and the outer ring.
        let downtown = 2 * self.initial_block_size + 3;
        if self.initial_block_size < 3 || self.seed_clearance < downtown {
            return invalid(format!(
                "seed_clearance {} must cover the downtown ({} tiles) and blocks must be >= 3",
                self.seed_clearance, downtown
            ));
        }
        if self.seed_clearance + 2 * self.seed_edge_offset > map_size {
            return invalid(format!(
                "seed clearance {} plus edge offset {} does not fit a {} map",
                self.seed_clearance, self.seed_edge_offset, map_size
            ));
        }
        if self.local_map_size < self.seed_clearance {
            return invalid("local_map_size must hold the downtown".to_string());
        }
        if self.block_size_weights.iter().any(|(s, w)| *w > 0 && *s < 1) {
            return invalid("block sizes must be positive".to_string());
        }
        if self.wave_bucket <= 0 {
            return invalid("wave_bucket must be positive".to_string());
        }
        let ratios = [
            self.residential_per_commercial,
            self.residential_per_industrial,
            self.residential_per_office,
            self.residential_per_agricultural,
            self.residential_per_park,
        ];
        if ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return invalid("zone demand ratios must be positive".to_string());
        }
        check_probability("demand_roll_chance", self.demand_roll_chance)?;
        check_probability("corner_skip_chance", self.corner_skip_chance)?;
        check_probability("edge_skip_chance", self.edge_skip_chance)?;
        check_weights("block_size_weights", &self.block_size_weights)?;
        check_weights(
            "tie_break_weights",
            &self.tie_break_weights.map(|w| ((), w)),
        )
    }
}
