//! Terrain band classification and base land values.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::TerrainParams;
use crate::coords::GridCoordinate;
use crate::error::Result;
use crate::grid::TilePlacer;
use crate::moisture::MoistureField;
use crate::plot::{TerrainBand, TerrainRotation};
use crate::tilemap::Tilemap;
use crate::weighted::WeightedTable;

/// Upper moisture bound (inclusive) of Wettest, Wet, Normal and Dry. Anything
/// above the last breakpoint is Driest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandBreakpoints {
    pub values: [i32; 4],
}

impl BandBreakpoints {
    pub fn new(values: [i32; 4]) -> Self {
        Self { values }
    }

    /// Perturb the default breakpoints once per map. The result stays
    /// non-negative and strictly ascending.
    pub fn roll<R: Rng + ?Sized>(params: &TerrainParams, rng: &mut R) -> Result<Self> {
        let jitter = WeightedTable::new(&params.breakpoint_jitter_weights)?;
        let mut values = params.default_breakpoints;
        for value in values.iter_mut() {
            *value = (*value + jitter.sample(rng)).max(0);
        }
        Ok(Self::ascending(values))
    }

    fn ascending(mut values: [i32; 4]) -> Self {
        for i in 1..values.len() {
            values[i] = values[i].max(values[i - 1] + 1);
        }
        Self { values }
    }

    pub fn highest(&self) -> i32 {
        self.values[3]
    }

    pub fn classify(&self, moisture: i32) -> TerrainBand {
        self.values
            .iter()
            .position(|&bp| moisture <= bp)
            .map(TerrainBand::from_index)
            .unwrap_or(TerrainBand::Driest)
    }

    /// Same breakpoints with every value moved by up to `amplitude` tiles.
    fn jittered<R: Rng + ?Sized>(&self, amplitude: i32, rng: &mut R) -> Self {
        let mut values = self.values;
        for value in values.iter_mut() {
            *value = (*value + rng.gen_range(-amplitude..=amplitude)).max(0);
        }
        Self::ascending(values)
    }
}

/// Base land value of a cell: the map's base value randomized by
/// `land_value_variation`, then raised by up to `water_proximity_swing` for
/// cells close to water.
pub fn land_value<R: Rng + ?Sized>(
    base_land_value: f32,
    moisture: i32,
    far: i32,
    params: &TerrainParams,
    rng: &mut R,
) -> f32 {
    let variation = params.land_value_variation;
    let randomized = base_land_value * (1.0 + rng.gen_range(-variation..=variation));
    let closeness = if far > 0 {
        1.0 - moisture.clamp(0, far) as f32 / far as f32
    } else {
        0.0
    };
    let bonus = (params.water_proximity_swing * closeness).clamp(0.0, params.water_proximity_swing);
    randomized * (1.0 + bonus)
}

/// Classify every land cell of `water` and hand it to the placer.
///
/// Cells are visited row by row from the south-west corner; each draws its
/// optional breakpoint jitter, variant, rotation and land value in that order.
/// Returns the number of cells per band, wettest first.
pub fn classify_terrain<P, R>(
    placer: &mut P,
    water: &Tilemap<bool>,
    moisture: &MoistureField,
    breakpoints: &BandBreakpoints,
    base_land_value: f32,
    params: &TerrainParams,
    rng: &mut R,
) -> [usize; 5]
where
    P: TilePlacer,
    R: Rng + ?Sized,
{
    let mut counts = [0usize; 5];

    for y in 0..water.height {
        for x in 0..water.width {
            if *water.get(x, y) {
                continue;
            }
            let wetness = moisture.get(x, y);
            let band = if params.cell_jitter > 0 {
                breakpoints.jittered(params.cell_jitter, rng).classify(wetness)
            } else {
                breakpoints.classify(wetness)
            };
            let variant = rng.gen_range(0..params.terrain_variants);
            let rotation = TerrainRotation::ALL[rng.gen_range(0..4)];
            let value = land_value(base_land_value, wetness, moisture.far_value(), params, rng);

            placer.place_terrain(GridCoordinate::from((x, y)), band, variant, rotation, value);
            counts[band as usize] += 1;
        }
    }

    counts
}
