//! City growth engine
//!
//! A city is founded on a dry site, gets a fixed downtown on its first growth
//! call, and then grows block by block outward from the center. Each block is
//! ringed by roads shared with its neighbors; blocks on a river bank may throw
//! bridges across to a landing block on the far shore.

pub mod bridges;
pub mod build;
pub mod placement;
pub mod seed;
pub mod state;
pub mod zoning;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CityParams;
use crate::error::Result;
use crate::grid::LandGrid;
use crate::weighted::WeightedTable;

pub use state::{BlockRect, CityBlock, CityGrowthState};
pub use zoning::{ZoneCounts, ZoneType, ZoningParameters};

/// Downtown blocks built by the first growth call.
pub const DOWNTOWN_BLOCKS: usize = 4;

/// What one growth call did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GrowthReport {
    /// Blocks built toward the requested count (downtown included)
    pub blocks_added: usize,
    /// Extra blocks built at the far end of bridges
    pub landing_blocks: usize,
    pub bridges_built: u32,
    /// The placement search ran dry and the expansion band was raised
    pub exhausted: bool,
    /// Expansion band after the call
    pub band: u32,
}

/// Grow the city by up to `blocks_to_add` blocks.
///
/// The first call builds the downtown; the blocks of it that fit count toward
/// the request. A search that runs dry raises the expansion band and ends the call early;
/// that is reported, not returned as an error.
pub fn grow_city<R: Rng + ?Sized>(
    grid: &mut LandGrid,
    state: &mut CityGrowthState,
    blocks_to_add: usize,
    params: &CityParams,
    rng: &mut R,
) -> Result<GrowthReport> {
    let mut report = GrowthReport::default();
    let mut remaining = blocks_to_add;

    if !state.downtown_built && remaining > 0 {
        let built = build::build_downtown(grid, state, params.initial_block_size);
        report.blocks_added += built;
        remaining = remaining.saturating_sub(built);
    }

    let sizes = WeightedTable::new(&params.block_size_weights)?;
    while remaining > 0 {
        let zone = zoning::choose_zone(&state.rci_counts, params, rng)?;
        let (width, height) = (sizes.sample(rng), sizes.sample(rng));

        match placement::find_placement(grid, state, width, height, params, rng) {
            Ok(rect) => {
                let index = build::build_block(grid, state, rect, zone, ZoningParameters::None);
                let bridges = bridges::build_bridges(grid, state, index, params, rng)?;
                report.blocks_added += 1;
                report.bridges_built += bridges;
                report.landing_blocks += bridges as usize;
                remaining -= 1;
            }
            Err(err) if err.is_recoverable() => {
                state.current_expansion_band += 1;
                report.exhausted = true;
                debug!(%err, band = state.current_expansion_band, "placement exhausted, band raised");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    report.band = state.current_expansion_band;
    info!(
        added = report.blocks_added,
        bridges = report.bridges_built,
        band = report.band,
        total = state.block_count(),
        "city grown"
    );
    Ok(report)
}
