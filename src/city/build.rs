//! Committing blocks to the grid: roads, lots, crosswalks and the downtown.

use tracing::{debug, warn};

use crate::adjacency::{cardinal_count, road_key_for_mask};
use crate::coords::{Direction, GridCoordinate};
use crate::grid::{LandGrid, TilePlacer};
use crate::plot::CITY_OWNER;

use super::placement::is_valid_placement;
use super::DOWNTOWN_BLOCKS;
use super::state::{BlockRect, CityBlock, CityGrowthState};
use super::zoning::{ZoneType, ZoningParameters};

/// Lay a road (or bridge) tile for the city and claim it.
pub(crate) fn lay_road(grid: &mut LandGrid, state: &mut CityGrowthState, at: GridCoordinate) {
    if !grid.plot(at).has_road {
        let is_bridge = grid.plot(at).is_water;
        grid.place_road(at, road_key_for_mask(0, is_bridge));
    }
    grid.plot_mut(at).owner_id = CITY_OWNER;
    state.claim(at);
}

/// A straight road tile with an intersection on one of its cardinal sides.
fn is_crosswalk(grid: &LandGrid, at: GridCoordinate) -> bool {
    let plot = grid.plot(at);
    if !plot.has_road || plot.has_bridge {
        return false;
    }
    let straight = plot
        .road_key
        .as_deref()
        .is_some_and(|key| key.starts_with("road_straight"));
    straight
        && Direction::CARDINALS.iter().any(|dir| {
            let next = at.step(*dir);
            next.in_bounds(grid.size())
                && grid.plot(next).has_road
                && cardinal_count(grid.road_mask(next)) >= 3
        })
}

/// Recompute road keys and crosswalk flags around freshly laid roads.
pub(crate) fn refresh_roads(grid: &mut LandGrid, roads: &[GridCoordinate]) {
    let mut touched: Vec<GridCoordinate> = roads
        .iter()
        .flat_map(|t| std::iter::once(*t).chain(Direction::ALL.iter().map(|d| t.step(*d))))
        .filter(|t| t.in_bounds(grid.size()))
        .collect();
    touched.sort();
    touched.dedup();

    for at in &touched {
        grid.refresh_road_key(*at);
    }
    // Crosswalks depend on the neighbors' final keys.
    for at in &touched {
        let crosswalk = is_crosswalk(grid, *at);
        grid.plot_mut(*at).is_crosswalk = crosswalk;
    }
}

/// Build a validated block: ring roads, lot objects, counters. Returns the
/// index of the new block in `state.blocks`.
pub fn build_block(
    grid: &mut LandGrid,
    state: &mut CityGrowthState,
    rect: BlockRect,
    zone_type: ZoneType,
    zoning_parameters: ZoningParameters,
) -> usize {
    let id = state.allocate_object_id();
    let ring = rect.ring();
    for at in &ring {
        lay_road(grid, state, *at);
    }
    for at in rect.tiles() {
        grid.place_object(at, id, CITY_OWNER);
        state.claim(at);
    }
    refresh_roads(grid, &ring);

    let mut block = CityBlock::new(id, rect, zone_type, zoning_parameters);
    if zoning_parameters == ZoningParameters::Fountain {
        let fountain = state.allocate_object_id();
        grid.place_object(rect.center(), fountain, CITY_OWNER);
        block.available_tiles -= 1;
    }

    state.rci_counts.increment(zone_type);
    state.blocks.push(block);
    debug!(
        id,
        origin = %rect.origin,
        width = rect.width,
        height = rect.height,
        zone = ?zone_type,
        "block built"
    );
    state.blocks.len() - 1
}

/// The four downtown blocks around the city center, with the road cross
/// between them: fountain square, two residential, one commercial.
pub fn downtown_layout(
    center: GridCoordinate,
    block_size: usize,
) -> [(BlockRect, ZoneType, ZoningParameters); DOWNTOWN_BLOCKS] {
    let b = block_size as i32;
    let at = |dx: i32, dy: i32| BlockRect::new(center.offset(dx, dy), block_size, block_size);
    [
        (at(1, 1), ZoneType::Special, ZoningParameters::Fountain),
        (at(-b, 1), ZoneType::Residential, ZoningParameters::None),
        (at(1, -b), ZoneType::Residential, ZoningParameters::None),
        (at(-b, -b), ZoneType::Commercial, ZoningParameters::None),
    ]
}

/// Build the downtown. Blocks that do not fit (only possible when the city
/// fell back to a wet center) are skipped. Returns the number built.
pub fn build_downtown(grid: &mut LandGrid, state: &mut CityGrowthState, block_size: usize) -> usize {
    let mut built = 0;
    for (rect, zone, zoning) in downtown_layout(state.city_center, block_size) {
        if is_valid_placement(grid, state, &rect, &[]) {
            build_block(grid, state, rect, zone, zoning);
            built += 1;
        } else {
            warn!(origin = %rect.origin, zone = ?zone, "downtown block does not fit, skipped");
        }
    }
    state.downtown_built = true;
    built
}
