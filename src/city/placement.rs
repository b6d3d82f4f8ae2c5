//! Block placement validation and the wave search
//!
//! A candidate block is legal when its lots sit on free dry land, its road
//! ring only crosses free land or existing roads, everything lies inside the
//! map and the city frame, and the roads it adds leave no road tile with an
//! illegal 8-neighbor mask.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::adjacency::{is_illegal_road_mask, neighbor_mask};
use crate::config::CityParams;
use crate::coords::{Direction, GridCoordinate};
use crate::error::{GenerationError, Result};
use crate::grid::LandGrid;
use crate::plot::CITY_OWNER;

use super::state::{BlockRect, CityGrowthState};

/// Usable for a lot: on the map, in the frame, dry, roadless and unclaimed.
fn lot_is_free(grid: &LandGrid, state: &CityGrowthState, at: GridCoordinate) -> bool {
    let Some(plot) = grid.try_plot(at) else {
        return false;
    };
    state.in_frame(at)
        && !plot.is_water
        && !plot.has_road
        && plot.owner_id <= CITY_OWNER
        && !state.is_claimed(at)
}

/// Usable for a road: dry and either unclaimed or already a road.
fn road_is_free(grid: &LandGrid, state: &CityGrowthState, at: GridCoordinate) -> bool {
    let Some(plot) = grid.try_plot(at) else {
        return false;
    };
    state.in_frame(at)
        && !plot.is_water
        && plot.owner_id <= CITY_OWNER
        && (plot.has_road || !state.is_claimed(at))
}

/// True if laying `new_roads` on top of the existing network leaves every road
/// tile in their neighborhood with a legal mask.
pub fn roads_stay_legal(grid: &LandGrid, new_roads: &HashSet<GridCoordinate>) -> bool {
    let is_road = |c: GridCoordinate| {
        new_roads.contains(&c) || grid.try_plot(c).is_some_and(|p| p.has_road)
    };

    let mut checked = HashSet::new();
    for tile in new_roads {
        for at in std::iter::once(*tile).chain(Direction::ALL.iter().map(|d| tile.step(*d))) {
            if !checked.insert(at) || !is_road(at) {
                continue;
            }
            if is_illegal_road_mask(neighbor_mask(at, is_road)) {
                return false;
            }
        }
    }
    true
}

/// Full legality check for a block, with `extra_roads` (a bridge span) laid
/// at the same time as the ring.
pub fn is_valid_placement(
    grid: &LandGrid,
    state: &CityGrowthState,
    rect: &BlockRect,
    extra_roads: &[GridCoordinate],
) -> bool {
    if !rect.tiles().into_iter().all(|t| lot_is_free(grid, state, t)) {
        return false;
    }
    let ring = rect.ring();
    if !ring.iter().all(|t| road_is_free(grid, state, *t)) {
        return false;
    }

    let new_roads: HashSet<GridCoordinate> = ring
        .into_iter()
        .chain(extra_roads.iter().copied())
        .filter(|t| !grid.try_plot(*t).is_some_and(|p| p.has_road))
        .collect();
    roads_stay_legal(grid, &new_roads)
}

/// Origins of a `width` x `height` block touching `anchor` from `dir`, sharing
/// its ring. Corners touch at one ring corner; edges align with either end.
pub fn neighbor_origins(anchor: &BlockRect, dir: Direction, width: usize, height: usize) -> Vec<GridCoordinate> {
    let (w, h) = (width as i32, height as i32);
    let east = anchor.max_x() + 2;
    let west = anchor.origin.x - 1 - w;
    let north = anchor.max_y() + 2;
    let south = anchor.origin.y - 1 - h;
    let (ax, ay) = (anchor.origin.x, anchor.origin.y);
    let (ax_end, ay_end) = (anchor.max_x() + 1 - w, anchor.max_y() + 1 - h);

    let mut origins = match dir {
        Direction::NorthEast => vec![GridCoordinate::new(east, north)],
        Direction::SouthEast => vec![GridCoordinate::new(east, south)],
        Direction::SouthWest => vec![GridCoordinate::new(west, south)],
        Direction::NorthWest => vec![GridCoordinate::new(west, north)],
        Direction::North => vec![GridCoordinate::new(ax, north), GridCoordinate::new(ax_end, north)],
        Direction::South => vec![GridCoordinate::new(ax, south), GridCoordinate::new(ax_end, south)],
        Direction::East => vec![GridCoordinate::new(east, ay), GridCoordinate::new(east, ay_end)],
        Direction::West => vec![GridCoordinate::new(west, ay), GridCoordinate::new(west, ay_end)],
    };
    origins.dedup();
    origins
}

/// Existing blocks grouped into waves by distance from the city center,
/// innermost first, shuffled within each wave.
fn waves<R: Rng + ?Sized>(state: &CityGrowthState, bucket: i32, rng: &mut R) -> Vec<Vec<BlockRect>> {
    let mut grouped: BTreeMap<i32, Vec<BlockRect>> = BTreeMap::new();
    for block in &state.blocks {
        let wave = block.center().chebyshev(&state.city_center) / bucket;
        grouped.entry(wave).or_default().push(block.rect());
    }
    grouped
        .into_values()
        .map(|mut wave| {
            wave.shuffle(rng);
            wave
        })
        .collect()
}

/// Tiles at Chebyshev distance exactly `radius` from `center`.
fn ring_around(center: GridCoordinate, radius: i32) -> Vec<GridCoordinate> {
    if radius == 0 {
        return vec![center];
    }
    (-radius..=radius)
        .flat_map(|dy| (-radius..=radius).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx.abs() == radius || dy.abs() == radius)
        .map(|(dx, dy)| center.offset(dx, dy))
        .collect()
}

/// Placement for a city with no blocks yet, which happens when none of the
/// downtown fit around a wet center. Blocks are centered on tiles ever
/// further from the city center, out to `wave_bucket` tiles per band.
fn find_seed_placement<R: Rng + ?Sized>(
    grid: &LandGrid,
    state: &CityGrowthState,
    width: usize,
    height: usize,
    params: &CityParams,
    rng: &mut R,
) -> Result<BlockRect> {
    let band = state.current_expansion_band;
    let reach = params.wave_bucket * band as i32;
    let (half_w, half_h) = (width as i32 / 2, height as i32 / 2);
    let mut candidates = 0usize;

    for radius in 0..=reach {
        let mut ring = ring_around(state.city_center, radius);
        ring.shuffle(rng);
        for at in ring {
            candidates += 1;
            let rect = BlockRect::new(at.offset(-half_w, -half_h), width, height);
            if is_valid_placement(grid, state, &rect, &[]) {
                debug!(origin = %rect.origin, radius, "block placed around the city center");
                return Ok(rect);
            }
        }
    }
    Err(GenerationError::BlockPlacementExhausted { band, candidates })
}

/// Find a legal spot for a `width` x `height` block next to an existing one.
///
/// Only the innermost `current_expansion_band` waves are searched. Corner
/// directions are tried before edges, each with a chance of being skipped.
/// Fails with [`GenerationError::BlockPlacementExhausted`] once every
/// candidate was rejected or the candidate cap was hit. A city without blocks
/// searches outward from its center instead.
pub fn find_placement<R: Rng + ?Sized>(
    grid: &LandGrid,
    state: &CityGrowthState,
    width: usize,
    height: usize,
    params: &CityParams,
    rng: &mut R,
) -> Result<BlockRect> {
    if state.blocks.is_empty() {
        return find_seed_placement(grid, state, width, height, params, rng);
    }

    let band = state.current_expansion_band;
    let mut candidates = 0usize;
    let exhausted = |candidates| GenerationError::BlockPlacementExhausted { band, candidates };

    for wave in waves(state, params.wave_bucket, rng).into_iter().take(band as usize) {
        for anchor in wave {
            let mut corners = Direction::DIAGONALS;
            let mut edges = Direction::CARDINALS;
            corners.shuffle(rng);
            edges.shuffle(rng);

            let corner_pass = corners.into_iter().map(|d| (d, params.corner_skip_chance));
            let edge_pass = edges.into_iter().map(|d| (d, params.edge_skip_chance));
            for (dir, skip_chance) in corner_pass.chain(edge_pass) {
                if rng.gen_bool(skip_chance) {
                    continue;
                }
                for origin in neighbor_origins(&anchor, dir, width, height) {
                    candidates += 1;
                    if candidates > params.max_placement_candidates {
                        return Err(exhausted(candidates - 1));
                    }
                    let rect = BlockRect::new(origin, width, height);
                    if is_valid_placement(grid, state, &rect, &[]) {
                        return Ok(rect);
                    }
                }
            }
        }
    }

    Err(exhausted(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::state::CityBlock;
    use crate::city::zoning::{ZoneType, ZoningParameters};
    use crate::coords::CoordinateFrame;
    use crate::grid::TilePlacer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_city(size: usize) -> (LandGrid, CityGrowthState) {
        let center = GridCoordinate::new(size as i32 / 2, size as i32 / 2);
        let frame = CoordinateFrame::centered(center, size, size);
        (LandGrid::new(size), CityGrowthState::new(center, frame, 1))
    }

    fn lay(grid: &mut LandGrid, state: &mut CityGrowthState, rect: BlockRect) {
        for t in rect.ring() {
            grid.place_road(t, "road_isolated");
            state.claim(t);
        }
        for t in rect.tiles() {
            grid.place_object(t, 1, CITY_OWNER);
            state.claim(t);
        }
        state.blocks.push(CityBlock::new(1, rect, ZoneType::Residential, ZoningParameters::None));
    }

    #[test]
    fn test_neighbor_origins_share_the_ring() {
        let anchor = BlockRect::new(GridCoordinate::new(10, 10), 5, 5);
        assert_eq!(
            neighbor_origins(&anchor, Direction::East, 3, 3),
            vec![GridCoordinate::new(16, 10), GridCoordinate::new(16, 12)]
        );
        assert_eq!(neighbor_origins(&anchor, Direction::SouthWest, 4, 2), vec![GridCoordinate::new(5, 7)]);
        // Same-size edge neighbors only have one alignment.
        assert_eq!(neighbor_origins(&anchor, Direction::North, 5, 4).len(), 1);
    }

    #[test]
    fn test_adjacent_block_sharing_ring_is_legal() {
        let (mut grid, mut state) = open_city(40);
        lay(&mut grid, &mut state, BlockRect::new(GridCoordinate::new(10, 10), 5, 5));
        let east = BlockRect::new(GridCoordinate::new(16, 10), 3, 4);
        assert!(is_valid_placement(&grid, &state, &east, &[]));
        let corner = BlockRect::new(GridCoordinate::new(16, 16), 3, 3);
        assert!(is_valid_placement(&grid, &state, &corner, &[]));
    }

    #[test]
    fn test_double_width_road_is_rejected() {
        let (mut grid, mut state) = open_city(40);
        lay(&mut grid, &mut state, BlockRect::new(GridCoordinate::new(10, 10), 5, 5));
        // Ring would run right beside the existing east road.
        let beside = BlockRect::new(GridCoordinate::new(17, 10), 3, 3);
        assert!(!is_valid_placement(&grid, &state, &beside, &[]));
    }

    #[test]
    fn test_overlap_and_water_are_rejected() {
        let (mut grid, mut state) = open_city(40);
        lay(&mut grid, &mut state, BlockRect::new(GridCoordinate::new(10, 10), 5, 5));
        assert!(!is_valid_placement(&grid, &state, &BlockRect::new(GridCoordinate::new(13, 13), 3, 3), &[]));

        grid.place_water(GridCoordinate::new(25, 25));
        assert!(!is_valid_placement(&grid, &state, &BlockRect::new(GridCoordinate::new(24, 24), 3, 3), &[]));
        // Ring on water is just as bad.
        assert!(!is_valid_placement(&grid, &state, &BlockRect::new(GridCoordinate::new(26, 26), 3, 3), &[]));
    }

    #[test]
    fn test_off_map_is_rejected() {
        let (grid, state) = open_city(20);
        assert!(!is_valid_placement(&grid, &state, &BlockRect::new(GridCoordinate::new(0, 5), 3, 3), &[]));
        assert!(is_valid_placement(&grid, &state, &BlockRect::new(GridCoordinate::new(1, 5), 3, 3), &[]));
    }

    #[test]
    fn test_search_finds_neighbor_of_existing_block() {
        let (mut grid, mut state) = open_city(60);
        let anchor = BlockRect::new(GridCoordinate::new(28, 28), 5, 5);
        lay(&mut grid, &mut state, anchor);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let rect = find_placement(&grid, &state, 4, 3, &CityParams::default(), &mut rng).unwrap();
        assert!(is_valid_placement(&grid, &state, &rect, &[]));
        let touches = rect.ring().iter().any(|t| anchor.ring().contains(t));
        assert!(touches);
    }

    #[test]
    fn test_search_exhausts_when_boxed_in() {
        let (mut grid, mut state) = open_city(30);
        let anchor = BlockRect::new(GridCoordinate::new(13, 13), 3, 3);
        lay(&mut grid, &mut state, anchor);
        for y in 0..30 {
            for x in 0..30 {
                let at = GridCoordinate::new(x, y);
                if at.chebyshev(&GridCoordinate::new(14, 14)) > 2 {
                    grid.place_water(at);
                }
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = find_placement(&grid, &state, 3, 3, &CityParams::default(), &mut rng).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_empty_city_places_around_its_center() {
        let (mut grid, state) = open_city(40);
        // Water over the center and its near surroundings.
        for y in 16..=24 {
            for x in 16..=24 {
                grid.place_water(GridCoordinate::new(x, y));
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let rect = find_placement(&grid, &state, 4, 4, &CityParams::default(), &mut rng).unwrap();
        assert!(is_valid_placement(&grid, &state, &rect, &[]));
        assert!(rect.center().chebyshev(&state.city_center) <= 7);
    }

    #[test]
    fn test_empty_city_on_water_exhausts() {
        let (mut grid, state) = open_city(20);
        for y in 0..20 {
            for x in 0..20 {
                grid.place_water(GridCoordinate::new(x, y));
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let err = find_placement(&grid, &state, 3, 3, &CityParams::default(), &mut rng).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_candidate_cap_stops_search() {
        let (mut grid, mut state) = open_city(40);
        lay(&mut grid, &mut state, BlockRect::new(GridCoordinate::new(18, 18), 3, 3));
        let params = CityParams {
            max_placement_candidates: 0,
            ..CityParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = find_placement(&grid, &state, 3, 3, &params, &mut rng).unwrap_err();
        assert!(matches!(err, GenerationError::BlockPlacementExhausted { band: 1, candidates: 0 }));
    }
}
