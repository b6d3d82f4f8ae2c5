//! Bridges from a freshly built block across water to a landing block.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::CityParams;
use crate::coords::{Direction, GridCoordinate};
use crate::error::Result;
use crate::grid::LandGrid;

use super::build::{build_block, lay_road, refresh_roads};
use super::placement::is_valid_placement;
use super::state::{BlockRect, CityGrowthState};
use super::zoning::{choose_zone, ZoningParameters};

/// A bridge that passed validation and is ready to build.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgePlan {
    /// Ring tile of the block the bridge starts from
    pub foot: GridCoordinate,
    pub direction: Direction,
    /// Water tiles the bridge spans, nearest first
    pub span: Vec<GridCoordinate>,
    /// Landing-sized block on the near bank, inside `from` or on free land
    pub near_landing: BlockRect,
    pub landing: BlockRect,
}

/// Non-corner ring tiles of `rect` with the cardinal direction facing out.
fn ring_edges(rect: &BlockRect) -> Vec<(GridCoordinate, Direction)> {
    let mut edges = Vec::new();
    for x in rect.origin.x..=rect.max_x() {
        edges.push((GridCoordinate::new(x, rect.max_y() + 1), Direction::North));
        edges.push((GridCoordinate::new(x, rect.origin.y - 1), Direction::South));
    }
    for y in rect.origin.y..=rect.max_y() {
        edges.push((GridCoordinate::new(rect.max_x() + 1, y), Direction::East));
        edges.push((GridCoordinate::new(rect.origin.x - 1, y), Direction::West));
    }
    edges
}

/// Landing block whose ring passes through `shore`, centered on the bridge axis.
fn landing_rect(shore: GridCoordinate, dir: Direction, size: usize) -> BlockRect {
    let s = size as i32;
    let origin = match dir {
        Direction::North => GridCoordinate::new(shore.x - s / 2, shore.y + 1),
        Direction::South => GridCoordinate::new(shore.x - s / 2, shore.y - s),
        Direction::East => GridCoordinate::new(shore.x + 1, shore.y - s / 2),
        _ => GridCoordinate::new(shore.x - s, shore.y - s / 2),
    };
    BlockRect::new(origin, size, size)
}

/// Try to plan a bridge from `foot`, a ring tile of block `from`, heading `dir`.
///
/// Both ends need a landing block centered on the bridge axis. On the near
/// bank that is either part of `from` or a free spot beside it.
pub fn plan_bridge(
    grid: &LandGrid,
    state: &CityGrowthState,
    from: &BlockRect,
    foot: GridCoordinate,
    dir: Direction,
    params: &CityParams,
) -> Option<BridgePlan> {
    let near_landing = landing_rect(foot, dir.opposite(), params.initial_block_size);
    let near_ok = near_landing.tiles().into_iter().all(|t| from.contains(t))
        || is_valid_placement(grid, state, &near_landing, &[]);
    if !near_ok {
        return None;
    }

    let open_water = |at: GridCoordinate| grid.try_plot(at).is_some_and(|p| p.is_open_water());

    let mut span = Vec::new();
    let mut at = foot.step(dir);
    while open_water(at) {
        if span.len() == params.max_bridge_length || state.is_claimed(at) || !state.in_frame(at) {
            return None;
        }
        span.push(at);
        at = at.step(dir);
    }
    if span.is_empty() || grid.try_plot(at).is_none() {
        return None;
    }

    let landing = landing_rect(at, dir, params.initial_block_size);
    is_valid_placement(grid, state, &landing, &span).then_some(BridgePlan {
        foot,
        direction: dir,
        span,
        near_landing,
        landing,
    })
}

/// Build up to `current_expansion_band` bridges out of block `block_index`.
/// Returns the number of bridges built; each comes with a landing block.
pub fn build_bridges<R: Rng + ?Sized>(
    grid: &mut LandGrid,
    state: &mut CityGrowthState,
    block_index: usize,
    params: &CityParams,
    rng: &mut R,
) -> Result<u32> {
    let limit = state.current_expansion_band;
    let from = state.blocks[block_index].rect();
    let mut edges = ring_edges(&from);
    edges.shuffle(rng);

    let mut built = 0;
    for (foot, dir) in edges {
        if built >= limit {
            break;
        }
        let Some(plan) = plan_bridge(grid, state, &from, foot, dir, params) else {
            continue;
        };

        for at in &plan.span {
            lay_road(grid, state, *at);
        }
        let zone = choose_zone(&state.rci_counts, params, rng)?;
        build_block(grid, state, plan.landing, zone, ZoningParameters::None);
        refresh_roads(grid, &plan.span);

        state.bridges_built += 1;
        built += 1;
        debug!(
            from = %plan.foot,
            direction = ?plan.direction,
            length = plan.span.len(),
            "bridge built"
        );
    }
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::is_illegal_road_mask;
    use crate::city::zoning::ZoneType;
    use crate::coords::CoordinateFrame;
    use crate::grid::TilePlacer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 40x40 grid with a river across rows `river`.
    fn river_city(river: std::ops::Range<i32>) -> (LandGrid, CityGrowthState) {
        let mut grid = LandGrid::new(40);
        for y in river {
            for x in 0..40 {
                grid.place_water(GridCoordinate::new(x, y));
            }
        }
        let center = GridCoordinate::new(20, 10);
        let frame = CoordinateFrame::centered(center, 40, 40);
        (grid, CityGrowthState::new(center, frame, 1))
    }

    #[test]
    fn test_bridge_spans_river_to_landing() {
        let (mut grid, mut state) = river_city(16..20);
        // Block whose north ring (y = 15) sits on the bank.
        let rect = BlockRect::new(GridCoordinate::new(18, 10), 5, 5);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);

        let plan = plan_bridge(
            &grid,
            &state,
            &rect,
            GridCoordinate::new(20, 15),
            Direction::North,
            &CityParams::default(),
        )
        .unwrap();
        assert_eq!(plan.span.len(), 4);
        assert_eq!(plan.near_landing, rect);
        assert_eq!(plan.landing.origin, GridCoordinate::new(18, 21));

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let built = build_bridges(&mut grid, &mut state, 0, &CityParams::default(), &mut rng).unwrap();
        assert_eq!(built, 1);
        assert_eq!(state.bridges_built, 1);
        assert_eq!(state.blocks.len(), 2);

        let bridges: Vec<_> = grid.iter().filter(|(_, p)| p.has_bridge).collect();
        assert_eq!(bridges.len(), 4);
        for (at, plot) in &bridges {
            assert!(plot.is_consistent());
            assert_eq!(plot.road_key.as_deref(), Some("bridge_ns"));
            assert!(state.is_claimed(*at));
        }
        for at in grid.road_tiles() {
            assert!(!is_illegal_road_mask(grid.road_mask(at)), "illegal mask at {}", at);
        }
    }

    #[test]
    fn test_too_long_crossing_is_refused() {
        let (mut grid, mut state) = river_city(16..32);
        let rect = BlockRect::new(GridCoordinate::new(18, 10), 5, 5);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);
        let params = CityParams::default();
        assert!(plan_bridge(&grid, &state, &rect, GridCoordinate::new(20, 15), Direction::North, &params).is_none());
    }

    #[test]
    fn test_no_landing_room_means_no_bridge() {
        // Far bank is only three tiles deep before more water.
        let (mut grid, mut state) = river_city(16..20);
        for x in 0..40 {
            for y in 23..40 {
                grid.place_water(GridCoordinate::new(x, y));
            }
        }
        let rect = BlockRect::new(GridCoordinate::new(18, 10), 5, 5);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);
        let params = CityParams::default();
        assert!(plan_bridge(&grid, &state, &rect, GridCoordinate::new(20, 15), Direction::North, &params).is_none());
    }

    #[test]
    fn test_small_block_has_no_near_landing() {
        // A 3x3 block on the bank cannot hold a 5x5 landing, and the land
        // around it is taken by its own ring.
        let (mut grid, mut state) = river_city(16..20);
        let rect = BlockRect::new(GridCoordinate::new(19, 12), 3, 3);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);
        let params = CityParams::default();
        assert!(plan_bridge(&grid, &state, &rect, GridCoordinate::new(20, 15), Direction::North, &params).is_none());

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(build_bridges(&mut grid, &mut state, 0, &params, &mut rng).unwrap(), 0);
        assert!(grid.iter().all(|(_, p)| !p.has_bridge));
    }

    #[test]
    fn test_off_center_foot_has_no_near_landing() {
        let (mut grid, mut state) = river_city(16..20);
        let rect = BlockRect::new(GridCoordinate::new(18, 10), 5, 5);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);
        let params = CityParams::default();
        // Centered on x = 18 the near landing would stick out of the block.
        assert!(plan_bridge(&grid, &state, &rect, GridCoordinate::new(18, 15), Direction::North, &params).is_none());
    }

    #[test]
    fn test_dry_edges_build_nothing() {
        let (mut grid, mut state) = river_city(0..0);
        let rect = BlockRect::new(GridCoordinate::new(18, 10), 5, 5);
        build_block(&mut grid, &mut state, rect, ZoneType::Residential, ZoningParameters::None);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(build_bridges(&mut grid, &mut state, 0, &CityParams::default(), &mut rng).unwrap(), 0);
    }
}
