//! River path synthesis
//!
//! A river is drawn by a "pen" that starts on a border pushed `border_offset`
//! tiles outside the map and walks inward one tile per step, stamping a row
//! of water perpendicular to its heading. Width and heading drift over time
//! under rate limits; turns are back-filled so the path never has diagonal
//! gaps. Tiles that land in the off-map margin are kept until moisture
//! diffusion has used them as seeds, then trimmed.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet, VecDeque};

use pathfinding::prelude::connected_components;
use rand::Rng;
use tracing::debug;

use crate::config::RiverParams;
use crate::coords::{Direction, GridCoordinate};
use crate::error::{GenerationError, Result};
use crate::grid::TilePlacer;
use crate::weighted::WeightedTable;

/// Map edge a river enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiverEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl RiverEdge {
    const ALL: [RiverEdge; 4] = [RiverEdge::Top, RiverEdge::Bottom, RiverEdge::Left, RiverEdge::Right];

    /// Initial heading: straight across the map, away from the edge.
    pub fn inward_direction(&self) -> Direction {
        match self {
            RiverEdge::Top => Direction::South,
            RiverEdge::Bottom => Direction::North,
            RiverEdge::Left => Direction::East,
            RiverEdge::Right => Direction::West,
        }
    }
}

/// All tiles claimed by one river, in emission order (duplicates allowed).
#[derive(Clone, Debug)]
pub struct RiverPath {
    pub tiles: Vec<GridCoordinate>,
    pub start: GridCoordinate,
    pub edge: RiverEdge,
    /// Pen steps taken before the river left the expanded border
    pub steps: usize,
}

impl RiverPath {
    pub fn off_map_tiles(&self, map_size: usize) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.tiles.iter().copied().filter(move |t| !t.in_bounds(map_size))
    }

    pub fn in_map_tiles(&self, map_size: usize) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.tiles.iter().copied().filter(move |t| t.in_bounds(map_size))
    }

    /// Drop the off-map margin once moisture diffusion is done with it.
    pub fn trim_to_map(&mut self, map_size: usize) {
        self.tiles.retain(|t| t.in_bounds(map_size));
    }

    pub fn unique_tiles(&self) -> HashSet<GridCoordinate> {
        self.tiles.iter().copied().collect()
    }

    /// True if every tile reaches every other through 8-neighbor steps.
    pub fn is_connected(&self) -> bool {
        let tiles = self.unique_tiles();
        let Some(&first) = tiles.iter().next() else {
            return true;
        };

        let mut seen = HashSet::with_capacity(tiles.len());
        let mut queue = VecDeque::new();
        seen.insert(first);
        queue.push_back(first);

        while let Some(tile) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = tile.step(dir);
                if tiles.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        seen.len() == tiles.len()
    }

    /// Keep only the largest 8-connected in-map piece. A row cut by the map
    /// edge can leave a corner of it on the map, cut off from the rest.
    /// Off-map tiles stay for moisture seeding.
    pub fn drop_stray_fragments(&mut self, map_size: usize) -> usize {
        let lookup: BTreeSet<GridCoordinate> = self.in_map_tiles(map_size).collect();
        let inside: Vec<GridCoordinate> = lookup.iter().copied().collect();
        let components = connected_components(&inside, |tile| {
            Direction::ALL
                .iter()
                .map(|dir| tile.step(*dir))
                .filter(|next| lookup.contains(next))
                .collect::<Vec<_>>()
        });
        if components.len() <= 1 {
            return 0;
        }

        // Equal sizes go to the piece holding the smallest tile.
        let Some(keep) = components
            .into_iter()
            .max_by_key(|c| (c.len(), Reverse(c.iter().min().copied())))
        else {
            return 0;
        };
        let before = self.tiles.len();
        self.tiles.retain(|t| !t.in_bounds(map_size) || keep.contains(t));
        before - self.tiles.len()
    }

    /// Write the in-map part of the river as water.
    pub fn apply<P: TilePlacer>(&self, placer: &mut P, map_size: usize) {
        let mut placed = HashSet::new();
        for tile in self.in_map_tiles(map_size) {
            if placed.insert(tile) {
                placer.place_water(tile);
            }
        }
    }
}

/// Generate `count` rivers on a `map_size` map.
pub fn generate_rivers<R: Rng + ?Sized>(
    map_size: usize,
    count: usize,
    params: &RiverParams,
    rng: &mut R,
) -> Result<Vec<RiverPath>> {
    let mut rivers = Vec::with_capacity(count);
    for index in 0..count {
        let river = generate_river(map_size, params, rng)?;
        debug!(
            river = index,
            edge = ?river.edge,
            start = %river.start,
            steps = river.steps,
            tiles = river.tiles.len(),
            "river traced"
        );
        rivers.push(river);
    }
    Ok(rivers)
}

/// Pick a start tile on the expanded border, away from the corners.
fn pick_start<R: Rng + ?Sized>(
    map_size: usize,
    params: &RiverParams,
    rng: &mut R,
) -> Result<(GridCoordinate, RiverEdge)> {
    let size = map_size as i32;
    let offset = params.border_offset;
    let margin = params.effective_corner_margin(map_size) as i32;

    for _ in 0..params.max_start_attempts {
        let edge = RiverEdge::ALL[rng.gen_range(0..4)];
        let along = rng.gen_range(-offset..size + offset);
        if along < margin || along >= size - margin {
            continue;
        }
        let start = match edge {
            RiverEdge::Top => GridCoordinate::new(along, size - 1 + offset),
            RiverEdge::Bottom => GridCoordinate::new(along, -offset),
            RiverEdge::Left => GridCoordinate::new(-offset, along),
            RiverEdge::Right => GridCoordinate::new(size - 1 + offset, along),
        };
        return Ok((start, edge));
    }

    Err(GenerationError::RiverSeedNotFound {
        attempts: params.max_start_attempts,
    })
}

/// Offsets across the river, centered on the pen: `width` values.
fn span(width: i32) -> std::ops::RangeInclusive<i32> {
    -((width - 1) / 2)..=width / 2
}

/// Stamp one row of `width` tiles perpendicular to `dir`. Diagonal rows are
/// doubled along x so consecutive rows share edges.
fn emit_row(tiles: &mut Vec<GridCoordinate>, pen: GridCoordinate, dir: Direction, width: i32) {
    let (dx, dy) = dir.offset();
    let (px, py) = (-dy, dx);
    for k in span(width) {
        let tile = pen.offset(px * k, py * k);
        tiles.push(tile);
        if dir.is_diagonal() {
            tiles.push(tile.offset(dx, 0));
        }
    }
}

/// Fill the corner left behind when the heading changes at `pivot`: the new
/// heading's row through the pivot, plus the square the two rows overlap in.
fn emit_turn_backfill(tiles: &mut Vec<GridCoordinate>, pivot: GridCoordinate, new_dir: Direction, width: i32) {
    emit_row(tiles, pivot, new_dir, width);
    for oy in span(width) {
        for ox in span(width) {
            tiles.push(pivot.offset(ox, oy));
        }
    }
}

fn beyond_border(pen: GridCoordinate, map_size: usize, offset: i32) -> bool {
    let far = map_size as i32 - 1 + offset;
    pen.x < -offset || pen.y < -offset || pen.x > far || pen.y > far
}

/// Trace a single river.
pub fn generate_river<R: Rng + ?Sized>(
    map_size: usize,
    params: &RiverParams,
    rng: &mut R,
) -> Result<RiverPath> {
    let (start, edge) = pick_start(map_size, params, rng)?;
    let (min_width, max_width) = params.width_limits(map_size);
    let width_deltas = WeightedTable::new(&params.width_delta_weights)?;
    let turns = WeightedTable::new(&[
        (0, params.keep_direction_weight),
        (-1, params.turn_left_weight),
        (1, params.turn_right_weight),
    ])?;

    let initial = edge.inward_direction();
    let mut direction = initial;
    let mut width = rng.gen_range(min_width..=max_width);
    let mut pen = start;
    let mut tiles = Vec::new();
    let mut since_turn = 0u32;
    let mut since_width = 0u32;
    let mut entered = false;
    let mut exited = false;
    let mut steps = 0;

    emit_row(&mut tiles, pen, direction, width);

    while steps < params.max_steps {
        steps += 1;

        let inside = pen.in_bounds(map_size);
        entered |= inside;
        // Once the pen has left the map it keeps its heading, so the river
        // cannot come back in as a second piece.
        exited |= entered && !inside;

        let mut next_direction = direction;
        if inside && !exited && since_turn >= params.turn_interval {
            let dampened = steps <= params.dampening_steps as usize;
            let chance = if dampened {
                params.turn_chance * params.dampening_factor
            } else {
                params.turn_chance
            };
            if rng.gen_bool(chance) {
                let candidate = direction.rotate(turns.sample(rng));
                // Never head back toward the start edge.
                let limit = if dampened { 1 } else { 2 };
                if candidate != direction && candidate.turn_distance(initial) <= limit {
                    next_direction = candidate;
                }
            }
        }

        if since_width >= params.width_change_interval && rng.gen_bool(params.width_change_chance) {
            let new_width = (width + width_deltas.sample(rng)).clamp(min_width, max_width);
            if new_width != width {
                // Transition row at the current pen so the width step is smooth.
                emit_row(&mut tiles, pen, direction, new_width);
                width = new_width;
                since_width = 0;
            }
        }

        let pivot = pen;
        pen = pen.step(next_direction);
        if next_direction != direction {
            emit_turn_backfill(&mut tiles, pivot, next_direction, width);
            direction = next_direction;
            since_turn = 0;
        }
        emit_row(&mut tiles, pen, direction, width);

        since_turn += 1;
        since_width += 1;

        if beyond_border(pen, map_size, params.border_offset) {
            break;
        }
    }

    if steps >= params.max_steps {
        debug!(steps, "river hit the step cap");
    }

    let mut river = RiverPath {
        tiles,
        start,
        edge,
        steps,
    };
    let dropped = river.drop_stray_fragments(map_size);
    if dropped > 0 {
        debug!(dropped, "stray edge tiles dropped from river");
    }
    Ok(river)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_start_avoids_corners() {
        let params = RiverParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let (start, edge) = pick_start(200, &params, &mut rng).unwrap();
            let along = match edge {
                RiverEdge::Top | RiverEdge::Bottom => start.x,
                RiverEdge::Left | RiverEdge::Right => start.y,
            };
            assert!((25..175).contains(&along), "start {} too close to a corner", start);
        }
    }

    #[test]
    fn test_initial_direction_follows_edge() {
        assert_eq!(RiverEdge::Top.inward_direction(), Direction::South);
        assert_eq!(RiverEdge::Left.inward_direction(), Direction::East);
    }

    #[test]
    fn test_start_search_fails_fast() {
        let params = RiverParams {
            max_start_attempts: 0,
            ..RiverParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = generate_river(64, &params, &mut rng).unwrap_err();
        assert!(matches!(err, GenerationError::RiverSeedNotFound { attempts: 0 }));
    }

    #[test]
    fn test_river_crosses_map_and_stays_connected() {
        let params = RiverParams::default();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut river = generate_river(96, &params, &mut rng).unwrap();
            assert!(river.steps < params.max_steps, "seed {} never left the map", seed);
            assert!(river.off_map_tiles(96).count() > 0);

            river.trim_to_map(96);
            assert!(river.tiles.iter().all(|t| t.in_bounds(96)));
            assert!(river.is_connected(), "seed {} produced a split river", seed);
        }
    }

    #[test]
    fn test_every_tile_has_a_neighbor() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut river = generate_river(50, &RiverParams::default(), &mut rng).unwrap();
        river.trim_to_map(50);
        let tiles = river.unique_tiles();
        assert!(tiles.len() > 1);
        for tile in &tiles {
            assert!(tiles.iter().any(|other| tile.is_adjacent_8(other)));
        }
    }

    #[test]
    fn test_rivers_stay_whole_across_sizes_and_seeds() {
        let params = RiverParams::default();
        for size in [24usize, 30, 50, 64, 100, 200] {
            for seed in 0..150 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let rivers = generate_rivers(size, 3, &params, &mut rng).unwrap();
                for (index, mut river) in rivers.into_iter().enumerate() {
                    river.trim_to_map(size);
                    assert!(
                        river.is_connected(),
                        "size {} seed {} river {} is split",
                        size,
                        seed,
                        index
                    );
                }
            }
        }
    }

    #[test]
    fn test_stray_edge_corner_is_dropped() {
        // Main body along x = 5..8, plus a lone tile at the east edge and an
        // off-map tile beside it.
        let mut tiles: Vec<GridCoordinate> = (0..10)
            .flat_map(|y| (5..8).map(move |x| GridCoordinate::new(x, y)))
            .collect();
        tiles.push(GridCoordinate::new(9, 4));
        tiles.push(GridCoordinate::new(10, 5));
        let mut river = RiverPath {
            tiles,
            start: GridCoordinate::new(6, -3),
            edge: RiverEdge::Bottom,
            steps: 12,
        };

        assert_eq!(river.drop_stray_fragments(10), 1);
        assert!(!river.tiles.contains(&GridCoordinate::new(9, 4)));
        assert!(river.tiles.contains(&GridCoordinate::new(10, 5)));
        river.trim_to_map(10);
        assert!(river.is_connected());
        assert_eq!(river.unique_tiles().len(), 30);
    }

    #[test]
    fn test_rows_have_requested_width() {
        let mut tiles = Vec::new();
        emit_row(&mut tiles, GridCoordinate::new(10, 10), Direction::North, 5);
        let xs: Vec<i32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![12, 11, 10, 9, 8]);
        assert!(tiles.iter().all(|t| t.y == 10));

        tiles.clear();
        emit_row(&mut tiles, GridCoordinate::new(0, 0), Direction::East, 4);
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.x == 0));
    }

    #[test]
    fn test_diagonal_rows_leave_no_gaps() {
        let mut tiles = Vec::new();
        let pen = GridCoordinate::new(0, 0);
        emit_row(&mut tiles, pen, Direction::NorthEast, 3);
        emit_row(&mut tiles, pen.step(Direction::NorthEast), Direction::NorthEast, 3);
        let path = RiverPath {
            tiles,
            start: pen,
            edge: RiverEdge::Bottom,
            steps: 1,
        };
        assert!(path.is_connected());
        // The fill makes the two rows 4-connected along x.
        let set = path.unique_tiles();
        assert!(set.contains(&GridCoordinate::new(1, 0)));
        assert!(set.contains(&GridCoordinate::new(2, 1)));
    }
}
