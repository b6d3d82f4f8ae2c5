//! Choosing where the city starts

use rand::Rng;
use tracing::{debug, warn};

use crate::config::CityParams;
use crate::coords::{CoordinateFrame, GridCoordinate};
use crate::grid::LandGrid;

use super::state::CityGrowthState;

fn clearance_square(center: GridCoordinate, clearance: usize) -> impl Iterator<Item = GridCoordinate> {
    let side = clearance as i32;
    let low = center.offset(-(side / 2), -(side / 2));
    (0..side).flat_map(move |dy| (0..side).map(move |dx| low.offset(dx, dy)))
}

fn is_buildable(grid: &LandGrid, at: GridCoordinate) -> bool {
    grid.try_plot(at).is_some_and(|p| !p.is_water && !p.has_road)
}

/// True if the `clearance` square centered on `center` lies on the map and
/// holds no water.
fn is_dry_square(grid: &LandGrid, center: GridCoordinate, clearance: usize) -> bool {
    clearance_square(center, clearance).all(|at| is_buildable(grid, at))
}

/// Tiles of the `clearance` square that are off the map, water or road.
fn wet_count(grid: &LandGrid, center: GridCoordinate, clearance: usize) -> usize {
    clearance_square(center, clearance)
        .filter(|at| !is_buildable(grid, *at))
        .count()
}

/// Pick a city center whose clearance square is dry.
///
/// Random candidates come first; if none works every legal center is scanned,
/// nearest to the map middle first. A map with no dry site falls back to the
/// site with the fewest wet tiles, so the downtown still has the best chance
/// of fitting.
pub fn find_city_center<R: Rng + ?Sized>(grid: &LandGrid, params: &CityParams, rng: &mut R) -> GridCoordinate {
    let size = grid.size() as i32;
    let clearance = params.seed_clearance as i32;
    let half = clearance / 2;
    let lo = params.seed_edge_offset as i32 + half;
    let hi = size - params.seed_edge_offset as i32 - clearance + half;
    let middle = GridCoordinate::new(size / 2, size / 2);

    if lo > hi {
        warn!(size, clearance, "map too small for a city seed square, using the map middle");
        return middle;
    }

    for attempt in 0..params.max_seed_attempts {
        let candidate = GridCoordinate::new(rng.gen_range(lo..=hi), rng.gen_range(lo..=hi));
        if is_dry_square(grid, candidate, params.seed_clearance) {
            debug!(attempt, center = %candidate, "city seed found");
            return candidate;
        }
    }

    let mut sites: Vec<GridCoordinate> = (lo..=hi)
        .flat_map(|y| (lo..=hi).map(move |x| GridCoordinate::new(x, y)))
        .collect();
    sites.sort_by_key(|c| (c.chebyshev(&middle), (c.x - middle.x).abs() + (c.y - middle.y).abs()));
    if let Some(site) = sites
        .iter()
        .find(|c| is_dry_square(grid, **c, params.seed_clearance))
    {
        debug!(center = %site, "city seed found by scan");
        return *site;
    }

    // Ties keep the scan order, nearest to the middle first.
    let Some((site, wet)) = sites
        .into_iter()
        .map(|c| (c, wet_count(grid, c, params.seed_clearance)))
        .min_by_key(|(_, wet)| *wet)
    else {
        return middle;
    };
    warn!(center = %site, wet, "no dry city site, using the least wet one");
    site
}

impl CityGrowthState {
    /// Pick the city center and set up an empty city around it.
    pub fn found<R: Rng + ?Sized>(grid: &LandGrid, params: &CityParams, rng: &mut R) -> Self {
        let center = find_city_center(grid, params, rng);
        let frame = CoordinateFrame::centered(center, params.local_map_size, grid.size());
        Self::new(center, frame, params.initial_band)
    }
}
