use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use township_generator::adjacency::is_illegal_road_mask;
use township_generator::city::{grow_city, CityGrowthState, ZoneType, ZoningParameters};
use township_generator::config::{CityParams, GenerationConfig};
use township_generator::coords::GridCoordinate;
use township_generator::grid::{LandGrid, TilePlacer};
use township_generator::plot::{TerrainBand, CITY_OWNER, UNOWNED};
use township_generator::{generate_map, Township};

/// Every city-map claim matches a lot or road, and every lot and road is claimed.
fn assert_city_containment(grid: &LandGrid, city: &CityGrowthState) {
    for (at, plot) in grid.iter() {
        if plot.has_object() || plot.has_road {
            assert!(city.is_claimed(at), "unclaimed city tile at {}", at);
        }
    }
    for at in city.claimed_tiles() {
        let plot = grid.plot(at);
        assert!(plot.has_object() || plot.has_road, "claimed empty tile at {}", at);
    }
}

fn assert_roads_legal(grid: &LandGrid) {
    for at in grid.road_tiles() {
        let mask = grid.road_mask(at);
        assert!(!is_illegal_road_mask(mask), "illegal road mask {} at {}", mask, at);
    }
}

#[test]
fn test_same_seed_same_map() {
    let a = generate_map(64, 1000.0, 2, 1234).unwrap();
    let b = generate_map(64, 1000.0, 2, 1234).unwrap();
    assert_eq!(a.grid, b.grid);
    assert_eq!(a.moisture, b.moisture);

    let c = generate_map(64, 1000.0, 2, 1235).unwrap();
    assert_ne!(a.grid, c.grid);
}

#[test]
fn test_same_seed_same_city() {
    let config = GenerationConfig::new(96, 1000.0, 1);
    let mut a = Township::generate(&config, 77).unwrap();
    let mut b = Township::generate(&config, 77).unwrap();
    a.grow(12).unwrap();
    b.grow(12).unwrap();
    assert_eq!(a.map.grid, b.map.grid);
    assert_eq!(a.city.blocks, b.city.blocks);
}

#[test]
fn test_every_cell_is_water_or_banded_land() {
    for seed in 0..5 {
        let map = generate_map(48, 1000.0, 1 + seed as usize % 2, seed).unwrap();
        for (at, plot) in map.grid.iter() {
            assert!(
                plot.is_water != plot.terrain_band.is_some(),
                "cell {} is both or neither",
                at
            );
            assert!(plot.is_consistent());
        }
    }
}

#[test]
fn test_wetter_cells_are_never_drier() {
    let map = generate_map(80, 1000.0, 2, 99).unwrap();
    let mut cells: Vec<(i32, TerrainBand)> = map
        .grid
        .iter()
        .filter_map(|(at, plot)| {
            let (x, y) = at.as_usize();
            plot.terrain_band.map(|band| (map.moisture.get(x, y), band))
        })
        .collect();
    cells.sort();
    for pair in cells.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "{:?} is drier than {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_rivers_are_single_connected_paths() {
    for seed in 0..10 {
        let map = generate_map(72, 1000.0, 2, seed).unwrap();
        for river in &map.rivers {
            let tiles = river.unique_tiles();
            assert!(!tiles.is_empty());
            assert!(river.is_connected(), "seed {} split a river", seed);
            for tile in &tiles {
                assert!(tile.in_bounds(72));
                if tiles.len() > 1 {
                    assert!(tiles.iter().any(|o| tile.is_adjacent_8(o)));
                }
            }
        }
    }
}

#[test]
fn test_small_map_downtown_scenario() {
    let mut map = generate_map(50, 1000.0, 1, 42).unwrap();
    let params = CityParams::default();
    let mut city = CityGrowthState::found(&map.grid, &params, &mut map.rng);
    let report = grow_city(&mut map.grid, &mut city, 4, &params, &mut map.rng).unwrap();

    assert_eq!(report.blocks_added, 4);
    assert_eq!(city.blocks.len(), 4);
    assert!(city.blocks.iter().all(|b| b.footprint == (5, 5)));

    let count = |zone: ZoneType| city.blocks.iter().filter(|b| b.zone_type == zone).count();
    assert_eq!(count(ZoneType::Special), 1);
    assert_eq!(count(ZoneType::Residential), 2);
    assert_eq!(count(ZoneType::Commercial), 1);
    assert!(city
        .blocks
        .iter()
        .any(|b| b.zone_type == ZoneType::Special && b.zoning_parameters == ZoningParameters::Fountain));

    let mut seen = HashSet::new();
    for block in &city.blocks {
        for at in block.tiles.iter().flatten() {
            assert!(seen.insert(*at), "blocks overlap at {}", at);
        }
    }

    assert_city_containment(&map.grid, &city);
    assert_roads_legal(&map.grid);
}

#[test]
fn test_grown_city_keeps_invariants() {
    for seed in [3u64, 8, 21] {
        let mut township = Township::generate(&GenerationConfig::new(128, 1000.0, 2), seed).unwrap();
        township.grow(30).unwrap();

        let grid = &township.map.grid;
        assert_city_containment(grid, &township.city);
        assert_roads_legal(grid);
        assert!(grid.iter().all(|(_, p)| p.is_consistent()));

        let bridge_tiles = grid.iter().filter(|(_, p)| p.has_bridge).count();
        assert_eq!(bridge_tiles > 0, township.city.bridges_built > 0);
        assert_eq!(township.city.rci_counts.total() as usize, township.city.blocks.len());
    }
}

#[test]
fn test_exhausted_search_raises_band_instead_of_failing() {
    // A dry island that fits the downtown and nothing else.
    let mut grid = LandGrid::new(30);
    let middle = GridCoordinate::new(15, 15);
    for y in 0..30 {
        for x in 0..30 {
            let at = GridCoordinate::new(x, y);
            if at.chebyshev(&middle) > 6 {
                grid.place_water(at);
            }
        }
    }

    let params = CityParams::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut city = CityGrowthState::found(&grid, &params, &mut rng);
    assert_eq!(city.city_center, middle);
    grow_city(&mut grid, &mut city, 4, &params, &mut rng).unwrap();
    let band = city.current_expansion_band;

    let report = grow_city(&mut grid, &mut city, 25, &params, &mut rng).unwrap();
    assert!(report.exhausted);
    assert_eq!(report.blocks_added, 0);
    assert_eq!(city.current_expansion_band, band + 1);
    assert_eq!(city.blocks.len(), 4);
}

#[test]
fn test_read_accessors() {
    let mut township = Township::generate(&GenerationConfig::new(64, 800.0, 1), 10).unwrap();
    township.grow(4).unwrap();
    let grid = &township.map.grid;
    let center = township.city.city_center;
    let (cx, cy) = center.as_usize();

    assert!(grid.has_road(cx, cy));
    assert!(!grid.is_water(cx, cy));
    assert_eq!(grid.owner_of(cx, cy), CITY_OWNER);
    let (ux, uy) = grid
        .iter()
        .find(|(at, _)| !township.city.is_claimed(*at))
        .map(|(at, _)| at.as_usize())
        .unwrap();
    assert_eq!(grid.owner_of(ux, uy), UNOWNED);
    let value = grid.current_land_value(cx + 1, cy + 1);
    assert!(value > 800.0 * 0.85 && value < 800.0 * 1.4);
}

#[test]
fn test_river_split_map_still_grows_a_city() {
    // Two rivers cross in the middle and no dry 13x13 site is left.
    let mut grid = LandGrid::new(30);
    for i in 0..30 {
        for w in 14..=16 {
            grid.place_water(GridCoordinate::new(w, i));
            grid.place_water(GridCoordinate::new(i, w));
        }
    }

    let params = CityParams::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut city = CityGrowthState::found(&grid, &params, &mut rng);
    assert_eq!(city.city_center, GridCoordinate::new(8, 8));

    let first = grow_city(&mut grid, &mut city, 4, &params, &mut rng).unwrap();
    assert!(first.blocks_added > 0);
    grow_city(&mut grid, &mut city, 6, &params, &mut rng).unwrap();

    assert!(!city.blocks.is_empty());
    assert_eq!(city.rci_counts.total() as usize, city.blocks.len());
    assert_city_containment(&grid, &city);
    assert_roads_legal(&grid);
}
