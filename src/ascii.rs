//! ASCII rendering of land grids
//!
//! North is up: the first line printed is the top row of the map.

use std::collections::HashMap;

use crate::city::{CityGrowthState, ZoneType, ZoningParameters};
use crate::coords::GridCoordinate;
use crate::grid::LandGrid;
use crate::plot::{LandPlot, TerrainBand};

/// Get ASCII character for a terrain band
pub fn band_char(band: TerrainBand) -> char {
    match band {
        TerrainBand::Wettest => '"',
        TerrainBand::Wet => ',',
        TerrainBand::Normal => '.',
        TerrainBand::Dry => '\'',
        TerrainBand::Driest => ' ',
    }
}

/// Get ASCII character for a single plot, given the zone of its block if any
pub fn plot_char(plot: &LandPlot, zone: Option<ZoneType>) -> char {
    if plot.has_bridge {
        return '=';
    }
    if plot.is_water {
        return '~';
    }
    if plot.has_road {
        return if plot.is_crosswalk { ':' } else { '#' };
    }
    if let Some(zone) = zone {
        return zone.letter();
    }
    plot.terrain_band.map(band_char).unwrap_or('?')
}

/// Render the grid, with city lots lettered by zone and fountains as `*`.
pub fn render(grid: &LandGrid, city: Option<&CityGrowthState>) -> String {
    let mut zones: HashMap<GridCoordinate, ZoneType> = HashMap::new();
    let mut fountains = Vec::new();
    if let Some(city) = city {
        for block in &city.blocks {
            for at in block.tiles.iter().flatten() {
                zones.insert(*at, block.zone_type);
            }
            if block.zoning_parameters == ZoningParameters::Fountain {
                fountains.push(block.center());
            }
        }
    }

    let size = grid.size();
    let mut output = String::with_capacity((size + 1) * size);
    for y in (0..size).rev() {
        for x in 0..size {
            let at = GridCoordinate::from((x, y));
            let ch = if fountains.contains(&at) {
                '*'
            } else {
                plot_char(grid.get(x, y), zones.get(&at).copied())
            };
            output.push(ch);
        }
        output.push('\n');
    }
    output
}

/// Legend for [`render`].
pub fn legend() -> String {
    let mut lines = vec![
        "~ water   = bridge   # road   : crosswalk   * fountain".to_string(),
    ];
    let bands: Vec<String> = TerrainBand::ALL
        .iter()
        .map(|b| format!("'{}' {}", band_char(*b), b.display_name()))
        .collect();
    lines.push(bands.join("   "));
    let zones: Vec<String> = ZoneType::ALL
        .iter()
        .map(|z| format!("{} {:?}", z.letter(), z))
        .collect();
    lines.push(zones.join("   "));
    lines.join("\n")
}
