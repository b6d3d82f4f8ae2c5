//! JSON and PNG export of generated townships

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::city::{CityBlock, CityGrowthState, ZoneType};
use crate::coords::GridCoordinate;
use crate::error::Result;
use crate::grid::LandGrid;
use crate::plot::{LandPlot, TerrainBand};
use crate::world::GeneratedMap;

#[derive(Clone, Debug, Serialize)]
pub struct TownshipExport {
    pub metadata: MapMetadata,
    pub rivers: Vec<RiverExport>,
    pub city: Option<CityExport>,
    /// One string per row, north first, in the ASCII map alphabet
    pub rows: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapMetadata {
    pub seed: u64,
    pub map_size: usize,
    pub base_land_value: f32,
    pub river_count: usize,
    pub breakpoints: [i32; 4],
    pub band_counts: [usize; 5],
    pub water_tiles: usize,
    pub road_tiles: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct RiverExport {
    pub start: GridCoordinate,
    pub steps: usize,
    pub tiles: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CityExport {
    pub center: GridCoordinate,
    pub city_map_center: GridCoordinate,
    pub expansion_band: u32,
    pub bridges_built: u32,
    pub zone_counts: Vec<(ZoneType, u32)>,
    pub blocks: Vec<CityBlock>,
}

/// Build the export structure for a map and, optionally, its city.
pub fn build_export(map: &GeneratedMap, city: Option<&CityGrowthState>) -> TownshipExport {
    let metadata = MapMetadata {
        seed: map.seed,
        map_size: map.size(),
        base_land_value: map.config.base_land_value,
        river_count: map.rivers.len(),
        breakpoints: map.breakpoints.values,
        band_counts: map.band_counts,
        water_tiles: map.grid.water_tile_count(),
        road_tiles: map.grid.road_tiles().len(),
    };

    let rivers = map
        .rivers
        .iter()
        .map(|r| RiverExport {
            start: r.start,
            steps: r.steps,
            tiles: r.unique_tiles().len(),
        })
        .collect();

    let city_export = city.map(|c| CityExport {
        center: c.city_center,
        city_map_center: c.city_map_center(),
        expansion_band: c.current_expansion_band,
        bridges_built: c.bridges_built,
        zone_counts: c.rci_counts.iter().collect(),
        blocks: c.blocks.clone(),
    });

    let rows = crate::ascii::render(&map.grid, city)
        .lines()
        .map(str::to_string)
        .collect();

    TownshipExport {
        metadata,
        rivers,
        city: city_export,
        rows,
    }
}

/// Export a map summary to a pretty-printed JSON file
pub fn export_json(map: &GeneratedMap, city: Option<&CityGrowthState>, path: impl AsRef<Path>) -> Result<()> {
    let export = build_export(map, city);
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &export)?;
    Ok(())
}

fn band_color(band: TerrainBand) -> [u8; 3] {
    match band {
        TerrainBand::Wettest => [46, 110, 52],
        TerrainBand::Wet => [74, 140, 66],
        TerrainBand::Normal => [112, 164, 82],
        TerrainBand::Dry => [166, 178, 96],
        TerrainBand::Driest => [200, 186, 120],
    }
}

fn plot_color(plot: &LandPlot) -> [u8; 3] {
    if plot.has_bridge {
        [150, 110, 70]
    } else if plot.is_water {
        [40, 90, 170]
    } else if plot.has_road {
        if plot.is_crosswalk { [235, 235, 235] } else { [70, 70, 70] }
    } else if plot.has_object() {
        [190, 120, 90]
    } else {
        plot.terrain_band.map(band_color).unwrap_or([0, 0, 0])
    }
}

/// Render the grid as an image, `scale` pixels per tile, north up.
pub fn render_png(grid: &LandGrid, scale: u32) -> RgbImage {
    let size = grid.size() as u32;
    let scale = scale.max(1);
    let mut img: RgbImage = ImageBuffer::new(size * scale, size * scale);

    for (at, plot) in grid.iter() {
        let color = plot_color(plot);
        let px = at.x as u32 * scale;
        let py = (size - 1 - at.y as u32) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(px + dx, py + dy, Rgb(color));
            }
        }
    }

    img
}

/// Export the grid as a PNG file
pub fn export_png(grid: &LandGrid, path: impl AsRef<Path>, scale: u32) -> Result<()> {
    render_png(grid, scale).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generate_map;

    #[test]
    fn test_export_summarizes_map() {
        let map = generate_map(32, 1000.0, 1, 7).unwrap();
        let export = build_export(&map, None);
        assert_eq!(export.metadata.map_size, 32);
        assert_eq!(export.rows.len(), 32);
        assert!(export.rows.iter().all(|r| r.chars().count() == 32));
        assert_eq!(export.rivers.len(), 1);
        assert!(export.city.is_none());

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"breakpoints\""));
    }

    #[test]
    fn test_png_is_scaled_and_north_up() {
        let map = generate_map(24, 1000.0, 1, 2).unwrap();
        let img = render_png(&map.grid, 3);
        assert_eq!(img.dimensions(), (72, 72));
        assert_eq!(img.get_pixel(0, 0).0, plot_color(map.grid.get(0, 23)));
        assert_eq!(img.get_pixel(71, 71).0, plot_color(map.grid.get(23, 0)));
        assert_eq!(img.get_pixel(16, 2).0, plot_color(map.grid.get(5, 23)));
    }
}
