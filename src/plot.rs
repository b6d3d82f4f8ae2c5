//! Per-cell land state

use serde::{Deserialize, Serialize};

/// Owner id of a plot nobody owns.
pub const UNOWNED: i32 = -1;
/// Owner id of plots claimed by the city.
pub const CITY_OWNER: i32 = 0;
/// Object id meaning "nothing on this tile".
pub const NO_OBJECT: u32 = 0;

/// The five ordered wetness bands, wettest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainBand {
    Wettest,
    Wet,
    Normal,
    Dry,
    Driest,
}

impl TerrainBand {
    pub const ALL: [TerrainBand; 5] = [
        TerrainBand::Wettest,
        TerrainBand::Wet,
        TerrainBand::Normal,
        TerrainBand::Dry,
        TerrainBand::Driest,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(4)]
    }

    /// Terrain key handed to the placement layer.
    pub fn terrain_key(&self) -> &'static str {
        match self {
            TerrainBand::Wettest => "grass_wettest",
            TerrainBand::Wet => "grass_wet",
            TerrainBand::Normal => "grass_normal",
            TerrainBand::Dry => "grass_dry",
            TerrainBand::Driest => "grass_driest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TerrainBand::Wettest => "Wettest",
            TerrainBand::Wet => "Wet",
            TerrainBand::Normal => "Normal",
            TerrainBand::Dry => "Dry",
            TerrainBand::Driest => "Driest",
        }
    }
}

/// Quarter-turn rotation of a terrain sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainRotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl TerrainRotation {
    pub const ALL: [TerrainRotation; 4] = [
        TerrainRotation::R0,
        TerrainRotation::R90,
        TerrainRotation::R180,
        TerrainRotation::R270,
    ];

    pub fn degrees(&self) -> u16 {
        match self {
            TerrainRotation::R0 => 0,
            TerrainRotation::R90 => 90,
            TerrainRotation::R180 => 180,
            TerrainRotation::R270 => 270,
        }
    }
}

/// One cell's persistent state.
///
/// A plot is either water (`is_water`, no terrain band) or land with a band.
/// A road on water is only legal as a bridge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandPlot {
    pub is_water: bool,
    pub has_road: bool,
    pub has_bridge: bool,
    pub road_key: Option<String>,
    pub has_fence: bool,
    /// -1 unowned, 0 city, >0 player
    pub owner_id: i32,
    pub terrain_key: String,
    pub terrain_band: Option<TerrainBand>,
    pub terrain_variant: u8,
    pub terrain_rotation: TerrainRotation,
    pub base_land_value: f32,
    pub current_land_value: f32,
    /// 0 = none
    pub object_on_tile_id: u32,
    pub is_crosswalk: bool,
}

impl Default for LandPlot {
    fn default() -> Self {
        Self {
            is_water: false,
            has_road: false,
            has_bridge: false,
            road_key: None,
            has_fence: false,
            owner_id: UNOWNED,
            terrain_key: String::new(),
            terrain_band: None,
            terrain_variant: 0,
            terrain_rotation: TerrainRotation::R0,
            base_land_value: 0.0,
            current_land_value: 0.0,
            object_on_tile_id: NO_OBJECT,
            is_crosswalk: false,
        }
    }
}

impl LandPlot {
    pub fn water() -> Self {
        Self {
            is_water: true,
            terrain_key: "water".to_string(),
            ..Self::default()
        }
    }

    pub fn is_land(&self) -> bool {
        !self.is_water
    }

    pub fn has_object(&self) -> bool {
        self.object_on_tile_id != NO_OBJECT
    }

    /// Water with no bridge over it.
    pub fn is_open_water(&self) -> bool {
        self.is_water && !self.has_bridge
    }

    /// The plot invariants: water XOR banded land, and roads on water only as bridges.
    pub fn is_consistent(&self) -> bool {
        let partition = self.is_water != self.terrain_band.is_some();
        let roads = !(self.has_road && self.is_water && !self.has_bridge);
        let bridges = !self.has_bridge || (self.has_road && self.is_water);
        partition && roads && bridges
    }
}
