//! Township generation library
//!
//! Rivers, moisture, terrain bands and a growing city on a square tile grid.
//! Re-exports modules for use by the binary and tests.

pub mod adjacency;
pub mod ascii;
pub mod city;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod grid;
pub mod moisture;
pub mod plot;
pub mod rivers;
pub mod road_graph;
pub mod scheduler;
pub mod terrain;
pub mod tilemap;
pub mod township;
pub mod weighted;
pub mod world;

pub use city::{grow_city, CityGrowthState, GrowthReport};
pub use config::GenerationConfig;
pub use error::{GenerationError, Result};
pub use grid::{LandGrid, TilePlacer};
pub use township::Township;
pub use world::{generate_map, generate_map_with_config, GeneratedMap};
