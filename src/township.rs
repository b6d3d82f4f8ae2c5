//! A generated map together with the city growing on it.

use tracing::info;

use crate::city::{grow_city, CityGrowthState, GrowthReport};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::world::{generate_map_with_config, GeneratedMap};

pub struct Township {
    pub map: GeneratedMap,
    pub city: CityGrowthState,
}

impl Township {
    /// Generate terrain, then found the city on it. The city seed draws from
    /// the same generator stream, after terrain.
    pub fn generate(config: &GenerationConfig, seed: u64) -> Result<Self> {
        let mut map = generate_map_with_config(config, seed)?;
        let city = CityGrowthState::found(&map.grid, &config.city, &mut map.rng);
        info!(center = %city.city_center, "city founded");
        Ok(Self { map, city })
    }

    /// One growth call; the road graph is rebuilt afterwards.
    pub fn grow(&mut self, blocks: usize) -> Result<GrowthReport> {
        let report = grow_city(
            &mut self.map.grid,
            &mut self.city,
            blocks,
            &self.map.config.city,
            &mut self.map.rng,
        )?;
        self.map.refresh_road_graph();
        Ok(report)
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.map.config
    }

    pub fn seed(&self) -> u64 {
        self.map.seed
    }
}
