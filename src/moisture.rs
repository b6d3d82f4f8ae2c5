//! Moisture field: stepped distance from the nearest water.
//!
//! Every water tile bleeds outward along the eight compass rays. A ray stops
//! at the edge of the (expanded) map or at the next water tile. Orthogonal
//! rays reach tile `i` at step `i`; diagonal rays advance at half that rate,
//! so diagonal tile `j` is reached at step `2j`. Each cell keeps the smallest
//! step any ray reached it with, so adding sources only ever lowers values.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::coords::{Direction, GridCoordinate};
use crate::tilemap::Tilemap;

/// Dense per-cell diffusion distance, read-only once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoistureField {
    values: Tilemap<i32>,
    far: i32,
}

impl MoistureField {
    /// Diffuse from every water cell of `water` plus the off-map `virtual_water`
    /// tiles (river margin). `far` is both the initial value and the longest
    /// ray; `margin` is how far outside the map virtual seeds may sit.
    pub fn build(
        water: &Tilemap<bool>,
        virtual_water: &HashSet<GridCoordinate>,
        far: i32,
        margin: i32,
    ) -> Self {
        let size = water.width as i32;
        let mut values = Tilemap::new_with(water.width, water.height, far);

        let is_water = |c: GridCoordinate| match water.try_get(c.x, c.y) {
            Some(w) => *w,
            None => virtual_water.contains(&c),
        };
        let in_frame = |c: GridCoordinate| {
            c.x >= -margin && c.y >= -margin && c.x < size + margin && c.y < size + margin
        };

        let seeds = water
            .iter()
            .filter(|(_, _, w)| **w)
            .map(|(x, y, _)| GridCoordinate::from((x, y)))
            .chain(virtual_water.iter().copied());

        for seed in seeds {
            if water.in_bounds(seed.x, seed.y) {
                values.set(seed.x as usize, seed.y as usize, 0);
            }

            for dir in Direction::ALL {
                let (dx, dy) = dir.offset();
                for step in 1..=far {
                    let reach = if dir.is_diagonal() { step / 2 } else { step };
                    if reach == 0 {
                        continue;
                    }
                    let cell = seed.offset(dx * reach, dy * reach);
                    if !in_frame(cell) || is_water(cell) {
                        break;
                    }
                    if water.in_bounds(cell.x, cell.y) {
                        let current = values.get_mut(cell.x as usize, cell.y as usize);
                        *current = (*current).min(step);
                    }
                }
            }
        }

        Self { values, far }
    }

    pub fn get(&self, x: usize, y: usize) -> i32 {
        *self.values.get(x, y)
    }

    /// The "far from any water" sentinel.
    pub fn far_value(&self) -> i32 {
        self.far
    }

    pub fn size(&self) -> usize {
        self.values.width
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &i32)> {
        self.values.iter()
    }
}
