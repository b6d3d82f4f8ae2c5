//! Weighted discrete sampling over small tables of outcomes.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{GenerationError, Result};

/// A fixed set of outcomes with integer weights.
#[derive(Clone, Debug)]
pub struct WeightedTable<T> {
    outcomes: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T: Clone> WeightedTable<T> {
    /// Build a table; fails on an empty table or all-zero weights.
    pub fn new(entries: &[(T, u32)]) -> Result<Self> {
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w))
            .map_err(|e| GenerationError::InvalidConfig(format!("weight table: {}", e)))?;
        Ok(Self {
            outcomes: entries.iter().map(|(o, _)| o.clone()).collect(),
            index,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.outcomes[self.index.sample(rng)].clone()
    }
}
