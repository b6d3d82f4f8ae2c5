//! Road connectivity graph: road tiles as nodes, cardinal steps as edges.

use std::collections::{BTreeSet, HashSet};

use pathfinding::prelude::{astar, connected_components};

use crate::coords::{Direction, GridCoordinate};
use crate::grid::LandGrid;

/// Snapshot of the road network of a grid. Bridges are ordinary road nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoadGraph {
    nodes: BTreeSet<GridCoordinate>,
}

impl RoadGraph {
    pub fn from_grid(grid: &LandGrid) -> Self {
        Self {
            nodes: grid.road_tiles().into_iter().collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, at: GridCoordinate) -> bool {
        self.nodes.contains(&at)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.nodes.iter()
    }

    /// Road tiles one cardinal step away.
    pub fn neighbors(&self, at: GridCoordinate) -> Vec<GridCoordinate> {
        Direction::CARDINALS
            .iter()
            .map(|dir| at.step(*dir))
            .filter(|n| self.nodes.contains(n))
            .collect()
    }

    /// Shortest road path from `start` to `goal`, both ends included.
    pub fn shortest_path(&self, start: GridCoordinate, goal: GridCoordinate) -> Option<Vec<GridCoordinate>> {
        if !self.contains(start) || !self.contains(goal) {
            return None;
        }

        let result = astar(
            &start,
            |node| self.neighbors(*node).into_iter().map(|n| (n, 1u32)),
            |node| heuristic(node, &goal),
            |node| *node == goal,
        );

        result.map(|(path, _cost)| path)
    }

    pub fn connected(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        self.shortest_path(a, b).is_some()
    }

    pub fn components(&self) -> Vec<HashSet<GridCoordinate>> {
        let starts: Vec<GridCoordinate> = self.nodes.iter().copied().collect();
        connected_components(&starts, |node| self.neighbors(*node))
    }

    pub fn component_count(&self) -> usize {
        self.components().len()
    }
}

fn heuristic(a: &GridCoordinate, b: &GridCoordinate) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}
