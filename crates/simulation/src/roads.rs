use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{CellType, WorldGrid, ZoneType};

/// How far (square radius, in cells) a parcel may sit from the nearest road
/// cell and still count as road-served.
pub const ROAD_REACH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadNode(pub usize, pub usize);

#[derive(Resource, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    pub edges: HashMap<RoadNode, HashSet<RoadNode>>,
}

impl RoadNetwork {
    pub fn place_road(&mut self, grid: &mut WorldGrid, x: usize, y: usize) -> bool {
        if !grid.in_bounds(x, y) {
            return false;
        }
        let cell = grid.get(x, y);
        if cell.cell_type == CellType::Water {
            return false;
        }
        if cell.cell_type == CellType::Road {
            return false; // already a road
        }

        grid.get_mut(x, y).cell_type = CellType::Road;

        let node = RoadNode(x, y);
        self.edges.entry(node).or_default();

        // Connect to adjacent road cells
        let (neighbors, ncount) = grid.neighbors4(x, y);
        for &(nx, ny) in &neighbors[..ncount] {
            if grid.get(nx, ny).cell_type == CellType::Road {
                let neighbor_node = RoadNode(nx, ny);
                self.edges.entry(node).or_default().insert(neighbor_node);
                self.edges.entry(neighbor_node).or_default().insert(node);
            }
        }

        true
    }

    pub fn remove_road(&mut self, grid: &mut WorldGrid, x: usize, y: usize) -> bool {
        if !grid.in_bounds(x, y) || grid.get(x, y).cell_type != CellType::Road {
            return false;
        }

        let node = RoadNode(x, y);
        if let Some(neighbors) = self.edges.remove(&node) {
            for neighbor in &neighbors {
                if let Some(nset) = self.edges.get_mut(neighbor) {
                    nset.remove(&node);
                }
            }
        }

        grid.get_mut(x, y).cell_type = CellType::Grass;
        grid.get_mut(x, y).zone = ZoneType::None;
        grid.get_mut(x, y).building_id = None;

        true
    }

    pub fn is_road(&self, x: usize, y: usize) -> bool {
        self.edges.contains_key(&RoadNode(x, y))
    }

    /// True if any of the given coordinates has a road cell within
    /// `ROAD_REACH`. A parcel that fails this check cannot trade and is
    /// worthless to developers.
    pub fn nearby_road(&self, coordinates: &[(usize, usize)]) -> bool {
        coordinates
            .iter()
            .any(|&(x, y)| self.road_within(x, y, ROAD_REACH))
    }

    pub fn road_within(&self, x: usize, y: usize, radius: usize) -> bool {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        for cy in y0..=y + radius {
            for cx in x0..=x + radius {
                if self.is_road(cx, cy) {
                    return true;
                }
            }
        }
        false
    }
}
