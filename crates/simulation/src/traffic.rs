use bevy::prelude::*;

use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::grid::{CellType, WorldGrid};

/// Traffic intensity per cell, written by the traffic assignment outside the
/// land-value core. Cells without traffic read as zero.
#[derive(Resource)]
pub struct TrafficGrid {
    pub density: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Default for TrafficGrid {
    fn default() -> Self {
        Self {
            density: vec![0.0; GRID_WIDTH * GRID_HEIGHT],
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl TrafficGrid {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.density[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: f32) {
        self.density[y * self.width + x] = val;
    }

    pub fn clear(&mut self) {
        self.density.fill(0.0);
    }

    /// Sum of traffic intensity over the square neighborhood of `radius`
    /// cells around (x, y), clamped to the map.
    pub fn sum_in_radius(&self, x: usize, y: usize, radius: usize) -> f32 {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.width - 1);
        let y1 = (y + radius).min(self.height - 1);
        let mut total = 0.0;
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                total += self.get(cx, cy);
            }
        }
        total
    }

    /// Like `sum_in_radius`, but counting road cells only. Buildings judge
    /// passing traffic by what the street network actually carries.
    pub fn sum_on_roads_in_radius(
        &self,
        grid: &WorldGrid,
        x: usize,
        y: usize,
        radius: usize,
    ) -> f32 {
        debug_assert!(grid.width == self.width && grid.height == self.height);
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.width - 1);
        let y1 = (y + radius).min(self.height - 1);
        let mut total = 0.0;
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if grid.get(cx, cy).cell_type == CellType::Road {
                    total += self.get(cx, cy);
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut traffic = TrafficGrid::default();
        traffic.set(10, 10, 42.0);
        assert_eq!(traffic.get(10, 10), 42.0);
        assert_eq!(traffic.get(11, 10), 0.0);
    }

    #[test]
    fn test_sum_in_radius() {
        let mut traffic = TrafficGrid::default();
        traffic.set(100, 100, 10.0);
        traffic.set(103, 100, 5.0);
        traffic.set(104, 100, 99.0); // outside radius 3

        assert_eq!(traffic.sum_in_radius(100, 100, 3), 15.0);
        assert_eq!(traffic.sum_in_radius(100, 100, 4), 114.0);
    }

    #[test]
    fn test_sum_clamps_at_edges() {
        let mut traffic = TrafficGrid::default();
        traffic.set(0, 0, 7.0);
        assert_eq!(traffic.sum_in_radius(1, 1, 3), 7.0);
    }

    #[test]
    fn test_road_filtered_sum_ignores_off_road_traffic() {
        let mut grid = WorldGrid::default();
        let mut traffic = TrafficGrid::default();
        grid.get_mut(50, 50).cell_type = CellType::Road;
        traffic.set(50, 50, 100.0);
        traffic.set(51, 50, 40.0); // grass cell, not counted

        assert_eq!(traffic.sum_on_roads_in_radius(&grid, 50, 51, 2), 100.0);
        assert_eq!(traffic.sum_in_radius(50, 51, 2), 140.0);
    }

    #[test]
    fn test_clear() {
        let mut traffic = TrafficGrid::default();
        traffic.set(5, 5, 3.0);
        traffic.clear();
        assert_eq!(traffic.get(5, 5), 0.0);
    }
}
