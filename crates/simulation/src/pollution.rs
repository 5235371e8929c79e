use bevy::prelude::*;

use crate::buildings::{Building, BuildingKind};
use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::SlowTickTimer;

/// Pollution a factory emits at its own cell; falls off linearly with
/// Manhattan distance until it reaches zero.
const EMISSION_INTENSITY: f32 = 8.0;
const EMISSION_RADIUS: i32 = 8;

#[derive(Resource)]
pub struct PollutionGrid {
    pub levels: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Default for PollutionGrid {
    fn default() -> Self {
        Self {
            levels: vec![0.0; GRID_WIDTH * GRID_HEIGHT],
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl PollutionGrid {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.levels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: f32) {
        self.levels[y * self.width + x] = val;
    }

    /// Sum of pollution over the square neighborhood of `radius` cells
    /// around (x, y), clamped to the map.
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
}

/// Rebuild the pollution field from scratch: industrial buildings radiate
/// with linear distance decay. Runs on the slow tick, before the scoring
/// pass reads the field.
pub fn update_pollution(
    timer: Res<SlowTickTimer>,
    mut pollution: ResMut<PollutionGrid>,
    buildings: Query<&Building>,
) {
    if !timer.should_run() {
        return;
    }
    pollution.levels.fill(0.0);

    for building in &buildings {
        if building.kind != BuildingKind::Industrial {
            continue;
        }
        for dy in -EMISSION_RADIUS..=EMISSION_RADIUS {
            for dx in -EMISSION_RADIUS..=EMISSION_RADIUS {
                let nx = building.grid_x as i32 + dx;
                let ny = building.grid_y as i32 + dy;
                if nx < 0
                    || ny < 0
                    || nx as usize >= pollution.width
                    || ny as usize >= pollution.height
                {
                    continue;
                }
                let dist = dx.abs() + dy.abs();
                let falloff = (EMISSION_INTENSITY - dist as f32).max(0.0);
                if falloff > 0.0 {
                    let cur = pollution.get(nx as usize, ny as usize);
                    pollution.set(nx as usize, ny as usize, cur + falloff);
                }
            }
        }
    }
}

pub struct PollutionPlugin;

impl Plugin for PollutionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PollutionGrid>()
            .add_systems(FixedUpdate, update_pollution.after(crate::tick_slow_timer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_in_radius() {
        let mut pollution = PollutionGrid::default();
        pollution.set(30, 30, 4.0);
        pollution.set(33, 30, 2.0);
        pollution.set(34, 30, 50.0);

        assert_eq!(pollution.sum_in_radius(30, 30, 3), 6.0);
    }

    #[test]
    fn test_missing_data_reads_zero() {
        let pollution = PollutionGrid::default();
        assert_eq!(pollution.get(12, 12), 0.0);
        assert_eq!(pollution.sum_in_radius(12, 12, 3), 0.0);
    }
}
