//! # TestCity — headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `SimulationPlugin`
//! for driving the simulation without a window or renderer.

use bevy::app::App;
use bevy::prelude::*;

use crate::buildings::{Building, BuildingKind};
use crate::desirability::DesirabilityLayers;
use crate::grid::{Cell, WorldGrid, ZoneType};
use crate::pollution::PollutionGrid;
use crate::roads::RoadNetwork;
use crate::traffic::TrafficGrid;
use crate::zots::{Zot, Zots};
use crate::SimulationPlugin;
use crate::SlowTickTimer;

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
///
/// Use builder methods to set up city state, then call `tick()` /
/// `tick_slow_cycle()` to advance the simulation and assert on the
/// resulting ECS state.
pub struct TestCity {
    app: App,
}

impl TestCity {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern — consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Place an axis-aligned road from (x0,y0) to (x1,y1), inclusive.
    pub fn with_road(mut self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut roads: Mut<RoadNetwork>| {
            world.resource_scope(|_world, mut grid: Mut<WorldGrid>| {
                for (x, y) in line_cells(x0, y0, x1, y1) {
                    roads.place_road(&mut grid, x, y);
                }
            });
        });
        self
    }

    /// Set a single cell's zone type.
    pub fn with_zone(mut self, x: usize, y: usize, zone: ZoneType) -> Self {
        if let Some(mut grid) = self.app.world_mut().get_resource_mut::<WorldGrid>() {
            if grid.in_bounds(x, y) {
                grid.get_mut(x, y).zone = zone;
            }
        }
        self
    }

    /// Set zone type for a rectangular area (inclusive).
    pub fn with_zone_rect(
        mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
        zone: ZoneType,
    ) -> Self {
        if let Some(mut grid) = self.app.world_mut().get_resource_mut::<WorldGrid>() {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    if grid.in_bounds(x, y) {
                        grid.get_mut(x, y).zone = zone;
                    }
                }
            }
        }
        self
    }

    /// Spawn a building at the given cell with its standing trade offers.
    pub fn with_building(mut self, x: usize, y: usize, kind: BuildingKind) -> Self {
        let entity = self
            .app
            .world_mut()
            .spawn((Building::new(kind, x, y), Zots::default()))
            .id();
        if let Some(mut grid) = self.app.world_mut().get_resource_mut::<WorldGrid>() {
            if grid.in_bounds(x, y) {
                grid.get_mut(x, y).building_id = Some(entity);
            }
        }
        self
    }

    /// Set traffic intensity on a single cell.
    pub fn with_traffic(mut self, x: usize, y: usize, intensity: f32) -> Self {
        if let Some(mut traffic) = self.app.world_mut().get_resource_mut::<TrafficGrid>() {
            traffic.set(x, y, intensity);
        }
        self
    }

    /// Set pollution on a single cell. Note the pollution pass rebuilds the
    /// field from emitters on each slow cycle, so this is only useful for
    /// reads made before one.
    pub fn with_pollution(mut self, x: usize, y: usize, level: f32) -> Self {
        if let Some(mut pollution) = self.app.world_mut().get_resource_mut::<PollutionGrid>() {
            pollution.set(x, y, level);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Mutation after setup
    // -----------------------------------------------------------------------

    /// Mutate the building occupying the given cell.
    pub fn update_building(&mut self, x: usize, y: usize, f: impl FnOnce(&mut Building)) {
        let entity = self
            .grid()
            .get(x, y)
            .building_id
            .expect("no building at cell");
        let mut building = self
            .app
            .world_mut()
            .get_mut::<Building>(entity)
            .expect("entity has no Building");
        f(&mut building);
    }

    /// Re-zone a single cell after construction.
    pub fn set_zone(&mut self, x: usize, y: usize, zone: ZoneType) {
        if let Some(mut grid) = self.app.world_mut().get_resource_mut::<WorldGrid>() {
            if grid.in_bounds(x, y) {
                grid.get_mut(x, y).zone = zone;
            }
        }
    }

    /// Clear the zone of a single cell (dezoning).
    pub fn dezone(&mut self, x: usize, y: usize) {
        self.set_zone(x, y, ZoneType::None);
    }

    /// Set traffic intensity after construction.
    pub fn set_traffic(&mut self, x: usize, y: usize, intensity: f32) {
        if let Some(mut traffic) = self.app.world_mut().get_resource_mut::<TrafficGrid>() {
            traffic.set(x, y, intensity);
        }
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks.
    ///
    /// The simulation runs at 10 Hz (100ms per tick). Each call advances
    /// virtual time by 100ms and calls `app.update()`, which triggers the
    /// `FixedUpdate` schedule.
    pub fn tick(&mut self, n: u32) {
        let dt = std::time::Duration::from_millis(100);
        // Drive virtual time via the manual update strategy so each `update()`
        // advances by exactly `dt`. Manually advancing `Time<Virtual>` before
        // `update()` is overwritten by `TimePlugin`'s real-clock `time_system`,
        // which leaves the fixed-timestep accumulator empty and stops
        // `FixedUpdate` from running.
        self.app
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(dt));
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Run until the SlowTickTimer fires at least once (~100 ticks).
    pub fn tick_slow_cycle(&mut self) {
        self.tick(SlowTickTimer::INTERVAL);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Access the ECS world mutably (needed for queries in Bevy).
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Get a reference to any resource.
    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    /// Get a reference to the world grid.
    pub fn grid(&self) -> &WorldGrid {
        self.app.world().resource::<WorldGrid>()
    }

    /// Get a reference to a specific cell.
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.grid().get(x, y)
    }

    /// Desirability score for a zone type at level 1, if the tile has one.
    pub fn desirability(&self, zone: ZoneType, x: usize, y: usize) -> Option<f32> {
        self.resource::<DesirabilityLayers>()
            .layer(zone, 1)
            .and_then(|layer| layer.get(x, y))
    }

    /// Number of scored tiles in a zone type's level-1 layer.
    pub fn desirability_len(&self, zone: ZoneType) -> usize {
        self.resource::<DesirabilityLayers>()
            .layer(zone, 1)
            .map_or(0, |layer| layer.len())
    }

    /// Current problem flags of the building occupying the given cell.
    pub fn zots_at(&self, x: usize, y: usize) -> Vec<Zot> {
        let entity = self
            .grid()
            .get(x, y)
            .building_id
            .expect("no building at cell");
        self.app
            .world()
            .get::<Zots>(entity)
            .map(|zots| zots.0.clone())
            .unwrap_or_default()
    }

    /// Count all building entities.
    pub fn building_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query_filtered::<Entity, With<Building>>()
            .iter(world)
            .count()
    }

    /// Get the slow tick timer.
    pub fn slow_tick_timer(&self) -> &SlowTickTimer {
        self.app.world().resource::<SlowTickTimer>()
    }
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

/// Cells of an axis-aligned line segment, inclusive of both endpoints.
fn line_cells(x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    if y0 == y1 {
        let (a, b) = (x0.min(x1), x0.max(x1));
        for x in a..=b {
            cells.push((x, y0));
        }
    } else if x0 == x1 {
        let (a, b) = (y0.min(y1), y0.max(y1));
        for y in a..=b {
            cells.push((x0, y));
        }
    } else {
        panic!("only axis-aligned roads are supported in tests");
    }
    cells
}
