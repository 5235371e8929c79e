use bevy::prelude::*;

pub mod buildings;
pub mod config;
pub mod desirability;
pub mod grid;
pub mod market;
pub mod pollution;
pub mod roads;
pub mod traffic;
pub mod zots;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Shared throttle timer for grid-wide simulation systems that don't need
/// to run every tick (the resource index, pollution, desirability, and zot
/// passes). These systems only run every N ticks.
#[derive(Resource, Default)]
pub struct SlowTickTimer {
    pub counter: u32,
}

impl SlowTickTimer {
    pub const INTERVAL: u32 = 100; // run slow systems every 100 ticks (~10 seconds at 10Hz)

    pub fn tick(&mut self) {
        self.counter += 1;
    }

    pub fn should_run(&self) -> bool {
        self.counter.is_multiple_of(Self::INTERVAL)
    }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Core resources and the 10Hz fixed timestep the simulation runs at.
        app.insert_resource(Time::<Fixed>::from_seconds(0.1))
            .init_resource::<TickCounter>()
            .init_resource::<SlowTickTimer>()
            .init_resource::<grid::WorldGrid>()
            .init_resource::<roads::RoadNetwork>()
            .init_resource::<traffic::TrafficGrid>()
            .add_systems(FixedUpdate, tick_slow_timer);

        app.add_plugins((
            market::MarketPlugin,
            pollution::PollutionPlugin,
            desirability::DesirabilityPlugin,
            zots::ZotsPlugin,
        ));
    }
}

pub fn tick_slow_timer(mut timer: ResMut<SlowTickTimer>, mut tick: ResMut<TickCounter>) {
    timer.tick();
    tick.0 = tick.0.wrapping_add(1);
}

#[cfg(test)]
mod timer_tests {
    use super::*;

    #[test]
    fn test_slow_timer_cadence() {
        let mut timer = SlowTickTimer::default();
        let mut fired = 0;
        for _ in 0..(SlowTickTimer::INTERVAL * 3) {
            timer.tick();
            if timer.should_run() {
                fired += 1;
            }
        }
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_slow_timer_does_not_fire_early() {
        let mut timer = SlowTickTimer::default();
        timer.tick();
        assert!(!timer.should_run());
    }
}

