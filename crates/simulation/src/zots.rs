use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind, Tradeable};
use crate::grid::WorldGrid;
use crate::traffic::TrafficGrid;
use crate::SlowTickTimer;

/// Problem indicators surfaced on an occupied building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zot {
    NoWorkers,
    NoCustomers,
    NoGoods,
    TooMuchTraffic,
    NoPower,
}

/// A building's current problem flags, replaced wholesale each evaluation
/// pass (never merged with the previous set).
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zots(pub Vec<Zot>);

/// Households complain when the street traffic next door gets this bad.
const RESIDENTIAL_TRAFFIC_RADIUS: usize = 2;
const RESIDENTIAL_TRAFFIC_LIMIT: f32 = 5000.0;

/// Shops need at least some passing traffic to find customers.
const COMMERCIAL_TRAFFIC_RADIUS: usize = 5;
const COMMERCIAL_TRAFFIC_FLOOR: f32 = 50.0;

/// Recompute every building's flag set from scratch. Each entity owns its
/// own flag list, so the per-building work runs on the parallel iterator.
pub fn update_zots(
    timer: Res<SlowTickTimer>,
    grid: Res<WorldGrid>,
    traffic: Res<TrafficGrid>,
    mut buildings: Query<(&Building, &mut Zots)>,
) {
    if !timer.should_run() {
        return;
    }
    let grid = grid.into_inner();
    let traffic = traffic.into_inner();

    buildings.par_iter_mut().for_each(|(building, mut zots)| {
        zots.0 = evaluate(building, grid, traffic);
    });
}

/// Zone-specific rules by building kind, unioned with the generic rules.
pub(crate) fn evaluate(building: &Building, grid: &WorldGrid, traffic: &TrafficGrid) -> Vec<Zot> {
    let mut flags = match building.kind {
        BuildingKind::Residential => residential_zots(building, grid, traffic),
        BuildingKind::Commercial => commercial_zots(building, grid, traffic),
        BuildingKind::Industrial => industrial_zots(building),
        BuildingKind::Civic => Vec::new(),
    };
    if !building.powered {
        flags.push(Zot::NoPower);
    }
    flags
}

fn residential_zots(building: &Building, grid: &WorldGrid, traffic: &TrafficGrid) -> Vec<Zot> {
    let mut flags = Vec::new();
    if building.quantity_on_hand(Tradeable::Goods) == 0 {
        flags.push(Zot::NoGoods);
    }
    let nearby = traffic.sum_on_roads_in_radius(
        grid,
        building.grid_x,
        building.grid_y,
        RESIDENTIAL_TRAFFIC_RADIUS,
    );
    if nearby > RESIDENTIAL_TRAFFIC_LIMIT {
        flags.push(Zot::TooMuchTraffic);
    }
    flags
}

fn commercial_zots(building: &Building, grid: &WorldGrid, traffic: &TrafficGrid) -> Vec<Zot> {
    let mut flags = Vec::new();
    if building.total_being_bought(Tradeable::Labor) == 0 {
        flags.push(Zot::NoWorkers);
    }
    let nearby = traffic.sum_on_roads_in_radius(
        grid,
        building.grid_x,
        building.grid_y,
        COMMERCIAL_TRAFFIC_RADIUS,
    );
    if nearby <= COMMERCIAL_TRAFFIC_FLOOR {
        flags.push(Zot::NoCustomers);
    }
    flags
}

fn industrial_zots(building: &Building) -> Vec<Zot> {
    let mut flags = Vec::new();
    if building.total_being_bought(Tradeable::Labor) == 0 {
        flags.push(Zot::NoWorkers);
    }
    flags
}

pub struct ZotsPlugin;

impl Plugin for ZotsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_zots.after(crate::tick_slow_timer));
    }
}
