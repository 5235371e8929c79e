use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use bevy::tasks::ComputeTaskPool;

use crate::buildings::Tradeable;
use crate::grid::{WorldGrid, ZoneType};
use crate::market::{ResourceIndex, MAX_AGGREGATION_RADIUS};
use crate::pollution::PollutionGrid;
use crate::roads::RoadNetwork;
use crate::traffic::TrafficGrid;
use crate::SlowTickTimer;

/// Radius bands for supply/demand aggregation, in cells. A nearby offer is
/// counted once per band it falls inside, so closer activity weighs more.
pub const SHORT_RANGE: usize = 10;
pub const MEDIUM_RANGE: usize = 30;
pub const LONG_RANGE: usize = 100;

/// Every ten units of nearby supply or demand is worth one point.
const SUPPLY_DEMAND_WEIGHT: f32 = 0.1;

/// Radius and weight of the local traffic / pollution penalty.
const NUISANCE_RADIUS: usize = 3;
const NUISANCE_WEIGHT: f32 = 0.05;

/// Sparse per-zone-type score map. The key set always matches the set of
/// coordinates zoned with `zone_type` as of the last scoring pass.
#[derive(Debug)]
pub struct DesirabilityLayer {
    pub zone_type: ZoneType,
    pub level: u8,
    scores: HashMap<(usize, usize), f32>,
}

impl DesirabilityLayer {
    pub fn new(zone_type: ZoneType, level: u8) -> Self {
        Self {
            zone_type,
            level,
            scores: HashMap::new(),
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.scores.get(&(x, y)).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, score: f32) {
        self.scores.insert((x, y), score);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.scores.keys().copied()
    }

    /// Drop entries for coordinates no longer in the zoned set (dezoned or
    /// retyped since the last pass).
    pub fn trim_to(&mut self, zoned: &HashSet<(usize, usize)>) {
        self.scores.retain(|coord, _| zoned.contains(coord));
    }
}

/// One layer per zone type; only level 1 is scored for now, higher levels
/// stay empty until multi-level development lands.
#[derive(Resource)]
pub struct DesirabilityLayers {
    pub layers: Vec<DesirabilityLayer>,
}

impl Default for DesirabilityLayers {
    fn default() -> Self {
        Self {
            layers: ZoneType::ZONED
                .iter()
                .map(|&zone| DesirabilityLayer::new(zone, 1))
                .collect(),
        }
    }
}

impl DesirabilityLayers {
    pub fn layer(&self, zone_type: ZoneType, level: u8) -> Option<&DesirabilityLayer> {
        self.layers
            .iter()
            .find(|l| l.zone_type == zone_type && l.level == level)
    }
}

/// Rescore every zoned parcel and trim entries for parcels that lost their
/// zoning. Each layer's zoned set is snapshotted once, then scored with one
/// task per coordinate on the compute pool; `scope` joins them all before
/// the merge, and every task writes a distinct key.
pub fn update_desirability(
    timer: Res<SlowTickTimer>,
    grid: Res<WorldGrid>,
    roads: Res<RoadNetwork>,
    index: Res<ResourceIndex>,
    traffic: Res<TrafficGrid>,
    pollution: Res<PollutionGrid>,
    mut layers: ResMut<DesirabilityLayers>,
) {
    if !timer.should_run() {
        return;
    }

    let roads = roads.into_inner();
    let index = index.into_inner();
    let traffic = traffic.into_inner();
    let pollution = pollution.into_inner();
    let pool = ComputeTaskPool::get();

    for layer in &mut layers.layers {
        if layer.level != 1 {
            continue;
        }
        let zone_type = layer.zone_type;
        let zoned = grid.zone_coordinates(zone_type);

        let scored = pool.scope(|scope| {
            for &(x, y) in &zoned {
                scope.spawn(async move {
                    (
                        (x, y),
                        score_for(zone_type, roads, index, traffic, pollution, x, y),
                    )
                });
            }
        });

        for ((x, y), score) in scored {
            if !score.is_finite() {
                // Keep the previous entry rather than poisoning the layer.
                warn!(
                    "discarding non-finite {:?} desirability at ({}, {})",
                    zone_type, x, y
                );
                continue;
            }
            layer.set(x, y, score);
        }

        let zoned: HashSet<(usize, usize)> = zoned.into_iter().collect();
        layer.trim_to(&zoned);
    }
}

fn score_for(
    zone_type: ZoneType,
    roads: &RoadNetwork,
    index: &ResourceIndex,
    traffic: &TrafficGrid,
    pollution: &PollutionGrid,
    x: usize,
    y: usize,
) -> f32 {
    match zone_type {
        ZoneType::Residential => score_residential(roads, index, traffic, pollution, x, y),
        ZoneType::Commercial => score_commercial(roads, index, traffic, pollution, x, y),
        ZoneType::Industrial => score_industrial(roads, index, traffic, x, y),
        ZoneType::None => 0.0,
    }
}

/// Households want shops stocked nearby and jobs in reach, and dislike
/// living next to congestion and smog.
pub(crate) fn score_residential(
    roads: &RoadNetwork,
    index: &ResourceIndex,
    traffic: &TrafficGrid,
    pollution: &PollutionGrid,
    x: usize,
    y: usize,
) -> f32 {
    if !roads.nearby_road(&[(x, y)]) {
        return 0.0;
    }

    let jobs_short =
        index.quantity_wanted_nearby(Tradeable::Labor, x, y, SHORT_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let jobs_medium =
        index.quantity_wanted_nearby(Tradeable::Labor, x, y, MEDIUM_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let jobs_long =
        index.quantity_wanted_nearby(Tradeable::Labor, x, y, LONG_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let goods_short =
        index.quantity_for_sale_nearby(Tradeable::Goods, x, y, SHORT_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let goods_medium =
        index.quantity_for_sale_nearby(Tradeable::Goods, x, y, MEDIUM_RANGE) * SUPPLY_DEMAND_WEIGHT;

    let traffic_penalty = traffic.sum_in_radius(x, y, NUISANCE_RADIUS) * NUISANCE_WEIGHT;
    let pollution_penalty = pollution.sum_in_radius(x, y, NUISANCE_RADIUS) * NUISANCE_WEIGHT;

    jobs_short + jobs_medium + jobs_long + goods_short + goods_medium
        - traffic_penalty
        - pollution_penalty
}

/// Shops want buyers for their goods nearby and a labor pool anywhere in
/// hauling range.
pub(crate) fn score_commercial(
    roads: &RoadNetwork,
    index: &ResourceIndex,
    traffic: &TrafficGrid,
    pollution: &PollutionGrid,
    x: usize,
    y: usize,
) -> f32 {
    if !roads.nearby_road(&[(x, y)]) {
        return 0.0;
    }

    let buyers_short =
        index.quantity_wanted_nearby(Tradeable::Goods, x, y, SHORT_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let buyers_medium =
        index.quantity_wanted_nearby(Tradeable::Goods, x, y, MEDIUM_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let buyers_long =
        index.quantity_wanted_nearby(Tradeable::Goods, x, y, LONG_RANGE) * SUPPLY_DEMAND_WEIGHT;
    let labor_pool = index.quantity_for_sale_nearby(Tradeable::Labor, x, y, MAX_AGGREGATION_RADIUS)
        * SUPPLY_DEMAND_WEIGHT;

    let traffic_penalty = traffic.sum_in_radius(x, y, NUISANCE_RADIUS) * NUISANCE_WEIGHT;
    let pollution_penalty = pollution.sum_in_radius(x, y, NUISANCE_RADIUS) * NUISANCE_WEIGHT;

    buyers_short + buyers_medium + buyers_long + labor_pool - traffic_penalty - pollution_penalty
}

/// Factories want wholesale buyers and workers; they shrug at pollution and
/// tolerate twice the traffic everyone else would.
pub(crate) fn score_industrial(
    roads: &RoadNetwork,
    index: &ResourceIndex,
    traffic: &TrafficGrid,
    x: usize,
    y: usize,
) -> f32 {
    if !roads.nearby_road(&[(x, y)]) {
        return 0.0;
    }

    let buyers_short = index.quantity_wanted_nearby(Tradeable::WholesaleGoods, x, y, SHORT_RANGE)
        * SUPPLY_DEMAND_WEIGHT;
    let buyers_medium = index.quantity_wanted_nearby(Tradeable::WholesaleGoods, x, y, MEDIUM_RANGE)
        * SUPPLY_DEMAND_WEIGHT;
    let buyers_long = index.quantity_wanted_nearby(Tradeable::WholesaleGoods, x, y, LONG_RANGE)
        * SUPPLY_DEMAND_WEIGHT;
    let labor_pool = index.quantity_for_sale_nearby(Tradeable::Labor, x, y, MAX_AGGREGATION_RADIUS)
        * SUPPLY_DEMAND_WEIGHT;

    let traffic_penalty = traffic.sum_in_radius(x, y, NUISANCE_RADIUS) * NUISANCE_WEIGHT / 2.0;

    buyers_short + buyers_medium + buyers_long + labor_pool - traffic_penalty
}

pub struct DesirabilityPlugin;

impl Plugin for DesirabilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DesirabilityLayers>().add_systems(
            FixedUpdate,
            update_desirability
                .after(crate::market::rebuild_resource_index)
                .after(crate::pollution::update_pollution),
        );
    }
}
