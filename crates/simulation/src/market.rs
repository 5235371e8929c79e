use bevy::prelude::*;

use crate::buildings::{Building, Tradeable};
use crate::SlowTickTimer;

/// Fixed outer cutoff for supply/demand searches, in cells. Nothing past
/// this distance is worth hauling.
pub const MAX_AGGREGATION_RADIUS: usize = 100;

/// Per-tradeable snapshot of the standing offers buildings have posted,
/// rebuilt from trade ledgers each slow tick. Queries answer "how much of X
/// is wanted / for sale within R cells of here".
#[derive(Resource, Default)]
pub struct ResourceIndex {
    wanted: [Vec<(usize, usize, f32)>; 3],
    for_sale: [Vec<(usize, usize, f32)>; 3],
}

impl ResourceIndex {
    pub fn clear(&mut self) {
        for entries in &mut self.wanted {
            entries.clear();
        }
        for entries in &mut self.for_sale {
            entries.clear();
        }
    }

    pub fn add_wanted(&mut self, tradeable: Tradeable, x: usize, y: usize, quantity: f32) {
        self.wanted[tradeable.index()].push((x, y, quantity));
    }

    pub fn add_for_sale(&mut self, tradeable: Tradeable, x: usize, y: usize, quantity: f32) {
        self.for_sale[tradeable.index()].push((x, y, quantity));
    }

    pub fn quantity_wanted_nearby(
        &self,
        tradeable: Tradeable,
        x: usize,
        y: usize,
        radius: usize,
    ) -> f32 {
        debug_assert!(
            radius <= MAX_AGGREGATION_RADIUS,
            "radius {radius} exceeds cutoff"
        );
        Self::sum_within(&self.wanted[tradeable.index()], x, y, radius)
    }

    pub fn quantity_for_sale_nearby(
        &self,
        tradeable: Tradeable,
        x: usize,
        y: usize,
        radius: usize,
    ) -> f32 {
        debug_assert!(
            radius <= MAX_AGGREGATION_RADIUS,
            "radius {radius} exceeds cutoff"
        );
        Self::sum_within(&self.for_sale[tradeable.index()], x, y, radius)
    }

    fn sum_within(entries: &[(usize, usize, f32)], x: usize, y: usize, radius: usize) -> f32 {
        entries
            .iter()
            .filter(|&&(ex, ey, _)| {
                let dx = ex.abs_diff(x);
                let dy = ey.abs_diff(y);
                dx.max(dy) <= radius
            })
            .map(|&(_, _, quantity)| quantity)
            .sum()
    }
}

/// Snapshot every building's standing offers into the index. Runs before
/// the scoring pass so scores see the current trading field.
pub fn rebuild_resource_index(
    timer: Res<SlowTickTimer>,
    mut index: ResMut<ResourceIndex>,
    buildings: Query<&Building>,
) {
    if !timer.should_run() {
        return;
    }
    index.clear();
    for building in &buildings {
        for tradeable in Tradeable::ALL {
            let entry = building.ledger.entry(tradeable);
            if entry.wanted > 0 {
                index.add_wanted(
                    tradeable,
                    building.grid_x,
                    building.grid_y,
                    entry.wanted as f32,
                );
            }
            if entry.for_sale > 0 {
                index.add_for_sale(
                    tradeable,
                    building.grid_x,
                    building.grid_y,
                    entry.for_sale as f32,
                );
            }
        }
    }
}

pub struct MarketPlugin;

impl Plugin for MarketPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResourceIndex>().add_systems(
            FixedUpdate,
            rebuild_resource_index.after(crate::tick_slow_timer),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_filter_is_square() {
        let mut index = ResourceIndex::default();
        index.add_wanted(Tradeable::Labor, 100, 100, 10.0);
        index.add_wanted(Tradeable::Labor, 110, 110, 5.0); // corner of the 10-box
        index.add_wanted(Tradeable::Labor, 111, 100, 7.0); // just outside

        assert_eq!(
            index.quantity_wanted_nearby(Tradeable::Labor, 100, 100, 10),
            15.0
        );
        assert_eq!(
            index.quantity_wanted_nearby(Tradeable::Labor, 100, 100, 11),
            22.0
        );
    }

    #[test]
    fn test_wanted_and_for_sale_are_separate() {
        let mut index = ResourceIndex::default();
        index.add_wanted(Tradeable::Goods, 10, 10, 3.0);
        index.add_for_sale(Tradeable::Goods, 10, 10, 8.0);

        assert_eq!(index.quantity_wanted_nearby(Tradeable::Goods, 10, 10, 5), 3.0);
        assert_eq!(
            index.quantity_for_sale_nearby(Tradeable::Goods, 10, 10, 5),
            8.0
        );
    }

    #[test]
    fn test_tradeables_do_not_mix() {
        let mut index = ResourceIndex::default();
        index.add_for_sale(Tradeable::Labor, 20, 20, 4.0);

        assert_eq!(index.quantity_for_sale_nearby(Tradeable::Goods, 20, 20, 5), 0.0);
        assert_eq!(
            index.quantity_for_sale_nearby(Tradeable::WholesaleGoods, 20, 20, 5),
            0.0
        );
    }

    #[test]
    fn test_empty_index_reads_zero() {
        let index = ResourceIndex::default();
        assert_eq!(
            index.quantity_wanted_nearby(Tradeable::Labor, 50, 50, MAX_AGGREGATION_RADIUS),
            0.0
        );
    }

    #[test]
    fn test_clear_drops_all_offers() {
        let mut index = ResourceIndex::default();
        index.add_wanted(Tradeable::Labor, 10, 10, 2.0);
        index.add_for_sale(Tradeable::Goods, 10, 10, 2.0);
        index.clear();

        assert_eq!(index.quantity_wanted_nearby(Tradeable::Labor, 10, 10, 50), 0.0);
        assert_eq!(index.quantity_for_sale_nearby(Tradeable::Goods, 10, 10, 50), 0.0);
    }
}
