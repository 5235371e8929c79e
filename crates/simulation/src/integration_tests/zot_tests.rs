//! Scenario tests for the problem-flag pass: per-kind rules, the generic
//! power rule, boundary thresholds, and wholesale replacement semantics.

use crate::buildings::{BuildingKind, Tradeable};
use crate::test_harness::TestCity;
use crate::zots::Zot;

#[test]
fn unpowered_building_gets_no_power_flag() {
    let mut city = TestCity::new().with_building(50, 50, BuildingKind::Civic);
    city.update_building(50, 50, |b| b.powered = false);
    city.tick_slow_cycle();

    assert_eq!(city.zots_at(50, 50), vec![Zot::NoPower]);
}

#[test]
fn flags_are_replaced_not_merged() {
    let mut city = TestCity::new().with_building(50, 50, BuildingKind::Civic);
    city.update_building(50, 50, |b| b.powered = false);
    city.tick_slow_cycle();
    assert_eq!(city.zots_at(50, 50), vec![Zot::NoPower]);

    // Restore power: the old flag must not linger.
    city.update_building(50, 50, |b| b.powered = true);
    city.tick_slow_cycle();
    assert!(city.zots_at(50, 50).is_empty());
}

#[test]
fn unchanged_inputs_give_identical_flags() {
    let mut city = TestCity::new().with_building(60, 60, BuildingKind::Commercial);
    city.tick_slow_cycle();
    let first = city.zots_at(60, 60);

    city.tick_slow_cycle();
    assert_eq!(first, city.zots_at(60, 60));
    assert!(first.contains(&Zot::NoWorkers));
    assert!(first.contains(&Zot::NoCustomers));
}

#[test]
fn household_flags_goods_shortage_until_restocked() {
    let mut city = TestCity::new().with_building(50, 50, BuildingKind::Residential);
    city.tick_slow_cycle();
    assert_eq!(city.zots_at(50, 50), vec![Zot::NoGoods]);

    city.update_building(50, 50, |b| b.ledger.entry_mut(Tradeable::Goods).on_hand = 2);
    city.tick_slow_cycle();
    assert!(city.zots_at(50, 50).is_empty());
}

#[test]
fn residential_traffic_overload_boundary() {
    let mut city = TestCity::new()
        .with_road(48, 51, 52, 51)
        .with_building(50, 50, BuildingKind::Residential)
        .with_traffic(50, 51, 5000.0);
    city.update_building(50, 50, |b| b.ledger.entry_mut(Tradeable::Goods).on_hand = 1);

    // Exactly at the limit is tolerable.
    city.tick_slow_cycle();
    assert!(city.zots_at(50, 50).is_empty());

    city.set_traffic(50, 51, 5001.0);
    city.tick_slow_cycle();
    assert_eq!(city.zots_at(50, 50), vec![Zot::TooMuchTraffic]);
}

#[test]
fn traffic_off_the_road_network_is_not_counted() {
    let mut city = TestCity::new()
        .with_building(50, 50, BuildingKind::Residential)
        .with_traffic(51, 50, 100_000.0); // grass cell, no road anywhere
    city.update_building(50, 50, |b| b.ledger.entry_mut(Tradeable::Goods).on_hand = 1);
    city.tick_slow_cycle();

    assert!(city.zots_at(50, 50).is_empty());
}

#[test]
fn quiet_shop_flags_no_customers_until_traffic_passes() {
    let mut city = TestCity::new()
        .with_road(45, 52, 55, 52)
        .with_building(50, 50, BuildingKind::Commercial);
    city.update_building(50, 50, |b| b.ledger.entry_mut(Tradeable::Labor).bought = 4);
    city.tick_slow_cycle();
    assert_eq!(city.zots_at(50, 50), vec![Zot::NoCustomers]);

    // 100 units of passing traffic within radius 5 clears the flag.
    city.set_traffic(52, 52, 100.0);
    city.tick_slow_cycle();
    assert!(city.zots_at(50, 50).is_empty());
}

#[test]
fn idle_factory_flags_no_workers() {
    let mut city = TestCity::new().with_building(70, 70, BuildingKind::Industrial);
    city.tick_slow_cycle();
    assert_eq!(city.zots_at(70, 70), vec![Zot::NoWorkers]);

    city.update_building(70, 70, |b| b.ledger.entry_mut(Tradeable::Labor).bought = 8);
    city.tick_slow_cycle();
    assert!(city.zots_at(70, 70).is_empty());
}

#[test]
fn flags_union_zone_rules_with_generic_rules() {
    let mut city = TestCity::new().with_building(50, 50, BuildingKind::Industrial);
    city.update_building(50, 50, |b| b.powered = false);
    city.tick_slow_cycle();

    assert_eq!(city.zots_at(50, 50), vec![Zot::NoWorkers, Zot::NoPower]);
}
