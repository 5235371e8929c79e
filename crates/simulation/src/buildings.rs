use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tradeable {
    Labor,
    Goods,
    WholesaleGoods,
}

impl Tradeable {
    pub const ALL: [Tradeable; 3] = [Tradeable::Labor, Tradeable::Goods, Tradeable::WholesaleGoods];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// One tradeable's standing in a building's ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEntry {
    /// Standing quantity this building wants to buy.
    pub wanted: u32,
    /// Standing quantity offered for sale.
    pub for_sale: u32,
    /// Quantity actually bought from trading partners this period.
    pub bought: u32,
    /// Inventory currently held.
    pub on_hand: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLedger {
    entries: [TradeEntry; 3],
}

impl TradeLedger {
    /// Standing buy/sell offers a freshly constructed building posts:
    /// households sell labor and shop for goods, shops sell goods and hire
    /// labor (restocking wholesale), factories sell wholesale and hire labor.
    pub fn standing_offers(kind: BuildingKind) -> Self {
        let mut ledger = Self::default();
        match kind {
            BuildingKind::Residential => {
                ledger.entry_mut(Tradeable::Labor).for_sale = 4;
                ledger.entry_mut(Tradeable::Goods).wanted = 2;
            }
            BuildingKind::Commercial => {
                ledger.entry_mut(Tradeable::Labor).wanted = 4;
                ledger.entry_mut(Tradeable::Goods).for_sale = 4;
                ledger.entry_mut(Tradeable::WholesaleGoods).wanted = 2;
            }
            BuildingKind::Industrial => {
                ledger.entry_mut(Tradeable::Labor).wanted = 8;
                ledger.entry_mut(Tradeable::WholesaleGoods).for_sale = 4;
            }
            BuildingKind::Civic => {}
        }
        ledger
    }

    #[inline]
    pub fn entry(&self, tradeable: Tradeable) -> &TradeEntry {
        &self.entries[tradeable.index()]
    }

    #[inline]
    pub fn entry_mut(&mut self, tradeable: Tradeable) -> &mut TradeEntry {
        &mut self.entries[tradeable.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Residential,
    Commercial,
    Industrial,
    /// Anything without zone-specific economics (utilities, civic buildings);
    /// only the generic problem rules apply.
    Civic,
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub grid_x: usize,
    pub grid_y: usize,
    pub powered: bool,
    pub ledger: TradeLedger,
}

impl Building {
    pub fn new(kind: BuildingKind, grid_x: usize, grid_y: usize) -> Self {
        Self {
            kind,
            grid_x,
            grid_y,
            powered: true,
            ledger: TradeLedger::standing_offers(kind),
        }
    }

    /// Quantity of the tradeable bought from partners this period.
    #[inline]
    pub fn total_being_bought(&self, tradeable: Tradeable) -> u32 {
        self.ledger.entry(tradeable).bought
    }

    /// Inventory of the tradeable currently held.
    #[inline]
    pub fn quantity_on_hand(&self, tradeable: Tradeable) -> u32 {
        self.ledger.entry(tradeable).on_hand
    }
}
