//! Default position ledger

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::inventory::Inventory;
use super::PositionLedger;
use crate::domain::{Order, Side};

/// Broker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum open units per side
    pub max_position: usize,
    /// Divisor applied to unrealized PnL in observations
    pub reward_scale: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_position: 5,
            reward_scale: 1.0,
        }
    }
}

/// Two-sided inventory ledger
#[derive(Debug, Clone)]
pub struct Broker {
    config: LedgerConfig,
    long_inventory: Inventory,
    short_inventory: Inventory,
    last_midpoint: f64,
}

impl Broker {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            long_inventory: Inventory::new(Side::Long, config.max_position),
            short_inventory: Inventory::new(Side::Short, config.max_position),
            config,
            last_midpoint: 0.0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn long_inventory(&self) -> &Inventory {
        &self.long_inventory
    }

    pub fn short_inventory(&self) -> &Inventory {
        &self.short_inventory
    }

    /// Midpoint from the latest mark-to-market
    pub fn last_midpoint(&self) -> f64 {
        self.last_midpoint
    }

    pub fn realized_pnl(&self) -> f64 {
        self.long_inventory.realized_pnl() + self.short_inventory.realized_pnl()
    }

    fn inventory_mut(&mut self, side: Side) -> &mut Inventory {
        match side {
            Side::Long => &mut self.long_inventory,
            Side::Short => &mut self.short_inventory,
        }
    }

    fn inventory(&self, side: Side) -> &Inventory {
        match side {
            Side::Long => &self.long_inventory,
            Side::Short => &self.short_inventory,
        }
    }
}

impl PositionLedger for Broker {
    fn step(&mut self, midpoint: f64) {
        self.last_midpoint = midpoint;
        trace!(
            midpoint,
            long = self.long_inventory.position_count(),
            short = self.short_inventory.position_count(),
            "ledger marked to market"
        );
    }

    fn add(&mut self, order: &Order) -> bool {
        let Some(side) = order.side() else {
            return false;
        };
        let accepted = self.inventory_mut(side).add(order.price());
        if !accepted {
            debug!(
                %side,
                price = order.price(),
                max_position = self.config.max_position,
                "inventory full, order refused"
            );
        }
        accepted
    }

    fn remove(&mut self, order: &Order) {
        let Some(side) = order.side() else {
            return;
        };
        if let Some(pnl) = self.inventory_mut(side).remove(order.price()) {
            debug!(%side, price = order.price(), pnl, "position closed");
        }
    }

    fn get_reward(&mut self, side: Side) -> f64 {
        self.inventory_mut(side).take_last_realized()
    }

    fn total_pnl(&self, midpoint: f64) -> f64 {
        self.realized_pnl()
            + self.long_inventory.unrealized_pnl(midpoint)
            + self.short_inventory.unrealized_pnl(midpoint)
    }

    fn total_trade_count(&self) -> usize {
        self.long_inventory.trade_count() + self.short_inventory.trade_count()
    }

    fn flatten_inventory(&mut self, order: &Order) -> f64 {
        let price = order.price();
        let pnl = match order.side() {
            Some(side) => self.inventory_mut(side).flatten(price),
            None => self.long_inventory.flatten(price) + self.short_inventory.flatten(price),
        };
        debug!(price, pnl, "inventory flattened");
        pnl
    }

    fn reset(&mut self) {
        self.long_inventory.reset();
        self.short_inventory.reset();
        self.last_midpoint = 0.0;
    }

    fn long_inventory_count(&self) -> usize {
        self.long_inventory.position_count()
    }

    fn short_inventory_count(&self) -> usize {
        self.short_inventory.position_count()
    }

    fn unrealized_pnl(&self, side: Side, midpoint: f64) -> f64 {
        self.inventory(side).unrealized_pnl(midpoint)
    }

    fn reward_scale(&self) -> f64 {
        self.config.reward_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker() -> Broker {
        Broker::new(LedgerConfig {
            max_position: 2,
            reward_scale: 1.0,
        })
    }

    #[test]
    fn test_add_until_full() {
        let mut broker = broker();
        assert!(broker.add(&Order::long("ETH-USD", 100.0, 0)));
        assert!(broker.add(&Order::long("ETH-USD", 100.0, 1)));
        assert!(!broker.add(&Order::long("ETH-USD", 100.0, 2)));
        assert_eq!(broker.long_inventory_count(), 2);
        assert_eq!(broker.short_inventory_count(), 0);
    }

    #[test]
    fn test_liquidation_order_is_never_added() {
        let mut broker = broker();
        assert!(!broker.add(&Order::liquidation("ETH-USD", 100.0, 0)));
        assert_eq!(broker.long_inventory_count(), 0);
    }

    #[test]
    fn test_close_reports_reward_once() {
        let mut broker = broker();
        broker.add(&Order::short("ETH-USD", 110.0, 0));
        broker.remove(&Order::short("ETH-USD", 100.0, 5));

        let reward = broker.get_reward(Side::Short);
        assert!((reward - 0.10).abs() < 1e-12);
        assert_eq!(broker.get_reward(Side::Short), 0.0);
        assert_eq!(broker.total_trade_count(), 1);
    }

    #[test]
    fn test_total_pnl_includes_unrealized() {
        let mut broker = broker();
        broker.add(&Order::long("ETH-USD", 100.0, 0));
        broker.add(&Order::short("ETH-USD", 100.0, 0));
        broker.step(110.0);

        let expected = 0.10 + (100.0 / 110.0 - 1.0);
        assert!((broker.total_pnl(110.0) - expected).abs() < 1e-12);
        assert_eq!(broker.last_midpoint(), 110.0);
    }

    #[test]
    fn test_flatten_both_sides() {
        let mut broker = broker();
        broker.add(&Order::long("ETH-USD", 100.0, 0));
        broker.add(&Order::long("ETH-USD", 100.0, 0));
        broker.add(&Order::short("ETH-USD", 100.0, 0));

        let pnl = broker.flatten_inventory(&Order::liquidation("ETH-USD", 100.0, 9));
        assert_eq!(pnl, 0.0);
        assert_eq!(broker.long_inventory_count(), 0);
        assert_eq!(broker.short_inventory_count(), 0);
        assert_eq!(broker.total_trade_count(), 3);
    }

    #[test]
    fn test_reset_clears_episode() {
        let mut broker = broker();
        broker.add(&Order::long("ETH-USD", 100.0, 0));
        broker.remove(&Order::long("ETH-USD", 120.0, 1));
        broker.reset();

        assert_eq!(broker.total_trade_count(), 0);
        assert_eq!(broker.total_pnl(100.0), 0.0);
        assert_eq!(broker.get_reward(Side::Long), 0.0);
    }
}
