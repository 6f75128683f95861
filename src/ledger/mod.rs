//! Position Ledger
//!
//! Tracks long/short inventory and realized/unrealized PnL for the replay
//! environment. The environment only talks to the ledger through the
//! [`PositionLedger`] trait; [`Broker`] is the default implementation.

mod broker;
mod inventory;

pub use broker::{Broker, LedgerConfig};
pub use inventory::Inventory;

use crate::domain::{Order, Side};

/// Contract between the replay environment and an inventory/PnL ledger
#[cfg_attr(test, mockall::automock)]
pub trait PositionLedger {
    /// Mark open inventory to the current midpoint
    fn step(&mut self, midpoint: f64);

    /// Open or add inventory on the order's side; `false` if refused
    fn add(&mut self, order: &Order) -> bool;

    /// Close the oldest open position on the order's side
    fn remove(&mut self, order: &Order);

    /// Realized reward from the most recent close on `side`
    fn get_reward(&mut self, side: Side) -> f64;

    /// Realized plus unrealized PnL at `midpoint`
    fn total_pnl(&self, midpoint: f64) -> f64;

    /// Number of closed trades this episode
    fn total_trade_count(&self) -> usize;

    /// Force-close inventory at the order price, returning the realized PnL
    fn flatten_inventory(&mut self, order: &Order) -> f64;

    /// Drop all inventory and PnL
    fn reset(&mut self);

    /// Open long positions
    fn long_inventory_count(&self) -> usize;

    /// Open short positions
    fn short_inventory_count(&self) -> usize;

    /// Unrealized PnL of one side at `midpoint`
    ///
    /// Only read to build the position-state observation features.
    fn unrealized_pnl(&self, side: Side, midpoint: f64) -> f64;

    /// Divisor used when exposing PnL as observation features
    ///
    /// Only read to build the position-state observation features.
    fn reward_scale(&self) -> f64;
}
