//! Per-side FIFO inventory of unit positions

use std::collections::VecDeque;

use crate::domain::Side;

/// One side of the book held by the broker
///
/// Positions are single units stored by entry price and closed oldest-first.
/// PnL is expressed as a return on the entry price, so fees embedded in the
/// execution prices flow straight through.
#[derive(Debug, Clone)]
pub struct Inventory {
    side: Side,
    max_position: usize,
    positions: VecDeque<f64>,
    realized_pnl: f64,
    last_realized: f64,
    trade_count: usize,
}

impl Inventory {
    pub fn new(side: Side, max_position: usize) -> Self {
        Self {
            side,
            max_position,
            positions: VecDeque::with_capacity(max_position),
            realized_pnl: 0.0,
            last_realized: 0.0,
            trade_count: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_full(&self) -> bool {
        self.positions.len() >= self.max_position
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    /// Average entry price, 0 when flat
    pub fn average_price(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        self.positions.iter().sum::<f64>() / self.positions.len() as f64
    }

    /// Open one unit at `price`; refused when the side is at capacity
    pub fn add(&mut self, price: f64) -> bool {
        if self.is_full() {
            return false;
        }
        self.positions.push_back(price);
        true
    }

    /// Close the oldest unit at `price`, returning its realized PnL
    pub fn remove(&mut self, price: f64) -> Option<f64> {
        let entry = self.positions.pop_front()?;
        let pnl = self.trade_pnl(entry, price);
        self.realized_pnl += pnl;
        self.last_realized = pnl;
        self.trade_count += 1;
        Some(pnl)
    }

    /// Close every open unit at `price`, returning the total realized PnL
    pub fn flatten(&mut self, price: f64) -> f64 {
        let mut total = 0.0;
        while let Some(pnl) = self.remove(price) {
            total += pnl;
        }
        total
    }

    /// Take the PnL of the most recent close, leaving zero behind
    pub fn take_last_realized(&mut self) -> f64 {
        std::mem::take(&mut self.last_realized)
    }

    pub fn unrealized_pnl(&self, midpoint: f64) -> f64 {
        self.positions
            .iter()
            .map(|&entry| self.trade_pnl(entry, midpoint))
            .sum()
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.realized_pnl = 0.0;
        self.last_realized = 0.0;
        self.trade_count = 0;
    }

    fn trade_pnl(&self, entry: f64, exit: f64) -> f64 {
        if entry <= 0.0 || exit <= 0.0 {
            return 0.0;
        }
        match self.side {
            Side::Long => exit / entry - 1.0,
            Side::Short => entry / exit - 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_respects_capacity() {
        let mut inv = Inventory::new(Side::Long, 2);
        assert!(inv.add(100.0));
        assert!(inv.add(101.0));
        assert!(!inv.add(102.0));
        assert_eq!(inv.position_count(), 2);
        assert!(inv.is_full());
    }

    #[test]
    fn test_long_close_is_fifo() {
        let mut inv = Inventory::new(Side::Long, 5);
        inv.add(100.0);
        inv.add(200.0);

        let pnl = inv.remove(110.0).unwrap();
        assert!((pnl - 0.10).abs() < 1e-12);
        assert_eq!(inv.position_count(), 1);
        assert!((inv.average_price() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_pnl_gains_when_price_falls() {
        let mut inv = Inventory::new(Side::Short, 5);
        inv.add(110.0);
        let pnl = inv.remove(100.0).unwrap();
        assert!((pnl - 0.10).abs() < 1e-12);
        assert_eq!(inv.trade_count(), 1);
    }

    #[test]
    fn test_remove_on_empty_side() {
        let mut inv = Inventory::new(Side::Short, 5);
        assert!(inv.remove(100.0).is_none());
        assert_eq!(inv.trade_count(), 0);
    }

    #[test]
    fn test_flatten_closes_everything() {
        let mut inv = Inventory::new(Side::Long, 5);
        inv.add(100.0);
        inv.add(100.0);
        let total = inv.flatten(105.0);
        assert!((total - 0.10).abs() < 1e-12);
        assert_eq!(inv.position_count(), 0);
        assert_eq!(inv.trade_count(), 2);
    }

    #[test]
    fn test_take_last_realized_clears() {
        let mut inv = Inventory::new(Side::Long, 5);
        inv.add(100.0);
        inv.remove(101.0);
        assert!(inv.take_last_realized() > 0.0);
        assert_eq!(inv.take_last_realized(), 0.0);
    }

    #[test]
    fn test_unrealized_marks_all_units() {
        let mut inv = Inventory::new(Side::Long, 5);
        inv.add(100.0);
        inv.add(100.0);
        assert!((inv.unrealized_pnl(101.0) - 0.02).abs() < 1e-12);
        assert_eq!(inv.unrealized_pnl(100.0), 0.0);
    }
}
