//! Trade-flow imbalance (trades and size)
//!
//! Rolling imbalance between aggressive buy and sell volume over a fixed
//! number of steps: `(buys - sells) / (buys + sells)`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Indicator;

/// Buy and sell volume traded during one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeVolumes {
    pub buys: f64,
    pub sells: f64,
}

/// Rolling buy/sell volume imbalance
#[derive(Debug, Clone)]
pub struct TradeFlowImbalance {
    window: usize,
    history: VecDeque<TradeVolumes>,
    buy_total: f64,
    sell_total: f64,
}

/// Upper bound on the history slots reserved up front
const PREALLOCATED_STEPS: usize = 4096;

impl TradeFlowImbalance {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window.min(PREALLOCATED_STEPS) + 1),
            buy_total: 0.0,
            sell_total: 0.0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for TradeFlowImbalance {
    fn default() -> Self {
        Self::new(60)
    }
}

impl Indicator for TradeFlowImbalance {
    type Input = TradeVolumes;

    fn step(&mut self, input: TradeVolumes) {
        // Negative or NaN volumes are treated as no trading
        let volumes = TradeVolumes {
            buys: if input.buys > 0.0 { input.buys } else { 0.0 },
            sells: if input.sells > 0.0 { input.sells } else { 0.0 },
        };
        self.buy_total += volumes.buys;
        self.sell_total += volumes.sells;
        self.history.push_back(volumes);

        if self.history.len() > self.window {
            if let Some(old) = self.history.pop_front() {
                self.buy_total -= old.buys;
                self.sell_total -= old.sells;
            }
        }
    }

    fn value(&self) -> f64 {
        let total = self.buy_total + self.sell_total;
        if total <= f64::EPSILON {
            return 0.0;
        }
        ((self.buy_total - self.sell_total) / total).clamp(-1.0, 1.0)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.buy_total = 0.0;
        self.sell_total = 0.0;
    }

    fn lag(&self) -> usize {
        self.window
    }
}
