//! Streaming indicators fed by the replay environment
//!
//! Each indicator consumes one input per sub-step and exposes a bounded
//! value. The environment calls `step` before reading `value` on every
//! sub-step (warm-up included) and `reset` at the start of every episode.

mod rsi;
mod trade_flow;

pub use rsi::Rsi;
pub use trade_flow::{TradeFlowImbalance, TradeVolumes};

/// Streaming indicator contract
pub trait Indicator {
    /// Per-step input
    type Input;

    /// Feed one observation
    fn step(&mut self, input: Self::Input);

    /// Current value, bounded to [-1, 1]
    fn value(&self) -> f64;

    /// Clear all accumulated state
    fn reset(&mut self);

    /// Steps needed before `value` is fully formed
    fn lag(&self) -> usize;
}
