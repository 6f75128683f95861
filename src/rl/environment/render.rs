//! Best-effort visualization sinks
//!
//! Rendering never feeds back into the environment; sinks only observe the
//! midpoint stream.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Render mode tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Human,
    Ansi,
}

/// Receiver for rendered midpoints
#[cfg_attr(test, mockall::automock)]
pub trait RenderSink {
    fn render(&mut self, midpoint: f64, mode: RenderMode);

    /// Called on every episode reset with the midpoints replayed during warm-up
    fn reset(&mut self, _midpoints: &[f64]) {}
}

/// Discards every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn render(&mut self, _midpoint: f64, _mode: RenderMode) {}
}

/// Keeps a rolling midpoint trace and reports it through `tracing`
#[derive(Debug, Clone)]
pub struct TracingRender {
    symbol: String,
    history: VecDeque<f64>,
    capacity: usize,
}

impl TracingRender {
    pub fn new(symbol: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            symbol: symbol.into(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Seed the trace with a slice of midpoints
    pub fn reset_render_data(&mut self, midpoints: &[f64]) {
        self.history.clear();
        let start = midpoints.len().saturating_sub(self.capacity);
        self.history.extend(&midpoints[start..]);
    }

    fn sparkline(&self) -> String {
        const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        let lo = self.history.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;
        self.history
            .iter()
            .map(|&m| {
                if span <= f64::EPSILON {
                    BARS[0]
                } else {
                    BARS[(((m - lo) / span) * 7.0).round() as usize]
                }
            })
            .collect()
    }
}

impl RenderSink for TracingRender {
    fn reset(&mut self, midpoints: &[f64]) {
        self.reset_render_data(midpoints);
    }

    fn render(&mut self, midpoint: f64, mode: RenderMode) {
        self.history.push_back(midpoint);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        match mode {
            RenderMode::Human => info!(symbol = %self.symbol, midpoint, "render"),
            RenderMode::Ansi => info!(symbol = %self.symbol, midpoint, trace = %self.sparkline(), "render"),
        }
    }
}
