//! Market Tape
//!
//! Pre-ingested, time-ordered snapshot records replayed by the environment.
//! Holds the raw table, a normalized table indexed identically, and the
//! midpoint series pulled from the raw table.

use std::sync::Arc;

use crate::error::{Result, TapeGymError};
use crate::indicators::TradeVolumes;
use crate::rl::core::FeatureSchema;

/// Read-only replay data
#[derive(Debug, Clone)]
pub struct MarketTape {
    schema: Arc<FeatureSchema>,
    raw: Vec<f64>,
    normalized: Vec<f64>,
    midpoints: Vec<f64>,
    rows: usize,
}

impl MarketTape {
    /// Build a tape from row-major raw and normalized tables
    pub fn new(
        schema: Arc<FeatureSchema>,
        raw: Vec<Vec<f64>>,
        normalized: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if raw.is_empty() {
            return Err(TapeGymError::InvalidTape("tape has no rows".to_string()));
        }
        if raw.len() != normalized.len() {
            return Err(TapeGymError::InvalidTape(format!(
                "raw table has {} rows, normalized table has {}",
                raw.len(),
                normalized.len()
            )));
        }

        let width = schema.market_len();
        let rows = raw.len();
        let mut raw_flat = Vec::with_capacity(rows * width);
        let mut normalized_flat = Vec::with_capacity(rows * width);
        let mut midpoints = Vec::with_capacity(rows);
        let mid_col = schema.columns().midpoint;

        for (i, (raw_row, norm_row)) in raw.iter().zip(normalized.iter()).enumerate() {
            if raw_row.len() != width || norm_row.len() != width {
                return Err(TapeGymError::InvalidTape(format!(
                    "row {i} width mismatch: expected {width}, raw {} normalized {}",
                    raw_row.len(),
                    norm_row.len()
                )));
            }
            let mid = raw_row[mid_col];
            if !mid.is_finite() || mid <= 0.0 {
                return Err(TapeGymError::InvalidTape(format!(
                    "row {i} has invalid midpoint {mid}"
                )));
            }
            midpoints.push(mid);
            raw_flat.extend_from_slice(raw_row);
            normalized_flat.extend_from_slice(norm_row);
        }

        Ok(Self {
            schema,
            raw: raw_flat,
            normalized: normalized_flat,
            midpoints,
            rows,
        })
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Number of snapshots
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn midpoint(&self, index: usize) -> f64 {
        self.midpoints[index]
    }

    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    /// Raw row at `index`
    pub fn raw_row(&self, index: usize) -> &[f64] {
        let width = self.schema.market_len();
        &self.raw[index * width..(index + 1) * width]
    }

    /// Normalized row at `index`
    pub fn normalized_row(&self, index: usize) -> &[f64] {
        let width = self.schema.market_len();
        &self.normalized[index * width..(index + 1) * width]
    }

    /// Raw value of a named column
    pub fn raw_value(&self, index: usize, column: &str) -> Option<f64> {
        let offset = self.schema.offset(column)?;
        self.raw_row(index).get(offset).copied()
    }

    /// Traded volumes at `index`
    pub fn trade_volumes(&self, index: usize) -> TradeVolumes {
        let cols = self.schema.columns();
        let row = self.raw_row(index);
        TradeVolumes {
            buys: row[cols.buys],
            sells: row[cols.sells],
        }
    }

    /// Best bid and ask at `index`, rounded to cents
    pub fn best_bid_ask(&self, index: usize) -> (f64, f64) {
        let cols = self.schema.columns();
        let row = self.raw_row(index);
        let mid = self.midpoints[index];
        let bid = round_cents(mid - row[cols.best_bid_distance]);
        let ask = round_cents(mid + row[cols.best_ask_distance]);
        (bid, ask)
    }

    /// Notional resting at the best bid and ask at `index`
    pub fn best_notional(&self, index: usize) -> (f64, f64) {
        let cols = self.schema.columns();
        let row = self.raw_row(index);
        (row[cols.bid_notional], row[cols.ask_notional])
    }

    pub fn min_midpoint(&self) -> f64 {
        self.midpoints.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_midpoint(&self) -> f64 {
        self.midpoints.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
