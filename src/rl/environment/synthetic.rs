//! Synthetic tape generation for demos and tests
//!
//! Produces a single-venue tape from a seeded random walk, along with the
//! normalized table the environment expects (log-differenced midpoint and
//! per-column z-scores).

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::market::MarketTape;
use crate::error::{Result, TapeGymError};
use crate::rl::core::{ColumnBindings, FeatureSchema};

/// Synthetic tape configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTapeConfig {
    /// Number of snapshots
    pub rows: usize,
    /// Starting midpoint
    pub initial_price: f64,
    /// Max fractional midpoint move per snapshot
    pub volatility: f64,
    /// Generator seed
    pub seed: u64,
    /// Venue prefix for column names
    pub venue: String,
}

impl Default for SyntheticTapeConfig {
    fn default() -> Self {
        Self {
            rows: 2_000,
            initial_price: 100.0,
            volatility: 0.001,
            seed: 7,
            venue: "coinbase".to_string(),
        }
    }
}

/// Generate a seeded sample tape
pub fn generate_sample_tape(config: &SyntheticTapeConfig) -> Result<MarketTape> {
    if config.rows < 2 {
        return Err(TapeGymError::InvalidTape(
            "synthetic tape needs at least two rows".to_string(),
        ));
    }
    if !(config.initial_price > 0.0) || !(config.volatility >= 0.0) {
        return Err(TapeGymError::InvalidTape(format!(
            "invalid synthetic price process: price {} volatility {}",
            config.initial_price, config.volatility
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut midpoint = config.initial_price;
    let mut raw = Vec::with_capacity(config.rows);

    for _ in 0..config.rows {
        let shock = if config.volatility > 0.0 {
            rng.gen_range(-config.volatility..config.volatility)
        } else {
            0.0
        };
        // mild pull back toward the starting price
        let reversion = 0.001 * (config.initial_price - midpoint) / config.initial_price;
        midpoint = (midpoint * (1.0 + shock + reversion)).max(0.01);

        let buys = if rng.gen_bool(0.6) { rng.gen_range(0.0..10.0) } else { 0.0 };
        let sells = if rng.gen_bool(0.6) { rng.gen_range(0.0..10.0) } else { 0.0 };
        let half_spread = midpoint * rng.gen_range(0.00005..0.0005);

        raw.push(vec![
            midpoint,
            buys,
            sells,
            half_spread,
            half_spread,
            rng.gen_range(1_000.0..50_000.0),
            rng.gen_range(1_000.0..50_000.0),
        ]);
    }

    let bindings = ColumnBindings::for_venue(&config.venue);
    let columns: Vec<String> = bindings.names().iter().map(|s| s.to_string()).collect();
    let schema = Arc::new(FeatureSchema::new(columns, &bindings)?);
    let normalized = normalize(&raw, schema.columns().midpoint);

    MarketTape::new(schema, raw, normalized)
}

/// Build a tape that replays the given midpoints with no trade flow
///
/// Book distances are zero and notionals flat, so the only moving market
/// feature is the normalized midpoint return.
pub fn tape_from_midpoints(midpoints: &[f64], venue: &str) -> Result<MarketTape> {
    let bindings = ColumnBindings::for_venue(venue);
    let columns: Vec<String> = bindings.names().iter().map(|s| s.to_string()).collect();
    let schema = Arc::new(FeatureSchema::new(columns, &bindings)?);

    let raw: Vec<Vec<f64>> = midpoints
        .iter()
        .map(|&mid| vec![mid, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0])
        .collect();
    let normalized = if raw.iter().all(|r| r[0] > 0.0) {
        normalize(&raw, schema.columns().midpoint)
    } else {
        // MarketTape::new rejects the bad midpoint with a precise message
        raw.clone()
    };

    MarketTape::new(schema, raw, normalized)
}

/// Log-difference the midpoint column, then z-score every column
fn normalize(raw: &[Vec<f64>], mid_col: usize) -> Vec<Vec<f64>> {
    let mut table: Vec<Vec<f64>> = raw.to_vec();

    for i in (1..table.len()).rev() {
        table[i][mid_col] = raw[i][mid_col].ln() - raw[i - 1][mid_col].ln();
    }
    // back-fill the first row, which has no predecessor
    if table.len() > 1 {
        table[0][mid_col] = table[1][mid_col];
    }

    let width = table.first().map_or(0, |r| r.len());
    let n = table.len() as f64;
    for col in 0..width {
        let mean = table.iter().map(|r| r[col]).sum::<f64>() / n;
        let var = table.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        for row in table.iter_mut() {
            row[col] = if std > 1e-12 { (row[col] - mean) / std } else { 0.0 };
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tape_generation() {
        let config = SyntheticTapeConfig {
            rows: 500,
            ..Default::default()
        };
        let tape = generate_sample_tape(&config).unwrap();
        assert_eq!(tape.len(), 500);
        assert!(tape.midpoints().iter().all(|&m| m > 0.0));
        assert_eq!(tape.schema().market_columns()[0], "coinbase-midpoint");
    }

    #[test]
    fn test_same_seed_same_tape() {
        let config = SyntheticTapeConfig {
            rows: 100,
            ..Default::default()
        };
        let a = generate_sample_tape(&config).unwrap();
        let b = generate_sample_tape(&config).unwrap();
        assert_eq!(a.midpoints(), b.midpoints());
        assert_eq!(a.normalized_row(42), b.normalized_row(42));
    }

    #[test]
    fn test_normalized_columns_are_standardized() {
        let tape = generate_sample_tape(&SyntheticTapeConfig {
            rows: 1_000,
            ..Default::default()
        })
        .unwrap();

        let n = tape.len() as f64;
        for col in 0..tape.schema().market_len() {
            let mean = (0..tape.len())
                .map(|i| tape.normalized_row(i)[col])
                .sum::<f64>()
                / n;
            assert!(mean.abs() < 1e-9, "column {col} mean {mean}");
        }
    }

    #[test]
    fn test_normalize_log_diff_and_backfill() {
        let raw = vec![
            vec![100.0, 1.0],
            vec![110.0, 2.0],
            vec![121.0, 3.0],
        ];
        let table = normalize(&raw, 0);
        // equal log returns collapse to a constant column
        assert!(table.iter().all(|r| r[0] == 0.0));
        assert!(table[0][1] < 0.0 && table[2][1] > 0.0);
    }

    #[test]
    fn test_tape_from_midpoints() {
        let tape = tape_from_midpoints(&[100.0, 101.0, 102.0], "kraken").unwrap();
        assert_eq!(tape.len(), 3);
        assert_eq!(tape.midpoint(2), 102.0);
        assert_eq!(tape.schema().market_columns()[0], "kraken-midpoint");
        assert_eq!(tape.trade_volumes(1).buys, 0.0);
        assert!(tape_from_midpoints(&[100.0, -1.0], "kraken").is_err());
    }

    #[test]
    fn test_too_short_tape_rejected() {
        let config = SyntheticTapeConfig {
            rows: 1,
            ..Default::default()
        };
        assert!(generate_sample_tape(&config).is_err());
    }
}
