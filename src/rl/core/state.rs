//! State Representation
//!
//! Defines the feature layout of one observation row and the named-offset
//! schema every component uses to address it.
//!
//! A row is laid out as:
//!
//! ```text
//! [ market columns.. | tns rsi | 5 position scalars | 3 action one-hot | reward ]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TapeGymError};

/// Indicator features per row
pub const INDICATOR_FEATURES: usize = 2;

/// Position-state features per row
pub const POSITION_FEATURES: usize = 5;

/// Action one-hot features per row
pub const ACTION_FEATURES: usize = super::action::NUM_ACTIONS;

/// Running reward features per row
pub const REWARD_FEATURES: usize = 1;

/// Features appended after the market segment
pub const VARIABLE_FEATURES: usize =
    INDICATOR_FEATURES + POSITION_FEATURES + ACTION_FEATURES + REWARD_FEATURES;

const INDICATOR_NAMES: [&str; INDICATOR_FEATURES] = ["tns", "rsi"];

const POSITION_NAMES: [&str; POSITION_FEATURES] = [
    "long_inventory",
    "short_inventory",
    "total_unrealized_and_realized_pnl",
    "long_unrealized_pnl",
    "short_unrealized_pnl",
];

const ACTION_NAMES: [&str; ACTION_FEATURES] = ["action_hold", "action_buy", "action_sell"];

const REWARD_NAME: &str = "reward";

/// Tape columns the environment reads by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBindings {
    pub midpoint: String,
    pub buys: String,
    pub sells: String,
    pub best_bid_distance: String,
    pub best_ask_distance: String,
    pub bid_notional: String,
    pub ask_notional: String,
}

impl ColumnBindings {
    /// Standard column names for one venue (e.g., "coinbase")
    pub fn for_venue(venue: &str) -> Self {
        Self {
            midpoint: format!("{venue}-midpoint"),
            buys: format!("{venue}-buys"),
            sells: format!("{venue}-sells"),
            best_bid_distance: format!("{venue}-bid-distance-0"),
            best_ask_distance: format!("{venue}-ask-distance-0"),
            bid_notional: format!("{venue}-bid-notional-0"),
            ask_notional: format!("{venue}-ask-notional-0"),
        }
    }

    /// Bound column names in canonical order
    pub fn names(&self) -> [&str; 7] {
        [
            self.midpoint.as_str(),
            self.buys.as_str(),
            self.sells.as_str(),
            self.best_bid_distance.as_str(),
            self.best_ask_distance.as_str(),
            self.bid_notional.as_str(),
            self.ask_notional.as_str(),
        ]
    }
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self::for_venue("coinbase")
    }
}

/// Resolved column offsets for the bound roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOffsets {
    pub midpoint: usize,
    pub buys: usize,
    pub sells: usize,
    pub best_bid_distance: usize,
    pub best_ask_distance: usize,
    pub bid_notional: usize,
    pub ask_notional: usize,
}

/// Immutable feature layout shared by the tape and the environment
///
/// Market columns occupy the head of every row in tape order, so a tape
/// column's offset is also its offset in the feature vector.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    offsets: HashMap<String, usize>,
    market_len: usize,
    columns: ColumnOffsets,
}

impl FeatureSchema {
    /// Build a schema from the tape's market columns
    pub fn new(market_columns: Vec<String>, bindings: &ColumnBindings) -> Result<Self> {
        if market_columns.is_empty() {
            return Err(TapeGymError::InvalidTape(
                "schema needs at least one market column".to_string(),
            ));
        }

        let market_len = market_columns.len();
        let mut names = market_columns;
        names.extend(INDICATOR_NAMES.iter().map(|s| s.to_string()));
        names.extend(POSITION_NAMES.iter().map(|s| s.to_string()));
        names.extend(ACTION_NAMES.iter().map(|s| s.to_string()));
        names.push(REWARD_NAME.to_string());

        let mut offsets = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if offsets.insert(name.clone(), i).is_some() {
                return Err(TapeGymError::InvalidTape(format!(
                    "duplicate feature name: {name}"
                )));
            }
        }

        let market_offset = |name: &str| -> Result<usize> {
            match offsets.get(name) {
                Some(&i) if i < market_len => Ok(i),
                _ => Err(TapeGymError::UnknownColumn(name.to_string())),
            }
        };

        let columns = ColumnOffsets {
            midpoint: market_offset(&bindings.midpoint)?,
            buys: market_offset(&bindings.buys)?,
            sells: market_offset(&bindings.sells)?,
            best_bid_distance: market_offset(&bindings.best_bid_distance)?,
            best_ask_distance: market_offset(&bindings.best_ask_distance)?,
            bid_notional: market_offset(&bindings.bid_notional)?,
            ask_notional: market_offset(&bindings.ask_notional)?,
        };

        Ok(Self {
            names,
            offsets,
            market_len,
            columns,
        })
    }

    /// Offset of a named feature within a row
    pub fn offset(&self, name: &str) -> Option<usize> {
        self.offsets.get(name).copied()
    }

    /// All feature names in row order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn market_columns(&self) -> &[String] {
        &self.names[..self.market_len]
    }

    pub fn market_len(&self) -> usize {
        self.market_len
    }

    pub fn columns(&self) -> &ColumnOffsets {
        &self.columns
    }

    /// Total features per row
    pub fn feature_count(&self) -> usize {
        self.market_len + VARIABLE_FEATURES
    }

    pub fn indicator_offset(&self) -> usize {
        self.market_len
    }

    pub fn position_offset(&self) -> usize {
        self.indicator_offset() + INDICATOR_FEATURES
    }

    pub fn action_offset(&self) -> usize {
        self.position_offset() + POSITION_FEATURES
    }

    pub fn reward_offset(&self) -> usize {
        self.action_offset() + ACTION_FEATURES
    }
}

/// Inventory summary appended to every row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// Long units over max position
    pub long_inventory: f32,
    /// Short units over max position
    pub short_inventory: f32,
    /// Total PnL over the target PnL
    pub total_pnl: f32,
    /// Long unrealized PnL over the reward scale
    pub long_unrealized_pnl: f32,
    /// Short unrealized PnL over the reward scale
    pub short_unrealized_pnl: f32,
}

impl PositionState {
    pub fn to_array(&self) -> [f32; POSITION_FEATURES] {
        [
            self.long_inventory,
            self.short_inventory,
            self.total_pnl,
            self.long_unrealized_pnl,
            self.short_unrealized_pnl,
        ]
    }
}

/// One observation row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Assemble a row from its segments
    ///
    /// Market values are clipped to `[-clip, clip]`.
    pub fn assemble(
        schema: &FeatureSchema,
        market: &[f64],
        indicators: [f64; INDICATOR_FEATURES],
        position: &PositionState,
        action: [f32; ACTION_FEATURES],
        reward: f64,
        clip: f64,
    ) -> Self {
        debug_assert_eq!(market.len(), schema.market_len());

        let mut values = Vec::with_capacity(schema.feature_count());
        values.extend(market.iter().map(|&v| clip_value(v, clip) as f32));
        values.extend(indicators.iter().map(|&v| v as f32));
        values.extend_from_slice(&position.to_array());
        values.extend_from_slice(&action);
        values.push(reward as f32);

        debug_assert_eq!(
            values.len(),
            schema.feature_count(),
            "Feature count mismatch: {} vs {}",
            values.len(),
            schema.feature_count()
        );

        Self(values)
    }

    /// Look up a feature by name
    pub fn get(&self, schema: &FeatureSchema, name: &str) -> Option<f32> {
        schema.offset(name).and_then(|i| self.0.get(i).copied())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn clip_value(value: f64, clip: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-clip, clip)
}
