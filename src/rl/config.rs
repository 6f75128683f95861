//! RL Configuration
//!
//! Configuration for the replay environment. Every field changes behavior.

use serde::{Deserialize, Serialize};

/// Replay environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Random episode start (training) vs. start at index 0 (evaluation)
    pub training: bool,
    /// Snapshot indices advanced per sub-step
    pub step_size: usize,
    /// Maximum open units per side
    pub max_position: usize,
    /// Rows in the observation window
    pub window_size: usize,
    /// Seed for the episode start generator
    pub seed: u64,
    /// Sub-steps per `step` call
    pub action_repeats: usize,
    /// Append a trailing singleton axis to observations
    pub format_3d: bool,
    /// Proportional fee charged against the agent on every ledger fill
    pub fee: f64,
    /// Identifier of the data the scaler was fitted on
    pub fitting_data: String,
    /// Identifier of the data replayed in episodes
    pub episode_data: String,
    /// Bound applied to normalized market features
    pub clip_range: f64,
    /// Steps in the trade-flow imbalance window
    pub trade_flow_window: usize,
    /// Steps in the RSI smoothing window
    pub rsi_window: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            training: true,
            step_size: 1,
            max_position: 5,
            window_size: 10,
            seed: 1,
            action_repeats: 10,
            format_3d: false,
            fee: 0.0005,
            fitting_data: "ETH-USD_2018-12-31.xz".to_string(),
            episode_data: "ETH-USD_2019-01-01.xz".to_string(),
            clip_range: 10.0,
            trade_flow_window: 60,
            rsi_window: 14,
        }
    }
}

impl ReplayConfig {
    /// Instrument symbol, sliced from the episode data identifier
    pub fn symbol(&self) -> String {
        self.episode_data.chars().take(7).collect()
    }

    /// PnL that maps to 1.0 in the total-PnL observation feature
    pub fn target_pnl(&self) -> f64 {
        self.fee * 10.0 * self.max_position as f64
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.step_size == 0 {
            errors.push("step_size must be positive".to_string());
        }
        if self.window_size == 0 {
            errors.push("window_size must be positive".to_string());
        }
        if self.action_repeats == 0 {
            errors.push("action_repeats must be positive".to_string());
        }
        if self.max_position == 0 {
            errors.push("max_position must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.fee) {
            errors.push(format!("fee must be in [0, 1), got {}", self.fee));
        }
        if !(self.clip_range > 0.0) {
            errors.push("clip_range must be positive".to_string());
        }
        if self.trade_flow_window == 0 || self.rsi_window == 0 {
            errors.push("indicator windows must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ReplayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_symbol_from_episode_data() {
        let config = ReplayConfig::default();
        assert_eq!(config.symbol(), "ETH-USD");

        let config = ReplayConfig {
            episode_data: "BTC".to_string(),
            ..Default::default()
        };
        assert_eq!(config.symbol(), "BTC");
    }

    #[test]
    fn test_target_pnl() {
        let config = ReplayConfig {
            fee: 0.001,
            max_position: 5,
            ..Default::default()
        };
        assert!((config.target_pnl() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ReplayConfig {
            step_size: 0,
            window_size: 0,
            fee: 1.5,
            clip_range: f64::NAN,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ReplayConfig =
            serde_json::from_str(r#"{"window_size": 4, "training": false}"#).unwrap();
        assert_eq!(config.window_size, 4);
        assert!(!config.training);
        assert_eq!(config.action_repeats, 10);
    }
}
