//! Reward Signals
//!
//! Reward constants and the per-action outcome reported back to callers.

use serde::{Deserialize, Serialize};

/// Reward granted for holding and subtracted when the ledger refuses an order
///
/// Keeps the signal dense while idle; orders of magnitude below any PnL.
pub const IDLE_REWARD: f64 = 1e-12;

/// What happened to the action supplied to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ActionOutcome {
    /// The action reached the ledger (or was a hold)
    Applied,
    /// The ledger refused to open a position
    Rejected(String),
    /// The action index does not name an action
    Invalid(String),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

impl Default for ActionOutcome {
    fn default() -> Self {
        ActionOutcome::Applied
    }
}

/// Reward contribution and outcome of one sub-step's action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEffect {
    pub reward: f64,
    pub outcome: ActionOutcome,
}

impl ActionEffect {
    pub fn applied(reward: f64) -> Self {
        Self {
            reward,
            outcome: ActionOutcome::Applied,
        }
    }

    pub fn rejected(reward: f64, reason: impl Into<String>) -> Self {
        Self {
            reward,
            outcome: ActionOutcome::Rejected(reason.into()),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            reward: 0.0,
            outcome: ActionOutcome::Invalid(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_reward_is_negligible() {
        assert!(IDLE_REWARD > 0.0);
        assert!(IDLE_REWARD < 1e-9);
    }

    #[test]
    fn test_invalid_effect_has_zero_reward() {
        let effect = ActionEffect::invalid("action=9");
        assert_eq!(effect.reward, 0.0);
        assert!(!effect.outcome.is_applied());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(ActionOutcome::Rejected("full".into())).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "full");

        let json = serde_json::to_value(ActionOutcome::Applied).unwrap();
        assert_eq!(json["status"], "applied");
    }
}
