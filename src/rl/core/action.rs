//! Action Space
//!
//! Discrete action space exposed by the replay environment.

use serde::{Deserialize, Serialize};

/// Number of discrete actions
pub const NUM_ACTIONS: usize = 3;

/// Identity rows used for the action one-hot encoding
const ONE_HOT: [[f32; NUM_ACTIONS]; NUM_ACTIONS] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Discrete trading action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Action {
    /// Do nothing
    #[default]
    Hold = 0,
    /// Close a short if one is open, otherwise go long
    Buy = 1,
    /// Close a long if one is open, otherwise go short
    Sell = 2,
}

impl Action {
    /// Convert from action index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Hold),
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }

    /// Convert to action index
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Get all possible actions
    pub fn all() -> &'static [Action] {
        &[Self::Hold, Self::Buy, Self::Sell]
    }

    /// One-hot row for this action
    pub fn one_hot(self) -> [f32; NUM_ACTIONS] {
        ONE_HOT[self.to_index()]
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Hold => write!(f, "HOLD"),
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// Action as applied on one sub-step
///
/// Raw indices that do not name an action are carried through as
/// `Unknown` so the sub-step can still run as a zero-reward no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Known(Action),
    Unknown(usize),
}

impl StepAction {
    pub fn from_index(index: usize) -> Self {
        match Action::from_index(index) {
            Some(action) => StepAction::Known(action),
            None => StepAction::Unknown(index),
        }
    }

    /// One-hot row; unknown actions encode as all zeros
    pub fn one_hot(self) -> [f32; NUM_ACTIONS] {
        match self {
            StepAction::Known(action) => action.one_hot(),
            StepAction::Unknown(_) => [0.0; NUM_ACTIONS],
        }
    }
}

impl From<Action> for StepAction {
    fn from(action: Action) -> Self {
        StepAction::Known(action)
    }
}
