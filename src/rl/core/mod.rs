//! Core RL abstractions
//!
//! Fundamental types for actions, observation rows, and rewards.

pub mod action;
pub mod reward;
pub mod state;

pub use action::{Action, StepAction, NUM_ACTIONS};
pub use reward::{ActionEffect, ActionOutcome, IDLE_REWARD};
pub use state::{
    ColumnBindings, ColumnOffsets, FeatureSchema, FeatureVector, PositionState,
    ACTION_FEATURES, INDICATOR_FEATURES, POSITION_FEATURES, REWARD_FEATURES, VARIABLE_FEATURES,
};
