//! Reinforcement Learning Module
//!
//! Market-replay environment for training trading agents.
//!
//! # Features
//!
//! - **Observation Window**: Sliding window of feature rows per sub-step
//! - **Action Space**: Discrete Hold/Buy/Sell with action repeat
//! - **Reward**: Realized PnL from the position ledger, with idle shaping

pub mod config;
pub mod core;
pub mod environment;

// Config exports
pub use config::ReplayConfig;

// Core exports
pub use core::{
    Action, ActionEffect, ActionOutcome, FeatureSchema, FeatureVector, PositionState, StepAction,
    IDLE_REWARD, NUM_ACTIONS,
};

// Environment exports
pub use environment::{
    MarketTape, Observation, RenderMode, RenderSink, ReplayEnvironment, StepInfo, StepResult,
};
