pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod rl;

pub use config::AppConfig;
pub use domain::{Fill, Order, Side};
pub use error::{Result, TapeGymError};
pub use ledger::{Broker, LedgerConfig, PositionLedger};
pub use rl::{
    Action, ActionOutcome, MarketTape, Observation, RenderMode, ReplayConfig, ReplayEnvironment,
    StepInfo, StepResult,
};
