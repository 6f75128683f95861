//! Market Replay Environment
//!
//! Gym-style episodic environment that replays a recorded market tape
//! against a position ledger.

mod execution;
mod market;
mod observation;
mod render;
mod replay;
mod synthetic;
mod window;

pub use execution::{execute_action, ExecutionContext};
pub use market::MarketTape;
pub use observation::{observation_shape, Observation};
pub use render::{NullRender, RenderMode, RenderSink, TracingRender};
pub use replay::{ReplayEnvironment, StepInfo, StepResult, ENV_ID};
pub use synthetic::{generate_sample_tape, tape_from_midpoints, SyntheticTapeConfig};
pub use window::ObservationWindow;
