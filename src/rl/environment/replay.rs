//! Replay Environment
//!
//! Gym-style episodic environment over a pre-ingested market tape. Each
//! `step` call runs `action_repeats` sub-steps: the first applies the agent's
//! action and the rest hold. Every sub-step advances the tape cursor by
//! `step_size`, steps the indicators and ledger, and pushes one row into the
//! observation window.

use std::fmt;
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::execution::{execute_action, ExecutionContext};
use super::market::MarketTape;
use super::observation::{observation_shape, Observation};
use super::render::{RenderMode, RenderSink, TracingRender};
use super::window::ObservationWindow;
use crate::domain::{Order, Side};
use crate::error::{Result, TapeGymError};
use crate::indicators::{Indicator, Rsi, TradeFlowImbalance};
use crate::ledger::{Broker, LedgerConfig, PositionLedger};
use crate::rl::config::ReplayConfig;
use crate::rl::core::{
    Action, ActionEffect, ActionOutcome, FeatureVector, PositionState, StepAction, NUM_ACTIONS,
};

/// Environment identifier reported in logs
pub const ENV_ID: &str = "long-short-v0";

/// Midpoints kept by the default render sink
const RENDER_HISTORY: usize = 500;

/// Diagnostics attached to every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Tape index the next sub-step will read
    pub snapshot_index: usize,
    /// Midpoint of the last replayed snapshot
    pub midpoint: f64,
    /// Realized plus unrealized PnL at that midpoint
    pub total_pnl: f64,
    /// Completed round trips this episode
    pub trade_count: usize,
    /// How the ledger treated the agent's action
    pub outcome: ActionOutcome,
    /// True when this call reset the episode instead of stepping it
    pub episode_reset: bool,
}

/// Result of taking a step in the environment
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Window contents after the step
    pub observation: Observation,
    /// Reward accumulated over the macro step
    pub reward: f64,
    /// Whether the episode ended on this step
    pub done: bool,
    pub info: StepInfo,
}

/// Episodic market-replay environment
pub struct ReplayEnvironment<L = Broker, R = TracingRender> {
    config: ReplayConfig,
    symbol: String,
    tape: MarketTape,
    ledger: L,
    render: R,
    trade_flow: TradeFlowImbalance,
    momentum: Rsi,
    window: ObservationWindow,
    rng: StdRng,
    seed: u64,
    /// Sub-steps replayed before the first observation
    warmup_steps: usize,
    /// Last index a macro step may start from
    max_steps: usize,
    snapshot_index: usize,
    last_index: usize,
    midpoint: f64,
    reward: f64,
    done: bool,
    episodes: usize,
}

impl ReplayEnvironment<Broker, TracingRender> {
    /// Create an environment backed by the in-crate broker
    pub fn new(config: ReplayConfig, tape: MarketTape) -> Result<Self> {
        let ledger = Broker::new(LedgerConfig {
            max_position: config.max_position,
            ..Default::default()
        });
        let render = TracingRender::new(config.symbol(), RENDER_HISTORY);
        Self::with_parts(config, tape, ledger, render)
    }
}

impl<L, R> ReplayEnvironment<L, R>
where
    L: PositionLedger,
    R: RenderSink,
{
    /// Create an environment with an explicit ledger and render sink
    pub fn with_parts(config: ReplayConfig, tape: MarketTape, ledger: L, render: R) -> Result<Self> {
        config.validate().map_err(TapeGymError::from_problems)?;

        let trade_flow = TradeFlowImbalance::new(config.trade_flow_window);
        let momentum = Rsi::new(config.rsi_window);
        let overflow = |what: &str| {
            TapeGymError::Misconfiguration(format!("{what} overflows the index range"))
        };

        let warmup_steps = config
            .window_size
            .checked_add(trade_flow.lag().max(momentum.lag()))
            .ok_or_else(|| overflow("window_size plus indicator lag"))?;

        let macro_span = config
            .step_size
            .checked_mul(config.action_repeats)
            .ok_or_else(|| overflow("step_size times action_repeats"))?;
        if tape.len() <= macro_span.saturating_add(1) {
            return Err(TapeGymError::Misconfiguration(format!(
                "tape of {} snapshots cannot fit one step of {} snapshots",
                tape.len(),
                macro_span
            )));
        }
        let max_steps = tape.len() - macro_span - 1;

        let latest_start = if config.training {
            start_range(tape.len()).end - 1
        } else {
            0
        };
        let warmup_end = warmup_steps
            .checked_mul(config.step_size)
            .and_then(|span| span.checked_add(latest_start))
            .ok_or_else(|| overflow("warm-up span"))?;
        if warmup_end > max_steps {
            return Err(TapeGymError::Misconfiguration(format!(
                "warm-up from start {latest_start} ends at {warmup_end}, past the last step index {max_steps}"
            )));
        }

        let symbol = config.symbol();
        let seed = config.seed;
        let window = ObservationWindow::new(config.window_size);
        let midpoint = tape.midpoint(0);

        info!(
            env = ENV_ID,
            symbol = %symbol,
            snapshots = tape.len(),
            window = config.window_size,
            repeats = config.action_repeats,
            warmup_steps,
            max_steps,
            training = config.training,
            "replay environment created"
        );

        Ok(Self {
            config,
            symbol,
            tape,
            ledger,
            render,
            trade_flow,
            momentum,
            window,
            rng: StdRng::seed_from_u64(seed),
            seed,
            warmup_steps,
            max_steps,
            snapshot_index: 0,
            last_index: 0,
            midpoint,
            reward: 0.0,
            done: true,
            episodes: 0,
        })
    }

    /// Start a new episode and return its first observation
    pub fn reset(&mut self) -> Observation {
        let previous_pnl = self.ledger.total_pnl(self.midpoint);
        let previous_trades = self.ledger.total_trade_count();

        let start = if self.config.training {
            self.rng.gen_range(start_range(self.tape.len()))
        } else {
            0
        };

        self.snapshot_index = start;
        self.last_index = start;
        self.reward = 0.0;
        self.done = false;
        self.ledger.reset();
        self.trade_flow.reset();
        self.momentum.reset();
        self.window.clear();

        for _ in 0..self.warmup_steps {
            self.sub_step(StepAction::Known(Action::Hold));
        }
        self.reward = 0.0;
        self.episodes += 1;

        let warmup_midpoints: Vec<f64> = (start..self.snapshot_index)
            .step_by(self.config.step_size)
            .map(|i| self.tape.midpoint(i))
            .collect();
        self.render.reset(&warmup_midpoints);

        info!(
            env = ENV_ID,
            symbol = %self.symbol,
            seed = self.seed,
            episode = self.episodes,
            previous_pnl,
            previous_trades,
            start,
            first_step = self.snapshot_index,
            "episode reset"
        );

        self.observation()
    }

    /// Advance one macro step with a raw action index
    ///
    /// Stepping a finished episode resets it and reports zero reward.
    pub fn step(&mut self, action: usize) -> StepResult {
        if self.done {
            let observation = self.reset();
            return StepResult {
                observation,
                reward: 0.0,
                done: false,
                info: self.info(ActionOutcome::Applied, true),
            };
        }

        let requested = StepAction::from_index(action);
        let mut outcome = ActionOutcome::Applied;

        for repeat in 0..self.config.action_repeats {
            if repeat == 0 {
                self.reward = 0.0;
                outcome = self.sub_step(requested).outcome;
            } else {
                self.sub_step(StepAction::Known(Action::Hold));
            }
        }

        if self.snapshot_index > self.max_steps {
            self.done = true;
            let order = Order::liquidation(&self.symbol, self.midpoint, self.last_index);
            self.reward = self.ledger.flatten_inventory(&order);
            debug!(
                symbol = %self.symbol,
                midpoint = self.midpoint,
                reward = self.reward,
                index = self.last_index,
                "horizon reached, inventory flattened"
            );
        }

        StepResult {
            observation: self.observation(),
            reward: self.reward,
            done: self.done,
            info: self.info(outcome, false),
        }
    }

    /// Advance one macro step with a typed action
    pub fn step_action(&mut self, action: Action) -> StepResult {
        self.step(action.to_index())
    }

    /// Re-seed the episode start generator
    pub fn seed(&mut self, seed: u64) -> Vec<u64> {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        info!(env = ENV_ID, symbol = %self.symbol, seed, "environment re-seeded");
        vec![seed]
    }

    /// Hand the current midpoint to the render sink
    pub fn render(&mut self, mode: RenderMode) {
        self.render.render(self.midpoint, mode);
    }

    /// Release the environment
    pub fn close(self) {
        info!(
            env = ENV_ID,
            symbol = %self.symbol,
            episodes = self.episodes,
            "replay environment closed"
        );
    }

    /// Shape of every observation this environment returns
    pub fn observation_shape(&self) -> Vec<usize> {
        observation_shape(
            self.config.window_size,
            self.feature_count(),
            self.config.format_3d,
        )
    }

    pub fn action_count(&self) -> usize {
        NUM_ACTIONS
    }

    /// Features per observation row
    pub fn feature_count(&self) -> usize {
        self.tape.schema().feature_count()
    }

    /// Best bid and ask of the last replayed snapshot
    pub fn best_bid_ask(&self) -> (f64, f64) {
        self.tape.best_bid_ask(self.last_index)
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn tape(&self) -> &MarketTape {
        &self.tape
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn render_sink(&self) -> &R {
        &self.render
    }

    /// Tape index the next sub-step will read
    pub fn snapshot_index(&self) -> usize {
        self.snapshot_index
    }

    /// Last index a macro step may start from
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn warmup_steps(&self) -> usize {
        self.warmup_steps
    }

    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Episodes started since construction
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Replay one snapshot, apply `action`, and push the resulting row
    fn sub_step(&mut self, action: StepAction) -> ActionEffect {
        let index = self.snapshot_index;
        self.last_index = index;
        self.midpoint = self.tape.midpoint(index);

        self.trade_flow.step(self.tape.trade_volumes(index));
        self.momentum.step(self.midpoint);
        self.ledger.step(self.midpoint);

        let ctx = ExecutionContext {
            symbol: &self.symbol,
            midpoint: self.midpoint,
            fee: self.config.fee,
            step: index,
        };
        let effect = execute_action(&mut self.ledger, action, &ctx);
        self.reward += effect.reward;

        let row = FeatureVector::assemble(
            self.tape.schema(),
            self.tape.normalized_row(index),
            [self.trade_flow.value(), self.momentum.value()],
            &self.position_state(),
            action.one_hot(),
            self.reward,
            self.config.clip_range,
        );
        self.window.push(row);
        self.snapshot_index += self.config.step_size;

        trace!(
            index,
            midpoint = self.midpoint,
            ?action,
            reward = self.reward,
            "sub-step"
        );

        effect
    }

    fn position_state(&self) -> PositionState {
        let max_position = self.config.max_position as f64;
        let target_pnl = self.config.target_pnl();
        let reward_scale = self.ledger.reward_scale();
        let scaled = |value: f64, scale: f64| {
            if scale > 0.0 {
                (value / scale) as f32
            } else {
                0.0
            }
        };

        PositionState {
            long_inventory: scaled(self.ledger.long_inventory_count() as f64, max_position),
            short_inventory: scaled(self.ledger.short_inventory_count() as f64, max_position),
            total_pnl: scaled(self.ledger.total_pnl(self.midpoint), target_pnl),
            long_unrealized_pnl: scaled(
                self.ledger.unrealized_pnl(Side::Long, self.midpoint),
                reward_scale,
            ),
            short_unrealized_pnl: scaled(
                self.ledger.unrealized_pnl(Side::Short, self.midpoint),
                reward_scale,
            ),
        }
    }

    fn observation(&self) -> Observation {
        Observation::from_window(&self.window, self.feature_count(), self.config.format_3d)
    }

    fn info(&self, outcome: ActionOutcome, episode_reset: bool) -> StepInfo {
        StepInfo {
            snapshot_index: self.snapshot_index,
            midpoint: self.midpoint,
            total_pnl: self.ledger.total_pnl(self.midpoint),
            trade_count: self.ledger.total_trade_count(),
            outcome,
            episode_reset,
        }
    }
}

impl<L, R> fmt::Display for ReplayEnvironment<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}-{}", ENV_ID, self.symbol, self.seed)
    }
}

/// Training episode starts are drawn from `[1, len / 4)`
///
/// Short tapes where that range is empty always start at 0.
fn start_range(len: usize) -> Range<usize> {
    let end = len / 4;
    if end > 1 {
        1..end
    } else {
        0..1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MockPositionLedger;
    use crate::rl::environment::render::{MockRenderSink, NullRender};
    use crate::rl::environment::synthetic::tape_from_midpoints;

    fn flat_tape(len: usize) -> MarketTape {
        let mids: Vec<f64> = (0..len).map(|i| 100.0 + (i % 7) as f64 * 0.1).collect();
        tape_from_midpoints(&mids, "coinbase").unwrap()
    }

    fn eval_config() -> ReplayConfig {
        ReplayConfig {
            training: false,
            window_size: 4,
            action_repeats: 3,
            trade_flow_window: 2,
            rsi_window: 2,
            ..Default::default()
        }
    }

    /// Ledger that holds nothing and accepts every read
    fn idle_ledger() -> MockPositionLedger {
        let mut ledger = MockPositionLedger::new();
        ledger.expect_step().return_const(());
        ledger.expect_reset().return_const(());
        ledger.expect_long_inventory_count().return_const(0usize);
        ledger.expect_short_inventory_count().return_const(0usize);
        ledger.expect_total_pnl().return_const(0.0);
        ledger.expect_total_trade_count().return_const(0usize);
        ledger.expect_unrealized_pnl().return_const(0.0);
        ledger.expect_reward_scale().return_const(1.0);
        ledger.expect_flatten_inventory().return_const(0.0);
        ledger
    }

    #[test]
    fn test_start_range() {
        assert_eq!(start_range(100), 1..25);
        assert_eq!(start_range(8), 0..1);
        assert_eq!(start_range(0), 0..1);
    }

    #[test]
    fn test_fresh_environment_is_done() {
        let env = ReplayEnvironment::with_parts(eval_config(), flat_tape(100), idle_ledger(), NullRender)
            .unwrap();
        assert!(env.is_done());
        assert_eq!(env.episodes(), 0);
        assert_eq!(env.warmup_steps(), 4 + 3);
        assert_eq!(env.max_steps(), 100 - 3 - 1);
    }

    #[test]
    fn test_warmup_never_trades() {
        // no add/remove expectations: any trade panics
        let mut env =
            ReplayEnvironment::with_parts(eval_config(), flat_tape(100), idle_ledger(), NullRender)
                .unwrap();
        let obs = env.reset();
        assert_eq!(obs.shape(), &[4, env.feature_count()]);
        assert_eq!(env.snapshot_index(), 7);
        assert_eq!(env.window_len(), 4);
    }

    #[test]
    fn test_action_applies_on_first_sub_step_only() {
        let mut ledger = idle_ledger();
        ledger.expect_add().times(1).return_const(true);

        let mut env =
            ReplayEnvironment::with_parts(eval_config(), flat_tape(100), ledger, NullRender)
                .unwrap();
        env.reset();
        let result = env.step(Action::Buy.to_index());

        assert!(!result.done);
        assert_eq!(result.info.outcome, ActionOutcome::Applied);
        assert_eq!(env.snapshot_index(), 7 + 3);

        let schema = env.tape().schema().clone();
        let rows: Vec<&[f32]> = result.observation.rows().collect();
        let buy = schema.offset("action_buy").unwrap();
        let hold = schema.offset("action_hold").unwrap();
        assert_eq!(rows[1][buy], 1.0);
        assert_eq!(rows[2][hold], 1.0);
        assert_eq!(rows[3][hold], 1.0);
    }

    #[test]
    fn test_rejected_order_costs_idle_reward() {
        let mut ledger = idle_ledger();
        ledger.expect_add().times(1).return_const(false);

        let config = ReplayConfig {
            action_repeats: 1,
            ..eval_config()
        };
        let mut env =
            ReplayEnvironment::with_parts(config, flat_tape(100), ledger, NullRender).unwrap();
        env.reset();
        let result = env.step(Action::Sell.to_index());

        assert_eq!(result.reward, -crate::rl::core::IDLE_REWARD);
        assert!(matches!(result.info.outcome, ActionOutcome::Rejected(_)));
    }

    #[test]
    fn test_unknown_action_is_reported_invalid() {
        let config = ReplayConfig {
            action_repeats: 1,
            ..eval_config()
        };
        let mut env =
            ReplayEnvironment::with_parts(config, flat_tape(100), idle_ledger(), NullRender)
                .unwrap();
        env.reset();
        let result = env.step(9);

        assert_eq!(result.reward, 0.0);
        assert!(matches!(result.info.outcome, ActionOutcome::Invalid(_)));
        let last = result.observation.row(3).unwrap();
        let schema = env.tape().schema();
        assert_eq!(last[schema.action_offset()..schema.reward_offset()], [0.0; 3]);
    }

    #[test]
    fn test_render_receives_warmup_and_current_midpoint() {
        let mut render = MockRenderSink::new();
        render
            .expect_reset()
            .withf(|mids| mids.len() == 7)
            .times(1)
            .return_const(());
        render
            .expect_render()
            .withf(|_, mode| *mode == RenderMode::Ansi)
            .times(1)
            .return_const(());

        let mut env =
            ReplayEnvironment::with_parts(eval_config(), flat_tape(100), idle_ledger(), render)
                .unwrap();
        env.reset();
        env.render(RenderMode::Ansi);
    }

    #[test]
    fn test_warmup_past_horizon_is_misconfiguration() {
        let config = ReplayConfig {
            window_size: 50,
            ..eval_config()
        };
        let err = ReplayEnvironment::with_parts(config, flat_tape(40), idle_ledger(), NullRender)
            .err()
            .unwrap();
        assert!(matches!(err, TapeGymError::Misconfiguration(_)));
    }

    #[test]
    fn test_oversized_config_is_misconfiguration() {
        let cases = [
            ReplayConfig {
                step_size: usize::MAX / 2 + 1,
                action_repeats: 2,
                ..eval_config()
            },
            ReplayConfig {
                window_size: usize::MAX,
                ..eval_config()
            },
            ReplayConfig {
                step_size: usize::MAX / 4,
                action_repeats: 1,
                ..eval_config()
            },
            ReplayConfig {
                rsi_window: usize::MAX,
                ..eval_config()
            },
            ReplayConfig {
                trade_flow_window: usize::MAX,
                ..eval_config()
            },
        ];

        for config in cases {
            let err =
                ReplayEnvironment::with_parts(config, flat_tape(100), idle_ledger(), NullRender)
                    .err()
                    .unwrap();
            assert!(matches!(err, TapeGymError::Misconfiguration(_)));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ReplayConfig {
            window_size: 0,
            ..eval_config()
        };
        let err = ReplayEnvironment::with_parts(config, flat_tape(100), idle_ledger(), NullRender)
            .err()
            .unwrap();
        assert!(matches!(err, TapeGymError::Misconfiguration(_)));
    }

    #[test]
    fn test_seed_and_display() {
        let mut env = ReplayEnvironment::new(eval_config(), flat_tape(100)).unwrap();
        assert_eq!(env.seed(42), vec![42]);
        assert_eq!(env.to_string(), "long-short-v0 | ETH-USD-42");
    }
}
