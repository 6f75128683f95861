//! Tapegym CLI
//!
//! Commands:
//! - `tapegym run` - Replay episodes on a synthetic tape with a fixed policy
//! - `tapegym config` - Print the resolved configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::error::TapeGymError;
use crate::ledger::Broker;
use crate::rl::core::{Action, ActionOutcome, NUM_ACTIONS};
use crate::rl::environment::{
    generate_sample_tape, RenderMode, ReplayEnvironment, TracingRender,
};

/// Market replay environment CLI
#[derive(Parser, Debug)]
#[command(name = "tapegym")]
#[command(author, version, about = "Episodic order-book replay environment for trading agents")]
pub struct Cli {
    /// Directory holding default.toml and per-environment overrides
    #[arg(long, global = true, default_value = "config", env = "TAPEGYM_CONFIG_DIR")]
    pub config_dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay episodes and print a JSON summary per episode
    Run {
        /// Number of episodes
        #[arg(short, long, default_value = "1")]
        episodes: usize,
        /// Action policy
        #[arg(short, long, value_enum, default_value = "random")]
        policy: Policy,
        /// Start every episode at the head of the tape
        #[arg(long)]
        eval: bool,
        /// Override the environment seed
        #[arg(long)]
        seed: Option<u64>,
        /// Render every N steps (0 disables)
        #[arg(long, default_value = "0")]
        render_every: usize,
    },

    /// Print the resolved configuration as JSON
    Config,
}

/// Fixed policies for exercising the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Uniform over the action space
    Random,
    /// Always hold
    Hold,
    /// Buy, then sell, then buy again
    Alternate,
}

/// Picks actions for one policy
#[derive(Debug)]
pub struct PolicyAgent {
    policy: Policy,
    rng: StdRng,
    steps: usize,
}

impl PolicyAgent {
    pub fn new(policy: Policy, seed: u64) -> Self {
        Self {
            policy,
            rng: StdRng::seed_from_u64(seed),
            steps: 0,
        }
    }

    pub fn act(&mut self) -> usize {
        let action = match self.policy {
            Policy::Random => self.rng.gen_range(0..NUM_ACTIONS),
            Policy::Hold => Action::Hold.to_index(),
            Policy::Alternate if self.steps % 2 == 0 => Action::Buy.to_index(),
            Policy::Alternate => Action::Sell.to_index(),
        };
        self.steps += 1;
        action
    }
}

/// Per-episode report printed by `run`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub final_pnl: f64,
    pub trades: usize,
    pub rejected: usize,
    pub invalid: usize,
}

/// Play `episodes` full episodes against `env`
pub fn run_episodes(
    env: &mut ReplayEnvironment<Broker, TracingRender>,
    agent: &mut PolicyAgent,
    episodes: usize,
    render_every: usize,
) -> Vec<EpisodeSummary> {
    let mut summaries = Vec::with_capacity(episodes);

    for episode in 1..=episodes {
        env.reset();
        let mut summary = EpisodeSummary {
            episode,
            steps: 0,
            total_reward: 0.0,
            final_pnl: 0.0,
            trades: 0,
            rejected: 0,
            invalid: 0,
        };

        loop {
            let result = env.step(agent.act());
            summary.steps += 1;
            summary.total_reward += result.reward;
            match result.info.outcome {
                ActionOutcome::Applied => {}
                ActionOutcome::Rejected(_) => summary.rejected += 1,
                ActionOutcome::Invalid(_) => summary.invalid += 1,
            }
            if render_every > 0 && summary.steps % render_every == 0 {
                env.render(RenderMode::Ansi);
            }
            if result.done {
                summary.final_pnl = result.info.total_pnl;
                summary.trades = result.info.trade_count;
                break;
            }
        }

        info!(
            episode,
            steps = summary.steps,
            reward = summary.total_reward,
            trades = summary.trades,
            "episode complete"
        );
        summaries.push(summary);
    }

    summaries
}

/// Execute a parsed command
pub fn execute(cli: &Cli, config: AppConfig) -> Result<()> {
    match &cli.command {
        Commands::Run {
            episodes,
            policy,
            eval,
            seed,
            render_every,
        } => {
            let mut config = config;
            if *eval {
                config.replay.training = false;
            }
            if let Some(seed) = seed {
                config.replay.seed = *seed;
            }
            config
                .validate()
                .map_err(TapeGymError::from_problems)
                .context("invalid configuration")?;

            let tape = generate_sample_tape(&config.tape).context("failed to build tape")?;
            let mut env = ReplayEnvironment::with_parts(
                config.replay.clone(),
                tape,
                Broker::new(config.ledger_config()),
                TracingRender::new(config.replay.symbol(), 100),
            )
            .context("failed to create environment")?;

            let mut agent = PolicyAgent::new(*policy, config.replay.seed);
            for summary in run_episodes(&mut env, &mut agent, *episodes, *render_every) {
                println!("{}", serde_json::to_string(&summary)?);
            }
            env.close();
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
