use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ledger::LedgerConfig;
use crate::rl::config::ReplayConfig;
use crate::rl::environment::SyntheticTapeConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Tape generated when no recorded tape is supplied
    #[serde(default)]
    pub tape: SyntheticTapeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/evaluation.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TAPEGYM_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TAPEGYM_REPLAY__WINDOW_SIZE, etc.)
            .add_source(
                Environment::with_prefix("TAPEGYM")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Ledger settings with the position cap taken from the replay section
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            max_position: self.replay.max_position,
            ..self.ledger.clone()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.replay.validate().err().unwrap_or_default();

        if !(self.ledger.reward_scale > 0.0) {
            errors.push("ledger.reward_scale must be positive".to_string());
        }

        if self.tape.rows < 2 {
            errors.push("tape.rows must be at least 2".to_string());
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            errors.push(format!("unknown log level: {}", self.logging.level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
