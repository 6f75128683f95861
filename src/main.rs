use anyhow::Result;
use clap::Parser;
use tapegym::cli::{self, Cli};
use tapegym::config::{AppConfig, LoggingConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config_dir)?;

    init_logging(&config.logging);
    cli::execute(&cli, config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tapegym={}", logging.level)));

    // stdout carries the JSON episode summaries
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
