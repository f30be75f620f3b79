//! Reactor PLC binary: trips the Reactor Protection System, runs the
//! burn-rate control loop, and exchanges status/command packets with the
//! supervisor over UDP (§4.1, §4.2, §5.1).

mod node;

use anyhow::{Context, Result};
use clap::Parser;

use scada_config::ScadaConfig;

/// Reactor PLC: RPS, control loop, and supervisor comms for one reactor unit.
#[derive(Parser)]
#[command(name = "reactor-plc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to load `scada.toml`/`scada.local.toml` from (defaults to
    /// the current directory).
    #[arg(long)]
    config_dir: Option<String>,

    /// Override the unit id from configuration.
    #[arg(long)]
    unit: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config_dir {
        Some(dir) => ScadaConfig::load_from_dir(dir),
        None => ScadaConfig::load(),
    }
    .context("failed to load configuration")?;

    if let Some(unit) = cli.unit {
        config.reactor.unit_id = unit;
    }

    node::run(config)
}
