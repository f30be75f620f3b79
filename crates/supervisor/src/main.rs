//! Supervisor binary: owns the session registry for every PLC, RTU, and
//! coordinator peer, and runs the facility process controller over them
//! (§4.4, §4.5, §5.1).

mod node;
mod plc_unit;

use anyhow::{Context, Result};
use clap::Parser;

use scada_config::ScadaConfig;

/// Supervisor: facility mode machine, PID/allocation, and peer sessions.
#[derive(Parser)]
#[command(name = "supervisor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to load `scada.toml`/`scada.local.toml` from (defaults to
    /// the current directory).
    #[arg(long)]
    config_dir: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config_dir {
        Some(dir) => ScadaConfig::load_from_dir(dir),
        None => ScadaConfig::load(),
    }
    .context("failed to load configuration")?;

    node::run(config)
}
