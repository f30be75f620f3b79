//! Coordinator CLI: a one-shot operator command sent to the supervisor
//! (§6.3 mode/target/group/limit/ack).

use std::net::{SocketAddr, UdpSocket};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use scada_config::ScadaConfig;
use scada_types::{FacilityMode, GroupId, Tenths, UnitId};
use scada_wire::{CoordCmdMsg, Packet, PacketHeader};

/// Coordinator id used as the sender in every outgoing packet header; the
/// coordinator is not a reactor unit, so it carries no `UnitId` of its own.
const COORDINATOR_SENDER_ID: u32 = 0;

#[derive(Parser)]
#[command(name = "coordinator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to load `scada.toml`/`scada.local.toml` from (defaults to
    /// the current directory).
    #[arg(long)]
    config_dir: Option<String>,

    /// Override the supervisor address from configuration.
    #[arg(long)]
    supervisor: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stage a facility mode change, effective at the start of the next tick.
    Mode {
        mode: ModeArg,
    },
    /// Stage the operator target (mB/t for BURN_RATE, charge/gen-rate setpoint
    /// for CHARGE/GEN_RATE).
    Target {
        value: f64,
    },
    /// Assign a unit to a priority group (0 clears it back to independent).
    Group {
        unit: u32,
        group: u8,
    },
    /// Set a unit's facility-level burn limit, in tenths of mB/t. Rejected
    /// unless the facility is currently INACTIVE.
    Limit {
        unit: u32,
        tenths: u32,
    },
    /// Acknowledge a latched alarm, clearing a UNIT_ALARM_IDLE hold.
    Ack {
        #[arg(default_value_t = 0)]
        seq: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Inactive,
    Simple,
    BurnRate,
    Charge,
    GenRate,
}

impl From<ModeArg> for FacilityMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Inactive => FacilityMode::Inactive,
            ModeArg::Simple => FacilityMode::Simple,
            ModeArg::BurnRate => FacilityMode::BurnRate,
            ModeArg::Charge => FacilityMode::Charge,
            ModeArg::GenRate => FacilityMode::GenRate,
        }
    }
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

    let supervisor_addr: SocketAddr = cli
        .supervisor
        .as_deref()
        .unwrap_or(&config.coordinator.supervisor_addr)
        .parse()
        .context("invalid supervisor address")?;

    let body = match cli.command {
        Command::Mode { mode } => CoordCmdMsg::SetMode(mode.into()),
        Command::Target { value } => CoordCmdMsg::SetTarget(value),
        Command::Group { unit, group } => {
            let Some(group) = GroupId::from_index(group) else {
                bail!("group must be 0 (independent) through 4");
            };
            CoordCmdMsg::SetGroup { unit: UnitId::new(unit), group }
        }
        Command::Limit { unit, tenths } => {
            CoordCmdMsg::SetLimit { unit: UnitId::new(unit), lim_br10: Tenths::new(tenths) }
        }
        Command::Ack { seq } => CoordCmdMsg::Ack { seq },
    };

    send(supervisor_addr, body)
}

fn send(supervisor_addr: SocketAddr, body: CoordCmdMsg) -> Result<()> {
    let packet = Packet::CoordCmd {
        header: PacketHeader::new(COORDINATOR_SENDER_ID, 0),
        body,
    };
    let frame = packet.to_frame().context("failed to encode command")?;

    let local_addr: SocketAddr =
        if supervisor_addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" }.parse().unwrap();
    let socket = UdpSocket::bind(local_addr).context("failed to bind a local UDP socket")?;
    socket.send_to(&frame.payload, supervisor_addr).context("failed to send command")?;

    tracing::info!(%supervisor_addr, "command sent");
    Ok(())
}
