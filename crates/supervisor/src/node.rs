//! The supervisor's single-threaded event loop: one socket, one session per
//! peer (PLC, RTU, coordinator), one facility controller (§4.4, §5.1).

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::{debug, info, warn};

use scada_config::ScadaConfig;
use scada_kernel::FacilityController;
use scada_net::{EventLoop, PushResult, SessionId, SessionRegistry};
use scada_types::{MatrixSnapshot, UnitId};
use scada_wire::{CoordCmdMsg, Frame, MgmtMsg, Packet, PacketHeader, PlcCmdMsg};

use crate::plc_unit::PlcUnit;

/// Upper bound on inbound packets processed per session per tick, so a
/// flooding peer is throttled rather than processed with no backpressure.
const MAX_INBOUND_PER_TICK: usize = 16;

pub fn run(config: ScadaConfig) -> Result<()> {
    let bind_addr: SocketAddr =
        config.supervisor.bind_addr.parse().context("invalid supervisor bind_addr")?;
    let tick_period = Duration::from_millis(config.timeouts.tick_period_ms);
    let watchdog_timeout = Duration::from_secs_f64(config.timeouts.supervisor_watchdog_s);

    let mut event_loop =
        EventLoop::new(bind_addr, tick_period).with_context(|| format!("failed to bind {bind_addr}"))?;

    let mut registry = SessionRegistry::new(config.supervisor.session_queue_capacity, watchdog_timeout);
    let mut peer_sessions: HashMap<SocketAddr, SessionId> = HashMap::new();
    let mut controller: FacilityController<PlcUnit> = FacilityController::new(BTreeMap::new());
    let mut latest_matrix: Option<MatrixSnapshot> = None;
    let mut now_secs: f64 = 0.0;
    let mut recv_buf = [0u8; 65_536];

    info!(%bind_addr, "supervisor starting");

    loop {
        let wake = event_loop.poll_once().context("event loop poll failed")?;

        if wake.socket_ready {
            drain_socket(&mut event_loop, &mut recv_buf, &mut registry, &mut peer_sessions)?;
        }

        if wake.tick {
            for (id, packets) in registry.drain_inbound_all(MAX_INBOUND_PER_TICK) {
                for packet in packets {
                    handle_packet(id, packet, &mut registry, &mut controller, &mut latest_matrix);
                }
            }

            now_secs += tick_period.as_secs_f64();
            let outcome = controller.tick(now_secs, latest_matrix.as_ref(), true);
            debug!(mode = ?outcome.mode, saturated = outcome.saturated, "facility tick");

            let unit_ids: Vec<UnitId> = controller.unit_ids().collect();
            for id in unit_ids {
                let Some(unit) = controller.unit_mut(id) else { continue };
                let session = unit.session();
                let commands = unit.drain_commands();
                for cmd in commands {
                    queue(&mut registry, session, id, cmd);
                }
            }

            dispatch_outbound(&mut event_loop, &mut registry)?;
            for id in registry.check_all_watchdogs() {
                warn!(?id, "peer session watchdog tripped");
            }
            registry.free_all_closed();
        }

        if wake.terminate {
            info!("shutdown signal received, closing sessions");
            registry.close_all();
            dispatch_outbound(&mut event_loop, &mut registry)?;
            break;
        }
    }

    Ok(())
}

fn drain_socket(
    event_loop: &mut EventLoop,
    recv_buf: &mut [u8],
    registry: &mut SessionRegistry,
    peer_sessions: &mut HashMap<SocketAddr, SessionId>,
) -> Result<()> {
    loop {
        match event_loop.socket().recv_from(recv_buf) {
            Ok((n, remote)) => {
                let frame = Frame::new(Bytes::copy_from_slice(&recv_buf[..n]));
                match Packet::from_frame(&frame) {
                    Ok(packet) => {
                        let id = *peer_sessions.entry(remote).or_insert_with(|| registry.open(remote));
                        if let PushResult::Backpressure(_) = registry.on_packet(id, packet)? {
                            warn!(?id, "inbound queue saturated, dropping packet");
                        }
                    }
                    Err(err) => warn!(%err, %remote, "dropping malformed packet"),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(err) => return Err(err).context("socket recv_from failed"),
        }
    }
}

fn handle_packet(
    id: SessionId,
    packet: Packet,
    registry: &mut SessionRegistry,
    controller: &mut FacilityController<PlcUnit>,
    latest_matrix: &mut Option<MatrixSnapshot>,
) {
    match packet {
        Packet::PlcStatus { body, .. } => {
            if let Some(unit) = controller.unit_mut(body.unit) {
                unit.on_status(body.control);
            } else {
                controller.insert_unit(body.unit, PlcUnit::new(id, body.control));
            }
        }
        Packet::PlcRpsStatus { body, .. } => {
            if let Some(unit) = controller.unit_mut(body.unit) {
                unit.on_rps_status(&body);
            } else {
                debug!(unit = body.unit.get(), "RPS status from a unit with no control record yet");
            }
        }
        Packet::RtuData { body, .. } => *latest_matrix = Some(body.matrix),
        Packet::CoordCmd { body, .. } => handle_coord_cmd(body, controller),
        Packet::Mgmt { body: MgmtMsg::Close, .. } => {
            if let Some(session) = registry.get_mut(id) {
                session.close();
            }
        }
        Packet::Mgmt { .. } => {}
        Packet::PlcCmd { .. } => debug!("ignoring a PlcCmd packet addressed the wrong direction"),
    }
}

fn handle_coord_cmd(cmd: CoordCmdMsg, controller: &mut FacilityController<PlcUnit>) {
    match cmd {
        CoordCmdMsg::SetMode(mode) => controller.stage_mode(mode),
        CoordCmdMsg::SetTarget(target) => controller.set_target(target),
        CoordCmdMsg::SetGroup { unit, group } => controller.set_group(unit, group),
        CoordCmdMsg::SetLimit { unit, lim_br10 } => {
            let mode = controller.state.mode;
            if let Some(u) = controller.unit_mut(unit) {
                u.set_burn_limit(mode, lim_br10);
            }
        }
        CoordCmdMsg::Ack { .. } => {
            controller.operator_reset_alarm();
            let ids: Vec<UnitId> = controller.unit_ids().collect();
            for id in ids {
                if let Some(u) = controller.unit_mut(id) {
                    u.ack_all();
                }
            }
        }
    }
}

fn queue(registry: &mut SessionRegistry, session: SessionId, unit: UnitId, cmd: PlcCmdMsg) {
    let Some(s) = registry.get_mut(session) else { return };
    let header = PacketHeader::new(unit.get(), s.next_outbound_seq());
    if let PushResult::Backpressure(_) = s.queue_outbound(Packet::PlcCmd { header, body: cmd }) {
        warn!(?session, "outbound queue saturated, dropping command");
    }
}

fn dispatch_outbound(event_loop: &mut EventLoop, registry: &mut SessionRegistry) -> Result<()> {
    for (id, packets) in registry.iterate_all() {
        let Some(remote) = registry.get(id).map(|s| s.remote()) else { continue };
        for packet in packets {
            let frame = packet.to_frame().context("failed to encode outbound packet")?;
            event_loop.socket_mut().send_to(&frame.payload, remote).context("send_to failed")?;
        }
    }
    Ok(())
}
