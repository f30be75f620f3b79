//! The PLC's single-threaded event loop: one `mio::Poll`, one UDP socket, one
//! session to the supervisor (§4.2, §5.1).

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use tracing::{debug, info, warn};

use scada_config::ScadaConfig;
use scada_devices::{Mount, Reactor, SimReactor};
use scada_kernel::{step_ramp, target_br10, Rps, RpsConfig, RpsInputs};
use scada_net::{EventLoop, PushResult, SessionId, SessionRegistry};
use scada_types::{ReactorControlRecord, ReactorSnapshot, Tenths, UnitId};
use scada_wire::{Frame, MgmtMsg, Packet, PacketHeader, PlcCmdMsg, PlcStatusMsg, RpsStatusMsg};

/// Upper bound on inbound packets processed per session per tick, so a peer
/// sending faster than the tick rate is throttled rather than processed with
/// no backpressure.
const MAX_INBOUND_PER_TICK: usize = 16;

/// Mutable control-loop state carried across ticks; everything here is either
/// commanded by the supervisor or derived from the device each scan.
struct PlcState {
    unit: UnitId,
    control: ReactorControlRecord,
    requested: Tenths,
    enabled: bool,
    ramp: bool,
    manual_trip: bool,
    automatic_trip: bool,
}

pub fn run(config: ScadaConfig) -> Result<()> {
    let unit = UnitId::new(config.reactor.unit_id);
    let bind_addr: SocketAddr =
        config.reactor.bind_addr.parse().context("invalid reactor bind_addr")?;
    let supervisor_addr: SocketAddr =
        config.reactor.supervisor_addr.parse().context("invalid supervisor_addr")?;
    let tick_period = Duration::from_millis(config.timeouts.tick_period_ms);
    let watchdog_timeout = Duration::from_secs_f64(config.timeouts.plc_watchdog_s);
    let status_cadence = config.timeouts.status_cadence_ticks.max(1);

    let mut event_loop = EventLoop::new(bind_addr, tick_period)
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    // The PLC has exactly one peer, known from configuration at startup, so
    // its session is opened eagerly rather than waiting for an inbound packet
    // the way the supervisor's registry does for its many peers.
    let mut registry = SessionRegistry::new(64, watchdog_timeout);
    let supervisor_session = registry.open(supervisor_addr);
    queue(&mut registry, supervisor_session, unit, |header| Packet::Mgmt {
        header,
        body: MgmtMsg::Establish,
    });

    let mut rps = Rps::new(RpsConfig {
        high_temp_k: config.thresholds.high_temp_k,
        low_coolant_fraction: config.thresholds.low_coolant_fraction,
        high_waste_fraction: config.thresholds.high_waste_fraction,
        high_heated_coolant_fraction: config.thresholds.high_heated_coolant_fraction,
    });

    let mut device: Mount<SimReactor> = Mount::empty();
    device.mount(SimReactor::new());

    let mut state = PlcState {
        unit,
        control: ReactorControlRecord::new(
            Tenths::new(config.reactor.lim_br10),
            config.reactor.blade_count,
        ),
        requested: Tenths::ZERO,
        enabled: false,
        ramp: true,
        manual_trip: false,
        automatic_trip: false,
    };

    let mut tick_count: u32 = 0;
    let mut recv_buf = [0u8; 65_536];

    info!(unit = unit.get(), %bind_addr, %supervisor_addr, "reactor PLC starting");

    loop {
        let wake = event_loop.poll_once().context("event loop poll failed")?;

        if wake.socket_ready {
            drain_socket(&mut event_loop, &mut recv_buf, supervisor_addr, &mut registry, supervisor_session)?;
        }

        if wake.tick {
            tick_count += 1;
            run_tick(
                tick_count,
                status_cadence,
                &mut device,
                &mut rps,
                &mut state,
                &mut registry,
                supervisor_session,
            )?;
            dispatch_outbound(&mut event_loop, &mut registry)?;
            for id in registry.check_all_watchdogs() {
                warn!(?id, "session watchdog tripped, comms timeout RPS trip pending");
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
    supervisor_addr: SocketAddr,
    registry: &mut SessionRegistry,
    supervisor_session: SessionId,
) -> Result<()> {
    loop {
        match event_loop.socket().recv_from(recv_buf) {
            Ok((n, remote)) => {
                let frame = Frame::new(Bytes::copy_from_slice(&recv_buf[..n]));
                match Packet::from_frame(&frame) {
                    Ok(packet) => {
                        let id = if remote == supervisor_addr {
                            supervisor_session
                        } else {
                            registry.open(remote)
                        };
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

fn handle_packet(packet: Packet, state: &mut PlcState, rps: &mut Rps) {
    match packet {
        Packet::PlcCmd { body, .. } => apply_command(body, state, rps),
        Packet::Mgmt { body: MgmtMsg::Close, .. } => {
            debug!("supervisor requested session close");
        }
        other => debug!(?other, "ignoring packet not addressed to the control loop"),
    }
}

fn apply_command(cmd: PlcCmdMsg, state: &mut PlcState, rps: &mut Rps) {
    match cmd {
        PlcCmdMsg::SetBurnRate { enable, target_br10, ramp } => {
            state.enabled = enable;
            state.requested = target_br10;
            state.ramp = ramp;
        }
        PlcCmdMsg::Scram { automatic } => {
            if automatic {
                state.automatic_trip = true;
            } else {
                state.manual_trip = true;
            }
        }
        PlcCmdMsg::Reset => {
            // Clearing the latch flags here only takes effect on the *next*
            // scan; a reset issued the same tick a trip cleared is expected to
            // be refused once and to succeed on the following one.
            state.manual_trip = false;
            state.automatic_trip = false;
            rps.reset();
        }
    }
}

fn run_tick(
    tick_count: u32,
    status_cadence: u32,
    device: &mut Mount<SimReactor>,
    rps: &mut Rps,
    state: &mut PlcState,
    registry: &mut SessionRegistry,
    supervisor_session: SessionId,
) -> Result<()> {
    for packet in registry
        .get(supervisor_session)
        .map(|s| s.drain_inbound(MAX_INBOUND_PER_TICK))
        .unwrap_or_default()
    {
        handle_packet(packet, state, rps);
    }

    let reactor = device.get_mut().ok_or_else(|| anyhow!("reactor device not mounted"))?;

    let snapshot = read_snapshot(reactor);
    let force_disabled = reactor.is_force_disabled().unwrap_or(true);
    let timeout = registry.get(supervisor_session).map(|s| s.is_idle()).unwrap_or(true);
    let was_tripped = rps.is_tripped();

    let inputs = RpsInputs {
        snapshot,
        force_disabled,
        manual: state.manual_trip,
        automatic: state.automatic_trip,
        timeout,
        sys_fail: false,
    };
    let scan = rps.scan(&inputs, reactor)?;

    if scan.tripped {
        // scram() already zeroed the device; keep the control record in lockstep
        // rather than ramping it back down over several ticks.
        state.control.br10 = Tenths::ZERO;
    } else {
        let target = target_br10(state.enabled, scan.tripped, state.requested, state.control.lim_br10);
        let (next_br10, _complete) =
            step_ramp(state.control.br10, target, state.control.lim_br10, state.ramp);
        reactor.set_burn_rate(next_br10.as_mb_per_tick())?;
        state.control.br10 = next_br10;
    }
    state.control.ready = !scan.tripped;
    state.control.degraded = snapshot.fault;

    if scan.tripped && !was_tripped {
        send_rps_status(registry, supervisor_session, state.unit, rps);
    }

    if tick_count % status_cadence == 0 {
        send_plc_status(registry, supervisor_session, state.unit, snapshot, state.control);
    }

    let keep_alive_due = registry
        .get_mut(supervisor_session)
        .map(|session| {
            let due = session.keep_alive_due();
            if due {
                session.mark_keep_alive_sent();
            }
            due
        })
        .unwrap_or(false);
    if keep_alive_due {
        queue(registry, supervisor_session, state.unit, |header| Packet::Mgmt {
            header,
            body: MgmtMsg::KeepAlive,
        });
    }

    Ok(())
}

fn read_snapshot(reactor: &dyn Reactor) -> ReactorSnapshot {
    let readings = (
        reactor.get_status(),
        reactor.get_temperature(),
        reactor.get_fuel(),
        reactor.get_coolant(),
        reactor.get_waste(),
        reactor.get_heated_coolant(),
        reactor.get_damage_percent(),
        reactor.get_boil_rate(),
        reactor.get_burn_rate(),
        reactor.get_environmental_loss(),
    );

    match readings {
        (
            Ok(status_ok),
            Ok(temperature_k),
            Ok(fuel_fill),
            Ok(coolant_fill),
            Ok(waste_fill),
            Ok(heated_coolant_fill),
            Ok(damage_pct),
            Ok(boil_rate),
            Ok(burn_rate),
            Ok(environmental_loss),
        ) => ReactorSnapshot {
            status_ok,
            fuel_fill,
            coolant_fill,
            waste_fill,
            heated_coolant_fill,
            temperature_k,
            damage_pct,
            boil_rate,
            burn_rate,
            environmental_loss,
            fault: false,
        },
        _ => ReactorSnapshot { status_ok: false, fault: true, ..ReactorSnapshot::idle() },
    }
}

fn send_plc_status(
    registry: &mut SessionRegistry,
    id: SessionId,
    unit: UnitId,
    snapshot: ReactorSnapshot,
    control: ReactorControlRecord,
) {
    queue(registry, id, unit, |header| Packet::PlcStatus {
        header,
        body: PlcStatusMsg { unit, snapshot, control },
    });
}

fn send_rps_status(registry: &mut SessionRegistry, id: SessionId, unit: UnitId, rps: &Rps) {
    let status = rps.status();
    let active_trips = scada_types::TripName::ALL
        .into_iter()
        .filter(|name| status.flags.get(*name))
        .collect();
    queue(registry, id, unit, |header| Packet::PlcRpsStatus {
        header,
        body: RpsStatusMsg {
            unit,
            tripped: status.tripped,
            first_trip: status.first_trip,
            manual: status.manual,
            active_trips,
        },
    });
}

fn queue(registry: &mut SessionRegistry, id: SessionId, unit: UnitId, build: impl FnOnce(PacketHeader) -> Packet) {
    let Some(session) = registry.get_mut(id) else { return };
    let header = PacketHeader::new(unit.get(), session.next_outbound_seq());
    if let PushResult::Backpressure(_) = session.queue_outbound(build(header)) {
        warn!(?id, "outbound queue saturated, dropping packet");
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
