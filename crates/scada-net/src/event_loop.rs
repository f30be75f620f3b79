//! Single `mio::Poll` event loop shared by all three node roles (§5.1).
//!
//! One `mio::Poll` per node drives a single-threaded, cooperative loop:
//! socket readiness and a tick timer (coalesced to the node's nominal 50 ms
//! period) are the only sources of work. `SIGINT`/`SIGTERM` are registered
//! into the same `Poll` via `signal-hook-mio`, delivering the "terminate"
//! event through the identical readiness path as any other source — no
//! separate signal thread.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_mio::v1_0::Signals;

/// Token for the node's one broadcast-addressed UDP socket.
const SOCKET_TOKEN: Token = Token(0);
/// Token for the registered signal source.
const SIGNAL_TOKEN: Token = Token(1);

/// One readiness cycle's worth of work for the caller to act on.
#[derive(Debug, Default)]
pub struct WakeReason {
    /// The socket has data (or write-room) ready.
    pub socket_ready: bool,
    /// A tick boundary elapsed since the last `poll_once` call.
    pub tick: bool,
    /// `SIGINT`/`SIGTERM` was received: begin graceful shutdown.
    pub terminate: bool,
}

/// Wraps the node's `mio::Poll`, its broadcast socket, and the signal source
/// registered into the same readiness set.
pub struct EventLoop {
    poll: Poll,
    events: Events,
    socket: UdpSocket,
    signals: Signals,
    tick_period: Duration,
    last_tick: Instant,
}

impl EventLoop {
    /// Binds `listen_channel` and registers it plus `SIGINT`/`SIGTERM` with a
    /// fresh `Poll`.
    pub fn new(listen_channel: SocketAddr, tick_period: Duration) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut socket = UdpSocket::bind(listen_channel)?;
        poll.registry().register(&mut socket, SOCKET_TOKEN, Interest::READABLE | Interest::WRITABLE)?;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        poll.registry().register(&mut signals, SIGNAL_TOKEN, Interest::READABLE)?;

        Ok(Self {
            poll,
            events: Events::with_capacity(64),
            socket,
            signals,
            tick_period,
            last_tick: Instant::now(),
        })
    }

    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn socket_mut(&mut self) -> &mut UdpSocket {
        &mut self.socket
    }

    /// Blocks until the socket is ready, the tick period elapses, or a
    /// terminate signal arrives — whichever comes first.
    pub fn poll_once(&mut self) -> io::Result<WakeReason> {
        let elapsed = self.last_tick.elapsed();
        let timeout = self.tick_period.saturating_sub(elapsed);
        self.poll.poll(&mut self.events, Some(timeout))?;

        let mut reason = WakeReason::default();
        for event in &self.events {
            match event.token() {
                SOCKET_TOKEN => reason.socket_ready = true,
                SIGNAL_TOKEN => {
                    if self.signals.pending().next().is_some() {
                        reason.terminate = true;
                    }
                }
                _ => {}
            }
        }

        if self.last_tick.elapsed() >= self.tick_period {
            reason.tick = true;
            self.last_tick = Instant::now();
        }

        Ok(reason)
    }
}
