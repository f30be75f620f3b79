use std::net::SocketAddr;
use std::time::{Duration, Instant};

use scada_wire::Packet;

use crate::bounded_queue::{BoundedQueue, PushResult};

/// Identifies a session within a registry. Opaque beyond equality/ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// One peer connection: a PLC, an RTU, or the coordinator, as seen by the
/// supervisor's session registry (§3 "Session record", §4.3).
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    remote: SocketAddr,
    inbound_seq: u32,
    outbound_seq: u32,
    inbound: BoundedQueue<Packet>,
    outbound: BoundedQueue<Packet>,
    watchdog_timeout: Duration,
    last_activity: Instant,
    last_keep_alive: Instant,
    closed: bool,
}

impl Session {
    pub fn new(
        id: SessionId,
        remote: SocketAddr,
        queue_capacity: usize,
        watchdog_timeout: Duration,
    ) -> Self {
        let now = Instant::now();
        Self {
            id,
            remote,
            inbound_seq: 0,
            outbound_seq: 0,
            inbound: BoundedQueue::new(queue_capacity),
            outbound: BoundedQueue::new(queue_capacity),
            watchdog_timeout,
            last_activity: now,
            last_keep_alive: now,
            closed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Enqueues an inbound packet and resets the watchdog clock. Backpressure
    /// is returned to the caller rather than growing the queue.
    pub fn on_packet(&mut self, packet: Packet) -> PushResult<Packet> {
        self.last_activity = Instant::now();
        self.inbound_seq = self.inbound_seq.max(packet.header().seq);
        self.inbound.try_push(packet)
    }

    /// Pops the next inbound packet, if any, for dispatch.
    pub fn next_inbound(&self) -> Option<Packet> {
        self.inbound.try_pop()
    }

    /// Pops up to `max` queued inbound packets, FIFO, for a tick's worth of
    /// dispatch (§4.3: the session is a backpressure unit, not a direct
    /// pass-through from socket to handler).
    pub fn drain_inbound(&self, max: usize) -> Vec<Packet> {
        self.inbound.pop_batch(max)
    }

    /// Queues a packet for transmission on the next `iterate()`.
    pub fn queue_outbound(&self, packet: Packet) -> PushResult<Packet> {
        self.outbound.try_push(packet)
    }

    pub fn next_outbound_seq(&mut self) -> u32 {
        self.outbound_seq += 1;
        self.outbound_seq
    }

    /// Drains the outbound queue for the caller to actually transmit.
    /// Timer processing (watchdog, keep-alive cadence) is driven separately
    /// via `check_watchdog`/`keep_alive_due`, per §4.3's "watchdog timer
    /// events are dispatched independently from the tick."
    pub fn iterate(&mut self) -> Vec<Packet> {
        self.outbound.drain()
    }

    pub fn is_idle(&self) -> bool {
        self.last_activity.elapsed() > self.watchdog_timeout
    }

    /// Keep-alive cadence is at most half the watchdog timeout (§6).
    pub fn keep_alive_due(&self) -> bool {
        self.last_keep_alive.elapsed() > self.watchdog_timeout / 2
    }

    pub fn mark_keep_alive_sent(&mut self) {
        self.last_keep_alive = Instant::now();
    }

    /// Closes the session if it has gone idle past its watchdog timeout.
    /// Returns whether this call is what tripped the watchdog.
    pub fn check_watchdog(&mut self) -> bool {
        if !self.closed && self.is_idle() {
            self.closed = true;
            true
        } else {
            false
        }
    }

    /// Idempotent: closing an already-closed session is a no-op.
    pub fn close(&mut self) {
        self.closed = true;
    }
}
