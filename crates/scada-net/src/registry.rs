use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use scada_wire::Packet;

use crate::bounded_queue::PushResult;
use crate::error::{NetError, NetResult};
use crate::session::{Session, SessionId};

/// Owns the set of connected peer sessions (§4.3). Iteration order is
/// insertion order, independent of the `HashMap`'s internal order.
pub struct SessionRegistry {
    order: Vec<SessionId>,
    sessions: HashMap<SessionId, Session>,
    next_id: u64,
    queue_capacity: usize,
    watchdog_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(queue_capacity: usize, watchdog_timeout: Duration) -> Self {
        Self {
            order: Vec::new(),
            sessions: HashMap::new(),
            next_id: 0,
            queue_capacity,
            watchdog_timeout,
        }
    }

    /// Creates a session for a newly-seen peer (§3: "created on first packet
    /// from a peer").
    pub fn open(&mut self, remote: SocketAddr) -> SessionId {
        let id = SessionId::new(self.next_id);
        self.next_id += 1;
        let session = Session::new(id, remote, self.queue_capacity, self.watchdog_timeout);
        self.sessions.insert(id, session);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Sessions visible to iteration: closed flag must be false (§3 invariant).
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(move |id| self.sessions.get(id)).filter(|s| !s.is_closed())
    }

    /// Queues an inbound packet on `id`'s session. The returned
    /// [`PushResult`] tells the caller whether the session's bounded inbound
    /// queue actually accepted it, so a flooding peer can be logged and
    /// dropped rather than processed with no backpressure.
    pub fn on_packet(&mut self, id: SessionId, packet: Packet) -> NetResult<PushResult<Packet>> {
        let session = self.sessions.get_mut(&id).ok_or(NetError::UnknownSession(id))?;
        if session.is_closed() {
            return Err(NetError::SessionClosed(id));
        }
        Ok(session.on_packet(packet))
    }

    /// Drains each session's inbound queue, in insertion order, yielding at
    /// most `max_per_session` packets from each for the caller to process
    /// this tick (§4.3 ordering: inbound is bounded the same way outbound
    /// is, via `iterate_all`).
    pub fn drain_inbound_all(&mut self, max_per_session: usize) -> Vec<(SessionId, Vec<Packet>)> {
        self.order
            .iter()
            .filter_map(|id| {
                self.sessions.get(id).map(|session| (*id, session.drain_inbound(max_per_session)))
            })
            .collect()
    }

    /// Calls `iterate()` on every session in insertion order, returning each
    /// session's drained outbound batch for the caller to actually transmit.
    pub fn iterate_all(&mut self) -> Vec<(SessionId, Vec<Packet>)> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get_mut(id).map(|session| (*id, session.iterate())))
            .collect()
    }

    /// Runs the watchdog check on every session, returning the ids that
    /// tripped on this call.
    pub fn check_all_watchdogs(&mut self) -> Vec<SessionId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.sessions.get_mut(id).is_some_and(Session::check_watchdog))
            .collect()
    }

    /// Reaps every session flagged closed. Must run after `iterate_all()`
    /// within a tick (§4.3 ordering).
    pub fn free_all_closed(&mut self) {
        let sessions = &mut self.sessions;
        self.order.retain(|id| {
            let keep = sessions.get(id).is_some_and(|s| !s.is_closed());
            if !keep {
                sessions.remove(id);
            }
            keep
        });
    }

    /// Closes every session, e.g. on graceful node termination.
    pub fn close_all(&mut self) {
        for session in self.sessions.values_mut() {
            session.close();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn iterate_all_preserves_insertion_order() {
        let mut registry = SessionRegistry::new(4, Duration::from_secs(3));
        let a = registry.open(addr(1));
        let b = registry.open(addr(2));
        let c = registry.open(addr(3));

        let ids: Vec<_> = registry.iterate_all().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn free_all_closed_reaps_only_closed_sessions() {
        let mut registry = SessionRegistry::new(4, Duration::from_secs(3));
        let a = registry.open(addr(1));
        let b = registry.open(addr(2));

        registry.get_mut(a).unwrap().close();
        registry.free_all_closed();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn closed_session_invisible_to_iter() {
        let mut registry = SessionRegistry::new(4, Duration::from_secs(3));
        let a = registry.open(addr(1));
        registry.get_mut(a).unwrap().close();
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn close_all_marks_every_session_closed() {
        let mut registry = SessionRegistry::new(4, Duration::from_secs(3));
        registry.open(addr(1));
        registry.open(addr(2));
        registry.close_all();
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn check_all_watchdogs_reports_only_newly_tripped() {
        let mut registry = SessionRegistry::new(4, Duration::from_millis(5));
        let a = registry.open(addr(1));
        std::thread::sleep(Duration::from_millis(10));

        let tripped = registry.check_all_watchdogs();
        assert_eq!(tripped, vec![a]);

        // already closed: second pass reports nothing new
        let tripped_again = registry.check_all_watchdogs();
        assert!(tripped_again.is_empty());
    }
}
