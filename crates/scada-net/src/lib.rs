//! Session registry, bounded queues, and `mio` event-loop glue shared by the
//! three node binaries (§4.3, §5.1).
//!
//! Depends on `scada-wire` for the packet types a session moves, and on
//! `scada-types` transitively; holds no kernel logic of its own — a session
//! is a transport concern, not a control-logic one.

mod bounded_queue;
mod error;
mod event_loop;
mod registry;
mod session;

pub use bounded_queue::{BoundedQueue, PushResult};
pub use error::{NetError, NetResult};
pub use event_loop::{EventLoop, WakeReason};
pub use registry::SessionRegistry;
pub use session::{Session, SessionId};
