use thiserror::Error;

use scada_wire::WireError;

pub type NetResult<T> = Result<T, NetError>;

/// Transport and session failures (§7: peer-absent/watchdog-timeout,
/// malformed packet).
#[derive(Debug, Error)]
pub enum NetError {
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session {0:?} is closed")]
    SessionClosed(crate::session::SessionId),

    #[error("no session registered for {0:?}")]
    UnknownSession(crate::session::SessionId),
}
