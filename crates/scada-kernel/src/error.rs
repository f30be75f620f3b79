use thiserror::Error;

/// Errors surfaced by the pure kernel logic.
///
/// The kernel itself never touches IO; these variants exist for the few
/// places a device side effect is invoked inline (RPS `scram()` on the
/// tripping edge) and can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("device fault while latching SCRAM: {0}")]
    Device(String),
    #[error("unknown unit {0:?}")]
    UnknownUnit(scada_types::UnitId),
}
