use thiserror::Error;

use crate::matrix::MatrixSnapshot;

/// Failure reading or actuating a device shim.
///
/// Maps to the §7 "device-absent / device-faulted" error class: the caller
/// treats any `DeviceError` as grounds to mark the owning component degraded
/// and, for a reactor, to latch the RPS `fault` trip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device is not mounted")]
    NotMounted,
    #[error("device reported an error: {0}")]
    Faulted(String),
}

/// The reactor device shim (§6: `reactor`).
///
/// Implementations must be safe to call every tick; a transient fault is
/// reported via `DeviceError`, not a panic. The RPS (`scada-kernel`) holds
/// this trait object directly so its trip latch can invoke `scram()` without
/// the kernel depending on any concrete device crate.
pub trait Reactor {
    fn scram(&mut self) -> Result<(), DeviceError>;
    fn set_burn_rate(&mut self, mb_per_tick: f64) -> Result<(), DeviceError>;
    fn activate(&mut self) -> Result<(), DeviceError>;

    fn get_temperature(&self) -> Result<f64, DeviceError>;
    fn get_fuel(&self) -> Result<f64, DeviceError>;
    fn get_coolant(&self) -> Result<f64, DeviceError>;
    fn get_waste(&self) -> Result<f64, DeviceError>;
    fn get_heated_coolant(&self) -> Result<f64, DeviceError>;
    fn get_damage_percent(&self) -> Result<f64, DeviceError>;
    fn get_burn_rate(&self) -> Result<f64, DeviceError>;
    fn get_boil_rate(&self) -> Result<f64, DeviceError>;
    fn get_environmental_loss(&self) -> Result<f64, DeviceError>;
    /// True if the device itself reports operational status (not disabled).
    fn get_status(&self) -> Result<bool, DeviceError>;
    /// True if the reactor reports itself administratively disabled
    /// (`force_disabled` trip).
    fn is_force_disabled(&self) -> Result<bool, DeviceError>;
}

/// The induction-matrix device shim (§6: `induction_matrix`).
pub trait InductionMatrix {
    fn snapshot(&self) -> Result<MatrixSnapshot, DeviceError>;
}

/// The redstone I/O device shim (§6: `redstone_io`), bit-level per channel.
pub trait RedstoneIo {
    fn get(&self, channel: u8) -> Result<bool, DeviceError>;
    fn set(&mut self, channel: u8, value: bool) -> Result<(), DeviceError>;
}
