//! Pure control logic for the reactor SCADA facility: the RPS trip engine,
//! the PLC ramp/setpoint arithmetic, and the facility mode machine.
//!
//! No IO, no clock, no device access — every side effect this crate performs
//! is invoked through a trait object passed in by the caller (`Reactor` for
//! the RPS, `ReactorUnitAggregator` for the facility controller), matching
//! the rest of the workspace's split between a pure core and a thin runtime.

pub mod error;
pub mod facility;
pub mod moving_average;
pub mod plc;
pub mod rps;

pub use error::KernelError;
pub use facility::{
    allocate_burn, evaluate_ascram, pid_step, AllocationResult, FacilityController, FacilityState,
    PidGains, PidState, ReactorUnitAggregator, TickOutcome, UnitLimit, PID_GAINS,
};
pub use moving_average::MovingAverage;
pub use plc::{step_ramp, target_br10};
pub use rps::{evaluate_trips, Rps, RpsConfig, RpsInputs, RpsScan, RpsStatus, TripFlags};
