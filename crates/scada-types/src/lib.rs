//! # scada-types: shared data model for the reactor SCADA facility
//!
//! Types shared across the reactor PLC, supervisor and coordinator nodes:
//! - Identifiers ([`UnitId`], [`GroupId`])
//! - Burn-rate quantities ([`Tenths`])
//! - Telemetry and control records ([`ReactorSnapshot`], [`ReactorControlRecord`])
//! - Induction matrix state ([`MatrixSnapshot`])
//! - Facility mode and trip enums ([`FacilityMode`], [`AscramReason`], [`TripName`])
//!
//! No IO, no clocks, no randomness: everything here is a plain value type.

mod device;
mod group;
mod matrix;
mod mode;
mod telemetry;
mod tenths;

pub use device::{DeviceError, InductionMatrix, Reactor, RedstoneIo};
pub use group::{GroupId, UnitId};
pub use matrix::MatrixSnapshot;
pub use mode::{AscramReason, FacilityMode};
pub use telemetry::{ReactorControlRecord, ReactorSnapshot, TripName};
pub use tenths::Tenths;

/// Energy generated per blade per mB/t of burn rate.
///
/// Fixed physical constant of the facility's induction-matrix wiring, not a
/// tunable. `charge_conversion = blade_count * POWER_PER_BLADE`.
pub const POWER_PER_BLADE: f64 = 2856.0;
