use serde::{Deserialize, Serialize};

use crate::tenths::Tenths;

/// A single reading of reactor telemetry, as produced by the device shim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactorSnapshot {
    /// True if the device reported itself operational (not `force_disabled`).
    pub status_ok: bool,
    /// Fuel fill, 0.0..=1.0.
    pub fuel_fill: f64,
    /// Coolant fill, 0.0..=1.0.
    pub coolant_fill: f64,
    /// Waste fill, 0.0..=1.0.
    pub waste_fill: f64,
    /// Heated-coolant fill, 0.0..=1.0.
    pub heated_coolant_fill: f64,
    /// Core temperature, kelvin.
    pub temperature_k: f64,
    /// Damage, percent, 0.0..=100.0 (and beyond, in a fault).
    pub damage_pct: f64,
    /// Boil rate, mB/t.
    pub boil_rate: f64,
    /// Current burn rate reported by the device, mB/t.
    pub burn_rate: f64,
    /// Environmental loss fraction.
    pub environmental_loss: f64,
    /// True if the device could not be read this tick (comms/device fault).
    pub fault: bool,
}

impl ReactorSnapshot {
    /// A snapshot representing a healthy, idle reactor — useful as a test fixture.
    pub fn idle() -> Self {
        Self {
            status_ok: true,
            fuel_fill: 1.0,
            coolant_fill: 1.0,
            waste_fill: 0.0,
            heated_coolant_fill: 0.0,
            temperature_k: 300.0,
            damage_pct: 0.0,
            boil_rate: 0.0,
            burn_rate: 0.0,
            environmental_loss: 0.0,
            fault: false,
        }
    }
}

/// The per-unit control record the facility controller and PLC reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorControlRecord {
    /// Current burn-rate setpoint.
    pub br10: Tenths,
    /// Operator-configured maximum.
    pub lim_br10: Tenths,
    /// Turbine blade count; defines power-per-burn.
    pub blade_count: u32,
    /// Whether the unit is ready to accept commands.
    pub ready: bool,
    /// Whether the unit is in a degraded (but not tripped) state.
    pub degraded: bool,
}

impl ReactorControlRecord {
    pub fn new(lim_br10: Tenths, blade_count: u32) -> Self {
        Self {
            br10: Tenths::ZERO,
            lim_br10,
            blade_count,
            ready: true,
            degraded: false,
        }
    }
}

/// Names of the fixed RPS trip predicates (§4.1). Order is not significant;
/// stored as the `first_trip` tag and used as the stable key in `status()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripName {
    DmgCrit,
    HighTemp,
    NoCoolant,
    FullWaste,
    HeatedCoolantBackup,
    NoFuel,
    Fault,
    Timeout,
    Manual,
    Automatic,
    SysFail,
    ForceDisabled,
}

impl TripName {
    pub const ALL: [TripName; 12] = [
        TripName::DmgCrit,
        TripName::HighTemp,
        TripName::NoCoolant,
        TripName::FullWaste,
        TripName::HeatedCoolantBackup,
        TripName::NoFuel,
        TripName::Fault,
        TripName::Timeout,
        TripName::Manual,
        TripName::Automatic,
        TripName::SysFail,
        TripName::ForceDisabled,
    ];
}
