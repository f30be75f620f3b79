//! The Reactor Protection System (§4.1).
//!
//! `evaluate_trips` is a pure function so the trip predicates can be
//! property-tested without a device. `Rps` wraps the latch and the one side
//! effect the contract requires: `scram()` on the untripped→tripped edge.

use scada_types::{DeviceError, Reactor, ReactorSnapshot, TripName};

use crate::error::KernelError;

/// Configurable trip thresholds (§4.1 defaults).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpsConfig {
    pub high_temp_k: f64,
    pub low_coolant_fraction: f64,
    pub high_waste_fraction: f64,
    pub high_heated_coolant_fraction: f64,
}

impl Default for RpsConfig {
    fn default() -> Self {
        Self {
            high_temp_k: 1200.0,
            low_coolant_fraction: 0.10,
            high_waste_fraction: 0.80,
            high_heated_coolant_fraction: 0.80,
        }
    }
}

/// Everything the trip evaluation needs for one scan: the device snapshot
/// plus the external conditions the device itself cannot report (operator
/// SCRAM, supervisor auto-SCRAM request, comms watchdog, PLC init state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpsInputs {
    pub snapshot: ReactorSnapshot,
    pub force_disabled: bool,
    pub manual: bool,
    pub automatic: bool,
    pub timeout: bool,
    pub sys_fail: bool,
}

/// The full trip-flag vector (§3: "RPS state").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripFlags {
    pub dmg_crit: bool,
    pub high_temp: bool,
    pub no_coolant: bool,
    pub full_waste: bool,
    pub heated_coolant_backup: bool,
    pub no_fuel: bool,
    pub fault: bool,
    pub timeout: bool,
    pub manual: bool,
    pub automatic: bool,
    pub sys_fail: bool,
    pub force_disabled: bool,
}

impl TripFlags {
    pub fn get(&self, name: TripName) -> bool {
        match name {
            TripName::DmgCrit => self.dmg_crit,
            TripName::HighTemp => self.high_temp,
            TripName::NoCoolant => self.no_coolant,
            TripName::FullWaste => self.full_waste,
            TripName::HeatedCoolantBackup => self.heated_coolant_backup,
            TripName::NoFuel => self.no_fuel,
            TripName::Fault => self.fault,
            TripName::Timeout => self.timeout,
            TripName::Manual => self.manual,
            TripName::Automatic => self.automatic,
            TripName::SysFail => self.sys_fail,
            TripName::ForceDisabled => self.force_disabled,
        }
    }

    pub fn any(&self) -> bool {
        TripName::ALL.iter().any(|&n| self.get(n))
    }

    /// The first trip name that reads true, in `TripName::ALL` declaration
    /// order — the stable tie-break the `first_trip` tag requires.
    pub fn first_true(&self) -> Option<TripName> {
        TripName::ALL.iter().copied().find(|&n| self.get(n))
    }
}

/// Pure trip evaluation: no device access, no latch, no side effects.
pub fn evaluate_trips(inputs: &RpsInputs, config: &RpsConfig) -> TripFlags {
    let s = &inputs.snapshot;
    TripFlags {
        dmg_crit: s.damage_pct >= 100.0,
        high_temp: s.temperature_k >= config.high_temp_k,
        no_coolant: s.coolant_fill < config.low_coolant_fraction,
        full_waste: s.waste_fill >= config.high_waste_fraction,
        heated_coolant_backup: s.heated_coolant_fill >= config.high_heated_coolant_fraction,
        no_fuel: s.fuel_fill <= 0.0,
        fault: s.fault || !s.status_ok,
        timeout: inputs.timeout,
        manual: inputs.manual,
        automatic: inputs.automatic,
        sys_fail: inputs.sys_fail,
        force_disabled: inputs.force_disabled,
    }
}

/// Result of one `scan()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpsScan {
    pub tripped: bool,
    pub first_trip: Option<TripName>,
}

/// Exported flag vector plus latch state (§4.1 `status()`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpsStatus {
    pub tripped: bool,
    pub first_trip: Option<TripName>,
    pub flags: TripFlags,
    pub manual: bool,
}

/// `IDLE -> TRIPPED` on any predicate true; `TRIPPED -> IDLE` on `reset()`
/// with all predicates false. No other transitions (§4.1 state machine).
#[derive(Debug, Clone)]
pub struct Rps {
    config: RpsConfig,
    tripped: bool,
    first_trip: Option<TripName>,
    last_flags: TripFlags,
    manual: bool,
}

impl Rps {
    pub fn new(config: RpsConfig) -> Self {
        Self {
            config,
            tripped: false,
            first_trip: None,
            last_flags: TripFlags::default(),
            manual: false,
        }
    }

    /// Evaluates the trip set against `inputs`. Idempotent with respect to
    /// calling frequency; invokes `reactor.scram()` exactly once, on the
    /// untripped→tripped transition.
    pub fn scan(
        &mut self,
        inputs: &RpsInputs,
        reactor: &mut dyn Reactor,
    ) -> Result<RpsScan, KernelError> {
        let flags = evaluate_trips(inputs, &self.config);
        self.last_flags = flags;

        if !self.tripped && flags.any() {
            self.tripped = true;
            self.first_trip = flags.first_true();
            self.manual = flags.manual;
            reactor.scram().map_err(|err| match err {
                DeviceError::Faulted(msg) => KernelError::Device(msg),
                DeviceError::NotMounted => KernelError::Device("not mounted".to_string()),
            })?;
        }

        Ok(RpsScan {
            tripped: self.tripped,
            first_trip: self.first_trip,
        })
    }

    /// Clears the latch only if every predicate evaluated on the most recent
    /// `scan()` is false. Returns whether the reset succeeded.
    pub fn reset(&mut self) -> bool {
        if self.tripped && !self.last_flags.any() {
            self.tripped = false;
            self.first_trip = None;
            self.manual = false;
            true
        } else {
            false
        }
    }

    pub fn status(&self) -> RpsStatus {
        RpsStatus {
            tripped: self.tripped,
            first_trip: self.first_trip,
            flags: self.last_flags,
            manual: self.manual,
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }
}
