//! The Facility Process Controller (§4.4).

mod allocation;
mod aggregator;
mod ascram;
mod controller;
mod pid;

pub use allocation::{allocate_burn, AllocationResult, UnitLimit};
pub use aggregator::ReactorUnitAggregator;
pub use ascram::evaluate_ascram;
pub use controller::{FacilityController, TickOutcome};
pub use pid::{pid_step, PidGains, PidState, PID_GAINS};

use std::collections::BTreeMap;

use scada_types::{AscramReason, FacilityMode, GroupId, Tenths, UnitId, POWER_PER_BLADE};

use crate::moving_average::MovingAverage;

const MOVING_AVERAGE_WINDOW: usize = 20;

/// Facility-wide state (§3 "Facility state"), independent of any one unit's
/// record (those live behind `ReactorUnitAggregator`).
#[derive(Debug, Clone)]
pub struct FacilityState {
    pub mode: FacilityMode,
    pub last_mode: FacilityMode,
    pub return_mode: FacilityMode,
    pub mode_set: Option<FacilityMode>,
    group_map: BTreeMap<UnitId, GroupId>,
    pub pid: PidState,
    pub charge_avg: MovingAverage,
    pub inflow_avg: MovingAverage,
    pub outflow_avg: MovingAverage,
    pub ascram: bool,
    pub ascram_reason: AscramReason,
    pub status_text: &'static str,
    pub charge_conversion: f64,
    /// Operator-staged target: mB/t for `BURN_RATE`, charge/generation target
    /// for `CHARGE`/`GEN_RATE`. Unused in `SIMPLE`/`INACTIVE`.
    pub target: f64,
}

impl Default for FacilityState {
    fn default() -> Self {
        Self {
            mode: FacilityMode::Inactive,
            last_mode: FacilityMode::Inactive,
            return_mode: FacilityMode::Inactive,
            mode_set: None,
            group_map: BTreeMap::new(),
            pid: PidState::default(),
            charge_avg: MovingAverage::new(MOVING_AVERAGE_WINDOW),
            inflow_avg: MovingAverage::new(MOVING_AVERAGE_WINDOW),
            outflow_avg: MovingAverage::new(MOVING_AVERAGE_WINDOW),
            ascram: false,
            ascram_reason: AscramReason::None,
            status_text: "nominal",
            charge_conversion: POWER_PER_BLADE,
            target: 0.0,
        }
    }
}

impl FacilityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `unit` to priority group `group` (0 = independent, §8 round-trip law).
    pub fn set_group(&mut self, unit: UnitId, group: GroupId) {
        if group == GroupId::Independent {
            self.group_map.remove(&unit);
        } else {
            self.group_map.insert(unit, group);
        }
    }

    /// Returns `Independent` for a unit with no group assignment.
    pub fn get_group(&self, unit: UnitId) -> GroupId {
        self.group_map.get(&unit).copied().unwrap_or(GroupId::Independent)
    }

    /// The four facility-controlled priority groups, each the ordered list of
    /// units currently mapped to it (unsorted here — `allocate_burn` performs
    /// the ascending-by-`lim_br10` sort per group internally).
    pub fn prio_defs(&self) -> [Vec<UnitId>; 4] {
        let mut groups: [Vec<UnitId>; 4] = Default::default();
        for (&unit, &group) in &self.group_map {
            if let GroupId::Group(n) = group {
                groups[usize::from(n - 1)].push(unit);
            }
        }
        groups
    }

    pub fn assigned_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.group_map.keys().copied()
    }
}
