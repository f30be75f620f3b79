//! `FacilityController::tick()` — the one place the facility's pure logic
//! meets the `ReactorUnitAggregator` side effects (§4.4).

use std::collections::BTreeMap;

use scada_types::{AscramReason, FacilityMode, MatrixSnapshot, Tenths, UnitId, POWER_PER_BLADE};

use super::allocation::{allocate_burn, UnitLimit};
use super::aggregator::ReactorUnitAggregator;
use super::ascram::evaluate_ascram;
use super::pid::{pid_step, PidState, PID_GAINS};
use super::FacilityState;

/// What one `tick()` produced, for logging and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub mode: FacilityMode,
    pub ascram_reason: AscramReason,
    pub desired_mb_per_tick: f64,
    pub assignments: BTreeMap<UnitId, Tenths>,
    pub residual: Tenths,
    pub saturated: bool,
}

pub struct FacilityController<U: ReactorUnitAggregator> {
    pub state: FacilityState,
    units: BTreeMap<UnitId, U>,
}

impl<U: ReactorUnitAggregator> FacilityController<U> {
    pub fn new(units: BTreeMap<UnitId, U>) -> Self {
        Self {
            state: FacilityState::new(),
            units,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&U> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut U> {
        self.units.get_mut(&id)
    }

    /// Registers a unit discovered after construction, e.g. a PLC announcing
    /// itself over the network rather than being known up front.
    pub fn insert_unit(&mut self, id: UnitId, unit: U) {
        self.units.insert(id, unit);
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Operator-staged mode change; takes effect at the start of the next `tick()`.
    pub fn stage_mode(&mut self, mode: FacilityMode) {
        self.state.mode_set = Some(mode);
    }

    /// Operator-staged target: aggregate mB/t for `BURN_RATE`, or the
    /// charge/generation-rate target consumed by the PID loop in
    /// `CHARGE`/`GEN_RATE`.
    pub fn set_target(&mut self, target: f64) {
        self.state.target = target;
    }

    pub fn set_group(&mut self, unit: UnitId, group: scada_types::GroupId) {
        self.state.set_group(unit, group);
    }

    /// Clears a `UNIT_ALARM_IDLE` hold. The spec requires an explicit
    /// operator reset and does not name its destination mode; this drops
    /// back to `INACTIVE`, the only mode every unit is already consistent
    /// with (DESIGN.md records this choice).
    pub fn operator_reset_alarm(&mut self) {
        if self.state.mode == FacilityMode::UnitAlarmIdle {
            self.state.ascram = false;
            self.state.ascram_reason = AscramReason::None;
            self.state.mode_set = Some(FacilityMode::Inactive);
        }
    }

    fn assigned_ids(&self) -> Vec<UnitId> {
        self.state.assigned_units().collect()
    }

    fn max_burn_combined(&self) -> f64 {
        self.assigned_ids()
            .iter()
            .filter_map(|id| self.units.get(id))
            .map(|u| u.a_get_effective_limit().as_mb_per_tick())
            .sum()
    }

    fn apply_staged_mode(&mut self) {
        let Some(new_mode) = self.state.mode_set.take() else {
            return;
        };
        if new_mode == self.state.mode {
            return;
        }

        if new_mode == FacilityMode::Inactive {
            for id in self.assigned_ids() {
                if let Some(u) = self.units.get_mut(&id) {
                    u.scram();
                    u.a_disengage();
                }
            }
        } else if self.state.mode == FacilityMode::Inactive {
            let ids = self.assigned_ids();
            let total_blades: u32 = ids
                .iter()
                .filter_map(|id| self.units.get(id))
                .map(|u| u.control_record().blade_count)
                .sum();
            self.state.charge_conversion = f64::from(total_blades) * POWER_PER_BLADE;

            for id in ids {
                if let Some(u) = self.units.get_mut(&id) {
                    u.a_engage();
                }
            }
            self.state.pid = PidState::reset();
            if new_mode != FacilityMode::MatrixFaultIdle {
                self.state.ascram = false;
                self.state.ascram_reason = AscramReason::None;
            }
        }

        self.state.last_mode = self.state.mode;
        self.state.mode = new_mode;
    }

    /// One controller tick (§4.4, §5 "a controller tick is atomic"). `now` is
    /// a monotonic seconds counter; `matrix` is the latest induction-matrix
    /// reading, or `None` if disconnected; `ramp` selects ramped vs. direct
    /// setpoint application for this tick's allocation commit.
    pub fn tick(&mut self, now: f64, matrix: Option<&MatrixSnapshot>, ramp: bool) -> TickOutcome {
        self.apply_staged_mode();

        if let Some(m) = matrix {
            self.state.charge_avg.push(m.energy);
            self.state.inflow_avg.push(m.input_rate);
            self.state.outflow_avg.push(m.output_rate);
        }

        if self.state.mode != FacilityMode::Inactive && self.state.mode != FacilityMode::UnitAlarmIdle {
            self.evaluate_ascram_and_transition(matrix);
        }

        if self.state.mode == FacilityMode::Inactive || self.state.mode.is_idle_hold() {
            return TickOutcome {
                mode: self.state.mode,
                ascram_reason: self.state.ascram_reason,
                desired_mb_per_tick: 0.0,
                assignments: BTreeMap::new(),
                residual: Tenths::ZERO,
                saturated: false,
            };
        }

        let max_combined = self.max_burn_combined();
        let desired = self.desired_burn(now, max_combined);
        self.allocate_and_commit(desired, max_combined, ramp)
    }

    fn desired_burn(&mut self, now: f64, max_combined: f64) -> f64 {
        match self.state.mode {
            FacilityMode::Simple => max_combined,
            FacilityMode::BurnRate => self.state.target,
            FacilityMode::Charge | FacilityMode::GenRate => {
                let measured = if self.state.mode == FacilityMode::Charge {
                    self.state.charge_avg.mean()
                } else {
                    self.state.outflow_avg.mean()
                };
                let ramp_complete = self
                    .assigned_ids()
                    .iter()
                    .filter_map(|id| self.units.get(id))
                    .all(|u| u.a_ramp_complete());
                pid_step(
                    &mut self.state.pid,
                    self.state.target,
                    measured,
                    self.state.charge_conversion,
                    now,
                    max_combined,
                    &PID_GAINS,
                    ramp_complete,
                )
            }
            FacilityMode::Inactive | FacilityMode::MatrixFaultIdle | FacilityMode::UnitAlarmIdle => 0.0,
        }
    }

    fn allocate_and_commit(&mut self, desired: f64, max_combined: f64, ramp: bool) -> TickOutcome {
        let prio_defs = self.state.prio_defs();
        let mut groups: [Vec<UnitLimit>; 4] = Default::default();
        for (g, ids) in prio_defs.iter().enumerate() {
            for &id in ids {
                if let Some(u) = self.units.get(&id) {
                    groups[g].push(UnitLimit {
                        unit: id,
                        lim_br10: u.a_get_effective_limit(),
                    });
                }
            }
        }

        let result = allocate_burn(desired, &groups);
        for (&id, &target) in &result.assignments {
            if let Some(u) = self.units.get_mut(&id) {
                u.a_commit_br10(target, ramp);
            }
        }

        let saturated = result.residual.get() > 0 || desired >= max_combined;
        TickOutcome {
            mode: self.state.mode,
            ascram_reason: self.state.ascram_reason,
            desired_mb_per_tick: desired,
            assignments: result.assignments,
            residual: result.residual,
            saturated,
        }
    }

    fn evaluate_ascram_and_transition(&mut self, matrix: Option<&MatrixSnapshot>) {
        let any_critical_alarm = self
            .assigned_ids()
            .iter()
            .filter_map(|id| self.units.get(id))
            .any(|u| u.has_critical_alarm());

        let previous = self.state.ascram_reason;
        let next = evaluate_ascram(previous, matrix, any_critical_alarm);

        if previous == AscramReason::None && next != AscramReason::None {
            for id in self.assigned_ids() {
                if let Some(u) = self.units.get_mut(&id) {
                    u.a_scram();
                }
            }
            self.state.ascram = true;
            self.state.status_text = next.status_text();

            match next {
                AscramReason::MatrixDc | AscramReason::MatrixFill => {
                    self.state.return_mode = self.state.mode;
                    self.state.mode = FacilityMode::MatrixFaultIdle;
                }
                AscramReason::CritAlarm => {
                    self.state.mode = FacilityMode::UnitAlarmIdle;
                }
                AscramReason::None => unreachable!("rising edge implies next != None"),
            }
        } else if previous != AscramReason::None && next == AscramReason::None {
            for id in self.assigned_ids() {
                if let Some(u) = self.units.get_mut(&id) {
                    u.a_cond_rps_reset();
                }
            }
            self.state.ascram = false;
            self.state.status_text = next.status_text();

            if self.state.mode == FacilityMode::MatrixFaultIdle {
                self.state.mode = self.state.return_mode;
            }
        } else if (previous == AscramReason::MatrixDc || previous == AscramReason::MatrixFill)
            && next == AscramReason::CritAlarm
            && self.state.mode == FacilityMode::MatrixFaultIdle
        {
            // A critical alarm occurring during a matrix-fault hold exits
            // straight to INACTIVE rather than waiting on return_mode.
            self.state.mode = FacilityMode::Inactive;
        }

        self.state.ascram_reason = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scada_types::{GroupId, ReactorControlRecord};

    use super::super::aggregator::test_support::TestUnit;

    fn unit(lim: u32, blades: u32) -> TestUnit {
        TestUnit::new(ReactorControlRecord::new(Tenths::new(lim), blades))
    }

    fn matrix(fill: f64) -> MatrixSnapshot {
        MatrixSnapshot {
            formed: true,
            energy: fill * 1000.0,
            max_energy: 1000.0,
            input_rate: 0.0,
            output_rate: 0.0,
        }
    }

    #[test]
    fn scenario_simple_mode_saturation() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(1), unit(50, 8));
        units.insert(UnitId::new(2), unit(100, 8));
        let mut ctrl = FacilityController::new(units);
        ctrl.set_group(UnitId::new(1), GroupId::Group(1));
        ctrl.set_group(UnitId::new(2), GroupId::Group(1));
        ctrl.stage_mode(FacilityMode::Simple);

        let outcome = ctrl.tick(0.0, Some(&matrix(0.5)), false);
        assert_eq!(outcome.assignments[&UnitId::new(1)], Tenths::new(50));
        assert_eq!(outcome.assignments[&UnitId::new(2)], Tenths::new(100));
        assert_eq!(outcome.residual, Tenths::ZERO);
        assert!(outcome.saturated);
    }

    #[test]
    fn inactive_mode_holds_zero_and_disengaged() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(1), unit(50, 8));
        let mut ctrl = FacilityController::new(units);
        ctrl.set_group(UnitId::new(1), GroupId::Group(1));
        ctrl.stage_mode(FacilityMode::Simple);
        ctrl.tick(0.0, Some(&matrix(0.5)), false);

        ctrl.stage_mode(FacilityMode::Inactive);
        let outcome = ctrl.tick(1.0, Some(&matrix(0.5)), false);
        assert_eq!(outcome.mode, FacilityMode::Inactive);
        assert_eq!(ctrl.unit(UnitId::new(1)).unwrap().control_record().br10, Tenths::ZERO);
    }

    #[test]
    fn matrix_fill_hysteresis_scenario() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(1), unit(100, 8));
        let mut ctrl = FacilityController::new(units);
        ctrl.set_group(UnitId::new(1), GroupId::Group(1));
        ctrl.stage_mode(FacilityMode::Simple);
        ctrl.tick(0.0, Some(&matrix(0.5)), false);
        assert_eq!(ctrl.state.mode, FacilityMode::Simple);

        // fill crosses 1.00: auto-SCRAM into MATRIX_FAULT_IDLE
        ctrl.tick(1.0, Some(&matrix(1.0)), false);
        assert_eq!(ctrl.state.mode, FacilityMode::MatrixFaultIdle);
        assert_eq!(ctrl.state.ascram_reason, AscramReason::MatrixFill);

        // fill drops to 0.97: latch persists
        ctrl.tick(2.0, Some(&matrix(0.97)), false);
        assert_eq!(ctrl.state.mode, FacilityMode::MatrixFaultIdle);
        assert_eq!(ctrl.state.ascram_reason, AscramReason::MatrixFill);

        // fill drops to 0.94: latch clears, mode returns to SIMPLE
        ctrl.tick(3.0, Some(&matrix(0.94)), false);
        assert_eq!(ctrl.state.mode, FacilityMode::Simple);
        assert_eq!(ctrl.state.ascram_reason, AscramReason::None);
    }

    #[test]
    fn critical_alarm_scenario() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(1), unit(100, 8));
        let mut ctrl = FacilityController::new(units);
        ctrl.set_group(UnitId::new(1), GroupId::Group(1));
        ctrl.stage_mode(FacilityMode::Charge);
        ctrl.set_target(500.0);
        ctrl.tick(0.0, Some(&matrix(0.5)), true);

        ctrl.unit_mut(UnitId::new(1)).unwrap().set_critical_alarm(true);
        let outcome = ctrl.tick(1.0, Some(&matrix(0.5)), true);

        assert_eq!(outcome.mode, FacilityMode::UnitAlarmIdle);
        assert_eq!(outcome.ascram_reason, AscramReason::CritAlarm);
    }

    #[test]
    fn critical_alarm_during_matrix_fault_hold_exits_to_inactive() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(1), unit(100, 8));
        let mut ctrl = FacilityController::new(units);
        ctrl.set_group(UnitId::new(1), GroupId::Group(1));
        ctrl.stage_mode(FacilityMode::Simple);
        ctrl.tick(0.0, Some(&matrix(0.5)), false);

        // matrix telemetry drops out: auto-SCRAM into MATRIX_FAULT_IDLE
        ctrl.tick(1.0, None, false);
        assert_eq!(ctrl.state.mode, FacilityMode::MatrixFaultIdle);
        assert_eq!(ctrl.state.ascram_reason, AscramReason::MatrixDc);

        // matrix comes back healthy, but a critical unit alarm is now active
        ctrl.unit_mut(UnitId::new(1)).unwrap().set_critical_alarm(true);
        let outcome = ctrl.tick(2.0, Some(&matrix(0.5)), false);
        assert_eq!(outcome.mode, FacilityMode::Inactive);
        assert_eq!(outcome.ascram_reason, AscramReason::CritAlarm);
    }
}
