//! The per-unit facade the facility controller drives (§4.5).
//!
//! This is a pure trait: `scada-kernel` never touches a device or a session
//! directly. The supervisor's real implementation sits over a PLC session —
//! `a_commit_br10` queues a `PLC_CMD`, `control_record()` reflects the last
//! `PLC_STATUS` received — and lives in the `supervisor` crate, which is the
//! layer that actually depends on `scada-net`/`scada-wire`.

use scada_types::{FacilityMode, ReactorControlRecord, Tenths};

/// Operations the facility controller performs on a unit (§4.5).
pub trait ReactorUnitAggregator {
    fn control_record(&self) -> ReactorControlRecord;
    fn a_engage(&mut self);
    fn a_disengage(&mut self);
    fn a_scram(&mut self);
    fn a_commit_br10(&mut self, target: Tenths, ramp: bool);
    fn a_ramp_complete(&self) -> bool;
    fn a_get_effective_limit(&self) -> Tenths;
    fn a_cond_rps_reset(&mut self);
    fn scram(&mut self);
    fn ack_all(&mut self);
    fn has_critical_alarm(&self) -> bool;
    /// Rejected (returns `false`) unless the facility is `INACTIVE`.
    fn set_burn_limit(&mut self, facility_mode: FacilityMode, tenths: Tenths) -> bool;
    fn update(&mut self);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// An in-memory stand-in for a unit, tracking only what the facility
    /// controller's contract requires. Used by `scada-kernel`'s own tests so
    /// the controller can be exercised without a device or a session.
    pub(crate) struct TestUnit {
        record: ReactorControlRecord,
        auto_engaged: bool,
        tripped: bool,
        critical_alarm: bool,
        ramp_target: Tenths,
    }

    impl TestUnit {
        pub(crate) fn new(record: ReactorControlRecord) -> Self {
            Self {
                record,
                auto_engaged: false,
                tripped: false,
                critical_alarm: false,
                ramp_target: Tenths::ZERO,
            }
        }

        pub(crate) fn set_critical_alarm(&mut self, value: bool) {
            self.critical_alarm = value;
        }
    }

    impl ReactorUnitAggregator for TestUnit {
        fn control_record(&self) -> ReactorControlRecord {
            self.record
        }

        fn a_engage(&mut self) {
            self.auto_engaged = true;
        }

        fn a_disengage(&mut self) {
            self.auto_engaged = false;
            self.record.br10 = Tenths::ZERO;
        }

        fn a_scram(&mut self) {
            self.tripped = true;
            self.record.br10 = Tenths::ZERO;
        }

        fn a_commit_br10(&mut self, target: Tenths, ramp: bool) {
            self.ramp_target = target.min(self.record.lim_br10);
            if self.tripped || !self.auto_engaged {
                self.record.br10 = Tenths::ZERO;
                return;
            }
            if ramp {
                let step = (self.record.lim_br10.get() / 10).max(1);
                self.record.br10 = if self.record.br10 < self.ramp_target {
                    (self.record.br10 + Tenths::new(step)).min(self.ramp_target)
                } else {
                    self.record.br10.saturating_sub(Tenths::new(step)).max(self.ramp_target)
                };
            } else {
                self.record.br10 = self.ramp_target;
            }
        }

        fn a_ramp_complete(&self) -> bool {
            self.record.br10 == self.ramp_target
        }

        fn a_get_effective_limit(&self) -> Tenths {
            self.record.lim_br10
        }

        fn a_cond_rps_reset(&mut self) {
            self.tripped = false;
        }

        fn scram(&mut self) {
            self.tripped = true;
            self.record.br10 = Tenths::ZERO;
        }

        fn ack_all(&mut self) {}

        fn has_critical_alarm(&self) -> bool {
            self.critical_alarm
        }

        fn set_burn_limit(&mut self, facility_mode: FacilityMode, tenths: Tenths) -> bool {
            if facility_mode != FacilityMode::Inactive {
                return false;
            }
            self.record.lim_br10 = tenths;
            true
        }

        fn update(&mut self) {}
    }

    #[test]
    fn set_burn_limit_rejected_outside_inactive() {
        let mut u = TestUnit::new(ReactorControlRecord::new(Tenths::new(100), 8));
        assert!(!u.set_burn_limit(FacilityMode::Simple, Tenths::new(50)));
        assert_eq!(u.control_record().lim_br10, Tenths::new(100));
    }

    #[test]
    fn set_burn_limit_accepted_when_inactive() {
        let mut u = TestUnit::new(ReactorControlRecord::new(Tenths::new(100), 8));
        assert!(u.set_burn_limit(FacilityMode::Inactive, Tenths::new(50)));
        assert_eq!(u.control_record().lim_br10, Tenths::new(50));
    }

    #[test]
    fn disengage_zeroes_setpoint() {
        let mut u = TestUnit::new(ReactorControlRecord::new(Tenths::new(100), 8));
        u.a_engage();
        u.a_commit_br10(Tenths::new(80), false);
        assert_eq!(u.control_record().br10, Tenths::new(80));
        u.a_disengage();
        assert_eq!(u.control_record().br10, Tenths::ZERO);
    }
}
