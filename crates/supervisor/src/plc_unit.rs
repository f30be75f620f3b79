//! [`ReactorUnitAggregator`] implementation backed by a PLC session (§4.5).
//!
//! `a_commit_br10` and friends don't touch the network directly — they stage
//! [`PlcCmdMsg`]s in a local queue that [`crate::node`] drains once per tick
//! and hands to the session registry. `control_record()` always reflects the
//! last [`PlcStatusMsg`] actually received, not an optimistic local estimate.

use scada_kernel::ReactorUnitAggregator;
use scada_net::SessionId;
use scada_types::{FacilityMode, ReactorControlRecord, Tenths, TripName};
use scada_wire::{PlcCmdMsg, RpsStatusMsg};

/// Trip predicates severe enough to count as the "critical unit alarm" the
/// facility ascram evaluation reacts to (§4.4.4). The rest (timeout, manual,
/// force-disabled) are recoverable without tripping the whole facility.
fn is_critical(name: TripName) -> bool {
    matches!(name, TripName::DmgCrit | TripName::Fault | TripName::NoFuel)
}

pub struct PlcUnit {
    session: SessionId,
    record: ReactorControlRecord,
    auto_engaged: bool,
    tripped: bool,
    critical_alarm: bool,
    ramp_target: Tenths,
    pending: Vec<PlcCmdMsg>,
}

impl PlcUnit {
    pub fn new(session: SessionId, record: ReactorControlRecord) -> Self {
        Self {
            session,
            record,
            auto_engaged: false,
            tripped: false,
            critical_alarm: false,
            ramp_target: Tenths::ZERO,
            pending: Vec::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Reconciles local state with the most recent telemetry from the PLC.
    pub fn on_status(&mut self, record: ReactorControlRecord) {
        self.record = record;
    }

    pub fn on_rps_status(&mut self, status: &RpsStatusMsg) {
        self.tripped = status.tripped;
        self.critical_alarm = status.tripped && status.first_trip.is_some_and(is_critical);
    }

    /// Drains the commands staged since the last drain, in issue order.
    pub fn drain_commands(&mut self) -> Vec<PlcCmdMsg> {
        std::mem::take(&mut self.pending)
    }
}

impl ReactorUnitAggregator for PlcUnit {
    fn control_record(&self) -> ReactorControlRecord {
        self.record
    }

    fn a_engage(&mut self) {
        self.auto_engaged = true;
    }

    fn a_disengage(&mut self) {
        self.auto_engaged = false;
        self.ramp_target = Tenths::ZERO;
        self.pending.push(PlcCmdMsg::SetBurnRate {
            enable: false,
            target_br10: Tenths::ZERO,
            ramp: false,
        });
    }

    fn a_scram(&mut self) {
        self.tripped = true;
        self.pending.push(PlcCmdMsg::Scram { automatic: true });
    }

    fn a_commit_br10(&mut self, target: Tenths, ramp: bool) {
        self.ramp_target = target.min(self.record.lim_br10);
        self.pending.push(PlcCmdMsg::SetBurnRate {
            enable: self.auto_engaged,
            target_br10: self.ramp_target,
            ramp,
        });
    }

    fn a_ramp_complete(&self) -> bool {
        self.record.br10 == self.ramp_target
    }

    fn a_get_effective_limit(&self) -> Tenths {
        self.record.lim_br10
    }

    fn a_cond_rps_reset(&mut self) {
        self.tripped = false;
        self.pending.push(PlcCmdMsg::Reset);
    }

    fn scram(&mut self) {
        self.tripped = true;
        self.pending.push(PlcCmdMsg::Scram { automatic: false });
    }

    fn ack_all(&mut self) {
        // Alarm acknowledgement is tracked at the facility layer
        // (`FacilityController::operator_reset_alarm`); nothing per-unit to do.
    }

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
