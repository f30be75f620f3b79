use serde::{Deserialize, Serialize};

/// Facility operating mode (§3, §4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityMode {
    Inactive,
    Simple,
    BurnRate,
    Charge,
    GenRate,
    MatrixFaultIdle,
    UnitAlarmIdle,
}

impl FacilityMode {
    /// True for the two safe-hold modes that exist only as automatic
    /// transitions out of an active mode (never staged directly by the
    /// operator).
    pub fn is_idle_hold(self) -> bool {
        matches!(self, FacilityMode::MatrixFaultIdle | FacilityMode::UnitAlarmIdle)
    }

    /// True for the PID-driven modes (§4.4.3).
    pub fn uses_pid(self) -> bool {
        matches!(self, FacilityMode::Charge | FacilityMode::GenRate)
    }
}

/// Cause of an automatic SCRAM latch (§4.4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AscramReason {
    None,
    MatrixDc,
    MatrixFill,
    CritAlarm,
}

impl AscramReason {
    pub fn status_text(self) -> &'static str {
        match self {
            AscramReason::None => "nominal",
            AscramReason::MatrixDc => "auto-scram: induction matrix disconnected",
            AscramReason::MatrixFill => "auto-scram: induction matrix full",
            AscramReason::CritAlarm => "auto-scram: critical unit alarm",
        }
    }
}
