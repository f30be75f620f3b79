//! PID control over induction-matrix charge or generation rate (§4.4.3).
//!
//! Anti-windup is saturation gating: the accumulator stops integrating the
//! instant the clamped output diverges from the raw output, and resumes once
//! the output is back inside bounds.

/// Fixed gains (§4.4.3): "tunable constants, not user-visible configuration."
/// Kd is reserved — coded but multiplied by zero, per the open-question
/// resolution in DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

pub const PID_GAINS: PidGains = PidGains {
    kp: 1.0,
    ki: 1e-5,
    kd: 0.0,
};

/// Integrator state carried across ticks for one PID loop (CHARGE or
/// GEN_RATE — the facility only ever runs one at a time).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidState {
    pub accumulator: f64,
    pub last_time: Option<f64>,
    pub last_error: f64,
    pub saturated: bool,
    pub initial_ramp: bool,
    pub waiting_on_ramp: bool,
}

impl Default for PidState {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            last_time: None,
            last_error: 0.0,
            saturated: false,
            initial_ramp: false,
            waiting_on_ramp: false,
        }
    }
}

impl PidState {
    /// Resets the loop to its just-entered-mode state: no history, awaiting
    /// the first allocation's ramp to complete before integrating.
    pub fn reset() -> Self {
        Self {
            initial_ramp: true,
            waiting_on_ramp: true,
            ..Self::default()
        }
    }
}

/// One PID evaluation (§4.4.3).
///
/// `ramp_complete` reports whether every unit finished ramping toward the
/// *previous* setpoint; integration stays frozen until it does.
pub fn pid_step(
    state: &mut PidState,
    target: f64,
    measured: f64,
    charge_conversion: f64,
    now: f64,
    max_burn_combined: f64,
    gains: &PidGains,
    ramp_complete: bool,
) -> f64 {
    let cc = charge_conversion.max(f64::EPSILON);
    let error = (target - measured) / cc;

    if state.last_time.is_none() {
        // First-ever call for this mode entry: the redesign-flag resolution
        // (DESIGN.md) is that the initial setpoint is the normalized error
        // itself, clamped — PID integration takes over from the next tick.
        state.last_time = Some(now);
        state.last_error = error;
        return error.clamp(0.0, max_burn_combined);
    }

    if state.waiting_on_ramp {
        state.last_time = Some(now);
        state.last_error = error;
        if ramp_complete {
            state.waiting_on_ramp = false;
            state.accumulator = 0.0;
        } else {
            return compute_setpoint(state, error, gains, max_burn_combined);
        }
    }

    let dt = (now - state.last_time.unwrap_or(now)).max(0.0);
    state.last_time = Some(now);
    if !state.saturated {
        state.accumulator += (measured / cc) * dt;
    }
    compute_setpoint(state, error, gains, max_burn_combined)
}

fn compute_setpoint(state: &mut PidState, error: f64, gains: &PidGains, max_burn_combined: f64) -> f64 {
    let setpoint = gains.kp * error + gains.ki * state.accumulator; // Kd reserved, not applied
    let sp_r = (setpoint * 10.0).round() / 10.0;
    let sp_c = sp_r.clamp(0.0, max_burn_combined);
    state.saturated = (sp_r - sp_c).abs() > f64::EPSILON;
    state.last_error = error;
    sp_c
}
