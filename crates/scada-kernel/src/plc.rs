//! Setpoint application for the reactor-PLC control loop (§4.2).
//!
//! Pure integer (tenths) arithmetic: ramping a setpoint across many ticks in
//! floating point accumulates drift, so every quantity here is `Tenths`.

use scada_types::Tenths;

/// The target the device should move toward this tick, after the "not
/// enabled or RPS tripped ⇒ target = 0" rule.
pub fn target_br10(enabled: bool, rps_tripped: bool, requested: Tenths, lim_br10: Tenths) -> Tenths {
    if !enabled || rps_tripped {
        Tenths::ZERO
    } else {
        requested.min(lim_br10)
    }
}

/// One ramp step toward `target`, bounded to `lim_br10 / 10` (10%) per tick,
/// with a minimum step of one tenth whenever the limit is nonzero so a ramp
/// always makes progress. Returns the new current value and whether the
/// target has been reached.
///
/// When `ramp` is false the setpoint jumps directly and is immediately
/// reported complete.
pub fn step_ramp(current: Tenths, target: Tenths, lim_br10: Tenths, ramp: bool) -> (Tenths, bool) {
    if !ramp || current == target {
        return (target, true);
    }

    let max_step = if lim_br10.get() == 0 {
        0
    } else {
        (lim_br10.get() / 10).max(1)
    };

    let next = if current < target {
        current + Tenths::new(max_step).min(target.saturating_sub(current))
    } else {
        current.saturating_sub(Tenths::new(max_step).min(current.saturating_sub(target)))
    };

    (next, next == target)
}
