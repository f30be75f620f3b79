//! Automatic SCRAM evaluation (§4.4.4).

use scada_types::{AscramReason, MatrixSnapshot};

/// Evaluates the automatic SCRAM condition for one tick.
///
/// `current_reason` carries the latch's hysteresis: once `MatrixFill` has
/// latched it only clears when fill drops to `<= 0.95`, even though the
/// trip threshold itself is `>= 1.0`.
pub fn evaluate_ascram(
    current_reason: AscramReason,
    matrix: Option<&MatrixSnapshot>,
    any_critical_alarm: bool,
) -> AscramReason {
    let Some(matrix) = matrix else {
        return AscramReason::MatrixDc;
    };

    let fill = matrix.fill_fraction();
    if fill >= 1.0 || (current_reason == AscramReason::MatrixFill && fill > 0.95) {
        return AscramReason::MatrixFill;
    }

    if any_critical_alarm {
        return AscramReason::CritAlarm;
    }

    AscramReason::None
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn absent_matrix_is_matrix_dc() {
        assert_eq!(evaluate_ascram(AscramReason::None, None, false), AscramReason::MatrixDc);
    }

    #[test]
    fn fill_crossing_one_latches() {
        assert_eq!(
            evaluate_ascram(AscramReason::None, Some(&matrix(1.0)), false),
            AscramReason::MatrixFill
        );
    }

    #[test]
    fn hysteresis_holds_latch_between_095_and_100() {
        assert_eq!(
            evaluate_ascram(AscramReason::MatrixFill, Some(&matrix(0.97)), false),
            AscramReason::MatrixFill
        );
    }

    #[test]
    fn hysteresis_clears_at_or_below_095() {
        assert_eq!(
            evaluate_ascram(AscramReason::MatrixFill, Some(&matrix(0.94)), false),
            AscramReason::None
        );
    }

    #[test]
    fn critical_alarm_trips_when_matrix_healthy() {
        assert_eq!(
            evaluate_ascram(AscramReason::None, Some(&matrix(0.5)), true),
            AscramReason::CritAlarm
        );
    }

    #[test]
    fn matrix_fill_takes_priority_over_critical_alarm() {
        assert_eq!(
            evaluate_ascram(AscramReason::None, Some(&matrix(1.0)), true),
            AscramReason::MatrixFill
        );
    }
}
