use serde::{Deserialize, Serialize};

/// A single reading of induction-matrix telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    /// Whether the multiblock structure is currently formed.
    pub formed: bool,
    /// Stored energy, J.
    pub energy: f64,
    /// Maximum storable energy, J.
    pub max_energy: f64,
    /// Last-tick input rate, J/t.
    pub input_rate: f64,
    /// Last-tick output rate, J/t.
    pub output_rate: f64,
}

impl MatrixSnapshot {
    /// Energy divided by max energy, or `0.0` if the matrix is absent/unformed.
    pub fn fill_fraction(&self) -> f64 {
        if !self.formed || self.max_energy <= 0.0 {
            return 0.0;
        }
        (self.energy / self.max_energy).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unformed_matrix_has_zero_fill() {
        let snap = MatrixSnapshot {
            formed: false,
            energy: 1000.0,
            max_energy: 1000.0,
            input_rate: 0.0,
            output_rate: 0.0,
        };
        assert_eq!(snap.fill_fraction(), 0.0);
    }

    #[test]
    fn fill_fraction_clamped() {
        let snap = MatrixSnapshot {
            formed: true,
            energy: 2000.0,
            max_energy: 1000.0,
            input_rate: 0.0,
            output_rate: 0.0,
        };
        assert_eq!(snap.fill_fraction(), 1.0);
    }
}
