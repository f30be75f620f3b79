use std::collections::VecDeque;

/// A fixed-window moving average (§3: "window = 20 samples").
///
/// Reports the arithmetic mean of the most recent `<= window` samples — the
/// testable property in §8.6.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    window: usize,
    samples: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "moving average window must be positive");
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push_back(sample);
        self.sum += sample;
        if self.samples.len() > self.window {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= oldest;
            }
        }
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_window_is_zero() {
        let avg = MovingAverage::new(20);
        assert_eq!(avg.mean(), 0.0);
    }

    #[test]
    fn mean_matches_arithmetic_mean_under_window() {
        let mut avg = MovingAverage::new(20);
        for sample in [1.0, 2.0, 3.0, 4.0] {
            avg.push(sample);
        }
        assert!((avg.mean() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn window_drops_oldest_sample() {
        let mut avg = MovingAverage::new(3);
        for sample in [10.0, 20.0, 30.0, 40.0] {
            avg.push(sample);
        }
        // only the most recent 3 (20, 30, 40) should count
        assert!((avg.mean() - 30.0).abs() < 1e-9);
        assert_eq!(avg.sample_count(), 3);
    }
}
