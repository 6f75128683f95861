//! Relative strength momentum
//!
//! Wilder-smoothed average gain and loss of the midpoint, rescaled from the
//! usual 0..100 range to [-1, 1].

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    last_price: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    samples: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            last_price: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            samples: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Classic 0..100 reading
    pub fn rsi(&self) -> f64 {
        50.0 * (self.value() + 1.0)
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Input = f64;

    fn step(&mut self, price: f64) {
        if !price.is_finite() {
            return;
        }
        let Some(last) = self.last_price.replace(price) else {
            return;
        };

        let change = price - last;
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };

        self.samples += 1;
        // simple average until the window fills, then Wilder smoothing
        let n = self.samples.min(self.window) as f64;
        self.avg_gain += (gain - self.avg_gain) / n;
        self.avg_loss += (loss - self.avg_loss) / n;
    }

    fn value(&self) -> f64 {
        let total = self.avg_gain + self.avg_loss;
        if total <= f64::EPSILON {
            return 0.0;
        }
        ((self.avg_gain - self.avg_loss) / total).clamp(-1.0, 1.0)
    }

    fn reset(&mut self) {
        self.last_price = None;
        self.avg_gain = 0.0;
        self.avg_loss = 0.0;
        self.samples = 0;
    }

    fn lag(&self) -> usize {
        self.window.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_saturates() {
        assert_eq!(Rsi::new(14).lag(), 15);
        assert_eq!(Rsi::new(usize::MAX).lag(), usize::MAX);
    }

    #[test]
    fn test_flat_prices_are_neutral() {
        let mut rsi = Rsi::new(5);
        for _ in 0..10 {
            rsi.step(100.0);
        }
        assert_eq!(rsi.value(), 0.0);
        assert_eq!(rsi.rsi(), 50.0);
    }

    #[test]
    fn test_rising_prices_saturate_high() {
        let mut rsi = Rsi::new(5);
        for i in 0..10 {
            rsi.step(100.0 + i as f64);
        }
        assert_eq!(rsi.value(), 1.0);
        assert_eq!(rsi.rsi(), 100.0);
    }

    #[test]
    fn test_falling_prices_saturate_low() {
        let mut rsi = Rsi::new(5);
        for i in 0..10 {
            rsi.step(100.0 - i as f64);
        }
        assert_eq!(rsi.value(), -1.0);
    }

    #[test]
    fn test_balanced_moves() {
        let mut rsi = Rsi::new(4);
        for price in [100.0, 101.0, 100.0, 101.0, 100.0] {
            rsi.step(price);
        }
        assert!(rsi.value().abs() < 1e-12);
    }

    #[test]
    fn test_reset_forgets_last_price() {
        let mut rsi = Rsi::new(5);
        rsi.step(100.0);
        rsi.step(105.0);
        rsi.reset();
        rsi.step(50.0);
        assert_eq!(rsi.value(), 0.0);
    }
}
