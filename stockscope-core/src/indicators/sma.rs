//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::ZeroWindow);
        }
        Ok(Self {
            period,
            name: format!("ma_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    /// Single pass with a running sum. NaN closes are kept out of the sum and
    /// counted instead, so any window containing one yields NaN without a
    /// rescan.
    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        let mut sum = 0.0;
        let mut nan_in_window = 0usize;

        for i in 0..n {
            let entering = bars[i].close;
            if entering.is_nan() {
                nan_in_window += 1;
            } else {
                sum += entering;
            }

            if i >= self.period {
                let leaving = bars[i - self.period].close;
                if leaving.is_nan() {
                    nan_in_window -= 1;
                } else {
                    sum -= leaving;
                }
            }

            if i + 1 >= self.period && nan_in_window == 0 {
                result[i] = sum / self.period as f64;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let sma = Sma::new(5).unwrap();
        let result = sma.compute(&bars);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1).unwrap().compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_propagation() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].close = f64::NAN;
        let result = Sma::new(3).unwrap().compute(&bars);
        // Index 2 window [10,11,NaN] → NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // Index 5 window [13,14,15] → 14.0
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback_and_name() {
        let sma = Sma::new(20).unwrap();
        assert_eq!(sma.lookback(), 19);
        assert_eq!(sma.name(), "ma_20");
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn sma_zero_period_rejected() {
        assert_eq!(Sma::new(0).unwrap_err(), IndicatorError::ZeroWindow);
    }

    #[test]
    fn sma_too_few_bars() {
        let bars = make_bars(&[10.0, 11.0]);
        let result = Sma::new(5).unwrap().compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
