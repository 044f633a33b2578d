//! Fibonacci retracement levels over a trailing window of closes.
//!
//! Levels run from the window high down to the window low:
//! `level(r) = max - r * (max - min)`, so ratio 0 is the high and ratio 1 is
//! the low. A flat window puts every level at the same price.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::Series;

/// Retracement ratios, in ascending order.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Ratio the signal classifier compares against.
pub const MIDPOINT_RATIO: f64 = 0.5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RetracementError {
    #[error("insufficient data: retracement window over {lookback} is empty")]
    InsufficientData { lookback: Lookback },
}

/// How many trailing bars the retracement window spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    /// The last `n` bars (n ≥ 1), or the whole series if shorter.
    Bars(usize),
    /// The whole series.
    #[default]
    All,
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Bars(n) => write!(f, "last {n} bars"),
            Lookback::All => f.write_str("all bars"),
        }
    }
}

/// One ratio and its price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetracementLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Levels for every ratio in [`FIB_RATIOS`], in ratio order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetracementLevels {
    pub max: f64,
    pub min: f64,
    /// Number of bars the extremes were taken over.
    pub window_len: usize,
    pub levels: Vec<RetracementLevel>,
}

impl RetracementLevels {
    /// Price at an exact ratio from [`FIB_RATIOS`].
    pub fn level(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|l| l.ratio == ratio)
            .map(|l| l.price)
    }

    /// The 50% level.
    pub fn midpoint(&self) -> f64 {
        self.level(MIDPOINT_RATIO)
            .unwrap_or(self.max - MIDPOINT_RATIO * (self.max - self.min))
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetracementLevel> {
        self.levels.iter()
    }
}

/// Compute retracement levels from the min/max close of the trailing window.
pub fn compute_fibonacci_levels(
    series: &Series,
    lookback: Lookback,
) -> Result<RetracementLevels, RetracementError> {
    let window = match lookback {
        Lookback::Bars(n) => series.tail(n),
        Lookback::All => series.bars(),
    };

    if window.is_empty() {
        return Err(RetracementError::InsufficientData { lookback });
    }

    let (min, max) = window
        .iter()
        .map(|b| b.close)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });
    let diff = max - min;

    let levels = FIB_RATIOS
        .iter()
        .map(|&ratio| RetracementLevel {
            ratio,
            // Endpoints are exact.
            price: if ratio == 0.0 {
                max
            } else if ratio == 1.0 {
                min
            } else {
                max - ratio * diff
            },
        })
        .collect();

    Ok(RetracementLevels {
        max,
        min,
        window_len: window.len(),
        levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};
    use chrono_tz::Tz;

    #[test]
    fn ten_bar_window_levels() {
        let closes: Vec<f64> = (100..110).map(f64::from).collect();
        let levels = compute_fibonacci_levels(&make_series(&closes), Lookback::All).unwrap();
        assert_eq!(levels.max, 109.0);
        assert_eq!(levels.min, 100.0);
        assert_eq!(levels.midpoint(), 104.5);
        assert_eq!(levels.level(0.0), Some(109.0));
        assert_eq!(levels.level(1.0), Some(100.0));
        assert_approx(levels.level(0.236).unwrap(), 109.0 - 0.236 * 9.0, DEFAULT_EPSILON);
        assert_eq!(levels.levels.len(), FIB_RATIOS.len());
    }

    #[test]
    fn flat_window_collapses_to_one_price() {
        let levels = compute_fibonacci_levels(&make_series(&[50.0; 5]), Lookback::All).unwrap();
        assert!(levels.iter().all(|l| l.price == 50.0));
        assert_eq!(levels.range(), 0.0);
    }

    #[test]
    fn lookback_limits_window() {
        let series = make_series(&[10.0, 200.0, 5.0, 20.0, 30.0]);
        let levels = compute_fibonacci_levels(&series, Lookback::Bars(2)).unwrap();
        assert_eq!((levels.min, levels.max), (20.0, 30.0));
        assert_eq!(levels.window_len, 2);
    }

    #[test]
    fn lookback_longer_than_series_uses_everything() {
        let series = make_series(&[10.0, 200.0, 5.0]);
        let levels = compute_fibonacci_levels(&series, Lookback::Bars(500)).unwrap();
        assert_eq!((levels.min, levels.max), (5.0, 200.0));
        assert_eq!(levels.window_len, 3);
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = compute_fibonacci_levels(&Series::empty(Tz::UTC), Lookback::All).unwrap_err();
        assert_eq!(
            err,
            RetracementError::InsufficientData {
                lookback: Lookback::All
            }
        );
    }

    #[test]
    fn zero_bar_lookback_is_insufficient() {
        let series = make_series(&[1.0, 2.0]);
        assert!(compute_fibonacci_levels(&series, Lookback::Bars(0)).is_err());
    }

    #[test]
    fn levels_descend_with_ratio() {
        let series = make_series(&[3.0, 9.0, 1.0, 4.0]);
        let levels = compute_fibonacci_levels(&series, Lookback::All).unwrap();
        for pair in levels.levels.windows(2) {
            assert!(pair[0].price > pair[1].price);
        }
    }
}
