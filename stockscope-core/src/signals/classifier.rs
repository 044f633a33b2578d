//! Latest-bar classification against the two longest moving averages and the
//! 50% retracement level.
//!
//! BUY needs the close strictly above both long averages and the midpoint;
//! SELL needs it strictly below all three. Anything else, including missing
//! history, is HOLD.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Signal;
use crate::domain::Series;
use crate::indicators::{IndicatorSet, RetracementLevels};

/// Why a classification came out as it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBasis {
    /// Close above both long averages and the midpoint.
    AboveAll,
    /// Close below both long averages and the midpoint.
    BelowAll,
    /// Inputs were defined but disagreed (or tied).
    Mixed,
    /// The series has no bars.
    EmptySeries,
    /// Fewer than two moving-average windows were configured.
    TooFewWindows,
    /// A long window has not filled at the last bar.
    InsufficientHistory,
    /// The indicators were computed over a different number of bars.
    MisalignedIndicators,
}

/// Classification plus the inputs it was decided on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub signal: Signal,
    pub basis: SignalBasis,
    pub latest_close: Option<f64>,
    /// `(window, value)` of the longest and second-longest averages.
    pub long_averages: Vec<(usize, Option<f64>)>,
    pub midpoint: f64,
}

/// Classify the latest bar.
pub fn classify(series: &Series, indicators: &IndicatorSet, levels: &RetracementLevels) -> Signal {
    evaluate(series, indicators, levels).signal
}

/// Classify the latest bar and report the inputs used.
pub fn evaluate(
    series: &Series,
    indicators: &IndicatorSet,
    levels: &RetracementLevels,
) -> SignalEvaluation {
    let midpoint = levels.midpoint();
    let hold = |basis, latest_close, long_averages| SignalEvaluation {
        signal: Signal::Hold,
        basis,
        latest_close,
        long_averages,
        midpoint,
    };

    let Some(last) = series.last() else {
        return hold(SignalBasis::EmptySeries, None, Vec::new());
    };
    let close = last.close;
    if indicators.series_len() != series.len() {
        warn!(
            bars = series.len(),
            indicator_bars = indicators.series_len(),
            "indicators do not line up with the series"
        );
        return hold(SignalBasis::MisalignedIndicators, Some(close), Vec::new());
    }
    let index = series.len() - 1;

    let Some((longest, second)) = indicators.longest_two() else {
        let configured = indicators
            .windows()
            .into_iter()
            .map(|w| (w, indicators.get(w, index)))
            .collect();
        return hold(SignalBasis::TooFewWindows, Some(close), configured);
    };

    let long_ma = indicators.get(longest, index);
    let second_ma = indicators.get(second, index);
    let long_averages = vec![(longest, long_ma), (second, second_ma)];

    let (Some(long_ma), Some(second_ma)) = (long_ma, second_ma) else {
        debug!(longest, second, bars = series.len(), "long averages not yet defined");
        return hold(SignalBasis::InsufficientHistory, Some(close), long_averages);
    };

    let (signal, basis) = if close > long_ma && close > second_ma && close > midpoint {
        (Signal::Buy, SignalBasis::AboveAll)
    } else if close < long_ma && close < second_ma && close < midpoint {
        (Signal::Sell, SignalBasis::BelowAll)
    } else {
        (Signal::Hold, SignalBasis::Mixed)
    };

    SignalEvaluation {
        signal,
        basis,
        latest_close: Some(close),
        long_averages,
        midpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{
        compute_fibonacci_levels, compute_moving_averages, make_series, Lookback,
    };

    fn run(closes: &[f64], windows: &[usize]) -> SignalEvaluation {
        let series = make_series(closes);
        let set = compute_moving_averages(&series, windows).unwrap();
        let levels = compute_fibonacci_levels(&series, Lookback::All).unwrap();
        evaluate(&series, &set, &levels)
    }

    #[test]
    fn single_window_holds() {
        let closes: Vec<f64> = (100..110).map(f64::from).collect();
        let eval = run(&closes, &[7]);
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.basis, SignalBasis::TooFewWindows);
    }

    #[test]
    fn indicators_from_another_series_hold() {
        let long: Vec<f64> = (1..=300).map(f64::from).collect();
        let series = make_series(&long);
        let levels = compute_fibonacci_levels(&series, Lookback::All).unwrap();
        let shorter = compute_moving_averages(&make_series(&long[..250]), &[7, 200]).unwrap();

        let eval = evaluate(&series, &shorter, &levels);
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.basis, SignalBasis::MisalignedIndicators);
        assert_eq!(eval.latest_close, Some(300.0));

        let aligned = compute_moving_averages(&series, &[7, 200]).unwrap();
        assert_eq!(evaluate(&series, &aligned, &levels).signal, Signal::Buy);
    }

    #[test]
    fn short_history_holds_even_when_rising() {
        let closes: Vec<f64> = (1..=50).map(f64::from).collect();
        let eval = run(&closes, &[7, 20, 100, 200]);
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.basis, SignalBasis::InsufficientHistory);
        assert_eq!(eval.long_averages, vec![(200, None), (100, None)]);
    }

    #[test]
    fn uptrend_buys() {
        // Mostly flat then a rally: close ends above both averages and the midpoint.
        let mut closes = vec![100.0; 20];
        closes.extend((1..=5).map(|i| 100.0 + 10.0 * f64::from(i)));
        let eval = run(&closes, &[5, 10]);
        assert_eq!(eval.signal, Signal::Buy);
        assert_eq!(eval.basis, SignalBasis::AboveAll);
    }

    #[test]
    fn downtrend_sells() {
        let mut closes = vec![100.0; 20];
        closes.extend((1..=5).map(|i| 100.0 - 10.0 * f64::from(i)));
        let eval = run(&closes, &[5, 10]);
        assert_eq!(eval.signal, Signal::Sell);
    }

    #[test]
    fn flat_series_holds_on_ties() {
        let eval = run(&[50.0; 5], &[2, 3]);
        assert_eq!(eval.signal, Signal::Hold);
        assert_eq!(eval.basis, SignalBasis::Mixed);
    }

    #[test]
    fn above_averages_but_below_midpoint_holds() {
        // Crash then partial recovery: close above short averages, below 50% of range.
        let mut closes = vec![200.0; 5];
        closes.extend([100.0, 100.0, 100.0, 100.0, 120.0]);
        let eval = run(&closes, &[2, 3]);
        assert!(eval.latest_close.unwrap() < eval.midpoint);
        assert_eq!(eval.signal, Signal::Hold);
    }

    #[test]
    fn classify_matches_evaluate() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let set = compute_moving_averages(&series, &[2, 3]).unwrap();
        let levels = compute_fibonacci_levels(&series, Lookback::All).unwrap();
        assert_eq!(
            classify(&series, &set, &levels),
            evaluate(&series, &set, &levels).signal
        );
    }
}
