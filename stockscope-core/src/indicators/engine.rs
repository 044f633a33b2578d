//! Moving-average engine and the `IndicatorSet` it produces.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

use super::sma::Sma;
use super::{Indicator, IndicatorError};
use crate::domain::Series;

/// Moving averages keyed by window length, each aligned index-for-index with
/// the series it was computed from. Positions before a window fills hold NaN;
/// accessors report them as `None`, and serialization writes them as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    series_len: usize,
    #[serde(
        serialize_with = "serialize_columns",
        deserialize_with = "deserialize_columns"
    )]
    averages: BTreeMap<usize, Vec<f64>>,
}

impl IndicatorSet {
    /// Configured window lengths, ascending.
    pub fn windows(&self) -> Vec<usize> {
        self.averages.keys().copied().collect()
    }

    /// Length of the series the values are aligned with.
    pub fn series_len(&self) -> usize {
        self.series_len
    }

    /// True when there are no values at all (empty series).
    pub fn is_empty(&self) -> bool {
        self.series_len == 0
    }

    /// Full value column for a window, NaN where undefined.
    pub fn values(&self, window: usize) -> Option<&[f64]> {
        self.averages.get(&window).map(|v| v.as_slice())
    }

    /// Defined value of window `window` at bar `index`.
    pub fn get(&self, window: usize, index: usize) -> Option<f64> {
        self.averages
            .get(&window)
            .and_then(|v| v.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Value at the last bar.
    pub fn latest(&self, window: usize) -> Option<f64> {
        self.series_len
            .checked_sub(1)
            .and_then(|last| self.get(window, last))
    }

    /// Last value of every window, `None` where the window never filled.
    pub fn tail(&self) -> BTreeMap<usize, Option<f64>> {
        self.averages
            .keys()
            .map(|&w| (w, self.latest(w)))
            .collect()
    }

    /// The two longest configured windows, longest first.
    pub fn longest_two(&self) -> Option<(usize, usize)> {
        let mut it = self.averages.keys().rev();
        match (it.next(), it.next()) {
            (Some(&longest), Some(&second)) => Some((longest, second)),
            _ => None,
        }
    }
}

// ── NaN warmup cells as `null` ───────────────────────────────────────

type Columns = BTreeMap<usize, Vec<Option<f64>>>;

fn serialize_columns<S: Serializer>(
    averages: &BTreeMap<usize, Vec<f64>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    let columns: Columns = averages
        .iter()
        .map(|(&w, values)| (w, values.iter().map(|v| (!v.is_nan()).then_some(*v)).collect()))
        .collect();
    columns.serialize(s)
}

fn deserialize_columns<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<usize, Vec<f64>>, D::Error> {
    let columns = Columns::deserialize(d)?;
    Ok(columns
        .into_iter()
        .map(|(w, values)| (w, values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()))
        .collect())
}

/// Compute one simple moving average per window over the series closes.
///
/// Each window is a single O(n) pass. An empty series yields a set with every
/// window present and no values.
pub fn compute_moving_averages(
    series: &Series,
    windows: &[usize],
) -> Result<IndicatorSet, IndicatorError> {
    let mut averages = BTreeMap::new();
    for &window in windows {
        let sma = Sma::new(window)?;
        averages.insert(window, sma.compute(series.bars()));
    }

    debug!(
        bars = series.len(),
        windows = ?averages.keys().collect::<Vec<_>>(),
        "computed moving averages"
    );

    Ok(IndicatorSet {
        series_len: series.len(),
        averages,
    })
}
