//! Series: time-ordered bars for one security in one time zone.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use thiserror::Error;

use super::bar::{Bar, KEY_FORMAT};

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: String, next: String },
}

/// Bars sorted strictly ascending by date, expressed in `time_zone`.
///
/// Gaps between trading days are tolerated; the feed decides the density.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
    time_zone: Tz,
}

impl Series {
    /// Empty series in the given time zone.
    pub fn empty(time_zone: Tz) -> Self {
        Self {
            bars: Vec::new(),
            time_zone,
        }
    }

    /// Build a series from bars that are already in ascending date order.
    pub fn from_bars(bars: Vec<Bar>, time_zone: Tz) -> Result<Self, SeriesError> {
        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(SeriesError::NotIncreasing {
                previous: pair[0].key(),
                next: pair[1].key(),
            });
        }
        Ok(Self { bars, time_zone })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices, index-aligned with the bars.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bar dates, index-aligned with the bars.
    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// The trailing `n` bars (the whole series if it is shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Sortable keys of the first and last bar, if any.
    pub fn span_keys(&self) -> Option<(String, String)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((
                first.date.format(KEY_FORMAT).to_string(),
                last.date.format(KEY_FORMAT).to_string(),
            )),
            _ => None,
        }
    }
}
