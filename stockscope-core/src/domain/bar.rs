//! Bar: the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the sortable key produced by [`Bar::key`].
pub const KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// OHLCV bar for a single trading day.
///
/// `date` is the wall-clock time of the bar in the series' time zone, after
/// conversion from the feed's exchange time zone. Bars are immutable once
/// built by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Stable, lexicographically sortable key (`YYYY-MM-DD HH:MM:SS`).
    pub fn key(&self) -> String {
        self.date.format(KEY_FORMAT).to_string()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    ///
    /// Feeds occasionally ship bars that violate this; the normalizer keeps
    /// them (only non-numeric fields are rejected) and logs a warning.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}
