//! StockScope Core: bars, feed normalization, indicators, signals.
//!
//! This crate contains the analysis chain that every request runs through:
//! - Domain types (bars, series, market routing)
//! - Quote feed envelope, providers, and time-zone normalization
//! - Moving averages over an arbitrary set of windows
//! - Fibonacci retracement levels over a trailing window
//! - BUY / SELL / HOLD classification of the latest bar
//!
//! Everything here is a pure function of its inputs except the HTTP and file
//! feeds, which sit at the edge and are never called by the chain itself.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;

pub use data::{normalize, DailyFeed, NormalizeError, QuoteFeed, RawBars};
pub use domain::{Bar, Market, Series};
pub use indicators::{
    compute_fibonacci_levels, compute_moving_averages, IndicatorSet, Lookback, RetracementError,
    RetracementLevels,
};
pub use signals::{classify, Signal};
