//! Trade signal classification.
//!
//! Signals are recomputed per request from the series and its indicators.
//! They carry no state between requests.

pub mod classifier;

pub use classifier::{classify, evaluate, SignalBasis, SignalEvaluation};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trade recommendation for the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        })
    }
}
