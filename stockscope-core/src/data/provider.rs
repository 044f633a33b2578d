//! Quote feed trait and structured error types.
//!
//! The QuoteFeed trait abstracts over where daily bars come from (Alpha
//! Vantage over HTTP, a saved JSON response, a synthetic random walk) so the
//! pipeline can be driven the same way in production, offline and in tests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::feed::DailyFeed;
use crate::domain::Market;

/// Structured error types for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from quote feed for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("quote feed rejected request for {symbol}: {message}")]
    Rejected { symbol: String, message: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("failed to read feed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed configuration error: {0}")]
    Config(String),
}

/// Where a feed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    AlphaVantage,
    JsonFile,
    Synthetic,
}

/// Source of raw daily bars.
///
/// Implementations only fetch and decode the envelope. Validation belongs to
/// the normalizer.
pub trait QuoteFeed: Send + Sync {
    /// Human-readable name of this feed.
    fn name(&self) -> &str;

    fn source(&self) -> FeedSource;

    /// Fetch the daily series for `symbol` on `market`.
    fn fetch_daily(&self, symbol: &str, market: Market) -> Result<DailyFeed, FeedError>;
}

/// Turn a provider message envelope into an error; pass data through.
pub fn check_envelope(feed_symbol: &str, feed: DailyFeed) -> Result<DailyFeed, FeedError> {
    match feed.provider_message() {
        Some(message) if feed.series.is_none() => Err(FeedError::Rejected {
            symbol: feed_symbol.to_string(),
            message: message.to_string(),
        }),
        _ => Ok(feed),
    }
}

/// Feed backed by a saved `TIME_SERIES_DAILY` response on disk.
#[derive(Debug, Clone)]
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl QuoteFeed for JsonFileFeed {
    fn name(&self) -> &str {
        "json_file"
    }

    fn source(&self) -> FeedSource {
        FeedSource::JsonFile
    }

    fn fetch_daily(&self, symbol: &str, market: Market) -> Result<DailyFeed, FeedError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FeedError::Io {
            path: self.path.clone(),
            source,
        })?;
        let feed = DailyFeed::from_json(&content).map_err(|e| {
            FeedError::ResponseFormatChanged(format!("{}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), %symbol, %market, "loaded feed from file");
        check_envelope(&market.feed_symbol(symbol), feed)
    }
}
