//! Alpha Vantage daily quote feed.
//!
//! Calls `TIME_SERIES_DAILY` with the market-routed symbol. Transient failures
//! (connection errors, timeouts, 5xx) are retried with exponential backoff;
//! a provider message in place of data is returned as `FeedError::Rejected`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::feed::DailyFeed;
use super::provider::{check_envelope, FeedError, FeedSource, QuoteFeed};
use crate::domain::Market;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Upper bound on a single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How much history the provider returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// Latest 100 bars.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    fn as_param(self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlphaVantageSettings {
    pub api_key: String,
    pub base_url: String,
    pub output_size: OutputSize,
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl AlphaVantageSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_size: OutputSize::Compact,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Alpha Vantage quote feed.
pub struct AlphaVantageFeed {
    client: reqwest::blocking::Client,
    settings: AlphaVantageSettings,
}

impl AlphaVantageFeed {
    pub fn new(settings: AlphaVantageSettings) -> Result<Self, FeedError> {
        if settings.api_key.trim().is_empty() {
            return Err(FeedError::Config("Alpha Vantage API key is empty".into()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FeedError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn query_params<'a>(&'a self, feed_symbol: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", feed_symbol),
            ("outputsize", self.settings.output_size.as_param()),
            ("apikey", self.settings.api_key.as_str()),
        ]
    }

    fn fetch_with_retry(&self, feed_symbol: &str) -> Result<DailyFeed, FeedError> {
        let mut last_error = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                std::thread::sleep(backoff_delay(self.settings.base_delay, attempt));
            }

            let response = self
                .client
                .get(&self.settings.base_url)
                .query(&self.query_params(feed_symbol))
                .send();

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_server_error() {
                        warn!(%status, attempt, symbol = feed_symbol, "quote feed server error");
                        last_error = Some(FeedError::Http {
                            status: status.as_u16(),
                            symbol: feed_symbol.to_string(),
                        });
                        continue;
                    }
                    if !status.is_success() {
                        return Err(FeedError::Http {
                            status: status.as_u16(),
                            symbol: feed_symbol.to_string(),
                        });
                    }

                    let feed: DailyFeed = resp.json().map_err(|e| {
                        FeedError::ResponseFormatChanged(format!(
                            "failed to parse response for {feed_symbol}: {e}"
                        ))
                    })?;
                    return check_envelope(feed_symbol, feed);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(error = %e, attempt, symbol = feed_symbol, "quote feed unreachable");
                    last_error = Some(FeedError::NetworkUnreachable(e.to_string()));
                }
                Err(e) => return Err(FeedError::NetworkUnreachable(e.to_string())),
            }
        }

        Err(last_error
            .unwrap_or_else(|| FeedError::NetworkUnreachable("max retries exceeded".into())))
    }
}

/// `base * 2^(attempt - 1)`, saturating and capped at [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(MAX_BACKOFF).min(MAX_BACKOFF)
}

impl QuoteFeed for AlphaVantageFeed {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn source(&self) -> FeedSource {
        FeedSource::AlphaVantage
    }

    fn fetch_daily(&self, symbol: &str, market: Market) -> Result<DailyFeed, FeedError> {
        let feed_symbol = market.feed_symbol(symbol);
        info!(symbol = %feed_symbol, %market, "fetching daily series");
        self.fetch_with_retry(&feed_symbol)
    }
}
