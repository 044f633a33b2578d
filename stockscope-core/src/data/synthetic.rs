//! Seeded random-walk feed for offline runs and demos.
//!
//! Produces the same envelope shape as the real provider (prefixed labels,
//! string values) so it travels through the normalizer unchanged.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::feed::{DailyFeed, RawBars, RawFields, RawValue, PROVIDER_TIME_ZONE};
use super::provider::{FeedError, FeedSource, QuoteFeed};
use crate::domain::Market;

#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    pub seed: u64,
    /// Number of weekday bars to produce.
    pub days: usize,
    /// Last calendar day of the series (inclusive, if it is a weekday).
    pub end: NaiveDate,
    pub start_price: f64,
}

impl SyntheticFeed {
    pub fn new(seed: u64, days: usize, end: NaiveDate) -> Self {
        Self {
            seed,
            days,
            end,
            start_price: 100.0,
        }
    }

    /// Weekday dates ending at `end`, oldest first.
    fn trading_days(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.days);
        let mut current = self.end;
        while dates.len() < self.days {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(current);
            }
            current -= Duration::days(1);
        }
        dates.reverse();
        dates
    }

    pub fn generate(&self) -> DailyFeed {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut price = self.start_price;
        let mut bars = RawBars::new();

        for date in self.trading_days() {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            let fields: RawFields = [
                ("1. open", format!("{open:.4}")),
                ("2. high", format!("{high:.4}")),
                ("3. low", format!("{low:.4}")),
                ("4. close", format!("{close:.4}")),
                ("5. volume", volume.to_string()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), RawValue::Text(v)))
            .collect();

            bars.insert(date.format("%Y-%m-%d").to_string(), fields);
            price = close;
        }

        DailyFeed::with_bars(bars)
    }
}

impl QuoteFeed for SyntheticFeed {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> FeedSource {
        FeedSource::Synthetic
    }

    fn fetch_daily(&self, symbol: &str, market: Market) -> Result<DailyFeed, FeedError> {
        let mut feed = self.generate();
        feed.meta
            .insert("2. Symbol".into(), market.feed_symbol(symbol));
        // Same stamp the HTTP provider puts on every market.
        feed.meta
            .insert("5. Time Zone".into(), PROVIDER_TIME_ZONE.into());
        Ok(feed)
    }
}
