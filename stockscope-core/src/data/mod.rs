//! Feed ingestion and normalization

pub mod alpha_vantage;
pub mod feed;
pub mod normalize;
pub mod provider;
pub mod synthetic;
pub mod tz;

pub use alpha_vantage::{AlphaVantageFeed, AlphaVantageSettings, OutputSize};
pub use feed::{canonical_label, DailyFeed, RawBars, RawFields, RawValue, PROVIDER_TIME_ZONE};
pub use normalize::{normalize, time_zone, NormalizeError, REQUIRED_FIELDS};
pub use provider::{FeedError, FeedSource, JsonFileFeed, QuoteFeed};
pub use synthetic::SyntheticFeed;
