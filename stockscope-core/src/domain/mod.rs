//! Domain types for StockScope

pub mod bar;
pub mod market;
pub mod series;

pub use bar::{Bar, KEY_FORMAT};
pub use market::{Market, MarketSpec, UnknownMarket};
pub use series::{Series, SeriesError};
