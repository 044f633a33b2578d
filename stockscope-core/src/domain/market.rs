//! Market routing: how a ticker is spelled for the quote feed on each exchange.
//!
//! The mapping lives in one static table. Call sites ask the table instead of
//! branching on the market themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exchanges the quote feed can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    Bse,
    Nse,
    Nasdaq,
    Nyse,
}

/// Static routing entry for one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSpec {
    pub market: Market,
    pub name: &'static str,
    /// Suffix appended as `SYMBOL.SUFFIX`; `None` sends the bare symbol.
    pub symbol_suffix: Option<&'static str>,
    /// IANA zone of the exchange session.
    pub home_time_zone: &'static str,
}

const MARKETS: [MarketSpec; 4] = [
    MarketSpec {
        market: Market::Bse,
        name: "BSE",
        symbol_suffix: Some("BSE"),
        home_time_zone: "Asia/Kolkata",
    },
    MarketSpec {
        market: Market::Nse,
        name: "NSE",
        symbol_suffix: Some("NSE"),
        home_time_zone: "Asia/Kolkata",
    },
    MarketSpec {
        market: Market::Nasdaq,
        name: "NASDAQ",
        symbol_suffix: None,
        home_time_zone: "America/New_York",
    },
    MarketSpec {
        market: Market::Nyse,
        name: "NYSE",
        symbol_suffix: None,
        home_time_zone: "America/New_York",
    },
];

#[derive(Debug, Error, PartialEq)]
#[error("unknown market '{0}' (expected one of: BSE, NSE, NASDAQ, NYSE)")]
pub struct UnknownMarket(pub String);

impl Market {
    /// Every routing entry, in table order.
    pub fn all() -> &'static [MarketSpec] {
        &MARKETS
    }

    pub fn spec(self) -> &'static MarketSpec {
        MARKETS
            .iter()
            .find(|s| s.market == self)
            .unwrap_or(&MARKETS[0])
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Ticker as the quote feed expects it, e.g. `RELIANCE` on BSE -> `RELIANCE.BSE`.
    pub fn feed_symbol(self, symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        match self.spec().symbol_suffix {
            Some(suffix) => format!("{symbol}.{suffix}"),
            None => symbol,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Market {
    type Err = UnknownMarket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MARKETS
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(wanted))
            .map(|spec| spec.market)
            .ok_or_else(|| UnknownMarket(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nasdaq_uses_bare_symbol() {
        assert_eq!(Market::Nasdaq.feed_symbol("aapl"), "AAPL");
    }

    #[test]
    fn bse_appends_suffix() {
        assert_eq!(Market::Bse.feed_symbol("RELIANCE"), "RELIANCE.BSE");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("nse".parse::<Market>().unwrap(), Market::Nse);
        assert_eq!(" NASDAQ ".parse::<Market>().unwrap(), Market::Nasdaq);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "LSE".parse::<Market>().unwrap_err(),
            UnknownMarket("LSE".into())
        );
    }

    #[test]
    fn every_market_has_its_own_entry() {
        for spec in Market::all() {
            assert_eq!(spec.market.spec(), spec);
            assert_eq!(spec.market.to_string(), spec.name);
        }
    }
}
