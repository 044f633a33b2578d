//! Raw daily-bar feed, exactly as the quote provider delivers it.
//!
//! The provider keys bars by date string and labels each field with an ordinal
//! prefix (`"1. open"`, `"4. close"`). Values usually arrive as JSON strings.
//! Nothing here is validated; that is the normalizer's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field value: either a JSON number or the string the feed sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric value, if the field parses as a number at all.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Labeled fields for one date.
pub type RawFields = BTreeMap<String, RawValue>;

/// Date string -> labeled fields.
pub type RawBars = BTreeMap<String, RawFields>;

/// Zone the provider stamps its daily dates in, for every market.
pub const PROVIDER_TIME_ZONE: &str = "US/Eastern";

/// Strip the ordinal prefix from a feed label: `"4. close"` -> `"close"`.
pub fn canonical_label(label: &str) -> &str {
    label
        .split_once(". ")
        .map(|(_, rest)| rest)
        .unwrap_or(label)
        .trim()
}

/// Envelope of a `TIME_SERIES_DAILY` response.
///
/// A missing `"Time Series (Daily)"` key means zero bars, not a failure.
/// Providers reject requests by answering with one of the message keys
/// instead of data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyFeed {
    #[serde(rename = "Meta Data", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    #[serde(rename = "Time Series (Daily)", default, skip_serializing_if = "Option::is_none")]
    pub series: Option<RawBars>,

    #[serde(rename = "Error Message", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(rename = "Note", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(rename = "Information", default, skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
}

impl DailyFeed {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Feed wrapping already-collected bars.
    pub fn with_bars(bars: RawBars) -> Self {
        Self {
            series: Some(bars),
            ..Self::default()
        }
    }

    /// The raw bars; an absent series key yields an empty map.
    pub fn bars(&self) -> RawBars {
        self.series.clone().unwrap_or_default()
    }

    /// Provider message that replaced the data, if any.
    pub fn provider_message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }

    /// Meta field looked up by canonical label (`"Time Zone"`, `"Symbol"`).
    pub fn meta_field(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| canonical_label(k).eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "IBM",
            "3. Last Refreshed": "2024-05-03",
            "4. Output Size": "Compact",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2024-05-03": {
                "1. open": "165.0000",
                "2. high": "166.6000",
                "3. low": "164.9200",
                "4. close": "165.7100",
                "5. volume": "3400418"
            }
        }
    }"#;

    #[test]
    fn parses_provider_envelope() {
        let feed = DailyFeed::from_json(SAMPLE).unwrap();
        assert_eq!(feed.meta_field("Time Zone"), Some("US/Eastern"));
        assert_eq!(feed.meta_field("symbol"), Some("IBM"));
        let bars = feed.bars();
        let day = &bars["2024-05-03"];
        assert_eq!(day["4. close"].as_f64(), Some(165.71));
        assert!(feed.provider_message().is_none());
    }

    #[test]
    fn absent_series_key_is_zero_bars() {
        let feed = DailyFeed::from_json(r#"{"Meta Data": {}}"#).unwrap();
        assert!(feed.bars().is_empty());
    }

    #[test]
    fn error_message_is_surfaced() {
        let feed =
            DailyFeed::from_json(r#"{"Error Message": "Invalid API call."}"#).unwrap();
        assert_eq!(feed.provider_message(), Some("Invalid API call."));
    }

    #[test]
    fn numbers_and_strings_both_parse() {
        assert_eq!(RawValue::from(3.5).as_f64(), Some(3.5));
        assert_eq!(RawValue::from(" 12 ").as_f64(), Some(12.0));
        assert_eq!(RawValue::from("abc").as_f64(), None);
    }

    #[test]
    fn label_prefix_is_stripped() {
        assert_eq!(canonical_label("1. open"), "open");
        assert_eq!(canonical_label("close"), "close");
        assert_eq!(canonical_label("5. volume "), "volume");
    }
}
