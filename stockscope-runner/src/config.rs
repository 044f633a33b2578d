//! Serializable analysis configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) yields the standard setup: windows 7/20/100/200 over the whole
//! series, US/Eastern feed dates shown in Asia/Kolkata.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use stockscope_core::data::tz::parse_time_zone;
use stockscope_core::data::{AlphaVantageSettings, OutputSize, PROVIDER_TIME_ZONE};
use stockscope_core::indicators::Lookback;

/// Highest accepted `feed.max_retries`.
pub const MAX_FEED_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Moving-average windows, in bars.
    pub windows: Vec<usize>,

    /// Retracement window: an integer bar count or `"all"`.
    #[serde(
        serialize_with = "serialize_lookback",
        deserialize_with = "deserialize_lookback"
    )]
    pub lookback: Lookback,

    /// Zone the feed's dates are stamped in.
    pub source_time_zone: String,

    /// Zone the series is expressed in.
    pub target_time_zone: String,

    /// Directory chart and report artifacts go under.
    pub output_dir: PathBuf,

    pub chart: ChartConfig,

    pub feed: FeedConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            windows: vec![7, 20, 100, 200],
            lookback: Lookback::All,
            source_time_zone: PROVIDER_TIME_ZONE.into(),
            target_time_zone: "Asia/Kolkata".into(),
            output_dir: PathBuf::from("output"),
            chart: ChartConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

/// Chart image geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1000,
        }
    }
}

/// HTTP quote feed settings. The API key is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub base_url: String,
    pub output_size: OutputSize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: stockscope_core::data::alpha_vantage::DEFAULT_BASE_URL.into(),
            output_size: OutputSize::Compact,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl FeedConfig {
    /// Provider settings for the given key.
    pub fn alpha_vantage(&self, api_key: impl Into<String>) -> AlphaVantageSettings {
        AlphaVantageSettings {
            base_url: self.base_url.clone(),
            output_size: self.output_size,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..AlphaVantageSettings::new(api_key)
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.is_empty() {
            return Err(ConfigError::Invalid("windows must not be empty".into()));
        }
        if self.windows.contains(&0) {
            return Err(ConfigError::Invalid("windows must be at least 1 bar".into()));
        }
        if self.lookback == Lookback::Bars(0) {
            return Err(ConfigError::Invalid("lookback must be at least 1 bar".into()));
        }
        for name in [&self.source_time_zone, &self.target_time_zone] {
            if parse_time_zone(name).is_none() {
                return Err(ConfigError::Invalid(format!("unknown time zone '{name}'")));
            }
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "chart dimensions must be positive, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed.timeout_secs must be positive".into()));
        }
        if self.feed.max_retries > MAX_FEED_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "feed.max_retries must be at most {MAX_FEED_RETRIES}, got {}",
                self.feed.max_retries
            )));
        }
        Ok(())
    }

    /// Windows sorted ascending with duplicates removed.
    pub fn normalized_windows(&self) -> Vec<usize> {
        let mut windows = self.windows.clone();
        windows.sort_unstable();
        windows.dedup();
        windows
    }
}

// ── lookback as `"all"` or an integer ────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LookbackSetting {
    Bars(usize),
    Keyword(String),
}

fn serialize_lookback<S: Serializer>(lookback: &Lookback, s: S) -> Result<S::Ok, S::Error> {
    match lookback {
        Lookback::Bars(n) => LookbackSetting::Bars(*n),
        Lookback::All => LookbackSetting::Keyword("all".into()),
    }
    .serialize(s)
}

fn deserialize_lookback<'de, D: Deserializer<'de>>(d: D) -> Result<Lookback, D::Error> {
    match LookbackSetting::deserialize(d)? {
        LookbackSetting::Bars(n) => Ok(Lookback::Bars(n)),
        LookbackSetting::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(Lookback::All),
        LookbackSetting::Keyword(k) => Err(serde::de::Error::custom(format!(
            "lookback must be \"all\" or a bar count, got \"{k}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.windows, vec![7, 20, 100, 200]);
        assert_eq!(config.chart.width, 1600);
    }

    #[test]
    fn parses_full_document() {
        let config = AnalysisConfig::from_toml(
            r#"
            windows = [200, 50, 50]
            lookback = 120
            source_time_zone = "America/New_York"
            target_time_zone = "UTC"
            output_dir = "charts"

            [chart]
            width = 800
            height = 600

            [feed]
            output_size = "full"
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.lookback, Lookback::Bars(120));
        assert_eq!(config.normalized_windows(), vec![50, 200]);
        assert_eq!(config.chart, ChartConfig { width: 800, height: 600 });
        assert_eq!(config.feed.output_size, OutputSize::Full);
        assert_eq!(config.feed.timeout_secs, 30);
    }

    #[test]
    fn lookback_keyword_is_case_insensitive() {
        let config = AnalysisConfig::from_toml(r#"lookback = "ALL""#).unwrap();
        assert_eq!(config.lookback, Lookback::All);
    }

    #[test]
    fn rejects_bad_lookback_keyword() {
        let err = AnalysisConfig::from_toml(r#"lookback = "most""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_window() {
        let err = AnalysisConfig::from_toml("windows = [7, 0]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_excessive_retries() {
        let err = AnalysisConfig::from_toml("[feed]\nmax_retries = 40").unwrap_err();
        assert!(err.to_string().contains("max_retries"));
        assert!(AnalysisConfig::from_toml("[feed]\nmax_retries = 10").is_ok());
    }

    #[test]
    fn rejects_empty_windows() {
        assert!(AnalysisConfig::from_toml("windows = []").is_err());
    }

    #[test]
    fn rejects_unknown_time_zone() {
        let err = AnalysisConfig::from_toml(r#"target_time_zone = "Mars/Olympus""#).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(AnalysisConfig::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = AnalysisConfig {
            lookback: Lookback::Bars(60),
            ..AnalysisConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("lookback = 60"));
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn feed_settings_carry_overrides() {
        let feed = FeedConfig {
            timeout_secs: 5,
            max_retries: 0,
            ..FeedConfig::default()
        };
        let settings = feed.alpha_vantage("demo");
        assert_eq!(settings.api_key, "demo");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.max_retries, 0);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = AnalysisConfig::from_file("/nonexistent/stockscope.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
