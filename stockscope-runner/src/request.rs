//! Request and report values: one explicit value in, one out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stockscope_core::domain::Market;
use stockscope_core::indicators::RetracementLevels;
use stockscope_core::signals::{Signal, SignalBasis};

use crate::config::AnalysisConfig;
use crate::render::ChartArtifact;

/// Content-addressed request identifier (BLAKE3 hex).
pub type RequestId = String;

/// File name of the chart inside a request directory.
pub const CHART_FILE_NAME: &str = "chart.png";

/// What to analyze and where the chart goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub market: Market,
    /// Chart path; `None` derives one from the request id.
    pub destination: Option<PathBuf>,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>, market: Market) -> Self {
        Self {
            symbol: symbol.into(),
            market,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Deterministic id over the symbol, market and every setting that
    /// changes the analysis result. Output locations and feed transport
    /// settings are excluded.
    pub fn request_id(&self, config: &AnalysisConfig) -> RequestId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.market.feed_symbol(&self.symbol).as_bytes());
        hasher.update(b"\0");
        hasher.update(self.market.name().as_bytes());
        for w in config.normalized_windows() {
            hasher.update(&(w as u64).to_le_bytes());
        }
        hasher.update(b"\0");
        hasher.update(config.lookback.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(config.source_time_zone.as_bytes());
        hasher.update(b"\0");
        hasher.update(config.target_time_zone.as_bytes());
        hasher.update(&config.chart.width.to_le_bytes());
        hasher.update(&config.chart.height.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Where the chart is written: the explicit destination, or
    /// `<output_dir>/<SYMBOL>_<MARKET>_<id prefix>/chart.png`.
    pub fn chart_path(&self, config: &AnalysisConfig) -> PathBuf {
        match &self.destination {
            Some(path) => path.clone(),
            None => default_request_dir(
                &config.output_dir,
                &self.symbol,
                self.market,
                &self.request_id(config),
            )
            .join(CHART_FILE_NAME),
        }
    }
}

fn default_request_dir(output_dir: &Path, symbol: &str, market: Market, id: &str) -> PathBuf {
    let short = &id[..id.len().min(12)];
    output_dir.join(format!("{}_{}_{short}", symbol.trim().to_uppercase(), market.name()))
}

/// Everything one analysis produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub request_id: RequestId,
    pub symbol: String,
    pub feed_symbol: String,
    pub market: Market,
    pub time_zone: String,
    pub bar_count: usize,
    pub first_key: Option<String>,
    pub last_key: Option<String>,
    pub latest_close: Option<f64>,
    pub signal: Signal,
    pub signal_basis: SignalBasis,
    pub retracement: RetracementLevels,
    /// Last value of every moving average; `None` while the window is filling.
    pub moving_averages: BTreeMap<usize, Option<f64>>,
    pub chart: ChartArtifact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscope_core::indicators::Lookback;

    #[test]
    fn request_id_is_deterministic() {
        let config = AnalysisConfig::default();
        let request = AnalysisRequest::new("RELIANCE", Market::Bse);
        assert_eq!(request.request_id(&config), request.request_id(&config));
        assert_eq!(request.request_id(&config).len(), 64);
    }

    #[test]
    fn request_id_changes_with_inputs() {
        let config = AnalysisConfig::default();
        let bse = AnalysisRequest::new("RELIANCE", Market::Bse).request_id(&config);
        let nse = AnalysisRequest::new("RELIANCE", Market::Nse).request_id(&config);
        assert_ne!(bse, nse);

        let shorter = AnalysisConfig {
            lookback: Lookback::Bars(50),
            ..AnalysisConfig::default()
        };
        let request = AnalysisRequest::new("RELIANCE", Market::Bse);
        assert_ne!(request.request_id(&config), request.request_id(&shorter));
    }

    #[test]
    fn request_id_ignores_symbol_case_and_output_dir() {
        let config = AnalysisConfig::default();
        let moved = AnalysisConfig {
            output_dir: PathBuf::from("elsewhere"),
            ..AnalysisConfig::default()
        };
        let upper = AnalysisRequest::new("IBM", Market::Nyse);
        let lower = AnalysisRequest::new("ibm", Market::Nyse);
        assert_eq!(upper.request_id(&config), lower.request_id(&config));
        assert_eq!(upper.request_id(&config), upper.request_id(&moved));
    }

    #[test]
    fn default_chart_path_lives_under_output_dir() {
        let config = AnalysisConfig::default();
        let request = AnalysisRequest::new("ibm", Market::Nyse);
        let path = request.chart_path(&config);
        assert!(path.starts_with("output"));
        assert!(path.ends_with(CHART_FILE_NAME));
        let dir = path.parent().unwrap().file_name().unwrap().to_string_lossy();
        assert!(dir.starts_with("IBM_NYSE_"));
    }

    #[test]
    fn explicit_destination_wins() {
        let config = AnalysisConfig::default();
        let request = AnalysisRequest::new("IBM", Market::Nyse).with_destination("/tmp/x.png");
        assert_eq!(request.chart_path(&config), PathBuf::from("/tmp/x.png"));
    }
}
