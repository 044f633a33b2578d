//! Analysis pipeline: feed → normalize → moving averages → retracement →
//! classify → chart.
//!
//! Two entry points:
//! - `run_analysis()`: fetches from a [`QuoteFeed`], then analyzes. Used by the CLI.
//! - `analyze_feed()`: takes an already decoded feed. Used by tests and
//!   callers that hold a saved response.

use thiserror::Error;
use tracing::{info, info_span, warn};

use stockscope_core::data::{normalize, time_zone, DailyFeed, FeedError, NormalizeError, QuoteFeed};
use stockscope_core::domain::Series;
use stockscope_core::indicators::{
    compute_fibonacci_levels, compute_moving_averages, IndicatorError, IndicatorSet,
    RetracementError,
};
use stockscope_core::signals::evaluate;

use crate::config::{AnalysisConfig, ConfigError};
use crate::render::{render_with, ChartOptions, RenderError};
use crate::request::{AnalysisReport, AnalysisRequest};

/// Errors from any stage, passed through unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),
    #[error("retracement error: {0}")]
    Retracement(#[from] RetracementError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Report plus the intermediate values it was built from.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: AnalysisReport,
    pub series: Series,
    pub indicators: IndicatorSet,
}

/// Fetch the daily feed for the request and analyze it.
pub fn run_analysis(
    feed: &dyn QuoteFeed,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<Analysis, PipelineError> {
    config.validate()?;
    info!(
        feed = feed.name(),
        symbol = %request.symbol,
        market = %request.market,
        "fetching daily feed"
    );
    let daily = feed.fetch_daily(&request.symbol, request.market)?;
    analyze_feed(&daily, request, config)
}

/// Analyze a decoded feed. Nothing is written unless every stage before the
/// chart succeeds.
pub fn analyze_feed(
    daily: &DailyFeed,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<Analysis, PipelineError> {
    config.validate()?;
    let request_id = request.request_id(config);
    let span = info_span!("analysis", id = &request_id[..12], symbol = %request.symbol);
    let _guard = span.enter();

    let source = time_zone(&config.source_time_zone)?;
    let target = time_zone(&config.target_time_zone)?;
    if let Some(stamped) = daily.meta_field("Time Zone") {
        if stamped != source.name() {
            warn!(
                feed = stamped,
                configured = source.name(),
                "feed time zone differs from configured source zone"
            );
        }
    }

    let series = normalize(&daily.bars(), source, target)?;
    info!(bars = series.len(), time_zone = target.name(), "series normalized");

    let windows = config.normalized_windows();
    let indicators = compute_moving_averages(&series, &windows)?;
    let levels = compute_fibonacci_levels(&series, config.lookback)?;
    let evaluation = evaluate(&series, &indicators, &levels);
    info!(
        signal = %evaluation.signal,
        basis = ?evaluation.basis,
        close = ?evaluation.latest_close,
        midpoint = evaluation.midpoint,
        "signal classified"
    );

    let title = format!("{} ({})", request.symbol.trim().to_uppercase(), request.market);
    let destination = request.chart_path(config);
    let chart = render_with(
        &series,
        &indicators,
        &levels,
        &destination,
        &ChartOptions::from_config(&config.chart, title),
    )?;

    let span_keys = series.span_keys();
    let report = AnalysisReport {
        request_id,
        symbol: request.symbol.trim().to_uppercase(),
        feed_symbol: request.market.feed_symbol(&request.symbol),
        market: request.market,
        time_zone: target.name().to_string(),
        bar_count: series.len(),
        first_key: span_keys.as_ref().map(|(first, _)| first.clone()),
        last_key: span_keys.map(|(_, last)| last),
        latest_close: evaluation.latest_close,
        signal: evaluation.signal,
        signal_basis: evaluation.basis,
        retracement: levels,
        moving_averages: indicators.tail(),
        chart,
    };

    Ok(Analysis {
        report,
        series,
        indicators,
    })
}
