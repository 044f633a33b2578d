//! Chart composition: three stacked panels written to a PNG.
//!
//! a) close with a horizontal line at each retracement level
//! b) daily volume bars
//! c) close with every moving average
//!
//! All panels share one time axis with month gridlines (major) and Monday
//! gridlines (minor).

pub mod axis;
mod panels;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use stockscope_core::domain::Series;
use stockscope_core::indicators::{IndicatorSet, RetracementLevels};

use crate::config::ChartConfig;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render an empty series")]
    EmptySeries,

    #[error("chart I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart backend error: {0}")]
    Backend(String),
}

pub(crate) fn backend<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// A PNG written by [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Geometry and labelling for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Prefix for panel captions, e.g. `"RELIANCE (BSE)"`.
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        let chart = ChartConfig::default();
        Self {
            width: chart.width,
            height: chart.height,
            title: String::new(),
        }
    }
}

impl ChartOptions {
    pub fn from_config(chart: &ChartConfig, title: impl Into<String>) -> Self {
        Self {
            width: chart.width,
            height: chart.height,
            title: title.into(),
        }
    }
}

/// Render with default geometry.
pub fn render(
    series: &Series,
    indicators: &IndicatorSet,
    levels: &RetracementLevels,
    destination: &Path,
) -> Result<ChartArtifact, RenderError> {
    render_with(series, indicators, levels, destination, &ChartOptions::default())
}

/// Render the three-panel chart to `destination`.
///
/// Fails with [`RenderError::EmptySeries`] before touching the filesystem.
pub fn render_with(
    series: &Series,
    indicators: &IndicatorSet,
    levels: &RetracementLevels,
    destination: &Path,
    options: &ChartOptions,
) -> Result<ChartArtifact, RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptySeries);
    }
    if options.width == 0 || options.height == 0 {
        return Err(RenderError::Backend(format!(
            "chart dimensions must be positive, got {}x{}",
            options.width, options.height
        )));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    debug!(
        path = %destination.display(),
        bars = series.len(),
        windows = ?indicators.windows(),
        "rendering chart"
    );
    panels::draw(series, indicators, levels, destination, options)?;

    let bytes = std::fs::metadata(destination)
        .map_err(|source| RenderError::Io {
            path: destination.to_path_buf(),
            source,
        })?
        .len();

    info!(path = %destination.display(), bytes, "chart written");

    Ok(ChartArtifact {
        path: destination.to_path_buf(),
        width: options.width,
        height: options.height,
        bytes,
    })
}
