//! StockScope Runner: analysis orchestration, chart rendering, artifacts.
//!
//! This crate builds on `stockscope-core` to provide:
//! - TOML configuration with defaults and validation
//! - Explicit request / report values with content-addressed request ids
//! - The pipeline wiring feed → normalize → indicators → signal → chart
//! - Three-panel PNG chart rendering
//! - JSON report and CSV indicator export

pub mod config;
pub mod pipeline;
pub mod render;
pub mod reporting;
pub mod request;

pub use config::{AnalysisConfig, ChartConfig, ConfigError, FeedConfig};
pub use pipeline::{analyze_feed, run_analysis, Analysis, PipelineError};
pub use render::{render, render_with, ChartArtifact, ChartOptions, RenderError};
pub use reporting::{ArtifactManager, ArtifactPaths};
pub use request::{AnalysisReport, AnalysisRequest, RequestId};
