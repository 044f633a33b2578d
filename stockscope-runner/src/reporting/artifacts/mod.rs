//! Artifact manager for persisting analysis outputs next to the chart.

mod indicators;
mod report;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::pipeline::Analysis;

pub use indicators::write_indicators_csv;
pub use report::{read_report_json, write_report_json};

/// Artifact paths returned after export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub chart: PathBuf,
    pub report_json: PathBuf,
    pub indicators_csv: PathBuf,
}

/// Writes report and indicator table into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Manager for the directory the analysis chart was written into.
    pub fn beside_chart(analysis: &Analysis) -> Result<Self> {
        let dir = analysis
            .report
            .chart
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save `<stem>.report.json` and `<stem>.indicators.csv`, where `<stem>`
    /// is the chart's file stem, so charts sharing a directory keep
    /// separate artifacts.
    pub fn save(&self, analysis: &Analysis) -> Result<ArtifactPaths> {
        let stem = chart_stem(&analysis.report.chart.path);

        let report_json = self.output_dir.join(format!("{stem}.report.json"));
        write_report_json(&report_json, &analysis.report)?;

        let indicators_csv = self.output_dir.join(format!("{stem}.indicators.csv"));
        write_indicators_csv(&indicators_csv, &analysis.series, &analysis.indicators)?;

        Ok(ArtifactPaths {
            chart: analysis.report.chart.path.clone(),
            report_json,
            indicators_csv,
        })
    }
}

fn chart_stem(chart: &Path) -> String {
    chart
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "chart".to_string())
}
