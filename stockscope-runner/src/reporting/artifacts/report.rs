//! Analysis report export (JSON).

use anyhow::{Context, Result};
use std::path::Path;

use crate::request::AnalysisReport;

pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

/// Read a report written by [`write_report_json`].
pub fn read_report_json(path: &Path) -> Result<AnalysisReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    serde_json::from_str(&text).context("Failed to parse report")
}
