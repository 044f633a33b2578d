//! Indicator table export (CSV): one row per bar, one column per average.

use anyhow::{Context, Result};
use std::path::Path;

use stockscope_core::domain::Series;
use stockscope_core::indicators::IndicatorSet;

/// Undefined averages are written as empty cells.
pub fn write_indicators_csv(path: &Path, series: &Series, indicators: &IndicatorSet) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create indicators CSV {}", path.display()))?;

    let windows = indicators.windows();
    let mut header = vec![
        "date".to_string(),
        "open".into(),
        "high".into(),
        "low".into(),
        "close".into(),
        "volume".into(),
    ];
    header.extend(windows.iter().map(|w| format!("ma_{w}")));
    wtr.write_record(&header)?;

    for (i, bar) in series.bars().iter().enumerate() {
        let mut row = vec![
            bar.key(),
            format!("{:.4}", bar.open),
            format!("{:.4}", bar.high),
            format!("{:.4}", bar.low),
            format!("{:.4}", bar.close),
            format!("{:.0}", bar.volume),
        ];
        row.extend(
            windows
                .iter()
                .map(|&w| indicators.get(w, i).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush indicators CSV {}", path.display()))?;
    Ok(())
}
