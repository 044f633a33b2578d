//! Feed normalization: raw labeled fields in, a canonical [`Series`] out.
//!
//! Each date is read as midnight in the source zone, moved to the target zone
//! and keyed by its wall time there. The result is sorted ascending. Any bad
//! entry fails the whole call; no partial series is ever returned.

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

use super::feed::{canonical_label, RawBars, RawFields};
use super::tz;
use crate::domain::{Bar, Series};

/// Fields every bar must carry, in canonical (prefix-stripped) form.
pub const REQUIRED_FIELDS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("malformed bar on {date}: field '{field}' {reason}")]
    MalformedBar {
        date: String,
        field: String,
        reason: String,
    },

    #[error("two bars normalize to the same date {key}")]
    DuplicateDate { key: String },

    #[error("invalid bar date '{raw}'")]
    InvalidDate { raw: String },

    #[error("unknown time zone '{name}'")]
    UnknownTimeZone { name: String },
}

/// Resolve a time zone name, mapping failure into the normalizer's taxonomy.
pub fn time_zone(name: &str) -> Result<Tz, NormalizeError> {
    tz::parse_time_zone(name).ok_or_else(|| NormalizeError::UnknownTimeZone {
        name: name.to_string(),
    })
}

/// Normalize a raw feed into a series expressed in `target`.
///
/// Empty input is not an error: it yields an empty series.
pub fn normalize(raw: &RawBars, source: Tz, target: Tz) -> Result<Series, NormalizeError> {
    let mut bars = Vec::with_capacity(raw.len());

    for (date_str, fields) in raw {
        let local = parse_feed_date(date_str)?;
        let date = tz::convert_wall_time(local, source, target).ok_or_else(|| {
            NormalizeError::InvalidDate {
                raw: date_str.clone(),
            }
        })?;
        let bar = parse_bar(date_str, date, fields)?;
        if !bar.is_sane() {
            warn!(date = %date_str, "bar violates OHLC ordering; keeping it as delivered");
        }
        bars.push(bar);
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));

    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(NormalizeError::DuplicateDate { key: pair[1].key() });
    }

    debug!(
        bars = bars.len(),
        source = %source,
        target = %target,
        "normalized daily feed"
    );

    // Strictly increasing after the sort and duplicate check.
    Series::from_bars(bars, target).map_err(|e| match e {
        crate::domain::SeriesError::NotIncreasing { next, .. } => {
            NormalizeError::DuplicateDate { key: next }
        }
    })
}

/// Accepts `YYYY-MM-DD` (midnight) and `YYYY-MM-DD HH:MM:SS`.
fn parse_feed_date(raw: &str) -> Result<NaiveDateTime, NormalizeError> {
    let trimmed = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map_err(|_| {
        NormalizeError::InvalidDate {
            raw: raw.to_string(),
        }
    })
}

fn parse_bar(date_str: &str, date: NaiveDateTime, fields: &RawFields) -> Result<Bar, NormalizeError> {
    let [open, high, low, close, volume] =
        REQUIRED_FIELDS.map(|name| field_value(date_str, fields, name));

    let volume = volume?;
    if volume < 0.0 {
        return Err(NormalizeError::MalformedBar {
            date: date_str.to_string(),
            field: "volume".into(),
            reason: format!("is negative ({volume})"),
        });
    }

    Ok(Bar {
        date,
        open: open?,
        high: high?,
        low: low?,
        close: close?,
        volume,
    })
}

fn field_value(date_str: &str, fields: &RawFields, name: &str) -> Result<f64, NormalizeError> {
    let malformed = |reason: String| NormalizeError::MalformedBar {
        date: date_str.to_string(),
        field: name.to_string(),
        reason,
    };

    let raw = fields
        .iter()
        .find(|(label, _)| canonical_label(label).eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
        .ok_or_else(|| malformed("is missing".into()))?;

    match raw.as_f64() {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(malformed(format!("is not finite ({v})"))),
        None => Err(malformed(format!("is not numeric ({raw:?})"))),
    }
}
