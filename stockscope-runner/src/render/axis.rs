//! Time-axis helpers shared by every panel.
//!
//! Bars are placed on a continuous axis measured in days since the first bar,
//! so gaps (weekends, holidays) keep their real width.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// First day of every month in `[start, end]`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let Some(mut cursor) = start.with_day(1) else {
        return out;
    };
    if cursor < start {
        cursor = next_month(cursor);
    }
    while cursor <= end {
        out.push(cursor);
        cursor = next_month(cursor);
    }
    out
}

/// Every Monday in `[start, end]`.
pub fn week_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_monday()) % 7;
    let mut cursor = start + Duration::days(i64::from(offset));
    let mut out = Vec::new();
    while cursor <= end {
        debug_assert_eq!(cursor.weekday(), Weekday::Mon);
        out.push(cursor);
        cursor += Duration::days(7);
    }
    out
}

/// Every `k`-th tick so that at most `max` remain; the first tick is always kept.
pub fn thin_ticks(ticks: &[f64], max: usize) -> Vec<f64> {
    let step = ticks.len().div_ceil(max.max(1)).max(1);
    ticks.iter().copied().step_by(step).collect()
}

fn next_month(d: NaiveDate) -> NaiveDate {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MAX)
}

/// Maps wall-clock timestamps to axis positions and back.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    origin: NaiveDateTime,
}

impl TimeAxis {
    pub fn new(origin: NaiveDateTime) -> Self {
        Self { origin }
    }

    /// Days since the origin, fractional.
    pub fn position(&self, t: NaiveDateTime) -> f64 {
        (t - self.origin).num_seconds() as f64 / 86_400.0
    }

    pub fn position_of_date(&self, d: NaiveDate) -> f64 {
        d.and_hms_opt(0, 0, 0).map_or(0.0, |t| self.position(t))
    }

    fn at(&self, x: f64) -> NaiveDateTime {
        self.origin + Duration::seconds((x * 86_400.0).round() as i64)
    }

    /// Date at an axis position.
    pub fn label(&self, x: f64) -> String {
        self.at(x).format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM` at an axis position, for the month ticks.
    pub fn month_label(&self, x: f64) -> String {
        self.at(x).format("%Y-%m").to_string()
    }
}
