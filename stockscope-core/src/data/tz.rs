//! Time zone parsing and wall-clock conversion.
//!
//! Feed dates carry no offset: `2024-03-08` means midnight on the exchange's
//! calendar. To move such a date into another zone it must first be pinned to
//! an instant, which can fail around DST transitions:
//! - a nonexistent local time (spring-forward gap) is shifted forward
//!   minute-by-minute to the first valid instant, capped at two hours;
//! - an ambiguous local time (fall-back) resolves to the earliest instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Parse an IANA time zone name (`"US/Eastern"`, `"Asia/Kolkata"`).
pub fn parse_time_zone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Pin a naive local time in `tz` to a single instant.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let mut t = naive;
            for _ in 0..120 {
                t += Duration::minutes(1);
                if let LocalResult::Single(dt) = tz.from_local_datetime(&t) {
                    return Some(dt);
                }
            }
            None
        }
    }
}

/// Re-express a naive wall time from `source` as the wall time in `target`.
pub fn convert_wall_time(naive: NaiveDateTime, source: Tz, target: Tz) -> Option<NaiveDateTime> {
    localize(naive, source).map(|dt| dt.with_timezone(&target).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_legacy_and_canonical_names() {
        assert!(parse_time_zone("US/Eastern").is_some());
        assert!(parse_time_zone("Asia/Kolkata").is_some());
        assert!(parse_time_zone("Mars/Olympus").is_none());
    }

    #[test]
    fn eastern_midnight_is_half_past_ten_in_india() {
        // EST (UTC-5) midnight -> 05:00Z -> 10:30 IST (UTC+5:30)
        let eastern = parse_time_zone("US/Eastern").unwrap();
        let ist = parse_time_zone("Asia/Kolkata").unwrap();
        let got = convert_wall_time(at(2024, 1, 2, 0, 0), eastern, ist).unwrap();
        assert_eq!(got, at(2024, 1, 2, 10, 30));
    }

    #[test]
    fn summer_offset_is_applied() {
        // EDT (UTC-4) midnight -> 04:00Z -> 09:30 IST
        let eastern = parse_time_zone("US/Eastern").unwrap();
        let ist = parse_time_zone("Asia/Kolkata").unwrap();
        let got = convert_wall_time(at(2024, 7, 1, 0, 0), eastern, ist).unwrap();
        assert_eq!(got, at(2024, 7, 1, 9, 30));
    }

    #[test]
    fn spring_forward_gap_shifts_forward() {
        // 02:30 does not exist in New York on 2024-03-10; first valid instant is 03:00 EDT.
        let ny = parse_time_zone("America/New_York").unwrap();
        let got = localize(at(2024, 3, 10, 2, 30), ny).unwrap();
        assert_eq!(got.naive_local(), at(2024, 3, 10, 3, 0));
    }

    #[test]
    fn fall_back_ambiguity_prefers_earliest() {
        // 01:30 occurs twice in New York on 2024-11-03; the EDT one is 05:30Z.
        let ny = parse_time_zone("America/New_York").unwrap();
        let got = localize(at(2024, 11, 3, 1, 30), ny).unwrap();
        assert_eq!(got.naive_utc(), at(2024, 11, 3, 5, 30));
    }
}
