//! Local time resolution.
//!
//! Converts a user's stored IANA timezone and the current UTC instant into
//! the local hour, date, and weekday the eligibility rules are written in.
//! Bad user data (missing or unparseable timezone) falls back to UTC;
//! scheduling must never fail on it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

/// A user's wall-clock view of one UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    /// Local hour, 0-23.
    pub hour: u32,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Local weekday.
    pub weekday: Weekday,
    /// Resolved zone (UTC when the stored value was missing or invalid).
    pub zone: Tz,
}

impl LocalTime {
    /// Resolve `now` in the given timezone. Pure function of its inputs.
    pub fn resolve(timezone: Option<&str>, now: DateTime<Utc>) -> Self {
        let zone = parse_zone(timezone);
        let local = now.with_timezone(&zone);
        Self {
            hour: local.hour(),
            date: local.date_naive(),
            weekday: local.weekday(),
            zone,
        }
    }

    /// Whether the local weekday is Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }

    /// Local date as YYYY-MM-DD, the key for daily completion records.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Monday date of the local ISO week, the key for weekly records.
    pub fn week_id(&self) -> String {
        let monday = self.date - Duration::days(self.weekday.num_days_from_monday() as i64);
        monday.format("%Y-%m-%d").to_string()
    }

    /// UTC instants of the local day's start and end: `[midnight, midnight+1d)`.
    pub fn day_window_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = local_midnight_utc(&self.zone, self.date);
        let end = local_midnight_utc(&self.zone, self.date + Duration::days(1));
        (start, end)
    }

    /// UTC instants of the local Monday-based week: `[monday, monday+7d)`.
    pub fn week_window_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let monday = self.date - Duration::days(self.weekday.num_days_from_monday() as i64);
        let start = local_midnight_utc(&self.zone, monday);
        let end = local_midnight_utc(&self.zone, monday + Duration::days(7));
        (start, end)
    }
}

/// Parse an IANA timezone, falling back to UTC on missing/invalid input.
fn parse_zone(timezone: Option<&str>) -> Tz {
    match timezone {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!(timezone = %raw, "Invalid timezone, falling back to UTC");
            Tz::UTC
        }),
        _ => Tz::UTC,
    }
}

/// UTC instant of local midnight on `date`.
///
/// DST transitions can make midnight ambiguous (take the earlier instant)
/// or nonexistent (take the first valid instant within the next hour).
fn local_midnight_utc(zone: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    zone.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Format a UTC instant as the RFC 3339 string stored in the database
/// (`2026-08-06T17:00:00Z`).
pub fn rfc3339(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored RFC 3339 instant. Returns `None` on malformed data.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_resolve_eastern_evening() {
        // 21:00 UTC on a Thursday is 17:00 in New York (UTC-4 in August)
        let local = LocalTime::resolve(Some("America/New_York"), utc(2026, 8, 6, 21, 0));
        assert_eq!(local.hour, 17);
        assert_eq!(local.weekday, Weekday::Thu);
        assert_eq!(local.date_string(), "2026-08-06");
        assert!(!local.is_weekend());
    }

    #[test]
    fn test_resolve_crosses_date_line() {
        // 22:00 UTC Friday is already Saturday in Auckland
        let local = LocalTime::resolve(Some("Pacific/Auckland"), utc(2026, 8, 7, 22, 0));
        assert_eq!(local.weekday, Weekday::Sat);
        assert!(local.is_weekend());
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        let now = utc(2026, 8, 6, 12, 0);
        let local = LocalTime::resolve(Some("Mars/Olympus_Mons"), now);
        assert_eq!(local.zone, Tz::UTC);
        assert_eq!(local.hour, 12);

        let missing = LocalTime::resolve(None, now);
        assert_eq!(missing.zone, Tz::UTC);

        let empty = LocalTime::resolve(Some("  "), now);
        assert_eq!(empty.zone, Tz::UTC);
    }

    #[test]
    fn test_week_id_is_monday() {
        // Thursday 2026-08-06 belongs to the week of Monday 2026-08-03
        let local = LocalTime::resolve(Some("America/New_York"), utc(2026, 8, 6, 21, 0));
        assert_eq!(local.week_id(), "2026-08-03");

        // Sunday still maps to the preceding Monday
        let local = LocalTime::resolve(Some("America/New_York"), utc(2026, 8, 9, 21, 0));
        assert_eq!(local.week_id(), "2026-08-03");
    }

    #[test]
    fn test_day_window_in_zone_offset() {
        // New York midnight in August is 04:00 UTC
        let local = LocalTime::resolve(Some("America/New_York"), utc(2026, 8, 6, 21, 0));
        let (start, end) = local.day_window_utc();
        assert_eq!(rfc3339(&start), "2026-08-06T04:00:00Z");
        assert_eq!(rfc3339(&end), "2026-08-07T04:00:00Z");
    }

    #[test]
    fn test_week_window_spans_seven_days() {
        let local = LocalTime::resolve(Some("America/New_York"), utc(2026, 8, 6, 21, 0));
        let (start, end) = local.week_window_utc();
        assert_eq!(rfc3339(&start), "2026-08-03T04:00:00Z");
        assert_eq!(rfc3339(&end), "2026-08-10T04:00:00Z");
    }

    #[test]
    fn test_rfc3339_round_trip() {
        let instant = utc(2026, 8, 6, 17, 0);
        let text = rfc3339(&instant);
        assert_eq!(text, "2026-08-06T17:00:00Z");
        assert_eq!(parse_rfc3339(&text), Some(instant));
        assert_eq!(parse_rfc3339("garbage"), None);
    }
}
