//! Timestamp editing and display
//!
//! The post stores one instant. Date and time inputs replace only their own
//! calendar component, interpreted in a time zone (the local one for the
//! plain helpers). Display mode never touches the stored value.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

use crate::model::{Content, TimeFormat};
use crate::store::ContentPatch;

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Value for a date input (`YYYY-MM-DD`), local time.
pub fn date_input_value(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Value for a time input (`HH:MM`), local time.
pub fn time_input_value(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M").to_string()
}

/// Replace the calendar date of `instant` in the local zone, keeping the time of day.
pub fn set_date(instant: DateTime<Utc>, date: &str) -> Option<DateTime<Utc>> {
    set_date_in(instant, date, &Local)
}

/// Replace the hour and minute of `instant` in the local zone, keeping the date.
pub fn set_time(instant: DateTime<Utc>, time: &str) -> Option<DateTime<Utc>> {
    set_time_in(instant, time, &Local)
}

pub fn set_date_in<Tz: TimeZone>(instant: DateTime<Utc>, date: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let local = instant.with_timezone(tz);
    resolve(tz, NaiveDateTime::new(date, local.time()))
}

pub fn set_time_in<Tz: TimeZone>(instant: DateTime<Utc>, time: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let (h, m) = time.trim().split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.get(..2).unwrap_or(m).parse().ok()?;
    let local = instant.with_timezone(tz);
    let time = NaiveTime::from_hms_nano_opt(hour, minute, local.second(), local.nanosecond())?;
    resolve(tz, NaiveDateTime::new(local.date_naive(), time))
}

/// Map a wall-clock time back to an instant; times skipped by a DST jump are refused.
fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Patch setting the date, or `None` if the input does not parse.
pub fn date_patch(content: &Content, date: &str) -> Option<ContentPatch> {
    set_date(content.timestamp, date).map(timestamp_patch)
}

/// Patch setting the time of day, or `None` if the input does not parse.
pub fn time_patch(content: &Content, time: &str) -> Option<ContentPatch> {
    set_time(content.timestamp, time).map(timestamp_patch)
}

pub fn timestamp_patch(instant: DateTime<Utc>) -> ContentPatch {
    ContentPatch {
        timestamp: Some(instant),
        ..Default::default()
    }
}

pub fn time_format_patch(format: TimeFormat) -> ContentPatch {
    ContentPatch {
        time_format: Some(format),
        ..Default::default()
    }
}

/// Quick "how long ago" choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePreset {
    Now,
    OneHourAgo,
    ThreeHoursAgo,
    OneDayAgo,
    OneWeekAgo,
    /// Thirty days
    OneMonthAgo,
}

impl TimePreset {
    pub const ALL: [TimePreset; 6] = [
        TimePreset::Now,
        TimePreset::OneHourAgo,
        TimePreset::ThreeHoursAgo,
        TimePreset::OneDayAgo,
        TimePreset::OneWeekAgo,
        TimePreset::OneMonthAgo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimePreset::Now => "Now",
            TimePreset::OneHourAgo => "1 hour ago",
            TimePreset::ThreeHoursAgo => "3 hours ago",
            TimePreset::OneDayAgo => "1 day ago",
            TimePreset::OneWeekAgo => "1 week ago",
            TimePreset::OneMonthAgo => "1 month ago",
        }
    }

    /// Short key used on the command line (`now`, `1h`, `3h`, `1d`, `1w`, `1mo`).
    pub fn key(self) -> &'static str {
        match self {
            TimePreset::Now => "now",
            TimePreset::OneHourAgo => "1h",
            TimePreset::ThreeHoursAgo => "3h",
            TimePreset::OneDayAgo => "1d",
            TimePreset::OneWeekAgo => "1w",
            TimePreset::OneMonthAgo => "1mo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s) || p.label().eq_ignore_ascii_case(s))
    }

    pub fn offset(self) -> Duration {
        match self {
            TimePreset::Now => Duration::zero(),
            TimePreset::OneHourAgo => Duration::hours(1),
            TimePreset::ThreeHoursAgo => Duration::hours(3),
            TimePreset::OneDayAgo => Duration::days(1),
            TimePreset::OneWeekAgo => Duration::weeks(1),
            TimePreset::OneMonthAgo => Duration::days(30),
        }
    }

    pub fn instant(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.offset()
    }

    pub fn patch(self, now: DateTime<Utc>) -> ContentPatch {
        timestamp_patch(self.instant(now))
    }
}

/// "3 hours ago" style wording for `instant` relative to `now`.
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let future = instant > now;
    let (earlier, later) = if future { (now, instant) } else { (instant, now) };
    let distance = distance_words(earlier, later);
    if future {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn distance_words(earlier: DateTime<Utc>, later: DateTime<Utc>) -> String {
    let seconds = (later - earlier).num_seconds();
    let minutes = (seconds as f64 / 60.0).round() as i64;
    let round_div = |a: i64, b: i64| (a as f64 / b as f64).round() as i64;

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".into()
        } else {
            "1 minute".into()
        };
    }
    if minutes < 45 {
        return format!("{} minutes", minutes);
    }
    if minutes < 90 {
        return "about 1 hour".into();
    }
    if minutes < MINUTES_IN_DAY {
        return format!("about {} hours", round_div(minutes, 60));
    }
    if minutes < 2_520 {
        return "1 day".into();
    }
    if minutes < MINUTES_IN_MONTH {
        return format!("{} days", round_div(minutes, MINUTES_IN_DAY));
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = round_div(minutes, MINUTES_IN_MONTH);
        return plural("about ", months, "month");
    }

    let months = calendar_months_between(earlier, later);
    if months < 12 {
        let nearest = round_div(minutes, MINUTES_IN_MONTH).max(1);
        return plural("", nearest, "month");
    }
    let years = months / 12;
    let rest = months % 12;
    if rest < 3 {
        plural("about ", years, "year")
    } else if rest < 9 {
        plural("over ", years, "year")
    } else {
        plural("almost ", years + 1, "year")
    }
}

fn plural(prefix: &str, count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{}1 {}", prefix, unit)
    } else {
        format!("{}{} {}s", prefix, count, unit)
    }
}

/// Whole calendar months from `earlier` to `later`.
fn calendar_months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = (later.year() as i64 - earlier.year() as i64) * 12
        + (later.month() as i64 - earlier.month() as i64);
    let later_rest = (later.day(), later.time());
    let earlier_rest = (earlier.day(), earlier.time());
    if months > 0 && later_rest < earlier_rest {
        months -= 1;
    }
    months
}

/// `2:30 PM · Dec 15, 2023` in the local zone.
pub fn format_absolute(instant: DateTime<Utc>) -> String {
    format_absolute_in(instant, &Local)
}

pub fn format_absolute_in<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant
        .with_timezone(tz)
        .format("%-I:%M %p · %b %-d, %Y")
        .to_string()
}

/// The timestamp as the preview shows it.
pub fn display(content: &Content, now: DateTime<Utc>) -> String {
    match content.time_format {
        TimeFormat::Relative => format_relative(content.timestamp, now),
        TimeFormat::Absolute => format_absolute(content.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn date_edit_keeps_time_of_day() {
        let t = at(2024, 3, 10, 14, 45, 12);
        let edited = set_date_in(t, "2023-12-25", &Utc).unwrap();
        assert_eq!(edited, at(2023, 12, 25, 14, 45, 12));
    }

    #[test]
    fn time_edit_keeps_date_and_seconds() {
        let t = at(2024, 3, 10, 14, 45, 12);
        let edited = set_time_in(t, "09:05", &Utc).unwrap();
        assert_eq!(edited, at(2024, 3, 10, 9, 5, 12));
    }

    #[test]
    fn bad_inputs_are_refused() {
        let t = at(2024, 3, 10, 14, 45, 12);
        assert!(set_date_in(t, "2023-02-30", &Utc).is_none());
        assert!(set_date_in(t, "yesterday", &Utc).is_none());
        assert!(set_time_in(t, "25:00", &Utc).is_none());
        assert!(set_time_in(t, "noon", &Utc).is_none());
    }

    #[test]
    fn presets_subtract_fixed_offsets() {
        let now = at(2024, 3, 31, 12, 0, 0);
        assert_eq!(TimePreset::Now.instant(now), now);
        assert_eq!(TimePreset::ThreeHoursAgo.instant(now), at(2024, 3, 31, 9, 0, 0));
        assert_eq!(TimePreset::OneWeekAgo.instant(now), at(2024, 3, 24, 12, 0, 0));
        assert_eq!(TimePreset::OneMonthAgo.instant(now), at(2024, 3, 1, 12, 0, 0));
        assert_eq!(TimePreset::parse("1mo"), Some(TimePreset::OneMonthAgo));
        assert_eq!(TimePreset::parse("1 day ago"), Some(TimePreset::OneDayAgo));
    }

    #[test]
    fn relative_wording() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let ago = |d: Duration| format_relative(now - d, now);
        assert_eq!(ago(Duration::seconds(10)), "less than a minute ago");
        assert_eq!(ago(Duration::seconds(70)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(30)), "30 minutes ago");
        assert_eq!(ago(Duration::minutes(60)), "about 1 hour ago");
        assert_eq!(ago(Duration::hours(3)), "about 3 hours ago");
        assert_eq!(ago(Duration::hours(30)), "1 day ago");
        assert_eq!(ago(Duration::days(7)), "7 days ago");
        assert_eq!(ago(Duration::days(30)), "about 1 month ago");
        assert_eq!(ago(Duration::days(100)), "3 months ago");
        assert_eq!(ago(Duration::days(366)), "about 1 year ago");
        assert_eq!(ago(Duration::days(365 + 180)), "over 1 year ago");
        assert_eq!(ago(Duration::days(365 + 300)), "almost 2 years ago");
        assert_eq!(format_relative(now + Duration::hours(2), now), "in about 2 hours");
    }

    #[test]
    fn absolute_wording() {
        let t = at(2023, 12, 15, 14, 30, 0);
        assert_eq!(format_absolute_in(t, &Utc), "2:30 PM · Dec 15, 2023");
    }
}
