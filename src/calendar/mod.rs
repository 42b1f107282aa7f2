/// Calendar and date utilities
///
/// Small stateless helpers for day/week/month arithmetic and display
/// formatting. Everything here works on calendar dates only; callers are
/// expected to have normalized to the user's local day already.

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveTime, ParseResult, Weekday};

/// Day-of-week numbering used throughout the planner: 0=Sunday .. 6=Saturday
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Short English day names indexed by `day_of_week`
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Short name for a day-of-week number, `None` when out of range
pub fn day_name(day: u8) -> Option<&'static str> {
    DAY_NAMES.get(day as usize).copied()
}

/// The local calendar day right now
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shift a date by a signed number of days, saturating at chrono's date range
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Shift a date forward by whole months.
///
/// Days that don't exist in the target month clamp to its last day,
/// so Jan 31 + 1 month is Feb 28 (or 29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Monday of the week containing `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Sunday of the week containing `date`
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).last_day()
}

/// The seven days of the Monday-first week containing `date`
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let start = start_of_week(date);
    std::array::from_fn(|i| add_days(start, i as i64))
}

/// Every day of a month, `month` being 1-based. Invalid months yield nothing.
pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let next_month = add_months(first, 1);
    days_between(first, add_days(next_month, -1)).collect()
}

/// Inclusive forward walk over `[start, end]`; empty when `start > end`
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |day| *day <= end)
}

/// ISO calendar date, e.g. "2024-03-15" (the stored completion format)
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an ISO calendar date string
pub fn parse_iso(s: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

/// "Mar 15, 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// "Mar 15"
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// "Fri"
pub fn format_day_of_week(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// "9:30 AM"
pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// "9:30 AM – 10:00 AM"
pub fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} – {}", format_time(start), format_time(end))
}

/// Compact duration label: 45 → "45m", 60 → "1h", 90 → "1h 30m"
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Countdown display: 125 → "02:05"
pub fn seconds_to_display(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
