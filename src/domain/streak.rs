/// Streak and completion-rate calculations
///
/// Every function here is a pure function of the completion dates it is
/// handed, the habit's current frequency and (for the "current" streaks)
/// the day treated as today. None of them fail: empty or odd input just
/// yields 0.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::calendar;
use crate::domain::{HabitCompletion, HabitFrequency};

/// How far back the current-streak walk looks
pub const STREAK_LOOKBACK_DAYS: u32 = 365;

/// How many weeks the weekly-quota walk looks back
pub const QUOTA_LOOKBACK_WEEKS: u32 = 52;

/// The set of calendar days on which a habit was completed
///
/// Duplicate records for the same day collapse into one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    days: BTreeSet<NaiveDate>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slice of completion records
    pub fn from_completions(completions: &[HabitCompletion]) -> Self {
        completions.iter().map(|c| c.completed_date).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.days.insert(date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// Number of completed days within `[start, end]`
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if start > end {
            return 0;
        }
        self.days.range(start..=end).count()
    }
}

impl FromIterator<NaiveDate> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

impl From<&[HabitCompletion]> for CompletionSet {
    fn from(completions: &[HabitCompletion]) -> Self {
        Self::from_completions(completions)
    }
}

/// Current streak walking backward from the local today
pub fn calculate_streak(completions: &CompletionSet, frequency: &HabitFrequency) -> u32 {
    calculate_streak_on(completions, frequency, calendar::today())
}

/// Current streak walking backward from `today`
///
/// Counts consecutive scheduled days with a completion. Unscheduled days
/// are skipped. A missing completion on `today` itself is skipped too
/// (the day isn't over yet); any other scheduled miss ends the streak.
pub fn calculate_streak_on(
    completions: &CompletionSet,
    frequency: &HabitFrequency,
    today: NaiveDate,
) -> u32 {
    let mut streak = 0;
    let mut current = today;

    for i in 0..STREAK_LOOKBACK_DAYS {
        if frequency.is_scheduled(current) {
            if completions.contains(current) {
                streak += 1;
            } else if i != 0 {
                break;
            }
        }
        current = calendar::add_days(current, -1);
    }

    streak
}

/// Longest run of completed scheduled days in the habit's history
///
/// Walks forward from the earliest to the latest completion. Unscheduled
/// days neither extend nor reset the run.
pub fn get_best_streak(completions: &CompletionSet, frequency: &HabitFrequency) -> u32 {
    let (Some(first), Some(last)) = (completions.earliest(), completions.latest()) else {
        return 0;
    };

    let mut best = 0;
    let mut running = 0;
    for day in calendar::days_between(first, last) {
        if !frequency.is_scheduled(day) {
            continue;
        }
        if completions.contains(day) {
            running += 1;
            best = best.max(running);
        } else {
            running = 0;
        }
    }

    best
}

/// Fraction of scheduled days in `[start, end]` that were completed
///
/// Returns exactly 0.0 when the range holds no scheduled days, including
/// when `start > end`.
pub fn get_completion_rate(
    completions: &CompletionSet,
    frequency: &HabitFrequency,
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    let mut scheduled_days = 0u32;
    let mut completed_days = 0u32;

    for day in calendar::days_between(start, end) {
        if frequency.is_scheduled(day) {
            scheduled_days += 1;
            if completions.contains(day) {
                completed_days += 1;
            }
        }
    }

    if scheduled_days == 0 {
        0.0
    } else {
        completed_days as f64 / scheduled_days as f64
    }
}

/// Completed days in the Monday-start week containing `today`
pub fn week_progress(completions: &CompletionSet, today: NaiveDate) -> u32 {
    completions.count_between(calendar::start_of_week(today), calendar::end_of_week(today)) as u32
}

/// Consecutive weeks in which a times-per-week target was met
///
/// Walks whole Monday-start weeks backward from the week containing
/// `today`. The current week only counts once it reaches the target; until
/// then it is skipped without breaking the run. A zero target is treated
/// as one completion per week.
pub fn weekly_quota_streak_on(completions: &CompletionSet, target: u8, today: NaiveDate) -> u32 {
    let target = target.max(1) as usize;
    let mut streak = 0;
    let mut week_start = calendar::start_of_week(today);

    for i in 0..QUOTA_LOOKBACK_WEEKS {
        let week_end = calendar::add_days(week_start, 6);
        if completions.count_between(week_start, week_end) >= target {
            streak += 1;
        } else if i != 0 {
            break;
        }
        week_start = calendar::add_days(week_start, -7);
    }

    streak
}
