/// Recurrence rules for repeating tasks and time blocks
///
/// A RecurrenceRule answers "does this date match?", enumerates upcoming
/// occurrences and renders a short label. It is a different shape from
/// HabitFrequency: habits are scheduled per weekday, rules are stepped.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::calendar;
use crate::domain::DomainError;

/// Base unit a recurrence rule repeats on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    /// A stored frequency this version doesn't recognise; never matches
    #[serde(other)]
    Custom,
}

fn default_interval() -> u32 {
    1
}

/// Repeat rule attached to a task or time block
///
/// Stored as JSON: `{"frequency":"weekly","interval":1,"days_of_week":[1,3],"end_date":"2024-06-01"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// 0=Sunday .. 6=Saturday; only consulted by weekly rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Canonical patterns offered when a user turns on "repeat"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekdays,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekdays" => Ok(RecurrencePattern::Weekdays),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            other => Err(DomainError::InvalidRecurrence(format!(
                "Invalid repeat pattern '{}'. Valid options: daily, weekdays, weekly, monthly",
                other
            ))),
        }
    }
}

impl RecurrenceRule {
    /// Rule for `frequency` repeating every `interval` units, no days, no end
    pub fn new(frequency: RecurrenceFrequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    pub fn with_days(mut self, days_of_week: Vec<u8>) -> Self {
        self.days_of_week = days_of_week;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Reject rules a user shouldn't be able to save
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.interval == 0 {
            return Err(DomainError::InvalidRecurrence(
                "Interval must be at least 1".to_string()
            ));
        }
        if let Some(bad) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(DomainError::InvalidRecurrence(
                format!("Day of week must be 0-6 (0 = Sunday), got {}", bad)
            ));
        }
        if self.frequency == RecurrenceFrequency::Custom {
            return Err(DomainError::InvalidRecurrence(
                "Unrecognised recurrence frequency".to_string()
            ));
        }
        Ok(())
    }

    pub fn is_occurrence(&self, date: NaiveDate) -> bool {
        is_occurrence(date, self)
    }

    pub fn describe(&self) -> String {
        describe_recurrence(self)
    }
}

/// Check if a specific date matches a recurrence rule
///
/// Daily and monthly rules match every date: the interval only shapes the
/// forward walk in `next_occurrences`. Weekly rules match the listed days
/// and never match with an empty day list.
pub fn is_occurrence(date: NaiveDate, rule: &RecurrenceRule) -> bool {
    match rule.frequency {
        RecurrenceFrequency::Daily => true,
        RecurrenceFrequency::Weekly => rule.days_of_week.contains(&calendar::day_of_week(date)),
        RecurrenceFrequency::Monthly => true,
        RecurrenceFrequency::Custom => false,
    }
}

/// Generate up to `count` occurrence dates walking forward from `start`
///
/// Daily rules step `interval` days, weekly rules step one day at a time
/// (filtered by `days_of_week`), monthly rules step `interval` months.
/// The walk gives up after `count * 10` steps so rules that can never
/// match return early, and stops once the next date passes `end_date`.
pub fn next_occurrences(rule: &RecurrenceRule, start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count.min(64));
    if rule.frequency == RecurrenceFrequency::Custom {
        return dates;
    }

    let step = rule.interval.max(1);
    let max_iterations = count.saturating_mul(10);
    let mut current = start;
    let mut iterations = 0;

    while dates.len() < count && iterations < max_iterations {
        iterations += 1;

        if is_occurrence(current, rule) {
            dates.push(current);
        }

        let next = match rule.frequency {
            RecurrenceFrequency::Daily => calendar::add_days(current, step as i64),
            RecurrenceFrequency::Weekly => calendar::add_days(current, 1),
            RecurrenceFrequency::Monthly => calendar::add_months(current, step),
            RecurrenceFrequency::Custom => break,
        };
        if next == current {
            // pinned at the end of chrono's range
            break;
        }
        current = next;

        if rule.end_date.is_some_and(|end| current > end) {
            break;
        }
    }

    dates
}

/// Generate a human-readable description of a recurrence rule
pub fn describe_recurrence(rule: &RecurrenceRule) -> String {
    let interval = rule.interval;
    match rule.frequency {
        RecurrenceFrequency::Daily => {
            if interval == 1 {
                "Every day".to_string()
            } else {
                format!("Every {} days", interval)
            }
        }
        RecurrenceFrequency::Weekly => {
            let days: Vec<&str> = rule
                .days_of_week
                .iter()
                .filter_map(|d| calendar::day_name(*d))
                .collect();
            match (days.is_empty(), interval == 1) {
                (false, true) => format!("Every {}", days.join(", ")),
                (false, false) => format!("Every {} weeks on {}", interval, days.join(", ")),
                (true, true) => "Every week".to_string(),
                (true, false) => format!("Every {} weeks", interval),
            }
        }
        RecurrenceFrequency::Monthly => {
            if interval == 1 {
                "Every month".to_string()
            } else {
                format!("Every {} months", interval)
            }
        }
        RecurrenceFrequency::Custom => "Custom".to_string(),
    }
}

/// Create a default recurrence rule for a common pattern, anchored to today
pub fn create_recurrence_rule(pattern: RecurrencePattern) -> RecurrenceRule {
    create_recurrence_rule_on(pattern, calendar::today())
}

/// Create a default recurrence rule; `Weekly` repeats on `today`'s weekday
pub fn create_recurrence_rule_on(pattern: RecurrencePattern, today: NaiveDate) -> RecurrenceRule {
    match pattern {
        RecurrencePattern::Daily => RecurrenceRule::new(RecurrenceFrequency::Daily, 1),
        RecurrencePattern::Weekdays => {
            RecurrenceRule::new(RecurrenceFrequency::Weekly, 1).with_days(vec![1, 2, 3, 4, 5])
        }
        RecurrencePattern::Weekly => RecurrenceRule::new(RecurrenceFrequency::Weekly, 1)
            .with_days(vec![calendar::day_of_week(today)]),
        RecurrencePattern::Monthly => RecurrenceRule::new(RecurrenceFrequency::Monthly, 1),
    }
}
