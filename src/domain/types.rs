/// Core types and enums used throughout the domain layer
///
/// This module defines the ID newtypes and the HabitFrequency schedule that
/// Habit, HabitCompletion and the streak analytics are built on.

use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::calendar;
use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a completion ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a habit completion record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionId(pub Uuid);

impl CompletionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for CompletionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompletionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a (possibly recurring) task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a calendar time block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBlockId(pub Uuid);

impl TimeBlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimeBlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimeBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owner of habits, completions and tasks
///
/// Users come from the (external) auth layer, so this is an opaque string
/// rather than something we generate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_times_per_week() -> u8 {
    1
}

/// How often a habit should be performed
///
/// Stored as tagged JSON, e.g. `{"type":"specific_days","days_of_week":[1,3,5]}`.
/// Day numbers use 0=Sunday .. 6=Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitFrequency {
    /// Every single day
    Daily,
    /// Monday through Friday only
    Weekdays,
    /// Specific days of the week (e.g. Monday, Wednesday, Friday)
    SpecificDays {
        #[serde(default)]
        days_of_week: Vec<u8>,
    },
    /// A number of completions per week, on any days
    TimesPerWeek {
        #[serde(default = "default_times_per_week")]
        times_per_week: u8,
    },
    /// A stored tag this version doesn't recognise
    #[serde(other)]
    Unknown,
}

impl Default for HabitFrequency {
    fn default() -> Self {
        HabitFrequency::Daily
    }
}

impl HabitFrequency {
    /// Check if this frequency expects the habit to be done on a given date
    ///
    /// Only the weekday of `date` matters. `TimesPerWeek` treats every day
    /// as schedulable; the weekly quota is evaluated separately by
    /// `weekly_quota_streak_on`. Unrecognised frequencies fail open.
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        let day = calendar::day_of_week(date);
        match self {
            HabitFrequency::Daily => true,
            HabitFrequency::Weekdays => (1..=5).contains(&day),
            HabitFrequency::SpecificDays { days_of_week } => days_of_week.contains(&day),
            HabitFrequency::TimesPerWeek { .. } => true,
            HabitFrequency::Unknown => true,
        }
    }

    /// Validate that a frequency value is reasonable for a new or edited habit
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            HabitFrequency::SpecificDays { days_of_week } => {
                if days_of_week.is_empty() {
                    return Err(DomainError::InvalidFrequency(
                        "Specific days frequency must include at least one day".to_string()
                    ));
                }
                if let Some(bad) = days_of_week.iter().find(|d| **d > 6) {
                    return Err(DomainError::InvalidFrequency(
                        format!("Day of week must be 0-6 (0 = Sunday), got {}", bad)
                    ));
                }
            }
            HabitFrequency::TimesPerWeek { times_per_week } => {
                if *times_per_week == 0 || *times_per_week > 7 {
                    return Err(DomainError::InvalidFrequency(
                        format!("Times per week must be 1-7, got {}", times_per_week)
                    ));
                }
            }
            HabitFrequency::Unknown => {
                return Err(DomainError::InvalidFrequency(
                    "Unrecognised frequency type".to_string()
                ));
            }
            HabitFrequency::Daily | HabitFrequency::Weekdays => {}
        }
        Ok(())
    }

    /// Parse the compact text form used by tool arguments
    ///
    /// Accepts `daily`, `weekdays`, `specific_days:1,3,5` and `times_per_week:3`.
    /// A JSON object in the stored shape is accepted as well.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();
        if input.starts_with('{') {
            let frequency: HabitFrequency = serde_json::from_str(input)
                .map_err(|e| DomainError::InvalidFrequency(e.to_string()))?;
            frequency.validate()?;
            return Ok(frequency);
        }

        let lowered = input.to_lowercase();
        let (kind, arg) = match lowered.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
            None => (lowered.as_str(), None),
        };

        let frequency = match (kind, arg) {
            ("daily", None) => HabitFrequency::Daily,
            ("weekdays", None) => HabitFrequency::Weekdays,
            ("specific_days", Some(days)) => {
                let days_of_week = days
                    .split(',')
                    .map(|d| d.trim().parse::<u8>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| DomainError::InvalidFrequency(
                        format!("Invalid day list '{}', expected numbers like 1,3,5", days)
                    ))?;
                HabitFrequency::SpecificDays { days_of_week }
            }
            ("times_per_week", Some(count)) => {
                let times_per_week = count.parse::<u8>().map_err(|_| {
                    DomainError::InvalidFrequency(format!("Invalid weekly count '{}'", count))
                })?;
                HabitFrequency::TimesPerWeek { times_per_week }
            }
            _ => {
                return Err(DomainError::InvalidFrequency(format!(
                    "Invalid frequency '{}'. Valid options: daily, weekdays, specific_days:1,3,5, times_per_week:3",
                    input
                )));
            }
        };

        frequency.validate()?;
        Ok(frequency)
    }

    /// Human-readable label for listings
    pub fn label(&self) -> String {
        match self {
            HabitFrequency::Daily => "Every day".to_string(),
            HabitFrequency::Weekdays => "Weekdays (Mon–Fri)".to_string(),
            HabitFrequency::SpecificDays { days_of_week } => {
                let names: Vec<&str> = days_of_week
                    .iter()
                    .filter_map(|d| calendar::day_name(*d))
                    .collect();
                if names.is_empty() {
                    "No days selected".to_string()
                } else {
                    names.join(", ")
                }
            }
            HabitFrequency::TimesPerWeek { times_per_week } => {
                format!("{}× per week", times_per_week)
            }
            HabitFrequency::Unknown => "Custom".to_string(),
        }
    }
}

/// Free-function form of `HabitFrequency::is_scheduled`
pub fn is_day_scheduled(date: NaiveDate, frequency: &HabitFrequency) -> bool {
    frequency.is_scheduled(date)
}
