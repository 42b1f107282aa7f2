/// Tool for checking which days a habit is due
///
/// This module implements the schedule_check MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::domain::{is_day_scheduled, HabitFrequency, UserId};
use crate::storage::PlannerStorage;
use crate::tools::{parse_date_arg, parse_habit_id, ToolError};

const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 366;

/// Parameters for a schedule check
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScheduleCheckParams {
    /// Check an existing habit's schedule
    pub habit_id: Option<String>,
    /// Or check a frequency directly: daily, weekdays, specific_days:1,3,5, times_per_week:3
    pub frequency: Option<String>,
    /// First day as YYYY-MM-DD (defaults to today)
    pub start: Option<String>,
    /// Number of days to check (default 7, max 366)
    pub days: Option<u32>,
}

/// One day of the schedule
#[derive(Debug, Serialize)]
pub struct ScheduledDay {
    pub date: NaiveDate,
    pub day: &'static str,
    pub scheduled: bool,
}

/// Response from a schedule check
#[derive(Debug, Serialize)]
pub struct ScheduleCheckResponse {
    pub frequency: String,
    pub days: Vec<ScheduledDay>,
    pub message: String,
}

/// Evaluate a habit schedule over a run of days
pub fn check_schedule<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: ScheduleCheckParams,
    today: NaiveDate,
) -> Result<ScheduleCheckResponse, ToolError> {
    let frequency = match (params.habit_id.as_deref(), params.frequency.as_deref()) {
        (Some(id), _) => storage.get_habit(user_id, &parse_habit_id(id)?)?.frequency,
        (None, Some(f)) => HabitFrequency::parse(f)?,
        (None, None) => {
            return Err(ToolError::Validation(
                "Provide either habit_id or frequency".to_string(),
            ));
        }
    };

    let start = parse_date_arg(params.start.as_deref(), today)?;
    let count = params.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);
    let end = calendar::add_days(start, count as i64 - 1);

    let days: Vec<ScheduledDay> = calendar::days_between(start, end)
        .map(|date| ScheduledDay {
            date,
            day: calendar::DAY_NAMES[calendar::day_of_week(date) as usize],
            scheduled: is_day_scheduled(date, &frequency),
        })
        .collect();

    let due: Vec<String> = days
        .iter()
        .filter(|d| d.scheduled)
        .map(|d| format!("{} {}", d.day, calendar::format_date_short(d.date)))
        .collect();

    let message = format!(
        "📅 {}: due on {} of {} days{}{}",
        frequency.label(),
        due.len(),
        days.len(),
        if due.is_empty() { "" } else { "\n   " },
        due.join(", ")
    );

    Ok(ScheduleCheckResponse {
        frequency: frequency.label(),
        days,
        message,
    })
}
