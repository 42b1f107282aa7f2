/// Tool for checking a habit off (or un-checking it) for a day
///
/// This module implements the habit_toggle MCP tool. A habit has at most
/// one completion per day, so logging an already-logged day removes it.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::streak_message;
use crate::calendar;
use crate::domain::{calculate_streak_on, CompletionSet, HabitCompletion, UserId};
use crate::storage::PlannerStorage;
use crate::tools::{parse_date_arg, parse_habit_id, ToolError};

/// Parameters for toggling a habit completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to toggle as YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
    /// How many times it was done, when adding (default 1)
    pub count: Option<u32>,
    /// Optional note, when adding
    pub note: Option<String>,
}

/// Response from toggling a habit
#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    /// Whether the day is now marked complete
    pub completed: bool,
    pub date: NaiveDate,
    pub current_streak: u32,
    pub message: String,
}

/// Toggle the completion of a habit for a day
pub fn toggle_habit<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: ToggleHabitParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let date = parse_date_arg(params.date.as_deref(), today)?;

    if date > today {
        return Err(ToolError::Validation(format!(
            "Cannot log {} ahead of time ({})",
            calendar::format_date(date),
            calendar::format_date(today)
        )));
    }

    // Validate before touching storage
    if let Some(count) = params.count {
        HabitCompletion::validate_count(count)?;
    }
    HabitCompletion::validate_note(&params.note)?;

    let habit = storage.get_habit(user_id, &habit_id)?;
    let outcome = storage.toggle_completion_with(user_id, &habit_id, date, params.count, params.note)?;

    let completions = storage.completions_for_habit(user_id, &habit_id)?;
    let set = CompletionSet::from_completions(&completions);
    let current_streak = calculate_streak_on(&set, &habit.frequency, today);

    let message = if outcome.is_added() {
        format!(
            "✅ Checked off '{}' for {}. Current streak: {} days. {}",
            habit.name,
            calendar::format_date(date),
            current_streak,
            streak_message(current_streak)
        )
    } else {
        format!(
            "↩️ Un-checked '{}' for {}. Current streak: {} days.",
            habit.name,
            calendar::format_date(date),
            current_streak
        )
    };

    Ok(ToggleHabitResponse {
        completed: outcome.is_added(),
        date,
        current_streak,
        message,
    })
}
