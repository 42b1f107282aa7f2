/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool. Frequency edits apply
/// retroactively: the whole history is re-scored under the new schedule.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitFrequency, HabitUpdate, UserId};
use crate::storage::PlannerStorage;
use crate::tools::{parse_habit_id, parse_time_arg, ToolError};

/// Parameters for updating a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub name: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    /// daily, weekdays, specific_days:1,3,5 or times_per_week:3
    pub frequency: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub target_per_day: Option<u32>,
    /// Reminder as HH:MM; an empty string clears it
    pub reminder_time: Option<String>,
    pub sort_order: Option<i32>,
    /// Re-activate (true) or pause (false)
    pub is_active: Option<bool>,
    /// Soft delete the habit; completions are kept
    #[serde(default)]
    pub deactivate: bool,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub habit_id: String,
    pub message: String,
}

/// Update a habit owned by `user_id`
pub fn update_habit<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    if params.deactivate {
        let habit = storage.get_habit(user_id, &habit_id)?;
        storage.deactivate_habit(user_id, &habit_id)?;
        return Ok(UpdateHabitResponse {
            success: true,
            habit_id: habit_id.to_string(),
            message: format!("⏸️ Deactivated habit '{}'. Its history is kept.", habit.name),
        });
    }

    let frequency = params
        .frequency
        .as_deref()
        .map(HabitFrequency::parse)
        .transpose()?;

    let reminder_time = match params.reminder_time.as_deref().map(str::trim) {
        Some("") => Some(None),
        Some(t) => Some(Some(parse_time_arg(t)?)),
        None => None,
    };

    let description = params
        .description
        .map(|d| if d.trim().is_empty() { None } else { Some(d) });

    let update = HabitUpdate {
        name: params.name,
        description,
        color: params.color,
        icon: params.icon,
        frequency,
        target_per_day: params.target_per_day,
        reminder_time,
        is_active: params.is_active,
        sort_order: params.sort_order,
    };

    let mut habit = storage.get_habit(user_id, &habit_id)?;
    habit.update(update)?;
    storage.update_habit(&habit)?;

    Ok(UpdateHabitResponse {
        success: true,
        habit_id: habit.id.to_string(),
        message: format!("✏️ Updated habit '{}' ({})", habit.name, habit.frequency.label()),
    })
}
