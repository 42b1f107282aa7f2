/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, HabitFrequency, HabitUpdate, UserId};
use crate::storage::PlannerStorage;
use crate::tools::{parse_time_arg, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// daily, weekdays, specific_days:1,3,5 (0=Sun) or times_per_week:3. Defaults to daily
    pub frequency: Option<String>,
    /// Hex color like #22C55E
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Completions per day that count as done (default 1)
    pub target_per_day: Option<u32>,
    /// Reminder time as HH:MM
    pub reminder_time: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: String,
    pub frequency: String,
    pub message: String,
}

/// Create a new habit for `user_id`
pub fn create_habit<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let frequency = match params.frequency.as_deref() {
        Some(f) if !f.trim().is_empty() => HabitFrequency::parse(f)?,
        _ => HabitFrequency::Daily,
    };

    let mut habit = Habit::new(user_id.clone(), params.name, params.description, frequency)?;

    let reminder_time = params
        .reminder_time
        .as_deref()
        .map(parse_time_arg)
        .transpose()?;

    // Everything not covered by the constructor goes through the validated update path
    habit.update(HabitUpdate {
        color: params.color,
        icon: params.icon,
        target_per_day: params.target_per_day,
        reminder_time: reminder_time.map(Some),
        ..HabitUpdate::default()
    })?;

    storage.create_habit(&habit)?;

    Ok(CreateHabitResponse {
        success: true,
        habit_id: habit.id.to_string(),
        frequency: habit.frequency.label(),
        message: format!(
            "✅ Created habit '{}' ({})! Ready to start your streak!",
            habit.name,
            habit.frequency.label()
        ),
    })
}
