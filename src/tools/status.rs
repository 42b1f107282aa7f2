/// Tool for checking habit status and streaks
///
/// This module implements the habit_status MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, HabitStats};
use crate::calendar;
use crate::domain::UserId;
use crate::storage::PlannerStorage;
use crate::tools::{parse_habit_id, ToolError};

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a specific habit (shows all active habits if omitted)
    pub habit_id: Option<String>,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub date: NaiveDate,
    pub habits: Vec<HabitStats>,
    pub insights: Vec<String>,
    pub message: String,
}

/// Get streaks, rates and insights for one or all of the user's habits
pub fn get_habit_status<S: PlannerStorage>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    params: StatusParams,
    today: NaiveDate,
) -> Result<StatusResponse, ToolError> {
    let habits = match params.habit_id {
        Some(ref id) => vec![storage.get_habit(user_id, &parse_habit_id(id)?)?],
        None => storage.list_habits(user_id, true)?,
    };

    let mut stats = Vec::with_capacity(habits.len());
    for habit in &habits {
        let completions = storage.completions_for_habit(user_id, &habit.id)?;
        stats.push(analytics.habit_stats(habit, &completions, today));
    }

    let insights = analytics.insights(&stats);

    let summary = if stats.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let on_streak = stats.iter().filter(|s| s.current_streak > 0).count();
        format!(
            "📊 Status for {}: {} of {} habits on a streak",
            calendar::format_date(today),
            on_streak,
            stats.len()
        )
    };

    let details = stats
        .iter()
        .map(|s| {
            let mut line = format!(
                "🎯 {} ({})\n   Current streak: {} days | Best: {} days | Rate ({}d): {:.1}%",
                s.name,
                s.frequency,
                s.current_streak,
                s.best_streak,
                analytics.rate_window_days(),
                s.completion_rate * 100.0
            );
            if let Some(ref quota) = s.weekly_quota {
                line.push_str(&format!(
                    "\n   This week: {}/{} | Weeks on target: {}",
                    quota.done_this_week, quota.target, quota.week_streak
                ));
            }
            if let Some(last) = s.last_completed {
                line.push_str(&format!("\n   Last completed: {}", calendar::format_date(last)));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut message = summary;
    if !details.is_empty() {
        message.push_str("\n\n");
        message.push_str(&details);
    }
    if !insights.is_empty() {
        message.push_str("\n\n💡 ");
        message.push_str(&insights.join("\n💡 "));
    }

    Ok(StatusResponse {
        date: today,
        habits: stats,
        insights,
        message,
    })
}
