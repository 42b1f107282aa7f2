/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, HabitStats};
use crate::domain::UserId;
use crate::storage::PlannerStorage;
use crate::tools::ToolError;

/// Parameters for listing habits
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Show only active habits (default: true)
    pub active_only: Option<bool>,
    /// Sort by: name, streak, completion_rate or sort_order (default: sort_order)
    pub sort_by: Option<String>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    #[serde(flatten)]
    pub stats: HabitStats,
    pub is_active: bool,
}

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub active_habits: u32,
    pub avg_completion_rate: f64,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortBy {
    SortOrder,
    Name,
    Streak,
    CompletionRate,
}

impl SortBy {
    fn parse(value: Option<&str>) -> Result<Self, ToolError> {
        match value.map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("sort_order") => Ok(SortBy::SortOrder),
            Some("name") => Ok(SortBy::Name),
            Some("streak") => Ok(SortBy::Streak),
            Some("completion_rate") => Ok(SortBy::CompletionRate),
            Some(other) => Err(ToolError::Validation(format!(
                "Invalid sort '{}'. Valid options: name, streak, completion_rate, sort_order",
                other
            ))),
        }
    }
}

/// List the user's habits with their current statistics
pub fn list_habits<S: PlannerStorage>(
    storage: &S,
    analytics: &AnalyticsEngine,
    user_id: &UserId,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, ToolError> {
    let sort_by = SortBy::parse(params.sort_by.as_deref())?;
    let active_only = params.active_only.unwrap_or(true);

    let habits = storage.list_habits(user_id, active_only)?;

    let mut summaries = Vec::with_capacity(habits.len());
    for habit in &habits {
        let completions = storage.completions_for_habit(user_id, &habit.id)?;
        summaries.push(HabitSummary {
            stats: analytics.habit_stats(habit, &completions, today),
            is_active: habit.is_active,
        });
    }

    // Storage order is already sort_order
    match sort_by {
        SortBy::SortOrder => {}
        SortBy::Name => summaries.sort_by_key(|h| h.stats.name.to_lowercase()),
        SortBy::Streak => summaries.sort_by(|a, b| b.stats.current_streak.cmp(&a.stats.current_streak)),
        SortBy::CompletionRate => summaries.sort_by(|a, b| {
            b.stats.completion_rate.total_cmp(&a.stats.completion_rate)
        }),
    }

    let total_habits = summaries.len() as u32;
    let active_habits = summaries.iter().filter(|h| h.is_active).count() as u32;
    let avg_completion_rate = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|h| h.stats.completion_rate).sum::<f64>() / summaries.len() as f64
    };

    Ok(ListHabitsResponse {
        habits: summaries,
        summary: HabitListSummary {
            total_habits,
            active_habits,
            avg_completion_rate,
        },
    })
}
