/// Tools for tasks with optional recurrence
///
/// This module implements the task_create and task_upcoming MCP tools.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::domain::{describe_recurrence, RecurringTask, UserId};
use crate::storage::PlannerStorage;
use crate::tools::{parse_date_arg, resolve_rule, ToolError, MAX_OCCURRENCES};

/// Parameters for creating a task
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    /// What needs doing
    pub title: String,
    /// First due date as YYYY-MM-DD (optional)
    pub due_date: Option<String>,
    /// Repeat rule as JSON: {"frequency": "weekly", "interval": 1, "days_of_week": [1, 3]}
    pub rule: Option<serde_json::Value>,
    /// Or a named repeat pattern: daily, weekdays, weekly, monthly
    pub repeat: Option<String>,
}

/// Response from creating a task
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub success: bool,
    pub task_id: String,
    pub repeats: Option<String>,
    pub message: String,
}

/// Parameters for listing upcoming task dates
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpcomingTasksParams {
    /// First day to consider as YYYY-MM-DD (defaults to today)
    pub from: Option<String>,
    /// Occurrences per recurring task (defaults to the configured count, max 100)
    pub count: Option<u32>,
}

/// A task with its upcoming due dates
#[derive(Debug, Serialize)]
pub struct UpcomingTask {
    pub task_id: String,
    pub title: String,
    pub repeats: Option<String>,
    pub dates: Vec<NaiveDate>,
}

/// Response from listing upcoming tasks
#[derive(Debug, Serialize)]
pub struct UpcomingTasksResponse {
    pub tasks: Vec<UpcomingTask>,
    pub message: String,
}

/// Create a task, optionally repeating
///
/// A weekly `repeat` pattern repeats on the due date's weekday, or today's
/// when there is no due date.
pub fn create_task<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: CreateTaskParams,
    today: NaiveDate,
) -> Result<CreateTaskResponse, ToolError> {
    let due_date = match params.due_date.as_deref() {
        Some(d) => Some(parse_date_arg(Some(d), today)?),
        None => None,
    };
    let anchor = due_date.unwrap_or(today);
    let rule = resolve_rule(params.rule, params.repeat.as_deref(), anchor)?;

    let task = RecurringTask::new(user_id.clone(), params.title, due_date, rule)?;
    storage.create_task(&task)?;

    let repeats = task.recurrence_rule.as_ref().map(describe_recurrence);
    let mut message = format!("📝 Created task '{}'", task.title);
    if let Some(due) = task.due_date {
        message.push_str(&format!(", due {}", calendar::format_date(due)));
    }
    if let Some(ref label) = repeats {
        message.push_str(&format!(", repeats {}", label.to_lowercase()));
    }

    Ok(CreateTaskResponse {
        success: true,
        task_id: task.id.to_string(),
        repeats,
        message,
    })
}

/// List open tasks with their next due dates
///
/// Tasks with no date on or after `from` are left out.
pub fn upcoming_tasks<S: PlannerStorage>(
    storage: &S,
    user_id: &UserId,
    params: UpcomingTasksParams,
    today: NaiveDate,
    default_count: u32,
) -> Result<UpcomingTasksResponse, ToolError> {
    let from = parse_date_arg(params.from.as_deref(), today)?;
    let count = params.count.unwrap_or(default_count).min(MAX_OCCURRENCES) as usize;

    let tasks: Vec<UpcomingTask> = storage
        .list_open_tasks(user_id)?
        .into_iter()
        .filter_map(|task| {
            let dates = task.upcoming(from, count);
            if dates.is_empty() {
                return None;
            }
            Some(UpcomingTask {
                task_id: task.id.to_string(),
                repeats: task.recurrence_rule.as_ref().map(describe_recurrence),
                title: task.title,
                dates,
            })
        })
        .collect();

    let message = if tasks.is_empty() {
        format!("Nothing scheduled from {}.", calendar::format_date(from))
    } else {
        tasks
            .iter()
            .map(|t| {
                format!(
                    "📌 {}{}\n   {}",
                    t.title,
                    t.repeats.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default(),
                    t.dates
                        .iter()
                        .map(|d| calendar::format_date_short(*d))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    Ok(UpcomingTasksResponse { tasks, message })
}
