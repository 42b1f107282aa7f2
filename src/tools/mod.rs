/// MCP tools for habit and task management
///
/// This module contains all the MCP tools that external clients can call
/// to interact with the planner. Each tool takes its parameter struct,
/// the storage, the calling user and the day it should treat as "today".

pub mod create;
pub mod update;
pub mod list;
pub mod toggle;
pub mod status;
pub mod schedule;
pub mod recurrence;
pub mod task;

pub use create::*;
pub use update::*;
pub use list::*;
pub use toggle::*;
pub use status::*;
pub use schedule::*;
pub use recurrence::*;
pub use task::*;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::calendar;
use crate::domain::{DomainError, HabitId, RecurrencePattern, RecurrenceRule, create_recurrence_rule_on};
use crate::storage::StorageError;

/// Upper bound on how many dates a single rule is expanded to per call
pub(crate) const MAX_OCCURRENCES: u32 = 100;

/// Errors a tool call can fail with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parse an optional `YYYY-MM-DD` argument, falling back to `today`
pub(crate) fn parse_date_arg(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => calendar::parse_iso(s)
            .map_err(|_| ToolError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
        None => Ok(today),
    }
}

pub(crate) fn parse_habit_id(value: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(value.trim())
        .map_err(|_| ToolError::Validation(format!("Invalid habit ID '{}'", value)))
}

/// Parse `HH:MM` (24h)
pub(crate) fn parse_time_arg(value: &str) -> Result<NaiveTime, ToolError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ToolError::Validation(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Resolve a rule from either an explicit JSON rule or a pattern name
///
/// An explicit rule wins when both are given. `Ok(None)` means neither was.
pub(crate) fn resolve_rule(
    rule: Option<serde_json::Value>,
    pattern: Option<&str>,
    today: NaiveDate,
) -> Result<Option<RecurrenceRule>, ToolError> {
    if let Some(value) = rule {
        let rule: RecurrenceRule = serde_json::from_value(value)
            .map_err(|e| ToolError::Validation(format!("Invalid recurrence rule: {}", e)))?;
        return Ok(Some(rule));
    }
    match pattern {
        Some(p) => Ok(Some(create_recurrence_rule_on(RecurrencePattern::parse(p)?, today))),
        None => Ok(None),
    }
}
