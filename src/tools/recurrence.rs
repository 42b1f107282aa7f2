/// Tool for previewing a recurrence rule
///
/// This module implements the recurrence_preview MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::domain::{describe_recurrence, next_occurrences};
use crate::tools::{parse_date_arg, resolve_rule, ToolError, MAX_OCCURRENCES};

/// Parameters for previewing a recurrence rule
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecurrencePreviewParams {
    /// Rule as JSON: {"frequency": "weekly", "interval": 1, "days_of_week": [1, 3], "end_date": "2024-06-01"}
    pub rule: Option<serde_json::Value>,
    /// Or a named pattern: daily, weekdays, weekly, monthly
    pub pattern: Option<String>,
    /// First candidate day as YYYY-MM-DD (defaults to today)
    pub start: Option<String>,
    /// How many occurrences to list (defaults to the configured count, max 100)
    pub count: Option<u32>,
}

/// Response from a recurrence preview
#[derive(Debug, Serialize)]
pub struct RecurrencePreviewResponse {
    pub description: String,
    pub occurrences: Vec<NaiveDate>,
    pub message: String,
}

/// List the next occurrences of a rule
pub fn preview_recurrence(
    params: RecurrencePreviewParams,
    today: NaiveDate,
    default_count: u32,
) -> Result<RecurrencePreviewResponse, ToolError> {
    let rule = resolve_rule(params.rule, params.pattern.as_deref(), today)?
        .ok_or_else(|| ToolError::Validation("Provide either rule or pattern".to_string()))?;

    let start = parse_date_arg(params.start.as_deref(), today)?;
    let count = params.count.unwrap_or(default_count).min(MAX_OCCURRENCES) as usize;

    let description = describe_recurrence(&rule);
    let occurrences = next_occurrences(&rule, start, count);

    let message = if occurrences.is_empty() {
        format!("🔁 {}: no upcoming occurrences", description)
    } else {
        format!(
            "🔁 {}: {}",
            description,
            occurrences
                .iter()
                .map(|d| format!("{} {}", calendar::format_day_of_week(*d), calendar::format_date(*d)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    Ok(RecurrencePreviewResponse {
        description,
        occurrences,
        message,
    })
}
