/// Tasks that may repeat on a recurrence rule

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{next_occurrences, DomainError, RecurrenceRule, TaskId, UserId};

/// A to-do item, optionally repeating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTask {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    /// First (or only) day the task is due
    pub due_date: Option<NaiveDate>,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl RecurringTask {
    pub fn new(
        user_id: UserId,
        title: String,
        due_date: Option<NaiveDate>,
        recurrence_rule: Option<RecurrenceRule>,
    ) -> Result<Self, DomainError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation {
                message: "Task title cannot be empty".to_string()
            });
        }
        if trimmed.chars().count() > 200 {
            return Err(DomainError::Validation {
                message: "Task title cannot be longer than 200 characters".to_string()
            });
        }
        if let Some(ref rule) = recurrence_rule {
            rule.validate()?;
        }

        Ok(Self {
            id: TaskId::new(),
            user_id,
            title: trimmed.to_string(),
            due_date,
            recurrence_rule,
            is_completed: false,
            created_at: Utc::now(),
        })
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    /// Upcoming due dates on or after `from`
    ///
    /// The walk starts at the later of `from` and the task's own due date.
    /// A one-off task yields its due date if that hasn't passed.
    pub fn upcoming(&self, from: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let start = self.due_date.map_or(from, |due| due.max(from));
        match &self.recurrence_rule {
            Some(rule) => next_occurrences(rule, start, count),
            None => self
                .due_date
                .filter(|due| *due >= from && count > 0)
                .into_iter()
                .collect(),
        }
    }
}
