/// HabitCompletion records
///
/// A completion says "this habit was done on this calendar day". Records
/// are created and deleted by toggling; only `count` and `note` may be
/// edited in place.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{CompletionId, DomainError, HabitId, UserId};

/// Longest note a completion can carry
pub const MAX_NOTE_LEN: usize = 500;

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    /// Unique identifier for this completion
    pub id: CompletionId,
    /// Which habit this completion is for
    pub habit_id: HabitId,
    /// Who logged it
    pub user_id: UserId,
    /// Which calendar day was completed (no time component)
    pub completed_date: NaiveDate,
    /// How many times it was done that day, at least 1
    pub count: u32,
    /// Optional note about this completion
    pub note: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl HabitCompletion {
    /// Create a new single completion for `completed_date`
    pub fn new(habit_id: HabitId, user_id: UserId, completed_date: NaiveDate) -> Self {
        Self {
            id: CompletionId::new(),
            habit_id,
            user_id,
            completed_date,
            count: 1,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// Create a completion from existing data (used when loading from database)
    pub fn from_existing(
        id: CompletionId,
        habit_id: HabitId,
        user_id: UserId,
        completed_date: NaiveDate,
        count: u32,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            user_id,
            completed_date,
            count,
            note,
            created_at,
        }
    }

    /// Change the count and/or note, the only in-place edits allowed
    pub fn amend(&mut self, count: Option<u32>, note: Option<Option<String>>) -> Result<(), DomainError> {
        if let Some(count) = count {
            Self::validate_count(count)?;
        }
        if let Some(ref note) = note {
            Self::validate_note(note)?;
        }

        if let Some(count) = count {
            self.count = count;
        }
        if let Some(note) = note {
            self.note = note;
        }
        Ok(())
    }

    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    pub(crate) fn validate_count(count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidValue {
                message: "Completion count must be at least 1".to_string()
            });
        }
        Ok(())
    }

    pub(crate) fn validate_note(note: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = note {
            if text.chars().count() > MAX_NOTE_LEN {
                return Err(DomainError::InvalidValue {
                    message: format!("Notes cannot be longer than {} characters", MAX_NOTE_LEN)
                });
            }
        }
        Ok(())
    }
}
