/// Storage layer for persisting planner data
///
/// This module handles all database operations using SQLite. The analytics
/// never touch it directly: callers fetch a consistent snapshot through
/// this interface and hand it to the pure functions in `domain`.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use chrono::NaiveDate;
use crate::domain::{
    CompletionId, Habit, HabitCompletion, HabitId, RecurringTask, UserId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Completion not found: {completion_id}")]
    CompletionNotFound { completion_id: String },

    #[error("Duplicate completion: habit {habit_id} already logged for date {date}")]
    DuplicateCompletion { habit_id: String, date: String },

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),
}

/// What a toggle did
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// No completion existed for that day; this one was created
    Added(HabitCompletion),
    /// A completion existed for that day and was deleted
    Removed(HabitCompletion),
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added(_))
    }
}

/// Trait defining the record-store interface the planner needs
///
/// Every read and write is scoped to the owning user.
pub trait PlannerStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get one of the user's habits by ID
    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Overwrite an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Soft delete a habit (mark as inactive)
    fn deactivate_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List the user's habits ordered by sort order, newest first within it
    fn list_habits(&self, user_id: &UserId, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    /// All of the user's completions with `start <= completed_date <= end`
    fn completions_in_range(
        &self,
        user_id: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitCompletion>, StorageError>;

    /// Every completion recorded for one habit
    fn completions_for_habit(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
    ) -> Result<Vec<HabitCompletion>, StorageError>;

    /// Create the completion for `date`, or delete it if it already exists
    fn toggle_completion(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<ToggleOutcome, StorageError> {
        self.toggle_completion_with(user_id, habit_id, date, None, None)
    }

    /// Like `toggle_completion`, but a newly created completion carries
    /// `count` and `note` in the same write
    fn toggle_completion_with(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: NaiveDate,
        count: Option<u32>,
        note: Option<String>,
    ) -> Result<ToggleOutcome, StorageError>;

    /// Edit a completion's count and/or note
    fn update_completion(
        &self,
        user_id: &UserId,
        completion_id: &CompletionId,
        count: Option<u32>,
        note: Option<Option<String>>,
    ) -> Result<HabitCompletion, StorageError>;

    /// Create a new task
    fn create_task(&self, task: &RecurringTask) -> Result<(), StorageError>;

    /// List the user's open (not completed) tasks
    fn list_open_tasks(&self, user_id: &UserId) -> Result<Vec<RecurringTask>, StorageError>;
}
