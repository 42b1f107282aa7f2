/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitCompletion,
/// RecurringTask, TimeBlock), the schedule and recurrence rules, and the pure streak
/// calculations built on them.

pub mod types;
pub mod habit;
pub mod completion;
pub mod recurrence;
pub mod streak;
pub mod task;
pub mod time_block;

// Re-export public types for easy access
pub use types::*;
pub use habit::*;
pub use completion::*;
pub use recurrence::*;
pub use streak::*;
pub use task::*;
pub use time_block::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
