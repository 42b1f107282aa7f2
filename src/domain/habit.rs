/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, along with validation and partial updates.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use crate::domain::{DomainError, HabitFrequency, HabitId, UserId};

pub const DEFAULT_COLOR: &str = "#6366F1";
pub const DEFAULT_ICON: &str = "circle";

/// A habit represents something the user wants to do regularly
///
/// The frequency lives on the habit itself and is always applied
/// retroactively: editing it changes how the whole history is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Owner of the habit
    pub user_id: UserId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Hex color, e.g. "#6366F1"
    pub color: String,
    pub icon: String,
    /// Which days the habit is expected
    pub frequency: HabitFrequency,
    /// How many completions make a day "done"
    pub target_per_day: u32,
    pub reminder_time: Option<NaiveTime>,
    /// Habits are deactivated, never hard-deleted
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial edit of a habit; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub frequency: Option<HabitFrequency>,
    pub target_per_day: Option<u32>,
    pub reminder_time: Option<Option<NaiveTime>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// Color, icon and daily target start at their defaults and can be
    /// changed through `update`.
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        frequency: HabitFrequency,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        frequency.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: HabitId::new(),
            user_id,
            name: name.trim().to_string(),
            description,
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
            frequency,
            target_per_day: 1,
            reminder_time: None,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update with validation
    ///
    /// All new values are checked before any of them is applied, so a
    /// failed update leaves the habit untouched.
    pub fn update(&mut self, update: HabitUpdate) -> Result<(), DomainError> {
        if let Some(ref name) = update.name {
            Self::validate_name(name)?;
        }
        if let Some(ref description) = update.description {
            Self::validate_description(description)?;
        }
        if let Some(ref color) = update.color {
            Self::validate_color(color)?;
        }
        if let Some(ref frequency) = update.frequency {
            frequency.validate()?;
        }
        if let Some(target) = update.target_per_day {
            if target == 0 {
                return Err(DomainError::InvalidValue {
                    message: "Target per day must be at least 1".to_string()
                });
            }
        }

        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(target) = update.target_per_day {
            self.target_per_day = target;
        }
        if let Some(reminder_time) = update.reminder_time {
            self.reminder_time = reminder_time;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Soft-deactivate; completions stay in place for analytics
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_color(color: &str) -> Result<(), DomainError> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(DomainError::InvalidValue {
                message: format!("Color must look like #RRGGBB, got '{}'", color)
            });
        }
        Ok(())
    }
}
