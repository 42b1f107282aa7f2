/// SQLite implementation of the planner storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits, completions and tasks. Frequencies and recurrence
/// rules are stored as JSON text in the same shape the wire format uses.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{
    CompletionId, Habit, HabitCompletion, HabitFrequency, HabitId, RecurrenceFrequency,
    RecurrenceRule, RecurringTask, TaskId, UserId,
};
use crate::storage::{migrations, PlannerStorage, StorageError, ToggleOutcome};

const HABIT_COLUMNS: &str = "id, user_id, name, description, color, icon, frequency, \
     target_per_day, reminder_time, is_active, sort_order, created_at, updated_at";

const COMPLETION_COLUMNS: &str = "id, habit_id, user_id, completed_date, count, note, created_at";

const TASK_COLUMNS: &str = "id, user_id, title, due_date, recurrence_rule, is_completed, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the PlannerStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring the schema up to date
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Throwaway database, mostly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;
        Ok(Self { conn })
    }

    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let id: String = row.get(0)?;
        let frequency_json: String = row.get(6)?;

        Ok(Habit {
            id: HabitId::from_string(&id).map_err(|e| conversion_error(0, e))?,
            user_id: UserId::new(row.get::<_, String>(1)?),
            name: row.get(2)?,
            description: row.get(3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            frequency: decode_frequency(&id, &frequency_json),
            target_per_day: row.get(7)?,
            reminder_time: row.get::<_, Option<NaiveTime>>(8)?,
            is_active: row.get(9)?,
            sort_order: row.get(10)?,
            created_at: row.get::<_, DateTime<Utc>>(11)?,
            updated_at: row.get::<_, DateTime<Utc>>(12)?,
        })
    }

    fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<HabitCompletion> {
        let id: String = row.get(0)?;
        let habit_id: String = row.get(1)?;

        Ok(HabitCompletion::from_existing(
            CompletionId::from_string(&id).map_err(|e| conversion_error(0, e))?,
            HabitId::from_string(&habit_id).map_err(|e| conversion_error(1, e))?,
            UserId::new(row.get::<_, String>(2)?),
            row.get::<_, NaiveDate>(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get::<_, DateTime<Utc>>(6)?,
        ))
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<RecurringTask> {
        let id: String = row.get(0)?;
        let rule_json: Option<String> = row.get(4)?;
        let recurrence_rule = rule_json.map(|json| decode_rule(&id, &json));

        Ok(RecurringTask {
            id: TaskId::from_string(&id).map_err(|e| conversion_error(0, e))?,
            user_id: UserId::new(row.get::<_, String>(1)?),
            title: row.get(2)?,
            due_date: row.get::<_, Option<NaiveDate>>(3)?,
            recurrence_rule,
            is_completed: row.get(5)?,
            created_at: row.get::<_, DateTime<Utc>>(6)?,
        })
    }

    fn find_completion(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<HabitCompletion>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_completions WHERE habit_id = ?1 AND completed_date = ?2",
            COMPLETION_COLUMNS
        );
        let completion = self
            .conn
            .query_row(&sql, params![habit_id.to_string(), date], Self::completion_from_row)
            .optional()?;
        Ok(completion)
    }
}

/// Stored frequencies that can't be decoded fail open to "always scheduled"
fn decode_frequency(habit_id: &str, json: &str) -> HabitFrequency {
    match serde_json::from_str(json) {
        Ok(frequency) => frequency,
        Err(e) => {
            tracing::warn!("Habit {} has an unreadable frequency ({}), treating it as unknown", habit_id, e);
            HabitFrequency::Unknown
        }
    }
}

/// Stored rules that can't be decoded fail closed to a rule that never matches
fn decode_rule(task_id: &str, json: &str) -> RecurrenceRule {
    match serde_json::from_str(json) {
        Ok(rule) => rule,
        Err(e) => {
            tracing::warn!("Task {} has an unreadable recurrence rule ({}), treating it as custom", task_id, e);
            RecurrenceRule::new(RecurrenceFrequency::Custom, 1)
        }
    }
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

impl PlannerStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let frequency_json = serde_json::to_string(&habit.frequency)?;

        self.conn.execute(
            "INSERT INTO habits (
                id, user_id, name, description, color, icon, frequency,
                target_per_day, reminder_time, is_active, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                habit.id.to_string(),
                habit.user_id.as_str(),
                habit.name,
                habit.description,
                habit.color,
                habit.icon,
                frequency_json,
                habit.target_per_day,
                habit.reminder_time,
                habit.is_active,
                habit.sort_order,
                habit.created_at,
                habit.updated_at,
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS);
        let habit = self
            .conn
            .query_row(&sql, params![habit_id.to_string(), user_id.as_str()], Self::habit_from_row)
            .optional()?;

        habit.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let frequency_json = serde_json::to_string(&habit.frequency)?;

        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?3,
                description = ?4,
                color = ?5,
                icon = ?6,
                frequency = ?7,
                target_per_day = ?8,
                reminder_time = ?9,
                is_active = ?10,
                sort_order = ?11,
                updated_at = ?12
             WHERE id = ?1 AND user_id = ?2",
            params![
                habit.id.to_string(),
                habit.user_id.as_str(),
                habit.name,
                habit.description,
                habit.color,
                habit.icon,
                frequency_json,
                habit.target_per_day,
                habit.reminder_time,
                habit.is_active,
                habit.sort_order,
                habit.updated_at,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn deactivate_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET is_active = 0, updated_at = ?3 WHERE id = ?1 AND user_id = ?2",
            params![habit_id.to_string(), user_id.as_str(), Utc::now()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deactivated habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self, user_id: &UserId, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits WHERE user_id = ?1", HABIT_COLUMNS);
        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY sort_order ASC, created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt
            .query_map(params![user_id.as_str()], Self::habit_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(habits)
    }

    fn completions_in_range(
        &self,
        user_id: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitCompletion>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_completions
             WHERE user_id = ?1 AND completed_date BETWEEN ?2 AND ?3
             ORDER BY completed_date ASC",
            COMPLETION_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let completions = stmt
            .query_map(params![user_id.as_str(), start, end], Self::completion_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(
            "Fetched {} completions for {} between {} and {}",
            completions.len(), user_id, start, end
        );
        Ok(completions)
    }

    fn completions_for_habit(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
    ) -> Result<Vec<HabitCompletion>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_completions
             WHERE user_id = ?1 AND habit_id = ?2
             ORDER BY completed_date ASC",
            COMPLETION_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let completions = stmt
            .query_map(params![user_id.as_str(), habit_id.to_string()], Self::completion_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(completions)
    }

    fn toggle_completion_with(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: NaiveDate,
        count: Option<u32>,
        note: Option<String>,
    ) -> Result<ToggleOutcome, StorageError> {
        // Ownership check doubles as the existence check
        self.get_habit(user_id, habit_id)?;

        let tx = self.conn.unchecked_transaction()?;

        let outcome = match self.find_completion(habit_id, date)? {
            Some(existing) => {
                tx.execute(
                    "DELETE FROM habit_completions WHERE id = ?1 AND user_id = ?2",
                    params![existing.id.to_string(), user_id.as_str()],
                )?;
                tracing::debug!("Removed completion of {} on {}", habit_id, date);
                ToggleOutcome::Removed(existing)
            }
            None => {
                let mut completion = HabitCompletion::new(habit_id.clone(), user_id.clone(), date);
                completion.amend(count, note.map(Some))?;
                tx.execute(
                    "INSERT INTO habit_completions (
                        id, habit_id, user_id, completed_date, count, note, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        completion.id.to_string(),
                        completion.habit_id.to_string(),
                        completion.user_id.as_str(),
                        completion.completed_date,
                        completion.count,
                        completion.note,
                        completion.created_at,
                    ],
                ).map_err(|e| match e {
                    rusqlite::Error::SqliteFailure(ref err, _)
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        StorageError::DuplicateCompletion {
                            habit_id: habit_id.to_string(),
                            date: date.to_string(),
                        }
                    }
                    other => StorageError::Query(other),
                })?;
                tracing::debug!("Added completion of {} on {}", habit_id, date);
                ToggleOutcome::Added(completion)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn update_completion(
        &self,
        user_id: &UserId,
        completion_id: &CompletionId,
        count: Option<u32>,
        note: Option<Option<String>>,
    ) -> Result<HabitCompletion, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_completions WHERE id = ?1 AND user_id = ?2",
            COMPLETION_COLUMNS
        );
        let mut completion = self
            .conn
            .query_row(&sql, params![completion_id.to_string(), user_id.as_str()], Self::completion_from_row)
            .optional()?
            .ok_or_else(|| StorageError::CompletionNotFound {
                completion_id: completion_id.to_string(),
            })?;

        completion.amend(count, note)?;

        self.conn.execute(
            "UPDATE habit_completions SET count = ?2, note = ?3 WHERE id = ?1",
            params![completion.id.to_string(), completion.count, completion.note],
        )?;

        Ok(completion)
    }

    fn create_task(&self, task: &RecurringTask) -> Result<(), StorageError> {
        let rule_json = task
            .recurrence_rule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id, user_id, title, due_date, recurrence_rule, is_completed, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id.to_string(),
                task.user_id.as_str(),
                task.title,
                task.due_date,
                rule_json,
                task.is_completed,
                task.created_at,
            ],
        )?;

        tracing::debug!("Created task: {} ({})", task.title, task.id);
        Ok(())
    }

    fn list_open_tasks(&self, user_id: &UserId) -> Result<Vec<RecurringTask>, StorageError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND is_completed = 0
             ORDER BY due_date IS NULL, due_date ASC, created_at ASC",
            TASK_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params![user_id.as_str()], Self::task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn storage_with_habit(frequency: HabitFrequency) -> (SqliteStorage, Habit) {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new(UserId::new("u1"), "Meditate".to_string(), None, frequency).unwrap();
        storage.create_habit(&habit).unwrap();
        (storage, habit)
    }

    #[test]
    fn test_habit_round_trip() {
        let (storage, habit) = storage_with_habit(HabitFrequency::SpecificDays { days_of_week: vec![1, 3] });
        let loaded = storage.get_habit(&habit.user_id, &habit.id).unwrap();
        assert_eq!(loaded.name, habit.name);
        assert_eq!(loaded.frequency, habit.frequency);
        assert!(loaded.is_active);
    }

    #[test]
    fn test_habits_are_scoped_to_user() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        let other = UserId::new("u2");

        assert!(matches!(
            storage.get_habit(&other, &habit.id),
            Err(StorageError::HabitNotFound { .. })
        ));
        assert!(storage.list_habits(&other, false).unwrap().is_empty());
        assert!(storage.toggle_completion(&other, &habit.id, date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        let day = date(2024, 3, 15);

        let first = storage.toggle_completion(&habit.user_id, &habit.id, day).unwrap();
        assert!(first.is_added());
        assert_eq!(storage.completions_for_habit(&habit.user_id, &habit.id).unwrap().len(), 1);

        let second = storage.toggle_completion(&habit.user_id, &habit.id, day).unwrap();
        assert!(!second.is_added());
        assert!(storage.completions_for_habit(&habit.user_id, &habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_with_details_writes_once() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        let day = date(2024, 3, 15);

        let outcome = storage
            .toggle_completion_with(&habit.user_id, &habit.id, day, Some(4), Some("before work".to_string()))
            .unwrap();
        assert!(outcome.is_added());

        let stored = storage.completions_for_habit(&habit.user_id, &habit.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].count, 4);
        assert_eq!(stored[0].note.as_deref(), Some("before work"));

        // A rejected count leaves no completion behind
        storage.toggle_completion(&habit.user_id, &habit.id, day).unwrap();
        assert!(storage
            .toggle_completion_with(&habit.user_id, &habit.id, day, Some(0), None)
            .is_err());
        assert!(storage.completions_for_habit(&habit.user_id, &habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_completions_in_range_is_inclusive() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        for d in [1, 2, 3, 10] {
            storage.toggle_completion(&habit.user_id, &habit.id, date(2024, 3, d)).unwrap();
        }

        let in_range = storage
            .completions_in_range(&habit.user_id, date(2024, 3, 2), date(2024, 3, 10))
            .unwrap();
        let days: Vec<_> = in_range.iter().map(|c| c.completed_date).collect();
        assert_eq!(days, vec![date(2024, 3, 2), date(2024, 3, 3), date(2024, 3, 10)]);
    }

    #[test]
    fn test_update_completion() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        let ToggleOutcome::Added(completion) = storage
            .toggle_completion(&habit.user_id, &habit.id, date(2024, 3, 15))
            .unwrap()
        else {
            panic!("expected a new completion");
        };

        let updated = storage
            .update_completion(&habit.user_id, &completion.id, Some(3), Some(Some("3 sets".to_string())))
            .unwrap();
        assert_eq!(updated.count, 3);

        let stored = storage.completions_for_habit(&habit.user_id, &habit.id).unwrap();
        assert_eq!(stored[0].count, 3);
        assert_eq!(stored[0].note.as_deref(), Some("3 sets"));

        assert!(storage
            .update_completion(&habit.user_id, &completion.id, Some(0), None)
            .is_err());
    }

    #[test]
    fn test_deactivate_hides_from_active_list() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        storage.deactivate_habit(&habit.user_id, &habit.id).unwrap();

        assert!(storage.list_habits(&habit.user_id, true).unwrap().is_empty());
        let all = storage.list_habits(&habit.user_id, false).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);
    }

    #[test]
    fn test_unreadable_frequency_fails_open() {
        let (storage, habit) = storage_with_habit(HabitFrequency::Daily);
        storage.conn.execute(
            "UPDATE habits SET frequency = 'not json' WHERE id = ?1",
            params![habit.id.to_string()],
        ).unwrap();

        let loaded = storage.get_habit(&habit.user_id, &habit.id).unwrap();
        assert_eq!(loaded.frequency, HabitFrequency::Unknown);
        assert!(loaded.frequency.is_scheduled(date(2024, 3, 17)));
    }

    #[test]
    fn test_unreadable_rule_does_not_hide_other_tasks() {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = UserId::new("u1");
        let daily = RecurrenceRule::new(RecurrenceFrequency::Daily, 1);
        let broken = RecurringTask::new(user.clone(), "Broken".to_string(), None, Some(daily.clone())).unwrap();
        let fine = RecurringTask::new(user.clone(), "Fine".to_string(), None, Some(daily.clone())).unwrap();
        storage.create_task(&broken).unwrap();
        storage.create_task(&fine).unwrap();

        storage.conn.execute(
            "UPDATE tasks SET recurrence_rule = '{\"frequency\":' WHERE id = ?1",
            params![broken.id.to_string()],
        ).unwrap();

        let tasks = storage.list_open_tasks(&user).unwrap();
        assert_eq!(tasks.len(), 2);
        let loaded = tasks.iter().find(|t| t.id == broken.id).unwrap();
        assert_eq!(loaded.recurrence_rule.as_ref().map(|r| r.frequency), Some(RecurrenceFrequency::Custom));
        let other = tasks.iter().find(|t| t.id == fine.id).unwrap();
        assert_eq!(other.recurrence_rule, Some(daily));
    }

    #[test]
    fn test_task_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        let rule = crate::domain::create_recurrence_rule_on(
            crate::domain::RecurrencePattern::Weekdays,
            date(2024, 3, 1),
        );
        let task = RecurringTask::new(
            UserId::new("u1"),
            "Standup notes".to_string(),
            Some(date(2024, 3, 1)),
            Some(rule.clone()),
        ).unwrap();
        storage.create_task(&task).unwrap();

        let tasks = storage.list_open_tasks(&UserId::new("u1")).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].recurrence_rule, Some(rule));
        assert_eq!(tasks[0].due_date, Some(date(2024, 3, 1)));
    }
}
