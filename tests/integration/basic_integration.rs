/// Basic integration tests against on-disk databases
use chrono::NaiveDate;
use saturn_planner::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_server_uses_config() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = PlannerConfig {
            user_id: "sam".to_string(),
            completion_rate_window_days: 14,
            ..PlannerConfig::default()
        };

        let server = PlannerServer::new(dir.path().join("planner.db"), config)
            .await
            .expect("Failed to create server");

        assert_eq!(server.user_id().as_str(), "sam");
        assert_eq!(server.analytics().rate_window_days(), 14);
    }

    #[tokio::test]
    async fn test_server_rejects_invalid_config() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = PlannerConfig {
            upcoming_count: 0,
            ..PlannerConfig::default()
        };

        let result = PlannerServer::new(dir.path().join("planner.db"), config).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_database_persistence() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("planner.db");
        let user = UserId::new("u1");

        let habit = Habit::new(
            user.clone(),
            "Journal".to_string(),
            None,
            HabitFrequency::SpecificDays { days_of_week: vec![1, 3, 5] },
        )
        .unwrap();

        {
            let storage = SqliteStorage::new(&db_path).expect("Failed to create storage");
            storage.create_habit(&habit).unwrap();
            for d in [11, 13, 15] {
                storage.toggle_completion(&user, &habit.id, date(2024, 3, d)).unwrap();
            }
        }

        // Reopening runs migrations again on an up-to-date schema
        let storage = SqliteStorage::new(&db_path).expect("Failed to reopen storage");
        let loaded = storage.get_habit(&user, &habit.id).unwrap();
        assert_eq!(loaded.frequency, habit.frequency);

        let completions = storage.completions_for_habit(&user, &habit.id).unwrap();
        let stats = AnalyticsEngine::new().habit_stats(&loaded, &completions, date(2024, 3, 16));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_range_snapshot_feeds_the_engine() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("planner.db")).unwrap();
        let user = UserId::new("u1");

        let weekdays = Habit::new(user.clone(), "Inbox zero".to_string(), None, HabitFrequency::Weekdays).unwrap();
        let daily = Habit::new(user.clone(), "Walk".to_string(), None, HabitFrequency::Daily).unwrap();
        storage.create_habit(&weekdays).unwrap();
        storage.create_habit(&daily).unwrap();

        for d in [11, 12, 14] {
            storage.toggle_completion(&user, &weekdays.id, date(2024, 3, d)).unwrap();
        }
        storage.toggle_completion(&user, &daily.id, date(2024, 3, 10)).unwrap();

        let snapshot = storage
            .completions_in_range(&user, date(2024, 3, 10), date(2024, 3, 16))
            .unwrap();
        assert_eq!(snapshot.len(), 4);

        let weekday_days: CompletionSet = snapshot
            .iter()
            .filter(|c| c.habit_id == weekdays.id)
            .map(|c| c.completed_date)
            .collect();
        let rate = get_completion_rate(&weekday_days, &weekdays.frequency, date(2024, 3, 10), date(2024, 3, 16));
        assert!((rate - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_storage_interface() {
        let storage = SqliteStorage::in_memory().expect("Failed to create storage");

        // SqliteStorage is usable behind the trait
        let storage: &dyn PlannerStorage = &storage;
        assert!(storage.list_habits(&UserId::new("nobody"), false).unwrap().is_empty());
        assert!(storage.list_open_tasks(&UserId::new("nobody")).unwrap().is_empty());
    }
}
