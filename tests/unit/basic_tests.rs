/// Worked scenarios for the schedule, streak and recurrence engine
use chrono::NaiveDate;
use saturn_planner::calendar;
use saturn_planner::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_daily_streak_gives_today_the_benefit_of_the_doubt() {
        let today = date(2024, 3, 15);
        let completions: CompletionSet = [1i64, 2, 3]
            .into_iter()
            .map(|n| calendar::add_days(today, -n))
            .collect();

        assert_eq!(calculate_streak_on(&completions, &HabitFrequency::Daily, today), 3);

        let mut with_today = completions.clone();
        with_today.insert(today);
        assert_eq!(calculate_streak_on(&with_today, &HabitFrequency::Daily, today), 4);
    }

    #[test]
    fn test_specific_days_streak_stops_at_first_gap() {
        let frequency = HabitFrequency::SpecificDays { days_of_week: vec![1, 3, 5] };
        // Saturday; the four Mon/Wed/Fri before it are done, Wed Mar 6 is missed
        let today = date(2024, 3, 16);
        let completions: CompletionSet = [
            date(2024, 3, 15),
            date(2024, 3, 13),
            date(2024, 3, 11),
            date(2024, 3, 8),
            date(2024, 3, 4),
        ]
        .into_iter()
        .collect();

        assert_eq!(calculate_streak_on(&completions, &frequency, today), 4);
        assert_eq!(get_best_streak(&completions, &frequency), 4);
    }

    #[test]
    fn test_weekday_rate_ignores_weekend_days() {
        // Sun Mar 10 ..= Sat Mar 16
        let completions: CompletionSet = [
            date(2024, 3, 10),
            date(2024, 3, 11),
            date(2024, 3, 12),
            date(2024, 3, 14),
        ]
        .into_iter()
        .collect();

        let rate = get_completion_rate(
            &completions,
            &HabitFrequency::Weekdays,
            date(2024, 3, 10),
            date(2024, 3, 16),
        );
        assert!((rate - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_rule_without_days_yields_nothing() {
        let rule = RecurrenceRule::new(RecurrenceFrequency::Weekly, 1);
        assert!(next_occurrences(&rule, date(2024, 3, 15), 5).is_empty());
    }

    #[test]
    fn test_monthly_descriptions() {
        assert_eq!(
            describe_recurrence(&RecurrenceRule::new(RecurrenceFrequency::Monthly, 1)),
            "Every month"
        );
        assert_eq!(
            describe_recurrence(&RecurrenceRule::new(RecurrenceFrequency::Monthly, 3)),
            "Every 3 months"
        );
    }

    #[test]
    fn test_times_per_week_counts_daily_but_quota_counts_weeks() {
        let frequency = HabitFrequency::TimesPerWeek { times_per_week: 3 };
        // Three sessions in each of the last two full weeks, none yet this week
        let today = date(2024, 3, 20);
        let completions: CompletionSet = [
            date(2024, 3, 4),
            date(2024, 3, 6),
            date(2024, 3, 8),
            date(2024, 3, 11),
            date(2024, 3, 13),
            date(2024, 3, 15),
        ]
        .into_iter()
        .collect();

        // Every day is "scheduled", so the per-day walk breaks on Mar 18
        assert_eq!(calculate_streak_on(&completions, &frequency, today), 0);
        assert_eq!(weekly_quota_streak_on(&completions, 3, today), 2);
        assert_eq!(week_progress(&completions, today), 0);
    }

    #[test]
    fn test_rule_round_trips_through_stored_json() {
        let rule = RecurrenceRule::new(RecurrenceFrequency::Weekly, 2)
            .with_days(vec![1, 3])
            .with_end_date(date(2024, 6, 1));
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(
            json,
            r#"{"frequency":"weekly","interval":2,"days_of_week":[1,3],"end_date":"2024-06-01"}"#
        );
        let back: RecurrenceRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
        assert_eq!(describe_recurrence(&back), "Every 2 weeks on Mon, Wed");
    }

    #[test]
    fn test_stored_frequency_shapes() {
        let specific: HabitFrequency =
            serde_json::from_str(r#"{"type":"specific_days","days_of_week":[0,6]}"#).unwrap();
        assert!(specific.is_scheduled(date(2024, 3, 16)));
        assert!(!specific.is_scheduled(date(2024, 3, 15)));

        // Missing day list means never scheduled
        let empty: HabitFrequency = serde_json::from_str(r#"{"type":"specific_days"}"#).unwrap();
        assert!(!empty.is_scheduled(date(2024, 3, 16)));

        let unknown: HabitFrequency = serde_json::from_str(r#"{"type":"monthly"}"#).unwrap();
        assert_eq!(unknown, HabitFrequency::Unknown);
        assert!(unknown.is_scheduled(date(2024, 3, 16)));
    }

    #[test]
    fn test_task_upcoming_respects_end_date() {
        let rule = RecurrenceRule::new(RecurrenceFrequency::Daily, 2).with_end_date(date(2024, 3, 20));
        let task = RecurringTask::new(
            UserId::new("u1"),
            "Water seedlings".to_string(),
            Some(date(2024, 3, 15)),
            Some(rule),
        )
        .unwrap();

        assert_eq!(
            task.upcoming(date(2024, 3, 1), 10),
            vec![date(2024, 3, 15), date(2024, 3, 17), date(2024, 3, 19)]
        );
    }

    #[test]
    fn test_analytics_engine_defaults() {
        let engine = AnalyticsEngine::new();
        assert_eq!(engine.rate_window_days(), DEFAULT_RATE_WINDOW_DAYS);
        assert_eq!(AnalyticsEngine::with_window(0).rate_window_days(), 1);
    }
}
