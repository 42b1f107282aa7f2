/// Property-based checks for the schedule, streak and recurrence engine
use chrono::NaiveDate;
use proptest::prelude::*;
use saturn_planner::calendar;
use saturn_planner::*;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

/// Any day between 2000 and roughly 2054
fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| calendar::add_days(epoch(), offset))
}

fn any_frequency() -> impl Strategy<Value = HabitFrequency> {
    prop_oneof![
        Just(HabitFrequency::Daily),
        Just(HabitFrequency::Weekdays),
        prop::collection::vec(0u8..7, 0..7)
            .prop_map(|days_of_week| HabitFrequency::SpecificDays { days_of_week }),
        (1u8..=7).prop_map(|times_per_week| HabitFrequency::TimesPerWeek { times_per_week }),
        Just(HabitFrequency::Unknown),
    ]
}

fn any_rule() -> impl Strategy<Value = RecurrenceRule> {
    let frequency = prop_oneof![
        Just(RecurrenceFrequency::Daily),
        Just(RecurrenceFrequency::Weekly),
        Just(RecurrenceFrequency::Monthly),
        Just(RecurrenceFrequency::Custom),
    ];
    (frequency, 0u32..5, prop::collection::vec(0u8..7, 0..4))
        .prop_map(|(frequency, interval, days)| RecurrenceRule::new(frequency, interval).with_days(days))
}

/// A set of completion days within `span` days before `today`
fn history(today: NaiveDate, span: i64) -> impl Strategy<Value = CompletionSet> {
    prop::collection::vec(0..span, 0..60)
        .prop_map(move |offsets| offsets.into_iter().map(|o| calendar::add_days(today, -o)).collect())
}

fn history_around() -> impl Strategy<Value = (NaiveDate, CompletionSet)> {
    any_date().prop_flat_map(|today| (Just(today), history(today, 120)))
}

proptest! {
    #[test]
    fn scheduling_depends_only_on_weekday(
        day in any_date(),
        weeks in -500i64..500,
        frequency in any_frequency(),
    ) {
        let shifted = calendar::add_days(day, weeks * 7);
        prop_assert_eq!(is_day_scheduled(day, &frequency), is_day_scheduled(shifted, &frequency));
    }

    #[test]
    fn empty_history_has_no_streaks(today in any_date(), frequency in any_frequency()) {
        let empty = CompletionSet::new();
        prop_assert_eq!(calculate_streak_on(&empty, &frequency, today), 0);
        prop_assert_eq!(get_best_streak(&empty, &frequency), 0);
    }

    #[test]
    fn reversed_range_rate_is_zero(
        (today, completions) in history_around(),
        frequency in any_frequency(),
        gap in 1i64..400,
    ) {
        let earlier = calendar::add_days(today, -gap);
        prop_assert_eq!(get_completion_rate(&completions, &frequency, today, earlier), 0.0);
    }

    #[test]
    fn rate_stays_in_unit_interval(
        (today, completions) in history_around(),
        frequency in any_frequency(),
        window in 0i64..200,
    ) {
        let start = calendar::add_days(today, -window);
        let rate = get_completion_rate(&completions, &frequency, start, today);
        prop_assert!((0.0..=1.0).contains(&rate));
    }

    #[test]
    fn analytics_are_idempotent(
        (today, completions) in history_around(),
        frequency in any_frequency(),
    ) {
        let start = calendar::add_days(today, -30);
        prop_assert_eq!(
            calculate_streak_on(&completions, &frequency, today),
            calculate_streak_on(&completions, &frequency, today)
        );
        prop_assert_eq!(get_best_streak(&completions, &frequency), get_best_streak(&completions, &frequency));
        prop_assert_eq!(
            get_completion_rate(&completions, &frequency, start, today),
            get_completion_rate(&completions, &frequency, start, today)
        );
    }

    #[test]
    fn current_streak_never_exceeds_completions(
        (today, completions) in history_around(),
        frequency in any_frequency(),
    ) {
        let streak = calculate_streak_on(&completions, &frequency, today);
        prop_assert!(streak as usize <= completions.len());
        prop_assert!(get_best_streak(&completions, &frequency) as usize <= completions.len());
    }

    #[test]
    fn weekdays_pattern_matches_monday_to_friday(day in any_date(), anchor in any_date()) {
        let rule = create_recurrence_rule_on(RecurrencePattern::Weekdays, anchor);
        let weekday = calendar::day_of_week(day);
        prop_assert_eq!(is_occurrence(day, &rule), (1..=5).contains(&weekday));
    }

    #[test]
    fn occurrences_are_bounded_ordered_and_matching(
        rule in any_rule(),
        start in any_date(),
        count in 0usize..20,
    ) {
        let dates = next_occurrences(&rule, start, count);
        prop_assert!(dates.len() <= count);
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        for d in &dates {
            prop_assert!(*d >= start);
            prop_assert!(is_occurrence(*d, &rule));
        }
    }

    #[test]
    fn occurrences_respect_end_date(
        rule in any_rule(),
        start in any_date(),
        horizon in 0i64..90,
        count in 1usize..30,
    ) {
        let end = calendar::add_days(start, horizon);
        let rule = rule.with_end_date(end);
        prop_assert!(next_occurrences(&rule, start, count).iter().all(|d| *d <= end));
    }

    #[test]
    fn weekly_quota_streak_is_bounded(
        (today, completions) in history_around(),
        target in 0u8..8,
    ) {
        prop_assert!(weekly_quota_streak_on(&completions, target, today) <= QUOTA_LOOKBACK_WEEKS);
    }
}
