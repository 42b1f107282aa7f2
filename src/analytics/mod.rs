/// Analytics engine for per-habit summaries and insights
///
/// This module combines the pure streak functions into the summary the
/// status tools report, and turns summaries into short readable insights.

use serde::Serialize;
use chrono::NaiveDate;

use crate::calendar;
use crate::domain::{
    calculate_streak_on, get_best_streak, get_completion_rate, week_progress,
    weekly_quota_streak_on, CompletionSet, Habit, HabitCompletion, HabitFrequency,
};

/// Default length of the completion-rate window, ending today
pub const DEFAULT_RATE_WINDOW_DAYS: u32 = 30;

/// Progress against a times-per-week target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyQuota {
    pub target: u8,
    pub done_this_week: u32,
    /// Consecutive weeks the target was met
    pub week_streak: u32,
}

/// Calculated statistics for a habit as of a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub habit_id: String,
    pub name: String,
    pub frequency: String,
    /// Consecutive scheduled days completed, ending today
    pub current_streak: u32,
    /// Best run ever, never less than the current streak
    pub best_streak: u32,
    /// Completion rate over the engine's window (0.0 to 1.0)
    pub completion_rate: f64,
    pub total_completions: u32,
    pub last_completed: Option<NaiveDate>,
    pub scheduled_today: bool,
    pub completed_today: bool,
    /// Only present for times-per-week habits
    pub weekly_quota: Option<WeeklyQuota>,
}

impl HabitStats {
    /// Scheduled today, not done yet, and a streak is riding on it
    pub fn is_at_risk(&self) -> bool {
        self.scheduled_today && !self.completed_today && self.current_streak > 0
    }
}

/// Analytics engine for processing habit data
///
/// Stateless apart from its window setting; every call works on the
/// snapshot of completions it is handed.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    rate_window_days: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    /// Create a new analytics engine with the default 30-day window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_RATE_WINDOW_DAYS)
    }

    pub fn with_window(rate_window_days: u32) -> Self {
        Self {
            rate_window_days: rate_window_days.max(1),
        }
    }

    pub fn rate_window_days(&self) -> u32 {
        self.rate_window_days
    }

    /// Summarize one habit from its completion records
    ///
    /// `completions` should hold only this habit's records.
    pub fn habit_stats(
        &self,
        habit: &Habit,
        completions: &[HabitCompletion],
        today: NaiveDate,
    ) -> HabitStats {
        let set = CompletionSet::from_completions(completions);
        let frequency = &habit.frequency;

        let current_streak = calculate_streak_on(&set, frequency, today);
        let best_streak = get_best_streak(&set, frequency).max(current_streak);
        let window_start = calendar::add_days(today, -(self.rate_window_days as i64 - 1));
        let completion_rate = get_completion_rate(&set, frequency, window_start, today);

        let weekly_quota = match frequency {
            HabitFrequency::TimesPerWeek { times_per_week } => Some(WeeklyQuota {
                target: *times_per_week,
                done_this_week: week_progress(&set, today),
                week_streak: weekly_quota_streak_on(&set, *times_per_week, today),
            }),
            _ => None,
        };

        HabitStats {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            frequency: frequency.label(),
            current_streak,
            best_streak,
            completion_rate,
            total_completions: set.len() as u32,
            last_completed: set.latest(),
            scheduled_today: frequency.is_scheduled(today),
            completed_today: set.contains(today),
            weekly_quota,
        }
    }

    /// Generate short insights across a set of habit summaries
    pub fn insights(&self, stats: &[HabitStats]) -> Vec<String> {
        let mut insights = Vec::new();

        if stats.is_empty() {
            insights.push("Start by creating your first habit to track!".to_string());
            return insights;
        }

        for s in stats {
            if s.is_at_risk() {
                insights.push(format!(
                    "'{}' is due today. Log it to keep your {}-day streak alive.",
                    s.name, s.current_streak
                ));
            }
            if let Some(ref quota) = s.weekly_quota {
                if quota.done_this_week >= quota.target as u32 {
                    insights.push(format!("'{}' has hit its weekly target. Nice!", s.name));
                } else {
                    let remaining = quota.target as u32 - quota.done_this_week;
                    insights.push(format!(
                        "'{}' needs {} more this week.",
                        s.name, remaining
                    ));
                }
            }
            if s.total_completions == 0 {
                insights.push(format!("'{}' hasn't been logged yet. Small wins add up.", s.name));
            } else if s.current_streak > 0 && s.current_streak == s.best_streak && s.current_streak >= 3 {
                insights.push(format!(
                    "'{}' is on its best streak ever: {} days.",
                    s.name, s.current_streak
                ));
            }
        }

        let done_today = stats.iter().filter(|s| s.completed_today).count();
        let due_today = stats.iter().filter(|s| s.scheduled_today).count();
        insights.push(format!(
            "{} of {} habits due today are done. {}",
            done_today.min(due_today),
            due_today,
            streak_message(stats.iter().map(|s| s.current_streak).max().unwrap_or(0))
        ));

        insights
    }
}

/// Encouragement line for a streak length
pub fn streak_message(current_streak: u32) -> &'static str {
    match current_streak {
        0 => "Just start. Momentum will follow.",
        1 => "One step at a time.",
        2..=6 => "Small wins add up.",
        7..=13 => "You're doing great.",
        14..=29 => "Progress, not perfection.",
        _ => "Every check mark counts.",
    }
}
