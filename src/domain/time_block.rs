/// Calendar time blocks, optionally repeating on a recurrence rule

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use crate::domain::{next_occurrences, DomainError, RecurrenceRule, TimeBlockId, UserId};

/// First hour of the plannable day
pub const DAY_START_HOUR: u32 = 6;

/// Hour the plannable day ends
pub const DAY_END_HOUR: u32 = 23;

/// Candidate slots advance in steps of this many minutes
pub const SLOT_STEP_MINUTES: i64 = 15;

/// A span of time reserved on the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: TimeBlockId,
    pub user_id: UserId,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Repeats the same time of day on each matching date
    pub recurrence_rule: Option<RecurrenceRule>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeBlock {
    pub fn new(
        user_id: UserId,
        title: String,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        recurrence_rule: Option<RecurrenceRule>,
    ) -> Result<Self, DomainError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation {
                message: "Time block title cannot be empty".to_string()
            });
        }
        if end_time <= start_time {
            return Err(DomainError::Validation {
                message: "Time block must end after it starts".to_string()
            });
        }
        if let Some(ref rule) = recurrence_rule {
            rule.validate()?;
        }

        Ok(Self {
            id: TimeBlockId::new(),
            user_id,
            title: trimmed.to_string(),
            start_time,
            end_time,
            recurrence_rule,
            is_completed: false,
            created_at: Utc::now(),
        })
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn overlaps(&self, other: &TimeBlock) -> bool {
        blocks_overlap((self.start_time, self.end_time), (other.start_time, other.end_time))
    }

    /// Up to `count` (start, end) spans on or after `from`
    ///
    /// A repeating block keeps its time of day and duration on each
    /// occurrence date. Occurrences never precede the block's own date.
    pub fn upcoming(&self, from: NaiveDate, count: usize) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let first_day = self.start_time.date();
        let start = first_day.max(from);
        let duration = self.duration();

        match &self.recurrence_rule {
            Some(rule) => next_occurrences(rule, start, count)
                .into_iter()
                .map(|day| {
                    let begins = day.and_time(self.start_time.time());
                    (begins, begins + duration)
                })
                .collect(),
            None if first_day >= from && count > 0 => vec![(self.start_time, self.end_time)],
            None => Vec::new(),
        }
    }
}

/// Half-open overlap: blocks that only touch at an edge don't overlap
pub fn blocks_overlap(a: (NaiveDateTime, NaiveDateTime), b: (NaiveDateTime, NaiveDateTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Earliest free start on `date` for a block of `duration_minutes`
///
/// The search begins at the later of the day start and `not_before`
/// (rounded down to the half hour) and advances in 15 minute steps. A
/// candidate must start before the end of the day. Returns `None` when
/// every candidate collides with one of `blocks`.
pub fn find_next_available_slot(
    date: NaiveDate,
    blocks: &[TimeBlock],
    duration_minutes: i64,
    not_before: NaiveTime,
) -> Option<NaiveDateTime> {
    let hour = not_before.hour().max(DAY_START_HOUR);
    let minute = if hour == not_before.hour() && not_before.minute() > 30 { 30 } else { 0 };

    let mut candidate = date.and_hms_opt(hour, minute, 0)?;
    let end_of_day = date.and_hms_opt(DAY_END_HOUR, 0, 0)?;
    let duration = Duration::minutes(duration_minutes);

    while candidate < end_of_day {
        let span = (candidate, candidate + duration);
        if !blocks.iter().any(|b| blocks_overlap(span, (b.start_time, b.end_time))) {
            return Some(candidate);
        }
        candidate += Duration::minutes(SLOT_STEP_MINUTES);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecurrenceFrequency;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn block(start: NaiveDateTime, end: NaiveDateTime) -> TimeBlock {
        TimeBlock::new(UserId::new("u1"), "Focus".to_string(), start, end, None).unwrap()
    }

    #[test]
    fn test_rejects_empty_or_backwards_blocks() {
        let user = UserId::new("u1");
        assert!(TimeBlock::new(user.clone(), " ".to_string(), at(15, 9, 0), at(15, 10, 0), None).is_err());
        assert!(TimeBlock::new(user.clone(), "Gym".to_string(), at(15, 10, 0), at(15, 10, 0), None).is_err());
        assert!(TimeBlock::new(user, "Gym".to_string(), at(15, 10, 0), at(15, 9, 0), None).is_err());
    }

    #[test]
    fn test_touching_blocks_do_not_overlap() {
        let morning = block(at(15, 9, 0), at(15, 10, 0));
        let next = block(at(15, 10, 0), at(15, 11, 0));
        let inside = block(at(15, 9, 30), at(15, 9, 45));

        assert!(!morning.overlaps(&next));
        assert!(morning.overlaps(&inside));
        assert!(inside.overlaps(&morning));
    }

    #[test]
    fn test_repeating_block_keeps_time_of_day() {
        // Monday 07:30-08:15, every Mon/Wed
        let rule = RecurrenceRule::new(RecurrenceFrequency::Weekly, 1).with_days(vec![1, 3]);
        let run = TimeBlock::new(UserId::new("u1"), "Run".to_string(), at(11, 7, 30), at(11, 8, 15), Some(rule))
            .unwrap();

        let spans = run.upcoming(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(), 3);
        assert_eq!(
            spans,
            vec![
                (at(13, 7, 30), at(13, 8, 15)),
                (at(18, 7, 30), at(18, 8, 15)),
                (at(20, 7, 30), at(20, 8, 15)),
            ]
        );
    }

    #[test]
    fn test_one_off_block_in_the_past_is_not_upcoming() {
        let meeting = block(at(11, 14, 0), at(11, 15, 0));
        assert!(meeting.upcoming(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(), 5).is_empty());
        assert_eq!(meeting.upcoming(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 5).len(), 1);
    }

    #[test]
    fn test_next_slot_skips_busy_time() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let early = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        let blocks = vec![block(at(15, 6, 0), at(15, 7, 0)), block(at(15, 7, 30), at(15, 9, 0))];

        // 30 minutes fits between the two blocks
        assert_eq!(find_next_available_slot(day, &blocks, 30, early), Some(at(15, 7, 0)));
        // An hour doesn't, so it lands after the second
        assert_eq!(find_next_available_slot(day, &blocks, 60, early), Some(at(15, 9, 0)));
    }

    #[test]
    fn test_next_slot_rounds_not_before_down_to_half_hour() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let after_lunch = NaiveTime::from_hms_opt(13, 47, 0).unwrap();
        assert_eq!(find_next_available_slot(day, &[], 30, after_lunch), Some(at(15, 13, 30)));

        let late = NaiveTime::from_hms_opt(23, 10, 0).unwrap();
        assert_eq!(find_next_available_slot(day, &[], 30, late), None);
    }
}
