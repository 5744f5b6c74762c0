//! Reminder rescheduling and due-date windows.

use chrono::{Days, NaiveDate};

use crate::models::{Reminder, RepeatInterval};
use crate::time::add_months;

/// Days ahead the dashboard looks for upcoming reminders.
pub const DEFAULT_REMINDER_WINDOW_DAYS: u32 = 7;
/// Maximum reminders reported per dashboard list.
pub const DEFAULT_REMINDER_LIMIT: usize = 5;

/// Due date of the next occurrence once a reminder due on `due` is
/// completed, or `None` when the reminder does not repeat.
///
/// Month-based cadences clamp to the end of shorter months, so a reminder
/// due on Jan 31 moves to Feb 28 (or 29).
pub fn next_due_date(due: NaiveDate, repeat: RepeatInterval) -> Option<NaiveDate> {
    match repeat {
        RepeatInterval::None => None,
        RepeatInterval::Weekly => due.checked_add_days(Days::new(7)),
        RepeatInterval::Monthly => Some(add_months(due, 1)),
        RepeatInterval::Quarterly => Some(add_months(due, 3)),
        RepeatInterval::Yearly => Some(add_months(due, 12)),
    }
}

/// Completes a reminder on `today`.
///
/// A repeating reminder stays open and moves to its next due date; any
/// other reminder is closed.
pub fn complete(reminder: &Reminder, today: NaiveDate) -> Reminder {
    let mut done = reminder.clone();
    match next_due_date(reminder.due_date, reminder.repeat) {
        Some(next) => {
            done.due_date = next;
            done.completed = false;
            done.completed_on = None;
        }
        None => {
            done.completed = true;
            done.completed_on = Some(today);
        }
    }
    done
}

/// Open reminders due before `today`, oldest first.
pub fn overdue<'a, I>(reminders: I, today: NaiveDate, limit: usize) -> Vec<Reminder>
where
    I: IntoIterator<Item = &'a Reminder>,
{
    select(reminders, limit, |r| r.due_date < today)
}

/// Open reminders due between `today` and `today + days`, inclusive.
pub fn due_within<'a, I>(reminders: I, today: NaiveDate, days: u32, limit: usize) -> Vec<Reminder>
where
    I: IntoIterator<Item = &'a Reminder>,
{
    let end = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    select(reminders, limit, |r| r.due_date >= today && r.due_date <= end)
}

fn select<'a, I, P>(reminders: I, limit: usize, keep: P) -> Vec<Reminder>
where
    I: IntoIterator<Item = &'a Reminder>,
    P: Fn(&Reminder) -> bool,
{
    let mut picked: Vec<Reminder> = reminders
        .into_iter()
        .filter(|r| r.is_open() && keep(r))
        .cloned()
        .collect();
    picked.sort_by_key(|r| (r.due_date, r.id));
    picked.truncate(limit);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReminderId, ReminderKind};

    fn reminder(id: i64, due: NaiveDate) -> Reminder {
        let mut r = Reminder::new(ReminderKind::Call, format!("call {}", id), due);
        r.id = Some(ReminderId(id));
        r
    }

    #[test]
    fn test_complete_one_off_closes_it() {
        let today = d(2024, 6, 10);
        let done = complete(&reminder(1, d(2024, 6, 8)), today);
        assert!(done.completed);
        assert_eq!(done.completed_on, Some(today));
        assert_eq!(done.due_date, d(2024, 6, 8));
    }

    #[test]
    fn test_complete_repeating_advances_due_date() {
        let r = reminder(1, d(2024, 1, 31)).repeating(RepeatInterval::Monthly);
        let done = complete(&r, d(2024, 2, 2));
        assert!(done.is_open());
        assert_eq!(done.completed_on, None);
        assert_eq!(done.due_date, d(2024, 2, 29));
    }

    #[test]
    fn test_overdue_skips_closed_and_future() {
        let today = d(2024, 6, 10);
        let mut closed = reminder(1, d(2024, 6, 1));
        closed.completed = true;
        let all = vec![
            closed,
            reminder(2, d(2024, 6, 9)),
            reminder(3, d(2024, 6, 2)),
            reminder(4, today),
            reminder(5, d(2024, 6, 20)),
        ];

        let ids: Vec<_> = overdue(&all, today, 10)
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![ReminderId(3), ReminderId(2)]);
        assert_eq!(overdue(&all, today, 1).len(), 1);
    }

    #[test]
    fn test_due_within_is_inclusive() {
        let today = d(2024, 6, 10);
        let all = vec![
            reminder(1, d(2024, 6, 9)),
            reminder(2, d(2024, 6, 17)),
            reminder(3, today),
            reminder(4, d(2024, 6, 18)),
        ];

        let ids: Vec<_> = due_within(&all, today, 7, 10)
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![ReminderId(3), ReminderId(2)]);
        assert!(due_within(&all, today, 7, 0).is_empty());
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_non_repeating_has_no_next_date() {
        assert_eq!(next_due_date(d(2024, 6, 3), RepeatInterval::None), None);
        assert!(!RepeatInterval::None.is_repeating());
    }

    #[test]
    fn test_weekly_adds_seven_days() {
        assert_eq!(
            next_due_date(d(2024, 12, 28), RepeatInterval::Weekly),
            Some(d(2025, 1, 4))
        );
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(
            next_due_date(d(2024, 1, 31), RepeatInterval::Monthly),
            Some(d(2024, 2, 29))
        );
        assert_eq!(
            next_due_date(d(2024, 6, 15), RepeatInterval::Monthly),
            Some(d(2024, 7, 15))
        );
    }

    #[test]
    fn test_quarterly_and_yearly() {
        assert_eq!(
            next_due_date(d(2024, 11, 30), RepeatInterval::Quarterly),
            Some(d(2025, 2, 28))
        );
        assert_eq!(
            next_due_date(d(2024, 2, 29), RepeatInterval::Yearly),
            Some(d(2025, 2, 28))
        );
    }

    #[test]
    fn test_repeat_interval_parsing() {
        assert_eq!(
            "Quarterly".parse::<RepeatInterval>(),
            Ok(RepeatInterval::Quarterly)
        );
        assert_eq!("".parse::<RepeatInterval>(), Ok(RepeatInterval::None));
        assert!("daily".parse::<RepeatInterval>().is_err());
    }
}
