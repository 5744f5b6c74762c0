//! Recurrence expansion.
//!
//! Turns a [`RecurrenceRule`] into the concrete slot dates that fall inside a
//! rolling horizon starting today. The engine is pure: it never looks at
//! storage, so deduplication against already-materialized slots is the job of
//! the insert path (see [`crate::db::services::generate_slots`]).

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Weekday};
use log::debug;

use crate::models::{RecurrencePattern, RecurrenceRule, SlotCandidate, WeekOfMonth};
use crate::time::{
    clamped_date, first_of_month, horizon_end, month_offset, next_weekday_on_or_after,
    nth_weekday_of_month,
};

/// Default look-ahead used by generation runs.
pub const DEFAULT_HORIZON_MONTHS: u32 = 3;
/// Default number of slots on the upcoming-slots dashboard.
pub const DEFAULT_UPCOMING_SLOT_LIMIT: usize = 20;

/// Expand `rule` into candidate slots in `[today, today + horizon_months]`.
///
/// Candidates are returned in ascending date order without duplicates, each
/// carrying the rule's `time_of_day` unchanged. A malformed rule yields an
/// empty list.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use rapport::models::RecurrenceRule;
/// use rapport::services::recurrence::expand;
///
/// // Every second Friday, starting from Monday 2024-06-03
/// let rule = RecurrenceRule::weekly(5).with_interval(2);
/// let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let slots = expand(&rule, today, 1);
/// assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
/// assert_eq!(slots[1].date, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
/// ```
pub fn expand(rule: &RecurrenceRule, today: NaiveDate, horizon_months: u32) -> Vec<SlotCandidate> {
    let Some(pattern) = rule.pattern() else {
        debug!(
            "Skipping malformed {} recurrence rule: {:?}",
            rule.recurrence_type, rule
        );
        return Vec::new();
    };

    let horizon = horizon_end(today, horizon_months);
    let dates = match pattern {
        RecurrencePattern::Weekly { weekday, interval } => {
            weekly_dates(today, horizon, weekday, interval)
        }
        RecurrencePattern::MonthlyFixedDay { day, interval } => {
            monthly_fixed_day_dates(today, horizon, day, interval)
        }
        RecurrencePattern::MonthlyNthWeekday {
            week,
            weekday,
            interval,
        } => monthly_nth_weekday_dates(today, horizon, week, weekday, interval),
    };

    with_time(dates, rule.time_of_day)
}

fn with_time(dates: Vec<NaiveDate>, time: Option<NaiveTime>) -> Vec<SlotCandidate> {
    dates
        .into_iter()
        .map(|date| SlotCandidate { date, time })
        .collect()
}

fn weekly_dates(
    today: NaiveDate,
    horizon: NaiveDate,
    weekday: Weekday,
    interval: u32,
) -> Vec<NaiveDate> {
    let step = Days::new(7 * u64::from(interval));
    let mut dates = Vec::new();
    let mut current = next_weekday_on_or_after(today, weekday);

    while current <= horizon {
        dates.push(current);
        match current.checked_add_days(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Fixed day-of-month, clamped into short months. Each month's date is
/// recomputed from `day`, so a clamped February does not drag later months
/// back to the 28th.
fn monthly_fixed_day_dates(
    today: NaiveDate,
    horizon: NaiveDate,
    day: u32,
    interval: u32,
) -> Vec<NaiveDate> {
    let (mut year, mut month) = (today.year(), today.month());
    match clamped_date(year, month, day) {
        Some(first) if first < today => {
            (year, month) = month_offset(year, month, 1);
        }
        Some(_) => {}
        None => return Vec::new(),
    }

    let mut dates = Vec::new();
    while let Some(candidate) = clamped_date(year, month, day) {
        if candidate > horizon {
            break;
        }
        dates.push(candidate);
        (year, month) = month_offset(year, month, interval);
    }
    dates
}

fn monthly_nth_weekday_dates(
    today: NaiveDate,
    horizon: NaiveDate,
    week: WeekOfMonth,
    weekday: Weekday,
    interval: u32,
) -> Vec<NaiveDate> {
    let mut month_start = first_of_month(today);
    let mut dates = Vec::new();

    while month_start <= horizon {
        let (year, month) = (month_start.year(), month_start.month());
        match nth_weekday_of_month(year, month, weekday, week) {
            Some(date) if date >= today && date <= horizon => dates.push(date),
            Some(_) => {}
            None => debug!("No {:?} {} in {}-{:02}", week, weekday, year, month),
        }
        match month_start.checked_add_months(Months::new(interval)) {
            Some(next) => month_start = next,
            None => break,
        }
    }
    dates
}

#[cfg(test)]
#[path = "recurrence_tests.rs"]
mod recurrence_tests;
