use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::models::WeekOfMonth;

/// Number of days in the given month (`month` is 1-based).
///
/// # Example
/// ```
/// use rapport::time::days_in_month;
/// assert_eq!(days_in_month(2024, 2), 29);
/// assert_eq!(days_in_month(2023, 2), 28);
/// ```
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = month_offset(year, month, 1);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        _ => 0,
    }
}

/// Weekday as 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a (year, month) pair by `n` months.
pub fn month_offset(year: i32, month: u32, n: u32) -> (i32, u32) {
    let zero_based = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(n);
    ((zero_based.div_euclid(12)) as i32, (zero_based.rem_euclid(12) + 1) as u32)
}

/// Add whole months, clamping the day to the target month's length
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_months(Months::new(n))
        .unwrap_or(NaiveDate::MAX)
}

/// Last day (inclusive) considered by a generation run.
pub fn horizon_end(today: NaiveDate, months: u32) -> NaiveDate {
    add_months(today, months)
}

/// Build a date, clamping `day` into the month.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// First date on or after `from` that falls on `weekday`.
pub fn next_weekday_on_or_after(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_sunday() - from.weekday().num_days_from_sunday()) % 7;
    from.checked_add_days(Days::new(u64::from(ahead)))
        .unwrap_or(NaiveDate::MAX)
}

/// Date of the n-th (or last) `weekday` in a month, or `None` when the month
/// has no such occurrence (e.g. a fifth Friday).
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    week: WeekOfMonth,
) -> Option<NaiveDate> {
    match week {
        WeekOfMonth::Last => {
            let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
            let back = (7 + last.weekday().num_days_from_sunday()
                - weekday.num_days_from_sunday())
                % 7;
            let date = last.checked_sub_days(Days::new(u64::from(back)))?;
            (date.month() == month).then_some(date)
        }
        WeekOfMonth::Nth(n) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let first_match = next_weekday_on_or_after(first, weekday);
            let offset = 7 * u64::from(n.saturating_sub(1));
            let date = first_match.checked_add_days(Days::new(offset))?;
            (date.month() == month && date.year() == year).then_some(date)
        }
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
