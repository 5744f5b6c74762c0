//! Calendar arithmetic shared by the recurrence engine, the scorer and the
//! reminder/birthday helpers.

pub mod calendar;


pub use calendar::{
    add_months, clamped_date, days_between, days_in_month, first_of_month, horizon_end,
    month_offset, next_weekday_on_or_after, nth_weekday_of_month, weekday_index,
};
