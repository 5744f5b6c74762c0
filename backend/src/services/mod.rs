//! Pure domain logic.
//!
//! Everything in this module works on plain values and never touches
//! storage. The persistence-aware orchestration that feeds it lives in
//! [`crate::db::services`].

pub mod attention;
pub mod recurrence;
pub mod reminders;
pub mod scoring;

pub use attention::{neglected_contacts, upcoming_birthdays, BirthdayEntry, NeglectedContact};
pub use recurrence::{expand, DEFAULT_HORIZON_MONTHS};
pub use reminders::{
    complete, due_within, next_due_date, overdue, DEFAULT_REMINDER_LIMIT,
    DEFAULT_REMINDER_WINDOW_DAYS,
};
pub use scoring::{dampen, rank_by_attention, score, score_group, score_groups, GroupEvents};
