//! "Needs attention" lists for the dashboard: upcoming birthdays and
//! contacts that have gone quiet.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Contact, ContactActivity, ContactId};
use crate::time::{clamped_date, days_between};

/// Default look-ahead for [`upcoming_birthdays`].
pub const DEFAULT_BIRTHDAY_WINDOW_DAYS: u32 = 14;
/// Default silence threshold for [`neglected_contacts`].
pub const DEFAULT_NEGLECT_WEEKS: u32 = 4;
/// Default number of neglected contacts surfaced at once.
pub const DEFAULT_NEGLECTED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayEntry {
    pub contact_id: ContactId,
    pub name: String,
    pub birthday: NaiveDate,
    pub next_date: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeglectedContact {
    pub contact_id: ContactId,
    pub name: String,
    pub last_interaction: Option<NaiveDate>,
    /// `None` when the contact has never been reached.
    pub days_since_contact: Option<i64>,
}

/// Next occurrence of `birthday` on or after `today`. Feb 29 falls on
/// Feb 28 in common years.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = clamped_date(today.year(), birthday.month(), birthday.day())?;
    if this_year >= today {
        return Some(this_year);
    }
    clamped_date(today.year() + 1, birthday.month(), birthday.day())
}

/// Contacts whose next birthday is at most `window_days` away, soonest
/// first. Contacts without an id or a birthday are skipped.
pub fn upcoming_birthdays(
    contacts: &[Contact],
    today: NaiveDate,
    window_days: u32,
) -> Vec<BirthdayEntry> {
    let mut entries: Vec<BirthdayEntry> = contacts
        .iter()
        .filter_map(|contact| {
            let contact_id = contact.id?;
            let birthday = contact.birthday?;
            let next_date = next_birthday(birthday, today)?;
            let days_until = days_between(today, next_date);
            (days_until <= i64::from(window_days)).then(|| BirthdayEntry {
                contact_id,
                name: contact.display_name(),
                birthday,
                next_date,
                days_until,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.contact_id.cmp(&b.contact_id))
    });
    entries
}

/// Contacts silent for more than `weeks` weeks, or never contacted.
///
/// Never-contacted come first, then the longest silence. At most `limit`
/// entries are returned.
pub fn neglected_contacts(
    activity: &[ContactActivity],
    today: NaiveDate,
    weeks: u32,
    limit: usize,
) -> Vec<NeglectedContact> {
    let cutoff = i64::from(weeks) * 7;

    let mut neglected: Vec<NeglectedContact> = activity
        .iter()
        .filter_map(|row| {
            let days_since = row.last_interaction.map(|last| days_between(last, today));
            if matches!(days_since, Some(days) if days <= cutoff) {
                return None;
            }
            Some(NeglectedContact {
                contact_id: row.contact_id,
                name: row.name.clone(),
                last_interaction: row.last_interaction,
                days_since_contact: days_since,
            })
        })
        .collect();

    neglected.sort_by(|a, b| match (a.days_since_contact, b.days_since_contact) {
        (None, None) => a.contact_id.cmp(&b.contact_id),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.contact_id.cmp(&b.contact_id)),
    });
    neglected.truncate(limit);
    neglected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contact(id: i64, first: &str, birthday: Option<NaiveDate>) -> Contact {
        let mut c = Contact::new(first, "Doe");
        c.id = Some(ContactId(id));
        c.birthday = birthday;
        c
    }

    fn activity(id: i64, last: Option<NaiveDate>) -> ContactActivity {
        ContactActivity {
            contact_id: ContactId(id),
            name: format!("Contact {}", id),
            last_interaction: last,
        }
    }

    #[test]
    fn test_next_birthday_rolls_over_year() {
        let today = d(2024, 12, 20);
        assert_eq!(next_birthday(d(1990, 12, 25), today), Some(d(2024, 12, 25)));
        assert_eq!(next_birthday(d(1990, 1, 3), today), Some(d(2025, 1, 3)));
        assert_eq!(next_birthday(d(1990, 12, 20), today), Some(d(2024, 12, 20)));
    }

    #[test]
    fn test_leap_day_birthday_in_common_year() {
        assert_eq!(
            next_birthday(d(2000, 2, 29), d(2025, 2, 1)),
            Some(d(2025, 2, 28))
        );
        assert_eq!(
            next_birthday(d(2000, 2, 29), d(2024, 2, 1)),
            Some(d(2024, 2, 29))
        );
    }

    #[test]
    fn test_upcoming_birthdays_window_and_order() {
        let today = d(2024, 12, 20);
        let contacts = vec![
            contact(1, "Ann", Some(d(1985, 1, 3))),
            contact(2, "Ben", Some(d(1990, 12, 21))),
            contact(3, "Cleo", Some(d(1970, 2, 14))),
            contact(4, "Dan", None),
            contact(5, "Eve", Some(d(2001, 12, 20))),
        ];

        let entries = upcoming_birthdays(&contacts, today, 14);
        let ids: Vec<_> = entries.iter().map(|e| e.contact_id.value()).collect();
        assert_eq!(ids, vec![5, 2, 1]);
        assert_eq!(entries[0].days_until, 0);
        assert_eq!(entries[2].days_until, 14);
        assert_eq!(entries[2].next_date, d(2025, 1, 3));
        assert_eq!(entries[1].name, "Ben Doe");
    }

    #[test]
    fn test_unsaved_contacts_are_skipped() {
        let mut unsaved = Contact::new("New", "Person");
        unsaved.birthday = Some(d(1990, 6, 4));
        assert!(upcoming_birthdays(&[unsaved], d(2024, 6, 3), 14).is_empty());
    }

    #[test]
    fn test_neglected_order_and_threshold() {
        let today = d(2024, 6, 30);
        let rows = vec![
            activity(1, Some(d(2024, 6, 2))), // 28 days, not neglected
            activity(2, Some(d(2024, 6, 1))), // 29 days
            activity(3, None),
            activity(4, Some(d(2024, 1, 1))),
            activity(5, Some(d(2024, 6, 25))),
        ];

        let neglected = neglected_contacts(&rows, today, 4, 5);
        let ids: Vec<_> = neglected.iter().map(|n| n.contact_id.value()).collect();
        assert_eq!(ids, vec![3, 4, 2]);
        assert_eq!(neglected[0].days_since_contact, None);
        assert_eq!(neglected[2].days_since_contact, Some(29));
    }

    #[test]
    fn test_neglected_limit() {
        let today = d(2024, 6, 30);
        let rows: Vec<_> = (0..10).map(|id| activity(id, None)).collect();
        let neglected = neglected_contacts(&rows, today, 4, DEFAULT_NEGLECTED_LIMIT);
        assert_eq!(neglected.len(), 5);
        assert_eq!(neglected[0].contact_id, ContactId(0));
    }
}
