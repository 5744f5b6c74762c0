use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{ContactId, EventTemplate, FamilyId, GroupId, SlotId, TemplateId};

/// Lifecycle state of a generated slot. Assigning attendees moves a slot to
/// `Assigned`; removing the last contact moves it back to `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Available,
    Assigned,
    Completed,
    Cancelled,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Assigned => "assigned",
            SlotStatus::Completed => "completed",
            SlotStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown slot status: {}", s)),
        }
    }
}

/// A concrete date produced by the recurrence engine, not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

/// A materialized slot. `(template_id, date)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Option<SlotId>,
    pub template_id: TemplateId,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub status: SlotStatus,
}

impl Slot {
    /// A fresh `Available` slot for a candidate.
    pub fn from_candidate(template_id: TemplateId, candidate: SlotCandidate) -> Self {
        Self {
            id: None,
            template_id,
            date: candidate.date,
            time: candidate.time,
            status: SlotStatus::Available,
        }
    }
}

/// A contact invited to a slot, optionally on behalf of their family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotAttendee {
    pub contact_id: ContactId,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
}

impl SlotAttendee {
    pub fn contact(contact_id: ContactId) -> Self {
        Self {
            contact_id,
            family_id: None,
        }
    }
}

/// An upcoming slot with its template and remaining capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOverview {
    #[serde(flatten)]
    pub slot: Slot,
    pub template_name: String,
    pub attendees: Vec<SlotAttendee>,
    pub group_ids: Vec<GroupId>,
    pub attendee_count: usize,
    pub max_attendees: u32,
    /// Never negative; an overbooked slot reports zero.
    pub available_spots: u32,
}

impl SlotOverview {
    pub fn new(
        slot: Slot,
        template: &EventTemplate,
        attendees: Vec<SlotAttendee>,
        group_ids: Vec<GroupId>,
    ) -> Self {
        let max_attendees = template.rule.max_attendees;
        let attendee_count = attendees.len();
        let taken = u32::try_from(attendee_count).unwrap_or(u32::MAX);
        Self {
            slot,
            template_name: template.name.clone(),
            attendees,
            group_ids,
            attendee_count,
            max_attendees,
            available_spots: max_attendees.saturating_sub(taken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrenceRule;

    fn slot() -> Slot {
        Slot::from_candidate(
            TemplateId(1),
            SlotCandidate {
                date: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
                time: None,
            },
        )
    }

    #[test]
    fn test_overview_counts_spots() {
        let mut template = EventTemplate::new("Dinner", RecurrenceRule::weekly(5));
        template.rule.max_attendees = 4;
        let attendees = vec![
            SlotAttendee::contact(ContactId(1)),
            SlotAttendee::contact(ContactId(2)),
        ];

        let overview = SlotOverview::new(slot(), &template, attendees, vec![GroupId(3)]);
        assert_eq!(overview.template_name, "Dinner");
        assert_eq!(overview.attendee_count, 2);
        assert_eq!(overview.available_spots, 2);
    }

    #[test]
    fn test_overbooked_slot_has_no_spots() {
        let template = EventTemplate::new("Coffee", RecurrenceRule::weekly(2));
        let attendees = vec![
            SlotAttendee::contact(ContactId(1)),
            SlotAttendee::contact(ContactId(2)),
        ];
        let overview = SlotOverview::new(slot(), &template, attendees, Vec::new());
        assert_eq!(overview.max_attendees, 1);
        assert_eq!(overview.available_spots, 0);
    }
}
