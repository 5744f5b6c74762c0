use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContactId, FamilyId, GroupId, InteractionId};

/// Input to the scorer: only the day and an open-vocabulary tag matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub date: NaiveDate,
    pub kind: String,
}

impl InteractionEvent {
    pub fn new(date: NaiveDate, kind: impl Into<String>) -> Self {
        Self {
            date,
            kind: kind.into(),
        }
    }
}

/// A logged interaction row. A row may reference a contact, a family and a
/// group at the same time; it still counts once wherever it is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Option<InteractionId>,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub kind: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
}

impl Interaction {
    pub fn with_contact(contact_id: ContactId, kind: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            contact_id: Some(contact_id),
            family_id: None,
            group_id: None,
            kind: kind.into(),
            notes: None,
            date,
        }
    }

    pub fn with_family(family_id: FamilyId, kind: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            contact_id: None,
            family_id: Some(family_id),
            group_id: None,
            kind: kind.into(),
            notes: None,
            date,
        }
    }

    pub fn with_group(group_id: GroupId, kind: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            contact_id: None,
            family_id: None,
            group_id: Some(group_id),
            kind: kind.into(),
            notes: None,
            date,
        }
    }

    pub fn has_subject(&self) -> bool {
        self.contact_id.is_some() || self.family_id.is_some() || self.group_id.is_some()
    }

    pub fn to_event(&self) -> InteractionEvent {
        InteractionEvent::new(self.date, self.kind.clone())
    }
}

impl From<Interaction> for InteractionEvent {
    fn from(row: Interaction) -> Self {
        InteractionEvent {
            date: row.date,
            kind: row.kind,
        }
    }
}
