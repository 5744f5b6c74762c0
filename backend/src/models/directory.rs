use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContactId, FamilyId, GroupId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<ContactId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            family_id: None,
            birthday: None,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: Option<FamilyId>,
    pub name: String,
}

/// A set of contacts invited together, optionally tied to a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteGroup {
    pub id: Option<GroupId>,
    pub name: String,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub member_ids: Vec<ContactId>,
}

impl InviteGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            family_id: None,
            member_ids: Vec::new(),
        }
    }
}

/// Last known contact date per contact, input to the neglect ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactActivity {
    pub contact_id: ContactId,
    pub name: String,
    pub last_interaction: Option<NaiveDate>,
}
