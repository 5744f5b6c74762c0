use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContactId, FamilyId, ReminderId};

/// Repeat cadence of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    None,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RepeatInterval {
    pub fn is_repeating(&self) -> bool {
        !matches!(self, RepeatInterval::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatInterval::None => "none",
            RepeatInterval::Weekly => "weekly",
            RepeatInterval::Monthly => "monthly",
            RepeatInterval::Quarterly => "quarterly",
            RepeatInterval::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for RepeatInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown repeat interval: {}", s)),
        }
    }
}

/// What a reminder is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Birthday,
    WeddingAnniversary,
    Call,
    Invite,
    Visit,
    #[default]
    Custom,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Birthday => "birthday",
            ReminderKind::WeddingAnniversary => "wedding_anniversary",
            ReminderKind::Call => "call",
            ReminderKind::Invite => "invite",
            ReminderKind::Visit => "visit",
            ReminderKind::Custom => "custom",
        }
    }
}

impl std::str::FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "birthday" => Ok(Self::Birthday),
            "wedding_anniversary" => Ok(Self::WeddingAnniversary),
            "call" => Ok(Self::Call),
            "invite" => Ok(Self::Invite),
            "visit" => Ok(Self::Visit),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown reminder kind: {}", s)),
        }
    }
}

/// A dated to-do, optionally about specific contacts and families.
///
/// Completing a repeating reminder moves `due_date` forward instead of
/// closing it; see [`crate::services::reminders::complete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Option<ReminderId>,
    #[serde(default)]
    pub kind: ReminderKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub repeat: RepeatInterval,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub contact_ids: Vec<ContactId>,
    #[serde(default)]
    pub family_ids: Vec<FamilyId>,
}

impl Reminder {
    pub fn new(kind: ReminderKind, title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: None,
            kind,
            title: title.into(),
            description: None,
            due_date,
            repeat: RepeatInterval::None,
            completed: false,
            completed_on: None,
            contact_ids: Vec::new(),
            family_ids: Vec::new(),
        }
    }

    pub fn repeating(mut self, repeat: RepeatInterval) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn is_open(&self) -> bool {
        !self.completed
    }
}
