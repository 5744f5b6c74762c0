//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies are kept separate from the domain models so that clients
//! never send ids for new rows. Responses reuse the models wherever they are
//! already serializable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    Contact, ContactId, EventTemplate, Family, FamilyId, GroupId, GroupScore, Interaction,
    InviteGroup, RecurrenceRule, Reminder, ReminderKind, RepeatInterval, ScoreResult,
    ScoreSource, ScoreTier, Slot, SlotCandidate, SlotOverview, SlotStatus, TemplateId,
};

// Re-export existing DTOs that are already serializable
pub use crate::db::services::SlotGenerationReport;
pub use crate::services::attention::{BirthdayEntry, NeglectedContact};

fn default_true() -> bool {
    true
}

// =============================================================================
// Requests
// =============================================================================

/// Request body for creating an event template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub rule: RecurrenceRule,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl From<CreateTemplateRequest> for EventTemplate {
    fn from(req: CreateTemplateRequest) -> Self {
        Self {
            id: None,
            name: req.name,
            description: req.description,
            category: req.category,
            rule: req.rule,
            active: req.active,
        }
    }
}

/// Request body for `PUT /v1/slots/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotStatusRequest {
    pub status: SlotStatus,
}

/// Request body for `PUT /v1/slots/{id}/contacts`. Replaces the current
/// invitations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignContactsRequest {
    #[serde(default)]
    pub contact_ids: Vec<ContactId>,
    #[serde(default)]
    pub family_ids: Vec<FamilyId>,
}

/// Request body for `PUT /v1/slots/{id}/groups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignGroupsRequest {
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl From<CreateContactRequest> for Contact {
    fn from(req: CreateContactRequest) -> Self {
        Self {
            id: None,
            first_name: req.first_name,
            last_name: req.last_name,
            family_id: req.family_id,
            birthday: req.birthday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

impl From<CreateFamilyRequest> for Family {
    fn from(req: CreateFamilyRequest) -> Self {
        Self {
            id: None,
            name: req.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub member_ids: Vec<ContactId>,
}

impl From<CreateGroupRequest> for InviteGroup {
    fn from(req: CreateGroupRequest) -> Self {
        Self {
            id: None,
            name: req.name,
            family_id: req.family_id,
            member_ids: req.member_ids,
        }
    }
}

/// Request body for logging an interaction. `date` defaults to today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInteractionRequest {
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub family_id: Option<FamilyId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub kind: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CreateInteractionRequest {
    pub fn into_interaction(self, today: NaiveDate) -> Interaction {
        Interaction {
            id: None,
            contact_id: self.contact_id,
            family_id: self.family_id,
            group_id: self.group_id,
            kind: self.kind,
            notes: self.notes,
            date: self.date.unwrap_or(today),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    #[serde(default)]
    pub kind: ReminderKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub repeat: RepeatInterval,
    #[serde(default)]
    pub contact_ids: Vec<ContactId>,
    #[serde(default)]
    pub family_ids: Vec<FamilyId>,
}

impl From<CreateReminderRequest> for Reminder {
    fn from(req: CreateReminderRequest) -> Self {
        Self {
            id: None,
            kind: req.kind,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            repeat: req.repeat,
            completed: false,
            completed_on: None,
            contact_ids: req.contact_ids,
            family_ids: req.family_ids,
        }
    }
}

// =============================================================================
// Query parameters
// =============================================================================

/// Query parameters for preview and generation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HorizonQuery {
    /// Months to look ahead (default: configured horizon)
    #[serde(default)]
    pub months: Option<u32>,
}

/// Query parameters for the birthdays dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BirthdaysQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Query parameters for the neglected contacts dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NeglectedQuery {
    #[serde(default)]
    pub weeks: Option<u32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query parameters for the upcoming slots dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpcomingSlotsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query parameters for the reminders dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemindersQuery {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

// =============================================================================
// Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<EventTemplate>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotPreviewResponse {
    pub template_id: TemplateId,
    pub horizon_months: u32,
    pub candidates: Vec<SlotCandidate>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub slots: Vec<Slot>,
    pub total: usize,
}

/// A score with its badge colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
    pub label: ScoreTier,
    pub recency: u8,
    pub frequency: u8,
    pub variety: u8,
    pub tone: String,
}

impl From<ScoreResult> for ScoreResponse {
    fn from(result: ScoreResult) -> Self {
        Self {
            score: result.score,
            label: result.label,
            recency: result.recency,
            frequency: result.frequency,
            variety: result.variety,
            tone: result.tone().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupScoreResponse {
    pub group_id: GroupId,
    pub name: String,
    pub source: ScoreSource,
    #[serde(flatten)]
    pub score: ScoreResponse,
}

impl From<GroupScore> for GroupScoreResponse {
    fn from(group: GroupScore) -> Self {
        Self {
            group_id: group.group_id,
            name: group.name,
            source: group.source,
            score: group.score.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupScoresResponse {
    /// Lowest score first
    pub groups: Vec<GroupScoreResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthdaysResponse {
    pub window_days: u32,
    pub birthdays: Vec<BirthdayEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeglectedResponse {
    pub weeks: u32,
    pub contacts: Vec<NeglectedContact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingSlotsResponse {
    pub slots: Vec<SlotOverview>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderListResponse {
    pub reminders: Vec<Reminder>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDashboardResponse {
    pub window_days: u32,
    /// Oldest first
    pub overdue: Vec<Reminder>,
    pub upcoming: Vec<Reminder>,
}
