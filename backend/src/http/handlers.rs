//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer in [`crate::db::services`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AssignContactsRequest, AssignGroupsRequest, BirthdaysQuery, BirthdaysResponse,
    CreateContactRequest, CreateFamilyRequest, CreateGroupRequest, CreateInteractionRequest,
    CreateReminderRequest, CreateTemplateRequest, GroupScoreResponse, GroupScoresResponse,
    HealthResponse, HorizonQuery, NeglectedQuery, NeglectedResponse, ReminderDashboardResponse,
    ReminderListResponse, RemindersQuery, ScoreResponse, SlotGenerationReport, SlotListResponse,
    SlotPreviewResponse, TemplateListResponse, UpcomingSlotsQuery, UpcomingSlotsResponse,
    UpdateSlotStatusRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::DirectoryRepository;
use crate::db::services as db_services;
use crate::models::{
    Contact, ContactId, EventTemplate, Family, FamilyId, GroupId, GroupScore, Interaction,
    InviteGroup, Reminder, ReminderId, Slot, SlotId, TemplateId,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Largest look-ahead accepted from a query string.
pub const MAX_HORIZON_MONTHS: u32 = 24;

fn horizon(state: &AppState, query: &HorizonQuery) -> Result<u32, AppError> {
    let months = query
        .months
        .unwrap_or(state.config.scheduling.horizon_months);
    if months > MAX_HORIZON_MONTHS {
        return Err(AppError::BadRequest(format!(
            "months must be at most {}",
            MAX_HORIZON_MONTHS
        )));
    }
    Ok(months)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Templates & Slots
// =============================================================================

/// POST /v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> CreatedResult<EventTemplate> {
    let template = EventTemplate::from(request);
    let stored = db_services::store_template(state.repository.as_ref(), &template).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /v1/templates
pub async fn list_templates(State(state): State<AppState>) -> HandlerResult<TemplateListResponse> {
    let templates = db_services::list_templates(state.repository.as_ref()).await?;
    let total = templates.len();
    Ok(Json(TemplateListResponse { templates, total }))
}

/// GET /v1/templates/{template_id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> HandlerResult<EventTemplate> {
    let template =
        db_services::get_template(state.repository.as_ref(), TemplateId::new(template_id)).await?;
    Ok(Json(template))
}

/// GET /v1/templates/{template_id}/preview?months=
///
/// Dates the next generation run would consider. Nothing is written.
pub async fn preview_slots(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Query(query): Query<HorizonQuery>,
) -> HandlerResult<SlotPreviewResponse> {
    let months = horizon(&state, &query)?;
    let template_id = TemplateId::new(template_id);
    let candidates =
        db_services::preview_slots(state.repository.as_ref(), template_id, state.today(), months)
            .await?;

    Ok(Json(SlotPreviewResponse {
        template_id,
        horizon_months: months,
        total: candidates.len(),
        candidates,
    }))
}

/// POST /v1/templates/{template_id}/slots?months=
///
/// Materialize missing slots. Safe to call repeatedly.
pub async fn generate_slots(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Query(query): Query<HorizonQuery>,
) -> HandlerResult<SlotGenerationReport> {
    let months = horizon(&state, &query)?;
    let report = db_services::generate_slots(
        state.repository.as_ref(),
        TemplateId::new(template_id),
        state.today(),
        months,
    )
    .await?;
    Ok(Json(report))
}

/// GET /v1/templates/{template_id}/slots
pub async fn list_slots(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
) -> HandlerResult<SlotListResponse> {
    let slots =
        db_services::list_slots(state.repository.as_ref(), TemplateId::new(template_id)).await?;
    let total = slots.len();
    Ok(Json(SlotListResponse { slots, total }))
}

/// PUT /v1/slots/{slot_id}/status
pub async fn update_slot_status(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
    Json(request): Json<UpdateSlotStatusRequest>,
) -> HandlerResult<Slot> {
    let slot = db_services::update_slot_status(
        state.repository.as_ref(),
        SlotId::new(slot_id),
        request.status,
    )
    .await?;
    Ok(Json(slot))
}

/// PUT /v1/slots/{slot_id}/contacts
///
/// Replaces the invited contacts; families are invited through their first
/// member.
pub async fn assign_slot_contacts(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
    Json(request): Json<AssignContactsRequest>,
) -> HandlerResult<Slot> {
    let slot = db_services::assign_contacts_to_slot(
        state.repository.as_ref(),
        SlotId::new(slot_id),
        &request.contact_ids,
        &request.family_ids,
    )
    .await?;
    Ok(Json(slot))
}

/// DELETE /v1/slots/{slot_id}/contacts/{contact_id}
pub async fn remove_slot_contact(
    State(state): State<AppState>,
    Path((slot_id, contact_id)): Path<(i64, i64)>,
) -> HandlerResult<Slot> {
    let slot = db_services::remove_contact_from_slot(
        state.repository.as_ref(),
        SlotId::new(slot_id),
        ContactId::new(contact_id),
    )
    .await?;
    Ok(Json(slot))
}

/// PUT /v1/slots/{slot_id}/groups
pub async fn assign_slot_groups(
    State(state): State<AppState>,
    Path(slot_id): Path<i64>,
    Json(request): Json<AssignGroupsRequest>,
) -> HandlerResult<Slot> {
    let slot = db_services::assign_groups_to_slot(
        state.repository.as_ref(),
        SlotId::new(slot_id),
        &request.group_ids,
    )
    .await?;
    Ok(Json(slot))
}

/// GET /v1/dashboard/slots?limit=
pub async fn upcoming_slots(
    State(state): State<AppState>,
    Query(query): Query<UpcomingSlotsQuery>,
) -> HandlerResult<UpcomingSlotsResponse> {
    let limit = query
        .limit
        .unwrap_or(state.config.scheduling.upcoming_slot_limit);
    let slots =
        db_services::upcoming_slots(state.repository.as_ref(), state.today(), limit).await?;
    let total = slots.len();
    Ok(Json(UpcomingSlotsResponse { slots, total }))
}

// =============================================================================
// Directory & Interactions
// =============================================================================

/// POST /v1/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> CreatedResult<Contact> {
    let stored =
        db_services::store_contact(state.repository.as_ref(), &Contact::from(request)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /v1/families
pub async fn create_family(
    State(state): State<AppState>,
    Json(request): Json<CreateFamilyRequest>,
) -> CreatedResult<Family> {
    let stored =
        db_services::store_family(state.repository.as_ref(), &Family::from(request)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> CreatedResult<InviteGroup> {
    let stored =
        db_services::store_group(state.repository.as_ref(), &InviteGroup::from(request)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /v1/interactions
pub async fn create_interaction(
    State(state): State<AppState>,
    Json(request): Json<CreateInteractionRequest>,
) -> CreatedResult<Interaction> {
    let interaction = request.into_interaction(state.today());
    let stored = db_services::store_interaction(state.repository.as_ref(), &interaction).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

// =============================================================================
// Scores
// =============================================================================

/// GET /v1/contacts/{contact_id}/score
pub async fn contact_score(
    State(state): State<AppState>,
    Path(contact_id): Path<i64>,
) -> HandlerResult<ScoreResponse> {
    let result = db_services::contact_score(
        state.repository.as_ref(),
        ContactId::new(contact_id),
        state.today(),
    )
    .await?;
    Ok(Json(result.into()))
}

/// GET /v1/families/{family_id}/score
pub async fn family_score(
    State(state): State<AppState>,
    Path(family_id): Path<i64>,
) -> HandlerResult<ScoreResponse> {
    let result = db_services::family_score(
        state.repository.as_ref(),
        FamilyId::new(family_id),
        state.today(),
    )
    .await?;
    Ok(Json(result.into()))
}

/// GET /v1/groups/{group_id}/score
///
/// Unknown groups report "No data" rather than 404.
pub async fn group_score(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> HandlerResult<GroupScoreResponse> {
    let group_id = GroupId::new(group_id);
    let repo = state.repository.as_ref();
    let (score, source) =
        db_services::group_score_with_source(repo, group_id, state.today()).await?;

    let name = match repo.get_group(group_id).await {
        Ok(group) => group.name,
        Err(e) if e.is_not_found() => String::new(),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(
        GroupScore {
            group_id,
            name,
            source,
            score,
        }
        .into(),
    ))
}

/// GET /v1/groups/scores
///
/// Every group, the ones most in need of attention first.
pub async fn group_scores(State(state): State<AppState>) -> HandlerResult<GroupScoresResponse> {
    let scores = db_services::group_scores(state.repository.as_ref(), state.today()).await?;
    let groups: Vec<GroupScoreResponse> = scores.into_iter().map(Into::into).collect();
    let total = groups.len();
    Ok(Json(GroupScoresResponse { groups, total }))
}

// =============================================================================
// Reminders
// =============================================================================

/// POST /v1/reminders
pub async fn create_reminder(
    State(state): State<AppState>,
    Json(request): Json<CreateReminderRequest>,
) -> CreatedResult<Reminder> {
    let stored =
        db_services::create_reminder(state.repository.as_ref(), &Reminder::from(request)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /v1/reminders
///
/// Open reminders, soonest first.
pub async fn list_reminders(State(state): State<AppState>) -> HandlerResult<ReminderListResponse> {
    let reminders = db_services::open_reminders(state.repository.as_ref()).await?;
    let total = reminders.len();
    Ok(Json(ReminderListResponse { reminders, total }))
}

/// POST /v1/reminders/{reminder_id}/complete
pub async fn complete_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<i64>,
) -> HandlerResult<Reminder> {
    let reminder = db_services::complete_reminder(
        state.repository.as_ref(),
        ReminderId::new(reminder_id),
        state.today(),
    )
    .await?;
    Ok(Json(reminder))
}

/// DELETE /v1/reminders/{reminder_id}
pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_reminder(state.repository.as_ref(), ReminderId::new(reminder_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Attention Dashboard
// =============================================================================

/// GET /v1/dashboard/birthdays?days=
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    Query(query): Query<BirthdaysQuery>,
) -> HandlerResult<BirthdaysResponse> {
    let window_days = query
        .days
        .unwrap_or(state.config.attention.birthday_window_days);
    let birthdays =
        db_services::upcoming_birthdays(state.repository.as_ref(), state.today(), window_days)
            .await?;
    Ok(Json(BirthdaysResponse {
        window_days,
        birthdays,
    }))
}

/// GET /v1/dashboard/neglected?weeks=&limit=
pub async fn neglected_contacts(
    State(state): State<AppState>,
    Query(query): Query<NeglectedQuery>,
) -> HandlerResult<NeglectedResponse> {
    let weeks = query.weeks.unwrap_or(state.config.attention.neglect_weeks);
    let limit = query
        .limit
        .unwrap_or(state.config.attention.neglected_limit);
    let contacts =
        db_services::neglected_contacts(state.repository.as_ref(), state.today(), weeks, limit)
            .await?;
    Ok(Json(NeglectedResponse { weeks, contacts }))
}

/// GET /v1/dashboard/reminders?days=&limit=
pub async fn reminder_dashboard(
    State(state): State<AppState>,
    Query(query): Query<RemindersQuery>,
) -> HandlerResult<ReminderDashboardResponse> {
    let window_days = query
        .days
        .unwrap_or(state.config.attention.reminder_window_days);
    let limit = query.limit.unwrap_or(state.config.attention.reminder_limit);
    let repo = state.repository.as_ref();
    let today = state.today();

    let overdue = db_services::overdue_reminders(repo, today, limit).await?;
    let upcoming = db_services::upcoming_reminders(repo, today, window_days, limit).await?;
    Ok(Json(ReminderDashboardResponse {
        window_days,
        overdue,
        upcoming,
    }))
}
