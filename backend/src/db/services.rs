//! Service layer: repository-aware operations.
//!
//! These functions glue the pure logic in [`crate::services`] to a
//! [`FullRepository`]. They are what the HTTP handlers (and embedding
//! applications) should call.

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::repository::{
    DirectoryRepository, ErrorContext, FullRepository, InteractionRepository, ReminderRepository,
    RepositoryError, RepositoryResult, TemplateRepository,
};
use crate::models::{
    Contact, ContactId, EventTemplate, Family, FamilyId, GroupId, GroupScore, Interaction,
    InviteGroup, Reminder, ReminderId, ScoreResult, ScoreSource, Slot, SlotAttendee,
    SlotCandidate, SlotId, SlotOverview, SlotStatus, TemplateId,
};
use crate::services::attention::{self, BirthdayEntry, NeglectedContact};
use crate::services::recurrence::expand;
use crate::services::reminders;
use crate::services::scoring::{self, rank_by_attention, score_groups, GroupEvents};

/// Check if the repository is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Templates ====================

/// Validate and store a template. Rules that do not describe a recurrence
/// pattern are rejected here rather than silently producing no slots.
pub async fn store_template(
    repo: &dyn FullRepository,
    template: &EventTemplate,
) -> RepositoryResult<EventTemplate> {
    if template.name.trim().is_empty() {
        return Err(RepositoryError::validation("Template name must not be empty"));
    }
    if !template.rule.is_well_formed() {
        return Err(RepositoryError::validation_with_context(
            "Recurrence rule does not describe a weekly, fixed-day or nth-weekday pattern",
            ErrorContext::new("store_template")
                .with_entity("template")
                .with_details(format!("{:?}", template.rule)),
        ));
    }
    repo.store_template(template).await
}

pub async fn get_template(
    repo: &dyn FullRepository,
    id: TemplateId,
) -> RepositoryResult<EventTemplate> {
    repo.get_template(id).await
}

pub async fn list_templates(repo: &dyn FullRepository) -> RepositoryResult<Vec<EventTemplate>> {
    repo.list_templates().await
}

// ==================== Slots ====================

/// Outcome of a single idempotent slot insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotInsertOutcome {
    Created(Slot),
    AlreadyExists,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGenerationReport {
    pub template_id: Option<TemplateId>,
    /// Candidates produced by the recurrence engine.
    pub candidates: usize,
    pub created: usize,
    pub skipped_existing: usize,
    pub created_slots: Vec<Slot>,
}

/// Insert an `Available` slot unless one already exists for the same
/// template and date. A conflict on the unique key is reported as
/// [`SlotInsertOutcome::AlreadyExists`]; any other error propagates.
pub async fn create_slot_if_absent(
    repo: &dyn FullRepository,
    template_id: TemplateId,
    candidate: SlotCandidate,
) -> RepositoryResult<SlotInsertOutcome> {
    match repo
        .insert_slot(&Slot::from_candidate(template_id, candidate))
        .await
    {
        Ok(slot) => Ok(SlotInsertOutcome::Created(slot)),
        Err(e) if e.is_conflict() => {
            debug!(
                "Slot for template {} on {} already exists",
                template_id, candidate.date
            );
            Ok(SlotInsertOutcome::AlreadyExists)
        }
        Err(e) => Err(e.with_operation("create_slot_if_absent")),
    }
}

/// Candidates a generation run would consider, without writing anything.
pub async fn preview_slots(
    repo: &dyn FullRepository,
    template_id: TemplateId,
    today: NaiveDate,
    horizon_months: u32,
) -> RepositoryResult<Vec<SlotCandidate>> {
    let template = repo
        .get_template(template_id)
        .await
        .map_err(|e| e.with_operation("preview_slots"))?;
    Ok(expand(&template.rule, today, horizon_months))
}

/// Materialize the template's slots for `[today, today + horizon_months]`.
///
/// Idempotent: running it again (or concurrently) only creates the dates
/// that are still missing.
///
/// # Errors
/// * `NotFound` if the template does not exist
/// * any non-conflict insert error
pub async fn generate_slots(
    repo: &dyn FullRepository,
    template_id: TemplateId,
    today: NaiveDate,
    horizon_months: u32,
) -> RepositoryResult<SlotGenerationReport> {
    let template = repo
        .get_template(template_id)
        .await
        .map_err(|e| e.with_operation("generate_slots"))?;

    let mut report = SlotGenerationReport {
        template_id: Some(template_id),
        ..Default::default()
    };

    if !template.active {
        info!("Template {} is inactive, skipping generation", template_id);
        return Ok(report);
    }

    let candidates = expand(&template.rule, today, horizon_months);
    report.candidates = candidates.len();

    for candidate in candidates {
        match create_slot_if_absent(repo, template_id, candidate).await? {
            SlotInsertOutcome::Created(slot) => {
                report.created += 1;
                report.created_slots.push(slot);
            }
            SlotInsertOutcome::AlreadyExists => report.skipped_existing += 1,
        }
    }

    info!(
        "Generated slots for template {} ({}): {} candidates, {} created, {} existing",
        template_id, template.name, report.candidates, report.created, report.skipped_existing
    );
    Ok(report)
}

/// Run [`generate_slots`] for every active template.
pub async fn generate_all_slots(
    repo: &dyn FullRepository,
    today: NaiveDate,
    horizon_months: u32,
) -> RepositoryResult<Vec<SlotGenerationReport>> {
    let mut reports = Vec::new();
    for template in repo.list_templates().await? {
        let Some(id) = template.id else { continue };
        if template.active {
            reports.push(generate_slots(repo, id, today, horizon_months).await?);
        }
    }
    Ok(reports)
}

pub async fn list_slots(
    repo: &dyn FullRepository,
    template_id: TemplateId,
) -> RepositoryResult<Vec<Slot>> {
    repo.get_template(template_id).await?;
    repo.list_slots_for_template(template_id).await
}

pub async fn update_slot_status(
    repo: &dyn FullRepository,
    slot_id: SlotId,
    status: SlotStatus,
) -> RepositoryResult<Slot> {
    repo.update_slot_status(slot_id, status).await
}

/// Replace the contacts invited to a slot.
///
/// Each family is represented by its first member (lowest contact id);
/// families without members are skipped. A non-empty invitation list moves
/// the slot to `Assigned`.
///
/// # Errors
/// * `NotFound` if the slot or a family does not exist
/// * `ValidationError` if a contact does not exist
pub async fn assign_contacts_to_slot(
    repo: &dyn FullRepository,
    slot_id: SlotId,
    contact_ids: &[ContactId],
    family_ids: &[FamilyId],
) -> RepositoryResult<Slot> {
    let slot = repo
        .get_slot(slot_id)
        .await
        .map_err(|e| e.with_operation("assign_contacts_to_slot"))?;

    let mut attendees: Vec<SlotAttendee> =
        contact_ids.iter().copied().map(SlotAttendee::contact).collect();
    if !family_ids.is_empty() {
        let contacts = repo.list_contacts().await?;
        for &family_id in family_ids {
            repo.get_family(family_id)
                .await
                .map_err(|e| e.with_operation("assign_contacts_to_slot"))?;
            let first_member = contacts
                .iter()
                .filter(|c| c.family_id == Some(family_id))
                .filter_map(|c| c.id)
                .min();
            match first_member {
                Some(contact_id) => attendees.push(SlotAttendee {
                    contact_id,
                    family_id: Some(family_id),
                }),
                None => debug!("Family {} has no members to invite", family_id),
            }
        }
    }

    repo.set_slot_attendees(slot_id, &attendees).await?;
    if contact_ids.is_empty() && family_ids.is_empty() {
        return Ok(slot);
    }
    repo.update_slot_status(slot_id, SlotStatus::Assigned).await
}

/// Drop one contact from a slot. The slot returns to `Available` once
/// nobody is left.
pub async fn remove_contact_from_slot(
    repo: &dyn FullRepository,
    slot_id: SlotId,
    contact_id: ContactId,
) -> RepositoryResult<Slot> {
    let remaining = repo.remove_slot_attendee(slot_id, contact_id).await?;
    if remaining == 0 {
        return repo.update_slot_status(slot_id, SlotStatus::Available).await;
    }
    repo.get_slot(slot_id).await
}

/// Replace the invite groups of a slot. A non-empty list moves the slot to
/// `Assigned`.
///
/// # Errors
/// * `NotFound` if the slot or a group does not exist
pub async fn assign_groups_to_slot(
    repo: &dyn FullRepository,
    slot_id: SlotId,
    group_ids: &[GroupId],
) -> RepositoryResult<Slot> {
    let slot = repo
        .get_slot(slot_id)
        .await
        .map_err(|e| e.with_operation("assign_groups_to_slot"))?;
    for &group_id in group_ids {
        repo.get_group(group_id)
            .await
            .map_err(|e| e.with_operation("assign_groups_to_slot"))?;
    }

    repo.set_slot_groups(slot_id, group_ids).await?;
    if group_ids.is_empty() {
        return Ok(slot);
    }
    repo.update_slot_status(slot_id, SlotStatus::Assigned).await
}

/// Slots of active templates dated `today` or later, soonest first, with
/// their attendees and remaining capacity.
pub async fn upcoming_slots(
    repo: &dyn FullRepository,
    today: NaiveDate,
    limit: usize,
) -> RepositoryResult<Vec<SlotOverview>> {
    let mut upcoming: Vec<(Slot, usize)> = Vec::new();
    let templates: Vec<EventTemplate> = repo
        .list_templates()
        .await?
        .into_iter()
        .filter(|t| t.active)
        .collect();

    for (index, template) in templates.iter().enumerate() {
        let Some(id) = template.id else { continue };
        for slot in repo.list_slots_for_template(id).await? {
            if slot.date >= today {
                upcoming.push((slot, index));
            }
        }
    }
    upcoming.sort_by_key(|(slot, _)| (slot.date, slot.time, slot.id));
    upcoming.truncate(limit);

    let mut overviews = Vec::with_capacity(upcoming.len());
    for (slot, index) in upcoming {
        let Some(slot_id) = slot.id else { continue };
        let attendees = repo.slot_attendees(slot_id).await?;
        let group_ids = repo.slot_groups(slot_id).await?;
        overviews.push(SlotOverview::new(
            slot,
            &templates[index],
            attendees,
            group_ids,
        ));
    }
    Ok(overviews)
}

// ==================== Directory ====================

pub async fn store_contact(repo: &dyn FullRepository, contact: &Contact) -> RepositoryResult<Contact> {
    if contact.first_name.trim().is_empty() {
        return Err(RepositoryError::validation("Contact first name must not be empty"));
    }
    repo.store_contact(contact).await
}

pub async fn store_family(repo: &dyn FullRepository, family: &Family) -> RepositoryResult<Family> {
    if family.name.trim().is_empty() {
        return Err(RepositoryError::validation("Family name must not be empty"));
    }
    repo.store_family(family).await
}

pub async fn store_group(
    repo: &dyn FullRepository,
    group: &InviteGroup,
) -> RepositoryResult<InviteGroup> {
    if group.name.trim().is_empty() {
        return Err(RepositoryError::validation("Group name must not be empty"));
    }
    repo.store_group(group).await
}

pub async fn store_interaction(
    repo: &dyn FullRepository,
    interaction: &Interaction,
) -> RepositoryResult<Interaction> {
    if interaction.kind.trim().is_empty() {
        return Err(RepositoryError::validation("Interaction kind must not be empty"));
    }
    repo.store_interaction(interaction).await
}

// ==================== Scores ====================

/// Score a contact's interaction history.
///
/// # Errors
/// * `NotFound` if the contact does not exist
pub async fn contact_score(
    repo: &dyn FullRepository,
    contact_id: ContactId,
    now: NaiveDate,
) -> RepositoryResult<ScoreResult> {
    repo.get_contact(contact_id).await?;
    let events = repo.contact_interactions(contact_id).await?;
    Ok(scoring::score(&events, now))
}

/// Score a family's own interaction history.
///
/// # Errors
/// * `NotFound` if the family does not exist
pub async fn family_score(
    repo: &dyn FullRepository,
    family_id: FamilyId,
    now: NaiveDate,
) -> RepositoryResult<ScoreResult> {
    repo.get_family(family_id).await?;
    let events = repo.family_interactions(family_id).await?;
    Ok(scoring::score(&events, now))
}

/// Group score plus the signal it was derived from. The fallback query only
/// runs when the group has no direct interactions.
pub async fn group_score_with_source(
    repo: &dyn FullRepository,
    group_id: GroupId,
    now: NaiveDate,
) -> RepositoryResult<(ScoreResult, ScoreSource)> {
    let direct = repo.group_interactions(group_id).await?;
    if !direct.is_empty() {
        return Ok(scoring::score_group_with_source(&direct, Vec::new, now));
    }

    let fallback = repo.fallback_interactions(group_id).await?;
    Ok(scoring::score_group_with_source(&[], move || fallback, now))
}

/// Score a group. Unknown groups score as "No data".
pub async fn group_score(
    repo: &dyn FullRepository,
    group_id: GroupId,
    now: NaiveDate,
) -> RepositoryResult<ScoreResult> {
    group_score_with_source(repo, group_id, now)
        .await
        .map(|(score, _)| score)
}

/// Score every group, lowest score first.
pub async fn group_scores(
    repo: &dyn FullRepository,
    now: NaiveDate,
) -> RepositoryResult<Vec<GroupScore>> {
    let groups = repo.list_groups().await?;
    let mut inputs = Vec::with_capacity(groups.len());

    for group in groups {
        let Some(group_id) = group.id else { continue };
        let direct = repo.group_interactions(group_id).await?;
        let fallback = if direct.is_empty() {
            repo.fallback_interactions(group_id).await?
        } else {
            Vec::new()
        };
        inputs.push(GroupEvents {
            group_id,
            name: group.name,
            direct,
            fallback: move || fallback,
        });
    }

    let mut scores = score_groups(inputs, now);
    rank_by_attention(&mut scores);
    Ok(scores)
}

// ==================== Attention dashboard ====================

pub async fn upcoming_birthdays(
    repo: &dyn FullRepository,
    today: NaiveDate,
    window_days: u32,
) -> RepositoryResult<Vec<BirthdayEntry>> {
    let contacts = repo.list_contacts().await?;
    Ok(attention::upcoming_birthdays(&contacts, today, window_days))
}

pub async fn neglected_contacts(
    repo: &dyn FullRepository,
    today: NaiveDate,
    weeks: u32,
    limit: usize,
) -> RepositoryResult<Vec<NeglectedContact>> {
    let activity = repo.last_interaction_dates().await?;
    Ok(attention::neglected_contacts(&activity, today, weeks, limit))
}

// ==================== Reminders ====================

pub async fn create_reminder(
    repo: &dyn FullRepository,
    reminder: &Reminder,
) -> RepositoryResult<Reminder> {
    if reminder.title.trim().is_empty() {
        return Err(RepositoryError::validation("Reminder title must not be empty"));
    }
    repo.store_reminder(reminder).await
}

/// Complete a reminder on `today`. Repeating reminders move to their next
/// due date and stay open.
///
/// # Errors
/// * `NotFound` if the reminder does not exist
pub async fn complete_reminder(
    repo: &dyn FullRepository,
    id: ReminderId,
    today: NaiveDate,
) -> RepositoryResult<Reminder> {
    let reminder = repo
        .get_reminder(id)
        .await
        .map_err(|e| e.with_operation("complete_reminder"))?;
    let done = reminders::complete(&reminder, today);
    if done.is_open() {
        debug!("Reminder {} repeats, next due {}", id, done.due_date);
    }
    repo.store_reminder(&done).await
}

pub async fn delete_reminder(repo: &dyn FullRepository, id: ReminderId) -> RepositoryResult<()> {
    repo.delete_reminder(id).await
}

pub async fn open_reminders(repo: &dyn FullRepository) -> RepositoryResult<Vec<Reminder>> {
    repo.list_open_reminders().await
}

pub async fn overdue_reminders(
    repo: &dyn FullRepository,
    today: NaiveDate,
    limit: usize,
) -> RepositoryResult<Vec<Reminder>> {
    let open = repo.list_open_reminders().await?;
    Ok(reminders::overdue(&open, today, limit))
}

pub async fn upcoming_reminders(
    repo: &dyn FullRepository,
    today: NaiveDate,
    days: u32,
    limit: usize,
) -> RepositoryResult<Vec<Reminder>> {
    let open = repo.list_open_reminders().await?;
    Ok(reminders::due_within(&open, today, days, limit))
}
