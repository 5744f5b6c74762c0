//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data lives in
//! ordered maps behind a single lock, so execution is fast, deterministic
//! and isolated per instance.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
/// ```
/// use rapport::db::repositories::LocalRepository;
/// use rapport::db::repository::TemplateRepository;
/// use rapport::models::{EventTemplate, RecurrenceRule};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let repo = LocalRepository::new();
/// let template = EventTemplate::new("Dinner", RecurrenceRule::weekly(5));
/// let stored = repo.store_template(&template).await.unwrap();
/// assert!(stored.id.is_some());
/// assert_eq!(repo.template_count(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    templates: BTreeMap<TemplateId, EventTemplate>,
    slots: BTreeMap<SlotId, Slot>,
    slot_keys: HashMap<(TemplateId, NaiveDate), SlotId>,
    contacts: BTreeMap<ContactId, Contact>,
    families: BTreeMap<FamilyId, Family>,
    groups: BTreeMap<GroupId, InviteGroup>,
    interactions: BTreeMap<InteractionId, Interaction>,
    reminders: BTreeMap<ReminderId, Reminder>,
    slot_attendees: HashMap<SlotId, Vec<SlotAttendee>>,
    slot_groups: HashMap<SlotId, Vec<GroupId>>,

    // ID counters
    next_template_id: i64,
    next_slot_id: i64,
    next_contact_id: i64,
    next_family_id: i64,
    next_group_id: i64,
    next_interaction_id: i64,
    next_reminder_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            templates: BTreeMap::new(),
            slots: BTreeMap::new(),
            slot_keys: HashMap::new(),
            contacts: BTreeMap::new(),
            families: BTreeMap::new(),
            groups: BTreeMap::new(),
            interactions: BTreeMap::new(),
            reminders: BTreeMap::new(),
            slot_attendees: HashMap::new(),
            slot_groups: HashMap::new(),
            next_template_id: 1,
            next_slot_id: 1,
            next_contact_id: 1,
            next_family_id: 1,
            next_group_id: 1,
            next_interaction_id: 1,
            next_reminder_id: 1,
            is_healthy: true,
        }
    }
}

fn slot_not_found(operation: &str, id: SlotId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Slot {} not found", id),
        ErrorContext::new(operation)
            .with_entity("slot")
            .with_entity_id(id),
    )
}

/// Hand out the caller's id when present, otherwise the next free one.
fn assign_id(requested: Option<i64>, next: &mut i64) -> i64 {
    match requested {
        Some(id) => {
            *next = (*next).max(id + 1);
            id
        }
        None => {
            let id = *next;
            *next += 1;
            id
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn template_count(&self) -> usize {
        self.data.read().templates.len()
    }

    pub fn slot_count(&self) -> usize {
        self.data.read().slots.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn events_where(&self, predicate: impl Fn(&Interaction) -> bool) -> Vec<InteractionEvent> {
        let data = self.data.read();
        let mut events: Vec<InteractionEvent> = data
            .interactions
            .values()
            .filter(|row| predicate(row))
            .map(Interaction::to_event)
            .collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        events
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Templates & Slots ====================

#[async_trait]
impl TemplateRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn store_template(&self, template: &EventTemplate) -> RepositoryResult<EventTemplate> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = TemplateId(assign_id(
            template.id.map(|id| id.value()),
            &mut data.next_template_id,
        ));

        let mut stored = template.clone();
        stored.id = Some(id);
        data.templates.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_template(&self, id: TemplateId) -> RepositoryResult<EventTemplate> {
        self.check_health()?;
        self.data.read().templates.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Template {} not found", id),
                ErrorContext::new("get_template")
                    .with_entity("template")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<EventTemplate>> {
        self.check_health()?;
        Ok(self.data.read().templates.values().cloned().collect())
    }

    async fn insert_slot(&self, slot: &Slot) -> RepositoryResult<Slot> {
        self.check_health()?;
        let mut data = self.data.write();

        if !data.templates.contains_key(&slot.template_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Template {} not found", slot.template_id),
                ErrorContext::new("insert_slot").with_entity("template"),
            ));
        }

        let key = (slot.template_id, slot.date);
        if let Some(existing) = data.slot_keys.get(&key) {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Slot already exists for template {} on {}",
                    slot.template_id, slot.date
                ),
                ErrorContext::new("insert_slot")
                    .with_entity("slot")
                    .with_entity_id(existing),
            ));
        }

        let id = SlotId(assign_id(None, &mut data.next_slot_id));
        let mut stored = slot.clone();
        stored.id = Some(id);
        data.slot_keys.insert(key, id);
        data.slots.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_slots_for_template(
        &self,
        template_id: TemplateId,
    ) -> RepositoryResult<Vec<Slot>> {
        self.check_health()?;
        let data = self.data.read();
        let mut slots: Vec<Slot> = data
            .slots
            .values()
            .filter(|s| s.template_id == template_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.time));
        Ok(slots)
    }

    async fn update_slot_status(&self, id: SlotId, status: SlotStatus) -> RepositoryResult<Slot> {
        self.check_health()?;
        let mut data = self.data.write();
        let slot = data
            .slots
            .get_mut(&id)
            .ok_or_else(|| slot_not_found("update_slot_status", id))?;
        slot.status = status;
        Ok(slot.clone())
    }

    async fn get_slot(&self, id: SlotId) -> RepositoryResult<Slot> {
        self.check_health()?;
        self.data
            .read()
            .slots
            .get(&id)
            .cloned()
            .ok_or_else(|| slot_not_found("get_slot", id))
    }

    async fn set_slot_attendees(
        &self,
        id: SlotId,
        attendees: &[SlotAttendee],
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.slots.contains_key(&id) {
            return Err(slot_not_found("set_slot_attendees", id));
        }
        for attendee in attendees {
            if !data.contacts.contains_key(&attendee.contact_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown contact {}",
                    attendee.contact_id
                )));
            }
            if let Some(family_id) = attendee.family_id {
                if !data.families.contains_key(&family_id) {
                    return Err(RepositoryError::validation(format!(
                        "Unknown family {}",
                        family_id
                    )));
                }
            }
        }

        let mut stored = attendees.to_vec();
        stored.sort_by_key(|a| a.contact_id);
        stored.dedup_by_key(|a| a.contact_id);
        data.slot_attendees.insert(id, stored);
        Ok(())
    }

    async fn remove_slot_attendee(
        &self,
        id: SlotId,
        contact_id: ContactId,
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let remaining = data.slot_attendees.get_mut(&id).and_then(|attendees| {
            let before = attendees.len();
            attendees.retain(|a| a.contact_id != contact_id);
            (attendees.len() < before).then_some(attendees.len())
        });
        remaining.ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Contact {} is not assigned to slot {}", contact_id, id),
                ErrorContext::new("remove_slot_attendee")
                    .with_entity("slot")
                    .with_entity_id(id),
            )
        })
    }

    async fn slot_attendees(&self, id: SlotId) -> RepositoryResult<Vec<SlotAttendee>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .slot_attendees
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_slot_groups(&self, id: SlotId, group_ids: &[GroupId]) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.slots.contains_key(&id) {
            return Err(slot_not_found("set_slot_groups", id));
        }
        if let Some(missing) = group_ids.iter().find(|g| !data.groups.contains_key(*g)) {
            return Err(RepositoryError::validation(format!(
                "Unknown group {}",
                missing
            )));
        }

        let mut stored = group_ids.to_vec();
        stored.sort();
        stored.dedup();
        data.slot_groups.insert(id, stored);
        Ok(())
    }

    async fn slot_groups(&self, id: SlotId) -> RepositoryResult<Vec<GroupId>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .slot_groups
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

// ==================== Interactions ====================

#[async_trait]
impl InteractionRepository for LocalRepository {
    async fn store_interaction(&self, interaction: &Interaction) -> RepositoryResult<Interaction> {
        self.check_health()?;
        if !interaction.has_subject() {
            return Err(RepositoryError::validation(
                "Interaction must reference a contact, family or group",
            ));
        }

        let mut data = self.data.write();
        if let Some(contact_id) = interaction.contact_id {
            if !data.contacts.contains_key(&contact_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown contact {}",
                    contact_id
                )));
            }
        }
        if let Some(family_id) = interaction.family_id {
            if !data.families.contains_key(&family_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown family {}",
                    family_id
                )));
            }
        }
        if let Some(group_id) = interaction.group_id {
            if !data.groups.contains_key(&group_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown group {}",
                    group_id
                )));
            }
        }

        let id = InteractionId(assign_id(
            interaction.id.map(|id| id.value()),
            &mut data.next_interaction_id,
        ));
        let mut stored = interaction.clone();
        stored.id = Some(id);
        data.interactions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn contact_interactions(
        &self,
        contact_id: ContactId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        self.check_health()?;
        Ok(self.events_where(|row| row.contact_id == Some(contact_id)))
    }

    async fn family_interactions(
        &self,
        family_id: FamilyId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        self.check_health()?;
        Ok(self.events_where(|row| row.family_id == Some(family_id)))
    }

    async fn group_interactions(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        self.check_health()?;
        Ok(self.events_where(|row| row.group_id == Some(group_id)))
    }

    async fn fallback_interactions(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        self.check_health()?;
        let Some(group) = self.data.read().groups.get(&group_id).cloned() else {
            return Ok(Vec::new());
        };

        let members: HashSet<ContactId> = group.member_ids.iter().copied().collect();
        Ok(self.events_where(|row| {
            let by_member = row.contact_id.is_some_and(|id| members.contains(&id));
            let by_family = group.family_id.is_some() && row.family_id == group.family_id;
            by_member || by_family
        }))
    }
}

// ==================== Directory ====================

#[async_trait]
impl DirectoryRepository for LocalRepository {
    async fn store_contact(&self, contact: &Contact) -> RepositoryResult<Contact> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(family_id) = contact.family_id {
            if !data.families.contains_key(&family_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown family {}",
                    family_id
                )));
            }
        }

        let id = ContactId(assign_id(
            contact.id.map(|id| id.value()),
            &mut data.next_contact_id,
        ));
        let mut stored = contact.clone();
        stored.id = Some(id);
        data.contacts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_contact(&self, id: ContactId) -> RepositoryResult<Contact> {
        self.check_health()?;
        self.data.read().contacts.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Contact {} not found", id),
                ErrorContext::new("get_contact")
                    .with_entity("contact")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>> {
        self.check_health()?;
        Ok(self.data.read().contacts.values().cloned().collect())
    }

    async fn store_family(&self, family: &Family) -> RepositoryResult<Family> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = FamilyId(assign_id(
            family.id.map(|id| id.value()),
            &mut data.next_family_id,
        ));
        let mut stored = family.clone();
        stored.id = Some(id);
        data.families.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_family(&self, id: FamilyId) -> RepositoryResult<Family> {
        self.check_health()?;
        self.data.read().families.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Family {} not found", id),
                ErrorContext::new("get_family")
                    .with_entity("family")
                    .with_entity_id(id),
            )
        })
    }

    async fn store_group(&self, group: &InviteGroup) -> RepositoryResult<InviteGroup> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(family_id) = group.family_id {
            if !data.families.contains_key(&family_id) {
                return Err(RepositoryError::validation(format!(
                    "Unknown family {}",
                    family_id
                )));
            }
        }
        if let Some(missing) = group
            .member_ids
            .iter()
            .find(|id| !data.contacts.contains_key(*id))
        {
            return Err(RepositoryError::validation(format!(
                "Unknown member contact {}",
                missing
            )));
        }

        let id = GroupId(assign_id(
            group.id.map(|id| id.value()),
            &mut data.next_group_id,
        ));
        let mut stored = group.clone();
        stored.id = Some(id);
        stored.member_ids.sort();
        stored.member_ids.dedup();
        data.groups.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_group(&self, id: GroupId) -> RepositoryResult<InviteGroup> {
        self.check_health()?;
        self.data.read().groups.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Group {} not found", id),
                ErrorContext::new("get_group")
                    .with_entity("group")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_groups(&self) -> RepositoryResult<Vec<InviteGroup>> {
        self.check_health()?;
        let mut groups: Vec<InviteGroup> = self.data.read().groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn last_interaction_dates(&self) -> RepositoryResult<Vec<ContactActivity>> {
        self.check_health()?;
        let data = self.data.read();

        let mut latest: HashMap<ContactId, NaiveDate> = HashMap::new();
        for row in data.interactions.values() {
            if let Some(contact_id) = row.contact_id {
                latest
                    .entry(contact_id)
                    .and_modify(|date| *date = (*date).max(row.date))
                    .or_insert(row.date);
            }
        }

        Ok(data
            .contacts
            .iter()
            .map(|(id, contact)| ContactActivity {
                contact_id: *id,
                name: contact.display_name(),
                last_interaction: latest.get(id).copied(),
            })
            .collect())
    }
}

// ==================== Reminders ====================

#[async_trait]
impl ReminderRepository for LocalRepository {
    async fn store_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(missing) = reminder
            .contact_ids
            .iter()
            .find(|id| !data.contacts.contains_key(*id))
        {
            return Err(RepositoryError::validation(format!(
                "Unknown contact {}",
                missing
            )));
        }
        if let Some(missing) = reminder
            .family_ids
            .iter()
            .find(|id| !data.families.contains_key(*id))
        {
            return Err(RepositoryError::validation(format!(
                "Unknown family {}",
                missing
            )));
        }

        let id = ReminderId(assign_id(
            reminder.id.map(|id| id.value()),
            &mut data.next_reminder_id,
        ));
        let mut stored = reminder.clone();
        stored.id = Some(id);
        stored.contact_ids.sort();
        stored.contact_ids.dedup();
        stored.family_ids.sort();
        stored.family_ids.dedup();
        data.reminders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_reminder(&self, id: ReminderId) -> RepositoryResult<Reminder> {
        self.check_health()?;
        self.data.read().reminders.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Reminder {} not found", id),
                ErrorContext::new("get_reminder")
                    .with_entity("reminder")
                    .with_entity_id(id),
            )
        })
    }

    async fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<()> {
        self.check_health()?;
        match self.data.write().reminders.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                format!("Reminder {} not found", id),
                ErrorContext::new("delete_reminder")
                    .with_entity("reminder")
                    .with_entity_id(id),
            )),
        }
    }

    async fn list_open_reminders(&self) -> RepositoryResult<Vec<Reminder>> {
        self.check_health()?;
        let mut open: Vec<Reminder> = self
            .data
            .read()
            .reminders
            .values()
            .filter(|r| r.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|r| (r.due_date, r.id));
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_templates().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_store_and_retrieve_template() {
        let repo = LocalRepository::new();
        let template = EventTemplate::new("Family dinner", RecurrenceRule::monthly_on_day(15));

        let stored = repo.store_template(&template).await.unwrap();
        let id = stored.id.unwrap();
        let retrieved = repo.get_template(id).await.unwrap();
        assert_eq!(retrieved.name, "Family dinner");
        assert_eq!(retrieved.rule, template.rule);

        let missing = repo.get_template(TemplateId(99)).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_slot_is_conflict() {
        let repo = LocalRepository::new();
        let template = repo
            .store_template(&EventTemplate::new("Walk", RecurrenceRule::weekly(6)))
            .await
            .unwrap();
        let template_id = template.id.unwrap();
        let candidate = SlotCandidate {
            date: d(2024, 6, 8),
            time: None,
        };

        let first = repo
            .insert_slot(&Slot::from_candidate(template_id, candidate))
            .await
            .unwrap();
        assert_eq!(first.status, SlotStatus::Available);

        let err = repo
            .insert_slot(&Slot::from_candidate(template_id, candidate))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.slot_count(), 1);
    }

    #[tokio::test]
    async fn test_slots_listed_by_date_and_status_update() {
        let repo = LocalRepository::new();
        let template_id = repo
            .store_template(&EventTemplate::new("Call", RecurrenceRule::weekly(1)))
            .await
            .unwrap()
            .id
            .unwrap();

        for day in [17, 3, 10] {
            let candidate = SlotCandidate {
                date: d(2024, 6, day),
                time: None,
            };
            repo.insert_slot(&Slot::from_candidate(template_id, candidate))
                .await
                .unwrap();
        }

        let slots = repo.list_slots_for_template(template_id).await.unwrap();
        let dates: Vec<_> = slots.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![d(2024, 6, 3), d(2024, 6, 10), d(2024, 6, 17)]);

        let updated = repo
            .update_slot_status(slots[0].id.unwrap(), SlotStatus::Assigned)
            .await
            .unwrap();
        assert_eq!(updated.status, SlotStatus::Assigned);
        assert!(repo
            .update_slot_status(SlotId(404), SlotStatus::Cancelled)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_fallback_counts_each_row_once() {
        let repo = LocalRepository::new();
        let family = repo
            .store_family(&Family {
                id: None,
                name: "Millers".to_string(),
            })
            .await
            .unwrap();
        let family_id = family.id.unwrap();

        let mut ann = Contact::new("Ann", "Miller");
        ann.family_id = Some(family_id);
        let ann = repo.store_contact(&ann).await.unwrap();
        let ann_id = ann.id.unwrap();
        let outsider = repo.store_contact(&Contact::new("Bo", "Smith")).await.unwrap();

        let mut group = InviteGroup::new("Millers & friends");
        group.family_id = Some(family_id);
        group.member_ids = vec![ann_id];
        let group_id = repo.store_group(&group).await.unwrap().id.unwrap();

        // Tagged with both the member and the family
        let mut both = Interaction::with_contact(ann_id, "call", d(2024, 6, 1));
        both.family_id = Some(family_id);
        repo.store_interaction(&both).await.unwrap();
        repo.store_interaction(&Interaction::with_family(family_id, "visit", d(2024, 6, 5)))
            .await
            .unwrap();
        repo.store_interaction(&Interaction::with_contact(
            outsider.id.unwrap(),
            "message",
            d(2024, 6, 7),
        ))
        .await
        .unwrap();

        let fallback = repo.fallback_interactions(group_id).await.unwrap();
        assert_eq!(fallback.len(), 2);
        assert!(repo.group_interactions(group_id).await.unwrap().is_empty());
        assert!(repo
            .fallback_interactions(GroupId(77))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_interaction_requires_subject() {
        let repo = LocalRepository::new();
        let mut orphan = Interaction::with_contact(ContactId(1), "call", d(2024, 6, 1));
        orphan.contact_id = None;
        let err = repo.store_interaction(&orphan).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        let unknown = Interaction::with_contact(ContactId(5), "call", d(2024, 6, 1));
        assert!(repo.store_interaction(&unknown).await.is_err());
    }

    #[tokio::test]
    async fn test_group_members_must_exist() {
        let repo = LocalRepository::new();
        let mut group = InviteGroup::new("Ghosts");
        group.member_ids = vec![ContactId(3)];
        assert!(repo.store_group(&group).await.is_err());
    }

    #[tokio::test]
    async fn test_last_interaction_dates() {
        let repo = LocalRepository::new();
        let ann = repo.store_contact(&Contact::new("Ann", "Lee")).await.unwrap();
        let ann_id = ann.id.unwrap();
        repo.store_contact(&Contact::new("Bo", "Lee")).await.unwrap();

        for date in [d(2024, 5, 1), d(2024, 6, 9), d(2024, 6, 2)] {
            repo.store_interaction(&Interaction::with_contact(ann_id, "call", date))
                .await
                .unwrap();
        }

        let activity = repo.last_interaction_dates().await.unwrap();
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].last_interaction, Some(d(2024, 6, 9)));
        assert_eq!(activity[0].name, "Ann Lee");
        assert_eq!(activity[1].last_interaction, None);
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.store_template(&EventTemplate::new("X", RecurrenceRule::weekly(0)))
            .await
            .unwrap();
        repo.set_healthy(false);
        repo.clear();
        assert_eq!(repo.template_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_family() {
        let repo = LocalRepository::new();
        let family = repo
            .store_family(&Family {
                id: None,
                name: "Parks".to_string(),
            })
            .await
            .unwrap();
        let fetched = repo.get_family(family.id.unwrap()).await.unwrap();
        assert_eq!(fetched.name, "Parks");
        assert!(repo.get_family(FamilyId(9)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_slot_attendees_replace_and_remove() {
        let repo = LocalRepository::new();
        let template_id = repo
            .store_template(&EventTemplate::new("Brunch", RecurrenceRule::weekly(0)))
            .await
            .unwrap()
            .id
            .unwrap();
        let slot_id = repo
            .insert_slot(&Slot::from_candidate(
                template_id,
                SlotCandidate {
                    date: d(2024, 6, 9),
                    time: None,
                },
            ))
            .await
            .unwrap()
            .id
            .unwrap();
        let ann = repo.store_contact(&Contact::new("Ann", "")).await.unwrap().id.unwrap();
        let bo = repo.store_contact(&Contact::new("Bo", "")).await.unwrap().id.unwrap();

        repo.set_slot_attendees(
            slot_id,
            &[
                SlotAttendee::contact(bo),
                SlotAttendee::contact(ann),
                SlotAttendee::contact(bo),
            ],
        )
        .await
        .unwrap();
        let ids: Vec<_> = repo
            .slot_attendees(slot_id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.contact_id)
            .collect();
        assert_eq!(ids, vec![ann, bo]);

        assert_eq!(repo.remove_slot_attendee(slot_id, ann).await.unwrap(), 1);
        assert!(repo
            .remove_slot_attendee(slot_id, ann)
            .await
            .unwrap_err()
            .is_not_found());

        let err = repo
            .set_slot_attendees(slot_id, &[SlotAttendee::contact(ContactId(99))])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
        assert!(repo
            .set_slot_groups(SlotId(404), &[])
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_open_reminders_ordered_and_deletable() {
        let repo = LocalRepository::new();
        let late = repo
            .store_reminder(&Reminder::new(ReminderKind::Call, "Call Ann", d(2024, 6, 20)))
            .await
            .unwrap();
        let early = repo
            .store_reminder(&Reminder::new(ReminderKind::Visit, "Visit Bo", d(2024, 6, 2)))
            .await
            .unwrap();
        let mut done = Reminder::new(ReminderKind::Custom, "Done", d(2024, 6, 1));
        done.completed = true;
        repo.store_reminder(&done).await.unwrap();

        let open = repo.list_open_reminders().await.unwrap();
        assert_eq!(open.iter().map(|r| r.id).collect::<Vec<_>>(), vec![early.id, late.id]);

        repo.delete_reminder(early.id.unwrap()).await.unwrap();
        assert!(repo
            .delete_reminder(early.id.unwrap())
            .await
            .unwrap_err()
            .is_not_found());

        let mut orphan = Reminder::new(ReminderKind::Call, "Ghost", d(2024, 6, 3));
        orphan.contact_ids = vec![ContactId(42)];
        assert!(repo.store_reminder(&orphan).await.is_err());
    }
}
