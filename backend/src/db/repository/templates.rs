//! Template and slot repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    ContactId, EventTemplate, GroupId, Slot, SlotAttendee, SlotId, SlotStatus, TemplateId,
};

/// Repository trait for event templates and their materialized slots.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Check if the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store a template, assigning an id when it has none.
    ///
    /// # Returns
    /// * `Ok(EventTemplate)` - The stored template with its id set
    async fn store_template(&self, template: &EventTemplate) -> RepositoryResult<EventTemplate>;

    /// Fetch a template by id.
    ///
    /// # Returns
    /// * `Ok(EventTemplate)` - The template
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn get_template(&self, id: TemplateId) -> RepositoryResult<EventTemplate>;

    /// All templates ordered by id.
    async fn list_templates(&self) -> RepositoryResult<Vec<EventTemplate>>;

    /// Insert a slot.
    ///
    /// # Returns
    /// * `Ok(Slot)` - The stored slot with its id set
    /// * `Err(RepositoryError::Conflict)` - If a slot already exists for the
    ///   same template and date
    async fn insert_slot(&self, slot: &Slot) -> RepositoryResult<Slot>;

    /// Slots of a template in ascending date order.
    async fn list_slots_for_template(&self, template_id: TemplateId)
        -> RepositoryResult<Vec<Slot>>;

    /// Move a slot to a new lifecycle state.
    ///
    /// # Returns
    /// * `Ok(Slot)` - The updated slot
    /// * `Err(RepositoryError::NotFound)` - If the slot id is unknown
    async fn update_slot_status(&self, id: SlotId, status: SlotStatus) -> RepositoryResult<Slot>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the slot id is unknown
    async fn get_slot(&self, id: SlotId) -> RepositoryResult<Slot>;

    /// Replace the contacts assigned to a slot.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the slot id is unknown
    /// * `Err(RepositoryError::ValidationError)` - If a contact or family is
    ///   not stored
    async fn set_slot_attendees(
        &self,
        id: SlotId,
        attendees: &[SlotAttendee],
    ) -> RepositoryResult<()>;

    /// Remove one contact from a slot.
    ///
    /// # Returns
    /// * `Ok(usize)` - Contacts still assigned
    /// * `Err(RepositoryError::NotFound)` - If the contact is not assigned
    async fn remove_slot_attendee(&self, id: SlotId, contact_id: ContactId)
        -> RepositoryResult<usize>;

    /// Contacts assigned to a slot, ordered by contact id.
    async fn slot_attendees(&self, id: SlotId) -> RepositoryResult<Vec<SlotAttendee>>;

    /// Replace the invite groups assigned to a slot.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the slot id is unknown
    /// * `Err(RepositoryError::ValidationError)` - If a group is not stored
    async fn set_slot_groups(&self, id: SlotId, group_ids: &[GroupId]) -> RepositoryResult<()>;

    /// Groups assigned to a slot in ascending id order.
    async fn slot_groups(&self, id: SlotId) -> RepositoryResult<Vec<GroupId>>;
}
