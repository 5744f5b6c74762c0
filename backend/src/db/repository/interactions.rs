//! Interaction history repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ContactId, FamilyId, GroupId, Interaction, InteractionEvent};

/// Repository trait for logged interactions.
///
/// Reads return [`InteractionEvent`]s, the reduced form the scorer consumes.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Store an interaction row, assigning an id.
    ///
    /// # Returns
    /// * `Ok(Interaction)` - The stored row
    /// * `Err(RepositoryError::ValidationError)` - If the row names no contact,
    ///   family or group
    async fn store_interaction(&self, interaction: &Interaction) -> RepositoryResult<Interaction>;

    async fn contact_interactions(
        &self,
        contact_id: ContactId,
    ) -> RepositoryResult<Vec<InteractionEvent>>;

    async fn family_interactions(
        &self,
        family_id: FamilyId,
    ) -> RepositoryResult<Vec<InteractionEvent>>;

    /// Interactions recorded directly against the group.
    async fn group_interactions(&self, group_id: GroupId)
        -> RepositoryResult<Vec<InteractionEvent>>;

    /// Interactions of the group's member contacts plus those of its linked
    /// family, each row at most once. Unknown groups yield an empty list.
    async fn fallback_interactions(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<InteractionEvent>>;
}
