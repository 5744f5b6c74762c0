//! Contacts, families and invite groups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    Contact, ContactActivity, ContactId, Family, FamilyId, GroupId, InviteGroup,
};

/// Repository trait for the people directory.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn store_contact(&self, contact: &Contact) -> RepositoryResult<Contact>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn get_contact(&self, id: ContactId) -> RepositoryResult<Contact>;

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>>;

    async fn store_family(&self, family: &Family) -> RepositoryResult<Family>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn get_family(&self, id: FamilyId) -> RepositoryResult<Family>;

    /// Store a group with its member list. Members and the family link must
    /// reference stored rows.
    async fn store_group(&self, group: &InviteGroup) -> RepositoryResult<InviteGroup>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn get_group(&self, id: GroupId) -> RepositoryResult<InviteGroup>;

    /// All groups ordered by name.
    async fn list_groups(&self) -> RepositoryResult<Vec<InviteGroup>>;

    /// Latest interaction date of every contact (`None` if never contacted).
    async fn last_interaction_dates(&self) -> RepositoryResult<Vec<ContactActivity>>;
}
