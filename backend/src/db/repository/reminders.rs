//! Reminder repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Reminder, ReminderId};

/// Repository trait for dated reminders.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Insert or replace a reminder, assigning an id when it has none.
    ///
    /// # Returns
    /// * `Ok(Reminder)` - The stored reminder with its id set
    /// * `Err(RepositoryError::ValidationError)` - If a linked contact or
    ///   family is not stored
    async fn store_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn get_reminder(&self, id: ReminderId) -> RepositoryResult<Reminder>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown
    async fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<()>;

    /// Reminders not yet completed, ordered by due date then id.
    async fn list_open_reminders(&self) -> RepositoryResult<Vec<Reminder>>;
}
