//! Repository traits.
//!
//! Storage is split by concern so tests and alternative backends can
//! implement only what they need:
//!
//! - [`TemplateRepository`]: event templates and their slots
//! - [`InteractionRepository`]: interaction history feeding the scorer
//! - [`DirectoryRepository`]: contacts, families and invite groups
//! - [`ReminderRepository`]: dated reminders
//!
//! [`FullRepository`] is implemented automatically for any type that
//! implements all four, and is what the service layer and HTTP state hold.

pub mod directory;
pub mod error;
pub mod interactions;
pub mod reminders;
pub mod templates;

pub use directory::DirectoryRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use interactions::InteractionRepository;
pub use reminders::ReminderRepository;
pub use templates::TemplateRepository;

/// Every repository capability in one object-safe trait.
pub trait FullRepository:
    TemplateRepository + InteractionRepository + DirectoryRepository + ReminderRepository
{
}

impl<T> FullRepository for T where
    T: TemplateRepository + InteractionRepository + DirectoryRepository + ReminderRepository
{
}
