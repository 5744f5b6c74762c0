//! Persistence layer for templates, slots, the contact directory and
//! interaction history.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers, embedding apps)      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Orchestration            │
//! │  - Slot generation on top of the recurrence engine      │
//! │  - Scores and attention lists from stored history       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │                              │
//! ┌───▼──────────────┐   ┌───────────▼──────────┐
//! │ Local Repository │   │  SQLite Repository   │
//! │   (in-memory)    │   │ (feature sqlite-repo)│
//! └──────────────────┘   └──────────────────────┘
//! ```
//!
//! Repositories are always passed in explicitly; there is no process-wide
//! instance.
//!
//! # Recommended Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use rapport::db::{services, RepositoryFactory};
//! use rapport::models::{EventTemplate, RecurrenceRule};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let repo = RepositoryFactory::create_local();
//! let template = EventTemplate::new("Game night", RecurrenceRule::monthly_nth_weekday(1, 5));
//! let id = services::store_template(repo.as_ref(), &template).await.unwrap().id.unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//! let report = services::generate_slots(repo.as_ref(), id, today, 3).await.unwrap();
//! assert_eq!(report.created, report.candidates);
//! # });
//! ```

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;

// ==================== Service Layer ====================

pub use services::{
    assign_contacts_to_slot, assign_groups_to_slot, complete_reminder, contact_score,
    create_reminder, create_slot_if_absent, family_score, generate_all_slots, generate_slots,
    group_score, group_scores, health_check, neglected_contacts, overdue_reminders,
    preview_slots, remove_contact_from_slot, upcoming_birthdays, upcoming_reminders,
    upcoming_slots, SlotGenerationReport, SlotInsertOutcome,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::{SqliteConfig, SqliteRepository, DEFAULT_SQLITE_PATH};
pub use repository::{
    DirectoryRepository, ErrorContext, FullRepository, InteractionRepository, ReminderRepository,
    RepositoryError, RepositoryResult, TemplateRepository,
};
