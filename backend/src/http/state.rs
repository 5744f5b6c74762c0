//! Application state for the HTTP server.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Horizon and dashboard defaults
    pub config: Arc<AppConfig>,
    /// Pinned "today"; the local date is used when unset
    today: Option<NaiveDate>,
}

impl AppState {
    /// Create a new application state with the given repository and default
    /// settings.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repository, AppConfig::default())
    }

    pub fn with_config(repository: Arc<dyn FullRepository>, config: AppConfig) -> Self {
        Self {
            repository,
            config: Arc::new(config),
            today: None,
        }
    }

    /// Evaluate every request as if it ran on `date`.
    pub fn with_fixed_today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
