//! Shared router state.

use std::sync::Arc;

use chrono::FixedOffset;
use optica_db::Database;

use crate::config::{AppConfig, ConfigError};

/// State handed to every handler. Cloned per request, so everything inside
/// is a cheap handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    /// Resolved once from `config.utc_offset_minutes`.
    pub offset: FixedOffset,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Result<Self, ConfigError> {
        let offset = config.utc_offset()?;
        Ok(AppState {
            db,
            config: Arc::new(config),
            offset,
        })
    }
}
