//! Shared application state.
//!
//! One `CoreState` is built at start-up and wrapped in `Arc`; every HTTP
//! handler reaches the database, configuration and notifier through it.
//! The SQLite connection sits behind a `Mutex`: handlers take the lock for
//! the duration of their synchronous database work and release it before
//! any `.await`.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::notifier::Notifier;
use crate::report::{BulletStyle, DocumentContext};

pub struct CoreState {
    conn: Mutex<Connection>,
    pub config: AppConfig,
    pub notifier: Notifier,
}

impl CoreState {
    /// Open (creating if needed) the database under the configured data
    /// directory and run migrations.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        let conn = db::open_database(&config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database ready");
        Ok(Self::with_connection(conn, config))
    }

    /// Wrap an already-open connection (tests use an in-memory one).
    pub fn with_connection(conn: Connection, config: AppConfig) -> Self {
        let notifier = Notifier::new(config.mail.clone());
        Self {
            conn: Mutex::new(conn),
            config,
            notifier,
        }
    }

    /// Lock the connection.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn bullet_style(&self) -> BulletStyle {
        BulletStyle::from_legacy_flag(self.config.legacy_bullets)
    }

    pub fn document_context(&self, today: NaiveDate) -> DocumentContext<'_> {
        DocumentContext {
            clinic: &self.config.clinic,
            bullets: self.bullet_style(),
            today,
        }
    }
}

/// Errors from the core state layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_database_in_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: tmp.path().join("data"),
            ..AppConfig::default()
        };
        let state = CoreState::open(config).unwrap();
        assert!(tmp.path().join("data").join("clinica.db").exists());
        assert_eq!(db::count_patients(&state.db().unwrap()).unwrap(), 0);
    }

    #[test]
    fn legacy_flag_selects_bullet_style() {
        let conn = db::open_memory_database().unwrap();
        let state = CoreState::with_connection(
            conn,
            AppConfig {
                legacy_bullets: true,
                ..AppConfig::default()
            },
        );
        assert_eq!(state.bullet_style(), BulletStyle::Legacy);
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(state.document_context(today).bullets, BulletStyle::Legacy);
    }

    #[test]
    fn notifier_gets_configured_relay() {
        let conn = db::open_memory_database().unwrap();
        let mut config = AppConfig::default();
        config.mail.smtp_port = 2525;
        let state = CoreState::with_connection(conn, config);
        assert_eq!(state.notifier.config().smtp_port, 2525);
    }
}
