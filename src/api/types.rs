//! Shared types for the HTTP layer.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::db;
use crate::models::Patient;

/// Shared context for all routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Record timestamps are UTC.
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Ages, default form dates and document dates use the clinic's local day.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Load a patient or answer 404.
pub fn require_patient(conn: &Connection, id: i64) -> Result<Patient, ApiError> {
    db::get_patient(conn, id)?.ok_or_else(|| ApiError::NotFound(format!("Patient {id} not found")))
}

/// Lift `Option<T>` from a `get_*` lookup into a 404.
pub fn found<T>(value: Option<T>, entity: &str, id: i64) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::NotFound(format!("{entity} {id} not found")))
}
