//! Patient lookup for the live search box.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};

/// Maximum number of hits returned by one search.
pub const SEARCH_LIMIT: usize = 10;

/// One row of the JSON search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSearchHit {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: i64,
}

/// Case-insensitive substring search over name, email, phone and address.
///
/// A blank query matches nothing rather than everything.
pub fn search(
    conn: &Connection,
    query: &str,
    today: NaiveDate,
) -> Result<Vec<PatientSearchHit>, DatabaseError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let hits = db::search_patients(conn, query, SEARCH_LIMIT)?
        .into_iter()
        .map(|p| PatientSearchHit {
            age: p.age_on(today),
            id: p.id,
            name: p.name,
            email: p.email,
            phone: p.phone,
        })
        .collect();
    Ok(hits)
}
