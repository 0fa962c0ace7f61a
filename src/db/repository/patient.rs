use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{non_blank, timestamp};
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "id, name, email, phone, date_of_birth, address, height, weight,
     past_illnesses, current_medications, allergies, food_habits, created_at, updated_at";

pub fn insert_patient(
    conn: &Connection,
    draft: &PatientDraft,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, email, phone, date_of_birth, address, height, weight,
         past_illnesses, current_medications, allergies, food_habits, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            draft.name,
            draft.email,
            draft.phone,
            draft.date_of_birth.to_string(),
            draft.address,
            draft.height,
            draft.weight,
            non_blank(&draft.past_illnesses),
            non_blank(&draft.current_medications),
            non_blank(&draft.allergies),
            non_blank(&draft.food_habits),
            timestamp(&now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite every writable field and bump `updated_at`.
pub fn update_patient(
    conn: &Connection,
    id: i64,
    draft: &PatientDraft,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET name = ?2, email = ?3, phone = ?4, date_of_birth = ?5, address = ?6,
         height = ?7, weight = ?8, past_illnesses = ?9, current_medications = ?10,
         allergies = ?11, food_habits = ?12, updated_at = ?13
         WHERE id = ?1",
        params![
            id,
            draft.name,
            draft.email,
            draft.phone,
            draft.date_of_birth.to_string(),
            draft.address,
            draft.height,
            draft.weight,
            non_blank(&draft.past_illnesses),
            non_blank(&draft.current_medications),
            non_blank(&draft.allergies),
            non_blank(&draft.food_habits),
            timestamp(&now),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Patient", id));
    }
    Ok(())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
    conn.query_row(&sql, params![id], patient_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// All patients, most recently registered first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Deletes the patient; diseases, medications, prescriptions, diagnoses
/// and payments go with it through `ON DELETE CASCADE`.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Patient", id));
    }
    Ok(())
}

/// Case-insensitive substring match over name, email, phone and address.
pub fn search_patients(
    conn: &Connection,
    query: &str,
    limit: usize,
) -> Result<Vec<Patient>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients
         WHERE LOWER(name) LIKE LOWER(?1) ESCAPE '\\'
            OR LOWER(email) LIKE LOWER(?1) ESCAPE '\\'
            OR LOWER(phone) LIKE LOWER(?1) ESCAPE '\\'
            OR LOWER(address) LIKE LOWER(?1) ESCAPE '\\'
         ORDER BY id
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        date_of_birth: row.get(4)?,
        address: row.get(5)?,
        height: row.get(6)?,
        weight: row.get(7)?,
        past_illnesses: row.get(8)?,
        current_medications: row.get(9)?,
        allergies: row.get(10)?,
        food_habits: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn patient_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let id = make_patient(&conn, "John Doe", "john.doe@email.com");
        let p = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(p.name, "John Doe");
        assert_eq!(p.date_of_birth, date("1985-03-15"));
        assert_eq!(p.current_medications, None);
        assert_eq!(p.created_at, ts("2026-01-10 09:00:00"));
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "John Doe", "john@example.com");
        let err = insert_patient(&conn, &patient_draft("Jane Doe", "john@example.com"), ts("2026-01-10 09:00:00"))
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn update_bumps_updated_at_only() {
        let conn = open_memory_database().unwrap();
        let id = make_patient(&conn, "John Doe", "john@example.com");
        let mut draft = patient_draft("John Q. Doe", "john@example.com");
        draft.weight = 72.5;
        update_patient(&conn, id, &draft, ts("2026-02-01 12:00:00")).unwrap();

        let p = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(p.name, "John Q. Doe");
        assert_eq!(p.weight, 72.5);
        assert_eq!(p.created_at, ts("2026-01-10 09:00:00"));
        assert_eq!(p.updated_at, ts("2026-02-01 12:00:00"));
    }

    #[test]
    fn update_missing_patient_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_patient(&conn, 42, &patient_draft("X", "x@example.com"), ts("2026-02-01 12:00:00"))
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "Maria Lopez", "maria@example.com");
        let mut draft = patient_draft("Pedro Ruiz", "pedro@example.com");
        draft.address = "Calle Lopez Mateos 9".into();
        insert_patient(&conn, &draft, ts("2026-01-11 09:00:00")).unwrap();
        make_patient(&conn, "Carla Diaz", "carla@example.com");

        let hits = search_patients(&conn, "LOPEZ", 10).unwrap();
        let names: Vec<_> = hits.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Maria Lopez", "Pedro Ruiz"]);
    }

    #[test]
    fn search_with_no_match_is_empty() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "Maria Lopez", "maria@example.com");
        assert!(search_patients(&conn, "zzz", 10).unwrap().is_empty());
    }

    #[test]
    fn search_caps_results() {
        let conn = open_memory_database().unwrap();
        for i in 0..15 {
            make_patient(&conn, &format!("Paciente {i}"), &format!("p{i}@example.com"));
        }
        assert_eq!(search_patients(&conn, "paciente", 10).unwrap().len(), 10);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "Maria Lopez", "maria@example.com");
        assert!(search_patients(&conn, "%", 10).unwrap().is_empty());
    }

    #[test]
    fn list_patients_newest_first() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &patient_draft("Old", "old@example.com"), ts("2025-01-01 00:00:00")).unwrap();
        insert_patient(&conn, &patient_draft("New", "new@example.com"), ts("2026-01-01 00:00:00")).unwrap();
        let names: Vec<_> = list_patients(&conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }
}
