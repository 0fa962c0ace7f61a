use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{non_blank, timestamp};
use crate::db::DatabaseError;
use crate::models::*;

const DIAGNOSIS_COLUMNS: &str = "id, patient_id, date, doctor_name, professional_license,
     symptoms, diagnosis, treatment_plan, notes, created_at";

pub fn insert_diagnosis(
    conn: &Connection,
    patient_id: i64,
    draft: &DiagnosisDraft,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO diagnoses (patient_id, date, doctor_name, professional_license, symptoms,
         diagnosis, treatment_plan, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient_id,
            draft.date.to_string(),
            draft.doctor_name,
            draft.professional_license,
            draft.symptoms,
            draft.diagnosis,
            non_blank(&draft.treatment_plan),
            non_blank(&draft.notes),
            timestamp(&now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_diagnosis(conn: &Connection, id: i64) -> Result<Option<Diagnosis>, DatabaseError> {
    let sql = format!("SELECT {DIAGNOSIS_COLUMNS} FROM diagnoses WHERE id = ?1");
    conn.query_row(&sql, params![id], diagnosis_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Newest first.
pub fn list_diagnoses_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Diagnosis>, DatabaseError> {
    let sql = format!(
        "SELECT {DIAGNOSIS_COLUMNS} FROM diagnoses WHERE patient_id = ?1 ORDER BY date DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], diagnosis_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// The diagnosis with the latest date (ties broken by insertion order).
pub fn latest_diagnosis_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<Diagnosis>, DatabaseError> {
    let sql = format!(
        "SELECT {DIAGNOSIS_COLUMNS} FROM diagnoses WHERE patient_id = ?1
         ORDER BY date DESC, id DESC LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id], diagnosis_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Prescriptions derived from this diagnosis are removed by the FK cascade.
pub fn delete_diagnosis(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM diagnoses WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Diagnosis", id));
    }
    Ok(())
}

fn diagnosis_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Diagnosis> {
    Ok(Diagnosis {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        date: row.get(2)?,
        doctor_name: row.get(3)?,
        professional_license: row.get(4)?,
        symptoms: row.get(5)?,
        diagnosis: row.get(6)?,
        treatment_plan: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn latest_diagnosis_prefers_date_then_id() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let mut older = diagnosis_draft("Gripe", None);
        older.date = date("2025-12-01");
        insert_diagnosis(&conn, pid, &older, ts("2026-02-01 10:00:00")).unwrap();
        insert_diagnosis(&conn, pid, &diagnosis_draft("Faringitis", None), ts("2026-02-01 10:00:00")).unwrap();
        let same_day = insert_diagnosis(&conn, pid, &diagnosis_draft("Otitis", None), ts("2026-02-01 11:00:00")).unwrap();

        let latest = latest_diagnosis_for_patient(&conn, pid).unwrap().unwrap();
        assert_eq!(latest.id, same_day);

        let list = list_diagnoses_for_patient(&conn, pid).unwrap();
        assert_eq!(list.last().unwrap().diagnosis, "Gripe");
    }

    #[test]
    fn blank_treatment_plan_stored_as_null() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let id = insert_diagnosis(&conn, pid, &diagnosis_draft("Gripe", Some("   ")), ts("2026-02-01 10:00:00")).unwrap();
        assert_eq!(get_diagnosis(&conn, id).unwrap().unwrap().treatment_plan, None);
    }

    #[test]
    fn latest_for_patient_without_diagnoses_is_none() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        assert!(latest_diagnosis_for_patient(&conn, pid).unwrap().is_none());
    }
}
