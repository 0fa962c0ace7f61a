use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{non_blank, timestamp};
use crate::db::DatabaseError;
use crate::models::*;

const PRESCRIPTION_COLUMNS: &str = "id, patient_id, diagnosis_id, date, doctor_name,
     professional_license, diagnosis, medications, instructions, created_at";

pub fn insert_prescription(
    conn: &Connection,
    patient_id: i64,
    draft: &PrescriptionDraft,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (patient_id, diagnosis_id, date, doctor_name,
         professional_license, diagnosis, medications, instructions, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient_id,
            draft.diagnosis_id,
            draft.date.to_string(),
            draft.doctor_name,
            draft.professional_license,
            draft.diagnosis,
            draft.medications,
            non_blank(&draft.instructions),
            timestamp(&now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Option<Prescription>, DatabaseError> {
    let sql = format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1");
    conn.query_row(&sql, params![id], prescription_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Newest first.
pub fn list_prescriptions_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE patient_id = ?1
         ORDER BY date DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], prescription_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_prescriptions_for_diagnosis(
    conn: &Connection,
    diagnosis_id: i64,
) -> Result<u32, DatabaseError> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE diagnosis_id = ?1",
        params![diagnosis_id],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(n)
}

pub fn delete_prescription(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM prescriptions WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Prescription", id));
    }
    Ok(())
}

fn prescription_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        diagnosis_id: row.get(2)?,
        date: row.get(3)?,
        doctor_name: row.get(4)?,
        professional_license: row.get(5)?,
        diagnosis: row.get(6)?,
        medications: row.get(7)?,
        instructions: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn prescription_insert_and_list() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let mut old = prescription_draft("Paracetamol 500mg", Some("Cada 8 horas"));
        old.date = date("2025-01-01");
        insert_prescription(&conn, pid, &old, ts("2025-01-01 10:00:00")).unwrap();
        let new_id = insert_prescription(&conn, pid, &prescription_draft("Ibuprofeno", None), ts("2026-02-01 10:00:00")).unwrap();

        let list = list_prescriptions_for_patient(&conn, pid).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, new_id);
        assert_eq!(list[0].diagnosis_id, None);
        assert_eq!(list[1].instructions.as_deref(), Some("Cada 8 horas"));
    }

    #[test]
    fn deleting_diagnosis_removes_only_linked_prescriptions() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let dx = crate::db::insert_diagnosis(&conn, pid, &diagnosis_draft("Faringitis", Some("Amoxicilina")), ts("2026-02-01 10:00:00")).unwrap();
        let mut linked = prescription_draft("Amoxicilina", None);
        linked.diagnosis_id = Some(dx);
        let linked_id = insert_prescription(&conn, pid, &linked, ts("2026-02-01 10:00:00")).unwrap();
        let unrelated = insert_prescription(&conn, pid, &prescription_draft("Amoxicilina", Some("Amoxicilina")), ts("2026-02-01 10:00:00")).unwrap();
        assert_eq!(count_prescriptions_for_diagnosis(&conn, dx).unwrap(), 1);

        crate::db::delete_diagnosis(&conn, dx).unwrap();

        assert!(get_prescription(&conn, linked_id).unwrap().is_none());
        assert!(get_prescription(&conn, unrelated).unwrap().is_some());
    }
}
