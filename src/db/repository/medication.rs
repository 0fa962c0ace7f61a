use rusqlite::{params, Connection, OptionalExtension};

use super::{enum_column, non_blank};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_medication(
    conn: &Connection,
    patient_id: i64,
    draft: &MedicationDraft,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medications (patient_id, name, dosage, frequency, start_date, end_date,
         status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient_id,
            draft.name,
            draft.dosage,
            draft.frequency,
            draft.start_date.to_string(),
            draft.end_date.map(|d| d.to_string()),
            draft.status.as_str(),
            non_blank(&draft.notes),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medication(conn: &Connection, id: i64) -> Result<Option<Medication>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, name, dosage, frequency, start_date, end_date, status, notes
         FROM medications WHERE id = ?1",
        params![id],
        medication_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_medications_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, dosage, frequency, start_date, end_date, status, notes
         FROM medications WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![patient_id], medication_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_medication(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM medications WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Medication", id));
    }
    Ok(())
}

fn medication_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: enum_column(row, 7)?,
        notes: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::MedicationStatus;

    #[test]
    fn medication_with_open_end_date() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let id = insert_medication(&conn, pid, &MedicationDraft {
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: "twice daily".into(),
            start_date: date("2024-01-01"),
            end_date: None,
            status: MedicationStatus::Active,
            notes: Some("with meals".into()),
        }).unwrap();

        let med = get_medication(&conn, id).unwrap().unwrap();
        assert_eq!(med.end_date, None);
        assert_eq!(med.notes.as_deref(), Some("with meals"));
    }

    #[test]
    fn end_before_start_is_accepted() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let id = insert_medication(&conn, pid, &MedicationDraft {
            name: "Ibuprofen".into(),
            dosage: "400mg".into(),
            frequency: "as needed".into(),
            start_date: date("2024-05-01"),
            end_date: Some(date("2024-04-01")),
            status: MedicationStatus::Discontinued,
            notes: None,
        }).unwrap();

        let list = list_medications_for_patient(&conn, pid).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].status, MedicationStatus::Discontinued);
    }
}
