use rusqlite::{params, Connection, OptionalExtension};

use super::{enum_column, non_blank};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_disease(
    conn: &Connection,
    patient_id: i64,
    draft: &DiseaseDraft,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO diseases (patient_id, name, diagnosis_date, status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient_id,
            draft.name,
            draft.diagnosis_date.to_string(),
            draft.status.as_str(),
            non_blank(&draft.notes),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_disease(conn: &Connection, id: i64) -> Result<Option<Disease>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, name, diagnosis_date, status, notes FROM diseases WHERE id = ?1",
        params![id],
        disease_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_diseases_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Disease>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, diagnosis_date, status, notes
         FROM diseases WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![patient_id], disease_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Disease name → occurrence count across all patients, by name.
pub fn count_diseases_by_name(conn: &Connection) -> Result<Vec<(String, u32)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name, COUNT(*) FROM diseases GROUP BY name ORDER BY MIN(id)",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_disease(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM diseases WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Disease", id));
    }
    Ok(())
}

fn disease_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Disease> {
    Ok(Disease {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        diagnosis_date: row.get(3)?,
        status: enum_column(row, 4)?,
        notes: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::DiseaseStatus;

    fn disease(name: &str) -> DiseaseDraft {
        DiseaseDraft {
            name: name.into(),
            diagnosis_date: date("2023-01-10"),
            status: DiseaseStatus::Chronic,
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn disease_insert_list_delete() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let id = insert_disease(&conn, pid, &disease("Hypertension")).unwrap();

        let list = list_diseases_for_patient(&conn, pid).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, DiseaseStatus::Chronic);
        // Blank notes stored as NULL
        assert_eq!(list[0].notes, None);

        delete_disease(&conn, id).unwrap();
        assert!(get_disease(&conn, id).unwrap().is_none());
        assert!(matches!(delete_disease(&conn, id), Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn disease_for_missing_patient_violates_fk() {
        let conn = open_memory_database().unwrap();
        let err = insert_disease(&conn, 999, &disease("Flu")).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn counts_group_by_exact_name() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "Ana", "ana@example.com");
        let b = make_patient(&conn, "Beto", "beto@example.com");
        insert_disease(&conn, a, &disease("Diabetes")).unwrap();
        insert_disease(&conn, b, &disease("Diabetes")).unwrap();
        insert_disease(&conn, b, &disease("Asthma")).unwrap();

        let counts = count_diseases_by_name(&conn).unwrap();
        assert_eq!(counts, vec![("Diabetes".to_string(), 2), ("Asthma".to_string(), 1)]);
    }
}
