use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{enum_column, non_blank, timestamp};
use crate::db::DatabaseError;
use crate::models::*;

const PAYMENT_COLUMNS: &str = "p.id, p.patient_id, p.amount, p.payment_date, p.payment_method,
     p.service_type, p.status, p.notes, p.created_at";

pub fn insert_payment(
    conn: &Connection,
    patient_id: i64,
    draft: &PaymentDraft,
    now: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO payments (patient_id, amount, payment_date, payment_method, service_type,
         status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient_id,
            draft.amount,
            draft.payment_date.to_string(),
            draft.payment_method,
            draft.service_type,
            draft.status.as_str(),
            non_blank(&draft.notes),
            timestamp(&now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_payment(conn: &Connection, id: i64) -> Result<Option<Payment>, DatabaseError> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.id = ?1");
    conn.query_row(&sql, params![id], payment_from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Newest first.
pub fn list_payments_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Payment>, DatabaseError> {
    let sql = format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments p WHERE p.patient_id = ?1
         ORDER BY p.payment_date DESC, p.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], payment_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Clinic-wide payment ledger, newest first.
pub fn list_all_payments(conn: &Connection) -> Result<Vec<PaymentWithPatient>, DatabaseError> {
    let sql = format!(
        "SELECT {PAYMENT_COLUMNS}, pt.name FROM payments p
         JOIN patients pt ON pt.id = p.patient_id
         ORDER BY p.payment_date DESC, p.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(PaymentWithPatient {
            payment: payment_from_row(row)?,
            patient_name: row.get(9)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_payment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM payments WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Payment", id));
    }
    Ok(())
}

fn payment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: row.get(3)?,
        payment_method: row.get(4)?,
        service_type: row.get(5)?,
        status: enum_column(row, 6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::PaymentStatus;

    #[test]
    fn ledger_joins_patient_names() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "Ana", "ana@example.com");
        let b = make_patient(&conn, "Beto", "beto@example.com");
        insert_payment(&conn, a, &payment_draft(300.0, PaymentStatus::Completed), ts("2026-02-01 10:00:00")).unwrap();
        let mut later = payment_draft(120.5, PaymentStatus::Pending);
        later.payment_date = date("2026-03-01");
        insert_payment(&conn, b, &later, ts("2026-03-01 10:00:00")).unwrap();

        let all = list_all_payments(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].patient_name, "Beto");
        assert_eq!(all[0].payment.status, PaymentStatus::Pending);
        assert_eq!(all[1].payment.amount, 300.0);
    }

    #[test]
    fn negative_amount_is_stored_as_given() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "Ana", "ana@example.com");
        let id = insert_payment(&conn, a, &payment_draft(-50.0, PaymentStatus::Cancelled), ts("2026-02-01 10:00:00")).unwrap();
        assert_eq!(get_payment(&conn, id).unwrap().unwrap().amount, -50.0);
        delete_payment(&conn, id).unwrap();
        assert!(list_payments_for_patient(&conn, a).unwrap().is_empty());
    }
}
