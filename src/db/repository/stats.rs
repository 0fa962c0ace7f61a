use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::timestamp;
use crate::db::DatabaseError;
use crate::models::enums::PaymentStatus;

/// Revenue figures shown on the dashboard and the payments ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentTotals {
    /// Sum of `Completed` payments.
    pub total_revenue: f64,
    /// Sum of `Pending` payments.
    pub pending_payments: f64,
    pub total_payments: u32,
}

pub fn count_patients(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?)
}

pub fn count_diseases(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM diseases", [], |row| row.get(0))?)
}

pub fn count_patients_with_diagnoses(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(DISTINCT patient_id) FROM diagnoses",
        [],
        |row| row.get(0),
    )?)
}

pub fn count_patients_with_prescriptions(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(DISTINCT patient_id) FROM prescriptions",
        [],
        |row| row.get(0),
    )?)
}

pub fn count_patients_created_since(
    conn: &Connection,
    since: NaiveDateTime,
) -> Result<u32, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE created_at >= ?1",
        params![timestamp(&since)],
        |row| row.get(0),
    )?)
}

pub fn payment_totals(conn: &Connection) -> Result<PaymentTotals, DatabaseError> {
    let totals = conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN status = ?1 THEN amount END), 0.0),
            COALESCE(SUM(CASE WHEN status = ?2 THEN amount END), 0.0),
            COUNT(*)
         FROM payments",
        params![PaymentStatus::Completed.as_str(), PaymentStatus::Pending.as_str()],
        |row| {
            Ok(PaymentTotals {
                total_revenue: row.get(0)?,
                pending_payments: row.get(1)?,
                total_payments: row.get(2)?,
            })
        },
    )?;
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn empty_database_has_zero_totals() {
        let conn = open_memory_database().unwrap();
        assert_eq!(payment_totals(&conn).unwrap(), PaymentTotals::default());
        assert_eq!(count_patients(&conn).unwrap(), 0);
    }

    #[test]
    fn totals_split_by_status() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana", "ana@example.com");
        let now = ts("2026-02-01 10:00:00");
        insert_payment(&conn, pid, &payment_draft(300.0, PaymentStatus::Completed), now).unwrap();
        insert_payment(&conn, pid, &payment_draft(200.0, PaymentStatus::Completed), now).unwrap();
        insert_payment(&conn, pid, &payment_draft(80.0, PaymentStatus::Pending), now).unwrap();
        insert_payment(&conn, pid, &payment_draft(999.0, PaymentStatus::Cancelled), now).unwrap();

        let totals = payment_totals(&conn).unwrap();
        assert_eq!(totals.total_revenue, 500.0);
        assert_eq!(totals.pending_payments, 80.0);
        assert_eq!(totals.total_payments, 4);
    }

    #[test]
    fn patients_created_since_boundary_is_inclusive() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &patient_draft("Old", "old@example.com"), ts("2026-01-31 23:59:59")).unwrap();
        insert_patient(&conn, &patient_draft("New", "new@example.com"), ts("2026-02-01 00:00:00")).unwrap();
        assert_eq!(count_patients_created_since(&conn, ts("2026-02-01 00:00:00")).unwrap(), 1);
    }

    #[test]
    fn patients_with_records_count_distinct() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "Ana", "ana@example.com");
        make_patient(&conn, "Beto", "beto@example.com");
        let now = ts("2026-02-01 10:00:00");
        insert_diagnosis(&conn, a, &diagnosis_draft("Gripe", None), now).unwrap();
        insert_diagnosis(&conn, a, &diagnosis_draft("Otitis", None), now).unwrap();
        insert_prescription(&conn, a, &prescription_draft("Paracetamol", None), now).unwrap();

        assert_eq!(count_patients_with_diagnoses(&conn).unwrap(), 1);
        assert_eq!(count_patients_with_prescriptions(&conn).unwrap(), 1);
        assert_eq!(count_patients(&conn).unwrap(), 2);
    }
}
