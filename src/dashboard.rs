//! Front-page statistics.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_patients: u32,
    pub patients_with_diagnoses: u32,
    pub patients_with_prescriptions: u32,
    /// Patients registered since the first day of the current month.
    pub new_this_month: u32,
    pub total_revenue: f64,
    pub pending_payments: f64,
    pub total_payments: u32,
}

/// `today` is a date in the clinic's zone `tz`; patient timestamps are UTC.
pub fn collect_stats<Tz: TimeZone>(
    conn: &Connection,
    today: NaiveDate,
    tz: &Tz,
) -> Result<DashboardStats, DatabaseError> {
    let totals = db::payment_totals(conn)?;
    Ok(DashboardStats {
        total_patients: db::count_patients(conn)?,
        patients_with_diagnoses: db::count_patients_with_diagnoses(conn)?,
        patients_with_prescriptions: db::count_patients_with_prescriptions(conn)?,
        new_this_month: db::count_patients_created_since(conn, month_start_utc(today, tz))?,
        total_revenue: totals.total_revenue,
        pending_payments: totals.pending_payments,
        total_payments: totals.total_payments,
    })
}

fn month_start(today: NaiveDate) -> NaiveDateTime {
    today
        .with_day(1)
        .unwrap_or(today)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

/// Local midnight on the first of the month, expressed in UTC.
fn month_start_utc<Tz: TimeZone>(today: NaiveDate, tz: &Tz) -> NaiveDateTime {
    let local = month_start(today);
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.naive_utc())
        .unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::PaymentStatus;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn month_start_is_first_day_midnight() {
        assert_eq!(month_start(date("2026-02-17")), ts("2026-02-01 00:00:00"));
    }

    #[test]
    fn stats_on_populated_clinic() {
        let conn = open_memory_database().unwrap();
        let now = ts("2026-02-10 10:00:00");
        db::insert_patient(&conn, &patient_draft("Old", "old@example.com"), ts("2026-01-20 08:00:00")).unwrap();
        let fresh = db::insert_patient(&conn, &patient_draft("New", "new@example.com"), now).unwrap();
        db::insert_diagnosis(&conn, fresh, &diagnosis_draft("Gripe", None), now).unwrap();
        db::insert_payment(&conn, fresh, &payment_draft(300.0, PaymentStatus::Completed), now).unwrap();
        db::insert_payment(&conn, fresh, &payment_draft(100.0, PaymentStatus::Pending), now).unwrap();

        let stats = collect_stats(&conn, date("2026-02-17"), &Utc).unwrap();
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.patients_with_diagnoses, 1);
        assert_eq!(stats.patients_with_prescriptions, 0);
        assert_eq!(stats.new_this_month, 1);
        assert_eq!(stats.total_revenue, 300.0);
        assert_eq!(stats.pending_payments, 100.0);
        assert_eq!(stats.total_payments, 2);
    }

    #[test]
    fn new_this_month_follows_the_clinic_calendar() {
        let conn = open_memory_database().unwrap();
        let utc_minus_6 = FixedOffset::west_opt(6 * 3600).unwrap();
        // 21:00 on 28 Feb local, already 1 Mar in UTC.
        db::insert_patient(&conn, &patient_draft("Late", "late@example.com"), ts("2026-03-01 03:00:00")).unwrap();
        // 01:00 on 1 Mar local.
        db::insert_patient(&conn, &patient_draft("Early", "early@example.com"), ts("2026-03-01 07:00:00")).unwrap();

        assert_eq!(month_start_utc(date("2026-03-10"), &utc_minus_6), ts("2026-03-01 06:00:00"));
        let march = collect_stats(&conn, date("2026-03-10"), &utc_minus_6).unwrap();
        assert_eq!(march.new_this_month, 1);
        let february = collect_stats(&conn, date("2026-02-28"), &utc_minus_6).unwrap();
        assert_eq!(february.new_this_month, 2);
    }
}
