//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here.
//! Every function takes a borrowed `Connection` (or `Transaction`, which
//! derefs to one) so callers decide the transaction boundary.

mod diagnosis;
mod disease;
mod medication;
mod patient;
mod payment;
mod prescription;
mod stats;

use std::str::FromStr;

use chrono::NaiveDateTime;

use super::DatabaseError;
use crate::models::TIMESTAMP_FORMAT;

pub use diagnosis::*;
pub use disease::*;
pub use medication::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;
pub use stats::*;

/// Read a `str_enum!` column, surfacing bad values as a conversion failure.
pub(crate) fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Blank optional text is stored as NULL.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;

    use super::*;
    use crate::models::enums::*;
    use crate::models::*;

    pub fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    pub fn patient_draft(name: &str, email: &str) -> PatientDraft {
        PatientDraft {
            name: name.into(),
            email: email.into(),
            phone: "+522291234567".into(),
            date_of_birth: date("1985-03-15"),
            address: "Av. Independencia 123, Veracruz".into(),
            height: 175.0,
            weight: 70.0,
            past_illnesses: Some("Varicela".into()),
            current_medications: None,
            allergies: Some("Penicilina".into()),
            food_habits: Some("Regular diet".into()),
        }
    }

    pub fn make_patient(conn: &Connection, name: &str, email: &str) -> i64 {
        insert_patient(conn, &patient_draft(name, email), ts("2026-01-10 09:00:00")).unwrap()
    }

    pub fn diagnosis_draft(diagnosis: &str, plan: Option<&str>) -> DiagnosisDraft {
        DiagnosisDraft {
            date: date("2026-02-01"),
            doctor_name: "Laura Mendez".into(),
            professional_license: "12345678".into(),
            symptoms: "Fiebre\nTos seca".into(),
            diagnosis: diagnosis.into(),
            treatment_plan: plan.map(Into::into),
            notes: None,
        }
    }

    pub fn prescription_draft(medications: &str, instructions: Option<&str>) -> PrescriptionDraft {
        PrescriptionDraft {
            diagnosis_id: None,
            date: date("2026-02-01"),
            doctor_name: "Laura Mendez".into(),
            professional_license: "12345678".into(),
            diagnosis: "Faringitis".into(),
            medications: medications.into(),
            instructions: instructions.map(Into::into),
        }
    }

    pub fn payment_draft(amount: f64, status: PaymentStatus) -> PaymentDraft {
        PaymentDraft {
            amount,
            payment_date: date("2026-02-01"),
            payment_method: "Cash".into(),
            service_type: "Consulta General".into(),
            status,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;

    #[test]
    fn deleting_patient_cascades_to_all_owned_records() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana Torres", "ana@example.com");
        let other = make_patient(&conn, "Luis Rios", "luis@example.com");

        insert_disease(&conn, pid, &DiseaseDraft {
            name: "Hypertension".into(),
            diagnosis_date: date("2023-01-10"),
            status: DiseaseStatus::Active,
            notes: None,
        }).unwrap();
        insert_medication(&conn, pid, &MedicationDraft {
            name: "Lisinopril".into(),
            dosage: "10mg".into(),
            frequency: "Once daily".into(),
            start_date: date("2023-01-15"),
            end_date: None,
            status: MedicationStatus::Active,
            notes: None,
        }).unwrap();
        let dx = insert_diagnosis(&conn, pid, &diagnosis_draft("Faringitis", Some("Amoxicilina")), ts("2026-02-01 10:00:00")).unwrap();
        let mut rx = prescription_draft("Amoxicilina", None);
        rx.diagnosis_id = Some(dx);
        insert_prescription(&conn, pid, &rx, ts("2026-02-01 10:00:00")).unwrap();
        insert_prescription(&conn, pid, &prescription_draft("Paracetamol", None), ts("2026-02-01 10:00:00")).unwrap();
        insert_payment(&conn, pid, &payment_draft(300.0, PaymentStatus::Completed), ts("2026-02-01 10:00:00")).unwrap();
        insert_payment(&conn, other, &payment_draft(150.0, PaymentStatus::Pending), ts("2026-02-01 10:00:00")).unwrap();

        delete_patient(&conn, pid).unwrap();

        for table in ["diseases", "medications", "diagnoses", "prescriptions", "payments"] {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table} WHERE patient_id = ?1"), [pid], |r| r.get(0))
                .unwrap();
            assert_eq!(n, 0, "{table} still has rows for deleted patient");
        }
        assert_eq!(list_payments_for_patient(&conn, other).unwrap().len(), 1);
    }

    #[test]
    fn bad_enum_in_storage_surfaces_as_error() {
        let conn = open_memory_database().unwrap();
        let pid = make_patient(&conn, "Ana Torres", "ana@example.com");
        conn.execute(
            "INSERT INTO diseases (patient_id, name, diagnosis_date, status) VALUES (?1, 'Flu', '2024-01-01', 'Gone')",
            [pid],
        ).unwrap();
        assert!(list_diseases_for_patient(&conn, pid).is_err());
    }
}
