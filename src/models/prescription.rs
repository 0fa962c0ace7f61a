use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    /// Set when the prescription was derived from a diagnosis' treatment plan.
    pub diagnosis_id: Option<i64>,
    pub date: NaiveDate,
    pub doctor_name: String,
    pub professional_license: String,
    pub diagnosis: String,
    /// Free text as written by the doctor, not a parsed list.
    pub medications: String,
    pub instructions: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionDraft {
    pub diagnosis_id: Option<i64>,
    pub date: NaiveDate,
    pub doctor_name: String,
    pub professional_license: String,
    pub diagnosis: String,
    pub medications: String,
    pub instructions: Option<String>,
}
