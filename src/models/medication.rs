use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::MedicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub patient_id: i64,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    /// Open-ended when absent. Not checked against `start_date`.
    pub end_date: Option<NaiveDate>,
    pub status: MedicationStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: MedicationStatus,
    pub notes: Option<String>,
}
