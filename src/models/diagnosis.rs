use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDate,
    pub doctor_name: String,
    pub professional_license: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment_plan: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisDraft {
    pub date: NaiveDate,
    pub doctor_name: String,
    pub professional_license: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment_plan: Option<String>,
    pub notes: Option<String>,
}
