use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::DiseaseStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub id: i64,
    pub patient_id: i64,
    pub name: String,
    pub diagnosis_date: NaiveDate,
    pub status: DiseaseStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseDraft {
    pub name: String,
    pub diagnosis_date: NaiveDate,
    pub status: DiseaseStatus,
    pub notes: Option<String>,
}
