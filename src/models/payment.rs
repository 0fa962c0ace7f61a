use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::PaymentStatus;

/// Service type recorded on payments spawned by a diagnosis.
pub const CONSULTATION_SERVICE: &str = "Consulta General";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub patient_id: i64,
    pub amount: f64,
    pub payment_date: NaiveDate,
    /// Cash, Card, Transfer. Free text.
    pub payment_method: String,
    pub service_type: String,
    pub status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub amount: f64,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub service_type: String,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}

/// A payment joined with its patient's name, for clinic-wide listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWithPatient {
    pub payment: Payment,
    pub patient_name: String,
}
