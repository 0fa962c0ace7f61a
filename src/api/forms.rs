//! HTML form payloads and their conversion into drafts.
//!
//! Every field arrives as text (absent fields read as empty) so that a
//! bad date or number becomes a [`FormError`] the handler can flash,
//! rather than a rejected request.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::consultation::{ConsultationRequest, DEFAULT_CONSULTATION_AMOUNT, DEFAULT_PAYMENT_METHOD};
use crate::models::enums::{DiseaseStatus, MedicationStatus, PaymentStatus};
use crate::models::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid date for {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid choice for {field}: '{value}'")]
    InvalidChoice { field: &'static str, value: String },
}

pub fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(value.to_string())
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| FormError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Blank means absent.
pub fn parse_optional_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FormError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(field, value).map(Some)
}

pub fn parse_float(field: &'static str, value: &str) -> Result<f64, FormError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Blank picks `default`.
pub fn parse_choice<T: FromStr>(field: &'static str, value: &str, default: T) -> Result<T, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    T::from_str(value).map_err(|_| FormError::InvalidChoice {
        field,
        value: value.to_string(),
    })
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address: String,
    pub height: String,
    pub weight: String,
    pub past_illnesses: String,
    pub current_medications: String,
    pub allergies: String,
    pub food_habits: String,
}

impl PatientForm {
    pub fn into_draft(self) -> Result<PatientDraft, FormError> {
        Ok(PatientDraft {
            name: required("name", &self.name)?,
            email: required("email", &self.email)?,
            phone: self.phone.trim().to_string(),
            date_of_birth: parse_date("date_of_birth", &self.date_of_birth)?,
            address: self.address.trim().to_string(),
            height: parse_float("height", &self.height)?,
            weight: parse_float("weight", &self.weight)?,
            past_illnesses: optional_text(self.past_illnesses),
            current_medications: optional_text(self.current_medications),
            allergies: optional_text(self.allergies),
            food_habits: optional_text(self.food_habits),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiseaseForm {
    pub name: String,
    pub diagnosis_date: String,
    pub status: String,
    pub notes: String,
}

impl DiseaseForm {
    pub fn into_draft(self) -> Result<DiseaseDraft, FormError> {
        Ok(DiseaseDraft {
            name: required("name", &self.name)?,
            diagnosis_date: parse_date("diagnosis_date", &self.diagnosis_date)?,
            status: parse_choice("status", &self.status, DiseaseStatus::Active)?,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MedicationForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub notes: String,
}

impl MedicationForm {
    pub fn into_draft(self) -> Result<MedicationDraft, FormError> {
        Ok(MedicationDraft {
            name: required("name", &self.name)?,
            dosage: self.dosage.trim().to_string(),
            frequency: self.frequency.trim().to_string(),
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_optional_date("end_date", &self.end_date)?,
            status: parse_choice("status", &self.status, MedicationStatus::Active)?,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrescriptionForm {
    pub date: String,
    pub doctor_name: String,
    pub professional_license: String,
    pub diagnosis: String,
    pub medications: String,
    pub instructions: String,
}

impl PrescriptionForm {
    /// Written by hand, so never linked to a diagnosis.
    pub fn into_draft(self, today: NaiveDate) -> Result<PrescriptionDraft, FormError> {
        Ok(PrescriptionDraft {
            diagnosis_id: None,
            date: parse_optional_date("date", &self.date)?.unwrap_or(today),
            doctor_name: required("doctor_name", &self.doctor_name)?,
            professional_license: required("professional_license", &self.professional_license)?,
            diagnosis: self.diagnosis.trim().to_string(),
            medications: required("medications", &self.medications)?,
            instructions: optional_text(self.instructions),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiagnosisForm {
    pub date: String,
    pub doctor_name: String,
    pub professional_license: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub notes: String,
    pub consultation_amount: String,
    pub payment_method: String,
}

impl DiagnosisForm {
    pub fn into_request(self, today: NaiveDate) -> Result<ConsultationRequest, FormError> {
        let consultation_amount = if self.consultation_amount.trim().is_empty() {
            DEFAULT_CONSULTATION_AMOUNT
        } else {
            parse_float("consultation_amount", &self.consultation_amount)?
        };
        let payment_method = optional_text(self.payment_method)
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        Ok(ConsultationRequest {
            diagnosis: DiagnosisDraft {
                date: parse_optional_date("date", &self.date)?.unwrap_or(today),
                doctor_name: required("doctor_name", &self.doctor_name)?,
                professional_license: required("professional_license", &self.professional_license)?,
                symptoms: self.symptoms.trim().to_string(),
                diagnosis: required("diagnosis", &self.diagnosis)?,
                treatment_plan: optional_text(self.treatment_plan),
                notes: optional_text(self.notes),
            },
            consultation_amount,
            payment_method,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub amount: String,
    pub payment_date: String,
    pub payment_method: String,
    pub service_type: String,
    pub status: String,
    pub notes: String,
}

impl PaymentForm {
    pub fn into_draft(self, today: NaiveDate) -> Result<PaymentDraft, FormError> {
        Ok(PaymentDraft {
            amount: parse_float("amount", &self.amount)?,
            payment_date: parse_optional_date("payment_date", &self.payment_date)?.unwrap_or(today),
            payment_method: required("payment_method", &self.payment_method)?,
            service_type: required("service_type", &self.service_type)?,
            status: parse_choice("status", &self.status, PaymentStatus::Pending)?,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailForm {
    pub recipient_email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub q: String,
}
