//! Consultation recording.
//!
//! A submitted diagnosis produces up to three rows: the diagnosis itself,
//! a prescription derived from its treatment plan (only when a plan was
//! given), and the consultation payment. All three are written inside one
//! SQLite transaction, so a failure at any step leaves no partial state.
//!
//! The derived prescription points back at its diagnosis through
//! `prescriptions.diagnosis_id`; deleting the diagnosis removes exactly
//! that prescription via `ON DELETE CASCADE`.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};
use crate::models::enums::PaymentStatus;
use crate::models::*;

/// Consultation fee charged when the form leaves the amount blank.
pub const DEFAULT_CONSULTATION_AMOUNT: f64 = 300.0;

/// Payment method recorded when the form leaves it blank.
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

/// Everything the diagnosis form submits.
#[derive(Debug, Clone)]
pub struct ConsultationRequest {
    pub diagnosis: DiagnosisDraft,
    pub consultation_amount: f64,
    pub payment_method: String,
}

/// Ids of the rows written for one consultation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationOutcome {
    pub diagnosis_id: i64,
    pub prescription_id: Option<i64>,
    pub payment_id: i64,
}

/// Persist a diagnosis together with its derived prescription and payment.
///
/// `today` is the clinic's local date and becomes the payment date; `now`
/// is the UTC timestamp stored in `created_at`.
pub fn record_diagnosis(
    conn: &mut Connection,
    patient_id: i64,
    request: &ConsultationRequest,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Result<ConsultationOutcome, DatabaseError> {
    let tx = conn.transaction()?;

    let diagnosis_id = db::insert_diagnosis(&tx, patient_id, &request.diagnosis, now)?;

    let prescription_id = match derived_prescription(diagnosis_id, &request.diagnosis) {
        Some(draft) => Some(db::insert_prescription(&tx, patient_id, &draft, now)?),
        None => None,
    };

    let payment = consultation_payment(request, today);
    let payment_id = db::insert_payment(&tx, patient_id, &payment, now)?;

    tx.commit()?;

    tracing::info!(
        patient_id,
        diagnosis_id,
        prescription_id,
        payment_id,
        "Consultation recorded"
    );

    Ok(ConsultationOutcome {
        diagnosis_id,
        prescription_id,
        payment_id,
    })
}

/// The prescription implied by a diagnosis, if it carries a treatment plan.
///
/// The medications field is the plan text verbatim.
pub fn derived_prescription(diagnosis_id: i64, draft: &DiagnosisDraft) -> Option<PrescriptionDraft> {
    let plan = draft
        .treatment_plan
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())?;

    Some(PrescriptionDraft {
        diagnosis_id: Some(diagnosis_id),
        date: draft.date,
        doctor_name: draft.doctor_name.clone(),
        professional_license: draft.professional_license.clone(),
        diagnosis: draft.diagnosis.clone(),
        medications: plan.to_string(),
        instructions: Some(format!(
            "Basado en el diagnóstico: {}. {}",
            draft.diagnosis, plan
        )),
    })
}

fn consultation_payment(request: &ConsultationRequest, today: NaiveDate) -> PaymentDraft {
    PaymentDraft {
        amount: request.consultation_amount,
        payment_date: today,
        payment_method: request.payment_method.clone(),
        service_type: CONSULTATION_SERVICE.to_string(),
        status: PaymentStatus::Completed,
        notes: Some(format!(
            "Pago automático por diagnóstico: {}",
            request.diagnosis.diagnosis
        )),
    }
}
