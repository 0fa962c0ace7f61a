//! Clinical sub-records kept per patient: diseases and medications.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::{DiseaseForm, MedicationForm};
use crate::api::types::{found, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::db;

/// `GET /patient/:id/diseases`
pub async fn diseases(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (patient, diseases) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        (patient, db::list_diseases_for_patient(&conn, patient_id)?)
    };
    Ok(HtmlPage::new(
        format!("Enfermedades de {}", patient.name),
        views::diseases(&patient, &diseases, today()),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/disease/new`
pub async fn add_disease(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<DiseaseForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error adding disease";
    let back = format!("/patient/{patient_id}/diseases");
    let conn = ctx.core.db()?;
    require_patient(&conn, patient_id)?;

    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match db::insert_disease(&conn, patient_id, &draft) {
        Ok(id) => {
            tracing::info!(patient_id, disease_id = id, "Disease added");
            Ok(done(&back, "Disease added successfully!"))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /disease/:id/delete`
pub async fn delete_disease(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    let disease = found(db::get_disease(&conn, id)?, "Disease", id)?;
    let back = format!("/patient/{}/diseases", disease.patient_id);
    match db::delete_disease(&conn, id) {
        Ok(()) => {
            tracing::info!(patient_id = disease.patient_id, disease_id = id, "Disease deleted");
            Ok(done(&back, "Disease deleted successfully!"))
        }
        Err(e) => Ok(rejected(&back, "Error deleting disease", e)),
    }
}

/// `GET /patient/:id/medications`
pub async fn medications(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (patient, medications) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        (patient, db::list_medications_for_patient(&conn, patient_id)?)
    };
    Ok(HtmlPage::new(
        format!("Medicamentos de {}", patient.name),
        views::medications(&patient, &medications, today()),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/medication/new`
pub async fn add_medication(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<MedicationForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error adding medication";
    let back = format!("/patient/{patient_id}/medications");
    let conn = ctx.core.db()?;
    require_patient(&conn, patient_id)?;

    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match db::insert_medication(&conn, patient_id, &draft) {
        Ok(id) => {
            tracing::info!(patient_id, medication_id = id, "Medication added");
            Ok(done(&back, "Medication added successfully!"))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /medication/:id/delete`
pub async fn delete_medication(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    let medication = found(db::get_medication(&conn, id)?, "Medication", id)?;
    let back = format!("/patient/{}/medications", medication.patient_id);
    match db::delete_medication(&conn, id) {
        Ok(()) => {
            tracing::info!(patient_id = medication.patient_id, medication_id = id, "Medication deleted");
            Ok(done(&back, "Medication deleted successfully!"))
        }
        Err(e) => Ok(rejected(&back, "Error deleting medication", e)),
    }
}
