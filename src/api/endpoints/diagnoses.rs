//! Diagnoses, each recorded together with its derived prescription and
//! consultation payment.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::DiagnosisForm;
use crate::api::types::{found, now, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::consultation;
use crate::db;

/// `GET /patient/:id/diagnoses`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (patient, diagnoses) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        (patient, db::list_diagnoses_for_patient(&conn, patient_id)?)
    };
    Ok(HtmlPage::new(
        format!("Diagnósticos de {}", patient.name),
        views::diagnoses(&patient, &diagnoses),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `GET /patient/:id/diagnosis/new`
pub async fn new_form(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let patient = {
        let conn = ctx.core.db()?;
        require_patient(&conn, patient_id)?
    };
    Ok(HtmlPage::new(
        format!("Nuevo diagnóstico para {}", patient.name),
        views::diagnosis_form(&patient, today()),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/diagnosis/new`
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<DiagnosisForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error creating diagnosis";
    let back = format!("/patient/{patient_id}/diagnosis/new");
    let mut conn = ctx.core.db()?;
    require_patient(&conn, patient_id)?;

    let today = today();
    let request = match form.into_request(today) {
        Ok(request) => request,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match consultation::record_diagnosis(&mut conn, patient_id, &request, today, now()) {
        Ok(outcome) => {
            let message = if outcome.prescription_id.is_some() {
                "Diagnosis created successfully! Prescription and payment auto-generated."
            } else {
                "Diagnosis created successfully! Payment auto-generated for consultation."
            };
            Ok(done(&format!("/patient/{patient_id}/diagnoses"), message))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /diagnosis/:id/delete`: also removes the prescription the
/// diagnosis spawned; its payment stays on the books.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    let diagnosis = found(db::get_diagnosis(&conn, id)?, "Diagnosis", id)?;
    let back = format!("/patient/{}/diagnoses", diagnosis.patient_id);

    let result = db::count_prescriptions_for_diagnosis(&conn, id)
        .and_then(|linked| db::delete_diagnosis(&conn, id).map(|()| linked));
    match result {
        Ok(linked) => {
            tracing::info!(
                patient_id = diagnosis.patient_id,
                diagnosis_id = id,
                prescriptions = linked,
                "Diagnosis deleted"
            );
            let message = if linked > 0 {
                format!("Diagnosis and {linked} related prescription(s) deleted successfully!")
            } else {
                "Diagnosis deleted successfully!".to_string()
            };
            Ok(done(&back, message))
        }
        Err(e) => Ok(rejected(&back, "Error deleting diagnosis", e)),
    }
}
