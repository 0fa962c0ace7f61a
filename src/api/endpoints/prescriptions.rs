//! Prescriptions: listing, manual creation, deletion.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::PrescriptionForm;
use crate::api::types::{found, now, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::db;

/// `GET /patient/:id/prescriptions`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (patient, prescriptions) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        (patient, db::list_prescriptions_for_patient(&conn, patient_id)?)
    };
    Ok(HtmlPage::new(
        format!("Recetas de {}", patient.name),
        views::prescriptions(&patient, &prescriptions),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `GET /patient/:id/prescription/new`
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
        format!("Nueva receta para {}", patient.name),
        views::prescription_form(&patient, today()),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/prescription/new`
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<PrescriptionForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error creating prescription";
    let back = format!("/patient/{patient_id}/prescription/new");
    let conn = ctx.core.db()?;
    require_patient(&conn, patient_id)?;

    let draft = match form.into_draft(today()) {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match db::insert_prescription(&conn, patient_id, &draft, now()) {
        Ok(id) => {
            tracing::info!(patient_id, prescription_id = id, "Prescription created");
            Ok(done(
                &format!("/patient/{patient_id}/prescriptions"),
                "Prescription created successfully!",
            ))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /prescription/:id/delete`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    let prescription = found(db::get_prescription(&conn, id)?, "Prescription", id)?;
    let back = format!("/patient/{}/prescriptions", prescription.patient_id);
    match db::delete_prescription(&conn, id) {
        Ok(()) => {
            tracing::info!(patient_id = prescription.patient_id, prescription_id = id, "Prescription deleted");
            Ok(done(&back, "Prescription deleted successfully!"))
        }
        Err(e) => Ok(rejected(&back, "Error deleting prescription", e)),
    }
}
