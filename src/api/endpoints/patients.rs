//! Patient registry pages: list, create, view, edit, delete.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::PatientForm;
use crate::api::types::{now, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::db;

/// `GET /patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let patients = {
        let conn = ctx.core.db()?;
        db::list_patients(&conn)?
    };
    Ok(HtmlPage::new("Pacientes", views::patient_list(&patients, today()))
        .with_flash(Flash::from_headers(&headers)))
}

/// `GET /patient/new`
pub async fn new_form(headers: HeaderMap) -> HtmlPage {
    HtmlPage::new("Nuevo paciente", views::patient_form("/patient/new", None))
        .with_flash(Flash::from_headers(&headers))
}

/// `POST /patient/new`
pub async fn create(
    State(ctx): State<ApiContext>,
    Form(form): Form<PatientForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error adding patient";
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected("/patient/new", WHAT, e)),
    };

    let conn = ctx.core.db()?;
    match db::insert_patient(&conn, &draft, now()) {
        Ok(id) => {
            tracing::info!(patient_id = id, "Patient added");
            Ok(done("/", "Patient added successfully!"))
        }
        Err(e) => Ok(rejected("/patient/new", WHAT, e)),
    }
}

/// `GET /patient/:id`
pub async fn view(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let patient = {
        let conn = ctx.core.db()?;
        require_patient(&conn, id)?
    };
    Ok(HtmlPage::new(patient.name.clone(), views::patient_detail(&patient, today()))
        .with_flash(Flash::from_headers(&headers)))
}

/// `GET /patient/:id/edit`
pub async fn edit_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let patient = {
        let conn = ctx.core.db()?;
        require_patient(&conn, id)?
    };
    let action = format!("/patient/{id}/edit");
    Ok(HtmlPage::new(
        format!("Editar {}", patient.name),
        views::patient_form(&action, Some(&patient)),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/edit`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Form(form): Form<PatientForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error updating patient";
    let conn = ctx.core.db()?;
    require_patient(&conn, id)?;

    let back = format!("/patient/{id}/edit");
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match db::update_patient(&conn, id, &draft, now()) {
        Ok(()) => {
            tracing::info!(patient_id = id, "Patient updated");
            Ok(done(&format!("/patient/{id}"), "Patient updated successfully!"))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /patient/:id/delete`: every owned record goes with the patient.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    require_patient(&conn, id)?;
    match db::delete_patient(&conn, id) {
        Ok(()) => {
            tracing::info!(patient_id = id, "Patient deleted");
            Ok(done("/", "Patient deleted successfully!"))
        }
        Err(e) => Ok(rejected("/", "Error deleting patient", e)),
    }
}
