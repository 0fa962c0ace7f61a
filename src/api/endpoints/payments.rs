//! Payments per patient and clinic-wide.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::PaymentForm;
use crate::api::types::{found, now, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::db;

/// `GET /patient/:id/payments`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (patient, payments) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        (patient, db::list_payments_for_patient(&conn, patient_id)?)
    };
    Ok(HtmlPage::new(
        format!("Pagos de {}", patient.name),
        views::payments(&patient, &payments),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `GET /patient/:id/payment/new`
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
        format!("Nuevo pago de {}", patient.name),
        views::payment_form(&patient, today()),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/payment/new`
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<PaymentForm>,
) -> Result<Response, ApiError> {
    const WHAT: &str = "Error al registrar pago";
    let back = format!("/patient/{patient_id}/payment/new");
    let conn = ctx.core.db()?;
    require_patient(&conn, patient_id)?;

    let draft = match form.into_draft(today()) {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&back, WHAT, e)),
    };
    match db::insert_payment(&conn, patient_id, &draft, now()) {
        Ok(id) => {
            tracing::info!(patient_id, payment_id = id, amount = draft.amount, "Payment recorded");
            Ok(done(
                &format!("/patient/{patient_id}/payments"),
                "Pago registrado exitosamente!",
            ))
        }
        Err(e) => Ok(rejected(&back, WHAT, e)),
    }
}

/// `POST /payment/:id/delete`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.core.db()?;
    let payment = found(db::get_payment(&conn, id)?, "Payment", id)?;
    let back = format!("/patient/{}/payments", payment.patient_id);
    match db::delete_payment(&conn, id) {
        Ok(()) => {
            tracing::info!(patient_id = payment.patient_id, payment_id = id, "Payment deleted");
            Ok(done(&back, "Pago eliminado exitosamente!"))
        }
        Err(e) => Ok(rejected(&back, "Error al eliminar pago", e)),
    }
}

/// `GET /payments`: every payment with revenue and pending totals.
pub async fn all(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let (payments, totals) = {
        let conn = ctx.core.db()?;
        (db::list_all_payments(&conn)?, db::payment_totals(&conn)?)
    };
    Ok(HtmlPage::new("Pagos", views::all_payments(&payments, &totals))
        .with_flash(Flash::from_headers(&headers)))
}
