//! Clinic router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Chart images written by the analytics page are served from `/static`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the full router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn clinic_router(core: Arc<CoreState>) -> Router {
    let static_dir = core.config.static_dir();
    let ctx = ApiContext::new(core);

    Router::new()
        .route("/", get(endpoints::dashboard::index))
        .route("/health", get(endpoints::health::check))
        .route("/patients", get(endpoints::patients::list))
        .route("/search_patients", get(endpoints::search::patients))
        .route("/payments", get(endpoints::payments::all))
        .route("/analytics", get(endpoints::analytics::page))
        // Patient registry
        .route(
            "/patient/new",
            get(endpoints::patients::new_form).post(endpoints::patients::create),
        )
        .route("/patient/:id", get(endpoints::patients::view))
        .route(
            "/patient/:id/edit",
            get(endpoints::patients::edit_form).post(endpoints::patients::update),
        )
        .route("/patient/:id/delete", post(endpoints::patients::delete))
        // Clinical sub-records
        .route("/patient/:id/diseases", get(endpoints::records::diseases))
        .route("/patient/:id/disease/new", post(endpoints::records::add_disease))
        .route("/disease/:id/delete", post(endpoints::records::delete_disease))
        .route("/patient/:id/medications", get(endpoints::records::medications))
        .route(
            "/patient/:id/medication/new",
            post(endpoints::records::add_medication),
        )
        .route(
            "/medication/:id/delete",
            post(endpoints::records::delete_medication),
        )
        // Prescriptions
        .route(
            "/patient/:id/prescriptions",
            get(endpoints::prescriptions::list),
        )
        .route(
            "/patient/:id/prescription/new",
            get(endpoints::prescriptions::new_form).post(endpoints::prescriptions::create),
        )
        .route(
            "/prescription/:id/delete",
            post(endpoints::prescriptions::delete),
        )
        .route(
            "/prescription/:id/pdf",
            get(endpoints::documents::prescription_pdf),
        )
        // Diagnoses
        .route("/patient/:id/diagnoses", get(endpoints::diagnoses::list))
        .route(
            "/patient/:id/diagnosis/new",
            get(endpoints::diagnoses::new_form).post(endpoints::diagnoses::create),
        )
        .route("/diagnosis/:id/delete", post(endpoints::diagnoses::delete))
        .route("/diagnosis/:id/pdf", get(endpoints::documents::diagnosis_pdf))
        // Payments
        .route("/patient/:id/payments", get(endpoints::payments::list))
        .route(
            "/patient/:id/payment/new",
            get(endpoints::payments::new_form).post(endpoints::payments::create),
        )
        .route("/payment/:id/delete", post(endpoints::payments::delete))
        // Documents
        .route("/patient/:id/report", get(endpoints::documents::patient_report))
        .route(
            "/patient/:id/email_report",
            get(endpoints::documents::email_form).post(endpoints::documents::send_email),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}
