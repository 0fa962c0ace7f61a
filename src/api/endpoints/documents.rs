//! PDF downloads and e-mailed patient reports.
//!
//! Records are copied out under the connection lock; rendering and SMTP
//! run after it is released.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::api::endpoints::{done, rejected};
use crate::api::error::ApiError;
use crate::api::flash::Flash;
use crate::api::forms::EmailForm;
use crate::api::types::{found, now, require_patient, today, ApiContext};
use crate::api::views::{self, HtmlPage};
use crate::db;
use crate::notifier::ReportEmail;
use crate::report;

/// `application/pdf` served as a download.
fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    )
        .into_response()
}

/// `GET /patient/:id/report`
pub async fn patient_report(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Response, ApiError> {
    let (patient, diseases, medications) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        let diseases = db::list_diseases_for_patient(&conn, patient_id)?;
        let medications = db::list_medications_for_patient(&conn, patient_id)?;
        (patient, diseases, medications)
    };

    match report::patient_report(&patient, &diseases, &medications) {
        Ok(pdf) => {
            tracing::info!(patient_id, bytes = pdf.len(), "Patient report generated");
            Ok(pdf_attachment(&report::patient_report_download_name(&patient), pdf))
        }
        Err(e) => Ok(rejected(
            &format!("/patient/{patient_id}"),
            "Error generating report",
            e,
        )),
    }
}

/// `GET /prescription/:id/pdf`: includes the patient's latest diagnosis.
pub async fn prescription_pdf(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (prescription, patient, recent) = {
        let conn = ctx.core.db()?;
        let prescription = found(db::get_prescription(&conn, id)?, "Prescription", id)?;
        let patient = require_patient(&conn, prescription.patient_id)?;
        let recent = db::latest_diagnosis_for_patient(&conn, prescription.patient_id)?;
        (prescription, patient, recent)
    };

    let doc_ctx = ctx.core.document_context(today());
    match report::prescription_document(&doc_ctx, &patient, &prescription, recent.as_ref()) {
        Ok(pdf) => {
            tracing::info!(prescription_id = id, bytes = pdf.len(), "Prescription PDF generated");
            Ok(pdf_attachment(
                &report::prescription_download_name(&patient, &prescription),
                pdf,
            ))
        }
        Err(e) => Ok(rejected(
            &format!("/patient/{}/prescriptions", patient.id),
            "Error al generar PDF",
            e,
        )),
    }
}

/// `GET /diagnosis/:id/pdf`
pub async fn diagnosis_pdf(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (diagnosis, patient) = {
        let conn = ctx.core.db()?;
        let diagnosis = found(db::get_diagnosis(&conn, id)?, "Diagnosis", id)?;
        let patient = require_patient(&conn, diagnosis.patient_id)?;
        (diagnosis, patient)
    };

    let doc_ctx = ctx.core.document_context(today());
    match report::diagnosis_document(&doc_ctx, &patient, &diagnosis) {
        Ok(pdf) => {
            tracing::info!(diagnosis_id = id, bytes = pdf.len(), "Diagnosis PDF generated");
            Ok(pdf_attachment(
                &report::diagnosis_download_name(&patient, &diagnosis),
                pdf,
            ))
        }
        Err(e) => Ok(rejected(
            &format!("/patient/{}/diagnoses", patient.id),
            "Error al generar PDF",
            e,
        )),
    }
}

/// `GET /patient/:id/email_report`
pub async fn email_form(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<HtmlPage, ApiError> {
    let patient = {
        let conn = ctx.core.db()?;
        require_patient(&conn, patient_id)?
    };
    let mail_ready = ctx.core.notifier.config().is_configured();
    Ok(HtmlPage::new(
        format!("Enviar reporte de {}", patient.name),
        views::email_form(&patient, mail_ready),
    )
    .with_flash(Flash::from_headers(&headers)))
}

/// `POST /patient/:id/email_report`: generate, store and mail the report.
///
/// The SMTP session blocks, so it runs on the blocking pool.
pub async fn send_email(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    Form(form): Form<EmailForm>,
) -> Result<Response, ApiError> {
    let (patient, diseases, medications) = {
        let conn = ctx.core.db()?;
        let patient = require_patient(&conn, patient_id)?;
        let diseases = db::list_diseases_for_patient(&conn, patient_id)?;
        let medications = db::list_medications_for_patient(&conn, patient_id)?;
        (patient, diseases, medications)
    };

    let recipient = form.recipient_email.trim().to_string();
    if recipient.is_empty() {
        return Ok(rejected(
            &format!("/patient/{patient_id}/email_report"),
            "Error sending email",
            "recipient address is required",
        ));
    }

    let core = ctx.core.clone();
    let to = recipient.clone();
    let sent = tokio::task::spawn_blocking(move || {
        let email = ReportEmail {
            patient: &patient,
            diseases: &diseases,
            medications: &medications,
            recipient: &to,
        };
        core.notifier
            .email_report(&core.config.reports_dir(), &email, now())
    })
    .await?;

    let back = format!("/patient/{patient_id}");
    match sent {
        Ok(path) => {
            tracing::info!(patient_id, report = %path.display(), "Report sent");
            Ok(done(&back, format!("Report sent successfully to {recipient}!")))
        }
        Err(e) => Ok(rejected(&back, "Error sending email", e)),
    }
}
