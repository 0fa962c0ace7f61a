//! E-mailing patient reports over SMTP.
//!
//! The mail relay is described by an explicit [`MailConfig`] owned by the
//! [`Notifier`]. Sending is blocking (`lettre`'s synchronous transport);
//! async callers run it on the blocking pool.
//!
//! The generated PDF is written under the reports directory before any
//! network traffic and is left there whatever the outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{MailConfig, MailSecurity, MAIL_TIMEOUT_SECS};
use crate::models::*;
use crate::report::{self, ReportError};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Mail relay is not configured (sender address and password required)")]
    NotConfigured,
    #[error("Invalid e-mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Cannot build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("Invalid attachment type: {0}")]
    ContentType(String),
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),
    #[error("Cannot store report: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to mail one patient's report.
pub struct ReportEmail<'a> {
    pub patient: &'a Patient,
    pub diseases: &'a [Disease],
    pub medications: &'a [Medication],
    pub recipient: &'a str,
}

pub struct Notifier {
    mail: MailConfig,
}

impl Notifier {
    pub fn new(mail: MailConfig) -> Self {
        Self { mail }
    }

    pub fn config(&self) -> &MailConfig {
        &self.mail
    }

    /// Multipart message: plain-text body plus the PDF attachment.
    pub fn build_message(
        &self,
        patient: &Patient,
        recipient: &str,
        pdf: Vec<u8>,
    ) -> Result<Message, NotifyError> {
        let from: Mailbox = self.mail.sender_email.trim().parse()?;
        let to: Mailbox = recipient.trim().parse()?;
        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| NotifyError::ContentType(e.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Patient Report - {}", patient.name))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email_body(patient)))
                    .singlepart(
                        Attachment::new(report::patient_report_download_name(patient))
                            .body(pdf, pdf_type),
                    ),
            )?;
        Ok(message)
    }

    fn transport(&self) -> Result<SmtpTransport, NotifyError> {
        let host = self.mail.smtp_server.trim();
        let builder = match self.mail.security {
            MailSecurity::ImplicitTls => SmtpTransport::relay(host)?,
            MailSecurity::StartTls => SmtpTransport::starttls_relay(host)?,
            MailSecurity::None => SmtpTransport::builder_dangerous(host),
        };
        Ok(builder
            .port(self.mail.smtp_port)
            .credentials(Credentials::new(
                self.mail.sender_email.trim().to_string(),
                self.mail.sender_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(MAIL_TIMEOUT_SECS)))
            .build())
    }

    /// Open one SMTP session, authenticate, send, close.
    pub fn send(&self, message: &Message) -> Result<(), NotifyError> {
        tracing::info!(
            server = %self.mail.smtp_server,
            port = self.mail.smtp_port,
            security = ?self.mail.security,
            "Connecting to SMTP server"
        );
        let transport = self.transport()?;
        transport.send(message)?;
        tracing::info!("SMTP session closed after successful send");
        Ok(())
    }

    /// Generate, store and mail a patient report. Returns the stored path.
    ///
    /// Report or storage failures stop before any network call.
    pub fn email_report(
        &self,
        reports_dir: &Path,
        email: &ReportEmail<'_>,
        now: NaiveDateTime,
    ) -> Result<PathBuf, NotifyError> {
        if !self.mail.is_configured() {
            return Err(NotifyError::NotConfigured);
        }
        let pdf = report::patient_report(email.patient, email.diseases, email.medications)?;

        std::fs::create_dir_all(reports_dir)?;
        let path = reports_dir.join(stored_report_name(email.patient, now));
        std::fs::write(&path, &pdf)?;
        tracing::info!(path = %path.display(), "Report generated");

        let message = self.build_message(email.patient, email.recipient, pdf)?;
        self.send(&message)?;
        tracing::info!(
            recipient = email.recipient,
            patient_id = email.patient.id,
            "Report e-mailed"
        );
        Ok(path)
    }
}

/// `patient_report_<name>_<YYYYmmdd_HHMMSS>.pdf`
pub fn stored_report_name(patient: &Patient, now: NaiveDateTime) -> String {
    format!(
        "patient_report_{}_{}.pdf",
        report::download_safe(&patient.name).replace(' ', "_"),
        now.format("%Y%m%d_%H%M%S")
    )
}

pub fn email_body(patient: &Patient) -> String {
    format!(
        "Dear Healthcare Provider,

Please find attached the patient report for {name}.

Patient Information:
- Name: {name}
- Email: {email}
- Phone: {phone}
- Date of Birth: {dob}

This report contains detailed patient information including medical history,
current medications, allergies, and other relevant health data.

Best regards,
Patient Management System
",
        name = patient.name,
        email = patient.email,
        phone = patient.phone,
        dob = patient.date_of_birth.format("%B %d, %Y"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_patient;

    fn configured() -> MailConfig {
        MailConfig {
            smtp_server: "smtp.example.com".into(),
            sender_email: "clinic@example.com".into(),
            sender_password: "secret".into(),
            ..MailConfig::default()
        }
    }

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    #[test]
    fn message_has_subject_body_and_pdf_attachment() {
        let notifier = Notifier::new(configured());
        let msg = notifier
            .build_message(&sample_patient(), "doctor@example.org", b"%PDF-1.3 test".to_vec())
            .unwrap();
        let raw = String::from_utf8_lossy(&msg.formatted()).to_string();
        assert!(raw.contains("Subject: Patient Report - John Doe"));
        assert!(raw.contains("To: doctor@example.org"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("patient_report_John_Doe.pdf"));
        assert!(raw.contains("Dear Healthcare Provider"));
    }

    #[test]
    fn bad_recipient_is_address_error() {
        let notifier = Notifier::new(configured());
        let err = notifier
            .build_message(&sample_patient(), "not-an-address", Vec::new())
            .unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn unconfigured_relay_fails_before_writing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let notifier = Notifier::new(MailConfig::default());
        let patient = sample_patient();
        let email = ReportEmail {
            patient: &patient,
            diseases: &[],
            medications: &[],
            recipient: "doctor@example.org",
        };
        let err = notifier.email_report(tmp.path(), &email, now()).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn report_kept_on_disk_when_message_cannot_be_built() {
        let tmp = tempfile::tempdir().unwrap();
        let notifier = Notifier::new(configured());
        let patient = sample_patient();
        let email = ReportEmail {
            patient: &patient,
            diseases: &[],
            medications: &[],
            recipient: "broken address",
        };
        let err = notifier.email_report(tmp.path(), &email, now()).unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
        assert!(tmp.path().join("patient_report_John_Doe_20260201_140509.pdf").exists());
    }

    #[test]
    fn body_lists_patient_details() {
        let body = email_body(&sample_patient());
        assert!(body.contains("- Email: john.doe@email.com"));
        assert!(body.contains("- Date of Birth: March 15, 1985"));
    }
}
