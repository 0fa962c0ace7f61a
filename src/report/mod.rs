//! Printable documents: the patient report, the prescription and the
//! diagnosis report.
//!
//! Each document is first assembled as a list of [`Block`]s, which is what
//! the tests inspect, then drawn onto PDF pages by [`layout::PdfWriter`].

pub mod bullets;
pub mod diagnosis;
pub mod layout;
pub mod patient;
pub mod prescription;

use chrono::{Datelike, NaiveDate};

pub use bullets::BulletStyle;
pub use diagnosis::{diagnosis_document, diagnosis_download_name, diagnosis_number};
pub use patient::{patient_report, patient_report_download_name};
pub use prescription::{prescription_document, prescription_download_name, prescription_number};

use crate::config::ClinicInfo;
use layout::PdfWriter;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One drawable element of a document, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    /// Small centred line under the title.
    Centered(String),
    Heading(String),
    Field(String, String),
    Bold(String),
    Paragraph(String),
    Bullet { text: String, level: usize },
    Table {
        widths: Vec<f32>,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
    Space(f32),
    Footer(String),
}

/// Settings shared by the prescription and diagnosis documents.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub clinic: &'a ClinicInfo,
    pub bullets: BulletStyle,
    /// Issue date printed on the document and used for ages.
    pub today: NaiveDate,
}

/// Draw `blocks` onto as many pages as needed and return the PDF bytes.
pub fn render(title: &str, blocks: &[Block]) -> Result<Vec<u8>, ReportError> {
    let mut w = PdfWriter::new(title)?;
    for block in blocks {
        match block {
            Block::Title(t) => w.title(t),
            Block::Centered(t) => w.centered_line(t),
            Block::Heading(t) => w.heading(t),
            Block::Field(label, value) => w.field(label, value),
            Block::Bold(t) => w.bold_line(t),
            Block::Paragraph(t) => w.paragraph(t),
            Block::Bullet { text, level } => w.bullet(text, *level),
            Block::Table {
                widths,
                header,
                rows,
            } => {
                let header: Vec<&str> = header.iter().map(String::as_str).collect();
                w.table(widths, &header, rows);
            }
            Block::Rule => w.rule(0.5),
            Block::Space(mm) => w.space(*mm),
            Block::Footer(t) => w.footer(t),
        }
    }
    w.finish()
}

pub(crate) fn field(label: &str, value: impl Into<String>) -> Block {
    Block::Field(label.to_string(), value.into())
}

pub(crate) fn heading(text: &str) -> Block {
    Block::Heading(text.to_string())
}

/// Bullets for a free-text field, or `placeholder` when it splits to nothing.
pub(crate) fn bullet_section(
    style: BulletStyle,
    text: Option<&str>,
    level: usize,
    placeholder: Option<&str>,
) -> Vec<Block> {
    let items = text.map(|t| style.split(t)).unwrap_or_default();
    if items.is_empty() {
        return placeholder
            .map(|p| vec![Block::Paragraph(p.to_string())])
            .unwrap_or_default();
    }
    items
        .into_iter()
        .map(|text| Block::Bullet { text, level })
        .collect()
}

/// Clinic letterhead lines followed by the professional license.
pub(crate) fn letterhead(clinic: &ClinicInfo, license: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = std::iter::once(&clinic.name)
        .chain(std::iter::once(&clinic.specialty))
        .chain(clinic.address_lines.iter())
        .chain(std::iter::once(&clinic.phone_line))
        .map(|line| Block::Centered(line.clone()))
        .collect();
    blocks.push(Block::Centered(format!("Cédula Profesional: {license}")));
    blocks.push(Block::Space(6.0));
    blocks
}

/// Signature line for the treating doctor.
pub(crate) fn signature(clinic: &ClinicInfo, doctor: &str, license: &str) -> Vec<Block> {
    vec![
        Block::Space(15.0),
        Block::Paragraph("_".repeat(60)),
        Block::Paragraph(format!("Dr. {doctor}")),
        Block::Paragraph("Médico General".into()),
        Block::Paragraph(format!("Cédula Profesional: {license}")),
        Block::Paragraph(clinic.name.clone()),
    ]
}

/// Doctor block shared by prescriptions and diagnoses.
pub(crate) fn doctor_block(doctor: &str) -> Vec<Block> {
    vec![
        heading("DATOS DEL MÉDICO"),
        field("Médico Tratante", format!("Dr. {doctor}")),
        field("Especialidad", "Medicina General"),
        field("Consultorio", "Consultorio No. 1"),
    ]
}

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// `16 de octubre de 2026`
pub fn long_date_es(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

/// Make a value safe for a `Content-Disposition` filename.
pub(crate) fn download_safe(name: &str) -> String {
    layout::fold_to_ascii(name)
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' | '?' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::models::Patient;

    pub fn sample_patient() -> Patient {
        let ts = NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Patient {
            id: 7,
            name: "John Doe".into(),
            email: "john.doe@email.com".into(),
            phone: "555-0101".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 15).unwrap(),
            address: "123 Main St".into(),
            height: 170.0,
            weight: 70.0,
            past_illnesses: Some("Chickenpox".into()),
            current_medications: Some("  ".into()),
            allergies: None,
            food_habits: Some("Vegetarian".into()),
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_long_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(long_date_es(d), "16 de octubre de 2026");
    }

    #[test]
    fn bullet_section_uses_placeholder_for_blank_text() {
        let blocks = bullet_section(BulletStyle::Lines, Some("  "), 0, Some("Pendiente"));
        assert_eq!(blocks, vec![Block::Paragraph("Pendiente".into())]);
        assert!(bullet_section(BulletStyle::Lines, None, 1, None).is_empty());
    }

    #[test]
    fn letterhead_ends_with_license() {
        let clinic = ClinicInfo::default();
        let blocks = letterhead(&clinic, "1234567");
        assert_eq!(blocks[0], Block::Centered("CLÍNICA MÉDICA INTEGRAL".into()));
        assert!(blocks.contains(&Block::Centered("Cédula Profesional: 1234567".into())));
    }

    #[test]
    fn download_names_are_header_safe() {
        assert_eq!(download_safe("José \"Pepe\" Núñez"), "Jose _Pepe_ Nunez");
    }

    #[test]
    fn render_produces_pdf() {
        let blocks = vec![
            Block::Title("Documento".into()),
            heading("SECCIÓN"),
            field("Nombre", "Ana"),
            Block::Bullet { text: "uno".into(), level: 0 },
            Block::Bullet { text: "dos".into(), level: 1 },
            Block::Rule,
            Block::Footer("pie".into()),
        ];
        assert!(render("Documento", &blocks).unwrap().starts_with(b"%PDF"));
    }
}
