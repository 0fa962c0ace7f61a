//! The patient report: demographics, history, diseases and medications.

use super::{heading, render, Block, ReportError};
use crate::models::*;

fn or_none(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "None".into(),
    }
}

pub fn patient_report_blocks(
    patient: &Patient,
    diseases: &[Disease],
    medications: &[Medication],
) -> Vec<Block> {
    let two_col = vec![50.8, 101.6];
    let mut blocks = vec![
        Block::Title(format!("Patient Report - {}", patient.name)),
        Block::Space(4.0),
        heading("Personal Information"),
        Block::Table {
            widths: two_col.clone(),
            header: vec!["Name".into(), patient.name.clone()],
            rows: vec![
                vec!["Email".into(), patient.email.clone()],
                vec!["Phone".into(), patient.phone.clone()],
                vec![
                    "Date of Birth".into(),
                    patient.date_of_birth.format("%B %d, %Y").to_string(),
                ],
                vec!["Address".into(), patient.address.clone()],
                vec!["Height".into(), format!("{} cm", patient.height)],
                vec!["Weight".into(), format!("{} kg", patient.weight)],
                vec!["BMI".into(), format_bmi(patient.bmi())],
            ],
        },
        heading("Medical History"),
        Block::Table {
            widths: two_col,
            header: vec!["Past Illnesses".into(), or_none(&patient.past_illnesses)],
            rows: vec![
                vec![
                    "Current Medications".into(),
                    or_none(&patient.current_medications),
                ],
                vec!["Allergies".into(), or_none(&patient.allergies)],
                vec!["Food Habits".into(), or_none(&patient.food_habits)],
            ],
        },
    ];

    if !diseases.is_empty() {
        blocks.push(heading("Diseases"));
        blocks.push(Block::Table {
            widths: vec![38.1, 38.1, 25.4, 50.8],
            header: ["Disease", "Diagnosis Date", "Status", "Notes"]
                .map(String::from)
                .to_vec(),
            rows: diseases
                .iter()
                .map(|d| {
                    vec![
                        d.name.clone(),
                        d.diagnosis_date.to_string(),
                        d.status.to_string(),
                        d.notes.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        });
    }

    if !medications.is_empty() {
        blocks.push(heading("Medications"));
        blocks.push(Block::Table {
            widths: vec![30.5, 25.4, 25.4, 25.4, 25.4, 20.3],
            header: ["Medication", "Dosage", "Frequency", "Start Date", "End Date", "Status"]
                .map(String::from)
                .to_vec(),
            rows: medications
                .iter()
                .map(|m| {
                    vec![
                        m.name.clone(),
                        m.dosage.clone(),
                        m.frequency.clone(),
                        m.start_date.to_string(),
                        m.end_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "Ongoing".into()),
                        m.status.to_string(),
                    ]
                })
                .collect(),
        });
    }

    blocks
}

pub fn patient_report(
    patient: &Patient,
    diseases: &[Disease],
    medications: &[Medication],
) -> Result<Vec<u8>, ReportError> {
    let title = format!("Patient Report - {}", patient.name);
    render(&title, &patient_report_blocks(patient, diseases, medications))
}

/// `patient_report_<name with spaces as underscores>.pdf`
pub fn patient_report_download_name(patient: &Patient) -> String {
    format!(
        "patient_report_{}.pdf",
        super::download_safe(&patient.name).replace(' ', "_")
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::enums::*;
    use crate::report::fixtures::sample_patient;

    fn table_rows(block: &Block) -> &Vec<Vec<String>> {
        match block {
            Block::Table { rows, .. } => rows,
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn personal_table_has_bmi_and_history_defaults() {
        let blocks = patient_report_blocks(&sample_patient(), &[], &[]);
        assert_eq!(blocks[0], Block::Title("Patient Report - John Doe".into()));

        let personal = table_rows(&blocks[3]);
        assert!(personal.contains(&vec!["BMI".to_string(), "24.2".to_string()]));
        assert!(personal.contains(&vec!["Date of Birth".to_string(), "March 15, 1985".to_string()]));

        let history = table_rows(&blocks[5]);
        assert_eq!(history[0], vec!["Current Medications", "None"]);
        assert_eq!(history[1], vec!["Allergies", "None"]);
        // No disease or medication sections.
        assert_eq!(blocks.len(), 6);
    }

    #[test]
    fn medication_without_end_date_is_ongoing() {
        let med = Medication {
            id: 1,
            patient_id: 7,
            name: "Lisinopril".into(),
            dosage: "10mg".into(),
            frequency: "Once daily".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            end_date: None,
            status: MedicationStatus::Active,
            notes: None,
        };
        let disease = Disease {
            id: 1,
            patient_id: 7,
            name: "Hypertension".into(),
            diagnosis_date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            status: DiseaseStatus::Chronic,
            notes: None,
        };
        let blocks = patient_report_blocks(&sample_patient(), &[disease], &[med]);
        assert_eq!(blocks[6], Block::Heading("Diseases".into()));
        assert_eq!(table_rows(&blocks[7])[0], vec!["Hypertension", "2023-01-10", "Chronic", ""]);
        assert_eq!(table_rows(&blocks[9])[0][4], "Ongoing");
    }

    #[test]
    fn report_bytes_are_pdf() {
        let pdf = patient_report(&sample_patient(), &[], &[]).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn download_name_underscores_spaces() {
        assert_eq!(
            patient_report_download_name(&sample_patient()),
            "patient_report_John_Doe.pdf"
        );
    }
}
