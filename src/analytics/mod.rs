//! Clinic-wide analytics: age, BMI and disease distributions.
//!
//! Bucketing is pure and lives here; rasterising the pie charts is in
//! [`chart`]. Counting needs the connection, drawing does not, so callers
//! release the database before [`render_page`]. Neither step fails the
//! page: any error degrades to an all-zero page carrying the error text.

pub mod chart;

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};

pub use chart::{render_charts, ChartError, ChartSet};

pub const AGE_LABELS: [&str; 4] = ["0-20", "21-40", "41-60", "61+"];
pub const BMI_LABELS: [&str; 4] = ["Underweight", "Normal", "Overweight", "Obese"];

pub const AGE_COLORS: [Rgb; 4] = [
    Rgb(0xff, 0x99, 0x99),
    Rgb(0x66, 0xb3, 0xff),
    Rgb(0x99, 0xff, 0x99),
    Rgb(0xff, 0xcc, 0x99),
];
pub const BMI_COLORS: [Rgb; 4] = [
    Rgb(0xff, 0x6b, 0x6b),
    Rgb(0x4e, 0xcd, 0xc4),
    Rgb(0x45, 0xb7, 0xd1),
    Rgb(0x96, 0xce, 0xb4),
];
/// Cycled when there are more diseases than colours.
pub const DISEASE_PALETTE: [Rgb; 12] = [
    Rgb(0x8d, 0xd3, 0xc7),
    Rgb(0xff, 0xff, 0xb3),
    Rgb(0xbe, 0xba, 0xda),
    Rgb(0xfb, 0x80, 0x72),
    Rgb(0x80, 0xb1, 0xd3),
    Rgb(0xfd, 0xb4, 0x62),
    Rgb(0xb3, 0xde, 0x69),
    Rgb(0xfc, 0xcd, 0xe5),
    Rgb(0xd9, 0xd9, 0xd9),
    Rgb(0xbc, 0x80, 0xbd),
    Rgb(0xcc, 0xeb, 0xc5),
    Rgb(0xff, 0xed, 0x6f),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`, for the HTML legend.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

/// One pie sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: u32,
    pub color: Rgb,
}

/// The three distributions over the whole clinic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distributions {
    pub age: Vec<Slice>,
    pub bmi: Vec<Slice>,
    /// Disease name to count, in order of first appearance. Empty when no
    /// disease has been recorded.
    pub diseases: Vec<Slice>,
    pub total_patients: u32,
    pub total_diseases: u32,
}

/// What the analytics page shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsPage {
    pub distributions: Distributions,
    pub charts: ChartSet,
    pub error: Option<String>,
}

pub fn age_bucket(age: i64) -> usize {
    match age {
        i64::MIN..=20 => 0,
        21..=40 => 1,
        41..=60 => 2,
        _ => 3,
    }
}

pub fn bmi_bucket(bmi: f64) -> usize {
    if bmi < 18.5 {
        0
    } else if bmi < 25.0 {
        1
    } else if bmi < 30.0 {
        2
    } else {
        3
    }
}

/// Count every patient and disease into the fixed buckets.
pub fn collect_distributions(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Distributions, DatabaseError> {
    let patients = db::list_patients(conn)?;

    let mut age_counts = [0u32; 4];
    let mut bmi_counts = [0u32; 4];
    for patient in &patients {
        age_counts[age_bucket(patient.age_on(today))] += 1;
        // Undefined BMI (zero height) counts as 0.
        bmi_counts[bmi_bucket(patient.bmi().unwrap_or(0.0))] += 1;
    }

    let disease_counts = db::count_diseases_by_name(conn)?;
    let total_diseases = disease_counts.iter().map(|(_, n)| n).sum();

    Ok(Distributions {
        age: slices(&AGE_LABELS, &age_counts, &AGE_COLORS),
        bmi: slices(&BMI_LABELS, &bmi_counts, &BMI_COLORS),
        diseases: disease_counts
            .into_iter()
            .enumerate()
            .map(|(i, (label, count))| Slice {
                label,
                count,
                color: DISEASE_PALETTE[i % DISEASE_PALETTE.len()],
            })
            .collect(),
        total_patients: patients.len() as u32,
        total_diseases,
    })
}

fn slices(labels: &[&str], counts: &[u32], colors: &[Rgb]) -> Vec<Slice> {
    labels
        .iter()
        .zip(counts)
        .zip(colors)
        .map(|((label, count), color)| Slice {
            label: label.to_string(),
            count: *count,
            color: *color,
        })
        .collect()
}

/// Draw `distributions` into `static_dir`; an all-zero page on error.
pub fn render_page(distributions: Distributions, static_dir: &Path) -> AnalyticsPage {
    match render_charts(&distributions, static_dir) {
        Ok(charts) => AnalyticsPage {
            distributions,
            charts,
            error: None,
        },
        Err(e) => unavailable(&e),
    }
}

/// The page shown when counting or drawing failed.
pub fn unavailable(err: &dyn std::fmt::Display) -> AnalyticsPage {
    tracing::warn!(error = %err, "Analytics unavailable");
    AnalyticsPage {
        error: Some(err.to_string()),
        ..AnalyticsPage::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::DiseaseStatus;
    use crate::models::DiseaseDraft;

    fn counts(slices: &[Slice]) -> Vec<u32> {
        slices.iter().map(|s| s.count).collect()
    }

    #[test]
    fn age_bucket_edges() {
        assert_eq!(age_bucket(0), 0);
        assert_eq!(age_bucket(20), 0);
        assert_eq!(age_bucket(21), 1);
        assert_eq!(age_bucket(40), 1);
        assert_eq!(age_bucket(41), 2);
        assert_eq!(age_bucket(60), 2);
        assert_eq!(age_bucket(61), 3);
        assert_eq!(age_bucket(-1), 0);
    }

    #[test]
    fn bmi_bucket_edges() {
        assert_eq!(bmi_bucket(0.0), 0);
        assert_eq!(bmi_bucket(18.49), 0);
        assert_eq!(bmi_bucket(18.5), 1);
        assert_eq!(bmi_bucket(24.99), 1);
        assert_eq!(bmi_bucket(25.0), 2);
        assert_eq!(bmi_bucket(30.0), 3);
    }

    #[test]
    fn distributions_over_patients_and_diseases() {
        let conn = open_memory_database().unwrap();
        let now = ts("2026-01-10 09:00:00");

        // 1985-03-15, 175 cm, 70 kg: age 40, BMI 22.9
        let a = make_patient(&conn, "Ana", "ana@example.com");
        let mut young = patient_draft("Beto", "beto@example.com");
        young.date_of_birth = date("2010-06-01");
        young.height = 0.0;
        db::insert_patient(&conn, &young, now).unwrap();
        let mut senior = patient_draft("Carla", "carla@example.com");
        senior.date_of_birth = date("1950-01-01");
        senior.weight = 95.0;
        let c = db::insert_patient(&conn, &senior, now).unwrap();

        for (pid, name) in [(a, "Diabetes"), (c, "Hypertension"), (c, "Diabetes")] {
            db::insert_disease(&conn, pid, &DiseaseDraft {
                name: name.into(),
                diagnosis_date: date("2024-01-01"),
                status: DiseaseStatus::Chronic,
                notes: None,
            })
            .unwrap();
        }

        let d = collect_distributions(&conn, date("2026-03-01")).unwrap();
        assert_eq!(counts(&d.age), vec![1, 1, 0, 1]);
        assert_eq!(counts(&d.bmi), vec![1, 1, 0, 1]);
        assert_eq!(d.diseases[0].label, "Diabetes");
        assert_eq!(counts(&d.diseases), vec![2, 1]);
        assert_eq!(d.total_patients, 3);
        assert_eq!(d.total_diseases, 3);
    }

    #[test]
    fn empty_clinic_has_zero_buckets_and_no_diseases() {
        let conn = open_memory_database().unwrap();
        let d = collect_distributions(&conn, date("2026-03-01")).unwrap();
        assert_eq!(counts(&d.age), vec![0; 4]);
        assert!(d.diseases.is_empty());
    }

    #[test]
    fn page_degrades_to_zeros_when_charts_cannot_be_written() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "Ana", "ana@example.com");
        let tmp = tempfile::tempdir().unwrap();
        // A file where the chart directory should be.
        let blocked = tmp.path().join("static");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let dist = collect_distributions(&conn, date("2026-03-01")).unwrap();
        let page = render_page(dist, &blocked);
        assert!(page.error.is_some());
        assert_eq!(page.distributions.total_patients, 0);
        assert!(page.charts.age_chart.is_none());
    }

    #[test]
    fn page_renders_charts() {
        let conn = open_memory_database().unwrap();
        make_patient(&conn, "Ana", "ana@example.com");
        let tmp = tempfile::tempdir().unwrap();

        let dist = collect_distributions(&conn, date("2026-03-01")).unwrap();
        let page = render_page(dist, tmp.path());
        assert!(page.error.is_none());
        assert_eq!(page.charts.age_chart.as_deref(), Some("age_chart.png"));
        assert!(page.charts.disease_chart.is_none());
        assert!(tmp.path().join("bmi_chart.png").exists());
    }

    #[test]
    fn rgb_hex() {
        assert_eq!(AGE_COLORS[0].hex(), "#ff9999");
    }
}
