use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub past_illnesses: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub food_habits: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Writable patient fields, shared by create and edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub height: f64,
    pub weight: f64,
    pub past_illnesses: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub food_habits: Option<String>,
}

impl Patient {
    pub fn age_on(&self, today: NaiveDate) -> i64 {
        age_in_years(self.date_of_birth, today)
    }

    pub fn bmi(&self) -> Option<f64> {
        body_mass_index(self.height, self.weight)
    }
}

/// Whole days since birth floor-divided by 365. Not calendar-accurate:
/// leap days accumulate, so a birthday can be reported a few days early.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    (today - date_of_birth).num_days().div_euclid(365)
}

/// weight_kg / (height_cm / 100)². `None` when height is not positive
/// or the result is not finite.
pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    bmi.is_finite().then_some(bmi)
}

/// One-decimal rendering used on every printed document.
pub fn format_bmi(bmi: Option<f64>) -> String {
    match bmi {
        Some(v) => format!("{v:.1}"),
        None => "N/A".into(),
    }
}
