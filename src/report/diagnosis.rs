//! The printable diagnosis report.

use chrono::NaiveDate;

use super::prescription::fixed_bullets;
use super::{
    bullet_section, doctor_block, field, heading, letterhead, long_date_es, render, signature,
    Block, DocumentContext, ReportError,
};
use crate::models::*;

const RECOMMENDATIONS: [&str; 5] = [
    "Mantener una dieta balanceada y baja en grasas",
    "Realizar ejercicio moderado regularmente",
    "Evitar el consumo de tabaco y alcohol",
    "Mantener una hidratación adecuada",
    "Dormir al menos 7-8 horas diarias",
];

const FOLLOW_UP: [&str; 3] = [
    "Regresar en 15 días para evaluación de progreso",
    "En caso de empeoramiento de síntomas, consultar inmediatamente",
    "Realizar estudios de laboratorio según indicación médica",
];

/// `DX-0003-20261016`
pub fn diagnosis_number(id: i64, issued: NaiveDate) -> String {
    format!("DX-{id:04}-{}", issued.format("%Y%m%d"))
}

fn or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

pub fn diagnosis_blocks(ctx: &DocumentContext<'_>, patient: &Patient, dx: &Diagnosis) -> Vec<Block> {
    let style = ctx.bullets;
    let mut blocks = vec![Block::Title("REPORTE DE DIAGNÓSTICO MÉDICO".into())];
    blocks.extend(letterhead(ctx.clinic, &dx.professional_license));
    blocks.push(field("Fecha de Consulta", long_date_es(ctx.today)));
    blocks.push(field("No. de Diagnóstico", diagnosis_number(dx.id, ctx.today)));

    blocks.push(heading("DATOS DEL PACIENTE"));
    blocks.push(field("Nombre", patient.name.clone()));
    blocks.push(field("Fecha de Nacimiento", long_date_es(patient.date_of_birth)));
    blocks.push(field("Edad", format!("{} años", patient.age_on(ctx.today))));
    blocks.push(field("Teléfono", patient.phone.clone()));
    blocks.push(field("Dirección", patient.address.clone()));
    blocks.push(field("Altura", format!("{} cm", patient.height)));
    blocks.push(field("Peso", format!("{} kg", patient.weight)));
    blocks.push(field("IMC", format_bmi(patient.bmi())));

    blocks.extend(doctor_block(&dx.doctor_name));

    blocks.push(heading("SÍNTOMAS REFERIDOS"));
    blocks.extend(bullet_section(
        style,
        Some(&dx.symptoms),
        0,
        Some("No se reportaron síntomas específicos"),
    ));

    blocks.push(heading("DIAGNÓSTICO CLÍNICO"));
    blocks.extend(bullet_section(
        style,
        Some(&dx.diagnosis),
        0,
        Some("Diagnóstico pendiente de confirmación"),
    ));

    if dx.treatment_plan.is_some() {
        blocks.push(heading("PLAN DE TRATAMIENTO"));
        blocks.extend(bullet_section(
            style,
            dx.treatment_plan.as_deref(),
            0,
            Some("Plan de tratamiento pendiente"),
        ));
    }

    if dx.notes.is_some() {
        blocks.push(heading("OBSERVACIONES MÉDICAS"));
        blocks.extend(bullet_section(
            style,
            dx.notes.as_deref(),
            0,
            Some("Sin observaciones adicionales"),
        ));
    }

    blocks.push(heading("RESUMEN DE HISTORIAL MÉDICO"));
    blocks.push(field(
        "Enfermedades Previas",
        or_default(&patient.past_illnesses, "Sin antecedentes"),
    ));
    blocks.push(field(
        "Medicamentos Actuales",
        or_default(&patient.current_medications, "Ninguno"),
    ));
    blocks.push(field(
        "Alergias",
        or_default(&patient.allergies, "Sin alergias conocidas"),
    ));
    blocks.push(field(
        "Hábitos Alimenticios",
        or_default(&patient.food_habits, "No especificado"),
    ));

    blocks.push(heading("RECOMENDACIONES GENERALES"));
    blocks.extend(fixed_bullets(&RECOMMENDATIONS));
    blocks.push(heading("CONTROL MÉDICO"));
    blocks.extend(fixed_bullets(&FOLLOW_UP));

    blocks.extend(signature(ctx.clinic, &dx.doctor_name, &dx.professional_license));
    blocks.push(Block::Footer(
        "Este documento es confidencial y solo debe ser compartido con personal médico autorizado"
            .into(),
    ));
    blocks
}

pub fn diagnosis_document(
    ctx: &DocumentContext<'_>,
    patient: &Patient,
    dx: &Diagnosis,
) -> Result<Vec<u8>, ReportError> {
    render(
        &format!("Diagnóstico Médico - {}", patient.name),
        &diagnosis_blocks(ctx, patient, dx),
    )
}

/// `diagnostico_medico_<patient>_<diagnosis date>.pdf`
pub fn diagnosis_download_name(patient: &Patient, dx: &Diagnosis) -> String {
    format!(
        "diagnostico_medico_{}_{}.pdf",
        super::download_safe(&patient.name),
        dx.date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicInfo;
    use crate::report::fixtures::sample_patient;
    use crate::report::BulletStyle;

    fn dx() -> Diagnosis {
        Diagnosis {
            id: 3,
            patient_id: 7,
            date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            doctor_name: "Laura Mendez".into(),
            professional_license: "12345678".into(),
            symptoms: "Fiebre\nDolor de garganta".into(),
            diagnosis: "Faringitis aguda".into(),
            treatment_plan: Some("Amoxicilina 500mg".into()),
            notes: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 20)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    fn ctx(clinic: &ClinicInfo) -> DocumentContext<'_> {
        DocumentContext {
            clinic,
            bullets: BulletStyle::Lines,
            today: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        }
    }

    #[test]
    fn patient_block_includes_bmi() {
        let clinic = ClinicInfo::default();
        let blocks = diagnosis_blocks(&ctx(&clinic), &sample_patient(), &dx());
        assert!(blocks.contains(&Block::Field("IMC".into(), "24.2".into())));
        assert!(blocks.contains(&Block::Field("Altura".into(), "170 cm".into())));
        assert!(blocks.contains(&Block::Field(
            "No. de Diagnóstico".into(),
            "DX-0003-20261016".into()
        )));
    }

    #[test]
    fn history_summary_uses_spanish_defaults() {
        let clinic = ClinicInfo::default();
        let blocks = diagnosis_blocks(&ctx(&clinic), &sample_patient(), &dx());
        assert!(blocks.contains(&Block::Field("Alergias".into(), "Sin alergias conocidas".into())));
        assert!(blocks.contains(&Block::Field("Medicamentos Actuales".into(), "Ninguno".into())));
        assert!(blocks.contains(&Block::Field("Enfermedades Previas".into(), "Chickenpox".into())));
    }

    #[test]
    fn notes_section_omitted_without_notes() {
        let clinic = ClinicInfo::default();
        let blocks = diagnosis_blocks(&ctx(&clinic), &sample_patient(), &dx());
        assert!(blocks.contains(&Block::Heading("PLAN DE TRATAMIENTO".into())));
        assert!(!blocks.contains(&Block::Heading("OBSERVACIONES MÉDICAS".into())));
    }

    #[test]
    fn zero_height_patient_shows_na_bmi() {
        let clinic = ClinicInfo::default();
        let mut p = sample_patient();
        p.height = 0.0;
        let blocks = diagnosis_blocks(&ctx(&clinic), &p, &dx());
        assert!(blocks.contains(&Block::Field("IMC".into(), "N/A".into())));
    }

    #[test]
    fn document_is_pdf_and_named() {
        let clinic = ClinicInfo::default();
        let pdf = diagnosis_document(&ctx(&clinic), &sample_patient(), &dx()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(
            diagnosis_download_name(&sample_patient(), &dx()),
            "diagnostico_medico_John Doe_2026-01-20.pdf"
        );
    }
}
