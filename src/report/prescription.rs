//! The printable prescription ("receta médica").

use chrono::NaiveDate;

use super::{
    bullet_section, doctor_block, field, heading, letterhead, long_date_es, render, signature,
    Block, DocumentContext, ReportError,
};
use crate::models::*;

const ADDITIONAL_INFO: [&str; 4] = [
    "Tomar con alimentos para evitar malestar estomacal",
    "No conducir vehículos bajo efectos de la medicación",
    "Mantener hidratación adecuada",
    "Evitar consumo de alcohol durante el tratamiento",
];

const FOLLOW_UP: [&str; 3] = [
    "Regresar en 7 días para evaluación",
    "En caso de efectos secundarios, consultar inmediatamente",
    "Mantener dieta balanceada y ejercicio moderado",
];

/// `RX-0007-20261016`
pub fn prescription_number(id: i64, issued: NaiveDate) -> String {
    format!("RX-{id:04}-{}", issued.format("%Y%m%d"))
}

/// Content of a prescription. `recent` is the patient's latest diagnosis,
/// summarised as "previous diagnosis" when present.
pub fn prescription_blocks(
    ctx: &DocumentContext<'_>,
    patient: &Patient,
    rx: &Prescription,
    recent: Option<&Diagnosis>,
) -> Vec<Block> {
    let style = ctx.bullets;
    let mut blocks = vec![Block::Title("RECETA MÉDICA".into())];
    blocks.extend(letterhead(ctx.clinic, &rx.professional_license));
    blocks.push(field("Fecha", long_date_es(ctx.today)));
    blocks.push(field("No. de Receta", prescription_number(rx.id, ctx.today)));

    blocks.push(heading("DATOS DEL PACIENTE"));
    blocks.push(field("Nombre", patient.name.clone()));
    blocks.push(field("Fecha de Nacimiento", long_date_es(patient.date_of_birth)));
    blocks.push(field("Edad", format!("{} años", patient.age_on(ctx.today))));
    blocks.push(field("Teléfono", patient.phone.clone()));
    blocks.push(field("Dirección", patient.address.clone()));

    blocks.extend(doctor_block(&rx.doctor_name));

    blocks.push(heading("DIAGNÓSTICO"));
    blocks.extend(bullet_section(
        style,
        Some(&rx.diagnosis),
        0,
        Some("Diagnóstico pendiente de confirmación"),
    ));

    if let Some(dx) = recent {
        blocks.push(heading("DIAGNÓSTICO PREVIO"));
        blocks.push(field("Fecha del diagnóstico", long_date_es(dx.date)));
        blocks.push(field("Médico que diagnosticó", format!("Dr. {}", dx.doctor_name)));
        let parts = [
            ("Síntomas referidos:", Some(dx.symptoms.as_str())),
            ("Diagnóstico clínico:", Some(dx.diagnosis.as_str())),
            ("Plan de tratamiento previo:", dx.treatment_plan.as_deref()),
            ("Observaciones previas:", dx.notes.as_deref()),
        ];
        for (label, text) in parts {
            let items = bullet_section(style, text, 1, None);
            if !items.is_empty() {
                blocks.push(Block::Bold(label.into()));
                blocks.extend(items);
            }
        }
    }

    blocks.push(heading("MEDICAMENTOS PRESCRITOS"));
    blocks.extend(bullet_section(
        style,
        Some(&rx.medications),
        0,
        Some("Sin medicamentos prescritos"),
    ));

    if let Some(instructions) = rx.instructions.as_deref().filter(|i| !i.trim().is_empty()) {
        blocks.push(heading("INSTRUCCIONES DE USO"));
        blocks.extend(bullet_section(
            style,
            Some(instructions),
            0,
            Some("Seguir indicaciones del médico"),
        ));
    }

    blocks.push(heading("INFORMACIÓN ADICIONAL"));
    blocks.extend(fixed_bullets(&ADDITIONAL_INFO));
    blocks.push(heading("CONTROL MÉDICO"));
    blocks.extend(fixed_bullets(&FOLLOW_UP));

    blocks.extend(signature(ctx.clinic, &rx.doctor_name, &rx.professional_license));
    blocks.push(Block::Footer(
        "Esta receta es válida por 30 días a partir de la fecha de emisión".into(),
    ));
    blocks
}

pub(crate) fn fixed_bullets(items: &[&str]) -> Vec<Block> {
    items
        .iter()
        .map(|t| Block::Bullet {
            text: t.to_string(),
            level: 0,
        })
        .collect()
}

pub fn prescription_document(
    ctx: &DocumentContext<'_>,
    patient: &Patient,
    rx: &Prescription,
    recent: Option<&Diagnosis>,
) -> Result<Vec<u8>, ReportError> {
    render(
        &format!("Receta Médica - {}", patient.name),
        &prescription_blocks(ctx, patient, rx, recent),
    )
}

/// `receta_medica_<patient>_<prescription date>.pdf`
pub fn prescription_download_name(patient: &Patient, rx: &Prescription) -> String {
    format!(
        "receta_medica_{}_{}.pdf",
        super::download_safe(&patient.name),
        rx.date
    )
}
