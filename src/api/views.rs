//! Server-rendered HTML.
//!
//! Pages are plain strings built from escaped record fields. Each view
//! returns the page body; [`HtmlPage`] wraps it in the shared layout and
//! shows (then expires) any pending flash message.

use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;

use crate::analytics::{AnalyticsPage, Slice};
use crate::api::flash::{self, Flash};
use crate::config::APP_NAME;
use crate::dashboard::DashboardStats;
use crate::db::PaymentTotals;
use crate::models::enums::{DiseaseStatus, MedicationStatus, PaymentStatus};
use crate::models::*;

pub struct HtmlPage {
    title: String,
    body: String,
    flash: Option<Flash>,
}

impl HtmlPage {
    pub fn new(title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            body,
            flash: None,
        }
    }

    pub fn with_flash(mut self, flash: Option<Flash>) -> Self {
        self.flash = flash;
        self
    }

    pub fn render(&self) -> String {
        let flash = self
            .flash
            .as_ref()
            .map(|f| {
                format!(
                    r#"<div class="flash flash-{}">{}</div>"#,
                    f.level.as_str(),
                    escape(&f.message)
                )
            })
            .unwrap_or_default();
        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{title} - {app}</title>
<style>
body {{ font-family: sans-serif; margin: 0 2rem 2rem; }}
nav {{ padding: 1rem 0; border-bottom: 1px solid #ccc; margin-bottom: 1rem; }}
nav a {{ margin-right: 1rem; }}
table {{ border-collapse: collapse; margin: 1rem 0; }}
th, td {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; vertical-align: top; }}
.flash {{ padding: 0.6rem; margin-bottom: 1rem; }}
.flash-success {{ background: #e6f4ea; }}
.flash-error {{ background: #fdecea; }}
.stats div {{ display: inline-block; margin-right: 2rem; }}
form.inline {{ display: inline; }}
label {{ display: block; margin-top: 0.5rem; }}
.swatch {{ display: inline-block; width: 0.8rem; height: 0.8rem; margin-right: 0.4rem; }}
</style>
</head>
<body>
<nav>
<a href="/">Inicio</a><a href="/patients">Pacientes</a><a href="/payments">Pagos</a><a href="/analytics">Estadísticas</a>
<input id="search" type="search" placeholder="Buscar paciente..." autocomplete="off">
<ul id="search-results"></ul>
</nav>
{flash}
<h1>{title}</h1>
{body}
<script>
const box = document.getElementById('search');
const list = document.getElementById('search-results');
box.addEventListener('input', async () => {{
  const res = await fetch('/search_patients?q=' + encodeURIComponent(box.value));
  const hits = await res.json();
  list.innerHTML = '';
  for (const p of hits) {{
    const li = document.createElement('li');
    const a = document.createElement('a');
    a.href = '/patient/' + p.id;
    a.textContent = p.name + ' (' + p.age + ') ' + p.email;
    li.appendChild(a);
    list.appendChild(li);
  }}
}});
</script>
</body>
</html>
"#,
            title = escape(&self.title),
            app = APP_NAME,
            flash = flash,
            body = self.body,
        )
    }
}

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        let mut response = Html(self.render()).into_response();
        if self.flash.is_some() {
            if let Ok(val) = HeaderValue::from_str(&flash::clear_cookie()) {
                response.headers_mut().insert(SET_COOKIE, val);
            }
        }
        response
    }
}

/// Escape text for element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn delete_button(action: &str, label: &str) -> String {
    format!(
        r#"<form class="inline" method="post" action="{}" onsubmit="return confirm('¿Eliminar?')"><button type="submit">{}</button></form>"#,
        escape(action),
        escape(label)
    )
}

fn select(name: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!(r#"<select name="{name}">"#);
    for option in options {
        let mark = if *option == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{o}"{mark}>{o}</option>"#,
            o = escape(option)
        ));
    }
    html.push_str("</select>");
    html
}

fn input(label: &str, name: &str, kind: &str, value: &str) -> String {
    format!(
        r#"<label>{label} <input type="{kind}" name="{name}" value="{}" step="any"></label>"#,
        escape(value)
    )
}

fn textarea(label: &str, name: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<br><textarea name="{name}" rows="3" cols="60">{}</textarea></label>"#,
        escape(value)
    )
}

fn patient_nav(patient: &Patient) -> String {
    let id = patient.id;
    format!(
        r#"<p><a href="/patient/{id}">{}</a> |
<a href="/patient/{id}/diseases">Enfermedades</a> |
<a href="/patient/{id}/medications">Medicamentos</a> |
<a href="/patient/{id}/diagnoses">Diagnósticos</a> |
<a href="/patient/{id}/prescriptions">Recetas</a> |
<a href="/patient/{id}/payments">Pagos</a></p>"#,
        escape(&patient.name)
    )
}

fn patient_table(patients: &[Patient], today: NaiveDate) -> String {
    if patients.is_empty() {
        return "<p>No hay pacientes registrados.</p>".into();
    }
    let mut html = String::from(
        "<table><tr><th>Nombre</th><th>Email</th><th>Teléfono</th><th>Edad</th><th>IMC</th></tr>",
    );
    for p in patients {
        html.push_str(&format!(
            r#"<tr><td><a href="/patient/{}">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            p.id,
            escape(&p.name),
            escape(&p.email),
            escape(&p.phone),
            p.age_on(today),
            format_bmi(p.bmi()),
        ));
    }
    html.push_str("</table>");
    html
}

pub fn dashboard(stats: &DashboardStats, patients: &[Patient], today: NaiveDate) -> String {
    format!(
        r#"<section class="stats">
<div><strong>{}</strong> pacientes</div>
<div><strong>{}</strong> con diagnóstico</div>
<div><strong>{}</strong> con receta</div>
<div><strong>{}</strong> nuevos este mes</div>
</section>
<section class="stats">
<div>Ingresos: <strong>{}</strong></div>
<div>Pendiente: <strong>{}</strong></div>
<div><strong>{}</strong> pagos</div>
</section>
<p><a href="/patient/new">Nuevo paciente</a></p>
{}"#,
        stats.total_patients,
        stats.patients_with_diagnoses,
        stats.patients_with_prescriptions,
        stats.new_this_month,
        money(stats.total_revenue),
        money(stats.pending_payments),
        stats.total_payments,
        patient_table(patients, today),
    )
}

pub fn patient_list(patients: &[Patient], today: NaiveDate) -> String {
    format!(
        r#"<p><a href="/patient/new">Nuevo paciente</a></p>{}"#,
        patient_table(patients, today)
    )
}

/// Create form when `patient` is `None`, edit form otherwise.
pub fn patient_form(action: &str, patient: Option<&Patient>) -> String {
    let text = |f: fn(&Patient) -> String| patient.map(f).unwrap_or_default();
    format!(
        r#"<form method="post" action="{action}">
{}{}{}{}{}{}{}
{}{}{}{}
<p><button type="submit">Guardar</button></p>
</form>"#,
        input("Nombre", "name", "text", &text(|p| p.name.clone())),
        input("Email", "email", "email", &text(|p| p.email.clone())),
        input("Teléfono", "phone", "text", &text(|p| p.phone.clone())),
        input("Fecha de nacimiento", "date_of_birth", "date", &text(|p| p.date_of_birth.to_string())),
        input("Dirección", "address", "text", &text(|p| p.address.clone())),
        input("Estatura (cm)", "height", "number", &text(|p| p.height.to_string())),
        input("Peso (kg)", "weight", "number", &text(|p| p.weight.to_string())),
        textarea("Enfermedades previas", "past_illnesses", &text(|p| p.past_illnesses.clone().unwrap_or_default())),
        textarea("Medicamentos actuales", "current_medications", &text(|p| p.current_medications.clone().unwrap_or_default())),
        textarea("Alergias", "allergies", &text(|p| p.allergies.clone().unwrap_or_default())),
        textarea("Hábitos alimenticios", "food_habits", &text(|p| p.food_habits.clone().unwrap_or_default())),
        action = escape(action),
    )
}

pub fn patient_detail(patient: &Patient, today: NaiveDate) -> String {
    let id = patient.id;
    format!(
        r#"{nav}
<table>
<tr><th>Email</th><td>{}</td></tr>
<tr><th>Teléfono</th><td>{}</td></tr>
<tr><th>Fecha de nacimiento</th><td>{}</td></tr>
<tr><th>Edad</th><td>{}</td></tr>
<tr><th>Dirección</th><td>{}</td></tr>
<tr><th>Estatura</th><td>{} cm</td></tr>
<tr><th>Peso</th><td>{} kg</td></tr>
<tr><th>IMC</th><td>{}</td></tr>
<tr><th>Enfermedades previas</th><td>{}</td></tr>
<tr><th>Medicamentos actuales</th><td>{}</td></tr>
<tr><th>Alergias</th><td>{}</td></tr>
<tr><th>Hábitos alimenticios</th><td>{}</td></tr>
</table>
<p><a href="/patient/{id}/edit">Editar</a> |
<a href="/patient/{id}/report">Descargar reporte PDF</a> |
<a href="/patient/{id}/email_report">Enviar reporte por email</a> |
<a href="/patient/{id}/diagnosis/new">Nuevo diagnóstico</a></p>
{delete}"#,
        escape(&patient.email),
        escape(&patient.phone),
        patient.date_of_birth,
        patient.age_on(today),
        escape(&patient.address),
        patient.height,
        patient.weight,
        format_bmi(patient.bmi()),
        opt(&patient.past_illnesses),
        opt(&patient.current_medications),
        opt(&patient.allergies),
        opt(&patient.food_habits),
        nav = patient_nav(patient),
        delete = delete_button(&format!("/patient/{id}/delete"), "Eliminar paciente"),
    )
}

pub fn diseases(patient: &Patient, diseases: &[Disease], today: NaiveDate) -> String {
    let mut html = patient_nav(patient);
    html.push_str("<table><tr><th>Enfermedad</th><th>Fecha</th><th>Estado</th><th>Notas</th><th></th></tr>");
    for d in diseases {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&d.name),
            d.diagnosis_date,
            d.status,
            opt(&d.notes),
            delete_button(&format!("/disease/{}/delete", d.id), "Eliminar"),
        ));
    }
    html.push_str("</table>");
    let statuses: Vec<&str> = DiseaseStatus::ALL.iter().map(|s| s.as_str()).collect();
    html.push_str(&format!(
        r#"<h2>Agregar enfermedad</h2>
<form method="post" action="/patient/{}/disease/new">
{}{}<label>Estado {}</label>{}
<p><button type="submit">Agregar</button></p>
</form>"#,
        patient.id,
        input("Nombre", "name", "text", ""),
        input("Fecha de diagnóstico", "diagnosis_date", "date", &today.to_string()),
        select("status", &statuses, DiseaseStatus::Active.as_str()),
        textarea("Notas", "notes", ""),
    ));
    html
}

pub fn medications(patient: &Patient, medications: &[Medication], today: NaiveDate) -> String {
    let mut html = patient_nav(patient);
    html.push_str(
        "<table><tr><th>Medicamento</th><th>Dosis</th><th>Frecuencia</th><th>Inicio</th><th>Fin</th><th>Estado</th><th>Notas</th><th></th></tr>",
    );
    for m in medications {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&m.name),
            escape(&m.dosage),
            escape(&m.frequency),
            m.start_date,
            m.end_date.map(|d| d.to_string()).unwrap_or_else(|| "En curso".into()),
            m.status,
            opt(&m.notes),
            delete_button(&format!("/medication/{}/delete", m.id), "Eliminar"),
        ));
    }
    html.push_str("</table>");
    let statuses: Vec<&str> = MedicationStatus::ALL.iter().map(|s| s.as_str()).collect();
    html.push_str(&format!(
        r#"<h2>Agregar medicamento</h2>
<form method="post" action="/patient/{}/medication/new">
{}{}{}{}{}<label>Estado {}</label>{}
<p><button type="submit">Agregar</button></p>
</form>"#,
        patient.id,
        input("Nombre", "name", "text", ""),
        input("Dosis", "dosage", "text", ""),
        input("Frecuencia", "frequency", "text", ""),
        input("Inicio", "start_date", "date", &today.to_string()),
        input("Fin", "end_date", "date", ""),
        select("status", &statuses, MedicationStatus::Active.as_str()),
        textarea("Notas", "notes", ""),
    ));
    html
}

pub fn prescriptions(patient: &Patient, prescriptions: &[Prescription]) -> String {
    let mut html = patient_nav(patient);
    html.push_str(&format!(
        r#"<p><a href="/patient/{}/prescription/new">Nueva receta</a></p>"#,
        patient.id
    ));
    html.push_str("<table><tr><th>Fecha</th><th>Médico</th><th>Diagnóstico</th><th>Medicamentos</th><th>Origen</th><th></th></tr>");
    for rx in prescriptions {
        let origin = if rx.diagnosis_id.is_some() { "Diagnóstico" } else { "Manual" };
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/prescription/{}/pdf">PDF</a> {}</td></tr>"#,
            rx.date,
            escape(&rx.doctor_name),
            escape(&rx.diagnosis),
            escape(&rx.medications),
            origin,
            rx.id,
            delete_button(&format!("/prescription/{}/delete", rx.id), "Eliminar"),
        ));
    }
    html.push_str("</table>");
    html
}

pub fn prescription_form(patient: &Patient, today: NaiveDate) -> String {
    format!(
        r#"{}
<form method="post" action="/patient/{}/prescription/new">
{}{}{}{}{}{}
<p><button type="submit">Crear receta</button></p>
</form>"#,
        patient_nav(patient),
        patient.id,
        input("Fecha", "date", "date", &today.to_string()),
        input("Médico", "doctor_name", "text", ""),
        input("Cédula profesional", "professional_license", "text", ""),
        textarea("Diagnóstico", "diagnosis", ""),
        textarea("Medicamentos (uno por línea)", "medications", ""),
        textarea("Indicaciones", "instructions", ""),
    )
}

pub fn diagnoses(patient: &Patient, diagnoses: &[Diagnosis]) -> String {
    let mut html = patient_nav(patient);
    html.push_str(&format!(
        r#"<p><a href="/patient/{}/diagnosis/new">Nuevo diagnóstico</a></p>"#,
        patient.id
    ));
    html.push_str("<table><tr><th>Fecha</th><th>Médico</th><th>Síntomas</th><th>Diagnóstico</th><th>Tratamiento</th><th></th></tr>");
    for dx in diagnoses {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/diagnosis/{}/pdf">PDF</a> {}</td></tr>"#,
            dx.date,
            escape(&dx.doctor_name),
            escape(&dx.symptoms),
            escape(&dx.diagnosis),
            opt(&dx.treatment_plan),
            dx.id,
            delete_button(&format!("/diagnosis/{}/delete", dx.id), "Eliminar"),
        ));
    }
    html.push_str("</table>");
    html
}

pub fn diagnosis_form(patient: &Patient, today: NaiveDate) -> String {
    format!(
        r#"{}
<form method="post" action="/patient/{}/diagnosis/new">
{}{}{}{}{}{}{}
<h2>Pago de consulta</h2>
{}{}
<p><button type="submit">Registrar diagnóstico</button></p>
</form>"#,
        patient_nav(patient),
        patient.id,
        input("Fecha", "date", "date", &today.to_string()),
        input("Médico", "doctor_name", "text", ""),
        input("Cédula profesional", "professional_license", "text", ""),
        textarea("Síntomas", "symptoms", ""),
        textarea("Diagnóstico", "diagnosis", ""),
        textarea("Plan de tratamiento (genera una receta)", "treatment_plan", ""),
        textarea("Notas", "notes", ""),
        input("Monto", "consultation_amount", "number", "300.00"),
        input("Método de pago", "payment_method", "text", "Cash"),
    )
}

pub fn payments(patient: &Patient, payments: &[Payment]) -> String {
    let mut html = patient_nav(patient);
    html.push_str(&format!(
        r#"<p><a href="/patient/{}/payment/new">Registrar pago</a></p>"#,
        patient.id
    ));
    html.push_str(&payment_rows(payments.iter().map(|p| (p, None))));
    html
}

pub fn payment_form(patient: &Patient, today: NaiveDate) -> String {
    let statuses: Vec<&str> = PaymentStatus::ALL.iter().map(|s| s.as_str()).collect();
    format!(
        r#"{}
<form method="post" action="/patient/{}/payment/new">
{}{}<label>Método {}</label>{}<label>Estado {}</label>{}
<p><button type="submit">Registrar pago</button></p>
</form>"#,
        patient_nav(patient),
        patient.id,
        input("Monto", "amount", "number", ""),
        input("Fecha", "payment_date", "date", &today.to_string()),
        select("payment_method", &["Cash", "Card", "Transfer"], "Cash"),
        input("Servicio", "service_type", "text", CONSULTATION_SERVICE),
        select("status", &statuses, PaymentStatus::Pending.as_str()),
        textarea("Notas", "notes", ""),
    )
}

pub fn all_payments(payments: &[PaymentWithPatient], totals: &PaymentTotals) -> String {
    format!(
        r#"<section class="stats">
<div>Ingresos: <strong>{}</strong></div>
<div>Pendiente: <strong>{}</strong></div>
<div><strong>{}</strong> pagos</div>
</section>
{}"#,
        money(totals.total_revenue),
        money(totals.pending_payments),
        totals.total_payments,
        payment_rows(payments.iter().map(|p| (&p.payment, Some(p.patient_name.as_str())))),
    )
}

fn payment_rows<'a>(rows: impl Iterator<Item = (&'a Payment, Option<&'a str>)>) -> String {
    let mut html = String::from(
        "<table><tr><th>Fecha</th><th>Paciente</th><th>Monto</th><th>Método</th><th>Servicio</th><th>Estado</th><th>Notas</th><th></th></tr>",
    );
    for (p, patient_name) in rows {
        let patient = match patient_name {
            Some(name) => format!(r#"<a href="/patient/{}">{}</a>"#, p.patient_id, escape(name)),
            None => String::new(),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            p.payment_date,
            patient,
            money(p.amount),
            escape(&p.payment_method),
            escape(&p.service_type),
            p.status,
            opt(&p.notes),
            delete_button(&format!("/payment/{}/delete", p.id), "Eliminar"),
        ));
    }
    html.push_str("</table>");
    html
}

pub fn email_form(patient: &Patient, mail_ready: bool) -> String {
    let warning = if mail_ready {
        ""
    } else {
        "<p><em>El servidor de correo no está configurado.</em></p>"
    };
    format!(
        r#"{}{warning}
<form method="post" action="/patient/{}/email_report">
{}
<p><button type="submit">Enviar reporte</button></p>
</form>"#,
        patient_nav(patient),
        patient.id,
        input("Email del destinatario", "recipient_email", "email", ""),
    )
}

fn legend(slices: &[Slice]) -> String {
    let mut html = String::from("<ul>");
    for s in slices {
        html.push_str(&format!(
            r#"<li><span class="swatch" style="background:{}"></span>{}: {}</li>"#,
            s.color.hex(),
            escape(&s.label),
            s.count
        ));
    }
    html.push_str("</ul>");
    html
}

fn chart(title: &str, file: &Option<String>, slices: &[Slice]) -> String {
    let image = match file {
        Some(name) => format!(
            r#"<img src="/static/{}" alt="{}" width="480" height="480">"#,
            escape(name),
            escape(title)
        ),
        None => "<p>Sin datos.</p>".into(),
    };
    format!("<section><h2>{}</h2>{image}{}</section>", escape(title), legend(slices))
}

pub fn analytics(page: &AnalyticsPage) -> String {
    let d = &page.distributions;
    let mut html = String::new();
    if let Some(error) = &page.error {
        html.push_str(&format!(
            r#"<p class="flash flash-error">No se pudieron generar las gráficas: {}</p>"#,
            escape(error)
        ));
    }
    html.push_str(&format!(
        "<p>{} pacientes, {} enfermedades registradas.</p>",
        d.total_patients, d.total_diseases
    ));
    html.push_str(&chart("Distribución por edad", &page.charts.age_chart, &d.age));
    html.push_str(&chart("Distribución de IMC", &page.charts.bmi_chart, &d.bmi));
    html.push_str(&chart("Enfermedades", &page.charts.disease_chart, &d.diseases));
    html
}
