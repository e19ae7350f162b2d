use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::fields::{self, Parsed};
use crate::models::Application;

/// One raw form submission, before coercion.
///
/// For the optional coercible fields, `None` means the key was not part of
/// the submission at all — distinct from `Some("")`, which means the field
/// was submitted blank. The checkboxes carry no such distinction: an
/// unchecked box arrives as plain `false`.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub company_name: String,
    pub role: String,
    pub application_date: Option<String>,
    pub status: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub interview_date: Option<String>,
    pub salary: Option<String>,
    pub bonus: Option<String>,
    pub pto: Option<String>,
    pub cover_letter: bool,
    pub offer: bool,
    pub equity: bool,
    pub health_coverage: bool,
}

/// Fully-resolved field set handed to persistence: every Application column
/// except id and the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub company_name: String,
    pub role: String,
    pub application_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub cover_letter: bool,
    pub interview_date: Option<NaiveDate>,
    pub offer: bool,
    pub salary: Option<Decimal>,
    pub equity: bool,
    pub bonus: Option<f64>,
    pub health_coverage: bool,
    pub pto: Option<String>,
    pub is_active: bool,
}

/// Resolve a create-path field: anything that doesn't parse cleanly degrades
/// to absent. Create never rejects a submission over one bad optional field.
fn resolve_new<T>(raw: Option<&str>, parse: impl Fn(&str) -> Parsed<T>) -> Option<T> {
    match raw {
        None => None,
        Some(s) => match parse(s) {
            Parsed::Value(v) => Some(v),
            Parsed::Empty | Parsed::Failure => None,
        },
    }
}

/// Resolve an update-path field against the stored value:
/// key absent -> keep, submitted blank -> clear, unparsable -> keep,
/// parsed -> replace.
fn resolve_merge<T: Clone>(
    current: &Option<T>,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Parsed<T>,
) -> Option<T> {
    match raw {
        None => current.clone(),
        Some(s) => match parse(s) {
            Parsed::Value(v) => Some(v),
            Parsed::Empty => None,
            Parsed::Failure => current.clone(),
        },
    }
}

/// Create path: resolve every field of a new Application in one pass.
/// The boundary layer has already guaranteed company_name and role are
/// non-empty; they are assigned verbatim.
pub fn create(form: &ApplicationForm) -> ApplicationDraft {
    ApplicationDraft {
        company_name: form.company_name.clone(),
        role: form.role.clone(),
        application_date: resolve_new(form.application_date.as_deref(), fields::parse_date),
        status: resolve_new(form.status.as_deref(), fields::parse_text),
        contact_person: resolve_new(form.contact_person.as_deref(), fields::parse_text),
        phone: resolve_new(form.phone.as_deref(), fields::parse_text),
        url: resolve_new(form.url.as_deref(), fields::parse_url),
        cover_letter: form.cover_letter,
        interview_date: resolve_new(form.interview_date.as_deref(), fields::parse_date),
        offer: form.offer,
        salary: resolve_new(form.salary.as_deref(), fields::parse_decimal),
        equity: form.equity,
        bonus: resolve_new(form.bonus.as_deref(), fields::parse_percent),
        health_coverage: form.health_coverage,
        pto: resolve_new(form.pto.as_deref(), fields::parse_text),
        is_active: true,
    }
}

/// Update path: merge a submission into an existing Application.
///
/// Unlike create, a field that was submitted but failed to parse keeps its
/// stored value rather than degrading to null. Required text and the
/// checkboxes are always overwritten verbatim — a resubmitted form with an
/// unchecked box clears that flag, even on otherwise unrelated edits.
pub fn update(existing: &Application, form: &ApplicationForm) -> ApplicationDraft {
    ApplicationDraft {
        company_name: form.company_name.clone(),
        role: form.role.clone(),
        application_date: resolve_merge(
            &existing.application_date,
            form.application_date.as_deref(),
            fields::parse_date,
        ),
        status: resolve_merge(&existing.status, form.status.as_deref(), fields::parse_text),
        contact_person: resolve_merge(
            &existing.contact_person,
            form.contact_person.as_deref(),
            fields::parse_text,
        ),
        phone: resolve_merge(&existing.phone, form.phone.as_deref(), fields::parse_text),
        url: resolve_merge(&existing.url, form.url.as_deref(), fields::parse_url),
        cover_letter: form.cover_letter,
        interview_date: resolve_merge(
            &existing.interview_date,
            form.interview_date.as_deref(),
            fields::parse_date,
        ),
        offer: form.offer,
        salary: resolve_merge(&existing.salary, form.salary.as_deref(), fields::parse_decimal),
        equity: form.equity,
        bonus: resolve_merge(&existing.bonus, form.bonus.as_deref(), fields::parse_percent),
        health_coverage: form.health_coverage,
        pto: resolve_merge(&existing.pto, form.pto.as_deref(), fields::parse_text),
        is_active: existing.is_active,
    }
}

/// Prefix note content with its creation timestamp. The caller captures the
/// wall clock; note content is immutable once stamped.
pub fn stamp_note(content: &str, at: NaiveDateTime) -> String {
    format!("[{}] -- {}", at.format("%Y-%m-%d %H:%M:%S"), content)
}
