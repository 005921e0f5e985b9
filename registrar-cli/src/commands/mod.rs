//! Subcommand implementations plus the helpers they share:
//! opening the store and turning user references into ids.

pub mod course;
pub mod course_type;
pub mod offering;
pub mod register;
pub mod registration;
pub mod status;
pub mod student;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use registrar_core::{
    paths, validation, Backend, CourseId, CourseTypeId, FileBackend, OfferingId,
    RegistrationStore, StudentId,
};

pub type Store = RegistrationStore<FileBackend>;

pub fn open_store(explicit: Option<PathBuf>) -> Result<Store> {
    let dir = paths::resolve_data_dir(explicit).context("failed to locate data directory")?;
    tracing::debug!(dir = %dir.display(), "opening store");
    RegistrationStore::open_dir(&dir)
        .with_context(|| format!("failed to open store at '{}'", dir.display()))
}

// ---------------------------------------------------------------------------
// Reference resolution: an id, or an exact name
// ---------------------------------------------------------------------------

pub fn course_type_ref<B: Backend>(
    store: &RegistrationStore<B>,
    reference: &str,
) -> Result<CourseTypeId> {
    if let Ok(id) = reference.parse::<CourseTypeId>() {
        return Ok(id);
    }
    unique_match(
        "course type",
        reference,
        store
            .course_types()
            .iter()
            .filter(|ct| ct.name == reference)
            .map(|ct| ct.id),
    )
}

pub fn course_ref<B: Backend>(store: &RegistrationStore<B>, reference: &str) -> Result<CourseId> {
    if let Ok(id) = reference.parse::<CourseId>() {
        return Ok(id);
    }
    unique_match(
        "course",
        reference,
        store
            .courses()
            .iter()
            .filter(|c| c.name == reference)
            .map(|c| c.id),
    )
}

/// An offering id or its label, e.g. `"Individual - Hindi"`.
pub fn offering_ref<B: Backend>(
    store: &RegistrationStore<B>,
    reference: &str,
) -> Result<OfferingId> {
    if let Ok(id) = reference.parse::<OfferingId>() {
        return Ok(id);
    }
    unique_match(
        "offering",
        reference,
        store
            .offerings()
            .iter()
            .filter(|o| o.label() == reference)
            .map(|o| o.id),
    )
}

/// A student id, registration number, or exact name.
pub fn student_ref<B: Backend>(store: &RegistrationStore<B>, reference: &str) -> Result<StudentId> {
    if let Ok(id) = reference.parse::<StudentId>() {
        return Ok(id);
    }
    let reg_number = validation::normalize_registration_number(reference);
    if let Some(student) = store.student_by_registration_number(&reg_number) {
        return Ok(student.id);
    }
    unique_match(
        "student",
        reference,
        store
            .students()
            .iter()
            .filter(|s| s.name == reference)
            .map(|s| s.id),
    )
}

fn unique_match<I>(kind: &str, reference: &str, mut matches: impl Iterator<Item = I>) -> Result<I> {
    let first = matches
        .next()
        .ok_or_else(|| anyhow!("no {kind} matches '{reference}'"))?;
    let extra = matches.count();
    if extra > 0 {
        return Err(anyhow!(
            "'{reference}' matches {} {kind}s; use the id instead",
            extra + 1
        ));
    }
    Ok(first)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}
