//! Intake checks for new students.
//!
//! These run in the caller before
//! [`RegistrationStore::add_student`](crate::store::RegistrationStore::add_student)
//! so the user gets feedback on format problems and missing verification.
//! The store itself only re-checks what it must own: non-empty names and
//! registration number uniqueness.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StoreError;
use crate::types::{NewStudent, Student};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").expect("valid phone regex"));
static REG_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6,}$").expect("valid registration number regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Optional leading `+`, then at least ten digits, spaces or dashes.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Six or more upper-case letters and digits. Callers upper-case user input first.
pub fn is_valid_registration_number(reg_number: &str) -> bool {
    REG_NUMBER_RE.is_match(reg_number)
}

/// Normalize a registration number the way the intake form does.
pub fn normalize_registration_number(reg_number: &str) -> String {
    reg_number.trim().to_uppercase()
}

/// Pre-flight check for a student about to be created.
///
/// Order matters for the message the user sees: verification first, then
/// registration number format, then uniqueness against `existing`.
pub fn check_new_student(student: &NewStudent, existing: &[Student]) -> Result<(), StoreError> {
    if !student.email_verified || !student.phone_verified {
        return Err(StoreError::Unverified {
            email: student.email_verified,
            phone: student.phone_verified,
        });
    }

    if student.name.trim().is_empty() {
        return Err(StoreError::InvalidField {
            field: "name",
            reason: "must not be empty".into(),
        });
    }

    if !is_valid_email(&student.email) {
        return Err(StoreError::InvalidField {
            field: "email",
            reason: format!("'{}' is not a valid email address", student.email),
        });
    }

    if !is_valid_phone(&student.phone) {
        return Err(StoreError::InvalidField {
            field: "phone",
            reason: format!("'{}' is not a valid phone number", student.phone),
        });
    }

    if !is_valid_registration_number(&student.registration_number) {
        return Err(StoreError::InvalidField {
            field: "registration number",
            reason: "must be at least 6 characters of uppercase letters and digits".into(),
        });
    }

    if existing
        .iter()
        .any(|s| s.registration_number == student.registration_number)
    {
        return Err(StoreError::DuplicateRegistrationNumber(
            student.registration_number.clone(),
        ));
    }

    Ok(())
}
