//! Error types for registrar-core.

use std::fmt;

use thiserror::Error;

/// The five entity collections, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    CourseType,
    Course,
    Offering,
    Student,
    Registration,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::CourseType => write!(f, "course type"),
            EntityKind::Course => write!(f, "course"),
            EntityKind::Offering => write!(f, "offering"),
            EntityKind::Student => write!(f, "student"),
            EntityKind::Registration => write!(f, "registration"),
        }
    }
}

/// All errors that can arise from store operations and persistence.
///
/// The first group are rejections: the store declined to mutate and its
/// state is unchanged. The second group come from the storage medium.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced id does not resolve.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A delete was blocked by records that still reference the target.
    #[error("cannot delete {kind} {id}: in use by {dependents} {dependent_kind}(s)")]
    ReferentialConflict {
        kind: EntityKind,
        id: String,
        dependents: usize,
        dependent_kind: EntityKind,
    },

    /// The (student, offering) pair is already registered.
    #[error("student {student} is already registered for offering {offering}")]
    DuplicateRegistration { student: String, offering: String },

    /// Another student already holds this registration number.
    #[error("registration number {0} is already in use")]
    DuplicateRegistrationNumber(String),

    /// Identity checks have not been completed for a new student.
    #[error("verification required: {}", unverified_detail(.email, .phone))]
    Unverified { email: bool, phone: bool },

    /// A user-supplied field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Stored collection could not be parsed on load.
    #[error("failed to parse stored {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.registrar/`.
    #[error("cannot determine home directory; set $HOME or REGISTRAR_HOME")]
    HomeNotFound,
}

impl StoreError {
    /// `true` for rejections that leave the store untouched by design,
    /// as opposed to storage failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. }
                | StoreError::ReferentialConflict { .. }
                | StoreError::DuplicateRegistration { .. }
                | StoreError::DuplicateRegistrationNumber(_)
                | StoreError::Unverified { .. }
                | StoreError::InvalidField { .. }
        )
    }
}

fn unverified_detail(email: &bool, phone: &bool) -> &'static str {
    match (*email, *phone) {
        (false, false) => "verify both email and phone before registering",
        (false, true) => "verify email before registering",
        (true, false) => "verify phone before registering",
        (true, true) => "verified",
    }
}
