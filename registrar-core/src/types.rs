//! Domain types for the registration store.
//!
//! Every entity carries a random v4 id wrapped in its own newtype, so an
//! offering id can never be passed where a course id is expected.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Id newtypes
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`CourseType`].
    CourseTypeId
);
entity_id!(
    /// Identifier of a [`Course`].
    CourseId
);
entity_id!(
    /// Identifier of a [`CourseOffering`].
    OfferingId
);
entity_id!(
    /// Identifier of a [`Student`].
    StudentId
);
entity_id!(
    /// Identifier of a [`Registration`].
    RegistrationId
);

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Category label applied to an offering (e.g. Individual, Group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseType {
    pub id: CourseTypeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A subject that can be offered (e.g. Hindi).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A course taught under a given course type.
///
/// `course_name` and `course_type_name` are display snapshots of the
/// referenced entities; the store rewrites them whenever either is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub id: OfferingId,
    pub course_id: CourseId,
    pub course_type_id: CourseTypeId,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub course_type_name: String,
    pub created_at: DateTime<Utc>,
}

impl CourseOffering {
    /// Display label, `"{course_type_name} - {course_name}"`.
    pub fn label(&self) -> String {
        offering_label(&self.course_type_name, &self.course_name)
    }
}

pub(crate) fn offering_label(course_type_name: &str, course_name: &str) -> String {
    format!("{course_type_name} - {course_name}")
}

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registration_number: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Binding of one student to one offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub student_id: StudentId,
    pub course_offering_id: OfferingId,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub offering_name: String,
    pub created_at: DateTime<Utc>,
}

/// Field values for a student that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registration_number: String,
    pub email_verified: bool,
    pub phone_verified: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_fresh() {
        assert_ne!(CourseId::new(), CourseId::new());
    }

    #[test]
    fn id_display_parses_back() {
        let id = StudentId::new();
        let parsed: StudentId = id.to_string().parse().expect("parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!("not-a-uuid".parse::<OfferingId>().is_err());
    }

    #[test]
    fn offering_label_is_type_then_course() {
        let offering = CourseOffering {
            id: OfferingId::new(),
            course_id: CourseId::new(),
            course_type_id: CourseTypeId::new(),
            course_name: "Hindi".into(),
            course_type_name: "Individual".into(),
            created_at: Utc::now(),
        };
        assert_eq!(offering.label(), "Individual - Hindi");
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let id = CourseTypeId::new();
        let yaml = serde_yaml::to_string(&id).expect("serialize");
        assert_eq!(yaml.trim(), id.to_string());
    }
}
