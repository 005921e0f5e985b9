//! The registration store: sole owner of the five entity collections.
//!
//! # Storage layout
//!
//! Each collection is persisted under its own key (see [`keys`]) as a YAML
//! sequence in insertion order. A key that has never been written falls
//! back to its seed; seeded collections are written back on open so their
//! ids stay stable across runs.
//!
//! # Mutation pattern
//!
//! Every mutating operation:
//! 1. validates references and invariants against the current state;
//! 2. builds the new version of each affected collection;
//! 3. persists each affected collection in full;
//! 4. only then swaps the new collections in.
//!
//! Any `Err` therefore leaves the in-memory state untouched. There is no
//! atomicity across collections on disk: a failure between two writes of a
//! cascading rename leaves the earlier write in place. [`RegistrationStore::open`]
//! rebuilds the copied names on offerings and registrations from the records
//! they reference, so such a half-written cascade is repaired on next open.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::backend::{Backend, FileBackend};
use crate::error::{EntityKind, StoreError};
use crate::types::{
    offering_label, Course, CourseId, CourseOffering, CourseType, CourseTypeId, NewStudent,
    OfferingId, Registration, RegistrationId, Student, StudentId,
};

/// Storage keys, one per collection.
pub mod keys {
    pub const COURSE_TYPES: &str = "course_types";
    pub const COURSES: &str = "courses";
    pub const OFFERINGS: &str = "offerings";
    pub const STUDENTS: &str = "students";
    pub const REGISTRATIONS: &str = "registrations";

    pub const ALL: [&str; 5] = [COURSE_TYPES, COURSES, OFFERINGS, STUDENTS, REGISTRATIONS];
}

/// Course types present on first run.
pub const SEED_COURSE_TYPES: [&str; 3] = ["Individual", "Group", "Special"];
/// Courses present on first run.
pub const SEED_COURSES: [&str; 3] = ["Hindi", "English", "Urdu"];

/// Owned copy of every collection, for rendering and JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub course_types: Vec<CourseType>,
    pub courses: Vec<Course>,
    pub offerings: Vec<CourseOffering>,
    pub students: Vec<Student>,
    pub registrations: Vec<Registration>,
}

/// Explicitly constructed store; pass it by reference to whatever needs it.
#[derive(Debug)]
pub struct RegistrationStore<B: Backend> {
    backend: B,
    course_types: Vec<CourseType>,
    courses: Vec<Course>,
    offerings: Vec<CourseOffering>,
    students: Vec<Student>,
    registrations: Vec<Registration>,
}

impl RegistrationStore<FileBackend> {
    /// Open the store persisted under `dir`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open(FileBackend::new(dir))
    }
}

impl<B: Backend> RegistrationStore<B> {
    // -----------------------------------------------------------------------
    // 1. Open
    // -----------------------------------------------------------------------

    /// Load every collection from `backend`, seeding the ones never saved.
    ///
    /// Returns `StoreError::Parse` if any stored collection is malformed;
    /// bad data is never silently replaced by the seed. Stale copied names
    /// are rewritten and persisted before the store is returned.
    pub fn open(mut backend: B) -> Result<Self, StoreError> {
        let now = Utc::now();

        let course_types = match load_collection(&backend, keys::COURSE_TYPES)? {
            Some(items) => items,
            None => {
                let seeded = seed_course_types(now);
                save_collection(&mut backend, keys::COURSE_TYPES, &seeded)?;
                tracing::info!(count = seeded.len(), "seeded default course types");
                seeded
            }
        };
        let courses = match load_collection(&backend, keys::COURSES)? {
            Some(items) => items,
            None => {
                let seeded = seed_courses(now);
                save_collection(&mut backend, keys::COURSES, &seeded)?;
                tracing::info!(count = seeded.len(), "seeded default courses");
                seeded
            }
        };
        let mut offerings: Vec<CourseOffering> =
            load_collection(&backend, keys::OFFERINGS)?.unwrap_or_default();
        let students = load_collection(&backend, keys::STUDENTS)?.unwrap_or_default();
        let mut registrations: Vec<Registration> =
            load_collection(&backend, keys::REGISTRATIONS)?.unwrap_or_default();

        let stale = sync_offering_names(&course_types, &courses, &mut offerings);
        if stale > 0 {
            save_collection(&mut backend, keys::OFFERINGS, &offerings)?;
            tracing::warn!(count = stale, "repaired stale offering names");
        }
        let all: Vec<OfferingId> = offerings.iter().map(|o| o.id).collect();
        let relabeled = relabel_registrations(&mut registrations, &offerings, &all);
        if relabeled > 0 {
            save_collection(&mut backend, keys::REGISTRATIONS, &registrations)?;
            tracing::warn!(count = relabeled, "repaired stale registration labels");
        }

        Ok(Self {
            backend,
            course_types,
            courses,
            offerings,
            students,
            registrations,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    // -----------------------------------------------------------------------
    // 2. Read access
    // -----------------------------------------------------------------------

    pub fn course_types(&self) -> &[CourseType] {
        &self.course_types
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn offerings(&self) -> &[CourseOffering] {
        &self.offerings
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn course_type(&self, id: CourseTypeId) -> Option<&CourseType> {
        self.course_types.iter().find(|ct| ct.id == id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn offering(&self, id: OfferingId) -> Option<&CourseOffering> {
        self.offerings.iter().find(|o| o.id == id)
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn registration(&self, id: RegistrationId) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.id == id)
    }

    pub fn student_by_registration_number(&self, reg_number: &str) -> Option<&Student> {
        self.students
            .iter()
            .find(|s| s.registration_number == reg_number)
    }

    pub fn registrations_for_offering(
        &self,
        id: OfferingId,
    ) -> impl Iterator<Item = &Registration> + '_ {
        self.registrations
            .iter()
            .filter(move |r| r.course_offering_id == id)
    }

    pub fn registrations_for_student(
        &self,
        id: StudentId,
    ) -> impl Iterator<Item = &Registration> + '_ {
        self.registrations.iter().filter(move |r| r.student_id == id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            course_types: self.course_types.clone(),
            courses: self.courses.clone(),
            offerings: self.offerings.clone(),
            students: self.students.clone(),
            registrations: self.registrations.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // 3. Course types
    // -----------------------------------------------------------------------

    pub fn add_course_type(&mut self, name: &str) -> Result<CourseType, StoreError> {
        let course_type = CourseType {
            id: CourseTypeId::new(),
            name: required_name(name)?,
            created_at: Utc::now(),
        };

        let mut course_types = self.course_types.clone();
        course_types.push(course_type.clone());
        save_collection(&mut self.backend, keys::COURSE_TYPES, &course_types)?;
        self.course_types = course_types;

        tracing::info!(id = %course_type.id, name = %course_type.name, "course type added");
        Ok(course_type)
    }

    /// Rename a course type; its offerings and their registrations pick up
    /// the new name.
    pub fn update_course_type(
        &mut self,
        id: CourseTypeId,
        name: &str,
    ) -> Result<CourseType, StoreError> {
        let name = required_name(name)?;
        let idx = self
            .course_types
            .iter()
            .position(|ct| ct.id == id)
            .ok_or_else(|| not_found(EntityKind::CourseType, id))?;

        let mut course_types = self.course_types.clone();
        course_types[idx].name = name.clone();

        let mut offerings = self.offerings.clone();
        let touched: Vec<OfferingId> = offerings
            .iter_mut()
            .filter(|o| o.course_type_id == id)
            .map(|o| {
                o.course_type_name = name.clone();
                o.id
            })
            .collect();
        let mut registrations = self.registrations.clone();
        let relabeled = relabel_registrations(&mut registrations, &offerings, &touched);

        save_collection(&mut self.backend, keys::COURSE_TYPES, &course_types)?;
        if !touched.is_empty() {
            save_collection(&mut self.backend, keys::OFFERINGS, &offerings)?;
        }
        if relabeled > 0 {
            save_collection(&mut self.backend, keys::REGISTRATIONS, &registrations)?;
        }

        let updated = course_types[idx].clone();
        self.course_types = course_types;
        self.offerings = offerings;
        self.registrations = registrations;

        tracing::info!(
            %id,
            name = %updated.name,
            offerings = touched.len(),
            registrations = relabeled,
            "course type renamed"
        );
        Ok(updated)
    }

    pub fn delete_course_type(&mut self, id: CourseTypeId) -> Result<CourseType, StoreError> {
        let idx = self
            .course_types
            .iter()
            .position(|ct| ct.id == id)
            .ok_or_else(|| not_found(EntityKind::CourseType, id))?;

        let dependents = self
            .offerings
            .iter()
            .filter(|o| o.course_type_id == id)
            .count();
        if dependents > 0 {
            tracing::warn!(%id, dependents, "course type delete rejected: in use");
            return Err(conflict(EntityKind::CourseType, id, dependents, EntityKind::Offering));
        }

        let mut course_types = self.course_types.clone();
        let removed = course_types.remove(idx);
        save_collection(&mut self.backend, keys::COURSE_TYPES, &course_types)?;
        self.course_types = course_types;

        tracing::info!(%id, name = %removed.name, "course type deleted");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // 4. Courses
    // -----------------------------------------------------------------------

    pub fn add_course(&mut self, name: &str) -> Result<Course, StoreError> {
        let course = Course {
            id: CourseId::new(),
            name: required_name(name)?,
            created_at: Utc::now(),
        };

        let mut courses = self.courses.clone();
        courses.push(course.clone());
        save_collection(&mut self.backend, keys::COURSES, &courses)?;
        self.courses = courses;

        tracing::info!(id = %course.id, name = %course.name, "course added");
        Ok(course)
    }

    /// Rename a course; `course_name` on every offering of it is rewritten,
    /// then the labels of registrations against those offerings.
    pub fn update_course(&mut self, id: CourseId, name: &str) -> Result<Course, StoreError> {
        let name = required_name(name)?;
        let idx = self
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(EntityKind::Course, id))?;

        let mut courses = self.courses.clone();
        courses[idx].name = name.clone();

        let mut offerings = self.offerings.clone();
        let touched: Vec<OfferingId> = offerings
            .iter_mut()
            .filter(|o| o.course_id == id)
            .map(|o| {
                o.course_name = name.clone();
                o.id
            })
            .collect();
        let mut registrations = self.registrations.clone();
        let relabeled = relabel_registrations(&mut registrations, &offerings, &touched);

        save_collection(&mut self.backend, keys::COURSES, &courses)?;
        if !touched.is_empty() {
            save_collection(&mut self.backend, keys::OFFERINGS, &offerings)?;
        }
        if relabeled > 0 {
            save_collection(&mut self.backend, keys::REGISTRATIONS, &registrations)?;
        }

        let updated = courses[idx].clone();
        self.courses = courses;
        self.offerings = offerings;
        self.registrations = registrations;

        tracing::info!(
            %id,
            name = %updated.name,
            offerings = touched.len(),
            registrations = relabeled,
            "course renamed"
        );
        Ok(updated)
    }

    pub fn delete_course(&mut self, id: CourseId) -> Result<Course, StoreError> {
        let idx = self
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(EntityKind::Course, id))?;

        let dependents = self.offerings.iter().filter(|o| o.course_id == id).count();
        if dependents > 0 {
            tracing::warn!(%id, dependents, "course delete rejected: in use");
            return Err(conflict(EntityKind::Course, id, dependents, EntityKind::Offering));
        }

        let mut courses = self.courses.clone();
        let removed = courses.remove(idx);
        save_collection(&mut self.backend, keys::COURSES, &courses)?;
        self.courses = courses;

        tracing::info!(%id, name = %removed.name, "course deleted");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // 5. Offerings
    // -----------------------------------------------------------------------

    /// Offer `course_id` under `course_type_id`, snapshotting both names.
    pub fn add_offering(
        &mut self,
        course_id: CourseId,
        course_type_id: CourseTypeId,
    ) -> Result<CourseOffering, StoreError> {
        let (course_name, course_type_name) = self.resolve_names(course_id, course_type_id)?;
        let offering = CourseOffering {
            id: OfferingId::new(),
            course_id,
            course_type_id,
            course_name,
            course_type_name,
            created_at: Utc::now(),
        };

        let mut offerings = self.offerings.clone();
        offerings.push(offering.clone());
        save_collection(&mut self.backend, keys::OFFERINGS, &offerings)?;
        self.offerings = offerings;

        tracing::info!(id = %offering.id, label = %offering.label(), "offering added");
        Ok(offering)
    }

    /// Point an offering at a new course and course type.
    pub fn update_offering(
        &mut self,
        id: OfferingId,
        course_id: CourseId,
        course_type_id: CourseTypeId,
    ) -> Result<CourseOffering, StoreError> {
        let idx = self
            .offerings
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| not_found(EntityKind::Offering, id))?;
        let (course_name, course_type_name) = self.resolve_names(course_id, course_type_id)?;

        let mut offerings = self.offerings.clone();
        {
            let offering = &mut offerings[idx];
            offering.course_id = course_id;
            offering.course_type_id = course_type_id;
            offering.course_name = course_name;
            offering.course_type_name = course_type_name;
        }
        let mut registrations = self.registrations.clone();
        let relabeled = relabel_registrations(&mut registrations, &offerings, &[id]);

        save_collection(&mut self.backend, keys::OFFERINGS, &offerings)?;
        if relabeled > 0 {
            save_collection(&mut self.backend, keys::REGISTRATIONS, &registrations)?;
        }

        let updated = offerings[idx].clone();
        self.offerings = offerings;
        self.registrations = registrations;

        tracing::info!(%id, label = %updated.label(), registrations = relabeled, "offering updated");
        Ok(updated)
    }

    pub fn delete_offering(&mut self, id: OfferingId) -> Result<CourseOffering, StoreError> {
        let idx = self
            .offerings
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| not_found(EntityKind::Offering, id))?;

        let dependents = self.registrations_for_offering(id).count();
        if dependents > 0 {
            tracing::warn!(%id, dependents, "offering delete rejected: has registrations");
            return Err(conflict(
                EntityKind::Offering,
                id,
                dependents,
                EntityKind::Registration,
            ));
        }

        let mut offerings = self.offerings.clone();
        let removed = offerings.remove(idx);
        save_collection(&mut self.backend, keys::OFFERINGS, &offerings)?;
        self.offerings = offerings;

        tracing::info!(%id, label = %removed.label(), "offering deleted");
        Ok(removed)
    }

    fn resolve_names(
        &self,
        course_id: CourseId,
        course_type_id: CourseTypeId,
    ) -> Result<(String, String), StoreError> {
        let course = self
            .course(course_id)
            .ok_or_else(|| not_found(EntityKind::Course, course_id))?;
        let course_type = self
            .course_type(course_type_id)
            .ok_or_else(|| not_found(EntityKind::CourseType, course_type_id))?;
        Ok((course.name.clone(), course_type.name.clone()))
    }

    // -----------------------------------------------------------------------
    // 6. Students and registrations
    // -----------------------------------------------------------------------

    /// Create a student.
    ///
    /// Registration numbers are unique across all students; a clash is
    /// `StoreError::DuplicateRegistrationNumber`. Contact formats and
    /// verification are the caller's concern (see [`crate::validation`]).
    pub fn add_student(&mut self, new: NewStudent) -> Result<Student, StoreError> {
        let name = required_name(&new.name)?;
        let registration_number = new.registration_number.trim().to_owned();
        if registration_number.is_empty() {
            tracing::warn!("student rejected: blank registration number");
            return Err(StoreError::InvalidField {
                field: "registration number",
                reason: "must not be empty".into(),
            });
        }
        if self
            .student_by_registration_number(&registration_number)
            .is_some()
        {
            tracing::warn!(%registration_number, "student rejected: registration number taken");
            return Err(StoreError::DuplicateRegistrationNumber(registration_number));
        }

        let student = Student {
            id: StudentId::new(),
            name,
            email: new.email.trim().to_owned(),
            phone: new.phone.trim().to_owned(),
            registration_number,
            email_verified: new.email_verified,
            phone_verified: new.phone_verified,
            created_at: Utc::now(),
        };

        let mut students = self.students.clone();
        students.push(student.clone());
        save_collection(&mut self.backend, keys::STUDENTS, &students)?;
        self.students = students;

        tracing::info!(id = %student.id, reg = %student.registration_number, "student added");
        Ok(student)
    }

    /// Register a student for an offering. Each (student, offering) pair
    /// may be registered once.
    pub fn register_student(
        &mut self,
        student_id: StudentId,
        offering_id: OfferingId,
    ) -> Result<Registration, StoreError> {
        let student = self
            .student(student_id)
            .ok_or_else(|| not_found(EntityKind::Student, student_id))?;
        let offering = self
            .offering(offering_id)
            .ok_or_else(|| not_found(EntityKind::Offering, offering_id))?;

        if self
            .registrations
            .iter()
            .any(|r| r.student_id == student_id && r.course_offering_id == offering_id)
        {
            tracing::warn!(%student_id, %offering_id, "registration rejected: already registered");
            return Err(StoreError::DuplicateRegistration {
                student: student.name.clone(),
                offering: offering.label(),
            });
        }

        let registration = Registration {
            id: RegistrationId::new(),
            student_id,
            course_offering_id: offering_id,
            student_name: student.name.clone(),
            offering_name: offering.label(),
            created_at: Utc::now(),
        };

        let mut registrations = self.registrations.clone();
        registrations.push(registration.clone());
        save_collection(&mut self.backend, keys::REGISTRATIONS, &registrations)?;
        self.registrations = registrations;

        tracing::info!(
            id = %registration.id,
            student = %registration.student_name,
            offering = %registration.offering_name,
            "student registered"
        );
        Ok(registration)
    }

    pub fn delete_registration(&mut self, id: RegistrationId) -> Result<Registration, StoreError> {
        let idx = self
            .registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(EntityKind::Registration, id))?;

        let mut registrations = self.registrations.clone();
        let removed = registrations.remove(idx);
        save_collection(&mut self.backend, keys::REGISTRATIONS, &registrations)?;
        self.registrations = registrations;

        tracing::info!(%id, "registration deleted");
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn load_collection<B: Backend, T: DeserializeOwned>(
    backend: &B,
    key: &str,
) -> Result<Option<Vec<T>>, StoreError> {
    let Some(contents) = backend.load(key)? else {
        return Ok(None);
    };
    if contents.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            key: key.to_owned(),
            source,
        })
}

fn save_collection<B: Backend, T: Serialize>(
    backend: &mut B,
    key: &str,
    items: &[T],
) -> Result<(), StoreError> {
    let yaml = serde_yaml::to_string(items)?;
    backend.save(key, &yaml)
}

fn seed_course_types(now: DateTime<Utc>) -> Vec<CourseType> {
    SEED_COURSE_TYPES
        .iter()
        .map(|name| CourseType {
            id: CourseTypeId::new(),
            name: (*name).to_owned(),
            created_at: now,
        })
        .collect()
}

fn seed_courses(now: DateTime<Utc>) -> Vec<Course> {
    SEED_COURSES
        .iter()
        .map(|name| Course {
            id: CourseId::new(),
            name: (*name).to_owned(),
            created_at: now,
        })
        .collect()
}

/// Copy current course and course type names onto `offerings`.
/// Offerings whose references no longer resolve are left as stored.
/// Returns how many offerings changed.
fn sync_offering_names(
    course_types: &[CourseType],
    courses: &[Course],
    offerings: &mut [CourseOffering],
) -> usize {
    let mut changed = 0;
    for offering in offerings.iter_mut() {
        let mut stale = false;
        if let Some(course) = courses.iter().find(|c| c.id == offering.course_id) {
            if offering.course_name != course.name {
                offering.course_name = course.name.clone();
                stale = true;
            }
        }
        if let Some(course_type) = course_types
            .iter()
            .find(|ct| ct.id == offering.course_type_id)
        {
            if offering.course_type_name != course_type.name {
                offering.course_type_name = course_type.name.clone();
                stale = true;
            }
        }
        if stale {
            changed += 1;
        }
    }
    changed
}

/// Rewrite `offering_name` on registrations against any of `touched`.
/// Returns how many registrations changed.
fn relabel_registrations(
    registrations: &mut [Registration],
    offerings: &[CourseOffering],
    touched: &[OfferingId],
) -> usize {
    let mut changed = 0;
    for registration in registrations
        .iter_mut()
        .filter(|r| touched.contains(&r.course_offering_id))
    {
        let Some(offering) = offerings
            .iter()
            .find(|o| o.id == registration.course_offering_id)
        else {
            continue;
        };
        let label = offering_label(&offering.course_type_name, &offering.course_name);
        if registration.offering_name != label {
            registration.offering_name = label;
            changed += 1;
        }
    }
    changed
}

fn required_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        tracing::warn!("rejected: blank name");
        return Err(StoreError::InvalidField {
            field: "name",
            reason: "must not be empty".into(),
        });
    }
    Ok(name.to_owned())
}

fn not_found(kind: EntityKind, id: impl ToString) -> StoreError {
    let id = id.to_string();
    tracing::warn!(%kind, %id, "rejected: no such record");
    StoreError::NotFound { kind, id }
}

fn conflict(
    kind: EntityKind,
    id: impl ToString,
    dependents: usize,
    dependent_kind: EntityKind,
) -> StoreError {
    StoreError::ReferentialConflict {
        kind,
        id: id.to_string(),
        dependents,
        dependent_kind,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
