//! Registrar core library — domain types, the registration store, persistence, errors.
//!
//! Public API surface:
//! - [`types`] — id newtypes and entity structs
//! - [`error`] — [`StoreError`]
//! - [`backend`] — key/blob persistence ([`FileBackend`], [`MemoryBackend`])
//! - [`paths`] — data directory resolution
//! - [`store`] — [`RegistrationStore`] and its operations
//! - [`validation`] — intake checks run before a student is created

pub mod backend;
pub mod error;
pub mod paths;
pub mod store;
pub mod types;
pub mod validation;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::{EntityKind, StoreError};
pub use store::{RegistrationStore, Snapshot};
pub use types::{
    Course, CourseId, CourseOffering, CourseType, CourseTypeId, NewStudent, OfferingId,
    Registration, RegistrationId, Student, StudentId,
};
