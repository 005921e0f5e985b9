//! Persist-and-reopen roundtrip tests for the file-backed store.
//!
//! Each `#[case]` gets its own data directory — no shared state.

use assert_fs::TempDir;
use registrar_core::{NewStudent, RegistrationStore, Snapshot};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Populate = fn(&mut RegistrationStore<registrar_core::FileBackend>);

fn seeded_only(_: &mut RegistrationStore<registrar_core::FileBackend>) {}

fn full_workflow(store: &mut RegistrationStore<registrar_core::FileBackend>) {
    let evening = store.add_course_type("Evening").expect("course type");
    let maths = store.add_course("Maths").expect("course");
    let hindi = store.courses()[0].id;
    let individual = store.course_types()[0].id;

    let a = store.add_offering(hindi, individual).expect("offering a");
    let b = store.add_offering(maths.id, evening.id).expect("offering b");

    let asha = store
        .add_student(NewStudent {
            name: "Asha".into(),
            email: "a@x.com".into(),
            phone: "+1-555-0100".into(),
            registration_number: "STU000001".into(),
            email_verified: true,
            phone_verified: true,
        })
        .expect("student");
    store.register_student(asha.id, a.id).expect("register a");
    store.register_student(asha.id, b.id).expect("register b");
    store.update_course(maths.id, "Mathematics").expect("rename");
}

fn unicode_names(store: &mut RegistrationStore<registrar_core::FileBackend>) {
    let ct = store.add_course_type("समूह-группа-小组").expect("course type");
    let course = store
        .add_course("Course with émojis 🚀 & spéçïal chars: <>&\"'")
        .expect("course");
    let offering = store.add_offering(course.id, ct.id).expect("offering");
    let student = store
        .add_student(NewStudent {
            name: "日本語・한국어・العربية".into(),
            email: "u@x.com".into(),
            phone: "+91 98765 43210".into(),
            registration_number: "UNI2024001".into(),
            email_verified: true,
            phone_verified: false,
        })
        .expect("student");
    store.register_student(student.id, offering.id).expect("register");
}

fn empty_collections(store: &mut RegistrationStore<registrar_core::FileBackend>) {
    let ids: Vec<_> = store.course_types().iter().map(|ct| ct.id).collect();
    for id in ids {
        store.delete_course_type(id).expect("delete course type");
    }
    let ids: Vec<_> = store.courses().iter().map(|c| c.id).collect();
    for id in ids {
        store.delete_course(id).expect("delete course");
    }
}

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("seeded_only", seeded_only as Populate)]
#[case("full_workflow", full_workflow as Populate)]
#[case("unicode_strings", unicode_names as Populate)]
#[case("empty_collections", empty_collections as Populate)]
fn store_roundtrip(#[case] label: &str, #[case] populate: Populate) {
    let dir = TempDir::new().expect("tempdir");
    let mut store = RegistrationStore::open_dir(dir.path())
        .unwrap_or_else(|e| panic!("[{label}] open failed: {e}"));
    populate(&mut store);
    let before: Snapshot = store.snapshot();
    drop(store);

    let reopened = RegistrationStore::open_dir(dir.path())
        .unwrap_or_else(|e| panic!("[{label}] reopen failed: {e}"));
    let after = reopened.snapshot();

    assert_eq!(before.course_types, after.course_types, "[{label}] course types");
    assert_eq!(before.courses, after.courses, "[{label}] courses");
    assert_eq!(before.offerings, after.offerings, "[{label}] offerings");
    assert_eq!(before.students, after.students, "[{label}] students");
    assert_eq!(before.registrations, after.registrations, "[{label}] registrations");
}

// ---------------------------------------------------------------------------
// Snapshot serde
// ---------------------------------------------------------------------------

#[test]
fn snapshot_yaml_roundtrip_preserves_order() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = RegistrationStore::open_dir(dir.path()).expect("open");
    full_workflow(&mut store);
    let snapshot = store.snapshot();

    let yaml = serde_yaml::to_string(&snapshot).expect("serialize");
    let back: Snapshot = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(snapshot, back);
    let names: Vec<_> = back.courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Hindi", "English", "Urdu", "Mathematics"]);
}
