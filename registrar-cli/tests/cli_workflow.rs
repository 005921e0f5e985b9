use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn registrar_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("registrar"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env_remove("REGISTRAR_HOME")
        .env("RUST_LOG", "off");
    cmd
}

fn add_hindi_individual(data_dir: &Path) {
    registrar_cmd(data_dir)
        .args(["offering", "add", "--course", "Hindi", "--type", "Individual"])
        .assert()
        .success()
        .stdout(contains("Added offering 'Individual - Hindi'"));
}

fn register_asha(data_dir: &Path) -> assert_cmd::assert::Assert {
    registrar_cmd(data_dir)
        .args([
            "register",
            "--offering",
            "Individual - Hindi",
            "--name",
            "Asha",
            "--email",
            "a@x.com",
            "--phone",
            "+1-555-0100",
            "--reg-no",
            "stu000001",
            "--email-verified",
            "--phone-verified",
        ])
        .assert()
}

#[test]
fn first_run_lists_seeded_course_types_and_courses() {
    let data = TempDir::new().expect("data dir");

    registrar_cmd(data.path())
        .args(["course-type", "list"])
        .assert()
        .success()
        .stdout(contains("Individual").and(contains("Group")).and(contains("Special")));

    registrar_cmd(data.path())
        .args(["course", "list"])
        .assert()
        .success()
        .stdout(contains("Hindi").and(contains("English")).and(contains("Urdu")));
}

#[test]
fn register_new_student_creates_student_and_registration() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());

    register_asha(data.path())
        .success()
        .stdout(contains("Added student 'Asha' [STU000001]"))
        .stdout(contains("Registered 'Asha' for 'Individual - Hindi'"));

    registrar_cmd(data.path())
        .args(["registration", "list"])
        .assert()
        .success()
        .stdout(contains("Individual - Hindi"));
}

#[test]
fn register_without_verification_is_rejected_and_creates_nothing() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());

    registrar_cmd(data.path())
        .args([
            "register",
            "--offering",
            "Individual - Hindi",
            "--name",
            "Asha",
            "--email",
            "a@x.com",
            "--phone",
            "+1-555-0100",
            "--reg-no",
            "STU000001",
            "--email-verified",
        ])
        .assert()
        .failure()
        .stderr(contains("verify phone"));

    assert!(!data.path().join("students.yaml").exists());
    assert!(!data.path().join("registrations.yaml").exists());
}

#[test]
fn duplicate_registration_is_rejected() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    register_asha(data.path()).success();

    registrar_cmd(data.path())
        .args(["register", "--offering", "Individual - Hindi", "--student", "STU000001"])
        .assert()
        .failure()
        .stderr(contains("already registered"));

    let registrations =
        std::fs::read_to_string(data.path().join("registrations.yaml")).expect("read");
    let records: Vec<serde_yaml::Value> = serde_yaml::from_str(&registrations).expect("parse");
    assert_eq!(records.len(), 1);
}

#[test]
fn taken_registration_number_is_rejected() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    register_asha(data.path()).success();

    registrar_cmd(data.path())
        .args([
            "student",
            "add",
            "--name",
            "Ravi",
            "--email",
            "r@x.com",
            "--phone",
            "+1-555-0101",
            "--reg-no",
            "STU000001",
            "--email-verified",
            "--phone-verified",
        ])
        .assert()
        .failure()
        .stderr(contains("already in use"));
}

#[test]
fn deleting_course_type_in_use_fails_and_keeps_it() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    let before = std::fs::read(data.path().join("course_types.yaml")).expect("read");

    registrar_cmd(data.path())
        .args(["course-type", "delete", "Individual"])
        .assert()
        .failure()
        .stderr(contains("in use by 1 offering"));

    let after = std::fs::read(data.path().join("course_types.yaml")).expect("read");
    assert_eq!(before, after);
}

#[test]
fn deleting_offering_with_registrations_fails() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    register_asha(data.path()).success();

    registrar_cmd(data.path())
        .args(["offering", "delete", "Individual - Hindi"])
        .assert()
        .failure()
        .stderr(contains("in use by 1 registration"));
}

#[test]
fn course_rename_cascades_to_offerings_and_registrations() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    register_asha(data.path()).success();

    registrar_cmd(data.path())
        .args(["course", "rename", "Hindi", "Hindi Advanced"])
        .assert()
        .success();

    let output = registrar_cmd(data.path())
        .args(["offering", "list", "--json"])
        .output()
        .expect("run");
    let offerings: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(offerings[0]["course_name"], "Hindi Advanced");

    registrar_cmd(data.path())
        .args(["registration", "list"])
        .assert()
        .success()
        .stdout(contains("Individual - Hindi Advanced"));
}

#[test]
fn status_json_reports_counts() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());
    register_asha(data.path()).success();

    let output = registrar_cmd(data.path())
        .args(["status", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["course_types"], 3);
    assert_eq!(report["summary"]["courses"], 3);
    assert_eq!(report["summary"]["offerings"], 1);
    assert_eq!(report["summary"]["registrations"], 1);
    assert_eq!(report["offerings"][0]["offering"], "Individual - Hindi");
    assert_eq!(report["offerings"][0]["registrations"], 1);
}

#[test]
fn data_dir_can_come_from_environment() {
    let data = TempDir::new().expect("data dir");

    Command::new(assert_cmd::cargo::cargo_bin!("registrar"))
        .env("REGISTRAR_HOME", data.path())
        .env("RUST_LOG", "off")
        .args(["course", "add", "Sanskrit"])
        .assert()
        .success();

    let courses = std::fs::read_to_string(data.path().join("courses.yaml")).expect("read");
    assert!(courses.contains("name: Sanskrit"));
}

#[test]
fn storage_failure_is_logged_as_error() {
    let data = TempDir::new().expect("data dir");
    let not_a_dir = data.path().join("data");
    std::fs::write(&not_a_dir, "").expect("write file");

    registrar_cmd(&not_a_dir)
        .env("RUST_LOG", "error")
        .args(["course", "list"])
        .assert()
        .failure()
        .stderr(contains("storage failure"))
        .stderr(contains("failed to open store"));
}

#[test]
fn rejection_is_not_logged_as_storage_failure() {
    let data = TempDir::new().expect("data dir");
    add_hindi_individual(data.path());

    registrar_cmd(data.path())
        .env("RUST_LOG", "error")
        .args(["course", "delete", "Hindi"])
        .assert()
        .failure()
        .stderr(contains("in use by 1 offering"))
        .stderr(contains("storage failure").not());
}

#[test]
fn rejections_are_logged_at_warn() {
    let data = TempDir::new().expect("data dir");
    let unknown = "00000000-0000-4000-8000-000000000000";

    registrar_cmd(data.path())
        .env("RUST_LOG", "warn")
        .args(["course", "delete", unknown])
        .assert()
        .failure()
        .stderr(contains("no such record"));

    registrar_cmd(data.path())
        .env("RUST_LOG", "warn")
        .args(["course", "add", "   "])
        .assert()
        .failure()
        .stderr(contains("blank name"));
}
