//! `registrar status` — collection counts and enrolment per offering.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{print_json, Store};

/// Arguments for `registrar status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, store: &Store) -> Result<()> {
        let report = build_report(store);
        if self.json {
            return print_json(&report);
        }
        print_table(&report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    summary: StatusSummary,
    offerings: Vec<OfferingStatus>,
}

#[derive(Debug, Serialize)]
struct StatusSummary {
    course_types: usize,
    courses: usize,
    offerings: usize,
    students: usize,
    registrations: usize,
    unverified_students: usize,
}

#[derive(Debug, Serialize)]
struct OfferingStatus {
    id: String,
    offering: String,
    registrations: usize,
}

#[derive(Tabled)]
struct OfferingTableRow {
    #[tabled(rename = "offering")]
    offering: String,
    #[tabled(rename = "registrations")]
    registrations: usize,
}

fn build_report(store: &Store) -> StatusReport {
    let offerings = store
        .offerings()
        .iter()
        .map(|o| OfferingStatus {
            id: o.id.to_string(),
            offering: o.label(),
            registrations: store.registrations_for_offering(o.id).count(),
        })
        .collect();

    StatusReport {
        summary: StatusSummary {
            course_types: store.course_types().len(),
            courses: store.courses().len(),
            offerings: store.offerings().len(),
            students: store.students().len(),
            registrations: store.registrations().len(),
            unverified_students: store
                .students()
                .iter()
                .filter(|s| !s.email_verified || !s.phone_verified)
                .count(),
        },
        offerings,
    }
}

fn print_table(report: &StatusReport) {
    let s = &report.summary;
    println!(
        "Registrar v{} | {} course types | {} courses | {} offerings | {} students | {} registrations",
        env!("CARGO_PKG_VERSION"),
        s.course_types,
        s.courses,
        s.offerings,
        s.students,
        s.registrations,
    );

    if s.unverified_students > 0 {
        println!(
            "{} {} student(s) with unverified contact details",
            "■".yellow().bold(),
            s.unverified_students
        );
    }

    if report.offerings.is_empty() {
        println!("No offerings yet.");
        println!("Run: registrar offering add --course <course> --type <type>");
        return;
    }

    let separator = "■".repeat(40).bright_black().to_string();
    println!("{separator}");
    println!("{}", "OFFERINGS".bold());
    let rows: Vec<OfferingTableRow> = report
        .offerings
        .iter()
        .map(|o| OfferingTableRow {
            offering: o.offering.clone(),
            registrations: o.registrations,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{separator}");
}
