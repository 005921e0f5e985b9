//! `registrar student list|add`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use registrar_core::{validation, NewStudent};

use super::{format_date, print_json, Store};

/// Manage students.
#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    /// List students in creation order.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a student without registering them for anything.
    Add(StudentArgs),
}

/// Identity fields for a new student.
#[derive(Args, Debug, Clone, Default)]
pub struct StudentArgs {
    /// Full name.
    #[arg(long)]
    pub name: Option<String>,

    /// Email address.
    #[arg(long)]
    pub email: Option<String>,

    /// Phone number (at least ten digits; spaces and dashes allowed).
    #[arg(long)]
    pub phone: Option<String>,

    /// Registration number, e.g. STU2024001. Upper-cased before use.
    #[arg(long = "reg-no", value_name = "REG_NO")]
    pub registration_number: Option<String>,

    /// Confirm the email address has been verified.
    #[arg(long)]
    pub email_verified: bool,

    /// Confirm the phone number has been verified.
    #[arg(long)]
    pub phone_verified: bool,
}

impl StudentArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.registration_number.is_none()
    }

    /// Build the store input, normalizing the registration number.
    pub fn to_new_student(&self) -> NewStudent {
        NewStudent {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            registration_number: validation::normalize_registration_number(
                self.registration_number.as_deref().unwrap_or_default(),
            ),
            email_verified: self.email_verified,
            phone_verified: self.phone_verified,
        }
    }
}

/// Run the intake checks, then create the student.
pub fn create(store: &mut Store, args: &StudentArgs) -> Result<registrar_core::Student> {
    let new = args.to_new_student();
    validation::check_new_student(&new, store.students())
        .context("student details were rejected")?;
    store.add_student(new).context("failed to add student")
}

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "reg no")]
    registration_number: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "phone")]
    phone: String,
    #[tabled(rename = "registrations")]
    registrations: usize,
    #[tabled(rename = "created")]
    created: String,
}

pub fn run(store: &mut Store, cmd: StudentCommand) -> Result<()> {
    match cmd {
        StudentCommand::List { json } => list(store, json),
        StudentCommand::Add(args) => {
            let student = create(store, &args)?;
            println!(
                "✓ Added student '{}' [{}] ({})",
                student.name, student.registration_number, student.id
            );
            Ok(())
        }
    }
}

fn list(store: &Store, json: bool) -> Result<()> {
    if json {
        return print_json(store.students());
    }
    if store.students().is_empty() {
        println!("No students.");
        return Ok(());
    }

    let rows: Vec<StudentRow> = store
        .students()
        .iter()
        .map(|s| StudentRow {
            registration_number: s.registration_number.clone(),
            name: s.name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            registrations: store.registrations_for_student(s.id).count(),
            created: format_date(s.created_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
