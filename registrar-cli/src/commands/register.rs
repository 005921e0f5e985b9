//! `registrar register --offering <ref> (--student <ref> | <new student fields>)`
//!
//! Either picks an existing student or creates one from the supplied
//! fields, then registers that student for the offering. A new student is
//! only created once the offering reference has resolved, so a typo in the
//! offering never leaves a stray student behind.

use anyhow::{anyhow, Context, Result};
use clap::Args;

use super::{offering_ref, student::StudentArgs, student_ref, Store};

/// Register a student for an offering.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Offering id or label ("Individual - Hindi").
    #[arg(long, short = 'o')]
    pub offering: String,

    /// Existing student: id, registration number, or exact name.
    #[arg(
        long,
        short = 's',
        conflicts_with_all = ["name", "email", "phone", "registration_number"]
    )]
    pub student: Option<String>,

    #[command(flatten)]
    pub new_student: StudentArgs,
}

impl RegisterArgs {
    pub fn run(self, store: &mut Store) -> Result<()> {
        let offering_id = offering_ref(store, &self.offering)?;
        if store.offering(offering_id).is_none() {
            return Err(anyhow!("offering not found: {}", self.offering));
        }

        let student_id = match self.student.as_deref() {
            Some(reference) => student_ref(store, reference)?,
            None if self.new_student.is_empty() => {
                return Err(anyhow!(
                    "pass --student <ref>, or --name/--email/--phone/--reg-no for a new student"
                ));
            }
            None => {
                let student = super::student::create(store, &self.new_student)?;
                println!(
                    "✓ Added student '{}' [{}]",
                    student.name, student.registration_number
                );
                student.id
            }
        };

        let registration = store
            .register_student(student_id, offering_id)
            .context("registration failed")?;
        println!(
            "✓ Registered '{}' for '{}' ({})",
            registration.student_name, registration.offering_name, registration.id
        );
        Ok(())
    }
}
