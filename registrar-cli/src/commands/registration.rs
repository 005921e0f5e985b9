//! `registrar registration list|delete`

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::{settings::Style, Table, Tabled};

use registrar_core::RegistrationId;

use super::{format_date, offering_ref, print_json, Store};

/// Manage registrations.
#[derive(Subcommand, Debug)]
pub enum RegistrationCommand {
    /// List registrations in creation order.
    List {
        /// Only registrations for this offering (id or label).
        #[arg(long, short = 'o')]
        offering: Option<String>,

        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a registration.
    Delete {
        /// Registration id.
        id: RegistrationId,
    },
}

#[derive(Tabled)]
struct RegistrationRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "student")]
    student: String,
    #[tabled(rename = "offering")]
    offering: String,
    #[tabled(rename = "registered")]
    registered: String,
}

pub fn run(store: &mut Store, cmd: RegistrationCommand) -> Result<()> {
    match cmd {
        RegistrationCommand::List { offering, json } => list(store, offering.as_deref(), json),
        RegistrationCommand::Delete { id } => {
            let removed = store
                .delete_registration(id)
                .context("failed to delete registration")?;
            println!(
                "✓ Deleted registration of '{}' for '{}'",
                removed.student_name, removed.offering_name
            );
            Ok(())
        }
    }
}

fn list(store: &Store, offering: Option<&str>, json: bool) -> Result<()> {
    let filter = offering.map(|o| offering_ref(store, o)).transpose()?;
    let registrations: Vec<_> = store
        .registrations()
        .iter()
        .filter(|r| filter.map_or(true, |id| r.course_offering_id == id))
        .collect();

    if json {
        return print_json(&registrations);
    }
    if registrations.is_empty() {
        println!("No registrations.");
        return Ok(());
    }

    let rows: Vec<RegistrationRow> = registrations
        .iter()
        .map(|r| RegistrationRow {
            id: r.id.to_string(),
            student: r.student_name.clone(),
            offering: r.offering_name.clone(),
            registered: format_date(r.created_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
