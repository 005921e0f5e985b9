//! `registrar offering list|add|update|delete`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use super::{course_ref, course_type_ref, format_date, offering_ref, print_json, Store};

/// Manage offerings.
#[derive(Subcommand, Debug)]
pub enum OfferingCommand {
    /// List offerings in creation order.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Offer a course under a course type.
    Add(OfferingArgs),

    /// Point an existing offering at another course and/or course type.
    Update {
        /// Offering id or label ("Individual - Hindi").
        offering: String,

        #[command(flatten)]
        target: OfferingArgs,
    },

    /// Delete an offering nobody is registered for.
    Delete {
        /// Offering id or label.
        offering: String,
    },
}

#[derive(Args, Debug)]
pub struct OfferingArgs {
    /// Course id or name.
    #[arg(long, short = 'c')]
    pub course: String,

    /// Course type id or name.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub course_type: String,
}

#[derive(Tabled)]
struct OfferingRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "offering")]
    label: String,
    #[tabled(rename = "registrations")]
    registrations: usize,
    #[tabled(rename = "created")]
    created: String,
}

pub fn run(store: &mut Store, cmd: OfferingCommand) -> Result<()> {
    match cmd {
        OfferingCommand::List { json } => list(store, json),
        OfferingCommand::Add(args) => {
            let course_id = course_ref(store, &args.course)?;
            let course_type_id = course_type_ref(store, &args.course_type)?;
            let offering = store
                .add_offering(course_id, course_type_id)
                .context("failed to add offering")?;
            println!("✓ Added offering '{}' ({})", offering.label(), offering.id);
            Ok(())
        }
        OfferingCommand::Update { offering, target } => {
            let id = offering_ref(store, &offering)?;
            let course_id = course_ref(store, &target.course)?;
            let course_type_id = course_type_ref(store, &target.course_type)?;
            let updated = store
                .update_offering(id, course_id, course_type_id)
                .with_context(|| format!("failed to update offering '{offering}'"))?;
            println!("✓ Offering is now '{}'", updated.label());
            Ok(())
        }
        OfferingCommand::Delete { offering } => {
            let id = offering_ref(store, &offering)?;
            let removed = store
                .delete_offering(id)
                .with_context(|| format!("cannot delete offering '{offering}'"))?;
            println!("✓ Deleted offering '{}'", removed.label());
            Ok(())
        }
    }
}

fn list(store: &Store, json: bool) -> Result<()> {
    if json {
        return print_json(store.offerings());
    }
    if store.offerings().is_empty() {
        println!("No offerings.");
        println!("Run: registrar offering add --course <course> --type <type>");
        return Ok(());
    }

    let rows: Vec<OfferingRow> = store
        .offerings()
        .iter()
        .map(|o| OfferingRow {
            id: o.id.to_string(),
            label: o.label(),
            registrations: store.registrations_for_offering(o.id).count(),
            created: format_date(o.created_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
