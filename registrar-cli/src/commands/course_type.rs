//! `registrar course-type list|add|rename|delete`

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::{settings::Style, Table, Tabled};

use super::{course_type_ref, format_date, print_json, Store};

/// Manage course types.
#[derive(Subcommand, Debug)]
pub enum CourseTypeCommand {
    /// List course types in creation order.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a course type.
    Add {
        /// Display name (e.g. "Weekend").
        name: String,
    },

    /// Rename a course type. Offerings using it pick up the new name.
    Rename {
        /// Course type id or current name.
        course_type: String,
        /// New display name.
        name: String,
    },

    /// Delete a course type that no offering uses.
    Delete {
        /// Course type id or name.
        course_type: String,
    },
}

#[derive(Tabled)]
struct CourseTypeRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "offerings")]
    offerings: usize,
    #[tabled(rename = "created")]
    created: String,
}

pub fn run(store: &mut Store, cmd: CourseTypeCommand) -> Result<()> {
    match cmd {
        CourseTypeCommand::List { json } => list(store, json),
        CourseTypeCommand::Add { name } => {
            let course_type = store
                .add_course_type(&name)
                .with_context(|| format!("failed to add course type '{name}'"))?;
            println!("✓ Added course type '{}' ({})", course_type.name, course_type.id);
            Ok(())
        }
        CourseTypeCommand::Rename { course_type, name } => {
            let id = course_type_ref(store, &course_type)?;
            let updated = store
                .update_course_type(id, &name)
                .with_context(|| format!("failed to rename course type '{course_type}'"))?;
            println!("✓ Course type renamed to '{}'", updated.name);
            Ok(())
        }
        CourseTypeCommand::Delete { course_type } => {
            let id = course_type_ref(store, &course_type)?;
            let removed = store
                .delete_course_type(id)
                .with_context(|| format!("cannot delete course type '{course_type}'"))?;
            println!("✓ Deleted course type '{}'", removed.name);
            Ok(())
        }
    }
}

fn list(store: &Store, json: bool) -> Result<()> {
    if json {
        return print_json(store.course_types());
    }
    if store.course_types().is_empty() {
        println!("No course types.");
        println!("Run: registrar course-type add <name>");
        return Ok(());
    }

    let rows: Vec<CourseTypeRow> = store
        .course_types()
        .iter()
        .map(|ct| CourseTypeRow {
            id: ct.id.to_string(),
            name: ct.name.clone(),
            offerings: store
                .offerings()
                .iter()
                .filter(|o| o.course_type_id == ct.id)
                .count(),
            created: format_date(ct.created_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
