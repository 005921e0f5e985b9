//! `registrar course list|add|rename|delete`

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::{settings::Style, Table, Tabled};

use super::{course_ref, format_date, print_json, Store};

/// Manage courses.
#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// List courses in creation order.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a course.
    Add {
        /// Display name (e.g. "Sanskrit").
        name: String,
    },

    /// Rename a course. Offerings and registrations follow the new name.
    Rename {
        /// Course id or current name.
        course: String,
        /// New display name.
        name: String,
    },

    /// Delete a course that no offering uses.
    Delete {
        /// Course id or name.
        course: String,
    },
}

#[derive(Tabled)]
struct CourseRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "offerings")]
    offerings: usize,
    #[tabled(rename = "created")]
    created: String,
}

pub fn run(store: &mut Store, cmd: CourseCommand) -> Result<()> {
    match cmd {
        CourseCommand::List { json } => list(store, json),
        CourseCommand::Add { name } => {
            let course = store
                .add_course(&name)
                .with_context(|| format!("failed to add course '{name}'"))?;
            println!("✓ Added course '{}' ({})", course.name, course.id);
            Ok(())
        }
        CourseCommand::Rename { course, name } => {
            let id = course_ref(store, &course)?;
            let updated = store
                .update_course(id, &name)
                .with_context(|| format!("failed to rename course '{course}'"))?;
            println!("✓ Course renamed to '{}'", updated.name);
            Ok(())
        }
        CourseCommand::Delete { course } => {
            let id = course_ref(store, &course)?;
            let removed = store
                .delete_course(id)
                .with_context(|| format!("cannot delete course '{course}'"))?;
            println!("✓ Deleted course '{}'", removed.name);
            Ok(())
        }
    }
}

fn list(store: &Store, json: bool) -> Result<()> {
    if json {
        return print_json(store.courses());
    }
    if store.courses().is_empty() {
        println!("No courses.");
        println!("Run: registrar course add <name>");
        return Ok(());
    }

    let rows: Vec<CourseRow> = store
        .courses()
        .iter()
        .map(|c| CourseRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            offerings: store
                .offerings()
                .iter()
                .filter(|o| o.course_id == c.id)
                .count(),
            created: format_date(c.created_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
