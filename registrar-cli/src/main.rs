//! Registrar — course offering and student registration CLI.
//!
//! # Usage
//!
//! ```text
//! registrar [--data-dir <path>] course-type list|add|rename|delete
//! registrar course list|add|rename|delete
//! registrar offering list|add|update|delete
//! registrar student list|add
//! registrar register --offering <ref> (--student <ref> | --name .. --email .. --phone .. --reg-no ..)
//! registrar registration list|delete
//! registrar status [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use registrar_core::StoreError;

use commands::{
    course::CourseCommand, course_type::CourseTypeCommand, offering::OfferingCommand,
    register::RegisterArgs, registration::RegistrationCommand, status::StatusArgs,
    student::StudentCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "registrar",
    version,
    about = "Manage course offerings and student registrations",
    long_about = None,
)]
struct Cli {
    /// Directory holding the stored collections.
    /// Defaults to $REGISTRAR_HOME, then ~/.registrar/data.
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage course types (Individual, Group, ...).
    CourseType {
        #[command(subcommand)]
        command: CourseTypeCommand,
    },

    /// Manage courses (Hindi, English, ...).
    Course {
        #[command(subcommand)]
        command: CourseCommand,
    },

    /// Manage offerings: a course taught under a course type.
    Offering {
        #[command(subcommand)]
        command: OfferingCommand,
    },

    /// Manage students.
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },

    /// Register a new or existing student for an offering.
    Register(RegisterArgs),

    /// Manage registrations.
    Registration {
        #[command(subcommand)]
        command: RegistrationCommand,
    },

    /// Show collection counts and enrolment per offering.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let result = run(Cli::parse());
    if let Err(err) = &result {
        log_storage_failure(err);
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    let mut store = commands::open_store(cli.data_dir)?;
    match cli.command {
        Commands::CourseType { command } => commands::course_type::run(&mut store, command),
        Commands::Course { command } => commands::course::run(&mut store, command),
        Commands::Offering { command } => commands::offering::run(&mut store, command),
        Commands::Student { command } => commands::student::run(&mut store, command),
        Commands::Register(args) => args.run(&mut store),
        Commands::Registration { command } => commands::registration::run(&mut store, command),
        Commands::Status(args) => args.run(&store),
    }
}

/// Rejections are reported by the error message alone; a failure of the
/// storage medium is also logged at `error`.
fn log_storage_failure(err: &anyhow::Error) {
    let cause = err
        .chain()
        .filter_map(|e| e.downcast_ref::<StoreError>())
        .find(|e| !e.is_rejection());
    if let Some(cause) = cause {
        tracing::error!(error = %cause, "storage failure");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
