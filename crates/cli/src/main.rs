//! seatguard CLI: operator surface over the enrollment core.
//!
//! `seatguard [--db PATH | --ephemeral] [--config FILE] [--json] COMMAND`
//!
//! Exit status is 0 on success, 1 for terminal failures, and 75
//! (`EX_TEMPFAIL`) when the failure is retryable (`Conflict`,
//! `LockTimeout`, transient store errors).

mod commands;
mod format;
mod parse;

use std::process;

use anyhow::Context;
use seatguard_core::EnrollError;
use seatguard_engine::{Database, EngineConfig, Strategy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::build_cli;
use format::{exit_code, format_error, format_output, Output, OutputMode};
use parse::{matches_to_action, CliAction};

const DEFAULT_DB_PATH: &str = ".seatguard";

fn main() {
    let matches = build_cli().get_matches();
    init_logger();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let db = match open_database(&matches) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("(error) {:#}", e);
            process::exit(1);
        }
    };

    let code = match matches_to_action(&matches) {
        Ok(action) => match execute(&db, action) {
            Ok(output) => {
                println!("{}", format_output(&output, output_mode));
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, output_mode));
                exit_code(&e)
            }
        },
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    };

    if let Err(e) = db.flush() {
        eprintln!("(error) flush failed: {}", e);
        process::exit(1);
    }
    process::exit(code);
}

/// Install the stderr subscriber; `RUST_LOG` overrides the `warn` default.
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn open_database(matches: &clap::ArgMatches) -> anyhow::Result<Database> {
    let config = match matches.get_one::<String>("config") {
        Some(file) => EngineConfig::from_file(file)
            .with_context(|| format!("Failed to load config {}", file))?,
        None => EngineConfig::default(),
    };

    if matches.get_flag("ephemeral") {
        return Database::builder()
            .config(config)
            .in_memory()
            .open()
            .context("Failed to open ephemeral database");
    }

    let path = matches
        .get_one::<String>("db")
        .map(String::as_str)
        .unwrap_or(DEFAULT_DB_PATH);
    Database::builder()
        .config(config)
        .path(path)
        .open()
        .with_context(|| format!("Failed to open database at {}", path))
}

fn execute(db: &Database, action: CliAction) -> Result<Output, EnrollError> {
    match action {
        CliAction::AddGroup { capacity } => {
            let id = db.register_group(capacity)?;
            let row = db
                .availability(id)
                .ok_or(EnrollError::NotFound { group_id: id })?;
            Ok(Output::Registered(row))
        }
        CliAction::Groups => Ok(Output::Availability(db.snapshot())),
        CliAction::Enroll {
            group,
            student,
            pessimistic,
            expected,
        } => {
            let strategy = if pessimistic {
                Strategy::Pessimistic
            } else {
                let expected = match expected {
                    Some(v) => v,
                    None => {
                        db.group(group)
                            .ok_or(EnrollError::NotFound { group_id: group })?
                            .version
                    }
                };
                Strategy::Optimistic { expected }
            };
            let enrollment_id = db.enroll(group, student, strategy)?;
            Ok(Output::Enrolled {
                enrollment_id,
                group_id: group,
                student_id: student,
                strategy: strategy.name(),
            })
        }
        CliAction::Enrollments { student } => {
            Ok(Output::Enrollments(db.enrollments_for_student(student)))
        }
        CliAction::History => Ok(Output::Enrollments(db.enrollment_history())),
    }
}
