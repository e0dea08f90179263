//! ArgMatches → CliAction conversion.

use clap::ArgMatches;
use seatguard_core::{GroupId, StudentId, Version};

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    AddGroup { capacity: u32 },
    Groups,
    Enroll {
        group: GroupId,
        student: StudentId,
        pessimistic: bool,
        /// Optimistic only; `None` means "use the group's current version"
        expected: Option<Version>,
    },
    Enrollments { student: StudentId },
    History,
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "group" => {
            let (sub, m) = m.subcommand().ok_or("No group subcommand")?;
            match sub {
                "add" => Ok(CliAction::AddGroup {
                    capacity: required::<u32>(m, "capacity")?,
                }),
                other => Err(format!("Unknown group subcommand: {}", other)),
            }
        }
        "groups" => Ok(CliAction::Groups),
        "enroll" => parse_enroll(m),
        "enrollments" => Ok(CliAction::Enrollments {
            student: StudentId::new(required::<u64>(m, "student")?),
        }),
        "history" => Ok(CliAction::History),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_enroll(m: &ArgMatches) -> Result<CliAction, String> {
    let group = GroupId::new(required::<u64>(m, "group")?);
    let student = StudentId::new(required::<u64>(m, "student")?);
    let expected = m.get_one::<u64>("expected-version").copied().map(Version::new);

    let pessimistic = match m.get_one::<String>("strategy").map(String::as_str) {
        Some("optimistic") => false,
        Some("pessimistic") if expected.is_some() => {
            return Err("--expected-version only applies to --strategy optimistic".to_string())
        }
        Some("pessimistic") => true,
        Some(other) => return Err(format!("Unknown strategy: {}", other)),
        None => return Err("Missing --strategy".to_string()),
    };

    Ok(CliAction::Enroll {
        group,
        student,
        pessimistic,
        expected,
    })
}

fn required<T: Clone + Send + Sync + 'static>(m: &ArgMatches, name: &str) -> Result<T, String> {
    m.get_one::<T>(name)
        .cloned()
        .ok_or_else(|| format!("Missing --{}", name))
}
