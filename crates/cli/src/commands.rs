//! Clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the top-level `seatguard` command.
pub fn build_cli() -> Command {
    Command::new("seatguard")
        .about("Capacity-bounded group enrollment")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .help("Database directory (default: .seatguard)"),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .action(ArgAction::SetTrue)
                .conflicts_with("db")
                .help("Use an in-memory database; nothing is written"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML engine configuration"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand(group_cmd())
        .subcommand(Command::new("groups").about("Show seat availability of every group"))
        .subcommand(enroll_cmd())
        .subcommand(
            Command::new("enrollments")
                .about("List a student's active enrollments, newest first")
                .arg(id_arg("student", "Student id")),
        )
        .subcommand(Command::new("history").about("List every enrollment, newest first"))
}

fn group_cmd() -> Command {
    Command::new("group")
        .about("Group provisioning")
        .subcommand_required(true)
        .subcommand(
            Command::new("add").about("Register a new group").arg(
                Arg::new("capacity")
                    .long("capacity")
                    .value_name("N")
                    .required(true)
                    .value_parser(value_parser!(u32).range(1..))
                    .help("Seat limit"),
            ),
        )
}

fn enroll_cmd() -> Command {
    Command::new("enroll")
        .about("Admit a student into a group")
        .arg(id_arg("group", "Group id"))
        .arg(id_arg("student", "Student id"))
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .required(true)
                .value_parser(["optimistic", "pessimistic"])
                .help("Concurrency control"),
        )
        .arg(
            Arg::new("expected-version")
                .long("expected-version")
                .value_name("V")
                .value_parser(value_parser!(u64))
                .help("Version last observed (optimistic only; defaults to the current one)"),
        )
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("ID")
        .required(true)
        .value_parser(value_parser!(u64))
        .help(help)
}
