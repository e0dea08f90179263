//! Output formatting: human-readable text or JSON.

use seatguard_core::{EnrollError, Enrollment, EnrollmentId, GroupAvailability, GroupId, StudentId};
use serde_json::json;

/// Exit status for retryable failures (`EX_TEMPFAIL`)
pub const EX_TEMPFAIL: i32 = 75;

/// Output mode selected by `--json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of a successful command
#[derive(Debug)]
pub enum Output {
    Registered(GroupAvailability),
    Availability(Vec<GroupAvailability>),
    Enrolled {
        enrollment_id: EnrollmentId,
        group_id: GroupId,
        student_id: StudentId,
        strategy: &'static str,
    },
    Enrollments(Vec<Enrollment>),
}

/// Render a successful result
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format_human(output),
        OutputMode::Json => format_json(output),
    }
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Registered(g) => format!("group {} registered (capacity {})", g.id, g.capacity),
        Output::Availability(rows) if rows.is_empty() => "(no groups)".to_string(),
        Output::Availability(rows) => {
            let mut lines = vec![format!(
                "{:>8}  {:>8}  {:>8}  {:>9}  {:>7}  STATUS",
                "GROUP", "CAPACITY", "ENROLLED", "AVAILABLE", "VERSION"
            )];
            lines.extend(rows.iter().map(|g| {
                format!(
                    "{:>8}  {:>8}  {:>8}  {:>9}  {:>7}  {}",
                    g.id, g.capacity, g.enrolled, g.available, g.version, g.status
                )
            }));
            lines.join("\n")
        }
        Output::Enrolled {
            enrollment_id,
            group_id,
            student_id,
            strategy,
        } => format!(
            "student {} enrolled in group {} ({}): {}",
            student_id, group_id, strategy, enrollment_id
        ),
        Output::Enrollments(list) if list.is_empty() => "(no enrollments)".to_string(),
        Output::Enrollments(list) => list
            .iter()
            .map(|e| {
                format!(
                    "{}  group {}  student {}  {}  {}",
                    e.created_at.to_rfc3339(),
                    e.group_id,
                    e.student_id,
                    e.status,
                    e.id
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_json(output: &Output) -> String {
    let value = match output {
        Output::Registered(g) => json!(g),
        Output::Availability(rows) => json!(rows),
        Output::Enrolled {
            enrollment_id,
            group_id,
            student_id,
            strategy,
        } => json!({
            "enrollment_id": enrollment_id,
            "group_id": group_id,
            "student_id": student_id,
            "strategy": strategy,
        }),
        Output::Enrollments(list) => json!(list),
    };
    value.to_string()
}

/// Render a failed enrollment or store operation
pub fn format_error(err: &EnrollError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => {
            let hint = if err.is_retryable() { " (retryable)" } else { "" };
            format!("(error) {}: {}{}", err.code(), err, hint)
        }
        OutputMode::Json => json!({
            "error": {
                "code": err.code(),
                "message": err.to_string(),
                "retryable": err.is_retryable(),
            }
        })
        .to_string(),
    }
}

/// Process exit status for a failed command
pub fn exit_code(err: &EnrollError) -> i32 {
    if err.is_retryable() {
        EX_TEMPFAIL
    } else {
        1
    }
}
