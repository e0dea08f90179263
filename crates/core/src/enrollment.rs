//! Enrollment records (Enrollment Ledger rows)

use crate::types::{EnrollmentId, GroupId, StudentId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an enrollment
///
/// No operation in this crate produces `Cancelled`; the variant exists so
/// that ledgers written by a future withdrawal path stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Holds a seat
    Active,
    /// Seat released
    Cancelled,
}

impl EnrollmentStatus {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's enrollment in a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrollment identifier
    pub id: EnrollmentId,
    /// Enrolled student
    pub student_id: StudentId,
    /// Group the seat belongs to
    pub group_id: GroupId,
    /// Lifecycle status
    pub status: EnrollmentStatus,
    /// When the enrollment was staged
    pub created_at: Timestamp,
}

impl Enrollment {
    /// A fresh active enrollment with a new id
    pub fn active(student_id: StudentId, group_id: GroupId, created_at: Timestamp) -> Self {
        Self {
            id: EnrollmentId::new(),
            student_id,
            group_id,
            status: EnrollmentStatus::Active,
            created_at,
        }
    }

    /// True while the enrollment holds a seat
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}
