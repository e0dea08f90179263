//! Error types for enrollment and storage
//!
//! ## Error Codes (Canonical)
//!
//! Presentation layers match on [`EnrollError::code`], never on the
//! formatted message. These codes are frozen:
//!
//! | Code | Retryable | Description |
//! |------|-----------|-------------|
//! | NotFound | no | Group does not exist |
//! | DuplicateEnrollment | no | Student already holds an active seat in the group |
//! | CapacityExceeded | no | No seat left at check time |
//! | Conflict | yes | Optimistic version mismatch or row held by another writer |
//! | LockTimeout | yes | Pessimistic row lock not acquired within the bounded wait |
//! | StoreError | if transient | Underlying store failure |

use crate::types::{EnrollmentId, GroupId, StudentId, Version};
use thiserror::Error;

/// Failure of the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure (log file, fsync)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Log contents failed validation
    #[error("corruption at offset {offset}: {reason}")]
    Corruption {
        /// Byte offset of the bad frame
        offset: u64,
        /// What failed
        reason: String,
    },

    /// A store-level constraint rejected the write
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Group provisioned with a non-positive capacity
    #[error("invalid capacity {capacity}: must be greater than zero")]
    InvalidCapacity {
        /// Requested capacity
        capacity: u32,
    },

    /// A record refers to a group the capacity store does not hold
    #[error("unknown group {group_id}")]
    UnknownGroup {
        /// Missing group
        group_id: GroupId,
    },
}

impl StoreError {
    /// True for failures that may clear on their own (I/O)
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Outcome of a failed enrollment attempt
///
/// Every variant carries structured fields; nothing is pre-formatted for
/// display beyond the `Display` impl.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// Group does not exist
    #[error("group {group_id} not found")]
    NotFound {
        /// Requested group
        group_id: GroupId,
    },

    /// Student already holds an active seat in this group
    #[error("student {student_id} is already enrolled in group {group_id}")]
    DuplicateEnrollment {
        /// Student
        student_id: StudentId,
        /// Group
        group_id: GroupId,
        /// The active enrollment already on file
        existing: EnrollmentId,
    },

    /// Group was full at check time
    #[error("group {group_id} is full ({enrolled}/{capacity})")]
    CapacityExceeded {
        /// Group
        group_id: GroupId,
        /// Active enrollments observed
        enrolled: u32,
        /// Seat limit
        capacity: u32,
    },

    /// Optimistic compare-and-swap lost
    #[error("group {group_id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        /// Group
        group_id: GroupId,
        /// Version the caller submitted
        expected: Version,
        /// Latest committed version observed
        actual: Version,
    },

    /// Pessimistic row lock not acquired in time
    #[error("timed out after {waited_ms}ms waiting for the lock on group {group_id}")]
    LockTimeout {
        /// Group
        group_id: GroupId,
        /// How long the attempt waited
        waited_ms: u64,
    },

    /// Backing store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EnrollError {
    /// Stable identifier for presentation layers
    pub fn code(&self) -> &'static str {
        match self {
            EnrollError::NotFound { .. } => "NotFound",
            EnrollError::DuplicateEnrollment { .. } => "DuplicateEnrollment",
            EnrollError::CapacityExceeded { .. } => "CapacityExceeded",
            EnrollError::Conflict { .. } => "Conflict",
            EnrollError::LockTimeout { .. } => "LockTimeout",
            EnrollError::Store(_) => "StoreError",
        }
    }

    /// Check if this error is retryable.
    ///
    /// Retryable errors may succeed on a later attempt with fresh data.
    /// The core never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            EnrollError::Conflict { .. } | EnrollError::LockTimeout { .. } => true,
            EnrollError::Store(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Terminal for the given input; surface unchanged
    pub fn is_terminal(&self) -> bool {
        !self.is_retryable()
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EnrollError::Conflict { .. })
    }

    /// Group the failure concerns, when it is known
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            EnrollError::NotFound { group_id }
            | EnrollError::DuplicateEnrollment { group_id, .. }
            | EnrollError::CapacityExceeded { group_id, .. }
            | EnrollError::Conflict { group_id, .. }
            | EnrollError::LockTimeout { group_id, .. } => Some(*group_id),
            EnrollError::Store(StoreError::UnknownGroup { group_id }) => Some(*group_id),
            EnrollError::Store(_) => None,
        }
    }
}
