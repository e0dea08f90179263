//! Core identifier types
//!
//! This module defines the fundamental types used throughout the system:
//! - [`GroupId`]: Identifier of a capacity-bounded course section
//! - [`StudentId`]: Identifier of a student, owned by the enclosing application
//! - [`EnrollmentId`]: Unique identifier minted for every committed enrollment
//! - [`Version`]: Per-group modification counter
//! - [`Timestamp`]: Wall-clock instant attached to ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a group (course section)
///
/// Groups are provisioned by the catalog and identified by a small integer,
/// so the id doubles as the ordering key of the availability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u64);

impl GroupId {
    /// Wrap a raw group number
    pub const fn new(raw: u64) -> Self {
        GroupId(raw)
    }

    /// Raw group number
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a student
///
/// Opaque to this core; the enclosing application owns student records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(u64);

impl StudentId {
    /// Wrap a raw student number
    pub const fn new(raw: u64) -> Self {
        StudentId(raw)
    }

    /// Raw student number
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of an enrollment record
///
/// # Examples
///
/// ```
/// use seatguard_core::types::EnrollmentId;
///
/// let a = EnrollmentId::new();
/// let b = EnrollmentId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentId(Uuid);

impl EnrollmentId {
    /// Create a new random EnrollmentId using UUID v4
    pub fn new() -> Self {
        EnrollmentId(Uuid::new_v4())
    }

    /// Create EnrollmentId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        EnrollmentId(Uuid::from_bytes(bytes))
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for EnrollmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-group modification counter
///
/// Starts at [`Version::INITIAL`] and grows by exactly one on every committed
/// mutation of the group. A version is never reused or decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly provisioned group
    pub const INITIAL: Version = Version(1);

    /// Wrap a raw counter value
    pub const fn new(raw: u64) -> Self {
        Version(raw)
    }

    /// Raw counter value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The version that follows this one
    pub const fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock instant (UTC)
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock instant
pub fn now() -> Timestamp {
    Utc::now()
}
