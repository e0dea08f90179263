//! Enrollment transactions
//!
//! Two strategies admit a student into a group:
//!
//! | Strategy | Exclusion | On contention |
//! |----------|-----------|---------------|
//! | Optimistic | version CAS under the row lock | `Conflict` once the version moves; waits, then `LockTimeout`, while it has not |
//! | Pessimistic | row lock with bounded wait | waits, then `LockTimeout` |
//!
//! Both commit through the same row lock, so they can be mixed freely on
//! one group. Neither retries.

pub(crate) mod optimistic;
pub(crate) mod pessimistic;
pub(crate) mod validation;

use seatguard_core::Version;
use serde::{Deserialize, Serialize};

/// Concurrency-control strategy chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Compare-and-swap against the version the caller last observed
    Optimistic {
        /// Version from the caller's snapshot
        expected: Version,
    },
    /// Exclusive row lock
    Pessimistic,
}

impl Strategy {
    /// Lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Optimistic { .. } => "optimistic",
            Strategy::Pessimistic => "pessimistic",
        }
    }
}
