//! # seatguard
//!
//! Capacity-bounded group enrollment. A fixed number of seats per group,
//! many concurrent writers, and a guarantee that a group never admits more
//! students than its capacity and never admits the same student twice.
//!
//! ## Quick Start
//!
//! ```
//! use seatguard::prelude::*;
//!
//! let db = Database::ephemeral();
//! let group = db.register_group(2)?;
//!
//! // Optimistic: submit the version you last saw
//! let seen = db.availability(group).expect("registered");
//! db.enroll_optimistic(group, StudentId::new(1), seen.version)?;
//!
//! // Pessimistic: wait for the row lock instead
//! db.enroll_pessimistic(group, StudentId::new(2))?;
//!
//! let err = db.enroll_pessimistic(group, StudentId::new(3)).unwrap_err();
//! assert_eq!(err.code(), "CapacityExceeded");
//! # Ok::<(), seatguard::Error>(())
//! ```
//!
//! ## Strategies
//!
//! - **Optimistic**: version compare-and-swap. A stale version fails with
//!   `Conflict` without waiting; a matching one takes the row lock for the
//!   conditional write.
//! - **Pessimistic**: exclusive row lock with a bounded wait; fails with
//!   `LockTimeout` when the wait expires.
//!
//! Both can be mixed on the same group. Neither retries on its own; check
//! [`EnrollError::is_retryable`].

#![warn(missing_docs)]

mod error;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use seatguard_engine::{
    ConfigError, Database, DatabaseBuilder, DurabilityMode, EngineConfig, OpenError,
    RecoveryStats, Strategy,
};

// Re-export types
pub use seatguard_core::{
    EnrollError, Enrollment, EnrollmentId, EnrollmentStatus, Group, GroupAvailability, GroupId,
    SeatStatus, StoreError, StudentId, Timestamp, Version,
};
