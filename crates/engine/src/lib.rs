//! Enrollment engine for seatguard
//!
//! Ties the stores, the transaction manager and the log together behind
//! [`Database`]:
//! - Enrollment transactions: optimistic (version CAS) and pessimistic
//!   (row lock with bounded wait)
//! - Availability snapshot (read-only projection)
//! - Group provisioning and ledger queries
//! - Configuration and WAL recovery at open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod enrollment;
mod projection;
pub mod recovery;

pub use config::{ConfigError, EngineConfig, DEFAULT_LOCK_TIMEOUT_MS};
pub use database::{Database, DatabaseBuilder, OpenError};
pub use enrollment::Strategy;
pub use recovery::RecoveryStats;
pub use seatguard_durability::DurabilityMode;
