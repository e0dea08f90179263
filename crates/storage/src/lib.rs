//! Storage layer for seatguard
//!
//! This crate holds the two durable data components in memory:
//! - CapacityStore: one row per group, read latch + exclusive row lock
//! - EnrollmentLedger: enrollment records with a unique active index
//!
//! Neither store knows about transactions; the concurrency crate stages
//! writes and applies them through a held [`RowLock`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capacity;
pub mod ledger;

pub use capacity::{CapacityStore, GroupRow, LockWait, RowLock};
pub use ledger::EnrollmentLedger;
