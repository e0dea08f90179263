//! Concurrency layer for seatguard
//!
//! This crate implements the transactional unit shared by both enrollment
//! strategies:
//! - TransactionContext: staged write set, status machine, rollback on drop
//! - TransactionManager: txn ids, validate → WAL → apply commit under the
//!   group's row lock
//!
//! Strategy-specific logic (version compare-and-swap, blocking lock
//! acquisition) lives in the engine; both end in the same commit path.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;

pub use manager::TransactionManager;
pub use transaction::{Admission, CommitError, TransactionContext, TransactionStatus};
