//! Core types for seatguard
//!
//! This crate defines the data model shared by every layer:
//! - Identifiers: [`GroupId`], [`StudentId`], [`EnrollmentId`], [`Version`]
//! - Records: [`Group`] (Capacity Store row), [`Enrollment`] (Ledger row)
//! - Projection: [`GroupAvailability`]
//! - Errors: [`EnrollError`], [`StoreError`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod availability;
pub mod enrollment;
pub mod error;
pub mod group;
pub mod types;

pub use availability::{GroupAvailability, SeatStatus};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use error::{EnrollError, StoreError};
pub use group::Group;
pub use types::{now, EnrollmentId, GroupId, StudentId, Timestamp, Version};
