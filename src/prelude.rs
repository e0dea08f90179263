//! Convenient imports for seatguard.
//!
//! ```
//! use seatguard::prelude::*;
//!
//! let db = Database::ephemeral();
//! let group = db.register_group(10).unwrap();
//! db.enroll(group, StudentId::new(1), Strategy::Pessimistic).unwrap();
//! ```

// Main entry point
pub use crate::{Database, DatabaseBuilder, DurabilityMode, EngineConfig, Strategy};

// Error handling
pub use crate::error::{Error, Result};
pub use crate::{EnrollError, StoreError};

// Core types
pub use crate::{Enrollment, EnrollmentId, Group, GroupAvailability, GroupId, SeatStatus, StudentId, Version};
