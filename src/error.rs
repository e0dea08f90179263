//! Unified error type for the facade.
//!
//! Wraps the open-time and per-operation errors so callers can use one
//! `Result` alias with `?` across both.

use seatguard_core::{EnrollError, StoreError};
use seatguard_engine::OpenError;
use thiserror::Error;

/// All seatguard errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Database could not be opened
    #[error(transparent)]
    Open(#[from] OpenError),

    /// An enrollment or catalog operation failed
    #[error(transparent)]
    Enroll(#[from] EnrollError),
}

/// Result type for seatguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Enroll(EnrollError::Store(e))
    }
}

impl Error {
    /// Stable code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            Error::Open(_) => "OpenError",
            Error::Enroll(e) => e.code(),
        }
    }

    /// Check if this error may succeed on retry with fresh data.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Open(_) => false,
            Error::Enroll(e) => e.is_retryable(),
        }
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Enroll(e) if e.is_conflict())
    }
}
