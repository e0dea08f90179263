//! Transaction context: staged write set and status machine
//!
//! ```text
//! Active --commit--> Committed
//!   |
//!   +--abort / drop--> Aborted
//! ```
//!
//! A context only buffers writes. Nothing reaches the stores until the
//! [`TransactionManager`](crate::TransactionManager) commits it, so dropping
//! an active context is a complete rollback.

use seatguard_core::{EnrollError, Enrollment, Group, GroupId, StoreError};
use thiserror::Error;
use tracing::debug;

/// Lifecycle state of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting staged writes
    Active,
    /// Durable and applied
    Committed,
    /// Rolled back; staged writes discarded
    Aborted {
        /// Why the transaction ended
        reason: String,
    },
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Active => f.write_str("active"),
            TransactionStatus::Committed => f.write_str("committed"),
            TransactionStatus::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// Write set of one enrollment transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    /// Row state after the commit
    pub group: Group,
    /// Ledger record to insert
    pub enrollment: Enrollment,
}

/// Commit failures
#[derive(Debug, Error)]
pub enum CommitError {
    /// Commit or stage attempted outside the Active state
    #[error("transaction {txn_id} is not active ({state})")]
    NotActive {
        /// Transaction
        txn_id: u64,
        /// State it was in
        state: TransactionStatus,
    },

    /// Commit attempted with an empty write set
    #[error("transaction {txn_id} has nothing staged")]
    NothingStaged {
        /// Transaction
        txn_id: u64,
    },

    /// Staged writes rejected by the stores before anything was written
    #[error("validation failed: {0}")]
    Validation(StoreError),

    /// Log append failed; nothing was applied
    #[error("WAL write failed: {0}")]
    Wal(StoreError),

    /// Durable but not applied in memory
    #[error("apply failed after WAL commit: {0}")]
    Apply(StoreError),
}

impl From<CommitError> for EnrollError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::Validation(s) | CommitError::Wal(s) | CommitError::Apply(s) => {
                EnrollError::Store(s)
            }
            other => EnrollError::Store(StoreError::ConstraintViolation(other.to_string())),
        }
    }
}

/// One enrollment transaction against one group
#[derive(Debug)]
pub struct TransactionContext {
    /// Transaction identifier
    pub txn_id: u64,
    /// The only group this transaction may touch
    pub group_id: GroupId,
    /// Lifecycle state
    pub status: TransactionStatus,
    staged: Option<Admission>,
}

impl TransactionContext {
    /// Start an active transaction
    pub fn new(txn_id: u64, group_id: GroupId) -> Self {
        Self {
            txn_id,
            group_id,
            status: TransactionStatus::Active,
            staged: None,
        }
    }

    /// Check if the transaction still accepts writes
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Stage an admission
    ///
    /// A transaction admits at most one student into its own group.
    pub fn stage_admission(&mut self, group: Group, enrollment: Enrollment) -> Result<(), CommitError> {
        self.ensure_active()?;
        if group.id != self.group_id || enrollment.group_id != self.group_id {
            return Err(CommitError::Validation(StoreError::ConstraintViolation(format!(
                "transaction {} is scoped to group {}",
                self.txn_id, self.group_id
            ))));
        }
        if self.staged.is_some() {
            return Err(CommitError::Validation(StoreError::ConstraintViolation(format!(
                "transaction {} already staged an admission",
                self.txn_id
            ))));
        }
        self.staged = Some(Admission { group, enrollment });
        Ok(())
    }

    /// Staged write set
    pub fn staged(&self) -> Option<&Admission> {
        self.staged.as_ref()
    }

    /// Roll back: discard staged writes
    pub fn mark_aborted(&mut self, reason: impl Into<String>) {
        self.staged = None;
        self.status = TransactionStatus::Aborted {
            reason: reason.into(),
        };
    }

    pub(crate) fn mark_committed(&mut self) {
        self.staged = None;
        self.status = TransactionStatus::Committed;
    }

    pub(crate) fn ensure_active(&self) -> Result<(), CommitError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CommitError::NotActive {
                txn_id: self.txn_id,
                state: self.status.clone(),
            })
        }
    }
}

impl Drop for TransactionContext {
    fn drop(&mut self) {
        if self.is_active() && self.staged.is_some() {
            debug!(
                txn_id = self.txn_id,
                group_id = %self.group_id,
                "Transaction dropped before commit, staged writes discarded"
            );
            self.mark_aborted("dropped before commit");
        }
    }
}
