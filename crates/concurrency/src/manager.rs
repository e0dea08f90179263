//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation against the row held under lock
//! 2. WAL writing (durability)
//! 3. Store application (visibility)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Caller holds the group's RowLock
//! 2. Check staged row state and ledger insert against current state
//! 3. IF invalid: abort() and return error, nothing written
//! 4. Append Admission entry to WAL (DURABILITY POINT)
//! 5. Insert ledger record, then write row state
//! 6. mark_committed(), return enrollment id
//! ```
//!
//! If a crash occurs before step 4 completes: the transaction is not
//! durable and is discarded on recovery. After step 4: it is replayed.
//!
//! Every commit happens under the group's row lock, whichever strategy
//! staged it, so optimistic and pessimistic writers exclude each other on
//! the same group.

use crate::transaction::{CommitError, TransactionContext};
use parking_lot::Mutex;
use seatguard_core::{EnrollmentId, Group, GroupId, StoreError};
use seatguard_durability::{Wal, WalEntry};
use seatguard_storage::{CapacityStore, EnrollmentLedger, RowLock};
use std::sync::atomic::{AtomicU64, Ordering};

/// Manages transaction lifecycle and atomic commits
pub struct TransactionManager {
    /// Next transaction ID
    ///
    /// Unique identifier for transactions. Used in WAL entries.
    next_txn_id: AtomicU64,

    /// Write-ahead log, absent in memory-only mode
    ///
    /// The mutex serializes appends only; commits on different groups
    /// otherwise proceed in parallel.
    wal: Option<Mutex<Wal>>,
}

impl TransactionManager {
    /// Create a manager with no log
    pub fn in_memory() -> Self {
        Self::new(None, 0)
    }

    /// Create a manager
    ///
    /// # Arguments
    /// * `wal` - Log to append commits to, if any
    /// * `max_txn_id` - Highest txn_id seen during recovery (new transactions start above it)
    pub fn new(wal: Option<Wal>, max_txn_id: u64) -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(max_txn_id + 1),
            wal: wal.map(Mutex::new),
        }
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Begin a transaction scoped to one group
    pub fn begin(&self, group_id: GroupId) -> TransactionContext {
        TransactionContext::new(self.next_txn_id(), group_id)
    }

    /// Whether commits are logged
    pub fn is_durable(&self) -> bool {
        self.wal.is_some()
    }

    /// Commit a transaction atomically
    ///
    /// # Arguments
    /// * `txn` - Transaction to commit (must be Active with a staged admission)
    /// * `lock` - Row lock of the transaction's group, held by the caller
    /// * `ledger` - Ledger to insert the enrollment into
    ///
    /// # Returns
    /// - Ok(enrollment_id) on success
    /// - Err(CommitError) if validation or the WAL write fails; the
    ///   transaction is then Aborted and no store has changed
    pub fn commit(
        &self,
        txn: &mut TransactionContext,
        lock: &mut RowLock<'_>,
        ledger: &EnrollmentLedger,
    ) -> Result<EnrollmentId, CommitError> {
        txn.ensure_active()?;
        let admission = match txn.staged() {
            Some(admission) => admission.clone(),
            None => return Err(CommitError::NothingStaged { txn_id: txn.txn_id }),
        };

        // Step 1: Validate against the locked row
        let validation = if lock.group_id() != txn.group_id {
            Err(StoreError::ConstraintViolation(format!(
                "transaction {} for group {} committed under the lock of group {}",
                txn.txn_id,
                txn.group_id,
                lock.group_id()
            )))
        } else {
            lock.check_write(&admission.group)
                .and_then(|_| ledger.check_insert(&admission.enrollment))
        };
        if let Err(e) = validation {
            txn.mark_aborted(format!("validation failed: {}", e));
            return Err(CommitError::Validation(e));
        }

        // Step 2: Write to WAL - DURABILITY POINT
        if let Some(wal) = &self.wal {
            let entry = WalEntry::Admission {
                txn_id: txn.txn_id,
                group: admission.group,
                enrollment: admission.enrollment.clone(),
            };
            if let Err(e) = wal.lock().append(&entry) {
                txn.mark_aborted(format!("WAL write failed: {}", e));
                return Err(CommitError::Wal(e));
            }
        }

        // Step 3: Apply to stores
        let enrollment_id = admission.enrollment.id;
        let applied = ledger
            .insert(lock, admission.enrollment)
            .and_then(|_| lock.write(admission.group));
        if let Err(e) = applied {
            // Validated under the same lock, so this is a bug; the WAL is
            // authoritative and recovery replays the entry.
            tracing::error!(
                txn_id = txn.txn_id,
                group_id = %txn.group_id,
                error = %e,
                "Store application failed after WAL commit - will be recovered on restart"
            );
            txn.mark_aborted(format!("apply failed: {}", e));
            return Err(CommitError::Apply(e));
        }

        txn.mark_committed();
        Ok(enrollment_id)
    }

    /// Explicitly abort a transaction
    pub fn abort(&self, txn: &mut TransactionContext, reason: impl Into<String>) {
        txn.mark_aborted(reason);
    }

    /// Provision a group: log it, then make it visible
    pub fn register(&self, store: &CapacityStore, group: Group) -> Result<(), StoreError> {
        if group.capacity == 0 {
            return Err(StoreError::InvalidCapacity {
                capacity: group.capacity,
            });
        }
        if store.contains(group.id) {
            return Err(StoreError::ConstraintViolation(format!(
                "group {} already exists",
                group.id
            )));
        }
        if let Some(wal) = &self.wal {
            wal.lock().append(&WalEntry::GroupRegistered { group })?;
        }
        store.insert(group)
    }

    /// Force the log to disk
    pub fn sync(&self) -> Result<(), StoreError> {
        match &self.wal {
            Some(wal) => wal.lock().sync(),
            None => Ok(()),
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("next_txn_id", &self.next_txn_id.load(Ordering::Relaxed))
            .field("durable", &self.is_durable())
            .finish()
    }
}
