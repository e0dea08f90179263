//! WAL replay
//!
//! Rebuilds both stores from the entries recovered by `Wal::open`. Entries
//! go through the same row-lock write path as live commits, so a log that
//! would break a store invariant fails recovery instead of loading.

use seatguard_core::StoreError;
use seatguard_durability::WalEntry;
use seatguard_storage::{CapacityStore, EnrollmentLedger, LockWait};

/// Recovery summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Groups provisioned
    pub groups: usize,
    /// Admissions replayed
    pub admissions: usize,
    /// Highest transaction id seen
    pub max_txn_id: u64,
}

impl RecoveryStats {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "recovered {} groups and {} admissions (max txn {})",
            self.groups, self.admissions, self.max_txn_id
        )
    }
}

/// Apply `entries` in order to empty stores
pub(crate) fn replay(
    entries: Vec<WalEntry>,
    groups: &CapacityStore,
    ledger: &EnrollmentLedger,
) -> Result<RecoveryStats, StoreError> {
    let mut stats = RecoveryStats::default();
    for entry in entries {
        match entry {
            WalEntry::GroupRegistered { group } => {
                groups.insert(group)?;
                stats.groups += 1;
            }
            WalEntry::Admission {
                txn_id,
                group,
                enrollment,
            } => {
                let row = groups
                    .row(group.id)
                    .ok_or(StoreError::UnknownGroup { group_id: group.id })?;
                let mut lock = row.lock(LockWait::NoWait).ok_or_else(|| {
                    StoreError::ConstraintViolation(format!(
                        "group {} locked during recovery",
                        group.id
                    ))
                })?;
                lock.check_write(&group)?;
                ledger.insert(&lock, enrollment)?;
                lock.write(group)?;
                stats.admissions += 1;
                stats.max_txn_id = stats.max_txn_id.max(txn_id);
            }
        }
    }
    Ok(stats)
}
