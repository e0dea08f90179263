//! WAL entry types
//!
//! - GroupRegistered: a group provisioned by the catalog
//! - Admission: one committed enrollment transaction
//!
//! A transaction writes exactly one entry, so the entry itself is the
//! commit record. A torn entry is discarded on recovery and the
//! transaction it described never happened.

use seatguard_core::{Enrollment, Group, GroupId};
use serde::{Deserialize, Serialize};

/// WAL entry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalEntry {
    /// Group provisioned
    GroupRegistered {
        /// Initial row state
        group: Group,
    },

    /// Committed admission
    ///
    /// Carries the full post-commit row, not a delta, so replay can check
    /// that versions advance one step at a time.
    Admission {
        /// Transaction identifier
        txn_id: u64,
        /// Row state after the commit
        group: Group,
        /// Inserted ledger record
        enrollment: Enrollment,
    },
}

impl WalEntry {
    /// Group the entry touches
    pub fn group_id(&self) -> GroupId {
        match self {
            WalEntry::GroupRegistered { group } => group.id,
            WalEntry::Admission { group, .. } => group.id,
        }
    }

    /// Transaction id, for admissions
    pub fn txn_id(&self) -> Option<u64> {
        match self {
            WalEntry::Admission { txn_id, .. } => Some(*txn_id),
            WalEntry::GroupRegistered { .. } => None,
        }
    }
}
