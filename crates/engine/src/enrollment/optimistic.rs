//! Optimistic enrollment: version compare-and-swap
//!
//! The caller submits the version it last observed. The attempt fails with
//! `Conflict` if that version is no longer current, either at the pre-read
//! or at the conditional write. The conditional write takes the group's row
//! lock, so it also excludes pessimistic writers. A busy row whose version
//! has already moved fails at once; a busy row at the expected version is
//! waited for (bounded by the lock timeout), since the holder may end
//! without committing.

use super::validation::{check_admission, find_group};
use crate::database::Database;
use seatguard_core::{now, EnrollError, Enrollment, EnrollmentId, GroupId, StudentId, Version};
use seatguard_storage::LockWait;
use std::time::Instant;
use tracing::{debug, warn};

pub(crate) fn enroll(
    db: &Database,
    group_id: GroupId,
    student_id: StudentId,
    expected: Version,
) -> Result<EnrollmentId, EnrollError> {
    let row = find_group(&db.groups, group_id)?;

    // Pre-read: latch only
    let observed = row.read();
    if observed.version != expected {
        debug!(%group_id, %student_id, %expected, actual = %observed.version, "Optimistic enroll: stale version");
        return Err(EnrollError::Conflict {
            group_id,
            expected,
            actual: observed.version,
        });
    }

    let next = check_admission(&observed, student_id, &db.ledger)?;

    let mut txn = db.txn_manager.begin(group_id);
    txn.stage_admission(next, Enrollment::active(student_id, group_id, now()))?;

    // Conditional write: `WHERE id = group_id AND version = expected`
    let mut lock = match row.lock(LockWait::NoWait) {
        Some(lock) => lock,
        None => {
            let actual = row.read().version;
            if actual != expected {
                db.txn_manager.abort(&mut txn, "version changed while row busy");
                debug!(%group_id, %student_id, txn_id = txn.txn_id, %actual, "Optimistic enroll: row busy, version moved");
                return Err(EnrollError::Conflict {
                    group_id,
                    expected,
                    actual,
                });
            }
            let timeout = db.config.lock_timeout();
            let started = Instant::now();
            match row.lock(LockWait::Bounded(timeout)) {
                Some(lock) => lock,
                None => {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    db.txn_manager.abort(&mut txn, "row lock wait timed out");
                    warn!(%group_id, %student_id, waited_ms, "Optimistic enroll: lock wait timed out");
                    return Err(EnrollError::LockTimeout {
                        group_id,
                        waited_ms,
                    });
                }
            }
        }
    };
    let current = lock.current();
    if current.version != expected {
        db.txn_manager.abort(&mut txn, "version changed before write");
        debug!(%group_id, %student_id, txn_id = txn.txn_id, actual = %current.version, "Optimistic enroll: lost race");
        return Err(EnrollError::Conflict {
            group_id,
            expected,
            actual: current.version,
        });
    }

    let enrollment_id = db.txn_manager.commit(&mut txn, &mut lock, &db.ledger)?;
    debug!(%group_id, %student_id, txn_id = txn.txn_id, version = %expected.next(), "Optimistic enroll committed");
    Ok(enrollment_id)
}
