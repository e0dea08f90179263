//! Pessimistic enrollment: exclusive row lock
//!
//! Blocks on the group's row lock for at most the configured timeout, then
//! reads, checks and writes while holding it. Purely pessimistic callers on
//! one group are fully serialized and never see `Conflict`.

use super::validation::{check_admission, find_group};
use crate::database::Database;
use seatguard_core::{now, EnrollError, Enrollment, EnrollmentId, GroupId, StudentId};
use seatguard_storage::LockWait;
use std::time::Instant;
use tracing::{debug, warn};

pub(crate) fn enroll(
    db: &Database,
    group_id: GroupId,
    student_id: StudentId,
) -> Result<EnrollmentId, EnrollError> {
    let row = find_group(&db.groups, group_id)?;

    let timeout = db.config.lock_timeout();
    let started = Instant::now();
    let mut lock = match row.lock(LockWait::Bounded(timeout)) {
        Some(lock) => lock,
        None => {
            let waited_ms = started.elapsed().as_millis() as u64;
            warn!(%group_id, %student_id, waited_ms, "Pessimistic enroll: lock wait timed out");
            return Err(EnrollError::LockTimeout {
                group_id,
                waited_ms,
            });
        }
    };

    let current = lock.current();
    let next = check_admission(&current, student_id, &db.ledger)?;

    let mut txn = db.txn_manager.begin(group_id);
    txn.stage_admission(next, Enrollment::active(student_id, group_id, now()))?;
    let enrollment_id = db.txn_manager.commit(&mut txn, &mut lock, &db.ledger)?;
    debug!(%group_id, %student_id, txn_id = txn.txn_id, version = %next.version, "Pessimistic enroll committed");
    Ok(enrollment_id)
}
