//! Checks shared by both enrollment strategies
//!
//! `NotFound`, `DuplicateEnrollment` and `CapacityExceeded` are decided here
//! and nowhere else, so the two paths cannot drift apart.

use seatguard_core::{EnrollError, Group, GroupId, StudentId};
use seatguard_storage::{CapacityStore, EnrollmentLedger, GroupRow};
use std::sync::Arc;

/// Row handle of an existing group
pub(crate) fn find_group(
    groups: &CapacityStore,
    group_id: GroupId,
) -> Result<Arc<GroupRow>, EnrollError> {
    groups
        .row(group_id)
        .ok_or(EnrollError::NotFound { group_id })
}

/// Row state after admitting `student_id` into `group`
///
/// Duplicate check first, then capacity: a student already holding a seat
/// in a full group is told about the duplicate.
pub(crate) fn check_admission(
    group: &Group,
    student_id: StudentId,
    ledger: &EnrollmentLedger,
) -> Result<Group, EnrollError> {
    if let Some(existing) = ledger.active_enrollment(student_id, group.id) {
        return Err(EnrollError::DuplicateEnrollment {
            student_id,
            group_id: group.id,
            existing,
        });
    }
    group.admitted().ok_or(EnrollError::CapacityExceeded {
        group_id: group.id,
        enrolled: group.enrolled_count,
        capacity: group.capacity,
    })
}
