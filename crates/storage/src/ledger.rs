//! Enrollment Ledger
//!
//! Sharded by GroupId like the Capacity Store, with an FxHashMap index of
//! active enrollments per group. Inserting requires the group's
//! [`RowLock`], so the ledger and the group counter always change under the
//! same exclusion.

use crate::capacity::RowLock;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use seatguard_core::{Enrollment, EnrollmentId, GroupId, StoreError, StudentId};

/// Per-group ledger shard
#[derive(Debug, Default)]
struct GroupLedger {
    /// Every enrollment of the group, in insertion order
    entries: Vec<Enrollment>,
    /// Active enrollment per student
    active: FxHashMap<StudentId, EnrollmentId>,
}

/// Enrollment Ledger
#[derive(Debug, Default)]
pub struct EnrollmentLedger {
    groups: DashMap<GroupId, GroupLedger>,
}

impl EnrollmentLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Active enrollment held by `student` in `group`, if any
    pub fn active_enrollment(&self, student: StudentId, group: GroupId) -> Option<EnrollmentId> {
        self.groups
            .get(&group)
            .and_then(|ledger| ledger.active.get(&student).copied())
    }

    /// Number of active enrollments in `group`
    pub fn active_count(&self, group: GroupId) -> usize {
        self.groups
            .get(&group)
            .map(|ledger| ledger.active.len())
            .unwrap_or(0)
    }

    /// Verify that `enrollment` may be inserted
    ///
    /// Enforces the unique index on active `(student_id, group_id)` pairs.
    pub fn check_insert(&self, enrollment: &Enrollment) -> Result<(), StoreError> {
        if !enrollment.is_active() {
            return Ok(());
        }
        if let Some(existing) = self.active_enrollment(enrollment.student_id, enrollment.group_id)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "student {} already holds enrollment {} in group {}",
                enrollment.student_id, existing, enrollment.group_id
            )));
        }
        Ok(())
    }

    /// Insert an enrollment under the group's row lock
    pub fn insert(&self, lock: &RowLock<'_>, enrollment: Enrollment) -> Result<(), StoreError> {
        if lock.group_id() != enrollment.group_id {
            return Err(StoreError::ConstraintViolation(format!(
                "enrollment for group {} inserted under the lock of group {}",
                enrollment.group_id,
                lock.group_id()
            )));
        }
        self.check_insert(&enrollment)?;
        let mut ledger = self.groups.entry(enrollment.group_id).or_default();
        if enrollment.is_active() {
            ledger.active.insert(enrollment.student_id, enrollment.id);
        }
        ledger.entries.push(enrollment);
        Ok(())
    }

    /// A student's active enrollments, newest first
    pub fn for_student(&self, student: StudentId) -> Vec<Enrollment> {
        let mut results: Vec<Enrollment> = self
            .groups
            .iter()
            .flat_map(|ledger| {
                ledger
                    .entries
                    .iter()
                    .filter(|e| e.student_id == student && e.is_active())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        newest_first(&mut results);
        results
    }

    /// Every enrollment of every status, newest first
    pub fn history(&self) -> Vec<Enrollment> {
        let mut results: Vec<Enrollment> = self
            .groups
            .iter()
            .flat_map(|ledger| ledger.entries.clone())
            .collect();
        newest_first(&mut results);
        results
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.groups.iter().map(|ledger| ledger.entries.len()).sum()
    }

    /// Check if the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn newest_first(entries: &mut [Enrollment]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
