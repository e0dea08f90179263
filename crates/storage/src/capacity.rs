//! Capacity Store: one row per group
//!
//! # Design
//!
//! - DashMap keyed by GroupId: different groups never contend
//! - Each row carries two independent primitives:
//!   - a read latch (`RwLock<Group>`) guarding the committed state, held only
//!     for the duration of a copy
//!   - an exclusive row lock (`Mutex<()>`), held for a whole transaction
//! - Committed state can only be overwritten through a held [`RowLock`]
//!
//! Readers (availability snapshots, the optimistic pre-read) take the latch
//! and never wait on the row lock, so a pessimistic transaction holding a
//! row does not stall them.

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use seatguard_core::{Group, GroupId, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long a caller is willing to wait for a row lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// Fail immediately if another writer holds the row
    NoWait,
    /// Block up to the given duration
    Bounded(Duration),
}

/// A single Capacity Store row
#[derive(Debug)]
pub struct GroupRow {
    state: RwLock<Group>,
    lock: Mutex<()>,
}

impl GroupRow {
    fn new(group: Group) -> Self {
        Self {
            state: RwLock::new(group),
            lock: Mutex::new(()),
        }
    }

    /// Copy of the committed state
    ///
    /// Takes only the read latch; may be stale by the time it is used.
    #[inline]
    pub fn read(&self) -> Group {
        *self.state.read()
    }

    /// Acquire the exclusive row lock
    ///
    /// Returns `None` if the lock could not be taken within `wait`.
    /// The lock is released when the returned guard drops.
    pub fn lock(&self, wait: LockWait) -> Option<RowLock<'_>> {
        let guard = match wait {
            LockWait::NoWait => self.lock.try_lock()?,
            LockWait::Bounded(timeout) => self.lock.try_lock_for(timeout)?,
        };
        Some(RowLock {
            row: self,
            _guard: guard,
        })
    }

    /// True while some transaction holds the row lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

/// Proof of exclusive access to one group row
///
/// Obtained from [`GroupRow::lock`]. Every mutation of a group, and every
/// ledger insert for it, goes through one of these.
pub struct RowLock<'a> {
    row: &'a GroupRow,
    _guard: MutexGuard<'a, ()>,
}

impl RowLock<'_> {
    /// Group this lock covers
    pub fn group_id(&self) -> GroupId {
        self.row.read().id
    }

    /// Committed state under the lock
    ///
    /// Stable for as long as the lock is held.
    pub fn current(&self) -> Group {
        self.row.read()
    }

    /// Replace the committed state
    ///
    /// Rejects any write that would break the row invariants: identity and
    /// capacity are fixed, the count stays within capacity, and the version
    /// advances by exactly one.
    pub fn write(&mut self, next: Group) -> Result<(), StoreError> {
        let mut state = self.row.state.write();
        check_transition(&state, &next)?;
        *state = next;
        Ok(())
    }

    /// Check a write without applying it
    ///
    /// Stays valid for as long as this lock is held.
    pub fn check_write(&self, next: &Group) -> Result<(), StoreError> {
        check_transition(&self.current(), next)
    }
}

fn check_transition(current: &Group, next: &Group) -> Result<(), StoreError> {
    if next.id != current.id {
        return Err(StoreError::ConstraintViolation(format!(
            "row {} cannot be rewritten as group {}",
            current.id, next.id
        )));
    }
    if next.capacity != current.capacity {
        return Err(StoreError::ConstraintViolation(format!(
            "capacity of group {} is immutable ({} -> {})",
            current.id, current.capacity, next.capacity
        )));
    }
    if next.enrolled_count > next.capacity {
        return Err(StoreError::ConstraintViolation(format!(
            "group {} would hold {} of {} seats",
            current.id, next.enrolled_count, next.capacity
        )));
    }
    if next.version != current.version.next() {
        return Err(StoreError::ConstraintViolation(format!(
            "group {} version must advance from {} to {}, got {}",
            current.id,
            current.version,
            current.version.next(),
            next.version
        )));
    }
    Ok(())
}

impl std::fmt::Debug for RowLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowLock")
            .field("group", &self.current())
            .finish()
    }
}

/// Capacity Store
///
/// # Thread Safety
///
/// - `get()` / `snapshot()`: latch-only reads
/// - `row()`: clones the row handle out of the map so no DashMap shard
///   guard is held while a transaction runs
pub struct CapacityStore {
    rows: DashMap<GroupId, Arc<GroupRow>>,
    next_id: AtomicU64,
}

impl CapacityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reserve the next unused group id
    pub fn allocate_id(&self) -> GroupId {
        GroupId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Add a provisioned group
    ///
    /// Used by catalog provisioning and by recovery. The group must have a
    /// positive capacity and a count within it, and its id must be unused.
    pub fn insert(&self, group: Group) -> Result<(), StoreError> {
        if group.capacity == 0 {
            return Err(StoreError::InvalidCapacity {
                capacity: group.capacity,
            });
        }
        if group.enrolled_count > group.capacity {
            return Err(StoreError::ConstraintViolation(format!(
                "group {} holds {} of {} seats",
                group.id, group.enrolled_count, group.capacity
            )));
        }
        match self.rows.entry(group.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(StoreError::ConstraintViolation(format!(
                    "group {} already exists",
                    group.id
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(GroupRow::new(group)));
            }
        }
        self.next_id
            .fetch_max(group.id.get().saturating_add(1), Ordering::SeqCst);
        Ok(())
    }

    /// Row handle for transactional access
    pub fn row(&self, id: GroupId) -> Option<Arc<GroupRow>> {
        self.rows.get(&id).map(|row| Arc::clone(row.value()))
    }

    /// Committed state of one group
    pub fn get(&self, id: GroupId) -> Option<Group> {
        self.rows.get(&id).map(|row| row.read())
    }

    /// Check if a group exists
    pub fn contains(&self, id: GroupId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Committed state of every group, sorted by id
    ///
    /// Rows are read one at a time; the result is not a single atomic cut.
    pub fn snapshot(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.rows.iter().map(|row| row.read()).collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the store holds no groups
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for CapacityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapacityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityStore")
            .field("groups", &self.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}
