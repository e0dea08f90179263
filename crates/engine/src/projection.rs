//! Availability Projection
//!
//! Read-only view over the Capacity Store. Rows are copied under their read
//! latch; no row lock is taken, so a snapshot never waits on (or delays) an
//! enrollment. The result is advisory: a seat shown as available may be
//! gone by the time the caller acts on it.

use seatguard_core::{GroupAvailability, GroupId};
use seatguard_storage::CapacityStore;

/// Availability of every group, ordered by group id
pub(crate) fn snapshot(groups: &CapacityStore) -> Vec<GroupAvailability> {
    groups
        .snapshot()
        .iter()
        .map(GroupAvailability::from)
        .collect()
}

/// Availability of one group
pub(crate) fn availability(groups: &CapacityStore, group_id: GroupId) -> Option<GroupAvailability> {
    groups.get(group_id).as_ref().map(GroupAvailability::from)
}
