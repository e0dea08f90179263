//! Group records (Capacity Store rows)

use crate::types::{GroupId, Version};
use serde::{Deserialize, Serialize};

/// A capacity-bounded course section
///
/// Invariants:
/// - `capacity > 0`, fixed at provisioning
/// - `0 <= enrolled_count <= capacity`
/// - `version` grows by exactly one per committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier
    pub id: GroupId,
    /// Maximum number of active enrollments
    pub capacity: u32,
    /// Current number of active enrollments
    pub enrolled_count: u32,
    /// Modification counter
    pub version: Version,
}

impl Group {
    /// A newly provisioned group: empty, at the initial version
    pub fn new(id: GroupId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            enrolled_count: 0,
            version: Version::INITIAL,
        }
    }

    /// Seats still free
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled_count)
    }

    /// True when no seat is left
    pub fn is_full(&self) -> bool {
        self.enrolled_count >= self.capacity
    }

    /// State after admitting one more student
    ///
    /// Returns `None` when the group is already full; the caller turns that
    /// into a capacity error before anything is staged.
    pub fn admitted(&self) -> Option<Group> {
        if self.is_full() {
            return None;
        }
        Some(Group {
            enrolled_count: self.enrolled_count + 1,
            version: self.version.next(),
            ..*self
        })
    }
}
