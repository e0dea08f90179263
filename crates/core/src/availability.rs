//! Availability Projection rows
//!
//! A [`GroupAvailability`] is an advisory, possibly stale view of one group.
//! Holding one never reserves a seat.

use crate::group::Group;
use crate::types::{GroupId, Version};
use serde::{Deserialize, Serialize};

/// Seat status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// At least one seat free
    Open,
    /// No seat free
    Full,
}

impl SeatStatus {
    /// Lowercase label (`"open"` / `"full"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Open => "open",
            SeatStatus::Full => "full",
        }
    }
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-group availability snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAvailability {
    /// Group identifier
    pub id: GroupId,
    /// Seat limit
    pub capacity: u32,
    /// Active enrollments at read time
    pub enrolled: u32,
    /// `capacity - enrolled`
    pub available: u32,
    /// Version observed; pass it back to an optimistic enrollment
    pub version: Version,
    /// `Full` when `available == 0`
    pub status: SeatStatus,
}

impl From<&Group> for GroupAvailability {
    fn from(group: &Group) -> Self {
        let available = group.available();
        Self {
            id: group.id,
            capacity: group.capacity,
            enrolled: group.enrolled_count,
            available,
            version: group.version,
            status: if available == 0 {
                SeatStatus::Full
            } else {
                SeatStatus::Open
            },
        }
    }
}
