//! Room and building models.
//!
//! Rooms are the physical resource exams occupy. Only seating capacity and
//! the owning building matter to the scheduler.

use serde::{Deserialize, Serialize};

use super::{BuildingId, RoomId};

/// An exam room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub room_id: RoomId,
    /// Seating capacity.
    pub capacity: u32,
    /// Owning building.
    pub building_id: BuildingId,
}

/// A building that owns rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Unique building identifier.
    pub building_id: BuildingId,
    /// Display name.
    pub name: String,
}

impl Room {
    /// Creates a new room.
    pub fn new(room_id: impl Into<RoomId>, capacity: u32, building_id: impl Into<BuildingId>) -> Self {
        Self {
            room_id: room_id.into(),
            capacity,
            building_id: building_id.into(),
        }
    }

    /// Whether the room seats `enrolled` students.
    #[inline]
    pub fn fits(&self, enrolled: u32) -> bool {
        self.capacity >= enrolled
    }
}

impl Building {
    /// Creates a new building.
    pub fn new(building_id: impl Into<BuildingId>, name: impl Into<String>) -> Self {
        Self {
            building_id: building_id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_fits() {
        let r = Room::new("R101", 40, "B1");
        assert!(r.fits(40));
        assert!(r.fits(0));
        assert!(!r.fits(41));
    }
}
