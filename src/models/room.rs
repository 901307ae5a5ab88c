//! Room model.
//!
//! Rooms host lessons. Each has a type that decides which subjects it can
//! serve, a seating capacity, equipment tags, and an optional site.

use serde::{Deserialize, Serialize};

use super::Subject;

/// A room that can host lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Room classification.
    pub room_type: RoomType,
    /// Number of seats.
    pub capacity: u32,
    /// Equipment tags (e.g., "projector", "fume-hood").
    pub equipment: Vec<String>,
    /// Site (building/campus) the room belongs to.
    pub site_id: Option<String>,
}

/// Room type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    /// Regular classroom.
    Classroom,
    /// Laboratory.
    Lab,
    /// Gymnasium.
    Gym,
    /// Library.
    Library,
    /// Multi-purpose special room.
    Special,
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, room_type: RoomType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            room_type,
            capacity: 30,
            equipment: Vec::new(),
            site_id: None,
        }
    }

    /// Creates a regular classroom.
    pub fn classroom(id: impl Into<String>) -> Self {
        Self::new(id, RoomType::Classroom)
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Places the room at a site.
    pub fn with_site(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    /// Adds an equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.equipment.push(tag.into());
        self
    }

    /// Whether the room can host lessons of the subject.
    ///
    /// Subjects with a special-room requirement accept only that type.
    /// Other subjects accept classrooms and multi-purpose special rooms.
    pub fn suits(&self, subject: &Subject) -> bool {
        match subject.special_room {
            Some(required) => self.room_type == required,
            None => matches!(self.room_type, RoomType::Classroom | RoomType::Special),
        }
    }

    /// Whether the room seats `students`.
    #[inline]
    pub fn fits(&self, students: u32) -> bool {
        self.capacity >= students
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("LAB1", RoomType::Lab)
            .with_capacity(18)
            .with_site("NORTH")
            .with_equipment("fume-hood");
        assert_eq!(r.capacity, 18);
        assert_eq!(r.site_id.as_deref(), Some("NORTH"));
        assert_eq!(r.equipment, vec!["fume-hood".to_string()]);
        assert!(r.fits(18));
        assert!(!r.fits(19));
    }

    #[test]
    fn test_suitability_regular_subject() {
        let math = Subject::new("MATH");
        assert!(Room::classroom("R1").suits(&math));
        assert!(Room::new("S1", RoomType::Special).suits(&math));
        assert!(!Room::new("G1", RoomType::Gym).suits(&math));
        assert!(!Room::new("L1", RoomType::Lab).suits(&math));
    }

    #[test]
    fn test_suitability_special_subject() {
        let pe = Subject::new("PE").with_special_room(RoomType::Gym);
        assert!(Room::new("G1", RoomType::Gym).suits(&pe));
        assert!(!Room::classroom("R1").suits(&pe));
    }

    #[test]
    fn test_room_type_serde() {
        let json = serde_json::to_string(&RoomType::Library).unwrap();
        assert_eq!(json, "\"library\"");
    }
}
