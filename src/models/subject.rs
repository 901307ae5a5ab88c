//! Subject model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RoomType;

/// A taught subject and its weekly demand per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short code.
    pub code: String,
    /// Required weekly hours per class (class_id → hours).
    pub weekly_hours: BTreeMap<String, u32>,
    /// Room type required, if the subject cannot use a regular classroom.
    pub special_room: Option<RoomType>,
    /// Whether weekly hours may be spread over several sessions.
    pub can_be_split: bool,
    /// Whether same-day hours must be taught back-to-back.
    pub requires_continuity: bool,
}

impl Subject {
    /// Creates a subject without demand.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            code: id.clone(),
            id,
            weekly_hours: BTreeMap::new(),
            special_room: None,
            can_be_split: true,
            requires_continuity: false,
        }
    }

    /// Sets the weekly hours for a class.
    pub fn with_hours(mut self, class_id: impl Into<String>, hours: u32) -> Self {
        self.weekly_hours.insert(class_id.into(), hours);
        self
    }

    /// Requires a room of the given type.
    pub fn with_special_room(mut self, room_type: RoomType) -> Self {
        self.special_room = Some(room_type);
        self
    }

    /// Requires same-day hours to be consecutive.
    pub fn with_continuity(mut self) -> Self {
        self.requires_continuity = true;
        self
    }

    /// Weekly hours required for a class (0 if none).
    pub fn hours_for(&self, class_id: &str) -> u32 {
        self.weekly_hours.get(class_id).copied().unwrap_or(0)
    }

    /// Whether the subject needs a special room.
    pub fn requires_special_room(&self) -> bool {
        self.special_room.is_some()
    }
}
