//! School class model.

use serde::{Deserialize, Serialize};

use super::TimeSlot;

/// Afternoon start used when a class has no explicit lunch break.
pub const DEFAULT_AFTERNOON_START_MIN: u32 = 13 * 60;

/// A group of students that attends lessons together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Unique class identifier.
    pub id: String,
    /// Display name (e.g., "1A").
    pub name: String,
    /// Section label.
    pub section: String,
    /// School year.
    pub year: u8,
    /// Number of students.
    pub size: u32,
    /// Home site of the class.
    pub site_id: String,
    /// Daily schedule policy.
    pub policy: ClassPolicy,
}

/// Length of a class's school day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    /// Regular day.
    #[default]
    Normal,
    /// Extended day with afternoon activities.
    Extended,
}

/// Daily schedule policy of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPolicy {
    /// Regular or extended day.
    pub day_type: DayType,
    /// Whether lessons may be placed after the lunch break.
    pub afternoon_sessions: bool,
    /// Break that must stay free, if any. Its `day` field is ignored; the
    /// break applies to every day.
    pub lunch_break: Option<TimeSlot>,
    /// Maximum lesson hours per day.
    pub max_hours_per_day: u32,
}

impl Default for ClassPolicy {
    fn default() -> Self {
        Self {
            day_type: DayType::Normal,
            afternoon_sessions: true,
            lunch_break: None,
            max_hours_per_day: 6,
        }
    }
}

impl ClassPolicy {
    /// Lunch break projected onto the given day.
    pub fn lunch_on(&self, day: u8) -> Option<TimeSlot> {
        self.lunch_break
            .map(|b| TimeSlot::new(day, b.start_min, b.end_min))
    }

    /// Whether `slot` overlaps the lunch break.
    pub fn overlaps_lunch(&self, slot: &TimeSlot) -> bool {
        self.lunch_on(slot.day).is_some_and(|l| l.overlaps(slot))
    }

    /// Minute the afternoon begins: the end of lunch, or 13:00 without one.
    pub fn afternoon_start_min(&self) -> u32 {
        self.lunch_break
            .map_or(DEFAULT_AFTERNOON_START_MIN, |b| b.end_min)
    }

    /// Whether `slot` starts in an afternoon the class does not attend.
    pub fn forbids_afternoon(&self, slot: &TimeSlot) -> bool {
        !self.afternoon_sessions && slot.start_min >= self.afternoon_start_min()
    }

    /// Whether a lesson may take `slot`.
    pub fn allows(&self, slot: &TimeSlot) -> bool {
        !self.overlaps_lunch(slot) && !self.forbids_afternoon(slot)
    }
}

impl SchoolClass {
    /// Creates a class at a site.
    pub fn new(id: impl Into<String>, site_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            section: String::new(),
            year: 1,
            size: 20,
            site_id: site_id.into(),
            policy: ClassPolicy::default(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of students.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets the schedule policy.
    pub fn with_policy(mut self, policy: ClassPolicy) -> Self {
        self.policy = policy;
        self
    }
}
