//! Teacher model.
//!
//! Teachers are the human resource of a timetable: each may teach a set of
//! subjects, is available in declared windows, and carries a preference
//! profile used by the soft objectives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::TimeSlot;

/// A teacher that can be assigned to lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Subject IDs this teacher is qualified for.
    pub subjects: Vec<String>,
    /// Availability windows. Empty = always available.
    pub availability: Vec<TimeSlot>,
    /// Soft preferences.
    pub preferences: TeacherPreferences,
    /// Travel minutes needed to reach a site (site_id → minutes).
    pub travel_minutes: HashMap<String, u32>,
    /// Maximum teaching hours on a single day.
    pub max_hours_per_day: u32,
    /// Contracted teaching hours per week.
    pub total_weekly_hours: u32,
}

/// Teacher preference profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherPreferences {
    /// Slots the teacher would like to teach in.
    pub preferred_slots: Vec<TimeSlot>,
    /// Slots the teacher would rather keep free.
    pub avoided_slots: Vec<TimeSlot>,
    /// Class IDs the teacher prefers.
    pub preferred_classes: Vec<String>,
    /// Longest run of back-to-back teaching hours.
    pub max_consecutive_hours: u32,
    /// Preferred weekdays (0 = Monday).
    pub preferred_days: Vec<u8>,
}

impl Default for TeacherPreferences {
    fn default() -> Self {
        Self {
            preferred_slots: Vec::new(),
            avoided_slots: Vec::new(),
            preferred_classes: Vec::new(),
            max_consecutive_hours: 4,
            preferred_days: Vec::new(),
        }
    }
}

impl Teacher {
    /// Creates a teacher with no qualifications and full availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            subjects: Vec::new(),
            availability: Vec::new(),
            preferences: TeacherPreferences::default(),
            travel_minutes: HashMap::new(),
            max_hours_per_day: 6,
            total_weekly_hours: 18,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Adds a qualified subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }

    /// Adds an availability window.
    pub fn with_availability(mut self, slot: TimeSlot) -> Self {
        self.availability.push(slot);
        self
    }

    /// Sets the preference profile.
    pub fn with_preferences(mut self, preferences: TeacherPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Sets the travel time to a site.
    pub fn with_travel(mut self, site_id: impl Into<String>, minutes: u32) -> Self {
        self.travel_minutes.insert(site_id.into(), minutes);
        self
    }

    /// Sets daily and weekly hour limits.
    pub fn with_hours(mut self, max_per_day: u32, total_weekly: u32) -> Self {
        self.max_hours_per_day = max_per_day;
        self.total_weekly_hours = total_weekly;
        self
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the teacher may teach the subject.
    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s == subject_id)
    }

    /// Whether the slot lies inside a declared availability window.
    ///
    /// A teacher without declared windows is always available.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        self.availability.is_empty() || self.availability.iter().any(|w| w.contains(slot))
    }

    /// Whether the slot overlaps a preferred slot.
    pub fn prefers(&self, slot: &TimeSlot) -> bool {
        self.preferences
            .preferred_slots
            .iter()
            .any(|p| p.overlaps(slot))
    }

    /// Whether the slot overlaps an avoided slot.
    pub fn avoids(&self, slot: &TimeSlot) -> bool {
        self.preferences
            .avoided_slots
            .iter()
            .any(|p| p.overlaps(slot))
    }

    /// Travel minutes to reach a site (0 if undeclared).
    pub fn travel_to(&self, site_id: &str) -> u32 {
        self.travel_minutes.get(site_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("T1")
            .with_name("Ada", "Rossi")
            .with_subject("MATH")
            .with_travel("S2", 20)
            .with_hours(5, 20);
        assert_eq!(t.full_name(), "Ada Rossi");
        assert!(t.can_teach("MATH"));
        assert!(!t.can_teach("ART"));
        assert_eq!(t.travel_to("S2"), 20);
        assert_eq!(t.travel_to("S9"), 0);
        assert_eq!(t.max_hours_per_day, 5);
    }

    #[test]
    fn test_empty_availability_means_always() {
        let t = Teacher::new("T1");
        assert!(t.is_available(&TimeSlot::new(5, 960, 1020)));
    }

    #[test]
    fn test_declared_availability() {
        let t = Teacher::new("T1").with_availability(TimeSlot::new(0, 480, 720));
        assert!(t.is_available(&TimeSlot::new(0, 480, 540)));
        assert!(!t.is_available(&TimeSlot::new(0, 690, 750)));
        assert!(!t.is_available(&TimeSlot::new(1, 480, 540)));
    }

    #[test]
    fn test_preferences() {
        let t = Teacher::new("T1").with_preferences(TeacherPreferences {
            preferred_slots: vec![TimeSlot::new(0, 480, 600)],
            avoided_slots: vec![TimeSlot::new(4, 900, 1020)],
            ..TeacherPreferences::default()
        });
        assert!(t.prefers(&TimeSlot::new(0, 540, 600)));
        assert!(!t.prefers(&TimeSlot::new(1, 540, 600)));
        assert!(t.avoids(&TimeSlot::new(4, 960, 1020)));
    }
}
