//! Schedule (solution) model.
//!
//! A schedule is a set of lesson entries, each binding a teacher, class,
//! subject, and room to one weekly time slot. Conflicts are derived data:
//! they are recomputed from the entries and never edited on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::TimeSlot;

/// Identifier of an entry, unique within its schedule.
pub type EntryId = u32;

/// A complete candidate timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Display name.
    pub name: String,
    /// Lesson entries.
    pub entries: Vec<ScheduleEntry>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
    /// Fitness score, once evaluated.
    pub fitness: Option<f64>,
    /// Conflicts detected in this schedule.
    pub conflicts: Vec<Conflict>,
}

/// One scheduled lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Entry ID.
    pub id: EntryId,
    /// Assigned teacher ID.
    pub teacher_id: String,
    /// Attending class ID.
    pub class_id: String,
    /// Taught subject ID.
    pub subject_id: String,
    /// Hosting room ID.
    pub room_id: String,
    /// When the lesson takes place.
    pub slot: TimeSlot,
    /// Lesson kind.
    pub kind: EntryKind,
}

/// Kind of lesson entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Ordinary lesson.
    #[default]
    Regular,
    /// Covered by a substitute teacher.
    Substitution,
    /// Support lesson.
    Support,
}

/// A resource double-booking or rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Type of conflict.
    pub conflict_type: ConflictType,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
    /// Implicated entry IDs, ascending.
    pub entry_ids: Vec<EntryId>,
}

/// Classification of conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// One teacher in two lessons at once.
    TeacherOverlap,
    /// One room hosting two lessons at once.
    RoomOverlap,
    /// One class attending two lessons at once.
    ClassOverlap,
    /// Any other rule violation.
    ConstraintViolation,
}

/// Conflict severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor.
    Low,
    /// Noticeable.
    Medium,
    /// Breaks the timetable.
    High,
}

impl ScheduleEntry {
    /// Creates a regular entry.
    pub fn new(
        id: EntryId,
        teacher_id: impl Into<String>,
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
        room_id: impl Into<String>,
        slot: TimeSlot,
    ) -> Self {
        Self {
            id,
            teacher_id: teacher_id.into(),
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            room_id: room_id.into(),
            slot,
            kind: EntryKind::Regular,
        }
    }

    /// Sets the entry kind.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.slot.duration_minutes()
    }
}

impl Conflict {
    /// Creates a high-severity overlap conflict between two entries.
    pub fn overlap(
        conflict_type: ConflictType,
        a: EntryId,
        b: EntryId,
        description: impl Into<String>,
    ) -> Self {
        Self {
            conflict_type,
            severity: Severity::High,
            description: description.into(),
            entry_ids: vec![a.min(b), a.max(b)],
        }
    }

    /// Creates a rule-violation conflict.
    pub fn violation(
        severity: Severity,
        entry_ids: Vec<EntryId>,
        description: impl Into<String>,
    ) -> Self {
        let mut entry_ids = entry_ids;
        entry_ids.sort_unstable();
        Self {
            conflict_type: ConflictType::ConstraintViolation,
            severity,
            description: description.into(),
            entry_ids,
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new("Untitled schedule")
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            entries: Vec::new(),
            created_at: now,
            modified_at: now,
            fitness: None,
            conflicts: Vec::new(),
        }
    }

    /// Creates a schedule from entries.
    pub fn with_entries(name: impl Into<String>, entries: Vec<ScheduleEntry>) -> Self {
        let mut s = Self::new(name);
        s.entries = entries;
        s
    }

    /// Adds an entry and bumps the modification time.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
        self.touch();
    }

    /// Marks the schedule as modified now.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Next free entry ID.
    pub fn next_entry_id(&self) -> EntryId {
        self.entries.iter().map(|e| e.id).max().map_or(1, |m| m + 1)
    }

    /// Reassigns entry IDs as `1..=n` in list order.
    pub fn renumber(&mut self) {
        for (i, e) in self.entries.iter_mut().enumerate() {
            e.id = i as EntryId + 1;
        }
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no recorded conflicts.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Finds an entry by ID.
    pub fn entry(&self, id: EntryId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries taught by a teacher.
    pub fn entries_for_teacher(&self, teacher_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.teacher_id == teacher_id)
            .collect()
    }

    /// Entries attended by a class.
    pub fn entries_for_class(&self, class_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.class_id == class_id)
            .collect()
    }

    /// Entries hosted by a room.
    pub fn entries_for_room(&self, room_id: &str) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.room_id == room_id).collect()
    }

    /// Number of entries per (class, subject) pair.
    pub fn hours_by_class_subject(&self) -> HashMap<(&str, &str), u32> {
        let mut counts = HashMap::new();
        for e in &self.entries {
            *counts
                .entry((e.class_id.as_str(), e.subject_id.as_str()))
                .or_insert(0) += 1;
        }
        counts
    }

    /// Groups entries by a key, each group sorted by (day, start).
    ///
    /// Groups are returned in key order so callers iterate deterministically.
    pub fn grouped_by<'a, K, F>(&'a self, key: F) -> BTreeMap<K, Vec<&'a ScheduleEntry>>
    where
        K: Ord,
        F: Fn(&'a ScheduleEntry) -> K,
    {
        let mut groups: BTreeMap<K, Vec<&ScheduleEntry>> = BTreeMap::new();
        for e in &self.entries {
            groups.entry(key(e)).or_default().push(e);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|e| (e.slot.day, e.slot.start_min, e.id));
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new("test");
        s.add_entry(ScheduleEntry::new(1, "T1", "1A", "MATH", "R1", TimeSlot::new(0, 540, 600)));
        s.add_entry(ScheduleEntry::new(2, "T1", "1B", "MATH", "R1", TimeSlot::new(0, 480, 540)));
        s.add_entry(ScheduleEntry::new(3, "T2", "1A", "ART", "R2", TimeSlot::new(1, 480, 540)));
        s
    }

    #[test]
    fn test_entry_lookup() {
        let s = sample_schedule();
        assert_eq!(s.entry(3).unwrap().subject_id, "ART");
        assert!(s.entry(99).is_none());
        assert_eq!(s.entry_count(), 3);
    }

    #[test]
    fn test_filters() {
        let s = sample_schedule();
        assert_eq!(s.entries_for_teacher("T1").len(), 2);
        assert_eq!(s.entries_for_class("1A").len(), 2);
        assert_eq!(s.entries_for_room("R2").len(), 1);
    }

    #[test]
    fn test_hours_by_class_subject() {
        let s = sample_schedule();
        let hours = s.hours_by_class_subject();
        assert_eq!(hours[&("1A", "MATH")], 1);
        assert_eq!(hours[&("1B", "MATH")], 1);
        assert_eq!(hours.get(&("1B", "ART")), None);
    }

    #[test]
    fn test_grouped_by_sorts_by_time() {
        let s = sample_schedule();
        let by_teacher = s.grouped_by(|e| e.teacher_id.as_str());
        let t1: Vec<_> = by_teacher["T1"].iter().map(|e| e.id).collect();
        assert_eq!(t1, vec![2, 1]);
        assert_eq!(by_teacher.keys().copied().collect::<Vec<_>>(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_renumber_and_next_id() {
        let mut s = sample_schedule();
        s.entries.remove(0);
        assert_eq!(s.next_entry_id(), 4);
        s.renumber();
        assert_eq!(s.entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(s.next_entry_id(), 3);
        assert_eq!(Schedule::default().next_entry_id(), 1);
    }

    #[test]
    fn test_conflict_factories() {
        let c = Conflict::overlap(ConflictType::RoomOverlap, 7, 3, "R1 double-booked");
        assert_eq!(c.entry_ids, vec![3, 7]);
        assert_eq!(c.severity, Severity::High);

        let v = Conflict::violation(Severity::Low, vec![5, 2, 9], "gap");
        assert_eq!(v.conflict_type, ConflictType::ConstraintViolation);
        assert_eq!(v.entry_ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_schedule_serde() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, s.entries);
        assert!(json.contains("\"regular\""));
    }
}
