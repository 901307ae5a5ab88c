//! Resource double-booking detection.
//!
//! For each resource axis (teacher, room, class) entries are grouped by the
//! resource ID and every pair within a group is tested for slot overlap.
//! Each overlapping pair yields exactly one high-severity [`Conflict`] on
//! that axis.
//!
//! # Complexity
//! O(Σ g²) over group sizes g. Groups are bounded by a weekly load (tens of
//! lessons), so the quadratic scan is cheap in practice.
//!
//! Detection is a pure pass: groups are visited in ID order and pairs in
//! (day, start, entry ID) order, so a given schedule always yields the same
//! conflicts in the same order.

use crate::models::{Conflict, ConflictType, Schedule, ScheduleEntry};

/// A resource dimension on which double-booking is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Shared teacher.
    Teacher,
    /// Shared room.
    Room,
    /// Shared class.
    Class,
}

impl Axis {
    /// All axes in reporting order.
    pub const ALL: [Axis; 3] = [Axis::Teacher, Axis::Room, Axis::Class];

    /// Conflict type produced on this axis.
    pub fn conflict_type(self) -> ConflictType {
        match self {
            Axis::Teacher => ConflictType::TeacherOverlap,
            Axis::Room => ConflictType::RoomOverlap,
            Axis::Class => ConflictType::ClassOverlap,
        }
    }

    fn resource_id(self, entry: &ScheduleEntry) -> &str {
        match self {
            Axis::Teacher => &entry.teacher_id,
            Axis::Room => &entry.room_id,
            Axis::Class => &entry.class_id,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Axis::Teacher => "Teacher",
            Axis::Room => "Room",
            Axis::Class => "Class",
        }
    }
}

/// Detects all double-bookings on all three axes.
///
/// # Examples
///
/// ```
/// use u_timetable::conflicts::detect;
/// use u_timetable::models::{Schedule, ScheduleEntry, TimeSlot};
///
/// let slot = TimeSlot::new(0, 480, 540);
/// let schedule = Schedule::with_entries("demo", vec![
///     ScheduleEntry::new(1, "T1", "1A", "MATH", "R1", slot),
///     ScheduleEntry::new(2, "T1", "1B", "MATH", "R2", slot),
/// ]);
/// let conflicts = detect(&schedule);
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].entry_ids, vec![1, 2]);
/// ```
pub fn detect(schedule: &Schedule) -> Vec<Conflict> {
    Axis::ALL
        .iter()
        .flat_map(|&axis| detect_axis(schedule, axis))
        .collect()
}

/// Detects double-bookings on a single axis.
pub fn detect_axis(schedule: &Schedule, axis: Axis) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (resource_id, entries) in schedule.grouped_by(|e| axis.resource_id(e)) {
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.slot.overlaps(&b.slot) {
                    conflicts.push(Conflict::overlap(
                        axis.conflict_type(),
                        a.id,
                        b.id,
                        format!(
                            "{} {} is double-booked on {} and {}",
                            axis.label(),
                            resource_id,
                            a.slot,
                            b.slot
                        ),
                    ));
                }
            }
        }
    }
    conflicts
}

/// Counts double-bookings on a single axis without building descriptions.
pub fn count_axis(schedule: &Schedule, axis: Axis) -> usize {
    schedule
        .grouped_by(|e| axis.resource_id(e))
        .values()
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    entries[i + 1..]
                        .iter()
                        .filter(|b| a.slot.overlaps(&b.slot))
                        .count()
                })
                .sum::<usize>()
        })
        .sum()
}

/// Counts double-bookings on all axes.
pub fn count(schedule: &Schedule) -> usize {
    Axis::ALL.iter().map(|&axis| count_axis(schedule, axis)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, TimeSlot};
    use std::collections::HashSet;

    fn entry(id: u32, teacher: &str, class: &str, room: &str, slot: TimeSlot) -> ScheduleEntry {
        ScheduleEntry::new(id, teacher, class, "MATH", room, slot)
    }

    #[test]
    fn test_no_conflicts() {
        let s = Schedule::with_entries(
            "ok",
            vec![
                entry(1, "T1", "1A", "R1", TimeSlot::new(0, 480, 540)),
                entry(2, "T1", "1A", "R1", TimeSlot::new(0, 540, 600)),
                entry(3, "T1", "1A", "R1", TimeSlot::new(1, 480, 540)),
            ],
        );
        assert!(detect(&s).is_empty());
        assert_eq!(count(&s), 0);
    }

    #[test]
    fn test_each_axis() {
        let slot = TimeSlot::new(2, 600, 660);
        let s = Schedule::with_entries(
            "all axes",
            vec![entry(1, "T1", "1A", "R1", slot), entry(2, "T1", "1A", "R1", slot)],
        );
        let conflicts = detect(&s);
        let types: Vec<_> = conflicts.iter().map(|c| c.conflict_type).collect();
        assert_eq!(
            types,
            vec![
                ConflictType::TeacherOverlap,
                ConflictType::RoomOverlap,
                ConflictType::ClassOverlap
            ]
        );
        assert!(conflicts.iter().all(|c| c.severity == Severity::High));
        assert!(conflicts.iter().all(|c| c.entry_ids == vec![1, 2]));
        assert_eq!(count(&s), 3);
    }

    #[test]
    fn test_partial_overlap_only_shared_resource() {
        let s = Schedule::with_entries(
            "room only",
            vec![
                entry(1, "T1", "1A", "R1", TimeSlot::new(0, 480, 540)),
                entry(2, "T2", "1B", "R1", TimeSlot::new(0, 510, 570)),
            ],
        );
        let conflicts = detect(&s);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::RoomOverlap);
        assert!(conflicts[0].description.contains("R1"));
    }

    #[test]
    fn test_one_conflict_per_pair() {
        let slot = TimeSlot::new(0, 480, 540);
        let s = Schedule::with_entries(
            "triple",
            vec![
                entry(3, "T1", "1A", "R1", slot),
                entry(1, "T1", "1B", "R2", slot),
                entry(2, "T1", "1C", "R3", slot),
            ],
        );
        let conflicts = detect_axis(&s, Axis::Teacher);
        assert_eq!(conflicts.len(), 3);
        let pairs: HashSet<Vec<u32>> = conflicts.iter().map(|c| c.entry_ids.clone()).collect();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&vec![1, 3]));
        assert!(pairs.contains(&vec![1, 2]));
        assert!(pairs.contains(&vec![2, 3]));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let slot = TimeSlot::new(0, 480, 540);
        let s = Schedule::with_entries(
            "repeat",
            vec![
                entry(1, "T1", "1A", "R1", slot),
                entry(2, "T1", "1B", "R1", slot),
                entry(3, "T2", "1B", "R2", TimeSlot::new(0, 500, 560)),
            ],
        );
        let first = detect(&s);
        for _ in 0..5 {
            assert_eq!(detect(&s), first);
        }
        assert_eq!(count(&s), first.len());
    }
}
