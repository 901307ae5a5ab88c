//! Random-greedy schedule construction.
//!
//! # Algorithm
//!
//! For every (class, subject) pair with positive weekly hours, in catalog
//! order, and for each required hour:
//! 1. Pick a random qualified teacher.
//! 2. Pick a random slot from the teacher's candidate slots that the
//!    class policy allows.
//! 3. Pick a random compatible room free in that slot, preferring rooms
//!    that seat the whole class.
//! 4. Accept iff neither the teacher nor the class already has an
//!    overlapping lesson.
//!
//! Up to `attempts_per_hour` tries are made per hour; an hour that cannot be
//! placed is dropped, producing an incomplete (and low-fitness) candidate
//! instead of stalling.
//!
//! # Complexity
//! O(H × A × n) where H = required hours, A = attempts, n = entries placed.

use std::collections::HashMap;

use rand::Rng;
use rand::prelude::IndexedRandom;

use crate::models::{
    Catalog, CatalogIndex, EntryId, Room, Schedule, ScheduleEntry, TimeSlot, WeeklyGrid,
};

/// Slots offered to each teacher.
///
/// A teacher with declared availability gets the grid slots inside it; a
/// teacher without declarations, or whose windows contain no grid slot,
/// gets the whole grid.
#[derive(Debug, Clone)]
pub struct SlotPool {
    grid: Vec<TimeSlot>,
    by_teacher: HashMap<String, Vec<TimeSlot>>,
}

impl SlotPool {
    /// Builds the pool for a catalog and grid.
    pub fn new(catalog: &Catalog, grid: &WeeklyGrid) -> Self {
        let grid = grid.slots();
        let by_teacher = catalog
            .teachers
            .iter()
            .filter(|t| !t.availability.is_empty())
            .filter_map(|t| {
                let own: Vec<TimeSlot> = grid.iter().copied().filter(|s| t.is_available(s)).collect();
                (!own.is_empty()).then(|| (t.id.clone(), own))
            })
            .collect();
        Self { grid, by_teacher }
    }

    /// Every grid slot.
    pub fn grid(&self) -> &[TimeSlot] {
        &self.grid
    }

    /// Slots offered to a teacher.
    pub fn for_teacher(&self, teacher_id: &str) -> &[TimeSlot] {
        self.by_teacher
            .get(teacher_id)
            .map_or(self.grid.as_slice(), Vec::as_slice)
    }
}

/// Builds one random candidate schedule.
pub fn construct<R: Rng>(
    index: &CatalogIndex<'_>,
    pool: &SlotPool,
    attempts_per_hour: usize,
    rng: &mut R,
) -> Schedule {
    let catalog = index.catalog();
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    for class in &catalog.classes {
        for subject in &catalog.subjects {
            let hours = subject.hours_for(&class.id);
            if hours == 0 {
                continue;
            }
            let teachers = index.qualified_teachers(&subject.id);
            let rooms = index.compatible_rooms(&subject.id);
            if teachers.is_empty() || rooms.is_empty() {
                continue;
            }

            for _ in 0..hours {
                for _ in 0..attempts_per_hour {
                    let Some(teacher) = teachers.choose(rng) else {
                        break;
                    };
                    let Some(&slot) = pool.for_teacher(&teacher.id).choose(rng) else {
                        break;
                    };
                    if !class.policy.allows(&slot) {
                        continue;
                    }
                    let busy = entries.iter().any(|e| {
                        (e.teacher_id == teacher.id || e.class_id == class.id)
                            && e.slot.overlaps(&slot)
                    });
                    if busy {
                        continue;
                    }
                    let Some(room) = pick_room(rooms, &entries, &slot, class.size, rng) else {
                        continue;
                    };
                    let id = entries.len() as EntryId + 1;
                    entries.push(ScheduleEntry::new(
                        id,
                        teacher.id.as_str(),
                        class.id.as_str(),
                        subject.id.as_str(),
                        room.id.as_str(),
                        slot,
                    ));
                    break;
                }
            }
        }
    }

    Schedule::with_entries("Generated schedule", entries)
}

/// A random compatible room free during `slot`, preferring rooms that fit.
fn pick_room<'r, R: Rng>(
    rooms: &[&'r Room],
    entries: &[ScheduleEntry],
    slot: &TimeSlot,
    class_size: u32,
    rng: &mut R,
) -> Option<&'r Room> {
    let free: Vec<&'r Room> = rooms
        .iter()
        .copied()
        .filter(|r| {
            !entries
                .iter()
                .any(|e| e.room_id == r.id && e.slot.overlaps(slot))
        })
        .collect();
    let fitting: Vec<&'r Room> = free.iter().copied().filter(|r| r.fits(class_size)).collect();
    if fitting.is_empty() {
        free.choose(rng).copied()
    } else {
        fitting.choose(rng).copied()
    }
}
