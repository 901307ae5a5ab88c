//! Schedule fitness.
//!
//! One scalar per schedule, higher is better:
//!
//! ```text
//! fitness = base
//!         - conflict    × |double-bookings|
//!         + preference  × teacher preference ratio
//!         + room_balance× room utilization balance
//!         - travel      × travel shortfalls
//!         + compactness × class compactness
//!         - unmet       × (weekly-hour deviation + availability breaches)
//! ```
//!
//! clamped to `>= 0`. Every term is a pure function of the schedule and the
//! catalog, so identical schedules always score identically.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::conflicts;
use crate::evaluator::{availability_breaches, class_day_gaps, hours_mismatches, travel_shortfalls};
use crate::models::{CatalogIndex, Schedule};

/// Compactness lost per long gap within one class day.
const GAP_COST: f64 = 0.2;

/// Fitness term weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Score of an empty, conflict-free schedule before bonuses.
    pub base: f64,
    /// Cost per double-booking.
    pub conflict: f64,
    /// Weight of the teacher preference ratio.
    pub preference: f64,
    /// Weight of room utilization balance.
    pub room_balance: f64,
    /// Cost per travel shortfall.
    pub travel: f64,
    /// Weight of class compactness.
    pub compactness: f64,
    /// Cost per unmet requirement unit.
    pub unmet: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            base: 1000.0,
            conflict: 50.0,
            preference: 100.0,
            room_balance: 50.0,
            travel: 30.0,
            compactness: 25.0,
            unmet: 40.0,
        }
    }
}

/// Raw fitness terms of one schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessBreakdown {
    /// Double-bookings across all axes.
    pub conflicts: usize,
    /// Teacher preference ratio in `[-0.5, 1]`.
    pub preference: f64,
    /// Room utilization balance in `[0, 1]`.
    pub room_balance: f64,
    /// Travel shortfalls.
    pub travel_violations: usize,
    /// Class compactness in `[0, 1]`.
    pub compactness: f64,
    /// Weekly-hour deviation plus availability breaches.
    pub unmet: u32,
}

impl FitnessBreakdown {
    /// Computes every term.
    pub fn compute(schedule: &Schedule, index: &CatalogIndex<'_>) -> Self {
        Self {
            conflicts: conflicts::count(schedule),
            preference: preference_satisfaction(schedule, index),
            room_balance: room_utilization_balance(schedule, index),
            travel_violations: travel_violation_count(schedule, index),
            compactness: compactness_score(schedule, index),
            unmet: unmet_requirements(schedule, index),
        }
    }

    /// Weighted, clamped score.
    pub fn score(&self, w: &FitnessWeights) -> f64 {
        let raw = w.base - w.conflict * self.conflicts as f64
            + w.preference * self.preference
            + w.room_balance * self.room_balance
            - w.travel * self.travel_violations as f64
            + w.compactness * self.compactness
            - w.unmet * self.unmet as f64;
        raw.max(0.0)
    }
}

/// Scores schedules with a fixed set of weights.
///
/// # Examples
///
/// ```
/// use u_timetable::fitness::FitnessFunction;
/// use u_timetable::models::{Catalog, Room, Schedule, ScheduleEntry, SchoolClass, Subject, Teacher, TimeSlot};
///
/// let catalog = Catalog::new()
///     .with_teacher(Teacher::new("T1").with_subject("MATH"))
///     .with_class(SchoolClass::new("1A", "MAIN"))
///     .with_subject(Subject::new("MATH").with_hours("1A", 1))
///     .with_room(Room::classroom("R1"));
/// let schedule = Schedule::with_entries("demo", vec![
///     ScheduleEntry::new(1, "T1", "1A", "MATH", "R1", TimeSlot::new(0, 480, 540)),
/// ]);
///
/// let f = FitnessFunction::default().evaluate(&schedule, &catalog.index());
/// assert_eq!(f, 1075.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitnessFunction {
    /// Term weights.
    pub weights: FitnessWeights,
}

impl FitnessFunction {
    /// Creates a fitness function with the given weights.
    pub fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    /// Scores a schedule.
    pub fn evaluate(&self, schedule: &Schedule, index: &CatalogIndex<'_>) -> f64 {
        FitnessBreakdown::compute(schedule, index).score(&self.weights)
    }
}

/// Mean preference score per entry: +1 in a preferred slot, -0.5 in an
/// avoided slot (both may apply). Zero for an empty schedule.
pub fn preference_satisfaction(schedule: &Schedule, index: &CatalogIndex<'_>) -> f64 {
    let mut total = 0usize;
    let mut score = 0.0;
    for e in &schedule.entries {
        let Some(teacher) = index.teacher(&e.teacher_id) else {
            continue;
        };
        total += 1;
        if teacher.prefers(&e.slot) {
            score += 1.0;
        }
        if teacher.avoids(&e.slot) {
            score -= 0.5;
        }
    }
    if total == 0 {
        0.0
    } else {
        score / total as f64
    }
}

/// `max(0, 1 - variance / 100)` of per-room entry counts over every
/// catalog room. A catalog without rooms is perfectly balanced.
pub fn room_utilization_balance(schedule: &Schedule, index: &CatalogIndex<'_>) -> f64 {
    let rooms = &index.catalog().rooms;
    if rooms.is_empty() {
        return 1.0;
    }
    let mut usage: HashMap<&str, f64> = rooms.iter().map(|r| (r.id.as_str(), 0.0)).collect();
    for e in &schedule.entries {
        if let Some(n) = usage.get_mut(e.room_id.as_str()) {
            *n += 1.0;
        }
    }
    let n = usage.len() as f64;
    let mean = usage.values().sum::<f64>() / n;
    let variance = usage.values().map(|u| (u - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance / 100.0).max(0.0)
}

/// Number of travel shortfalls.
pub fn travel_violation_count(schedule: &Schedule, index: &CatalogIndex<'_>) -> usize {
    travel_shortfalls(schedule, index).len()
}

/// Mean class compactness in `[0, 1]`.
///
/// A class day with two or more lessons scores `max(0, 1 - 0.2 × long gaps)`;
/// a class scores the mean of its such days (1 when it has none); the
/// schedule scores the mean over catalog classes (1 when there are none).
///
/// Day scores are averaged per class, not summed, and a class with no
/// multi-lesson day counts as fully compact rather than as zero.
pub fn compactness_score(schedule: &Schedule, index: &CatalogIndex<'_>) -> f64 {
    let classes = &index.catalog().classes;
    if classes.is_empty() {
        return 1.0;
    }

    let mut gaps_per_day: HashMap<(&str, u8), u32> = HashMap::new();
    for (a, _) in class_day_gaps(schedule) {
        if let Some(e) = schedule.entry(a) {
            *gaps_per_day.entry((e.class_id.as_str(), e.slot.day)).or_insert(0) += 1;
        }
    }

    let groups = schedule.grouped_by(|e| e.class_id.as_str());
    let total: f64 = classes
        .iter()
        .map(|class| {
            let Some(entries) = groups.get(class.id.as_str()) else {
                return 1.0;
            };
            let mut per_day: HashMap<u8, usize> = HashMap::new();
            for e in entries {
                *per_day.entry(e.slot.day).or_insert(0) += 1;
            }
            let scored: Vec<f64> = per_day
                .iter()
                .filter(|(_, n)| **n >= 2)
                .map(|(&day, _)| {
                    let gaps = gaps_per_day
                        .get(&(class.id.as_str(), day))
                        .copied()
                        .unwrap_or(0);
                    (1.0 - GAP_COST * gaps as f64).max(0.0)
                })
                .collect();
            if scored.is_empty() {
                1.0
            } else {
                scored.iter().sum::<f64>() / scored.len() as f64
            }
        })
        .sum();
    total / classes.len() as f64
}

/// Weekly-hour deviation units plus lessons outside teacher availability.
pub fn unmet_requirements(schedule: &Schedule, index: &CatalogIndex<'_>) -> u32 {
    let hours: u32 = hours_mismatches(schedule, index)
        .iter()
        .map(|m| m.deviation())
        .sum();
    hours + availability_breaches(schedule, index).len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, Room, ScheduleEntry, SchoolClass, Subject, Teacher, TeacherPreferences, TimeSlot};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_teacher(Teacher::new("T2").with_subject("MATH"))
            .with_class(SchoolClass::new("1A", "MAIN"))
            .with_class(SchoolClass::new("1B", "MAIN"))
            .with_subject(Subject::new("MATH").with_hours("1A", 2).with_hours("1B", 2))
            .with_room(Room::classroom("R1"))
            .with_room(Room::classroom("R2"))
    }

    fn entry(id: u32, teacher: &str, class: &str, room: &str, slot: TimeSlot) -> ScheduleEntry {
        ScheduleEntry::new(id, teacher, class, "MATH", room, slot)
    }

    fn complete() -> Schedule {
        Schedule::with_entries(
            "complete",
            vec![
                entry(1, "T1", "1A", "R1", TimeSlot::new(0, 480, 540)),
                entry(2, "T1", "1A", "R1", TimeSlot::new(1, 480, 540)),
                entry(3, "T2", "1B", "R2", TimeSlot::new(0, 480, 540)),
                entry(4, "T2", "1B", "R2", TimeSlot::new(1, 480, 540)),
            ],
        )
    }

    #[test]
    fn test_complete_schedule_score() {
        let c = catalog();
        let b = FitnessBreakdown::compute(&complete(), &c.index());
        assert_eq!(b.conflicts, 0);
        assert_eq!(b.unmet, 0);
        assert_eq!(b.room_balance, 1.0);
        assert_eq!(b.compactness, 1.0);
        assert_eq!(b.score(&FitnessWeights::default()), 1075.0);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let c = catalog();
        let idx = c.index();
        let f = FitnessFunction::default();
        let s = complete();
        let first = f.evaluate(&s, &idx);
        for _ in 0..5 {
            assert_eq!(f.evaluate(&s, &idx), first);
        }
    }

    #[test]
    fn test_removing_overlap_raises_fitness() {
        let c = catalog();
        let idx = c.index();
        let f = FitnessFunction::default();
        let mut clash = complete();
        // T1 teaches 1B too, at the same time as 1A
        clash.entries[2].teacher_id = "T1".into();
        let clean = complete();
        assert!(f.evaluate(&clean, &idx) > f.evaluate(&clash, &idx));
    }

    #[test]
    fn test_incomplete_scores_lower() {
        let c = catalog();
        let idx = c.index();
        let f = FitnessFunction::default();
        let mut partial = complete();
        partial.entries.pop();
        assert_eq!(unmet_requirements(&partial, &idx), 1);
        assert!(f.evaluate(&complete(), &idx) > f.evaluate(&partial, &idx));
    }

    #[test]
    fn test_clamped_at_zero() {
        let c = catalog();
        let slot = TimeSlot::new(0, 480, 540);
        let pile = Schedule::with_entries(
            "pile",
            (1..=12).map(|i| entry(i, "T1", "1A", "R1", slot)).collect(),
        );
        assert_eq!(FitnessFunction::default().evaluate(&pile, &c.index()), 0.0);
    }

    #[test]
    fn test_preference_satisfaction() {
        let mut c = catalog();
        c.teachers[0] = Teacher::new("T1").with_subject("MATH").with_preferences(TeacherPreferences {
            preferred_slots: vec![TimeSlot::new(0, 480, 720)],
            avoided_slots: vec![TimeSlot::new(1, 480, 720)],
            ..TeacherPreferences::default()
        });
        let idx = c.index();
        // T1: +1 and -0.5, T2: 0 and 0
        assert!((preference_satisfaction(&complete(), &idx) - 0.125).abs() < 1e-12);
        assert_eq!(preference_satisfaction(&Schedule::new("empty"), &idx), 0.0);
    }

    #[test]
    fn test_room_balance() {
        let c = catalog();
        let idx = c.index();
        let mut lopsided = complete();
        for e in &mut lopsided.entries {
            e.room_id = "R1".into();
        }
        // usage [4, 0], mean 2, variance 4
        assert!((room_utilization_balance(&lopsided, &idx) - 0.96).abs() < 1e-12);
    }

    #[test]
    fn test_compactness_per_class() {
        let c = catalog();
        let s = Schedule::with_entries(
            "gappy",
            vec![
                entry(1, "T1", "1A", "R1", TimeSlot::new(0, 480, 540)),
                entry(2, "T1", "1A", "R1", TimeSlot::new(0, 720, 780)),
                entry(3, "T2", "1B", "R2", TimeSlot::new(0, 480, 540)),
                entry(4, "T2", "1B", "R2", TimeSlot::new(0, 540, 600)),
            ],
        );
        // 1A: one long gap -> 0.8, 1B: 1.0
        assert!((compactness_score(&s, &c.index()) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_compactness_averages_days() {
        let c = catalog();
        let s = Schedule::with_entries(
            "spread",
            vec![
                // 1A: Monday has one long gap, Tuesday none
                entry(1, "T1", "1A", "R1", TimeSlot::new(0, 480, 540)),
                entry(2, "T1", "1A", "R1", TimeSlot::new(0, 720, 780)),
                entry(3, "T1", "1A", "R1", TimeSlot::new(1, 480, 540)),
                entry(4, "T1", "1A", "R1", TimeSlot::new(1, 540, 600)),
                // 1B: single lessons only
                entry(5, "T2", "1B", "R2", TimeSlot::new(2, 480, 540)),
                entry(6, "T2", "1B", "R2", TimeSlot::new(3, 480, 540)),
            ],
        );
        // 1A: (0.8 + 1.0) / 2 = 0.9, 1B: 1.0
        assert!((compactness_score(&s, &c.index()) - 0.95).abs() < 1e-12);
    }
}
