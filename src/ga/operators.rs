//! Genetic operators for timetable candidates.
//!
//! - [`single_point_crossover`]: prefix of one parent's entries, suffix of
//!   the other's, cut at a random index.
//! - [`dedup_by_class_slot`]: repairs offspring so a class never holds two
//!   lessons starting at the same (day, start).
//! - [`tournament_select`]: k-way tournament on a fitness vector.
//! - [`MutationKind`]: which aspect of an entry a mutation step changes.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//! Machine Learning", Ch. 1 (selection, crossover, mutation)

use std::collections::HashMap;

use rand::Rng;

use crate::models::ScheduleEntry;

/// Aspect of a lesson changed by one mutation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Move the lesson to another slot.
    Slot,
    /// Move the lesson to another compatible room.
    Room,
    /// Hand the lesson to another qualified teacher.
    Teacher,
}

impl MutationKind {
    /// All kinds, equally likely.
    pub const ALL: [MutationKind; 3] = [MutationKind::Slot, MutationKind::Room, MutationKind::Teacher];

    /// Draws a kind uniformly.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Single-point crossover.
///
/// The cut index is drawn from `0..min(len1, len2)` (0 when either parent is
/// empty); the child is `p1[..cut] ++ p2[cut..]`.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_timetable::ga::operators::single_point_crossover;
///
/// let mut rng = SmallRng::seed_from_u64(1);
/// let child = single_point_crossover(&[1, 2, 3], &[7, 8, 9, 10], &mut rng);
/// assert!(child.len() <= 4);
/// assert_eq!(child.last(), Some(&10));
/// ```
pub fn single_point_crossover<T: Clone, R: Rng>(p1: &[T], p2: &[T], rng: &mut R) -> Vec<T> {
    let shorter = p1.len().min(p2.len());
    let cut = if shorter == 0 {
        0
    } else {
        rng.random_range(0..shorter)
    };
    p1[..cut].iter().chain(&p2[cut..]).cloned().collect()
}

/// Removes entries that share `(class_id, day, start_min)`.
///
/// On a collision the later entry wins and takes the earlier one's place,
/// so the list keeps the order of first appearance.
pub fn dedup_by_class_slot(entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    let mut out: Vec<ScheduleEntry> = Vec::with_capacity(entries.len());
    let mut position: HashMap<(String, u8, u32), usize> = HashMap::new();
    for e in entries {
        let key = (e.class_id.clone(), e.slot.day, e.slot.start_min);
        match position.get(&key) {
            Some(&i) => out[i] = e,
            None => {
                position.insert(key, out.len());
                out.push(e);
            }
        }
    }
    out
}

/// Tournament selection: samples `size` indices with replacement and
/// returns the one with the highest fitness.
///
/// `fitness` must be non-empty.
pub fn tournament_select<R: Rng>(fitness: &[f64], size: usize, rng: &mut R) -> usize {
    let n = fitness.len();
    let mut best = rng.random_range(0..n);
    for _ in 1..size.max(1) {
        let i = rng.random_range(0..n);
        if fitness[i] > fitness[best] {
            best = i;
        }
    }
    best
}
