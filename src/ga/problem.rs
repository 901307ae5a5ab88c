//! Timetable GA problem definition.
//!
//! Implements [`GaProblem`] for timetables: candidates are whole
//! [`Schedule`]s built by random-greedy construction, scored by the
//! [`FitnessFunction`], recombined by single-point crossover over entry
//! lists and mutated one entry aspect at a time.

use rand::Rng;
use rand::prelude::IndexedRandom;
use tracing::warn;

use super::operators::{dedup_by_class_slot, single_point_crossover, MutationKind};
use super::GaProblem;
use crate::config::OptimizationSettings;
use crate::fitness::{FitnessFunction, FitnessWeights};
use crate::models::{Catalog, CatalogIndex, Schedule, ScheduleEntry, WeeklyGrid};
use crate::scheduler::greedy::{self, SlotPool};

/// GA problem for one catalog.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_timetable::config::OptimizationSettings;
/// use u_timetable::fitness::FitnessWeights;
/// use u_timetable::ga::{GaProblem, TimetableProblem};
/// use u_timetable::models::{Catalog, Room, SchoolClass, Subject, Teacher, WeeklyGrid};
///
/// let catalog = Catalog::new()
///     .with_teacher(Teacher::new("T1").with_subject("MATH"))
///     .with_class(SchoolClass::new("1A", "MAIN"))
///     .with_subject(Subject::new("MATH").with_hours("1A", 3))
///     .with_room(Room::classroom("R1"));
/// let problem = TimetableProblem::new(
///     &catalog,
///     &WeeklyGrid::default(),
///     &OptimizationSettings::default(),
///     FitnessWeights::default(),
/// );
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let candidate = problem.create_individual(&mut rng);
/// assert_eq!(candidate.entry_count(), 3);
/// assert!(problem.evaluate(&candidate) > 1000.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem<'a> {
    index: CatalogIndex<'a>,
    pool: SlotPool,
    fitness: FitnessFunction,
    construction_attempts: usize,
    max_mutations: usize,
}

impl<'a> TimetableProblem<'a> {
    /// Creates the problem and its per-run indices.
    ///
    /// Logs a warning for every (class, subject) demand that no teacher is
    /// qualified for or no room is compatible with; such hours stay unmet.
    pub fn new(
        catalog: &'a Catalog,
        grid: &WeeklyGrid,
        settings: &OptimizationSettings,
        weights: FitnessWeights,
    ) -> Self {
        let index = catalog.index();
        for (class_id, subject_id, reason) in unservable_demands(&index) {
            warn!(class = class_id, subject = subject_id, reason, "demand cannot be scheduled");
        }
        Self {
            pool: SlotPool::new(catalog, grid),
            index,
            fitness: FitnessFunction::new(weights),
            construction_attempts: settings.construction_attempts.max(1),
            max_mutations: settings.max_mutations.max(1),
        }
    }

    /// Catalog lookups.
    pub fn index(&self) -> &CatalogIndex<'a> {
        &self.index
    }

    /// Fitness function in use.
    pub fn fitness(&self) -> &FitnessFunction {
        &self.fitness
    }

    /// Slots offered to teachers.
    pub fn slot_pool(&self) -> &SlotPool {
        &self.pool
    }

    fn mutate_entry<R: Rng>(&self, entry: &mut ScheduleEntry, kind: MutationKind, rng: &mut R) {
        match kind {
            MutationKind::Slot => {
                if let Some(&slot) = self.pool.for_teacher(&entry.teacher_id).choose(rng) {
                    entry.slot = slot;
                }
            }
            MutationKind::Room => {
                if let Some(room) = self.index.compatible_rooms(&entry.subject_id).choose(rng) {
                    entry.room_id = room.id.clone();
                }
            }
            MutationKind::Teacher => {
                let others: Vec<_> = self
                    .index
                    .qualified_teachers(&entry.subject_id)
                    .iter()
                    .filter(|t| t.id != entry.teacher_id)
                    .collect();
                if let Some(teacher) = others.choose(rng) {
                    entry.teacher_id = teacher.id.clone();
                }
            }
        }
    }
}

/// Demands with positive hours that cannot be served, with the reason.
fn unservable_demands<'a>(index: &CatalogIndex<'a>) -> Vec<(&'a str, &'a str, &'static str)> {
    let catalog = index.catalog();
    let mut out = Vec::new();
    for class in &catalog.classes {
        for subject in &catalog.subjects {
            if subject.hours_for(&class.id) == 0 {
                continue;
            }
            if index.qualified_teachers(&subject.id).is_empty() {
                out.push((class.id.as_str(), subject.id.as_str(), "no qualified teacher"));
            } else if index.compatible_rooms(&subject.id).is_empty() {
                out.push((class.id.as_str(), subject.id.as_str(), "no compatible room"));
            }
        }
    }
    out
}

impl GaProblem for TimetableProblem<'_> {
    type Individual = Schedule;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Schedule {
        greedy::construct(&self.index, &self.pool, self.construction_attempts, rng)
    }

    fn evaluate(&self, individual: &Schedule) -> f64 {
        self.fitness.evaluate(individual, &self.index)
    }

    fn crossover<R: Rng>(&self, parent1: &Schedule, parent2: &Schedule, rng: &mut R) -> Vec<Schedule> {
        let entries = single_point_crossover(&parent1.entries, &parent2.entries, rng);
        let mut child = Schedule::with_entries("Offspring", dedup_by_class_slot(entries));
        child.renumber();
        vec![child]
    }

    fn mutate<R: Rng>(&self, individual: &mut Schedule, rng: &mut R) {
        let steps = rng.random_range(1..=self.max_mutations);
        for _ in 0..steps {
            if individual.entries.is_empty() {
                break;
            }
            let i = rng.random_range(0..individual.entries.len());
            let kind = MutationKind::random(rng);
            self.mutate_entry(&mut individual.entries[i], kind, rng);
        }
    }
}
