//! Timetable optimizer facade.
//!
//! Validates the catalog and configuration once, then runs the GA and
//! packages its best candidate as a finished [`Schedule`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ScheduleMetrics;
use crate::config::{EngineConfig, OptimizationSettings};
use crate::conflicts;
use crate::error::{Result, TimetableError};
use crate::evaluator::ConstraintSet;
use crate::fitness::FitnessFunction;
use crate::ga::{GaRunner, ProgressTracker, TerminationReason, TimetableProblem};
use crate::models::{Catalog, Conflict, ConstraintReport, Schedule};
use crate::validation;

/// Result of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Best schedule found, with fitness and conflicts filled in.
    pub schedule: Schedule,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Generations scored.
    pub generations: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Best fitness of each generation.
    pub best_fitness_history: Vec<f64>,
    /// Rule evaluation of the final schedule.
    pub report: ConstraintReport,
}

impl OptimizationOutcome {
    /// Whether the final schedule violates no hard rule.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid
    }

    /// Rule violations of the final schedule, as conflicts.
    pub fn violation_conflicts(&self) -> Vec<Conflict> {
        self.report
            .violations
            .iter()
            .map(|v| v.to_conflict())
            .collect()
    }
}

/// Genetic timetable optimizer over one catalog.
///
/// # Example
/// ```
/// use u_timetable::config::OptimizationSettings;
/// use u_timetable::models::{Catalog, Room, SchoolClass, Subject, Teacher};
/// use u_timetable::scheduler::TimetableOptimizer;
///
/// let catalog = Catalog::new()
///     .with_teacher(Teacher::new("T1").with_subject("MATH"))
///     .with_class(SchoolClass::new("1A", "MAIN"))
///     .with_subject(Subject::new("MATH").with_hours("1A", 2))
///     .with_room(Room::classroom("R1"));
/// let settings = OptimizationSettings::default()
///     .with_population_size(20)
///     .with_convergence_threshold(900.0)
///     .with_seed(42);
///
/// let optimizer = TimetableOptimizer::new(catalog, settings).unwrap();
/// let outcome = optimizer.optimize(None);
/// assert_eq!(outcome.schedule.entry_count(), 2);
/// assert!(outcome.schedule.conflicts.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TimetableOptimizer {
    catalog: Catalog,
    config: EngineConfig,
    constraints: ConstraintSet,
    cancel: Arc<AtomicBool>,
}

impl TimetableOptimizer {
    /// Creates an optimizer with the default grid and fitness weights.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::InvalidInput`] listing every problem found
    /// in the catalog and settings.
    pub fn new(catalog: Catalog, settings: OptimizationSettings) -> Result<Self> {
        Self::with_config(catalog, EngineConfig::new().with_optimization(settings))
    }

    /// Creates an optimizer from a full engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::InvalidInput`] listing every problem found
    /// in the catalog, settings, and grid.
    pub fn with_config(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        let mut errors = Vec::new();
        for result in [
            validation::validate_catalog(&catalog),
            validation::validate_settings(&config.optimization),
            validation::validate_grid(&config.grid),
        ] {
            if let Err(e) = result {
                errors.extend(e);
            }
        }
        if !errors.is_empty() {
            return Err(TimetableError::InvalidInput(errors));
        }
        Ok(Self {
            catalog,
            config,
            constraints: ConstraintSet::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replaces the rule set used for the final report and metrics.
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    /// Flag that stops a running optimization at the next generation.
    ///
    /// The flag is cleared when that run returns, so later runs start
    /// uncancelled.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The validated catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Optimizer settings.
    pub fn settings(&self) -> &OptimizationSettings {
        &self.config.optimization
    }

    /// Rule set in use.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Runs the optimizer, seeding from `settings.seed` or the OS.
    pub fn optimize(&self, progress: Option<&ProgressTracker>) -> OptimizationOutcome {
        let mut rng = match self.config.optimization.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.optimize_with(&mut rng, progress)
    }

    /// Runs the optimizer with a caller-supplied random source.
    pub fn optimize_with<R: Rng>(
        &self,
        rng: &mut R,
        progress: Option<&ProgressTracker>,
    ) -> OptimizationOutcome {
        let settings = &self.config.optimization;
        info!(
            teachers = self.catalog.teachers.len(),
            classes = self.catalog.classes.len(),
            subjects = self.catalog.subjects.len(),
            rooms = self.catalog.rooms.len(),
            demand = self.catalog.total_demand(),
            population = settings.population_size,
            max_generations = settings.max_generations,
            "starting timetable optimization"
        );

        let problem = TimetableProblem::new(
            &self.catalog,
            &self.config.grid,
            settings,
            self.config.fitness.clone(),
        );
        let mut runner = GaRunner::new(settings).with_cancel(&self.cancel);
        if let Some(p) = progress {
            runner = runner.with_progress(p);
        }
        let result = runner.run(&problem, rng);
        // A cancel request ends only the run it interrupted.
        self.cancel.store(false, Ordering::Release);

        let mut schedule = result.best;
        schedule.name = "Optimized schedule".to_string();
        schedule.conflicts = conflicts::detect(&schedule);
        schedule.fitness = Some(result.best_fitness);
        schedule.touch();
        let report = self.constraints.validate(&schedule, problem.index());

        info!(
            entries = schedule.entry_count(),
            conflicts = schedule.conflicts.len(),
            valid = report.is_valid,
            penalty = report.penalty,
            "timetable optimization finished"
        );

        OptimizationOutcome {
            schedule,
            termination: result.termination,
            generations: result.generations,
            elapsed: result.elapsed,
            best_fitness_history: result.history,
            report,
        }
    }

    /// Fitness of an externally supplied schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::InvalidInput`] if the schedule references
    /// unknown entities or holds malformed slots.
    pub fn evaluate(&self, schedule: &Schedule) -> Result<f64> {
        validation::validate_schedule(schedule, &self.catalog)
            .map_err(TimetableError::InvalidInput)?;
        Ok(self.fitness().evaluate(schedule, &self.catalog.index()))
    }

    /// Rule evaluation of an externally supplied schedule.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn check(&self, schedule: &Schedule) -> Result<ConstraintReport> {
        validation::validate_schedule(schedule, &self.catalog)
            .map_err(TimetableError::InvalidInput)?;
        Ok(self.constraints.validate(schedule, &self.catalog.index()))
    }

    /// Quality metrics of an externally supplied schedule.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn metrics(&self, schedule: &Schedule) -> Result<ScheduleMetrics> {
        validation::validate_schedule(schedule, &self.catalog)
            .map_err(TimetableError::InvalidInput)?;
        Ok(ScheduleMetrics::calculate(
            schedule,
            &self.catalog.index(),
            &self.constraints,
            &self.fitness(),
        ))
    }

    fn fitness(&self) -> FitnessFunction {
        FitnessFunction::new(self.config.fitness.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Room, ScheduleEntry, SchoolClass, Subject, Teacher, TimeSlot};
    use crate::validation::ValidationErrorKind;

    fn small_catalog() -> Catalog {
        Catalog::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_class(SchoolClass::new("1A", "MAIN"))
            .with_subject(Subject::new("MATH").with_hours("1A", 2))
            .with_room(Room::classroom("R1"))
    }

    fn settings() -> OptimizationSettings {
        OptimizationSettings::default()
            .with_population_size(20)
            .with_max_generations(50)
            .with_mutation_rate(0.1)
            .with_elitism_rate(0.2)
            .with_convergence_threshold(900.0)
            .with_max_runtime_secs(5)
            .with_seed(42)
    }

    #[test]
    fn test_optimize_small_catalog() {
        let opt = TimetableOptimizer::new(small_catalog(), settings()).unwrap();
        let outcome = opt.optimize(None);

        assert_eq!(outcome.termination, TerminationReason::Converged);
        assert_eq!(outcome.schedule.entry_count(), 2);
        assert!(outcome.schedule.conflicts.is_empty());
        assert!(outcome.schedule.fitness.unwrap() >= 900.0);
        assert_eq!(outcome.schedule.name, "Optimized schedule");
        assert!(outcome.is_valid());
        assert_eq!(outcome.best_fitness_history.len(), outcome.generations);
        for e in &outcome.schedule.entries {
            assert_eq!(e.teacher_id, "T1");
            assert_eq!(e.room_id, "R1");
        }
    }

    #[test]
    fn test_infeasible_catalog_still_returns_schedule() {
        // Four hours of demand, but the only teacher has two slots
        let catalog = Catalog::new()
            .with_teacher(
                Teacher::new("T1")
                    .with_subject("MATH")
                    .with_availability(TimeSlot::new(0, 480, 600)),
            )
            .with_class(SchoolClass::new("1A", "MAIN"))
            .with_class(SchoolClass::new("1B", "MAIN"))
            .with_subject(Subject::new("MATH").with_hours("1A", 2).with_hours("1B", 2))
            .with_room(Room::classroom("R1"));
        let s = settings()
            .with_max_generations(5)
            .with_convergence_threshold(5000.0);
        let opt = TimetableOptimizer::new(catalog, s).unwrap();
        let outcome = opt.optimize(None);

        assert_eq!(outcome.termination, TerminationReason::MaxGenerationsReached);
        assert_eq!(outcome.generations, 5);
        assert!(!outcome.is_valid());
        assert!(outcome.report.hard_violation_count() > 0);
        assert!(!outcome.violation_conflicts().is_empty());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let catalog = small_catalog().with_teacher(Teacher::new("T1"));
        let s = settings().with_mutation_rate(1.5);
        match TimetableOptimizer::new(catalog, s) {
            Err(TimetableError::InvalidInput(errors)) => {
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::InvalidSetting));
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_cancel_before_run() {
        let s = settings().with_convergence_threshold(5000.0);
        let opt = TimetableOptimizer::new(small_catalog(), s).unwrap();
        opt.cancel_handle().store(true, Ordering::Release);
        let outcome = opt.optimize(None);
        assert_eq!(outcome.termination, TerminationReason::Cancelled);
        assert_eq!(outcome.generations, 1);
        assert_eq!(outcome.schedule.entry_count(), 2);
    }

    #[test]
    fn test_cancel_affects_one_run() {
        let s = settings()
            .with_max_generations(20)
            .with_convergence_threshold(5000.0);
        let opt = TimetableOptimizer::new(small_catalog(), s).unwrap();
        opt.cancel_handle().store(true, Ordering::Release);
        let first = opt.optimize(None);
        assert_eq!(first.termination, TerminationReason::Cancelled);
        assert!(!opt.cancel_handle().load(Ordering::Acquire));

        let second = opt.optimize(None);
        assert_eq!(second.termination, TerminationReason::MaxGenerationsReached);
        assert_eq!(second.generations, 20);
    }

    #[test]
    fn test_best_fitness_never_drops() {
        let catalog = Catalog::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH").with_subject("HIST"))
            .with_teacher(Teacher::new("T2").with_subject("MATH"))
            .with_teacher(Teacher::new("T3").with_subject("HIST"))
            .with_class(SchoolClass::new("1A", "MAIN"))
            .with_class(SchoolClass::new("1B", "MAIN"))
            .with_class(SchoolClass::new("1C", "MAIN"))
            .with_subject(
                Subject::new("MATH")
                    .with_hours("1A", 4)
                    .with_hours("1B", 4)
                    .with_hours("1C", 3),
            )
            .with_subject(Subject::new("HIST").with_hours("1A", 2).with_hours("1C", 2))
            .with_room(Room::classroom("R1"))
            .with_room(Room::classroom("R2"));
        for seed in 0..3 {
            let s = OptimizationSettings::default().with_seed(seed);
            let opt = TimetableOptimizer::new(catalog.clone(), s).unwrap();
            let outcome = opt.optimize(None);
            for w in outcome.best_fitness_history.windows(2) {
                assert!(w[1] >= w[0], "seed {seed}: best fitness dropped {w:?}");
            }
        }
    }

    #[test]
    fn test_runtime_budget() {
        let s = settings()
            .with_population_size(10)
            .with_max_generations(100_000)
            .with_convergence_threshold(5000.0)
            .with_max_runtime_secs(1);
        let opt = TimetableOptimizer::new(small_catalog(), s).unwrap();
        let outcome = opt.optimize(None);
        assert_eq!(outcome.termination, TerminationReason::TimedOut);
        assert!(outcome.elapsed >= Duration::from_secs(1));
        assert!(outcome.elapsed < Duration::from_secs(3));
    }

    #[test]
    fn test_progress_reaches_full() {
        let opt = TimetableOptimizer::new(small_catalog(), settings()).unwrap();
        let progress = ProgressTracker::new();
        opt.optimize(Some(&progress));
        assert_eq!(progress.get(), 100);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let s = settings()
            .with_max_generations(5)
            .with_convergence_threshold(5000.0);
        let opt = TimetableOptimizer::new(small_catalog(), s).unwrap();
        let a = opt.optimize(None);
        let b = opt.optimize(None);
        assert_eq!(a.schedule.entries, b.schedule.entries);
        assert_eq!(a.best_fitness_history, b.best_fitness_history);
    }

    #[test]
    fn test_external_schedule_checks() {
        let opt = TimetableOptimizer::new(small_catalog(), settings()).unwrap();
        let good = Schedule::with_entries(
            "manual",
            vec![
                ScheduleEntry::new(1, "T1", "1A", "MATH", "R1", TimeSlot::new(0, 480, 540)),
                ScheduleEntry::new(2, "T1", "1A", "MATH", "R1", TimeSlot::new(1, 480, 540)),
            ],
        );
        assert!(opt.check(&good).unwrap().is_valid);
        assert!(opt.evaluate(&good).unwrap() >= 1000.0);
        assert!(opt.metrics(&good).unwrap().is_feasible());

        let bad = Schedule::with_entries(
            "manual",
            vec![ScheduleEntry::new(1, "T9", "1A", "MATH", "R1", TimeSlot::new(0, 480, 540))],
        );
        assert!(matches!(opt.evaluate(&bad), Err(TimetableError::InvalidInput(_))));
        assert!(opt.metrics(&bad).is_err());
    }
}
