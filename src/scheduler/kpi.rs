//! Schedule quality metrics (KPIs).
//!
//! Computes analytics indicators from any schedule and its catalog. Used
//! to compare schedules; nothing here feeds back into optimization.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total conflicts | Double-bookings on all axes |
//! | Hard / soft violations | Violations reported by hard / soft constraints |
//! | Teacher satisfaction | Preference ratio clamped to [0, 1] |
//! | Room utilization | 1 − variance/100 of per-room usage, floored at 0 |
//! | Travel optimization | 1 − travel shortfalls/100, floored at 0 |
//! | Overall score | Fitness |

use serde::{Deserialize, Serialize};

use crate::conflicts;
use crate::evaluator::ConstraintSet;
use crate::fitness::{FitnessBreakdown, FitnessFunction};
use crate::models::{CatalogIndex, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Double-bookings across teacher, room, and class axes.
    pub total_conflicts: usize,
    /// Violations reported by hard constraints.
    pub hard_constraint_violations: usize,
    /// Violations reported by soft constraints.
    pub soft_constraint_violations: usize,
    /// Teacher preference satisfaction (0.0..1.0).
    pub teacher_satisfaction: f64,
    /// Room utilization balance (0.0..1.0).
    pub room_utilization: f64,
    /// Travel feasibility (0.0..1.0).
    pub travel_optimization: f64,
    /// Fitness of the schedule.
    pub overall_score: f64,
}

impl ScheduleMetrics {
    /// Computes metrics for a schedule.
    ///
    /// # Arguments
    /// * `schedule` - Schedule to measure.
    /// * `index` - Catalog the schedule was built from.
    /// * `constraints` - Rule set deciding hard/soft violation counts.
    /// * `fitness` - Fitness function for the overall score.
    pub fn calculate(
        schedule: &Schedule,
        index: &CatalogIndex<'_>,
        constraints: &ConstraintSet,
        fitness: &FitnessFunction,
    ) -> Self {
        let report = constraints.validate(schedule, index);
        let terms = FitnessBreakdown::compute(schedule, index);
        Self {
            total_conflicts: conflicts::count(schedule),
            hard_constraint_violations: report.hard_violation_count(),
            soft_constraint_violations: report.soft_violation_count(),
            teacher_satisfaction: terms.preference.clamp(0.0, 1.0),
            room_utilization: terms.room_balance,
            travel_optimization: (1.0 - terms.travel_violations as f64 / 100.0).max(0.0),
            overall_score: terms.score(&fitness.weights),
        }
    }

    /// Whether no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.hard_constraint_violations == 0
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_score: f64, min_satisfaction: f64) -> bool {
        self.is_feasible()
            && self.overall_score >= min_score
            && self.teacher_satisfaction >= min_satisfaction
    }
}
