//! Schedule construction, optimization, and KPI evaluation.
//!
//! Provides the random-greedy constructor that seeds the GA, the
//! [`TimetableOptimizer`] facade, and schedule quality metrics.
//!
//! # Algorithm
//!
//! `greedy::construct` places every required hour with a bounded number of
//! random attempts. It is not optimal, but yields conflict-free starting
//! candidates quickly; the GA then trades them off on soft criteria.
//!
//! # KPI
//!
//! `ScheduleMetrics` computes conflict counts, hard/soft violation counts,
//! teacher satisfaction, room utilization balance, and travel feasibility.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

pub mod greedy;
mod kpi;
mod optimizer;

pub use kpi::ScheduleMetrics;
pub use optimizer::{OptimizationOutcome, TimetableOptimizer};
