//! Constraint evaluation.
//!
//! A [`ConstraintSet`] holds toggleable [`Constraint`]s and validates a
//! schedule against the active ones. Each [`Rule`] dispatches to a pure
//! function of `(schedule, catalog index)`.
//!
//! # Verdict
//! - `is_valid` is false iff at least one active *hard* constraint reports a
//!   violation. Priority is informational only and never short-circuits.
//! - `penalty` is the sum over all active constraints, hard and soft, so a
//!   broken schedule scores worse than a merely suboptimal one.
//!
//! Entries that reference IDs unknown to the catalog are skipped by the
//! catalog-dependent rules; input validation rejects such schedules before
//! they reach the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conflicts::{self, Axis};
use crate::models::{
    CatalogIndex, Constraint, ConstraintReport, ConstraintViolation, EntryId, Rule, Schedule,
    ScheduleEntry, Severity,
};

/// Penalty per double-booked pair.
pub const OVERLAP_PENALTY: f64 = 100.0;
/// Penalty per lesson outside the teacher's availability.
pub const AVAILABILITY_PENALTY: f64 = 80.0;
/// Penalty per hour of weekly-hour shortfall or excess.
pub const WEEKLY_HOURS_PENALTY: f64 = 50.0;
/// Penalty per infeasible site change.
pub const TRAVEL_PENALTY: f64 = 10.0;
/// Penalty per workload breach.
pub const WORKLOAD_PENALTY: f64 = 10.0;
/// Penalty per minor soft-rule violation.
pub const SOFT_PENALTY: f64 = 5.0;

/// Gaps longer than this (minutes) break a compact day.
pub const MAX_COMPACT_GAP_MIN: u32 = 60;

/// A toggleable set of constraints.
///
/// # Examples
///
/// ```
/// use u_timetable::evaluator::ConstraintSet;
/// use u_timetable::models::{Catalog, Rule, Schedule};
///
/// let mut rules = ConstraintSet::default();
/// rules.set_active(Rule::Compactness, false);
///
/// let catalog = Catalog::new();
/// let report = rules.validate(&Schedule::new("empty"), &catalog.index());
/// assert!(report.is_valid);
/// assert_eq!(report.penalty, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Constraints in evaluation order.
    pub constraints: Vec<Constraint>,
}

impl Default for ConstraintSet {
    /// Every built-in rule, active, with default kind and priority.
    fn default() -> Self {
        Self {
            constraints: Rule::ALL.iter().map(|&r| Constraint::new(r)).collect(),
        }
    }
}

impl ConstraintSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Adds a constraint.
    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Builder: adds a constraint and returns self.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.add(constraint);
        self
    }

    /// Removes every constraint evaluating `rule`. Returns how many were removed.
    pub fn remove(&mut self, rule: Rule) -> usize {
        let before = self.constraints.len();
        self.constraints.retain(|c| c.rule != rule);
        before - self.constraints.len()
    }

    /// Activates or deactivates every constraint evaluating `rule`.
    pub fn set_active(&mut self, rule: Rule, active: bool) {
        for c in self.constraints.iter_mut().filter(|c| c.rule == rule) {
            c.active = active;
        }
    }

    /// Active constraints.
    pub fn active(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.active)
    }

    /// Validates a schedule against all active constraints.
    pub fn validate(&self, schedule: &Schedule, index: &CatalogIndex<'_>) -> ConstraintReport {
        let mut report = ConstraintReport::default();
        for constraint in self.active() {
            let result = evaluate(constraint, schedule, index);
            if !result.is_valid && constraint.is_hard() {
                report.is_valid = false;
            }
            report.penalty += result.penalty;
            report.violations.extend(result.violations);
        }
        report
    }
}

/// Evaluates a single constraint.
pub fn evaluate(
    constraint: &Constraint,
    schedule: &Schedule,
    index: &CatalogIndex<'_>,
) -> ConstraintReport {
    let (found, unit_penalty): (Vec<Found>, f64) = match constraint.rule {
        Rule::NoTeacherOverlap => (overlaps(schedule, Axis::Teacher), OVERLAP_PENALTY),
        Rule::NoRoomOverlap => (overlaps(schedule, Axis::Room), OVERLAP_PENALTY),
        Rule::NoClassOverlap => (overlaps(schedule, Axis::Class), OVERLAP_PENALTY),
        Rule::TeacherAvailability => (availability(schedule, index), AVAILABILITY_PENALTY),
        Rule::WeeklyHours => (weekly_hours(schedule, index), WEEKLY_HOURS_PENALTY),
        Rule::TravelTime => (travel(schedule, index), TRAVEL_PENALTY),
        Rule::SubjectDistribution => (distribution(schedule, index), SOFT_PENALTY),
        Rule::Compactness => (compactness(schedule), SOFT_PENALTY),
        Rule::Continuity => (continuity(schedule, index), SOFT_PENALTY),
        Rule::TeacherWorkload => (workload(schedule, index), WORKLOAD_PENALTY),
        Rule::ClassPolicy => (class_policy(schedule, index), SOFT_PENALTY),
    };

    let penalty = found.iter().map(|f| f.weight as f64 * unit_penalty).sum();
    let violations: Vec<ConstraintViolation> = found
        .into_iter()
        .map(|f| ConstraintViolation {
            rule: constraint.rule,
            kind: constraint.kind,
            description: f.description,
            severity: f.severity,
            entry_ids: f.entry_ids,
        })
        .collect();

    ConstraintReport {
        is_valid: violations.is_empty(),
        violations,
        penalty,
    }
}

/// A violation before it is tagged with its constraint.
struct Found {
    description: String,
    severity: Severity,
    entry_ids: Vec<EntryId>,
    /// Multiplier for the rule's unit penalty.
    weight: u32,
}

impl Found {
    fn new(severity: Severity, entry_ids: Vec<EntryId>, description: String) -> Self {
        Self {
            description,
            severity,
            entry_ids,
            weight: 1,
        }
    }
}

fn ids(entries: &[&ScheduleEntry]) -> Vec<EntryId> {
    entries.iter().map(|e| e.id).collect()
}

fn overlaps(schedule: &Schedule, axis: Axis) -> Vec<Found> {
    conflicts::detect_axis(schedule, axis)
        .into_iter()
        .map(|c| Found::new(c.severity, c.entry_ids, c.description))
        .collect()
}

/// Entries placed outside their teacher's declared availability.
pub fn availability_breaches<'a>(
    schedule: &'a Schedule,
    index: &CatalogIndex<'_>,
) -> Vec<&'a ScheduleEntry> {
    schedule
        .entries
        .iter()
        .filter(|e| {
            index
                .teacher(&e.teacher_id)
                .is_some_and(|t| !t.is_available(&e.slot))
        })
        .collect()
}

fn availability(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    availability_breaches(schedule, index)
        .into_iter()
        .map(|e| {
            Found::new(
                Severity::High,
                vec![e.id],
                format!("Teacher {} is not available on {}", e.teacher_id, e.slot),
            )
        })
        .collect()
}

/// Weekly-hour mismatch of one (class, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursMismatch<'a> {
    /// Class ID.
    pub class_id: &'a str,
    /// Subject ID.
    pub subject_id: &'a str,
    /// Hours required by the subject.
    pub required: u32,
    /// Entries scheduled.
    pub scheduled: u32,
    /// Entries of this pair.
    pub entry_ids: Vec<EntryId>,
}

impl HoursMismatch<'_> {
    /// Absolute difference between scheduled and required hours.
    pub fn deviation(&self) -> u32 {
        self.required.abs_diff(self.scheduled)
    }
}

/// Every (class, subject) pair of the catalog whose entry count differs from
/// the required weekly hours, in catalog order.
pub fn hours_mismatches<'a>(
    schedule: &Schedule,
    index: &CatalogIndex<'a>,
) -> Vec<HoursMismatch<'a>> {
    let mut by_pair: BTreeMap<(&str, &str), Vec<EntryId>> = BTreeMap::new();
    for e in &schedule.entries {
        by_pair
            .entry((e.class_id.as_str(), e.subject_id.as_str()))
            .or_default()
            .push(e.id);
    }

    let catalog = index.catalog();
    let mut mismatches = Vec::new();
    for class in &catalog.classes {
        for subject in &catalog.subjects {
            let required = subject.hours_for(&class.id);
            let entry_ids = by_pair
                .get(&(class.id.as_str(), subject.id.as_str()))
                .cloned()
                .unwrap_or_default();
            let scheduled = entry_ids.len() as u32;
            if scheduled != required {
                mismatches.push(HoursMismatch {
                    class_id: &class.id,
                    subject_id: &subject.id,
                    required,
                    scheduled,
                    entry_ids,
                });
            }
        }
    }
    mismatches
}

fn weekly_hours(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    hours_mismatches(schedule, index)
        .into_iter()
        .map(|m| {
            let weight = m.deviation();
            let mut found = Found::new(
                Severity::High,
                m.entry_ids,
                format!(
                    "Class {} has {} of {} weekly hours of {}",
                    m.class_id, m.scheduled, m.required, m.subject_id
                ),
            );
            found.weight = weight;
            found
        })
        .collect()
}

/// A site change a teacher cannot make in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelShortfall {
    /// Earlier lesson.
    pub from: EntryId,
    /// Later lesson.
    pub to: EntryId,
    /// Minutes between the two lessons.
    pub gap_min: u32,
    /// Minutes the teacher needs to reach the later lesson's site.
    pub needed_min: u32,
}

/// Consecutive same-day lessons of a teacher at different sites whose gap
/// is shorter than the teacher's declared travel time to the later site.
pub fn travel_shortfalls(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<TravelShortfall> {
    let mut shortfalls = Vec::new();
    for (teacher_id, entries) in schedule.grouped_by(|e| e.teacher_id.as_str()) {
        let Some(teacher) = index.teacher(teacher_id) else {
            continue;
        };
        for pair in entries.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let Some(gap_min) = a.slot.gap_until(&b.slot) else {
                continue;
            };
            let (Some(from_site), Some(to_site)) = (index.site_of(a), index.site_of(b)) else {
                continue;
            };
            if from_site == to_site {
                continue;
            }
            let needed_min = teacher.travel_to(to_site);
            if gap_min < needed_min {
                shortfalls.push(TravelShortfall {
                    from: a.id,
                    to: b.id,
                    gap_min,
                    needed_min,
                });
            }
        }
    }
    shortfalls
}

fn travel(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    travel_shortfalls(schedule, index)
        .into_iter()
        .map(|s| {
            Found::new(
                Severity::Medium,
                vec![s.from, s.to],
                format!(
                    "Only {} of {} travel minutes between lessons {} and {}",
                    s.gap_min, s.needed_min, s.from, s.to
                ),
            )
        })
        .collect()
}

fn distribution(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    let mut found = Vec::new();
    let groups = schedule.grouped_by(|e| (e.class_id.as_str(), e.subject_id.as_str()));
    for ((class_id, subject_id), entries) in groups {
        let total = entries.len();
        if total < 2 {
            continue;
        }
        if index
            .subject(subject_id)
            .is_some_and(|s| s.requires_continuity)
        {
            continue;
        }
        let limit = total.div_ceil(2);
        let mut by_day: BTreeMap<u8, Vec<&ScheduleEntry>> = BTreeMap::new();
        for e in entries {
            by_day.entry(e.slot.day).or_default().push(e);
        }
        for (day, day_entries) in by_day {
            if day_entries.len() > limit {
                found.push(Found::new(
                    Severity::Low,
                    ids(&day_entries),
                    format!(
                        "Class {} has {} of {} hours of {} on day {}",
                        class_id,
                        day_entries.len(),
                        total,
                        subject_id,
                        day
                    ),
                ));
            }
        }
    }
    found
}

/// Gaps longer than [`MAX_COMPACT_GAP_MIN`] between consecutive same-day
/// lessons of each class, as `(earlier, later)` entry pairs.
pub fn class_day_gaps(schedule: &Schedule) -> Vec<(EntryId, EntryId)> {
    let mut gaps = Vec::new();
    for entries in schedule.grouped_by(|e| e.class_id.as_str()).values() {
        for pair in entries.windows(2) {
            if let Some(gap) = pair[0].slot.gap_until(&pair[1].slot) {
                if gap > MAX_COMPACT_GAP_MIN {
                    gaps.push((pair[0].id, pair[1].id));
                }
            }
        }
    }
    gaps
}

fn compactness(schedule: &Schedule) -> Vec<Found> {
    class_day_gaps(schedule)
        .into_iter()
        .map(|(a, b)| {
            Found::new(
                Severity::Low,
                vec![a, b],
                format!("Idle gap over {MAX_COMPACT_GAP_MIN} minutes between lessons {a} and {b}"),
            )
        })
        .collect()
}

fn continuity(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    let mut found = Vec::new();
    let groups = schedule.grouped_by(|e| (e.class_id.as_str(), e.subject_id.as_str()));
    for ((class_id, subject_id), entries) in groups {
        if !index
            .subject(subject_id)
            .is_some_and(|s| s.requires_continuity)
        {
            continue;
        }
        for pair in entries.windows(2) {
            if let Some(gap) = pair[0].slot.gap_until(&pair[1].slot) {
                if gap > 0 {
                    found.push(Found::new(
                        Severity::Medium,
                        vec![pair[0].id, pair[1].id],
                        format!(
                            "{} for class {} is split by {} minutes on {}",
                            subject_id, class_id, gap, pair[1].slot
                        ),
                    ));
                }
            }
        }
    }
    found
}

fn minutes(entries: &[&ScheduleEntry]) -> u32 {
    entries.iter().map(|e| e.duration_minutes()).sum()
}

fn by_day<'a>(entries: &[&'a ScheduleEntry]) -> BTreeMap<u8, Vec<&'a ScheduleEntry>> {
    let mut days: BTreeMap<u8, Vec<&ScheduleEntry>> = BTreeMap::new();
    for &e in entries {
        days.entry(e.slot.day).or_default().push(e);
    }
    days
}

fn workload(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    let mut found = Vec::new();
    for (teacher_id, entries) in schedule.grouped_by(|e| e.teacher_id.as_str()) {
        let Some(teacher) = index.teacher(teacher_id) else {
            continue;
        };

        let weekly_limit = teacher.total_weekly_hours * 60;
        if weekly_limit > 0 && minutes(&entries) > weekly_limit {
            found.push(Found::new(
                Severity::Medium,
                ids(&entries),
                format!(
                    "Teacher {} exceeds {} weekly hours",
                    teacher_id, teacher.total_weekly_hours
                ),
            ));
        }

        let daily_limit = teacher.max_hours_per_day * 60;
        let run_limit = teacher.preferences.max_consecutive_hours * 60;
        for (day, day_entries) in by_day(&entries) {
            if daily_limit > 0 && minutes(&day_entries) > daily_limit {
                found.push(Found::new(
                    Severity::Medium,
                    ids(&day_entries),
                    format!(
                        "Teacher {} exceeds {} hours on day {}",
                        teacher_id, teacher.max_hours_per_day, day
                    ),
                ));
            }
            if run_limit == 0 {
                continue;
            }
            let mut run: Vec<&ScheduleEntry> = Vec::new();
            for e in day_entries {
                let continues = run
                    .last()
                    .and_then(|last| last.slot.gap_until(&e.slot))
                    .is_some_and(|gap| gap == 0);
                if !continues {
                    push_long_run(&mut found, &run, run_limit, teacher_id);
                    run.clear();
                }
                run.push(e);
            }
            push_long_run(&mut found, &run, run_limit, teacher_id);
        }
    }
    found
}

fn push_long_run(found: &mut Vec<Found>, run: &[&ScheduleEntry], limit: u32, teacher_id: &str) {
    if minutes(run) > limit {
        found.push(Found::new(
            Severity::Low,
            ids(run),
            format!(
                "Teacher {} teaches {} consecutive minutes (limit {})",
                teacher_id,
                minutes(run),
                limit
            ),
        ));
    }
}

fn class_policy(schedule: &Schedule, index: &CatalogIndex<'_>) -> Vec<Found> {
    let mut found = Vec::new();
    for (class_id, entries) in schedule.grouped_by(|e| e.class_id.as_str()) {
        let Some(class) = index.class(class_id) else {
            continue;
        };
        let policy = &class.policy;

        for e in &entries {
            if policy.overlaps_lunch(&e.slot) {
                found.push(Found::new(
                    Severity::Medium,
                    vec![e.id],
                    format!("Class {} has a lesson during lunch on {}", class_id, e.slot),
                ));
            } else if policy.forbids_afternoon(&e.slot) {
                found.push(Found::new(
                    Severity::Medium,
                    vec![e.id],
                    format!("Class {} has no afternoon sessions but meets on {}", class_id, e.slot),
                ));
            }
        }

        let daily_limit = policy.max_hours_per_day * 60;
        if daily_limit == 0 {
            continue;
        }
        for (day, day_entries) in by_day(&entries) {
            if minutes(&day_entries) > daily_limit {
                found.push(Found::new(
                    Severity::Low,
                    ids(&day_entries),
                    format!(
                        "Class {} exceeds {} hours on day {}",
                        class_id, policy.max_hours_per_day, day
                    ),
                ));
            }
        }
    }
    found
}
