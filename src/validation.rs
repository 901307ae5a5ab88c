//! Input validation for timetable runs.
//!
//! Checks structural integrity of the catalog, the optimizer settings and
//! externally supplied schedules before the engine touches them. Detects:
//! - Duplicate IDs
//! - Malformed time slots
//! - References to unknown teachers, classes, subjects, rooms, or sites
//! - Out-of-range sizes, limits, and settings
//!
//! Every problem is collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::config::OptimizationSettings;
use crate::models::{Catalog, Schedule, TimeSlot, WeeklyGrid, DAYS_PER_WEEK};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A slot has an out-of-range day or does not end after it starts.
    InvalidTimeSlot,
    /// An ID points to an entity that doesn't exist.
    UnknownReference,
    /// A size, capacity, or limit is out of range.
    InvalidValue,
    /// An optimizer setting is out of range.
    InvalidSetting,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duplicates<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
}

fn check_slot(slot: &TimeSlot, owner: &str, errors: &mut Vec<ValidationError>) {
    if !slot.is_well_formed() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeSlot,
            format!(
                "{owner} has a malformed slot (day {}, {}-{})",
                slot.day, slot.start_min, slot.end_min
            ),
        ));
    }
}

/// Validates a catalog.
///
/// Checks:
/// 1. No duplicate teacher, class, subject, or room IDs
/// 2. Availability, preference, and lunch-break slots are well-formed
/// 3. Teacher subjects and weekly-hour class keys reference known entities
/// 4. Travel-time keys reference known sites (class home sites or room sites)
/// 5. Teacher hour limits, class sizes, and room capacities are positive
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    let index = catalog.index();

    check_duplicates("teacher", catalog.teachers.iter().map(|t| t.id.as_str()), &mut errors);
    check_duplicates("class", catalog.classes.iter().map(|c| c.id.as_str()), &mut errors);
    check_duplicates("subject", catalog.subjects.iter().map(|s| s.id.as_str()), &mut errors);
    check_duplicates("room", catalog.rooms.iter().map(|r| r.id.as_str()), &mut errors);

    let sites: HashSet<&str> = catalog
        .classes
        .iter()
        .map(|c| c.site_id.as_str())
        .chain(catalog.rooms.iter().filter_map(|r| r.site_id.as_deref()))
        .collect();

    for t in &catalog.teachers {
        let owner = format!("Teacher '{}'", t.id);
        for slot in t
            .availability
            .iter()
            .chain(&t.preferences.preferred_slots)
            .chain(&t.preferences.avoided_slots)
        {
            check_slot(slot, &owner, &mut errors);
        }
        for subject in &t.subjects {
            if index.subject(subject).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("{owner} teaches unknown subject '{subject}'"),
                ));
            }
        }
        let mut travel_sites: Vec<&String> = t.travel_minutes.keys().collect();
        travel_sites.sort();
        for site in travel_sites {
            if !sites.contains(site.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("{owner} has travel time to unknown site '{site}'"),
                ));
            }
        }
        if t.max_hours_per_day == 0
            || t.total_weekly_hours == 0
            || t.preferences.max_consecutive_hours == 0
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("{owner} has a zero hour limit"),
            ));
        }
    }

    for c in &catalog.classes {
        if c.size == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Class '{}' has no students", c.id),
            ));
        }
        if let Some(lunch) = &c.policy.lunch_break {
            check_slot(lunch, &format!("Class '{}' lunch break", c.id), &mut errors);
        }
    }

    for s in &catalog.subjects {
        for class_id in s.weekly_hours.keys() {
            if index.class(class_id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Subject '{}' has hours for unknown class '{class_id}'", s.id),
                ));
            }
        }
    }

    for r in &catalog.rooms {
        if r.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Room '{}' has zero capacity", r.id),
            ));
        }
    }

    finish(errors)
}

/// Validates optimizer settings.
pub fn validate_settings(settings: &OptimizationSettings) -> ValidationResult {
    let mut errors = Vec::new();
    let mut invalid = |message: String| {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidSetting, message));
    };

    for (name, rate) in [
        ("mutation_rate", settings.mutation_rate),
        ("crossover_rate", settings.crossover_rate),
        ("elitism_rate", settings.elitism_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            invalid(format!("{name} must be in [0, 1], got {rate}"));
        }
    }
    if settings.population_size < 2 {
        invalid(format!(
            "population_size must be at least 2, got {}",
            settings.population_size
        ));
    }
    if settings.max_generations == 0 {
        invalid("max_generations must be at least 1".to_string());
    }
    if settings.max_runtime_secs == 0 {
        invalid("max_runtime_secs must be positive".to_string());
    }
    if settings.tournament_size == 0 {
        invalid("tournament_size must be at least 1".to_string());
    }
    if !settings.convergence_threshold.is_finite() {
        invalid("convergence_threshold must be finite".to_string());
    }

    finish(errors)
}

/// Validates a weekly grid.
pub fn validate_grid(grid: &WeeklyGrid) -> ValidationResult {
    let mut errors = Vec::new();
    if grid.days == 0 || grid.days > DAYS_PER_WEEK {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidValue,
            format!("grid days must be in 1..={DAYS_PER_WEEK}, got {}", grid.days),
        ));
    }
    if grid.day_start_min >= grid.day_end_min || grid.day_end_min > 24 * 60 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeSlot,
            format!(
                "grid day bounds {}-{} are not a valid day",
                grid.day_start_min, grid.day_end_min
            ),
        ));
    }
    if grid.slot_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidValue,
            "grid slot_minutes must be positive",
        ));
    }
    if let Some((start, end)) = grid.lunch_break {
        if start >= end {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!("grid lunch break {start}-{end} does not end after it starts"),
            ));
        } else if grid.day_start_min < grid.day_end_min
            && (start < grid.day_start_min || end > grid.day_end_min)
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeSlot,
                format!(
                    "grid lunch break {start}-{end} lies outside the day {}-{}",
                    grid.day_start_min, grid.day_end_min
                ),
            ));
        }
    }
    if errors.is_empty() && grid.slots().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidValue,
            format!(
                "grid yields no {}-minute lesson between {} and {}",
                grid.slot_minutes, grid.day_start_min, grid.day_end_min
            ),
        ));
    }
    finish(errors)
}

/// Validates a schedule against a catalog.
///
/// Checks entry ID uniqueness, slot well-formedness, and that every entry
/// references a known teacher, class, subject, and room.
pub fn validate_schedule(schedule: &Schedule, catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();
    let index = catalog.index();

    let mut seen = HashSet::new();
    for e in &schedule.entries {
        if !seen.insert(e.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate entry ID: {}", e.id),
            ));
        }
        check_slot(&e.slot, &format!("Entry {}", e.id), &mut errors);

        let references = [
            ("teacher", e.teacher_id.as_str(), index.teacher(&e.teacher_id).is_some()),
            ("class", e.class_id.as_str(), index.class(&e.class_id).is_some()),
            ("subject", e.subject_id.as_str(), index.subject(&e.subject_id).is_some()),
            ("room", e.room_id.as_str(), index.room(&e.room_id).is_some()),
        ];
        for (kind, id, known) in references {
            if !known {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Entry {} references unknown {kind} '{id}'", e.id),
                ));
            }
        }
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Room, ScheduleEntry, SchoolClass, Subject, Teacher};

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_teacher(
                Teacher::new("T1")
                    .with_subject("MATH")
                    .with_availability(TimeSlot::new(0, 480, 720))
                    .with_travel("ANNEX", 15),
            )
            .with_class(SchoolClass::new("1A", "MAIN"))
            .with_subject(Subject::new("MATH").with_hours("1A", 3))
            .with_room(Room::classroom("R1").with_site("ANNEX"))
    }

    #[test]
    fn test_valid_catalog() {
        assert!(validate_catalog(&sample_catalog()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let catalog = sample_catalog()
            .with_teacher(Teacher::new("T1"))
            .with_room(Room::classroom("R1"));
        let errors = validate_catalog(&catalog).unwrap_err();
        let dups: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 2);
        assert!(dups.iter().any(|e| e.message.contains("teacher")));
        assert!(dups.iter().any(|e| e.message.contains("room")));
    }

    #[test]
    fn test_malformed_availability() {
        let mut catalog = sample_catalog();
        catalog.teachers[0].availability.push(TimeSlot::new(0, 600, 600));
        catalog.teachers[0].availability.push(TimeSlot::new(9, 480, 540));
        let errors = validate_catalog(&catalog).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidTimeSlot)
                .count(),
            2
        );
    }

    #[test]
    fn test_unknown_references() {
        let mut catalog = sample_catalog();
        catalog.teachers[0] = Teacher::new("T1").with_subject("ART").with_travel("MOON", 5);
        catalog.subjects[0] = Subject::new("MATH").with_hours("9Z", 2);
        let errors = validate_catalog(&catalog).unwrap_err();
        let unknown: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::UnknownReference)
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(unknown.len(), 3);
        assert!(unknown.iter().any(|m| m.contains("ART")));
        assert!(unknown.iter().any(|m| m.contains("MOON")));
        assert!(unknown.iter().any(|m| m.contains("9Z")));
    }

    #[test]
    fn test_invalid_values() {
        let catalog = sample_catalog()
            .with_class(SchoolClass::new("1B", "MAIN").with_size(0))
            .with_room(Room::classroom("R2").with_capacity(0));
        let errors = validate_catalog(&catalog).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidValue)
                .count(),
            2
        );
    }

    #[test]
    fn test_settings() {
        assert!(validate_settings(&OptimizationSettings::default()).is_ok());

        let bad = OptimizationSettings::default()
            .with_mutation_rate(-0.1)
            .with_elitism_rate(2.0)
            .with_population_size(1)
            .with_max_generations(0)
            .with_max_runtime_secs(0)
            .with_tournament_size(0);
        let errors = validate_settings(&bad).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::InvalidSetting));
    }

    #[test]
    fn test_grid() {
        assert!(validate_grid(&WeeklyGrid::default()).is_ok());
        let bad = WeeklyGrid::default()
            .with_hours(600, 480)
            .with_slot_minutes(0)
            .with_lunch_break(Some((780, 780)));
        assert_eq!(validate_grid(&bad).unwrap_err().len(), 3);
    }

    #[test]
    fn test_grid_without_slots() {
        let short_day = WeeklyGrid::default()
            .with_hours(480, 520)
            .with_lunch_break(None);
        assert!(short_day.slots().is_empty());
        let errors = validate_grid(&short_day).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidValue);
    }

    #[test]
    fn test_grid_lunch_outside_day() {
        let grid = WeeklyGrid::default()
            .with_hours(480, 720)
            .with_lunch_break(Some((780, 840)));
        let errors = validate_grid(&grid).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTimeSlot);
    }

    #[test]
    fn test_schedule_references() {
        let catalog = sample_catalog();
        let slot = TimeSlot::new(0, 480, 540);
        let schedule = Schedule::with_entries(
            "external",
            vec![
                ScheduleEntry::new(1, "T1", "1A", "MATH", "R1", slot),
                ScheduleEntry::new(1, "T9", "1A", "MATH", "R9", TimeSlot::new(0, 540, 500)),
            ],
        );
        let errors = validate_schedule(&schedule, &catalog).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::InvalidTimeSlot));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::UnknownReference)
                .count(),
            2
        );
    }
}
