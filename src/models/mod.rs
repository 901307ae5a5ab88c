//! Timetable domain models.
//!
//! Provides the entity catalog (teachers, classes, subjects, rooms), the
//! weekly time model, and the solution types the engine produces.
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling theory |
//! |-------------|-------------------|
//! | ScheduleEntry | Assignment |
//! | Teacher / Room / SchoolClass | Renewable resources |
//! | Subject weekly hours | Demand |
//! | TimeSlot | Time window |

mod calendar;
mod catalog;
mod class;
mod constraint;
mod room;
mod schedule;
mod subject;
mod teacher;

pub use calendar::{format_minutes, overlaps, to_minutes, TimeSlot, WeeklyGrid, DAYS_PER_WEEK};
pub use catalog::{Catalog, CatalogIndex};
pub use class::{ClassPolicy, DayType, SchoolClass, DEFAULT_AFTERNOON_START_MIN};
pub use constraint::{
    Constraint, ConstraintKind, ConstraintReport, ConstraintViolation, Rule,
};
pub use room::{Room, RoomType};
pub use schedule::{
    Conflict, ConflictType, EntryId, EntryKind, Schedule, ScheduleEntry, Severity,
};
pub use subject::Subject;
pub use teacher::{Teacher, TeacherPreferences};
