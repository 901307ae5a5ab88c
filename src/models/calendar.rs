//! Weekly time model.
//!
//! A [`TimeSlot`] is a half-open interval `[start, end)` of minutes since
//! midnight on one day of the week. Slots on different days never overlap.
//! [`WeeklyGrid`] generates the fixed lesson grid the optimizer draws from.
//!
//! # Time Model
//! Days are numbered 0..=6 starting Monday. Times are minute offsets;
//! wall-clock `HH:mm` strings are converted with [`to_minutes`].

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::TimeFormatError;

/// Number of days in a week.
pub const DAYS_PER_WEEK: u8 = 7;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Converts an `HH:mm` wall-clock string to minutes since midnight.
///
/// # Examples
///
/// ```
/// use u_timetable::models::to_minutes;
///
/// assert_eq!(to_minutes("08:30").unwrap(), 510);
/// assert!(to_minutes("8h30").is_err());
/// ```
pub fn to_minutes(time: &str) -> Result<u32, TimeFormatError> {
    let err = || TimeFormatError {
        input: time.to_string(),
    };
    let trimmed = time.trim();
    // chrono accepts a single minute digit; `HH:mm` requires two
    if !trimmed.split_once(':').is_some_and(|(_, m)| m.len() == 2) {
        return Err(err());
    }
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| err())?;
    Ok(parsed.hour() * 60 + parsed.minute())
}

/// Formats minutes since midnight as `HH:mm`.
///
/// Values past the end of the day (a `24:00` bound) are rendered as plain
/// hour and minute counts.
pub fn format_minutes(minutes: u32) -> String {
    match NaiveTime::from_num_seconds_from_midnight_opt(minutes.saturating_mul(60), 0) {
        Some(t) => t.format("%H:%M").to_string(),
        None => format!("{:02}:{:02}", minutes / 60, minutes % 60),
    }
}

/// A bounded interval on one weekday: `[start_min, end_min)`.
///
/// The engine assumes well-formed slots (`start_min < end_min`, `day < 7`);
/// callers reject anything else through validation before a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Weekday, 0 = Monday.
    pub day: u8,
    /// Start (minutes since midnight, inclusive).
    pub start_min: u32,
    /// End (minutes since midnight, exclusive).
    pub end_min: u32,
}

impl TimeSlot {
    /// Creates a slot from minute offsets.
    pub fn new(day: u8, start_min: u32, end_min: u32) -> Self {
        Self {
            day,
            start_min,
            end_min,
        }
    }

    /// Creates a slot from `HH:mm` strings.
    pub fn parse(day: u8, start: &str, end: &str) -> Result<Self, TimeFormatError> {
        Ok(Self::new(day, to_minutes(start)?, to_minutes(end)?))
    }

    /// Duration in minutes (0 for inverted slots).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether the slot has a valid day and a positive length.
    pub fn is_well_formed(&self) -> bool {
        self.day < DAYS_PER_WEEK && self.start_min < self.end_min && self.end_min <= 24 * 60
    }

    /// Whether two slots overlap: same day and non-empty intersection.
    ///
    /// Touching slots (`08:00-09:00` and `09:00-10:00`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Whether `other` lies entirely inside this slot.
    pub fn contains(&self, other: &Self) -> bool {
        self.day == other.day && self.start_min <= other.start_min && other.end_min <= self.end_min
    }

    /// Minutes between the end of `self` and the start of a later slot on the
    /// same day. `None` across days or when `next` starts before `self` ends.
    pub fn gap_until(&self, next: &Self) -> Option<u32> {
        if self.day != next.day || next.start_min < self.end_min {
            return None;
        }
        Some(next.start_min - self.end_min)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = DAY_NAMES.get(self.day as usize).copied().unwrap_or("???");
        write!(
            f,
            "{} {}-{}",
            day,
            format_minutes(self.start_min),
            format_minutes(self.end_min)
        )
    }
}

/// Free function form of [`TimeSlot::overlaps`].
#[inline]
pub fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.overlaps(b)
}

/// Fixed weekly lesson grid.
///
/// Slots of `slot_minutes` are laid back-to-back from `day_start_min` until
/// `day_end_min`, skipping the lunch break. The default reproduces a
/// Monday–Saturday week of eight one-hour lessons with lunch 13:00–14:00.
///
/// # Examples
///
/// ```
/// use u_timetable::models::WeeklyGrid;
///
/// let grid = WeeklyGrid::default();
/// let slots = grid.slots();
/// assert_eq!(slots.len(), 6 * 8);
/// assert!(slots.iter().all(|s| s.duration_minutes() == 60));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyGrid {
    /// Number of teaching days, starting Monday.
    pub days: u8,
    /// First lesson start (minutes since midnight).
    pub day_start_min: u32,
    /// Last lesson end bound (minutes since midnight).
    pub day_end_min: u32,
    /// Lesson length in minutes.
    pub slot_minutes: u32,
    /// Break excluded from the grid, as `(start_min, end_min)`.
    pub lunch_break: Option<(u32, u32)>,
}

impl Default for WeeklyGrid {
    fn default() -> Self {
        Self {
            days: 6,
            day_start_min: 8 * 60,
            day_end_min: 17 * 60,
            slot_minutes: 60,
            lunch_break: Some((13 * 60, 14 * 60)),
        }
    }
}

impl WeeklyGrid {
    /// Sets the number of teaching days.
    pub fn with_days(mut self, days: u8) -> Self {
        self.days = days.min(DAYS_PER_WEEK);
        self
    }

    /// Sets the daily bounds.
    pub fn with_hours(mut self, day_start_min: u32, day_end_min: u32) -> Self {
        self.day_start_min = day_start_min;
        self.day_end_min = day_end_min;
        self
    }

    /// Sets the lesson length.
    pub fn with_slot_minutes(mut self, slot_minutes: u32) -> Self {
        self.slot_minutes = slot_minutes;
        self
    }

    /// Sets or clears the lunch break.
    pub fn with_lunch_break(mut self, lunch_break: Option<(u32, u32)>) -> Self {
        self.lunch_break = lunch_break;
        self
    }

    /// Generates every slot of the week, ordered by day then start time.
    pub fn slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        if self.slot_minutes == 0 {
            return slots;
        }
        for day in 0..self.days.min(DAYS_PER_WEEK) {
            let mut t = self.day_start_min;
            while t + self.slot_minutes <= self.day_end_min {
                let slot = TimeSlot::new(day, t, t + self.slot_minutes);
                if let Some((ls, le)) = self.lunch_break {
                    let lunch = TimeSlot::new(day, ls, le);
                    if slot.overlaps(&lunch) {
                        t = t.max(le);
                        continue;
                    }
                }
                slots.push(slot);
                t += self.slot_minutes;
            }
        }
        slots
    }
}
