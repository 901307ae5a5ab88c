//! Entity catalog and per-run lookup indices.
//!
//! A [`Catalog`] is the read-only input bundle of an optimization run.
//! [`CatalogIndex`] borrows it and precomputes the lookups the engine needs
//! on every evaluation: ID → entity, subject → qualified teachers, and
//! subject → compatible rooms.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Room, ScheduleEntry, SchoolClass, Subject, Teacher};

/// Teachers, classes, subjects, and rooms supplied to a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Teachers.
    pub teachers: Vec<Teacher>,
    /// Classes.
    pub classes: Vec<SchoolClass>,
    /// Subjects.
    pub subjects: Vec<Subject>,
    /// Rooms.
    pub rooms: Vec<Room>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a class.
    pub fn with_class(mut self, class: SchoolClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Builds the lookup indices for this catalog.
    pub fn index(&self) -> CatalogIndex<'_> {
        CatalogIndex::new(self)
    }

    /// Total lesson hours demanded across all (class, subject) pairs.
    pub fn total_demand(&self) -> u32 {
        self.classes
            .iter()
            .flat_map(|c| self.subjects.iter().map(move |s| s.hours_for(&c.id)))
            .sum()
    }
}

/// Borrowed lookup tables over a [`Catalog`].
///
/// If the catalog contains duplicate IDs the first occurrence wins; input
/// validation rejects such catalogs before a run.
#[derive(Debug, Clone)]
pub struct CatalogIndex<'a> {
    catalog: &'a Catalog,
    teachers: HashMap<&'a str, &'a Teacher>,
    classes: HashMap<&'a str, &'a SchoolClass>,
    subjects: HashMap<&'a str, &'a Subject>,
    rooms: HashMap<&'a str, &'a Room>,
    qualified: HashMap<&'a str, Vec<&'a Teacher>>,
    compatible_rooms: HashMap<&'a str, Vec<&'a Room>>,
}

impl<'a> CatalogIndex<'a> {
    /// Builds all indices in one pass per entity kind.
    pub fn new(catalog: &'a Catalog) -> Self {
        let mut teachers = HashMap::new();
        for t in &catalog.teachers {
            teachers.entry(t.id.as_str()).or_insert(t);
        }
        let mut classes = HashMap::new();
        for c in &catalog.classes {
            classes.entry(c.id.as_str()).or_insert(c);
        }
        let mut subjects = HashMap::new();
        for s in &catalog.subjects {
            subjects.entry(s.id.as_str()).or_insert(s);
        }
        let mut rooms = HashMap::new();
        for r in &catalog.rooms {
            rooms.entry(r.id.as_str()).or_insert(r);
        }

        let mut qualified: HashMap<&str, Vec<&Teacher>> = HashMap::new();
        let mut compatible_rooms: HashMap<&str, Vec<&Room>> = HashMap::new();
        for s in &catalog.subjects {
            qualified.insert(
                s.id.as_str(),
                catalog.teachers.iter().filter(|t| t.can_teach(&s.id)).collect(),
            );
            compatible_rooms.insert(
                s.id.as_str(),
                catalog.rooms.iter().filter(|r| r.suits(s)).collect(),
            );
        }

        Self {
            catalog,
            teachers,
            classes,
            subjects,
            rooms,
            qualified,
            compatible_rooms,
        }
    }

    /// The indexed catalog.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Looks up a teacher.
    pub fn teacher(&self, id: &str) -> Option<&'a Teacher> {
        self.teachers.get(id).copied()
    }

    /// Looks up a class.
    pub fn class(&self, id: &str) -> Option<&'a SchoolClass> {
        self.classes.get(id).copied()
    }

    /// Looks up a subject.
    pub fn subject(&self, id: &str) -> Option<&'a Subject> {
        self.subjects.get(id).copied()
    }

    /// Looks up a room.
    pub fn room(&self, id: &str) -> Option<&'a Room> {
        self.rooms.get(id).copied()
    }

    /// Teachers qualified for a subject, in catalog order.
    pub fn qualified_teachers(&self, subject_id: &str) -> &[&'a Teacher] {
        self.qualified
            .get(subject_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rooms whose type suits a subject, in catalog order.
    pub fn compatible_rooms(&self, subject_id: &str) -> &[&'a Room] {
        self.compatible_rooms
            .get(subject_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Site where an entry takes place: the room's site, else the class's
    /// home site.
    pub fn site_of(&self, entry: &ScheduleEntry) -> Option<&'a str> {
        self.room(&entry.room_id)
            .and_then(|r| r.site_id.as_deref())
            .or_else(|| self.class(&entry.class_id).map(|c| c.site_id.as_str()))
    }

    /// Whether every ID referenced by the entry exists in the catalog.
    pub fn knows(&self, entry: &ScheduleEntry) -> bool {
        self.teachers.contains_key(entry.teacher_id.as_str())
            && self.classes.contains_key(entry.class_id.as_str())
            && self.subjects.contains_key(entry.subject_id.as_str())
            && self.rooms.contains_key(entry.room_id.as_str())
    }
}
