//! Timetable rules.
//!
//! Rules are a closed enum rather than stored closures, so a rule set can be
//! serialized, inspected, and toggled. Evaluation lives in
//! [`crate::evaluator`]; this module only describes the rules.

use serde::{Deserialize, Serialize};

use super::{Conflict, EntryId, Severity};

/// Whether a violated rule invalidates the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Must hold; any violation makes the schedule invalid.
    Hard,
    /// Should hold; violations only add penalty.
    Soft,
}

/// Built-in rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// A teacher teaches at most one lesson at a time.
    NoTeacherOverlap,
    /// A room hosts at most one lesson at a time.
    NoRoomOverlap,
    /// A class attends at most one lesson at a time.
    NoClassOverlap,
    /// Lessons fall inside the teacher's availability windows.
    TeacherAvailability,
    /// Each (class, subject) receives exactly its weekly hours.
    WeeklyHours,
    /// Consecutive lessons leave enough time to travel between sites.
    TravelTime,
    /// A subject's weekly hours are not piled onto one day.
    SubjectDistribution,
    /// Classes have no gaps longer than an hour.
    Compactness,
    /// Continuity subjects are taught back-to-back within a day.
    Continuity,
    /// Teachers stay within daily, weekly, and consecutive-hour limits.
    TeacherWorkload,
    /// Lessons respect the class lunch break, afternoon, and daily limits.
    ClassPolicy,
}

impl Rule {
    /// All built-in rules in default priority order.
    pub const ALL: [Rule; 11] = [
        Rule::NoTeacherOverlap,
        Rule::NoRoomOverlap,
        Rule::NoClassOverlap,
        Rule::TeacherAvailability,
        Rule::WeeklyHours,
        Rule::TravelTime,
        Rule::TeacherWorkload,
        Rule::SubjectDistribution,
        Rule::Continuity,
        Rule::Compactness,
        Rule::ClassPolicy,
    ];

    /// Kind this rule ships with.
    pub fn default_kind(self) -> ConstraintKind {
        match self {
            Rule::NoTeacherOverlap
            | Rule::NoRoomOverlap
            | Rule::NoClassOverlap
            | Rule::TeacherAvailability
            | Rule::WeeklyHours => ConstraintKind::Hard,
            _ => ConstraintKind::Soft,
        }
    }

    /// Reporting priority this rule ships with.
    pub fn default_priority(self) -> u32 {
        match self {
            Rule::NoTeacherOverlap | Rule::NoRoomOverlap | Rule::NoClassOverlap => 100,
            Rule::TeacherAvailability => 90,
            Rule::WeeklyHours => 85,
            Rule::TravelTime => 70,
            Rule::TeacherWorkload => 65,
            Rule::SubjectDistribution => 60,
            Rule::Continuity => 55,
            Rule::Compactness => 50,
            Rule::ClassPolicy => 45,
        }
    }

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Rule::NoTeacherOverlap => "No teacher double-booking",
            Rule::NoRoomOverlap => "No room double-booking",
            Rule::NoClassOverlap => "No class double-booking",
            Rule::TeacherAvailability => "Teacher availability",
            Rule::WeeklyHours => "Weekly hours",
            Rule::TravelTime => "Inter-site travel time",
            Rule::SubjectDistribution => "Even subject distribution",
            Rule::Compactness => "Compact class days",
            Rule::Continuity => "Continuous lessons",
            Rule::TeacherWorkload => "Teacher workload",
            Rule::ClassPolicy => "Class day policy",
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            Rule::NoTeacherOverlap => "A teacher cannot be in two places at the same time",
            Rule::NoRoomOverlap => "A room cannot host two classes at the same time",
            Rule::NoClassOverlap => "A class cannot attend two lessons at the same time",
            Rule::TeacherAvailability => "Teachers must be available in their assigned slots",
            Rule::WeeklyHours => "Every subject must receive its weekly hours per class",
            Rule::TravelTime => "Teachers need enough time to travel between sites",
            Rule::SubjectDistribution => "Subject hours should be spread across the week",
            Rule::Compactness => "Minimize idle hours between a class's lessons",
            Rule::Continuity => "Continuity subjects must use consecutive slots",
            Rule::TeacherWorkload => "Respect teachers' daily, weekly, and consecutive limits",
            Rule::ClassPolicy => "Respect class lunch breaks, afternoons, and daily limits",
        }
    }
}

/// A named, toggleable rule with its kind and priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Rule evaluated by this constraint.
    pub rule: Rule,
    /// Hard or soft.
    pub kind: ConstraintKind,
    /// Reporting priority (higher = more important). Never short-circuits.
    pub priority: u32,
    /// Whether the constraint is evaluated.
    pub active: bool,
}

impl Constraint {
    /// Creates an active constraint with the rule's default metadata.
    pub fn new(rule: Rule) -> Self {
        Self {
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            rule,
            kind: rule.default_kind(),
            priority: rule.default_priority(),
            active: true,
        }
    }

    /// Overrides the kind.
    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.kind = kind;
        self
    }

    /// Overrides the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the constraint is active.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether this is a hard constraint.
    pub fn is_hard(&self) -> bool {
        self.kind == ConstraintKind::Hard
    }
}

/// A single violation reported by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Rule that reported it.
    pub rule: Rule,
    /// Kind of the reporting constraint.
    pub kind: ConstraintKind,
    /// Human-readable description.
    pub description: String,
    /// Severity.
    pub severity: Severity,
    /// Implicated entry IDs.
    pub entry_ids: Vec<EntryId>,
}

impl ConstraintViolation {
    /// Reports this violation as a generic conflict.
    pub fn to_conflict(&self) -> Conflict {
        Conflict::violation(
            self.severity,
            self.entry_ids.clone(),
            format!("{}: {}", self.rule.name(), self.description),
        )
    }
}

/// Outcome of evaluating one rule or a whole rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintReport {
    /// False iff an active hard rule was violated.
    pub is_valid: bool,
    /// All violations, in rule order.
    pub violations: Vec<ConstraintViolation>,
    /// Sum of all rule penalties, hard and soft.
    pub penalty: f64,
}

impl Default for ConstraintReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            violations: Vec::new(),
            penalty: 0.0,
        }
    }
}

impl ConstraintReport {
    /// Number of violations reported by hard constraints.
    pub fn hard_violation_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.kind == ConstraintKind::Hard)
            .count()
    }

    /// Number of violations reported by soft constraints.
    pub fn soft_violation_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.kind == ConstraintKind::Soft)
            .count()
    }

    /// Violations reported by one rule.
    pub fn violations_of(&self, rule: Rule) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_defaults() {
        assert_eq!(Rule::NoTeacherOverlap.default_kind(), ConstraintKind::Hard);
        assert_eq!(Rule::WeeklyHours.default_kind(), ConstraintKind::Hard);
        assert_eq!(Rule::TravelTime.default_kind(), ConstraintKind::Soft);
        assert_eq!(Rule::Compactness.default_priority(), 50);
        assert_eq!(Rule::TeacherAvailability.default_priority(), 90);
    }

    #[test]
    fn test_all_rules_unique() {
        let mut rules = Rule::ALL.to_vec();
        rules.sort();
        rules.dedup();
        assert_eq!(rules.len(), Rule::ALL.len());
    }

    #[test]
    fn test_constraint_builder() {
        let c = Constraint::new(Rule::TravelTime)
            .with_kind(ConstraintKind::Hard)
            .with_priority(5)
            .with_active(false);
        assert!(c.is_hard());
        assert_eq!(c.priority, 5);
        assert!(!c.active);
        assert_eq!(c.name, "Inter-site travel time");
    }

    #[test]
    fn test_constraint_serde() {
        let c = Constraint::new(Rule::NoRoomOverlap);
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"no_room_overlap\""));
        let back: Constraint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_report_counts() {
        let v = |kind| ConstraintViolation {
            rule: Rule::Compactness,
            kind,
            description: String::new(),
            severity: Severity::Low,
            entry_ids: vec![],
        };
        let report = ConstraintReport {
            is_valid: false,
            violations: vec![v(ConstraintKind::Hard), v(ConstraintKind::Soft), v(ConstraintKind::Soft)],
            penalty: 3.0,
        };
        assert_eq!(report.hard_violation_count(), 1);
        assert_eq!(report.soft_violation_count(), 2);
        assert_eq!(report.violations_of(Rule::Compactness).count(), 3);
    }

    #[test]
    fn test_violation_to_conflict() {
        let v = ConstraintViolation {
            rule: Rule::TravelTime,
            kind: ConstraintKind::Soft,
            description: "too far".into(),
            severity: Severity::Medium,
            entry_ids: vec![4, 2],
        };
        let c = v.to_conflict();
        assert_eq!(c.conflict_type, crate::models::ConflictType::ConstraintViolation);
        assert_eq!(c.entry_ids, vec![2, 4]);
        assert!(c.description.starts_with("Inter-site travel time"));
    }
}
