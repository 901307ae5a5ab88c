//! School timetable optimization for the U-Engine ecosystem.
//!
//! Assigns weekly lessons (teacher × class × subject × room × time slot)
//! so that hard rules hold and soft criteria are traded off, using a
//! genetic algorithm seeded by random-greedy construction.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `SchoolClass`, `Subject`, `Room`,
//!   `Catalog`, `TimeSlot`, `WeeklyGrid`, `Schedule`, `Conflict`, `Constraint`
//! - **`conflicts`**: Pairwise double-booking detection per axis
//! - **`evaluator`**: Hard/soft rule evaluation (`ConstraintSet`)
//! - **`fitness`**: Weighted fitness score and its components
//! - **`ga`**: `GaProblem` trait, operators, generational runner
//! - **`scheduler`**: Greedy construction, `TimetableOptimizer`, KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown references, ranges)
//! - **`config`**: TOML-loadable engine configuration
//!
//! # Quick start
//!
//! ```
//! use u_timetable::config::OptimizationSettings;
//! use u_timetable::models::{Catalog, Room, SchoolClass, Subject, Teacher, TimeSlot};
//! use u_timetable::scheduler::TimetableOptimizer;
//!
//! let catalog = Catalog::new()
//!     .with_teacher(
//!         Teacher::new("T1")
//!             .with_subject("MATH")
//!             .with_availability(TimeSlot::parse(0, "08:00", "12:00").unwrap()),
//!     )
//!     .with_teacher(Teacher::new("T2").with_subject("MATH").with_subject("HIST"))
//!     .with_class(SchoolClass::new("1A", "MAIN"))
//!     .with_class(SchoolClass::new("1B", "MAIN"))
//!     .with_subject(Subject::new("MATH").with_hours("1A", 3).with_hours("1B", 2))
//!     .with_subject(Subject::new("HIST").with_hours("1A", 1))
//!     .with_room(Room::classroom("R1"))
//!     .with_room(Room::classroom("R2"));
//!
//! let settings = OptimizationSettings::default()
//!     .with_population_size(20)
//!     .with_max_generations(30)
//!     .with_seed(7);
//! let outcome = TimetableOptimizer::new(catalog, settings)?.optimize(None);
//!
//! assert_eq!(outcome.schedule.entry_count(), 6);
//! println!("{} after {} generations", outcome.termination, outcome.generations);
//! # Ok::<(), u_timetable::TimetableError>(())
//! ```
//!
//! # Architecture
//!
//! This crate sits at Layer 3 (Frameworks) in the U-Engine ecosystem. It
//! carries its own GA loop and contains only timetabling domain logic, with no
//! job-shop, nesting, or packing concepts.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

pub mod config;
pub mod conflicts;
pub mod error;
pub mod evaluator;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, TimetableError};
