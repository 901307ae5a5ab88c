//! GA-based timetable optimization.
//!
//! A candidate is a whole [`Schedule`](crate::models::Schedule): its entry
//! list is the genome. The generic loop lives in [`GaRunner`] and works on
//! any [`GaProblem`]; [`TimetableProblem`] binds it to a catalog.
//!
//! # Submodules
//!
//! - [`operators`]: crossover, offspring repair, tournament selection
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

pub mod operators;
mod problem;
mod progress;
mod runner;

use rand::Rng;

pub use problem::TimetableProblem;
pub use progress::ProgressTracker;
pub use runner::{GaResult, GaRunner, GaState, TerminationReason};

/// A problem the GA can optimize. Higher fitness is better.
pub trait GaProblem {
    /// Candidate solution type. Clones must be independent deep copies.
    type Individual: Clone;

    /// Builds a random candidate.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Scores a candidate. Must be pure.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces offspring from two parents; the runner keeps the first.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> Vec<Self::Individual>;

    /// Mutates a candidate in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}
