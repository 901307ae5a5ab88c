//! Generational GA loop.
//!
//! # Algorithm
//!
//! ```text
//! Initializing: P ← populationSize individuals from create_individual
//! loop:
//!     Evolving:   score P (rayon when parallel); track the global best
//!     check:      best ≥ threshold      → Converged
//!                 elapsed ≥ max runtime  → TimedOut
//!                 cancel flag set        → Cancelled
//!                 generation cap reached → MaxGenerationsReached
//!     breed:      elites (top elitismRate × |P|) unchanged, then until full:
//!                 two tournament parents → crossover (p = crossoverRate,
//!                 else clone of parent 1) → mutate (p = mutationRate)
//! Finalizing: return the best individual ever seen
//! ```
//!
//! Each generation is scored completely before the termination check, so
//! cancellation and timeouts only take effect at generation boundaries.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::operators::tournament_select;
use super::{GaProblem, ProgressTracker};
use crate::config::OptimizationSettings;

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaState {
    /// Building the first population.
    Initializing,
    /// Scoring and breeding generations.
    Evolving,
    /// Packaging the best individual.
    Finalizing,
    /// Run complete.
    Done,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Best fitness reached the convergence threshold.
    Converged,
    /// The wall-clock budget ran out.
    TimedOut,
    /// The generation cap was reached.
    MaxGenerationsReached,
    /// The caller raised the cancel flag.
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationReason::Converged => "converged",
            TerminationReason::TimedOut => "timed out",
            TerminationReason::MaxGenerationsReached => "max generations reached",
            TerminationReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual across all generations.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations scored.
    pub generations: usize,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Best fitness of each generation.
    pub history: Vec<f64>,
}

/// Runs the generational loop for any [`GaProblem`].
#[derive(Debug, Clone, Copy)]
pub struct GaRunner<'a> {
    settings: &'a OptimizationSettings,
    progress: Option<&'a ProgressTracker>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> GaRunner<'a> {
    /// Creates a runner.
    pub fn new(settings: &'a OptimizationSettings) -> Self {
        Self {
            settings,
            progress: None,
            cancel: None,
        }
    }

    /// Reports progress to `progress`.
    pub fn with_progress(mut self, progress: &'a ProgressTracker) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stops at the next generation boundary once `cancel` is set.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Runs to termination.
    pub fn run<P, R>(&self, problem: &P, rng: &mut R) -> GaResult<P::Individual>
    where
        P: GaProblem + Sync,
        P::Individual: Send + Sync,
        R: Rng,
    {
        let s = self.settings;
        let start = Instant::now();
        let size = s.population_size.max(1);
        let elites = s.elite_count().min(size);

        let mut state = GaState::Initializing;
        debug!(?state, population = size, "ga state");
        let mut population: Vec<P::Individual> =
            (0..size).map(|_| problem.create_individual(rng)).collect();

        state = GaState::Evolving;
        debug!(?state, "ga state");
        let mut fitness = self.evaluate_all(problem, &population);
        let first = best_index(&fitness);
        let mut best = population[first].clone();
        let mut best_fitness = fitness[first];
        let mut history = Vec::new();
        let mut generation = 0usize;

        let termination = loop {
            let gen_best = best_index(&fitness);
            if fitness[gen_best] > best_fitness {
                best = population[gen_best].clone();
                best_fitness = fitness[gen_best];
            }
            history.push(fitness[gen_best]);
            debug!(
                generation,
                best = fitness[gen_best],
                mean = fitness.iter().sum::<f64>() / fitness.len() as f64,
                "generation scored"
            );
            if let Some(p) = self.progress {
                p.update_ratio(generation + 1, s.max_generations.max(1));
            }

            if let Some(reason) = self.should_stop(best_fitness, start, generation) {
                break reason;
            }

            population = self.breed(problem, &population, &fitness, elites, rng);
            fitness = self.evaluate_all(problem, &population);
            generation += 1;
        };

        state = GaState::Finalizing;
        debug!(?state, %termination, "ga state");
        if let Some(p) = self.progress {
            p.finish();
        }
        let elapsed = start.elapsed();
        state = GaState::Done;
        debug!(?state, "ga state");
        info!(
            generations = generation + 1,
            best_fitness,
            %termination,
            elapsed_ms = elapsed.as_millis() as u64,
            "ga run finished"
        );

        GaResult {
            best,
            best_fitness,
            generations: generation + 1,
            termination,
            elapsed,
            history,
        }
    }

    fn evaluate_all<P>(&self, problem: &P, population: &[P::Individual]) -> Vec<f64>
    where
        P: GaProblem + Sync,
        P::Individual: Send + Sync,
    {
        if self.settings.parallel {
            population.par_iter().map(|i| problem.evaluate(i)).collect()
        } else {
            population.iter().map(|i| problem.evaluate(i)).collect()
        }
    }

    fn should_stop(
        &self,
        best_fitness: f64,
        start: Instant,
        generation: usize,
    ) -> Option<TerminationReason> {
        let s = self.settings;
        if best_fitness >= s.convergence_threshold {
            Some(TerminationReason::Converged)
        } else if start.elapsed() >= s.max_runtime() {
            Some(TerminationReason::TimedOut)
        } else if self.cancel.is_some_and(|c| c.load(Ordering::Acquire)) {
            Some(TerminationReason::Cancelled)
        } else if generation + 1 >= s.max_generations {
            Some(TerminationReason::MaxGenerationsReached)
        } else {
            None
        }
    }

    fn breed<P, R>(
        &self,
        problem: &P,
        population: &[P::Individual],
        fitness: &[f64],
        elites: usize,
        rng: &mut R,
    ) -> Vec<P::Individual>
    where
        P: GaProblem,
        R: Rng,
    {
        let s = self.settings;
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut next: Vec<P::Individual> = Vec::with_capacity(population.len());
        next.extend(order.iter().take(elites).map(|&i| population[i].clone()));

        let crossover_rate = s.crossover_rate.clamp(0.0, 1.0);
        let mutation_rate = s.mutation_rate.clamp(0.0, 1.0);
        while next.len() < population.len() {
            let p1 = tournament_select(fitness, s.tournament_size, rng);
            let p2 = tournament_select(fitness, s.tournament_size, rng);
            let mut child = if rng.random_bool(crossover_rate) {
                problem
                    .crossover(&population[p1], &population[p2], rng)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| population[p1].clone())
            } else {
                population[p1].clone()
            };
            if rng.random_bool(mutation_rate) {
                problem.mutate(&mut child, rng);
            }
            next.push(child);
        }
        next
    }
}

fn best_index(fitness: &[f64]) -> usize {
    fitness
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// OneMax: maximize the number of `true` bits.
    struct OneMax {
        bits: usize,
    }

    impl GaProblem for OneMax {
        type Individual = Vec<bool>;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
            (0..self.bits).map(|_| rng.random_bool(0.5)).collect()
        }

        fn evaluate(&self, individual: &Vec<bool>) -> f64 {
            individual.iter().filter(|&&b| b).count() as f64
        }

        fn crossover<R: Rng>(&self, p1: &Vec<bool>, p2: &Vec<bool>, rng: &mut R) -> Vec<Vec<bool>> {
            vec![crate::ga::operators::single_point_crossover(p1, p2, rng)]
        }

        fn mutate<R: Rng>(&self, individual: &mut Vec<bool>, rng: &mut R) {
            let i = rng.random_range(0..individual.len());
            individual[i] = !individual[i];
        }
    }

    fn settings() -> OptimizationSettings {
        OptimizationSettings::default()
            .with_max_generations(40)
            .with_population_size(20)
            .with_mutation_rate(0.3)
            .with_convergence_threshold(1e9)
            .with_parallel(false)
    }

    #[test]
    fn test_elitism_keeps_best_monotonic() {
        let problem = OneMax { bits: 32 };
        let s = settings();
        let mut rng = SmallRng::seed_from_u64(42);
        let result = GaRunner::new(&s).run(&problem, &mut rng);
        assert_eq!(result.termination, TerminationReason::MaxGenerationsReached);
        assert_eq!(result.generations, 40);
        assert_eq!(result.history.len(), 40);
        for w in result.history.windows(2) {
            assert!(w[1] >= w[0], "best fitness dropped: {:?}", w);
        }
        assert_eq!(result.best_fitness, problem.evaluate(&result.best));
        assert!(result.history.last().is_some_and(|&f| f >= result.history[0]));
    }

    #[test]
    fn test_converges_early() {
        let problem = OneMax { bits: 8 };
        let s = settings().with_convergence_threshold(8.0).with_max_generations(10_000);
        let mut rng = SmallRng::seed_from_u64(42);
        let result = GaRunner::new(&s).run(&problem, &mut rng);
        assert_eq!(result.termination, TerminationReason::Converged);
        assert_eq!(result.best_fitness, 8.0);
        assert!(result.generations < 10_000);
    }

    #[test]
    fn test_times_out() {
        let problem = OneMax { bits: 64 };
        let s = settings()
            .with_max_generations(100_000_000)
            .with_max_runtime_secs(1);
        let mut rng = SmallRng::seed_from_u64(42);
        let start = Instant::now();
        let result = GaRunner::new(&s).run(&problem, &mut rng);
        assert_eq!(result.termination, TerminationReason::TimedOut);
        assert!(result.elapsed >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_cancel_at_boundary() {
        let problem = OneMax { bits: 16 };
        let s = settings().with_max_generations(1000);
        let cancel = AtomicBool::new(true);
        let mut rng = SmallRng::seed_from_u64(42);
        let result = GaRunner::new(&s).with_cancel(&cancel).run(&problem, &mut rng);
        assert_eq!(result.termination, TerminationReason::Cancelled);
        assert_eq!(result.generations, 1);
    }

    #[test]
    fn test_progress_reaches_100() {
        let problem = OneMax { bits: 16 };
        let s = settings().with_max_generations(5);
        let progress = ProgressTracker::new();
        let mut rng = SmallRng::seed_from_u64(42);
        GaRunner::new(&s).with_progress(&progress).run(&problem, &mut rng);
        assert_eq!(progress.get(), 100);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = OneMax { bits: 24 };
        let seq = settings().with_max_generations(10);
        let par = seq.clone().with_parallel(true);
        let a = GaRunner::new(&seq).run(&problem, &mut SmallRng::seed_from_u64(9));
        let b = GaRunner::new(&par).run(&problem, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a.history, b.history);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_zero_crossover_rate_clones() {
        let problem = OneMax { bits: 16 };
        let s = settings()
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0)
            .with_max_generations(5);
        let mut rng = SmallRng::seed_from_u64(42);
        let result = GaRunner::new(&s).run(&problem, &mut rng);
        // Without variation the population can only concentrate existing genomes
        assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
    }
}
