//! Engine configuration.
//!
//! Settings can be built in code with `with_*` setters or loaded from TOML.
//! Every section and field is optional and falls back to its default.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [optimization]
//!     max_generations = 200
//!     population_size = 80
//!     seed = 7
//!
//!     [grid]
//!     days = 5
//! "#).unwrap();
//!
//! assert_eq!(config.optimization.max_generations, 200);
//! assert_eq!(config.optimization.seed, Some(7));
//! assert_eq!(config.optimization.mutation_rate, 0.1);
//! assert_eq!(config.grid.days, 5);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fitness::FitnessWeights;
use crate::models::WeeklyGrid;
use crate::validation;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Genetic optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    /// Generation cap.
    pub max_generations: usize,
    /// Candidates per generation.
    pub population_size: usize,
    /// Probability that an offspring is mutated.
    pub mutation_rate: f64,
    /// Probability that an offspring is a crossover child rather than a
    /// clone of its first parent.
    pub crossover_rate: f64,
    /// Fraction of the population copied unchanged into the next generation.
    pub elitism_rate: f64,
    /// Best fitness at which the run stops early.
    pub convergence_threshold: f64,
    /// Wall-clock budget in seconds.
    pub max_runtime_secs: u64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Candidates sampled per tournament.
    pub tournament_size: usize,
    /// Upper bound of changes applied by one mutation.
    pub max_mutations: usize,
    /// Placement attempts per required weekly hour during construction.
    pub construction_attempts: usize,
    /// Evaluate fitness on the rayon pool.
    pub parallel: bool,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            max_generations: 100,
            population_size: 50,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism_rate: 0.2,
            convergence_threshold: 950.0,
            max_runtime_secs: 30,
            seed: None,
            tournament_size: 3,
            max_mutations: 3,
            construction_attempts: 25,
            parallel: true,
        }
    }
}

impl OptimizationSettings {
    /// Sets the generation cap.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elitism rate.
    pub fn with_elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Sets the wall-clock budget in seconds.
    pub fn with_max_runtime_secs(mut self, secs: u64) -> Self {
        self.max_runtime_secs = secs;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, n: usize) -> Self {
        self.tournament_size = n;
        self
    }

    /// Sets the per-offspring mutation cap.
    pub fn with_max_mutations(mut self, n: usize) -> Self {
        self.max_mutations = n;
        self
    }

    /// Sets the construction attempt cap per required hour.
    pub fn with_construction_attempts(mut self, n: usize) -> Self {
        self.construction_attempts = n;
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Wall-clock budget.
    pub fn max_runtime(&self) -> Duration {
        Duration::from_secs(self.max_runtime_secs)
    }

    /// Number of elites carried over per generation.
    ///
    /// At least one when the rate is positive, never the whole population.
    pub fn elite_count(&self) -> usize {
        if self.elitism_rate <= 0.0 || self.population_size == 0 {
            return 0;
        }
        let n = (self.elitism_rate * self.population_size as f64).floor() as usize;
        n.clamp(1, self.population_size)
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Optimizer settings.
    pub optimization: OptimizationSettings,
    /// Weekly slot grid offered to the optimizer.
    pub grid: WeeklyGrid,
    /// Fitness weights.
    pub fitness: FitnessWeights,
}

impl EngineConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid TOML, or
    /// holds out-of-range settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string and checks its ranges.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Sets the optimizer settings.
    pub fn with_optimization(mut self, optimization: OptimizationSettings) -> Self {
        self.optimization = optimization;
        self
    }

    /// Sets the slot grid.
    pub fn with_grid(mut self, grid: WeeklyGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the fitness weights.
    pub fn with_fitness(mut self, fitness: FitnessWeights) -> Self {
        self.fitness = fitness;
        self
    }

    /// Checks settings and grid ranges.
    pub fn check(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if let Err(e) = validation::validate_settings(&self.optimization) {
            errors.extend(e);
        }
        if let Err(e) = validation::validate_grid(&self.grid) {
            errors.extend(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            Err(ConfigError::Invalid(messages.join("; ")))
        }
    }
}
