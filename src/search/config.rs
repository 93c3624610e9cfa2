// Configuration for the stochastic run-count search
//
// Population shares (elite / mutation / exploration) and sampling ranges are
// configurable so experiments can be repeated with different budgets from a
// TOML file without recompilation.

use crate::error::{EstimateError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the run-count search
///
/// # Example
/// ```
/// use flakerun::search::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.population_size, 1000);
/// assert_eq!(config.elite_count(), 100);
/// assert_eq!(config.mutation_count(), 800);
/// ```
///
/// # Example TOML
/// ```toml
/// population_size = 500
/// generations = 300
/// mutation_spread = 0.02
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates per generation
    pub population_size: usize,

    /// Generations to run. Zero makes the search degenerate.
    pub generations: usize,

    /// Share of the population carried over unchanged (elitism)
    pub elite_fraction: f64,

    /// Share of the population derived by perturbing an elite run count
    pub mutation_fraction: f64,

    /// Share of the population sampled fresh each generation
    ///
    /// Keeps the search from collapsing onto the first region it finds.
    pub exploration_fraction: f64,

    /// Half-width of the multiplicative perturbation: factor in `[1 - s, 1 + s]`
    pub mutation_spread: f64,

    /// Lower bound (inclusive) for sampled run counts
    pub initial_min_runs: u64,

    /// Upper bound (inclusive) of the initial population's run counts
    pub initial_max_runs: u64,

    /// Exploration samples run counts in `[initial_min_runs, population_size * exploration_scale]`
    pub exploration_scale: u64,

    /// RNG seed for reproducible searches. `None` draws from the thread RNG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            generations: 1000,
            elite_fraction: 0.1,
            mutation_fraction: 0.8,
            exploration_fraction: 0.1,
            mutation_spread: 0.02,
            initial_min_runs: 2,
            initial_max_runs: 5000,
            exploration_scale: 100,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Small budget for interactive use and tests
    pub fn quick() -> Self {
        Self {
            population_size: 200,
            generations: 200,
            ..Self::default()
        }
    }

    /// Larger budget for tests with very low failure rates
    pub fn thorough() -> Self {
        Self {
            population_size: 2000,
            generations: 2000,
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SearchConfig =
            toml::from_str(content).map_err(|e| EstimateError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read search config: {}", path.as_ref().display())
        })?;

        Self::from_toml_str(&content).with_context(|| {
            format!("Failed to parse search config: {}", path.as_ref().display())
        })
    }

    /// Number of candidates kept unchanged each generation
    pub fn elite_count(&self) -> usize {
        share(self.population_size, self.elite_fraction)
    }

    /// Number of candidates produced by mutating an elite
    pub fn mutation_count(&self) -> usize {
        share(self.population_size, self.mutation_fraction)
    }

    /// Number of freshly sampled candidates
    pub fn exploration_count(&self) -> usize {
        share(self.population_size, self.exploration_fraction)
    }

    /// Upper bound (inclusive) for exploration samples
    pub fn exploration_max_runs(&self) -> u64 {
        (self.population_size as u64)
            .saturating_mul(self.exploration_scale)
            .max(self.initial_min_runs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("elite_fraction", self.elite_fraction),
            ("mutation_fraction", self.mutation_fraction),
            ("exploration_fraction", self.exploration_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EstimateError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let total = self.elite_fraction + self.mutation_fraction + self.exploration_fraction;
        if total > 1.0 + f64::EPSILON {
            return Err(EstimateError::InvalidConfig(format!(
                "population fractions must not sum above 1, got {total}"
            )));
        }

        if self.elite_count() == 0 {
            return Err(EstimateError::InvalidConfig(format!(
                "population_size {} with elite_fraction {} leaves no elite candidates",
                self.population_size, self.elite_fraction
            )));
        }

        if !(0.0..1.0).contains(&self.mutation_spread) {
            return Err(EstimateError::InvalidConfig(format!(
                "mutation_spread must be in [0, 1), got {}",
                self.mutation_spread
            )));
        }

        if self.initial_min_runs == 0 || self.initial_min_runs > self.initial_max_runs {
            return Err(EstimateError::InvalidConfig(format!(
                "initial run range [{}, {}] is empty or starts at zero",
                self.initial_min_runs, self.initial_max_runs
            )));
        }

        Ok(())
    }
}

/// `floor(size * fraction)`
fn share(size: usize, fraction: f64) -> usize {
    (size as f64 * fraction).floor() as usize
}
