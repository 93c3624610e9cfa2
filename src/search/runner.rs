// Generational search for the smallest run count that reaches a detection target

use crate::error::{EstimateError, Result};
use crate::model::{self, FitnessStrategy, FlakeProfile, ReciprocalFitness};
use crate::search::config::SearchConfig;
use crate::search::outcome::{GenerationReport, SearchOutcome};
use crate::search::population::{
    initial_population, next_generation, rank, Candidate, RankedCandidate,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Upper bound on history entries reserved before the first generation runs
const HISTORY_RESERVE_LIMIT: usize = 10_000;

/// One evaluate-rank-replace cycle
struct GenerationStep {
    ranked: Vec<RankedCandidate>,
    next_population: Vec<Candidate>,
}

/// Population-based search for a near-minimal number of repeated executions
///
/// The fitness strategy is a type parameter, so alternative scorings are
/// statically dispatched.
///
/// # Example
/// ```
/// use flakerun::model::FlakeProfile;
/// use flakerun::search::{RunCountSearch, SearchConfig};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let config = SearchConfig { population_size: 50, generations: 20, ..SearchConfig::default() };
/// let profile = FlakeProfile::new(0.5, 0.5).unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let outcome = RunCountSearch::new(config).run(&profile, 0.5, &mut rng).unwrap();
/// assert!(outcome.reaches_target());
/// ```
#[derive(Debug, Clone)]
pub struct RunCountSearch<F = ReciprocalFitness> {
    config: SearchConfig,
    strategy: F,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl RunCountSearch<ReciprocalFitness> {
    /// Search with the default reciprocal fitness
    pub fn new(config: SearchConfig) -> Self {
        Self::with_strategy(config, ReciprocalFitness)
    }
}

impl<F: FitnessStrategy> RunCountSearch<F> {
    /// Search with a custom fitness strategy
    pub fn with_strategy(config: SearchConfig, strategy: F) -> Self {
        Self {
            config,
            strategy,
            stop_flag: None,
        }
    }

    /// Attach an external stop flag
    ///
    /// The flag is read exactly once, when [`run`](Self::run) starts. It is a
    /// gate, not a cancellation point: once generations are running they all
    /// complete. A flag that is already set fails the run with
    /// [`EstimateError::DegenerateSearch`].
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Configuration the search runs with
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search with a caller-supplied RNG
    ///
    /// # Errors
    /// - [`EstimateError::InvalidConfig`] if the configuration does not validate
    /// - [`EstimateError::InvalidParameter`] if `target` is not in (0, 1)
    /// - [`EstimateError::DegenerateSearch`] if the stop flag is already set or
    ///   `generations` is zero, since no candidate would ever be ranked
    pub fn run<R: Rng + ?Sized>(
        &self,
        profile: &FlakeProfile,
        target: f64,
        rng: &mut R,
    ) -> Result<SearchOutcome> {
        self.config.validate()?;
        model::validate_target(target)?;

        // Single-shot gate: checked once before the first generation and never
        // again. Turning this into a per-generation check changes behavior.
        if self
            .stop_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            tracing::warn!("Stop flag set before the search started; no generations executed");
            return Err(EstimateError::DegenerateSearch {
                reason: "stop flag was set before any generation ran".to_string(),
            });
        }

        if self.config.generations == 0 {
            tracing::warn!("Search configured with zero generations");
            return Err(EstimateError::DegenerateSearch {
                reason: "generations must be at least 1".to_string(),
            });
        }

        tracing::info!(
            p = profile.pass_probability,
            fe = profile.fail_probability,
            target_confidence = target,
            population = self.config.population_size,
            generations = self.config.generations,
            "Starting run-count search"
        );

        let mut population = initial_population(&self.config, rng);
        let mut final_generation: Vec<RankedCandidate> = Vec::new();
        let mut history = Vec::with_capacity(self.config.generations.min(HISTORY_RESERVE_LIMIT));

        for generation in 0..self.config.generations {
            let step = self.step(&population, profile, target, rng)?;

            if let Some(best) = step.ranked.first() {
                tracing::debug!(
                    generation,
                    run_count = best.run_count,
                    fitness = best.fitness,
                    "Best candidate so far"
                );
                history.push(GenerationReport {
                    generation,
                    best_run_count: best.run_count,
                    best_fitness: best.fitness,
                });
            }

            population = step.next_population;
            final_generation = step.ranked;
        }

        let best = final_generation
            .first()
            .copied()
            .ok_or_else(|| EstimateError::DegenerateSearch {
                reason: "final generation was empty".to_string(),
            })?;

        let closeness = profile.closeness(best.run_count, target)?;
        let outcome = SearchOutcome {
            run_count: best.run_count,
            fitness: best.fitness,
            closeness,
            detection_probability: profile.detection_probability(best.run_count),
            target,
            profile: *profile,
            generations_run: history.len(),
            history,
            final_generation,
        };

        tracing::info!(
            run_count = outcome.run_count,
            fitness = outcome.fitness,
            detection_probability = outcome.detection_probability,
            "Run-count search finished"
        );

        Ok(outcome)
    }

    /// Run the search with an RNG seeded from the configuration, or from
    /// entropy when no seed is configured
    pub fn run_from_config(&self, profile: &FlakeProfile, target: f64) -> Result<SearchOutcome> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(profile, target, &mut rng)
    }

    fn step<R: Rng + ?Sized>(
        &self,
        population: &[Candidate],
        profile: &FlakeProfile,
        target: f64,
        rng: &mut R,
    ) -> Result<GenerationStep> {
        let ranked = rank(population, profile, target, &self.strategy)?;
        let next_population = next_generation(&ranked, &self.config, rng)?;
        Ok(GenerationStep {
            ranked,
            next_population,
        })
    }
}

/// Find a near-minimal run count with the default strategy and thread RNG
///
/// `p` and `fe` are used as given; callers must keep `p + fe <= 1`.
pub fn search(
    initial_population_size: usize,
    generations: usize,
    p: f64,
    fe: f64,
    target: f64,
) -> Result<u64> {
    let config = SearchConfig {
        population_size: initial_population_size,
        generations,
        ..SearchConfig::default()
    };
    let profile = FlakeProfile {
        pass_probability: p,
        fail_probability: fe,
    };

    let outcome = RunCountSearch::new(config).run(&profile, target, &mut rand::thread_rng())?;
    Ok(outcome.run_count)
}
