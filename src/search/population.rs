// Candidates, ranking and generation replacement for the run-count search

use crate::error::{EstimateError, Result};
use crate::model::{FitnessStrategy, FlakeProfile};
use crate::search::config::SearchConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A proposed number of repeated executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub run_count: u64,
}

/// A candidate together with its fitness score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub run_count: u64,
    pub fitness: f64,
}

/// Draw the starting population: run counts uniform in the initial range
pub fn initial_population<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> Vec<Candidate> {
    (0..config.population_size)
        .map(|_| Candidate {
            run_count: rng.gen_range(config.initial_min_runs..=config.initial_max_runs),
        })
        .collect()
}

/// Score every candidate and order them by descending fitness
///
/// The sort is stable, so equal scores keep their population order.
pub fn rank<F: FitnessStrategy + ?Sized>(
    population: &[Candidate],
    profile: &FlakeProfile,
    target: f64,
    strategy: &F,
) -> Result<Vec<RankedCandidate>> {
    let mut ranked = population
        .iter()
        .map(|candidate| {
            let fitness = strategy.score(
                profile.pass_probability,
                profile.fail_probability,
                candidate.run_count,
                target,
            )?;
            Ok(RankedCandidate {
                run_count: candidate.run_count,
                fitness,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    Ok(ranked)
}

/// Build the next population from a ranked generation
///
/// Elites are copied unchanged, mutants perturb a random elite by a factor in
/// `[1 - spread, 1 + spread]`, and the rest are sampled fresh.
pub fn next_generation<R: Rng + ?Sized>(
    ranked: &[RankedCandidate],
    config: &SearchConfig,
    rng: &mut R,
) -> Result<Vec<Candidate>> {
    let elite_count = config.elite_count().min(ranked.len());
    let elites: Vec<u64> = ranked[..elite_count].iter().map(|r| r.run_count).collect();
    if elites.is_empty() {
        return Err(EstimateError::DegenerateSearch {
            reason: "no elite candidates to breed the next generation from".to_string(),
        });
    }

    let mut population =
        Vec::with_capacity(elite_count + config.mutation_count() + config.exploration_count());

    population.extend(elites.iter().map(|&run_count| Candidate { run_count }));

    let low = 1.0 - config.mutation_spread;
    let high = 1.0 + config.mutation_spread;
    for _ in 0..config.mutation_count() {
        let Some(&parent) = elites.choose(rng) else {
            break;
        };
        let factor = rng.gen_range(low..=high);
        population.push(Candidate {
            run_count: mutate(parent, factor),
        });
    }

    let exploration_max = config.exploration_max_runs();
    for _ in 0..config.exploration_count() {
        population.push(Candidate {
            run_count: rng.gen_range(config.initial_min_runs..=exploration_max),
        });
    }

    Ok(population)
}

/// Scale a run count and round to the nearest integer, never below one run
fn mutate(run_count: u64, factor: f64) -> u64 {
    ((run_count as f64 * factor).round() as u64).max(1)
}
