// Stochastic Run-Count Search
//
// Finds a near-minimal number of repeated executions `n` whose detection
// probability reaches a target confidence, without inverting P_detect(n)
// analytically. Each generation scores the population, keeps the elite,
// perturbs elite run counts by a small multiplicative factor and refills the
// rest with fresh samples.
//
// The result is best-effort: the returned `n` is the best candidate of the
// last generation, not a proven minimum.

mod config;
mod outcome;
mod population;
mod runner;

pub use config::SearchConfig;
pub use outcome::{GenerationReport, SearchOutcome};
pub use population::{initial_population, next_generation, rank, Candidate, RankedCandidate};
pub use runner::{search, RunCountSearch};
