//! flakerun - Estimate how many repeated executions expose a flaky test
//!
//! Given the probability that a test passes (`p`) and the probability that it
//! fails or errors (`fe`), this library searches for the number of repeated
//! runs after which at least one pass and at least one failure are observed
//! with a requested confidence.

pub mod cli;
pub mod error;
pub mod model;
pub mod search;

pub use error::{EstimateError, Result};
