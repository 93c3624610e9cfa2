//! Detection-probability model for flaky tests
//!
//! A flaky test reveals itself once a series of repeated runs contains at least
//! one pass **and** at least one failure or error. For a test that passes with
//! probability `p` and fails or errors with probability `fe`, inclusion-exclusion
//! over the complementary events "never passes" and "never fails" gives
//!
//! ```text
//! P_detect(n) = 1 - (1 - p)^n - (1 - fe)^n + (1 - p - fe)^n
//! ```
//!
//! The last term corrects for runs that always land on the third outcome
//! (neither pass nor fail, e.g. a non-deterministic timeout), which the two
//! subtractions count twice.
//!
//! # Example
//! ```
//! use flakerun::model::{closeness, fitness};
//!
//! // A coin-flip test reaches 50% detection confidence after exactly two runs.
//! assert_eq!(closeness(0.5, 0.5, 2, 0.5).unwrap(), 0.0);
//! assert_eq!(fitness(0.5, 0.5, 1, 0.5).unwrap(), 0.0);
//! ```

use crate::error::{EstimateError, Result};
use serde::{Deserialize, Serialize};

/// Score awarded to a candidate that hits the target confidence exactly
pub const EXACT_HIT_FITNESS: f64 = 1_000_000_000.0;

/// Ceiling for the reciprocal branch, kept strictly below [`EXACT_HIT_FITNESS`]
pub const MAX_MARGIN_FITNESS: f64 = EXACT_HIT_FITNESS - 1.0;

/// Allowed slack when checking `p + fe <= 1`
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-12;

/// Check that a detection target lies in the open interval (0, 1)
pub fn validate_target(target: f64) -> Result<()> {
    if target > 0.0 && target < 1.0 {
        Ok(())
    } else {
        Err(EstimateError::invalid(
            "target",
            target,
            "detection confidence must lie strictly between 0 and 1",
        ))
    }
}

/// Probability that `n` runs contain at least one pass and one failure/error
pub fn detection_probability(p: f64, fe: f64, n: u64) -> f64 {
    let runs = n as f64;
    let q_pass = 1.0 - p;
    let q_failerr = 1.0 - fe;
    let q_neither = 1.0 - p - fe;

    1.0 - q_pass.powf(runs) - q_failerr.powf(runs) + q_neither.powf(runs)
}

/// Signed distance between the detection probability after `n` runs and `target`
///
/// Zero means the target is hit exactly, negative means `n` runs are not
/// enough, positive means `n` overshoots.
///
/// # Errors
/// Returns [`EstimateError::InvalidParameter`] if `target` is not in (0, 1).
/// `p` and `fe` are not checked; callers must keep `p + fe <= 1`.
pub fn closeness(p: f64, fe: f64, n: u64, target: f64) -> Result<f64> {
    validate_target(target)?;
    Ok(detection_probability(p, fe, n) - target)
}

/// Fitness of a candidate run count, higher is better
///
/// - exact hit: [`EXACT_HIT_FITNESS`]
/// - target not reached, or the margin is NaN: `0.0`
/// - target reached: `1 / closeness`, capped at [`MAX_MARGIN_FITNESS`]
pub fn fitness(p: f64, fe: f64, n: u64, target: f64) -> Result<f64> {
    let distance = closeness(p, fe, n, target)?;

    let score = if distance == 0.0 {
        EXACT_HIT_FITNESS
    } else if distance < 0.0 || distance.is_nan() {
        0.0
    } else {
        (1.0 / distance).min(MAX_MARGIN_FITNESS)
    };
    Ok(score)
}

/// Capability used by the search to score a candidate run count
///
/// Implemented by [`ReciprocalFitness`] and by any closure with the signature
/// `Fn(p, fe, n, target) -> Result<f64>`, so experiments can swap in their own
/// scoring without touching the search.
pub trait FitnessStrategy {
    fn score(&self, p: f64, fe: f64, n: u64, target: f64) -> Result<f64>;
}

impl<F> FitnessStrategy for F
where
    F: Fn(f64, f64, u64, f64) -> Result<f64>,
{
    fn score(&self, p: f64, fe: f64, n: u64, target: f64) -> Result<f64> {
        self(p, fe, n, target)
    }
}

/// Default strategy: [`fitness`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReciprocalFitness;

impl FitnessStrategy for ReciprocalFitness {
    fn score(&self, p: f64, fe: f64, n: u64, target: f64) -> Result<f64> {
        fitness(p, fe, n, target)
    }
}

/// Observed outcome probabilities of a single test run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlakeProfile {
    /// Probability that one run passes (`p`)
    pub pass_probability: f64,
    /// Probability that one run fails or errors (`fe`)
    pub fail_probability: f64,
}

impl FlakeProfile {
    /// Build a profile, rejecting probabilities outside `[0, 1]` or summing above 1
    pub fn new(pass_probability: f64, fail_probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&pass_probability) {
            return Err(EstimateError::invalid(
                "pass_probability",
                pass_probability,
                "must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&fail_probability) {
            return Err(EstimateError::invalid(
                "fail_probability",
                fail_probability,
                "must be in [0, 1]",
            ));
        }
        let sum = pass_probability + fail_probability;
        if sum > 1.0 + PROBABILITY_SUM_TOLERANCE {
            return Err(EstimateError::invalid(
                "fail_probability",
                fail_probability,
                format!("pass and fail probabilities sum to {sum}, which exceeds 1"),
            ));
        }

        Ok(Self {
            pass_probability,
            fail_probability,
        })
    }

    /// Probability of the third outcome (neither pass nor fail/error)
    pub fn other_probability(&self) -> f64 {
        (1.0 - self.pass_probability - self.fail_probability).max(0.0)
    }

    pub fn detection_probability(&self, n: u64) -> f64 {
        detection_probability(self.pass_probability, self.fail_probability, n)
    }

    pub fn closeness(&self, n: u64, target: f64) -> Result<f64> {
        closeness(self.pass_probability, self.fail_probability, n, target)
    }

    pub fn fitness(&self, n: u64, target: f64) -> Result<f64> {
        fitness(self.pass_probability, self.fail_probability, n, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bounds_rejected() {
        for target in [0.0, 1.0, -0.1, 1.5] {
            let err = closeness(0.5, 0.4, 10, target).unwrap_err();
            assert!(matches!(
                err,
                EstimateError::InvalidParameter { name: "target", .. }
            ));
        }
    }

    #[test]
    fn test_target_nan_rejected() {
        assert!(validate_target(f64::NAN).is_err());
    }

    #[test]
    fn test_coin_flip_exact_hit() {
        // 1 - 0.25 - 0.25 + 0 = 0.5
        assert_eq!(closeness(0.5, 0.5, 2, 0.5).unwrap(), 0.0);
        assert_eq!(fitness(0.5, 0.5, 2, 0.5).unwrap(), EXACT_HIT_FITNESS);
    }

    #[test]
    fn test_single_run_never_detects() {
        // One run can never show both outcomes.
        let p = detection_probability(0.3, 0.6, 1);
        assert!(p.abs() < 1e-12);
    }

    #[test]
    fn test_undershoot_scores_zero() {
        assert_eq!(fitness(0.0005, 0.95, 100, 0.95).unwrap(), 0.0);
    }

    #[test]
    fn test_overshoot_scores_reciprocal() {
        let d = closeness(0.5, 0.5, 3, 0.5).unwrap();
        assert!((d - 0.25).abs() < 1e-12);
        let score = fitness(0.5, 0.5, 3, 0.5).unwrap();
        assert!((score - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_tighter_margin_scores_higher() {
        let near = fitness(0.5, 0.5, 3, 0.5).unwrap();
        let far = fitness(0.5, 0.5, 10, 0.5).unwrap();
        assert!(near > far);
    }

    #[test]
    fn test_reciprocal_stays_below_exact_hit() {
        // Margin of ~1e-15 would otherwise score ~1e15.
        let target = detection_probability(0.5, 0.5, 3) - 1e-15;
        let score = fitness(0.5, 0.5, 3, target).unwrap();
        assert!(score <= MAX_MARGIN_FITNESS);
        assert!(score < EXACT_HIT_FITNESS);
    }

    #[test]
    fn test_nan_probability_scores_zero() {
        assert_eq!(fitness(f64::NAN, 0.5, 10, 0.5).unwrap(), 0.0);
        assert_eq!(fitness(0.5, f64::NAN, 10, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_third_outcome_lowers_detection_at_equal_runs() {
        let two_outcomes = FlakeProfile::new(0.1, 0.9).unwrap();
        let with_timeouts = FlakeProfile::new(0.1, 0.05).unwrap();
        for n in [2, 10, 29, 60, 500] {
            assert!(with_timeouts.detection_probability(n) <= two_outcomes.detection_probability(n));
        }
    }

    #[test]
    fn test_third_outcome_correction() {
        // p=0.2, fe=0.3, n=2: 1 - 0.64 - 0.49 + 0.25 = 0.12
        let prob = detection_probability(0.2, 0.3, 2);
        assert!((prob - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_closure_is_a_strategy() {
        let constant = |_p: f64, _fe: f64, n: u64, _t: f64| -> Result<f64> { Ok(n as f64) };
        assert_eq!(constant.score(0.5, 0.5, 7, 0.5).unwrap(), 7.0);
        assert_eq!(
            ReciprocalFitness.score(0.5, 0.5, 2, 0.5).unwrap(),
            EXACT_HIT_FITNESS
        );
    }

    #[test]
    fn test_fitness_fn_is_a_strategy() {
        assert_eq!(
            fitness.score(0.5, 0.5, 1, 0.5).unwrap(),
            ReciprocalFitness.score(0.5, 0.5, 1, 0.5).unwrap()
        );
    }

    #[test]
    fn test_profile_validation() {
        assert!(FlakeProfile::new(0.5, 0.5).is_ok());
        assert!(FlakeProfile::new(-0.1, 0.5).is_err());
        assert!(FlakeProfile::new(0.5, 1.1).is_err());
        assert!(FlakeProfile::new(0.6, 0.6).is_err());
    }

    #[test]
    fn test_profile_other_probability() {
        let profile = FlakeProfile::new(0.2, 0.3).unwrap();
        assert!((profile.other_probability() - 0.5).abs() < 1e-12);
        assert_eq!(
            profile.fitness(2, 0.1).unwrap(),
            fitness(0.2, 0.3, 2, 0.1).unwrap()
        );
    }
}
