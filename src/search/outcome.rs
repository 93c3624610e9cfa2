// Result of a run-count search and its human-readable report

use crate::model::{FlakeProfile, EXACT_HIT_FITNESS};
use crate::search::population::RankedCandidate;
use serde::{Deserialize, Serialize};

/// Best candidate of one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_run_count: u64,
    pub best_fitness: f64,
}

/// Outcome of a completed search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Recommended number of repeated executions
    pub run_count: u64,

    /// Fitness of `run_count` under the strategy used by the search
    pub fitness: f64,

    /// `P_detect(run_count) - target`
    pub closeness: f64,

    /// Detection probability reached with `run_count` executions
    pub detection_probability: f64,

    pub target: f64,
    pub profile: FlakeProfile,
    pub generations_run: usize,

    /// Best candidate per generation, in order
    pub history: Vec<GenerationReport>,

    /// Ranked candidates of the last evaluated generation
    #[serde(skip)]
    pub final_generation: Vec<RankedCandidate>,
}

impl SearchOutcome {
    /// Whether `run_count` reaches the target confidence
    pub fn reaches_target(&self) -> bool {
        self.closeness >= 0.0
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.reaches_target() {
            report.push_str(&format!(
                "✅ RECOMMENDED RUNS: {}\n\n",
                self.run_count
            ));
        } else {
            report.push_str(&format!(
                "⚠️  TARGET NOT REACHED (best candidate: {} runs)\n\n",
                self.run_count
            ));
        }

        report.push_str(&format!(
            "Pass probability (p): {}\n",
            self.profile.pass_probability
        ));
        report.push_str(&format!(
            "Fail/error probability (fe): {}\n",
            self.profile.fail_probability
        ));
        report.push_str(&format!(
            "Other outcome probability: {}\n",
            self.profile.other_probability()
        ));
        report.push_str(&format!(
            "Target confidence: {} ({}%)\n",
            self.target,
            self.target * 100.0
        ));
        report.push_str(&format!(
            "Detection probability: {:.6}\n",
            self.detection_probability
        ));
        report.push_str(&format!("Margin: {:+.3e}\n", self.closeness));

        if self.fitness >= EXACT_HIT_FITNESS {
            report.push_str("Fitness: exact hit\n");
        } else {
            report.push_str(&format!("Fitness: {:.4}\n", self.fitness));
        }
        report.push_str(&format!("Generations: {}\n", self.generations_run));

        report
    }
}
