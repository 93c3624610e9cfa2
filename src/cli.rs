//! CLI argument parsing for flakerun

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Built-in search budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// 1000 candidates x 1000 generations
    Default,
    /// 200 candidates x 200 generations
    Quick,
    /// 2000 candidates x 2000 generations
    Thorough,
}

#[derive(Parser, Debug)]
#[command(name = "flakerun")]
#[command(version)]
#[command(
    about = "Estimate how many repeated executions are needed to expose a flaky test",
    long_about = None
)]
pub struct Cli {
    /// Probability that a single run passes
    #[arg(short = 'p', long = "pass-probability", value_name = "P")]
    pub pass_probability: f64,

    /// Probability that a single run fails or errors
    #[arg(short = 'f', long = "fail-probability", value_name = "FE")]
    pub fail_probability: f64,

    /// Required confidence of observing both a pass and a failure, in (0, 1)
    #[arg(short = 't', long = "target", value_name = "CONFIDENCE", default_value = "0.95")]
    pub target: f64,

    /// TOML file with search settings
    #[arg(short = 'c', long = "config", value_name = "FILE", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in search budget
    #[arg(long = "preset", value_enum)]
    pub preset: Option<Preset>,

    /// Candidates per generation (overrides config/preset)
    #[arg(long = "population", value_name = "SIZE")]
    pub population: Option<usize>,

    /// Generations to run (overrides config/preset)
    #[arg(short = 'g', long = "generations", value_name = "COUNT")]
    pub generations: Option<usize>,

    /// RNG seed for reproducible estimates (overrides config)
    #[arg(short = 's', long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Evaluate the model for a fixed run count instead of searching
    #[arg(long = "evaluate", value_name = "RUNS")]
    pub evaluate: Option<u64>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output (per-generation progress on stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_probabilities() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4"]);
        assert_eq!(cli.pass_probability, 0.5);
        assert_eq!(cli.fail_probability, 0.4);
    }

    #[test]
    fn test_cli_target_default() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4"]);
        assert_eq!(cli.target, 0.95);
    }

    #[test]
    fn test_cli_target_custom() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4", "--target", "0.8"]);
        assert_eq!(cli.target, 0.8);
    }

    #[test]
    fn test_cli_requires_probabilities() {
        assert!(Cli::try_parse_from(["flakerun", "-p", "0.5"]).is_err());
        assert!(Cli::try_parse_from(["flakerun"]).is_err());
    }

    #[test]
    fn test_cli_format_default_text() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4"]);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_budget_overrides() {
        let cli = Cli::parse_from([
            "flakerun",
            "-p",
            "0.5",
            "-f",
            "0.4",
            "--preset",
            "quick",
            "--population",
            "300",
            "-g",
            "50",
            "--seed",
            "7",
        ]);
        assert_eq!(cli.preset, Some(Preset::Quick));
        assert_eq!(cli.population, Some(300));
        assert_eq!(cli.generations, Some(50));
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn test_cli_config_conflicts_with_preset() {
        let result = Cli::try_parse_from([
            "flakerun",
            "-p",
            "0.5",
            "-f",
            "0.4",
            "--config",
            "flakerun.toml",
            "--preset",
            "quick",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_evaluate_flag() {
        let cli = Cli::parse_from(["flakerun", "-p", "0.5", "-f", "0.4", "--evaluate", "12"]);
        assert_eq!(cli.evaluate, Some(12));
        assert!(!cli.debug);
    }
}
