use anyhow::Result;
use clap::Parser;
use flakerun::cli::{Cli, OutputFormat, Preset};
use flakerun::model::FlakeProfile;
use flakerun::search::{RunCountSearch, SearchConfig};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Resolve the search configuration: file or preset, then flag overrides
fn build_config(args: &Cli) -> Result<SearchConfig> {
    let mut config = match (&args.config, args.preset) {
        (Some(path), _) => SearchConfig::from_toml_file(path)?,
        (None, Some(Preset::Quick)) => SearchConfig::quick(),
        (None, Some(Preset::Thorough)) => SearchConfig::thorough(),
        (None, Some(Preset::Default) | None) => SearchConfig::default(),
    };

    if let Some(population) = args.population {
        config.population_size = population;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

/// Print the model's view of a fixed run count
fn print_evaluation(
    profile: &FlakeProfile,
    run_count: u64,
    target: f64,
    format: OutputFormat,
) -> Result<()> {
    let closeness = profile.closeness(run_count, target)?;
    let fitness = profile.fitness(run_count, target)?;
    let detection_probability = profile.detection_probability(run_count);

    match format {
        OutputFormat::Text => {
            println!("Runs: {}", run_count);
            println!("Other outcome probability: {}", profile.other_probability());
            println!("Detection probability: {:.6}", detection_probability);
            println!("Margin: {:+.3e}", closeness);
            println!("Fitness: {:.4}", fitness);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "run_count": run_count,
                "target": target,
                "other_probability": profile.other_probability(),
                "detection_probability": detection_probability,
                "closeness": closeness,
                "fitness": fitness,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let profile = FlakeProfile::new(args.pass_probability, args.fail_probability)?;

    if let Some(run_count) = args.evaluate {
        if run_count == 0 {
            anyhow::bail!("Invalid value for --evaluate: 0 (must be >= 1)");
        }
        return print_evaluation(&profile, run_count, args.target, args.format);
    }

    let config = build_config(&args)?;
    let search = RunCountSearch::new(config);
    tracing::debug!(config = ?search.config(), "Resolved search configuration");
    let outcome = search.run_from_config(&profile, args.target)?;

    match args.format {
        OutputFormat::Text => print!("{}", outcome.to_report_string()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(())
}
