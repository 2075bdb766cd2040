use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tribes::core::config::Config;
use tribes::core::optimizer::{BenchmarkOptimizer, RunReport};

#[derive(Parser)]
#[clap(author, version, about = "TRIBES: a self-adaptive particle swarm optimizer")]
struct Cli {
    /// Path to config file; built-in defaults are used when omitted
    #[clap(short, long)]
    config: Option<String>,

    /// Override the number of generations
    #[clap(short, long)]
    generations: Option<usize>,

    /// Override the random seed
    #[clap(short, long)]
    seed: Option<u64>,

    /// Override the objective function (plane, sphere, rastrigin, rosenbrock, ackley)
    #[clap(short, long)]
    objective: Option<String>,

    /// Print the final report as JSON
    #[clap(long)]
    json: bool,

    /// Debug mode
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(generations) = cli.generations {
        config.run.generations = generations;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = Some(seed);
    }
    if let Some(objective) = cli.objective {
        config.search.objective = objective;
    }

    let mut optimizer =
        BenchmarkOptimizer::from_config(&config).context("Failed to build optimizer")?;

    let mut rng = match config.run.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    info!(
        "Minimizing '{}' over {} dimensions",
        config.search.objective,
        config.dimensions()
    );

    let report = optimizer.run(&mut rng)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config.search.objective, &report);
    }

    Ok(())
}

fn print_report(objective: &str, report: &RunReport) {
    println!("\n====================================================");
    println!("  TRIBES run on '{}'", objective);
    println!("====================================================");
    println!("  Generations:  {}", report.generations_run);
    println!("  Adaptations:  {}", report.adaptations);
    println!("  Tribes:       {}", report.tribes);
    println!("  Particles:    {}", report.particles);
    match &report.best {
        Some(best) => {
            println!("  Best error:   {:e}", best.error);
            println!("  Best position: {:?}", best.position);
        }
        None => println!("  Best error:   n/a"),
    }
    if report.reached_target {
        println!("  Target error reached");
    }
    println!("====================================================\n");
}
