//! CROWDSIM - CLI Entry Point
//!
//! Headless crowd simulation driver.

use clap::{Parser, Subcommand};
use crowdsim::export::ExportSystem;
use crowdsim::{benchmark, Config, World};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "crowdsim")]
#[command(version)]
#[command(about = "Pedestrian crowd simulator on a discrete grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation until every agent is at rest
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Maximum number of ticks
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Output directory for metrics
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Maximum number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Initial agent count
        #[arg(short, long, default_value = "200")]
        agents: usize,
    },
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            output,
            seed,
            quiet,
        } => run_simulation(config, ticks, output, seed, quiet),

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }

        Commands::Benchmark { ticks, agents } => {
            init_logging("info");
            run_benchmark(ticks, agents)
        }
    }
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    let level = if quiet { "warn" } else { config.logging.log_level.as_str() };
    init_logging(level);

    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Config {:?} not found, using defaults", config_path);
    }

    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    log::info!(
        "Starting simulation: {} agents on {}x{}, up to {} ticks, seed {}",
        world.live_count(),
        config.world.width,
        config.world.height,
        ticks,
        world.seed()
    );

    let start = Instant::now();
    let summary = world.run(ticks);
    let elapsed = start.elapsed();

    if !summary.at_rest {
        log::warn!("Stopped after {} ticks with agents still moving", summary.ticks);
    }

    println!("{}", summary);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    for agent in world.population.iter() {
        println!(
            "Agent {:4} at {} reached destination: {}",
            agent.id, agent.pos, agent.reached_destination
        );
    }

    ExportSystem::export_all(&world, &output)?;
    println!("Metrics written to: {:?}", output);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn run_benchmark(ticks: u64, agents: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== CROWDSIM Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Agents: {}", agents);
    println!();

    let result = benchmark(ticks, agents)?;
    println!("{}", result);

    Ok(())
}
