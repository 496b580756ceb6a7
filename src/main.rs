//! SWARMTANK - CLI Entry Point
//!
//! Headless swarm simulation runner.

use clap::{Parser, Subcommand};
use swarmtank::{benchmark, Config, World};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "swarmtank")]
#[command(version)]
#[command(about = "Role-based swarm simulation with food, power-ups and predators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation headless
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "swarm.yaml")]
        config: PathBuf,

        /// Number of steps to simulate
        #[arg(short, long, default_value = "3600")]
        steps: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,

        /// Write the sampled stats history here as JSON
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Initial bot count
        #[arg(short, long, default_value = "200")]
        bots: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "swarm.yaml")]
        output: PathBuf,
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
            steps,
            seed,
            quiet,
            stats_out,
        } => run_simulation(config, steps, seed, quiet, stats_out),

        Commands::Benchmark { steps, bots } => {
            init_logging("info");
            run_benchmark(steps, bots)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

fn run_simulation(
    config_path: PathBuf,
    steps: u64,
    seed: Option<u64>,
    quiet: bool,
    stats_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let (config, source) = if config_path.exists() {
        (Config::from_file(&config_path)?, format!("{:?}", config_path))
    } else {
        (Config::default(), "defaults".to_string())
    };
    init_logging(&config.logging.log_level);
    log::info!("Configuration: {}", source);

    // Create world
    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    println!("Starting simulation");
    println!("  Bots: {}", world.population());
    println!("  Predators: {}", world.predators().len());
    println!("  Arena: {}x{}", config.world.width, config.world.height);
    println!("  Steps: {}", steps);
    println!("  Seed: {}", world.seed());
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval.max(1);
    let dt = config.timing.dt;

    for _ in 0..steps {
        let events = world.step(dt);

        if !events.predator_deaths.is_empty() && !quiet {
            log::info!(
                "T:{} predator(s) {:?} died, {} carrion dropped",
                world.time(),
                events.predator_deaths,
                events.carrion_dropped
            );
        }

        // Stats output
        if !quiet && world.time() % stats_interval == 0 {
            println!("{}", world.stats().summary());
        }

        // Check for extinction
        if world.is_extinct() {
            println!("\nSwarm extinct at step {}", world.time());
            break;
        }
    }

    let elapsed = start.elapsed();
    let steps_per_sec = world.time() as f64 / elapsed.as_secs_f64();
    let stats = world.stats();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Steps: {}", world.time());
    println!("Speed: {:.1} steps/s", steps_per_sec);
    println!("Final population: {}", stats.population);
    println!(
        "Roles: harvester {} | warrior {} | scout {} | drone {} | leader {}",
        stats.roles.harvester, stats.roles.warrior, stats.roles.scout, stats.roles.drone, stats.roles.leader
    );
    println!("Births: {}", stats.total_births);
    println!("Predator kills: {}", stats.total_kills);
    println!("Predator deaths: {}", stats.total_predator_deaths);

    if let Some(path) = stats_out {
        world.stats_history().save(&path)?;
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn run_benchmark(steps: u64, bots: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SWARMTANK Benchmark ===");
    println!("Steps: {}", steps);
    println!("Bots: {}", bots);
    println!();

    let result = benchmark(steps, bots)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
