//! # SWARMTANK
//!
//! Real-time 2D swarm simulation: bots with differentiated roles flock,
//! forage, shout about food, fight and flee predators.
//!
//! ## Features
//!
//! - **Role table**: harvesters, warriors, scouts, drones and leaders share
//!   one steering routine driven by per-role weights
//! - **Ecosystem**: food, carrion, timed power-ups and a predator lifecycle
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swarmtank::{World, Config};
//!
//! // Create world with default config
//! let mut world = World::new(Config::default()).unwrap();
//!
//! // Run simulation
//! world.run(1000);
//!
//! // Check results
//! println!("{}", world.stats().summary());
//! ```
//!
//! ## Commands and snapshots
//!
//! ```rust
//! use swarmtank::{Command, Config, Role, World};
//! use swarmtank::vector::Vec2;
//!
//! let mut world = World::new_with_seed(Config::default(), 7).unwrap();
//! world.spawn_food(10);
//! world.enqueue(Command::SpawnBot { role: Some(Role::Scout), at: Some(Vec2::new(100.0, 100.0)) });
//!
//! // Commands land at the next tick boundary
//! let events = world.step(1.0);
//! assert_eq!(events.commands_applied, 2);
//!
//! assert_eq!(events.spawned.len(), 1);
//!
//! let snapshot = world.snapshot();
//! assert_eq!(snapshot.time, 1);
//! ```

pub mod bot;
pub mod buffs;
pub mod config;
pub mod ecology;
pub mod grid;
pub mod roles;
pub mod shared;
pub mod stats;
pub mod vector;
pub mod world;

// Re-export main types
pub use bot::Bot;
pub use config::{Config, ConfigError};
pub use roles::Role;
pub use shared::{Command, WorldSnapshot};
pub use world::{TickEvents, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(steps: u64, bots: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.world.initial_bots = bots;
    config.bots.max_bots = config.bots.max_bots.max(bots * 2);

    let mut world = World::new(config)?;

    let start = Instant::now();
    world.run(steps);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        steps,
        initial_bots: bots,
        final_bots: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64(),
        total_kills: world.stats().total_kills,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub initial_bots: usize,
    pub final_bots: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub total_kills: u64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Bots: {} -> {}", self.initial_bots, self.final_bots)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        writeln!(f, "Predator kills: {}", self.total_kills)?;
        Ok(())
    }
}
