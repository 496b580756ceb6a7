//! Configuration system for the swarm simulation.
//!
//! Supports YAML configuration files with sensible defaults. Every section
//! may be omitted from a file and falls back to its `Default`.

use crate::ecology::{FoodConfig, ObstacleConfig, PowerUpConfig, PredatorConfig};
use crate::roles::RoleTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or checking a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub bots: BotConfig,
    #[serde(default)]
    pub roles: RoleTable,
    #[serde(default)]
    pub predators: PredatorConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub power_ups: PowerUpConfig,
    #[serde(default)]
    pub obstacles: ObstacleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Arena and starting population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Bots created at start
    pub initial_bots: usize,
    /// Food items scattered at start
    pub initial_food: usize,
    /// Predators created at start
    pub initial_predators: usize,
    /// Make the first initial bot a leader
    pub leader_first: bool,
    /// Distance kept from the edges when placing initial bots
    pub spawn_margin: f32,
}

/// Tick timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Ticks per simulated second, used to convert durations given in seconds
    pub ticks_per_second: u32,
    /// Integration step used by `World::run`
    pub dt: f32,
}

/// Bot energy, reproduction and ability timers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub initial_energy: f32,
    pub max_energy: f32,
    /// Pickup radius of a bot
    pub radius: f32,
    /// Energy lost every tick regardless of movement
    pub energy_cost_per_tick: f32,
    /// Energy lost per unit of distance travelled
    pub move_cost: f32,
    /// Minimum energy to reproduce
    pub reproduction_threshold: f32,
    /// Energy paid by the parent
    pub reproduction_cost: f32,
    /// Ticks between reproductions
    pub reproduction_cooldown: u32,
    /// Food must be this close to reproduce
    pub reproduction_radius: f32,
    pub offspring_energy: f32,
    /// Probability an offspring is a harvester; otherwise spawn weights decide
    pub harvester_offspring_bias: f32,
    /// Hard population cap
    pub max_bots: usize,
    /// Ticks between scout shouts
    pub shout_cooldown: u32,
    /// Ticks between warrior taunts
    pub taunt_cooldown: u32,
    /// How long a taunt holds a predator's attention
    pub taunt_duration: u32,
    /// Warriors spawned when a leader falls
    pub leader_reinforcements: usize,
    /// Distance discount applied to a heard shout
    pub shout_priority: f32,
    /// Distance discount applied to power-ups
    pub power_up_priority: f32,
    /// Upper bound on the predator avoidance urgency factor
    pub panic_cap: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Steps between stats samples
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            initial_bots: 50,
            initial_food: 40,
            initial_predators: 3,
            leader_first: true,
            spawn_margin: 50.0,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            dt: 1.0,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            max_energy: 100.0,
            radius: 3.0,
            energy_cost_per_tick: 0.1,
            move_cost: 0.01,
            reproduction_threshold: 70.0,
            reproduction_cost: 35.0,
            reproduction_cooldown: 180,
            reproduction_radius: 80.0,
            offspring_energy: 60.0,
            harvester_offspring_bias: 0.4,
            max_bots: 300,
            shout_cooldown: 60,
            taunt_cooldown: 120,
            taunt_duration: 30,
            leader_reinforcements: 10,
            shout_priority: 0.5,
            power_up_priority: 0.7,
            panic_cap: 3.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 60,
            log_level: "info".to_string(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Buff duration converted to ticks
    pub fn buff_duration_ticks(&self) -> u32 {
        (self.power_ups.buff_duration_secs * self.timing.ticks_per_second as f32).round() as u32
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if !(w.width > 0.0) || !(w.height > 0.0) {
            return Err(invalid("world width and height must be > 0"));
        }
        if self.timing.ticks_per_second == 0 {
            return Err(invalid("ticks_per_second must be > 0"));
        }
        if !(self.timing.dt > 0.0) {
            return Err(invalid("dt must be > 0"));
        }

        let b = &self.bots;
        if !(b.max_energy > 0.0) {
            return Err(invalid("max_energy must be > 0"));
        }
        if !(b.initial_energy > 0.0) || b.initial_energy > b.max_energy {
            return Err(invalid("initial_energy must be in (0, max_energy]"));
        }
        if !(b.offspring_energy > 0.0) {
            return Err(invalid("offspring_energy must be > 0"));
        }
        if !(b.energy_cost_per_tick > 0.0) {
            return Err(invalid("energy_cost_per_tick must be > 0"));
        }
        if b.move_cost < 0.0 || b.reproduction_cost < 0.0 {
            return Err(invalid("move_cost and reproduction_cost must be >= 0"));
        }
        if !(0.0..=1.0).contains(&b.harvester_offspring_bias) {
            return Err(invalid("harvester_offspring_bias must be in [0, 1]"));
        }
        if w.initial_bots > b.max_bots {
            return Err(invalid("initial_bots cannot exceed max_bots"));
        }
        if !(b.shout_priority > 0.0) || !(b.power_up_priority > 0.0) || !(b.panic_cap >= 1.0) {
            return Err(invalid("shout_priority and power_up_priority must be > 0, panic_cap >= 1"));
        }

        self.roles.validate().map_err(ConfigError::Invalid)?;

        let p = &self.predators;
        if !(p.max_health > 0.0) || !(p.max_speed > 0.0) || !(p.max_force > 0.0) {
            return Err(invalid("predator max_health, max_speed and max_force must be > 0"));
        }
        if !(p.initial_health_fraction > 0.0 && p.initial_health_fraction <= 1.0) {
            return Err(invalid("predator initial_health_fraction must be in (0, 1]"));
        }
        if !(p.starvation_rate > 0.0) {
            return Err(invalid("predator starvation_rate must be > 0"));
        }
        let non_negative = [
            ("kill_gain", p.kill_gain),
            ("carrion_seek_factor", p.carrion_seek_factor),
            ("carrion_heal", p.carrion_heal),
            ("power_up_seek_radius", p.power_up_seek_radius),
            ("power_up_heal", p.power_up_heal),
            ("fight_range", p.fight_range),
            ("fight_damage", p.fight_damage),
            ("fight_bounce", p.fight_bounce),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(format!("predators.{name} must be >= 0")));
            }
        }
        if !(p.speed_boost >= 1.0) {
            return Err(invalid("predators.speed_boost must be >= 1"));
        }
        if p.drop_min > p.drop_max {
            return Err(invalid("predator drop_min cannot exceed drop_max"));
        }
        if p.min_predators > p.max_predators {
            return Err(invalid("min_predators cannot exceed max_predators"));
        }
        if !(0.0..=1.0).contains(&p.respawn_chance) {
            return Err(invalid("predator respawn_chance must be in [0, 1]"));
        }

        let f = &self.food;
        for (name, chance) in [
            ("food.spawn_chance", f.spawn_chance),
            ("food.scarcity_spawn_chance", f.scarcity_spawn_chance),
            ("power_ups.spawn_chance", self.power_ups.spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(invalid(format!("{name} must be in [0, 1]")));
            }
        }
        if f.radius < 0.0 || f.carrion_radius < 0.0 || self.power_ups.radius < 0.0 {
            return Err(invalid("pickup radii must be >= 0"));
        }
        if !(self.power_ups.speed_multiplier > 0.0) || !(self.power_ups.damage_multiplier > 0.0) {
            return Err(invalid("buff multipliers must be > 0"));
        }
        if self.power_ups.buff_duration_secs < 0.0 {
            return Err(invalid("buff_duration_secs must be >= 0"));
        }

        let o = &self.obstacles;
        if o.count > 0 && !(o.radius > 0.0) {
            return Err(invalid("obstacles.radius must be > 0"));
        }
        if o.min_speed < 0.0 || o.max_speed < o.min_speed {
            return Err(invalid("obstacles need 0 <= min_speed <= max_speed"));
        }
        if o.contact_damage < 0.0 || o.avoid_margin < 0.0 || o.avoid_strength < 0.0 || o.impact_transfer < 0.0 {
            return Err(invalid("obstacle damage, margins and forces must be >= 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(config.roles.harvester.food_energy_multiplier, loaded.roles.harvester.food_energy_multiplier);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "world:\n  width: 400\n  initial_bots: 5\npredators:\n  min_predators: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.world.width, 400.0);
        assert_eq!(config.world.height, 800.0);
        assert_eq!(config.world.initial_bots, 5);
        assert_eq!(config.predators.min_predators, 0);
        assert_eq!(config.predators.max_predators, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swarm.yaml");

        let mut config = Config::default();
        config.world.initial_bots = 12;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.world.initial_bots, 12);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "world: [1, 2").unwrap();
        assert!(matches!(Config::from_file(&bad), Err(ConfigError::Parse(_))));

        let invalid = dir.path().join("invalid.yaml");
        std::fs::write(&invalid, "world:\n  width: -5\n").unwrap();
        assert!(matches!(Config::from_file(&invalid), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.predators.drop_min = 6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.world.initial_bots = config.bots.max_bots + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.roles.warrior.max_speed = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("warrior"));

        // Energy and predator health must always drain
        let mut config = Config::default();
        config.bots.energy_cost_per_tick = 0.0;
        config.bots.move_cost = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("energy_cost_per_tick"));

        let mut config = Config::default();
        config.predators.starvation_rate = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("starvation_rate"));

        let mut config = Config::default();
        config.obstacles.max_speed = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buff_duration_ticks() {
        let config = Config::default();
        assert_eq!(config.buff_duration_ticks(), 300);
    }
}
