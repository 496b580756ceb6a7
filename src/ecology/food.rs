//! Food items and power-ups.

use crate::buffs::BuffKind;
use crate::vector::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type FoodId = u64;
pub type PowerUpId = u64;

/// Food variety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    /// Regular food spawned by the world
    Plain,
    /// Remains of a dead predator, worth more
    Carrion,
}

/// A food item lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub kind: FoodKind,
}

impl Food {
    pub fn new(id: FoodId, position: Vec2, kind: FoodKind) -> Self {
        Self { id, position, kind }
    }

    /// Energy granted when eaten (before role multipliers)
    #[inline]
    pub fn energy_value(&self, config: &FoodConfig) -> f32 {
        match self.kind {
            FoodKind::Plain => config.energy,
            FoodKind::Carrion => config.carrion_energy,
        }
    }

    #[inline]
    pub fn radius(&self, config: &FoodConfig) -> f32 {
        match self.kind {
            FoodKind::Plain => config.radius,
            FoodKind::Carrion => config.carrion_radius,
        }
    }
}

/// Power-up variety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Speed,
    Damage,
    Energy,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Speed, PowerUpKind::Damage, PowerUpKind::Energy];

    /// The swarm-wide buff this power-up grants, if any
    pub fn buff(self) -> Option<BuffKind> {
        match self {
            PowerUpKind::Speed => Some(BuffKind::Speed),
            PowerUpKind::Damage => Some(BuffKind::Damage),
            PowerUpKind::Energy => None,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A power-up waiting to be collected. Never expires on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub position: Vec2,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(id: PowerUpId, position: Vec2, kind: PowerUpKind) -> Self {
        Self { id, position, kind }
    }

    /// Energy handed to the collector
    #[inline]
    pub fn energy_value(&self, config: &PowerUpConfig) -> f32 {
        match self.kind {
            PowerUpKind::Energy => config.energy_bonus,
            PowerUpKind::Speed | PowerUpKind::Damage => config.boost_energy,
        }
    }
}

/// Food configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Pickup radius of plain food
    pub radius: f32,
    /// Energy in plain food
    pub energy: f32,
    /// Pickup radius of carrion
    pub carrion_radius: f32,
    /// Energy in carrion
    pub carrion_energy: f32,
    /// Base chance per tick of one food spawning
    pub spawn_chance: f32,
    /// Below this count the scarcity spawner kicks in
    pub low_water_mark: usize,
    /// Extra chance per tick while below the low-water mark
    pub scarcity_spawn_chance: f32,
    /// Automatic spawners stop at this count
    pub max_food: usize,
    /// Distance kept from arena edges when spawning
    pub spawn_margin: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            energy: 20.0,
            carrion_radius: 11.0,
            carrion_energy: 40.0,
            spawn_chance: 0.04,
            low_water_mark: 15,
            scarcity_spawn_chance: 0.06,
            max_food: 150,
            spawn_margin: 20.0,
        }
    }
}

/// Power-up configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Pickup radius
    pub radius: f32,
    /// Chance per tick of one power-up spawning
    pub spawn_chance: f32,
    /// Automatic spawner stops at this count
    pub max_power_ups: usize,
    /// Buff duration in seconds (converted with the tick rate)
    pub buff_duration_secs: f32,
    /// Max speed multiplier per speed stack
    pub speed_multiplier: f32,
    /// Warrior damage multiplier per damage stack
    pub damage_multiplier: f32,
    /// Energy from an energy power-up
    pub energy_bonus: f32,
    /// Energy from a speed or damage power-up
    pub boost_energy: f32,
    pub spawn_margin: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            spawn_chance: 0.005,
            max_power_ups: 8,
            buff_duration_secs: 5.0,
            speed_multiplier: 1.5,
            damage_multiplier: 2.0,
            energy_bonus: 50.0,
            boost_energy: 30.0,
            spawn_margin: 20.0,
        }
    }
}
