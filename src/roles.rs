//! Bot archetypes and their parameter table.
//!
//! Every role maps to one [`RoleParams`] row. The steering engine reads only
//! these rows, so a new behaviour mix is a new row rather than a new code path.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::fmt;

/// Bot archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Harvester,
    Warrior,
    Scout,
    Drone,
    Leader,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Harvester,
        Role::Warrior,
        Role::Scout,
        Role::Drone,
        Role::Leader,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Harvester => "harvester",
            Role::Warrior => "warrior",
            Role::Scout => "scout",
            Role::Drone => "drone",
            Role::Leader => "leader",
        }
    }

    /// Index into per-role arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Role::Harvester => 0,
            Role::Warrior => 1,
            Role::Scout => 2,
            Role::Drone => 3,
            Role::Leader => 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Special abilities switched on per role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Abilities {
    /// Spawns offspring near food
    pub reproduces: bool,
    /// Broadcasts discovered food to nearby bots
    pub shouts: bool,
    /// Fights and taunts predators instead of fleeing outright
    pub taunts: bool,
    /// Pulls the swarm toward its formation target
    pub leads: bool,
    /// Speeds up and ignores the flock when food is close
    pub bursts: bool,
}

/// Numeric weights and radii for one role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleParams {
    /// Relative frequency when a role is drawn at random
    pub spawn_weight: f32,
    /// Base speed cap (units per tick)
    pub max_speed: f32,
    /// Cap for each individual steering term
    pub max_force: f32,
    /// Cap for the combined steering force
    pub max_steering: f32,

    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub food_seek_weight: f32,
    pub predator_avoid_weight: f32,
    /// Pull toward the formation target (leaders)
    pub formation_weight: f32,
    /// Pull toward a nearby predator (warriors)
    pub engage_weight: f32,

    /// Neighbours inside this radius feed alignment and cohesion
    pub perception_radius: f32,
    /// Neighbours inside this radius push the bot away
    pub separation_radius: f32,
    /// Food and power-ups inside this radius are sought
    pub food_sense_radius: f32,
    /// Predators inside this radius are fled from
    pub fear_radius: f32,

    /// Multiplier on energy gained from food
    pub food_energy_multiplier: f32,

    pub abilities: Abilities,

    // Ability parameters, ignored unless the matching flag is set
    #[serde(default)]
    pub shout_range: f32,
    #[serde(default)]
    pub attack_range: f32,
    /// Damage dealt to a predator per tick while inside `attack_range`
    #[serde(default)]
    pub attack_damage: f32,
    #[serde(default)]
    pub taunt_range: f32,
    #[serde(default)]
    pub taunt_force: f32,
    #[serde(default)]
    pub burst_speed_multiplier: f32,
    #[serde(default)]
    pub priority_food_range: f32,
    #[serde(default)]
    pub reproduction_chance: f32,
}

impl RoleParams {
    /// Shared baseline, overridden per role
    fn baseline() -> Self {
        Self {
            spawn_weight: 1.0,
            max_speed: 3.0,
            max_force: 0.1,
            max_steering: 0.5,
            separation_weight: 2.0,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            food_seek_weight: 2.5,
            predator_avoid_weight: 4.0,
            formation_weight: 0.0,
            engage_weight: 0.0,
            perception_radius: 50.0,
            separation_radius: 25.0,
            food_sense_radius: 100.0,
            fear_radius: 120.0,
            food_energy_multiplier: 1.0,
            abilities: Abilities::default(),
            shout_range: 0.0,
            attack_range: 0.0,
            attack_damage: 0.0,
            taunt_range: 0.0,
            taunt_force: 0.0,
            burst_speed_multiplier: 1.0,
            priority_food_range: 0.0,
            reproduction_chance: 0.0,
        }
    }

    pub fn harvester() -> Self {
        Self {
            spawn_weight: 30.0,
            max_speed: 3.2,
            max_force: 0.11,
            food_seek_weight: 4.0,
            food_sense_radius: 120.0,
            food_energy_multiplier: 1.5,
            abilities: Abilities {
                reproduces: true,
                bursts: true,
                ..Abilities::default()
            },
            burst_speed_multiplier: 1.8,
            priority_food_range: 60.0,
            reproduction_chance: 0.4,
            ..Self::baseline()
        }
    }

    pub fn warrior() -> Self {
        Self {
            spawn_weight: 15.0,
            max_speed: 2.5,
            max_force: 0.12,
            predator_avoid_weight: 0.5,
            engage_weight: 1.5,
            fear_radius: 60.0,
            abilities: Abilities {
                taunts: true,
                ..Abilities::default()
            },
            attack_range: 25.0,
            attack_damage: 0.5,
            taunt_range: 60.0,
            taunt_force: 0.8,
            ..Self::baseline()
        }
    }

    pub fn scout() -> Self {
        Self {
            spawn_weight: 20.0,
            max_speed: 4.0,
            max_force: 0.12,
            food_seek_weight: 2.0,
            food_sense_radius: 150.0,
            abilities: Abilities {
                shouts: true,
                ..Abilities::default()
            },
            shout_range: 50.0,
            ..Self::baseline()
        }
    }

    pub fn drone() -> Self {
        Self {
            spawn_weight: 25.0,
            max_speed: 3.0,
            max_force: 0.1,
            cohesion_weight: 2.0,
            ..Self::baseline()
        }
    }

    pub fn leader() -> Self {
        Self {
            spawn_weight: 5.0,
            max_speed: 3.5,
            max_force: 0.13,
            cohesion_weight: 1.5,
            formation_weight: 1.0,
            abilities: Abilities {
                leads: true,
                ..Abilities::default()
            },
            ..Self::baseline()
        }
    }

    fn validate(&self, role: Role) -> Result<(), String> {
        let non_negative = [
            ("spawn_weight", self.spawn_weight),
            ("perception_radius", self.perception_radius),
            ("separation_radius", self.separation_radius),
            ("food_sense_radius", self.food_sense_radius),
            ("fear_radius", self.fear_radius),
            ("shout_range", self.shout_range),
            ("attack_range", self.attack_range),
            ("attack_damage", self.attack_damage),
            ("taunt_range", self.taunt_range),
            ("priority_food_range", self.priority_food_range),
            ("food_energy_multiplier", self.food_energy_multiplier),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(format!("roles.{role}.{name} must be >= 0"));
            }
        }
        if !(self.max_speed > 0.0) || !(self.max_force > 0.0) || !(self.max_steering > 0.0) {
            return Err(format!("roles.{role}: max_speed, max_force and max_steering must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.reproduction_chance) {
            return Err(format!("roles.{role}.reproduction_chance must be in [0, 1]"));
        }
        if self.abilities.bursts && !(self.burst_speed_multiplier >= 1.0) {
            return Err(format!("roles.{role}.burst_speed_multiplier must be >= 1"));
        }
        Ok(())
    }
}

/// Parameter rows for every role.
///
/// A row given in a config file only needs the fields it changes; the rest
/// keep that role's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTable {
    #[serde(deserialize_with = "harvester_row")]
    pub harvester: RoleParams,
    #[serde(deserialize_with = "warrior_row")]
    pub warrior: RoleParams,
    #[serde(deserialize_with = "scout_row")]
    pub scout: RoleParams,
    #[serde(deserialize_with = "drone_row")]
    pub drone: RoleParams,
    #[serde(deserialize_with = "leader_row")]
    pub leader: RoleParams,
}

fn harvester_row<'de, D: Deserializer<'de>>(d: D) -> Result<RoleParams, D::Error> {
    overlay_row(d, RoleParams::harvester())
}

fn warrior_row<'de, D: Deserializer<'de>>(d: D) -> Result<RoleParams, D::Error> {
    overlay_row(d, RoleParams::warrior())
}

fn scout_row<'de, D: Deserializer<'de>>(d: D) -> Result<RoleParams, D::Error> {
    overlay_row(d, RoleParams::scout())
}

fn drone_row<'de, D: Deserializer<'de>>(d: D) -> Result<RoleParams, D::Error> {
    overlay_row(d, RoleParams::drone())
}

fn leader_row<'de, D: Deserializer<'de>>(d: D) -> Result<RoleParams, D::Error> {
    overlay_row(d, RoleParams::leader())
}

/// Read a (possibly partial) row and lay it over `base`
fn overlay_row<'de, D: Deserializer<'de>>(d: D, base: RoleParams) -> Result<RoleParams, D::Error> {
    let overrides = Value::deserialize(d)?;
    let mut merged = serde_yaml::to_value(base).map_err(D::Error::custom)?;
    merge(&mut merged, overrides);
    serde_yaml::from_value(merged).map_err(D::Error::custom)
}

fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Mapping(base), Value::Mapping(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (slot, value) => *slot = value,
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            harvester: RoleParams::harvester(),
            warrior: RoleParams::warrior(),
            scout: RoleParams::scout(),
            drone: RoleParams::drone(),
            leader: RoleParams::leader(),
        }
    }
}

impl RoleTable {
    /// Look up the row for a role
    #[inline]
    pub fn get(&self, role: Role) -> &RoleParams {
        match role {
            Role::Harvester => &self.harvester,
            Role::Warrior => &self.warrior,
            Role::Scout => &self.scout,
            Role::Drone => &self.drone,
            Role::Leader => &self.leader,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut RoleParams {
        match role {
            Role::Harvester => &mut self.harvester,
            Role::Warrior => &mut self.warrior,
            Role::Scout => &mut self.scout,
            Role::Drone => &mut self.drone,
            Role::Leader => &mut self.leader,
        }
    }

    /// Largest perception-style radius across roles, used to size the spatial index
    pub fn max_query_radius(&self) -> f32 {
        Role::ALL
            .iter()
            .map(|&r| {
                let p = self.get(r);
                p.perception_radius
                    .max(p.separation_radius)
                    .max(p.shout_range)
            })
            .fold(0.0, f32::max)
    }

    /// Draw a role according to the spawn weights
    pub fn random_role<R: Rng + ?Sized>(&self, rng: &mut R) -> Role {
        let weights = Role::ALL.map(|r| self.get(r).spawn_weight);
        match WeightedIndex::new(weights) {
            Ok(dist) => Role::ALL[dist.sample(rng)],
            // validate() rejects an all-zero table, so this only covers hand-built tables
            Err(_) => Role::Drone,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for role in Role::ALL {
            self.get(role).validate(role)?;
        }
        let total: f32 = Role::ALL.iter().map(|&r| self.get(r).spawn_weight).sum();
        if !(total > 0.0) {
            return Err("at least one role needs a positive spawn_weight".to_string());
        }
        Ok(())
    }
}
