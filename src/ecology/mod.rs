//! Passive and hostile entities sharing the arena with the swarm.
//!
//! This module contains:
//! - Food items and power-ups
//! - Drifting obstacles
//! - Predators (hunting state machine, health, movement)
//! - Predation helpers (strikes, warrior damage, brawls, carrion drops)

pub mod food;
pub mod obstacle;
pub mod predation;
pub mod predator;

pub use food::{Food, FoodConfig, FoodId, FoodKind, PowerUp, PowerUpConfig, PowerUpId, PowerUpKind};
pub use obstacle::{Obstacle, ObstacleConfig, ObstacleContact, ObstacleId};
pub use predator::{Predator, PredatorConfig, PredatorId, PredatorState, Taunt};
