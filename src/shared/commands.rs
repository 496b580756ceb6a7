//! Commands accepted from the input layer.
//!
//! Commands are queued on the world and applied at the start of the next
//! step, so a command never lands in the middle of a tick.

use crate::ecology::PowerUpKind;
use crate::roles::Role;
use crate::vector::Vec2;
use serde::{Deserialize, Serialize};

/// Commands sent to the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Scatter food items, or drop them all at one point
    SpawnFood { count: usize, at: Option<Vec2> },
    /// Place one power-up; kind and position are random when omitted
    SpawnPowerUp {
        kind: Option<PowerUpKind>,
        at: Option<Vec2>,
    },
    /// Add a bot; role follows the spawn weights when omitted
    SpawnBot { role: Option<Role>, at: Option<Vec2> },
}

impl Command {
    /// `count` food items at random positions
    pub fn food(count: usize) -> Self {
        Command::SpawnFood { count, at: None }
    }

    /// A random power-up at a random position
    pub fn power_up() -> Self {
        Command::SpawnPowerUp { kind: None, at: None }
    }

    /// A random-role bot at a random position
    pub fn bot() -> Self {
        Command::SpawnBot { role: None, at: None }
    }
}
