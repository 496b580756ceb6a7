//! Snapshot structures for the presentation layer.
//!
//! These are lightweight copies of simulation state; a renderer reads them
//! without ever touching the world itself.

use crate::bot::BotId;
use crate::buffs::{ActiveBuff, BuffKind};
use crate::ecology::{FoodId, FoodKind, ObstacleId, PowerUpId, PowerUpKind, PredatorId, PredatorState};
use crate::roles::Role;
use crate::stats::Stats;
use crate::vector::Vec2;
use serde::Serialize;

/// Lightweight view of a bot for rendering
#[derive(Clone, Debug, Serialize)]
pub struct BotView {
    pub id: BotId,
    pub role: Role,
    pub position: Vec2,
    pub velocity: Vec2,
    pub energy: f32,
    /// Speed cap with buffs and burst applied
    pub effective_max_speed: f32,
    pub burst_active: bool,
    /// Active buffs carried by this bot
    pub buffs: Vec<(BuffKind, ActiveBuff)>,
    pub generation: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PredatorView {
    pub id: PredatorId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub kill_count: u32,
    pub state: PredatorState,
    /// Warrior currently holding its attention
    pub taunted_by: Option<BotId>,
    pub buffs: Vec<(BuffKind, ActiveBuff)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FoodView {
    pub id: FoodId,
    pub position: Vec2,
    pub kind: FoodKind,
    pub radius: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PowerUpView {
    pub id: PowerUpId,
    pub position: Vec2,
    pub kind: PowerUpKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObstacleView {
    pub id: ObstacleId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// Complete world snapshot for rendering
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    /// Current simulation time in ticks
    pub time: u64,
    pub width: f32,
    pub height: f32,
    pub bots: Vec<BotView>,
    pub predators: Vec<PredatorView>,
    pub food: Vec<FoodView>,
    pub power_ups: Vec<PowerUpView>,
    pub obstacles: Vec<ObstacleView>,
    /// Swarm-wide buffs with their remaining ticks
    pub swarm_buffs: Vec<(BuffKind, ActiveBuff)>,
    pub stats: Stats,
}

impl WorldSnapshot {
    /// Look up a bot view by id
    pub fn bot(&self, id: BotId) -> Option<&BotView> {
        self.bots.iter().find(|b| b.id == id)
    }

    pub fn bots_with_role(&self, role: Role) -> impl Iterator<Item = &BotView> + '_ {
        self.bots.iter().filter(move |b| b.role == role)
    }

    /// Remaining ticks of a swarm buff, 0 when inactive
    pub fn buff_remaining(&self, kind: BuffKind) -> u32 {
        self.swarm_buffs
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, b)| b.remaining)
    }
}
