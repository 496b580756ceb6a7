//! Statistics tracking for the simulation.

use crate::bot::Bot;
use crate::buffs::{BuffKind, BuffSet};
use crate::ecology::{Food, FoodKind, PowerUp, Predator};
use crate::roles::Role;
use crate::world::TickEvents;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Living bots per role
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub harvester: usize,
    pub warrior: usize,
    pub scout: usize,
    pub drone: usize,
    pub leader: usize,
}

impl RoleCounts {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Harvester => self.harvester,
            Role::Warrior => self.warrior,
            Role::Scout => self.scout,
            Role::Drone => self.drone,
            Role::Leader => self.leader,
        }
    }

    fn increment(&mut self, role: Role) {
        match role {
            Role::Harvester => self.harvester += 1,
            Role::Warrior => self.warrior += 1,
            Role::Scout => self.scout += 1,
            Role::Drone => self.drone += 1,
            Role::Leader => self.leader += 1,
        }
    }

    pub fn total(&self) -> usize {
        Role::ALL.iter().map(|&r| self.get(r)).sum()
    }
}

/// Statistics snapshot for a simulation step
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation time
    pub time: u64,
    /// Living bots
    pub population: usize,
    pub roles: RoleCounts,
    /// Living predators
    pub predators: usize,
    /// Food items on the ground (carrion included)
    pub food: usize,
    pub carrion: usize,
    pub power_ups: usize,
    /// Mean energy across bots
    pub energy_mean: f32,
    /// Deepest offspring generation alive
    pub generation_max: u32,
    /// Ticks left on the swarm buffs
    pub speed_buff_remaining: u32,
    pub damage_buff_remaining: u32,

    // Per-step counters
    pub births: usize,
    pub starvations: usize,
    pub predations: usize,
    pub predator_deaths: usize,
    pub shouts: usize,

    // Running totals
    pub total_births: u64,
    pub total_kills: u64,
    pub total_predator_deaths: u64,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Update gauges from current simulation state
    pub fn update(
        &mut self,
        bots: &[Bot],
        predators: &[Predator],
        food: &[Food],
        power_ups: &[PowerUp],
        swarm_buffs: &BuffSet,
    ) {
        let alive: Vec<&Bot> = bots.iter().filter(|b| b.is_alive()).collect();
        self.population = alive.len();

        self.roles = RoleCounts::default();
        for bot in &alive {
            self.roles.increment(bot.role);
        }

        if alive.is_empty() {
            self.energy_mean = 0.0;
            self.generation_max = 0;
        } else {
            self.energy_mean = alive.iter().map(|b| b.energy).sum::<f32>() / alive.len() as f32;
            self.generation_max = alive.iter().map(|b| b.generation).max().unwrap_or(0);
        }

        self.predators = predators.iter().filter(|p| p.is_alive()).count();
        self.food = food.len();
        self.carrion = food.iter().filter(|f| f.kind == FoodKind::Carrion).count();
        self.power_ups = power_ups.len();
        self.speed_buff_remaining = swarm_buffs.remaining(BuffKind::Speed);
        self.damage_buff_remaining = swarm_buffs.remaining(BuffKind::Damage);
    }

    /// Fold one tick's events into the counters
    pub fn record_events(&mut self, events: &TickEvents) {
        self.births = events.births.len();
        self.starvations = events.starved.len();
        self.predations = events.eaten.len();
        self.predator_deaths = events.predator_deaths.len();
        self.shouts = events.shouts;

        self.total_births += self.births as u64;
        self.total_kills += self.predations as u64;
        self.total_predator_deaths += self.predator_deaths as u64;
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Pop:{:4} (H{} W{} S{} D{} L{}) | Pred:{:2} | Food:{:3} | PU:{:2} | Energy:{:.0} | Kills:{}",
            self.time,
            self.population,
            self.roles.harvester,
            self.roles.warrior,
            self.roles.scout,
            self.roles.drone,
            self.roles.leader,
            self.predators,
            self.food,
            self.power_ups,
            self.energy_mean,
            self.total_kills,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Whether a sample is due at `time`
    #[inline]
    pub fn is_due(&self, time: u64) -> bool {
        time % self.interval == 0
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.population))
            .collect()
    }

    /// Get one role's head count over time
    pub fn role_series(&self, role: Role) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.roles.get(role)))
            .collect()
    }

    /// Serialize the whole history as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Save history to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecology::{PredatorConfig, PowerUpKind};
    use crate::vector::Vec2;

    #[test]
    fn test_stats_update() {
        let none = BuffSet::new();
        let bots = vec![
            Bot::new(1, Role::Harvester, Vec2::ZERO, Vec2::ZERO, 50.0, &none),
            Bot::new(2, Role::Harvester, Vec2::ZERO, Vec2::ZERO, 70.0, &none),
            Bot::new(3, Role::Leader, Vec2::ZERO, Vec2::ZERO, 90.0, &none),
        ];
        let predators = vec![Predator::new(1, Vec2::ZERO, Vec2::ZERO, &PredatorConfig::default())];
        let food = vec![
            Food::new(1, Vec2::ZERO, FoodKind::Plain),
            Food::new(2, Vec2::ZERO, FoodKind::Carrion),
        ];
        let power_ups = vec![PowerUp::new(1, Vec2::ZERO, PowerUpKind::Energy)];
        let mut swarm = BuffSet::new();
        swarm.grant(BuffKind::Speed, 12);

        let mut stats = Stats::new();
        stats.update(&bots, &predators, &food, &power_ups, &swarm);

        assert_eq!(stats.population, 3);
        assert_eq!(stats.roles.harvester, 2);
        assert_eq!(stats.roles.leader, 1);
        assert_eq!(stats.roles.total(), 3);
        assert_eq!(stats.predators, 1);
        assert_eq!(stats.food, 2);
        assert_eq!(stats.carrion, 1);
        assert_eq!(stats.power_ups, 1);
        assert!((stats.energy_mean - 70.0).abs() < 1e-4);
        assert_eq!(stats.speed_buff_remaining, 12);
        assert_eq!(stats.damage_buff_remaining, 0);
    }

    #[test]
    fn test_record_events_accumulates() {
        let mut stats = Stats::new();
        let events = TickEvents {
            births: vec![4, 5],
            eaten: vec![2],
            ..TickEvents::default()
        };
        stats.record_events(&events);
        stats.record_events(&events);

        assert_eq!(stats.births, 2);
        assert_eq!(stats.total_births, 4);
        assert_eq!(stats.total_kills, 2);

        stats.record_events(&TickEvents::default());
        assert_eq!(stats.births, 0);
        assert_eq!(stats.total_births, 4);
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(10);

        for i in 0..5 {
            let mut stats = Stats::new();
            stats.time = i * 10;
            stats.population = (i + 1) as usize * 100;
            stats.roles.scout = i as usize;
            history.record(stats);
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 100));
        assert_eq!(series[4], (40, 500));
        assert_eq!(history.role_series(Role::Scout)[3], (30, 3));
        assert!(history.is_due(20));
        assert!(!history.is_due(25));
    }

    #[test]
    fn test_history_json_export() {
        let mut history = StatsHistory::new(5);
        history.record(Stats {
            time: 5,
            population: 42,
            ..Stats::default()
        });

        let json = history.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["snapshots"][0]["population"], 42);
        assert_eq!(value["interval"], 5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        history.save(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"population\": 42"));
    }
}
