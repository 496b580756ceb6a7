//! Bot structure and steering behaviour.
//!
//! A bot owns its kinematic state, energy and timers. Steering is a weighted
//! sum of Reynolds-style terms whose weights come from the bot's [`RoleParams`]
//! row; the world gathers a [`SteeringContext`] for every bot from the same
//! start-of-phase snapshot before any bot moves.

use crate::buffs::{BuffKind, BuffSet};
use crate::config::BotConfig;
use crate::ecology::FoodId;
use crate::grid::Arena;
use crate::roles::{Role, RoleParams};
use crate::vector::Vec2;
use serde::{Deserialize, Serialize};

/// Unique bot identifier
pub type BotId = u64;

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Predation,
}

/// Where a bot's seek target came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSource {
    Food,
    PowerUp,
    Shout,
}

/// Chosen seek target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vec2,
    /// Real (undiscounted) distance from the bot
    pub distance: f32,
    pub source: TargetSource,
}

/// Pick the seek target among the nearest food, the nearest power-up and a
/// heard shout. Power-ups and shouts compete through a distance discount.
pub fn choose_target(
    food: Option<(Vec2, f32)>,
    power_up: Option<(Vec2, f32)>,
    shout: Option<(Vec2, f32)>,
    power_up_priority: f32,
    shout_priority: f32,
) -> Option<Target> {
    let candidates = [
        food.map(|(p, d)| (d, p, d, TargetSource::Food)),
        power_up.map(|(p, d)| (d * power_up_priority, p, d, TargetSource::PowerUp)),
        shout.map(|(p, d)| (d * shout_priority, p, d, TargetSource::Shout)),
    ];

    let mut best: Option<(f32, Target)> = None;
    for (score, position, distance, source) in candidates.into_iter().flatten() {
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((
                score,
                Target {
                    position,
                    distance,
                    source,
                },
            ));
        }
    }
    best.map(|(_, t)| t)
}

/// A neighbouring bot as seen at the start of the phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance: f32,
}

/// Everything a bot perceives when choosing its steering
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    /// Other bots near this one (never includes the bot itself)
    pub neighbors: &'a [Neighbor],
    /// Chosen food, power-up or shout target
    pub target: Option<Target>,
    /// Positions of living predators
    pub predators: &'a [Vec2],
    /// Swarm centroid, used by leaders
    pub formation_target: Option<Vec2>,
    /// Max speed multiplier per speed-buff stack
    pub speed_per_stack: f32,
    /// Urgency cap for predator avoidance
    pub panic_cap: f32,
}

/// An autonomous swarm member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    // Identity
    pub id: BotId,
    pub role: Role,
    pub generation: u32,

    // Kinematics
    pub position: Vec2,
    pub velocity: Vec2,

    // Energy and timers
    pub energy: f32,
    pub reproduction_cooldown: u32,
    pub shout_cooldown: u32,
    pub taunt_cooldown: u32,
    pub buffs: BuffSet,

    // Behaviour state
    pub last_shouted: Option<FoodId>,
    pub burst_active: bool,

    // Statistics
    pub age: u64,
    pub food_eaten: u32,
    pub cause_of_death: Option<DeathCause>,
}

impl Bot {
    /// Create a bot carrying a copy of the current swarm buffs
    pub fn new(id: BotId, role: Role, position: Vec2, velocity: Vec2, energy: f32, swarm_buffs: &BuffSet) -> Self {
        Self {
            id,
            role,
            generation: 0,
            position,
            velocity,
            energy,
            reproduction_cooldown: 0,
            shout_cooldown: 0,
            taunt_cooldown: 0,
            buffs: swarm_buffs.clone(),
            last_shouted: None,
            burst_active: false,
            age: 0,
            food_eaten: 0,
            cause_of_death: None,
        }
    }

    /// Offspring of `self`, placed at the parent's position
    pub fn offspring(&self, id: BotId, role: Role, config: &BotConfig, swarm_buffs: &BuffSet) -> Self {
        let mut child = Bot::new(
            id,
            role,
            self.position,
            self.velocity * -0.5,
            config.offspring_energy.min(config.max_energy),
            swarm_buffs,
        );
        child.generation = self.generation + 1;
        child
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0 && self.cause_of_death.is_none()
    }

    // === Steering ===

    /// Harvester burst: a target is close enough to sprint for
    pub fn is_bursting(&self, ctx: &SteeringContext, params: &RoleParams) -> bool {
        params.abilities.bursts
            && ctx
                .target
                .map_or(false, |t| t.distance <= params.priority_food_range)
    }

    /// Speed cap with buffs and an optional burst applied
    pub fn max_speed_for(&self, params: &RoleParams, speed_per_stack: f32, bursting: bool) -> f32 {
        let burst = if bursting {
            params.burst_speed_multiplier
        } else {
            1.0
        };
        params.max_speed * self.buffs.multiplier(BuffKind::Speed, speed_per_stack) * burst
    }

    /// Speed cap for the bot's current burst state
    pub fn effective_max_speed(&self, params: &RoleParams, speed_per_stack: f32) -> f32 {
        self.max_speed_for(params, speed_per_stack, self.burst_active)
    }

    /// Weighted sum of all steering terms, clamped to `max_steering`
    pub fn compute_steering(&self, ctx: &SteeringContext, params: &RoleParams) -> Vec2 {
        let bursting = self.is_bursting(ctx, params);
        let max_speed = self.max_speed_for(params, ctx.speed_per_stack, bursting);

        let (alignment_scale, cohesion_scale, seek_scale) = if bursting {
            (0.3, 0.2, 1.5)
        } else {
            (1.0, 1.0, 1.0)
        };

        let mut force = Vec2::ZERO;
        force += self.separation(ctx.neighbors, params, max_speed) * params.separation_weight;
        force += self.alignment(ctx.neighbors, params, max_speed) * (params.alignment_weight * alignment_scale);
        force += self.cohesion(ctx.neighbors, params, max_speed) * (params.cohesion_weight * cohesion_scale);

        if let Some(target) = ctx.target {
            force += self.seek(target.position, params, max_speed) * (params.food_seek_weight * seek_scale);
        }

        force += self.avoid_predators(ctx.predators, params, max_speed, ctx.panic_cap) * params.predator_avoid_weight;

        if params.abilities.taunts {
            if let Some(predator) = nearest_within(self.position, ctx.predators, params.taunt_range) {
                force += self.seek(predator, params, max_speed) * params.engage_weight;
            }
        }

        if params.abilities.leads {
            if let Some(formation) = ctx.formation_target {
                force += self.seek(formation, params, max_speed) * params.formation_weight;
            }
        }

        force.limit(params.max_steering)
    }

    /// Reynolds steer toward a point
    pub fn seek(&self, target: Vec2, params: &RoleParams, max_speed: f32) -> Vec2 {
        let desired = (target - self.position).normalize() * max_speed;
        (desired - self.velocity).limit(params.max_force)
    }

    /// Turn a desired heading into a steer, zero when there is no heading
    fn steer_toward(&self, heading: Vec2, params: &RoleParams, max_speed: f32) -> Vec2 {
        if heading.magnitude_squared() == 0.0 {
            return Vec2::ZERO;
        }
        (heading.normalize() * max_speed - self.velocity).limit(params.max_force)
    }

    pub fn separation(&self, neighbors: &[Neighbor], params: &RoleParams, max_speed: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0;
        for n in neighbors {
            if n.distance > 0.0 && n.distance < params.separation_radius {
                sum += (self.position - n.position).normalize() / n.distance;
                count += 1;
            }
        }
        if count == 0 {
            return Vec2::ZERO;
        }
        self.steer_toward(sum / count as f32, params, max_speed)
    }

    pub fn alignment(&self, neighbors: &[Neighbor], params: &RoleParams, max_speed: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0;
        for n in neighbors.iter().filter(|n| n.distance < params.perception_radius) {
            sum += n.velocity;
            count += 1;
        }
        if count == 0 {
            return Vec2::ZERO;
        }
        self.steer_toward(sum / count as f32, params, max_speed)
    }

    pub fn cohesion(&self, neighbors: &[Neighbor], params: &RoleParams, max_speed: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0;
        for n in neighbors.iter().filter(|n| n.distance < params.perception_radius) {
            sum += n.position;
            count += 1;
        }
        if count == 0 {
            return Vec2::ZERO;
        }
        self.seek(sum / count as f32, params, max_speed)
    }

    /// Flee every predator inside the fear radius, stronger the closer the nearest one is
    pub fn avoid_predators(&self, predators: &[Vec2], params: &RoleParams, max_speed: f32, panic_cap: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut d_min = f32::INFINITY;
        for &p in predators {
            let d = self.position.distance(p);
            if d > 0.0 && d < params.fear_radius {
                sum += (self.position - p).normalize() / (d * d);
                d_min = d_min.min(d);
            }
        }
        if !d_min.is_finite() {
            return Vec2::ZERO;
        }
        let urgency = ((params.fear_radius / d_min).powi(2)).min(panic_cap);
        (self.steer_toward(sum, params, max_speed) * urgency).limit(params.max_force * 3.0)
    }

    /// Apply steering, clamp speed, move and wrap
    pub fn integrate(&mut self, steer: Vec2, max_speed: f32, dt: f32, arena: &Arena) {
        self.velocity = (self.velocity + steer).limit(max_speed);
        self.position = arena.wrap(self.position + self.velocity * dt);
    }

    // === Energy ===

    /// Pay the per-tick and movement cost. Returns true if the bot starved.
    pub fn spend_energy(&mut self, config: &BotConfig, dt: f32) -> bool {
        let cost = config.energy_cost_per_tick + config.move_cost * self.velocity.magnitude() * dt;
        self.energy = (self.energy - cost).max(0.0);
        if self.energy <= 0.0 {
            self.cause_of_death = Some(DeathCause::Starvation);
            true
        } else {
            false
        }
    }

    /// Gain energy, capped at `max_energy`
    pub fn gain_energy(&mut self, amount: f32, max_energy: f32) {
        self.energy = (self.energy + amount.max(0.0)).min(max_energy);
    }

    /// Eat a food item worth `base_energy` before the role multiplier
    pub fn eat(&mut self, base_energy: f32, params: &RoleParams, max_energy: f32) {
        self.gain_energy(base_energy * params.food_energy_multiplier, max_energy);
        self.food_eaten += 1;
    }

    // === Timers and abilities ===

    /// Age the bot and count its cooldowns down
    pub fn tick_timers(&mut self) {
        self.age += 1;
        self.reproduction_cooldown = self.reproduction_cooldown.saturating_sub(1);
        self.shout_cooldown = self.shout_cooldown.saturating_sub(1);
        self.taunt_cooldown = self.taunt_cooldown.saturating_sub(1);
    }

    /// Eligibility for reproduction, before the chance roll
    pub fn can_reproduce(&self, params: &RoleParams, config: &BotConfig, nearest_food: Option<f32>) -> bool {
        params.abilities.reproduces
            && self.energy >= config.reproduction_threshold
            && self.reproduction_cooldown == 0
            && nearest_food.map_or(false, |d| d <= config.reproduction_radius)
    }

    /// Pay the reproduction cost and restart the cooldown
    pub fn pay_for_offspring(&mut self, config: &BotConfig) {
        self.energy = (self.energy - config.reproduction_cost).max(0.0);
        self.reproduction_cooldown = config.reproduction_cooldown;
    }

    /// Food worth shouting about, if this bot shouts and is ready to
    pub fn shout_about(&self, params: &RoleParams, sensed_food: Option<FoodId>) -> Option<FoodId> {
        if !params.abilities.shouts || self.shout_cooldown > 0 {
            return None;
        }
        sensed_food.filter(|&food| self.last_shouted != Some(food))
    }

    pub fn record_shout(&mut self, food: FoodId, cooldown: u32) {
        self.last_shouted = Some(food);
        self.shout_cooldown = cooldown;
    }

    #[inline]
    pub fn can_taunt(&self, params: &RoleParams) -> bool {
        params.abilities.taunts && self.taunt_cooldown == 0
    }
}

/// Nearest point strictly inside `radius`
pub fn nearest_within(from: Vec2, points: &[Vec2], radius: f32) -> Option<Vec2> {
    points
        .iter()
        .map(|&p| (p, from.distance_squared(p)))
        .filter(|&(_, d2)| d2 < radius * radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}
