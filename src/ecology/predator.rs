//! Predators: hunting state machine, health and movement.

use crate::bot::BotId;
use crate::buffs::{ActiveBuff, BuffKind, BuffSet};
use crate::ecology::food::PowerUpKind;
use crate::ecology::predation;
use crate::grid::Arena;
use crate::vector::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type PredatorId = u64;

/// Predator lifecycle state. `Dying` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredatorState {
    Hunting,
    Dying,
}

/// A warrior currently holding the predator's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taunt {
    pub warrior: BotId,
    pub remaining: u32,
}

/// A predator in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predator {
    pub id: PredatorId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub kill_count: u32,
    pub attack_cooldown: u32,
    pub state: PredatorState,
    pub taunt: Option<Taunt>,
    /// Speed and damage boosts picked up from power-ups
    pub buffs: BuffSet,
    pub age: u64,
    /// Health when starvation last started counting
    #[serde(skip)]
    starve_from: f32,
    #[serde(skip)]
    starve_ticks: u32,
}

/// Remaining health below this share of one tick's decay counts as gone
const STARVATION_TOLERANCE: f32 = 1e-3;

#[inline]
fn decayed(from: f32, ticks: u32, rate: f32) -> f64 {
    from as f64 - ticks as f64 * rate as f64
}

impl Predator {
    /// Create a predator at half health (or whatever the config says)
    pub fn new(id: PredatorId, position: Vec2, velocity: Vec2, config: &PredatorConfig) -> Self {
        let health = config.max_health * config.initial_health_fraction;
        Self {
            id,
            position,
            velocity,
            health,
            max_health: config.max_health,
            kill_count: 0,
            attack_cooldown: 0,
            state: PredatorState::Hunting,
            taunt: None,
            buffs: BuffSet::new(),
            age: 0,
            starve_from: health,
            starve_ticks: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == PredatorState::Hunting
    }

    #[inline]
    pub fn can_strike(&self) -> bool {
        self.is_alive() && self.attack_cooldown == 0
    }

    fn update_state(&mut self) {
        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = PredatorState::Dying;
        }
    }

    /// Apply combat or collision damage
    pub fn take_damage(&mut self, amount: f32) {
        if amount <= 0.0 || !self.is_alive() {
            return;
        }
        self.health -= amount;
        self.update_state();
    }

    /// Restore health, capped at the maximum
    pub fn heal(&mut self, amount: f32) {
        if amount <= 0.0 || !self.is_alive() {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
        self.update_state();
    }

    /// Per-tick health decay.
    ///
    /// Health is recomputed from the last non-starvation change instead of
    /// being decremented, so a predator left alone dies on exactly tick
    /// `ceil(health / rate)`.
    pub fn starve(&mut self, rate: f32) {
        if !self.is_alive() || rate <= 0.0 {
            return;
        }
        if self.health != decayed(self.starve_from, self.starve_ticks, rate) as f32 {
            // Health changed by something other than starvation
            self.starve_from = self.health;
            self.starve_ticks = 0;
        }
        self.starve_ticks += 1;
        let remaining = decayed(self.starve_from, self.starve_ticks, rate);
        if remaining <= (rate * STARVATION_TOLERANCE) as f64 {
            self.health = 0.0;
            self.state = PredatorState::Dying;
        } else {
            self.health = remaining as f32;
        }
    }

    /// Record a kill: heal and start the attack cooldown
    pub fn feed(&mut self, config: &PredatorConfig) {
        self.heal(config.kill_gain);
        self.kill_count += 1;
        self.attack_cooldown = if self.buffs.is_active(BuffKind::Damage) {
            config.attack_cooldown / 2
        } else {
            config.attack_cooldown
        };
    }

    /// Carrion restores health
    pub fn scavenge(&mut self, config: &PredatorConfig) {
        self.heal(config.carrion_heal);
    }

    /// Apply a collected power-up. Boosts last `duration` ticks and do not stack.
    pub fn collect_power_up(&mut self, kind: PowerUpKind, duration: u32, config: &PredatorConfig) {
        match kind {
            PowerUpKind::Speed | PowerUpKind::Damage => {
                if let Some(buff) = kind.buff() {
                    self.buffs.set(
                        buff,
                        ActiveBuff {
                            remaining: duration,
                            stacks: 1,
                        },
                    );
                }
                if kind == PowerUpKind::Damage {
                    self.attack_cooldown = self.attack_cooldown.saturating_sub(config.damage_cooldown_cut);
                }
            }
            PowerUpKind::Energy => self.heal(config.power_up_heal),
        }
    }

    /// Brawl with another predator: damage, push and a longer cooldown
    pub fn brawl(&mut self, push: Vec2, config: &PredatorConfig) {
        self.position += push;
        self.attack_cooldown = self.attack_cooldown.max(config.fight_cooldown);
        self.take_damage(config.fight_damage);
    }

    /// Speed cap including an active speed boost
    pub fn max_speed(&self, config: &PredatorConfig) -> f32 {
        if self.buffs.is_active(BuffKind::Speed) {
            config.max_speed * config.speed_boost
        } else {
            config.max_speed
        }
    }

    /// Count down per-tick timers
    pub fn tick_timers(&mut self) {
        self.age += 1;
        self.buffs.tick();
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        if let Some(taunt) = self.taunt.as_mut() {
            taunt.remaining = taunt.remaining.saturating_sub(1);
            if taunt.remaining == 0 {
                self.taunt = None;
            }
        }
    }

    /// Hold attention on `warrior` for `duration` ticks and nudge toward it
    pub fn taunt_by(&mut self, warrior: BotId, warrior_pos: Vec2, duration: u32, force: f32) {
        self.taunt = Some(Taunt {
            warrior,
            remaining: duration,
        });
        let toward = (warrior_pos - self.position).normalize();
        self.velocity += toward * force;
    }

    /// Steering toward a moving target, aiming ahead of it
    pub fn pursue(&self, target_pos: Vec2, target_vel: Vec2, config: &PredatorConfig) -> Vec2 {
        let distance = self.position.distance(target_pos);
        let future = target_pos + target_vel * config.lead_ticks;
        let speed = self.max_speed(config) * predation::pursuit_speed_multiplier(distance);
        let desired = (future - self.position).normalize() * speed;
        (desired - self.velocity).limit(config.max_force)
    }

    /// Head straight for a resting item
    pub fn seek(&self, target: Vec2, config: &PredatorConfig) -> Vec2 {
        let desired = (target - self.position).normalize() * self.max_speed(config);
        (desired - self.velocity).limit(config.max_force)
    }

    /// Random jitter used when nothing is in range
    pub fn wander<R: Rng + ?Sized>(&self, rng: &mut R, config: &PredatorConfig) -> Vec2 {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let jitter = Vec2::from_angle(angle) * config.wander_strength;
        // Keep cruising at roughly wander speed
        let heading = if self.velocity.magnitude_squared() > 0.0 {
            self.velocity.normalize()
        } else {
            Vec2::from_angle(angle)
        };
        let cruise = heading * (self.max_speed(config) * config.wander_speed_fraction) - self.velocity;
        (cruise.limit(config.max_force * 0.5) + jitter).limit(config.max_force)
    }

    /// Apply steering, clamp speed, move and wrap
    pub fn integrate(&mut self, steer: Vec2, dt: f32, arena: &Arena, config: &PredatorConfig) {
        self.velocity = (self.velocity + steer).limit(self.max_speed(config));
        self.position = arena.wrap(self.position + self.velocity * dt);
    }
}

/// Predator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredatorConfig {
    pub radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    /// Bots inside this radius are chased
    pub hunt_radius: f32,
    /// Bots inside this radius are eaten
    pub kill_radius: f32,
    pub max_health: f32,
    /// Fraction of max health a fresh predator starts with
    pub initial_health_fraction: f32,
    /// Health restored by a kill
    pub kill_gain: f32,
    /// Health lost every tick
    pub starvation_rate: f32,
    /// Ticks between kills
    pub attack_cooldown: u32,
    /// Carrion within `hunt_radius` times this is sought before ordinary prey
    pub carrion_seek_factor: f32,
    /// Health restored by one carrion item
    pub carrion_heal: f32,
    /// Power-ups within this radius are sought when no prey is around
    pub power_up_seek_radius: f32,
    /// Speed cap multiplier while a speed boost is active
    pub speed_boost: f32,
    /// Attack cooldown removed when a damage boost is picked up
    pub damage_cooldown_cut: u32,
    /// Health restored by an energy power-up
    pub power_up_heal: f32,
    /// Predators closer than this brawl
    pub fight_range: f32,
    /// Health each brawler loses
    pub fight_damage: f32,
    /// Extra distance brawlers are thrown apart
    pub fight_bounce: f32,
    /// Minimum attack cooldown after a brawl
    pub fight_cooldown: u32,
    /// Other predators inside this radius push away
    pub avoid_radius: f32,
    /// How many ticks ahead of the target to aim
    pub lead_ticks: f32,
    pub wander_strength: f32,
    pub wander_speed_fraction: f32,
    /// Chase leaders before anything else
    pub prefer_leaders: bool,
    /// Carrion dropped on death, inclusive range
    pub drop_min: usize,
    pub drop_max: usize,
    /// Carrion lands within this distance of the death position
    pub drop_scatter: f32,
    /// Spawner keeps at least this many predators
    pub min_predators: usize,
    /// Interval spawner never exceeds this many
    pub max_predators: usize,
    /// Ticks between timed spawns (0 disables)
    pub spawn_interval: u64,
    /// Chance that a death immediately brings in a replacement
    pub respawn_chance: f32,
    pub spawn_margin: f32,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            max_speed: 4.0,
            max_force: 0.18,
            hunt_radius: 150.0,
            kill_radius: 12.0,
            max_health: 100.0,
            initial_health_fraction: 0.5,
            kill_gain: 15.0,
            starvation_rate: 0.08,
            attack_cooldown: 30,
            carrion_seek_factor: 2.0,
            carrion_heal: 40.0,
            power_up_seek_radius: 200.0,
            speed_boost: 1.5,
            damage_cooldown_cut: 10,
            power_up_heal: 20.0,
            fight_range: 14.0,
            fight_damage: 18.0,
            fight_bounce: 4.0,
            fight_cooldown: 18,
            avoid_radius: 40.0,
            lead_ticks: 3.0,
            wander_strength: 0.08,
            wander_speed_fraction: 0.6,
            prefer_leaders: true,
            drop_min: 3,
            drop_max: 5,
            drop_scatter: 30.0,
            min_predators: 1,
            max_predators: 6,
            spawn_interval: 1800,
            respawn_chance: 0.25,
            spawn_margin: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn predator() -> Predator {
        Predator::new(1, Vec2::new(100.0, 100.0), Vec2::ZERO, &PredatorConfig::default())
    }

    #[test]
    fn test_starts_at_half_health() {
        let p = predator();
        assert_eq!(p.health, 50.0);
        assert!(p.is_alive());
        assert!(p.can_strike());
    }

    #[test]
    fn test_starvation_to_dying() {
        let mut p = predator();
        let mut last = p.health;
        for _ in 0..100 {
            p.starve(0.5);
            if p.is_alive() {
                assert!(p.health < last);
            }
            last = p.health;
        }
        assert_eq!(p.state, PredatorState::Dying);
        assert_eq!(p.health, 0.0);

        // Dying is terminal
        p.feed(&PredatorConfig::default());
        p.starve(0.5);
        assert_eq!(p.state, PredatorState::Dying);
    }

    #[test]
    fn test_starvation_tick_is_exact() {
        // 50 / 0.1 = 500 ticks; plain f32 subtraction overshoots by one
        for (rate, expected) in [(0.1_f32, 500), (0.05, 1000), (0.3, 167), (0.08, 625)] {
            let mut p = predator();
            let mut ticks = 0;
            while p.is_alive() {
                p.starve(rate);
                ticks += 1;
            }
            assert_eq!(ticks, expected, "rate {}", rate);
        }
    }

    #[test]
    fn test_starvation_restarts_after_heal() {
        let config = PredatorConfig::default();
        let mut p = predator();
        for _ in 0..100 {
            p.starve(0.1);
        }
        p.scavenge(&config);
        assert!((p.health - 80.0).abs() < 1e-3);

        let mut ticks = 0;
        while p.is_alive() {
            p.starve(0.1);
            ticks += 1;
        }
        assert_eq!(ticks, 800);
    }

    #[test]
    fn test_power_ups() {
        let config = PredatorConfig::default();
        let mut p = predator();

        p.collect_power_up(PowerUpKind::Speed, 3, &config);
        assert!((p.max_speed(&config) - config.max_speed * config.speed_boost).abs() < 1e-5);
        // A second pickup refreshes rather than stacks
        p.collect_power_up(PowerUpKind::Speed, 3, &config);
        assert_eq!(p.buffs.stacks(BuffKind::Speed), 1);
        for _ in 0..3 {
            p.tick_timers();
        }
        assert_eq!(p.max_speed(&config), config.max_speed);

        p.attack_cooldown = 25;
        p.collect_power_up(PowerUpKind::Damage, 100, &config);
        assert_eq!(p.attack_cooldown, 15);
        p.feed(&config);
        assert_eq!(p.attack_cooldown, config.attack_cooldown / 2);

        p.health = 50.0;
        p.collect_power_up(PowerUpKind::Energy, 100, &config);
        assert_eq!(p.health, 50.0 + config.power_up_heal);
    }

    #[test]
    fn test_brawl() {
        let config = PredatorConfig::default();
        let mut p = predator();
        p.brawl(Vec2::new(-5.0, 0.0), &config);
        assert_eq!(p.position, Vec2::new(95.0, 100.0));
        assert_eq!(p.health, 50.0 - config.fight_damage);
        assert_eq!(p.attack_cooldown, config.fight_cooldown);

        p.brawl(Vec2::ZERO, &config);
        p.brawl(Vec2::ZERO, &config);
        assert_eq!(p.state, PredatorState::Dying);
    }

    #[test]
    fn test_feed_caps_health() {
        let config = PredatorConfig::default();
        let mut p = predator();
        p.health = 95.0;
        p.feed(&config);

        assert_eq!(p.health, config.max_health);
        assert_eq!(p.kill_count, 1);
        assert_eq!(p.attack_cooldown, config.attack_cooldown);
        assert!(!p.can_strike());
    }

    #[test]
    fn test_taunt_expires() {
        let mut p = predator();
        p.taunt_by(7, Vec2::new(110.0, 100.0), 2, 0.8);
        assert!(p.velocity.x > 0.0);
        p.tick_timers();
        assert_eq!(p.taunt.map(|t| t.warrior), Some(7));
        p.tick_timers();
        assert!(p.taunt.is_none());
    }

    #[test]
    fn test_pursue_points_at_target() {
        let config = PredatorConfig::default();
        let p = predator();
        let steer = p.pursue(Vec2::new(200.0, 100.0), Vec2::ZERO, &config);
        assert!(steer.x > 0.0);
        assert!(steer.magnitude() <= config.max_force + 1e-6);
    }

    #[test]
    fn test_wander_bounded() {
        let config = PredatorConfig::default();
        let p = predator();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let steer = p.wander(&mut rng, &config);
            assert!(steer.is_finite());
            assert!(steer.magnitude() <= config.max_force + 1e-6);
        }
    }

    #[test]
    fn test_integrate_clamps_speed_and_wraps() {
        let config = PredatorConfig::default();
        let arena = Arena::new(200.0, 200.0);
        let mut p = Predator::new(1, Vec2::new(199.0, 10.0), Vec2::new(10.0, 0.0), &config);
        p.integrate(Vec2::ZERO, 1.0, &arena, &config);

        assert!((p.velocity.magnitude() - config.max_speed).abs() < 1e-5);
        assert!(arena.contains(p.position));
        assert!(p.position.x < 10.0);
    }
}
