//! Drifting obstacles that bounce around the arena and hurt predators.

use crate::grid::Arena;
use crate::vector::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type ObstacleId = u64;

/// A drifting obstacle. Bots pass through; predators are hurt and pushed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// Outcome of a predator meeting an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleContact {
    /// Overlapping: push the predator by this much and damage it
    Hit { push: Vec2 },
    /// Close but not touching: steer away with this force
    Near { steer: Vec2 },
    Clear,
}

impl Obstacle {
    pub fn new(id: ObstacleId, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
        }
    }

    /// Random drift direction and speed
    pub fn random<R: Rng + ?Sized>(rng: &mut R, id: ObstacleId, position: Vec2, config: &ObstacleConfig) -> Self {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = if config.max_speed > config.min_speed {
            rng.gen_range(config.min_speed..config.max_speed)
        } else {
            config.min_speed
        };
        Self::new(id, position, Vec2::from_angle(angle) * speed, config.radius)
    }

    /// Move one tick, bouncing off the arena edges
    pub fn drift(&mut self, dt: f32, arena: &Arena) {
        self.position += self.velocity * dt;
        if self.position.x - self.radius < 0.0 || self.position.x + self.radius > arena.width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y - self.radius < 0.0 || self.position.y + self.radius > arena.height {
            self.velocity.y = -self.velocity.y;
        }
        self.position = arena.clamp(self.position, self.radius);
    }

    /// Momentum handed over by something bumping into it
    pub fn impact(&mut self, force: Vec2) {
        self.velocity += force;
    }

    /// How a predator of `radius` at `position` relates to this obstacle
    pub fn contact(&self, position: Vec2, radius: f32, config: &ObstacleConfig) -> ObstacleContact {
        let offset = position - self.position;
        let dist = offset.magnitude();
        let min_dist = radius + self.radius + config.contact_margin;
        if dist < min_dist {
            if dist > 0.0 {
                ObstacleContact::Hit {
                    push: offset.normalize() * (min_dist - dist + 1.0),
                }
            } else {
                ObstacleContact::Hit { push: Vec2::ZERO }
            }
        } else if config.avoid_margin > 0.0 && dist < min_dist + config.avoid_margin {
            let closeness = (min_dist + config.avoid_margin - dist) / config.avoid_margin;
            ObstacleContact::Near {
                steer: offset.normalize() * (config.avoid_strength * closeness),
            }
        } else {
            ObstacleContact::Clear
        }
    }
}

/// Elastic bumps between obstacles: overlapping pairs swap velocities and separate
pub fn resolve_collisions(obstacles: &mut [Obstacle]) {
    let n = obstacles.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = obstacles.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];
            let offset = a.position - b.position;
            let dist = offset.magnitude();
            let min_dist = a.radius + b.radius;
            if dist > 0.0 && dist < min_dist {
                std::mem::swap(&mut a.velocity, &mut b.velocity);
                let push = offset.normalize() * (min_dist - dist + 1.0);
                a.position += push * 0.5;
                b.position -= push * 0.5;
            }
        }
    }
}

/// Obstacle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Obstacles placed at start; there is no spawner
    pub count: usize,
    pub radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Predator health lost per tick of overlap
    pub contact_damage: f32,
    /// Extra gap counted as touching
    pub contact_margin: f32,
    /// Predators inside this band beyond contact steer away
    pub avoid_margin: f32,
    /// Steering force at the inner edge of the band
    pub avoid_strength: f32,
    /// Fraction of the push handed back to the obstacle
    pub impact_transfer: f32,
    pub spawn_margin: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            count: 6,
            radius: 18.0,
            min_speed: 0.5,
            max_speed: 1.5,
            contact_damage: 2.0,
            contact_margin: 2.0,
            avoid_margin: 30.0,
            avoid_strength: 0.3,
            impact_transfer: 0.07,
            spawn_margin: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_drift_bounces_off_edges() {
        let arena = Arena::new(200.0, 100.0);
        let mut o = Obstacle::new(0, Vec2::new(195.0, 50.0), Vec2::new(2.0, 0.0), 18.0);
        o.drift(1.0, &arena);
        assert!(o.velocity.x < 0.0);
        assert!(o.position.x <= 200.0 - 18.0);

        let mut o = Obstacle::new(1, Vec2::new(100.0, 19.0), Vec2::new(0.0, -3.0), 18.0);
        o.drift(1.0, &arena);
        assert!(o.velocity.y > 0.0);
        assert!(o.position.y >= 18.0);
    }

    #[test]
    fn test_random_speed_in_range() {
        let config = ObstacleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for id in 0..20 {
            let o = Obstacle::random(&mut rng, id, Vec2::new(50.0, 50.0), &config);
            let speed = o.velocity.magnitude();
            assert!(speed >= config.min_speed - 1e-5 && speed <= config.max_speed + 1e-5);
        }
    }

    #[test]
    fn test_contact_zones() {
        let config = ObstacleConfig::default();
        let o = Obstacle::new(0, Vec2::new(100.0, 100.0), Vec2::ZERO, 18.0);

        // 10 + 18 + 2 = 30 is the touching distance
        match o.contact(Vec2::new(125.0, 100.0), 10.0, &config) {
            ObstacleContact::Hit { push } => {
                assert!(push.x > 0.0);
                assert!((push.magnitude() - 6.0).abs() < 1e-4);
            }
            other => panic!("expected hit, got {:?}", other),
        }
        match o.contact(Vec2::new(100.0, 140.0), 10.0, &config) {
            ObstacleContact::Near { steer } => assert!(steer.y > 0.0),
            other => panic!("expected near, got {:?}", other),
        }
        assert_eq!(o.contact(Vec2::new(100.0, 200.0), 10.0, &config), ObstacleContact::Clear);
    }

    #[test]
    fn test_collisions_swap_velocity() {
        let mut obstacles = vec![
            Obstacle::new(0, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 18.0),
            Obstacle::new(1, Vec2::new(120.0, 100.0), Vec2::new(-1.0, 0.5), 18.0),
            Obstacle::new(2, Vec2::new(400.0, 100.0), Vec2::new(0.0, 1.0), 18.0),
        ];
        resolve_collisions(&mut obstacles);

        assert_eq!(obstacles[0].velocity, Vec2::new(-1.0, 0.5));
        assert_eq!(obstacles[1].velocity, Vec2::new(1.0, 0.0));
        assert!(obstacles[0].position.distance(obstacles[1].position) >= 36.0);
        assert_eq!(obstacles[2].velocity, Vec2::new(0.0, 1.0));
    }
}
