//! Predation system - combat, kill, brawl and carrion-drop mechanics.

use crate::grid::Arena;
use crate::vector::Vec2;
use rand::Rng;

/// Result of a predator's strike attempt
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrikeResult {
    /// Target consumed
    Kill,
    /// No target inside the kill radius
    OutOfRange,
    /// Strike on cooldown
    OnCooldown,
}

/// Decide whether a predator at `predator` consumes a bot at `target`
pub fn strike(predator: Vec2, target: Vec2, kill_radius: f32, ready: bool) -> StrikeResult {
    if !is_in_range(predator, target, kill_radius) {
        StrikeResult::OutOfRange
    } else if !ready {
        StrikeResult::OnCooldown
    } else {
        StrikeResult::Kill
    }
}

/// Strictly inside `radius`
#[inline]
pub fn is_in_range(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Per-tick damage a warrior deals, boosted by its damage multiplier
#[inline]
pub fn warrior_damage(base_damage: f32, damage_multiplier: f32) -> f32 {
    base_damage.max(0.0) * damage_multiplier
}

/// Predators sprint when closing in
#[inline]
pub fn pursuit_speed_multiplier(distance: f32) -> f32 {
    if distance < 50.0 {
        1.3
    } else if distance < 80.0 {
        1.15
    } else {
        1.0
    }
}

/// Push away from nearby predators, weighted by inverse distance
pub fn separation_force(
    position: Vec2,
    others: impl IntoIterator<Item = Vec2>,
    avoid_radius: f32,
    max_force: f32,
) -> Vec2 {
    let mut push = Vec2::ZERO;
    for other in others {
        let d = position.distance(other);
        if d > 0.0 && d < avoid_radius {
            push += (position - other).normalize() / d;
        }
    }
    push.normalize() * max_force
}

/// Two predators closer than `fight_range` brawl. Returns the push for the
/// first one (the second gets the opposite), or `None` when they are apart.
pub fn fight_push(a: Vec2, b: Vec2, fight_range: f32, bounce: f32) -> Option<Vec2> {
    let d = a.distance(b);
    if d > 0.0 && d < fight_range {
        Some((a - b).normalize() * (fight_range - d + bounce))
    } else {
        None
    }
}

/// How many carrion items a dead predator leaves, inclusive range
pub fn carrion_drop_count<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Landing spot for one carrion item, inside the arena
pub fn scatter_position<R: Rng + ?Sized>(rng: &mut R, center: Vec2, scatter: f32, arena: &Arena) -> Vec2 {
    if scatter <= 0.0 {
        return center;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = rng.gen_range(0.0..scatter);
    arena.clamp(center + Vec2::from_angle(angle) * distance, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_strike() {
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(strike(p, Vec2::new(15.0, 10.0), 12.0, true), StrikeResult::Kill);
        assert_eq!(strike(p, Vec2::new(15.0, 10.0), 12.0, false), StrikeResult::OnCooldown);
        assert_eq!(strike(p, Vec2::new(22.0, 10.0), 12.0, true), StrikeResult::OutOfRange);
    }

    #[test]
    fn test_warrior_damage() {
        assert!((warrior_damage(0.5, 1.0) - 0.5).abs() < 1e-6);
        assert!((warrior_damage(0.5, 4.0) - 2.0).abs() < 1e-6);
        assert_eq!(warrior_damage(-1.0, 2.0), 0.0);
    }

    #[test]
    fn test_pursuit_speed() {
        assert_eq!(pursuit_speed_multiplier(10.0), 1.3);
        assert_eq!(pursuit_speed_multiplier(60.0), 1.15);
        assert_eq!(pursuit_speed_multiplier(120.0), 1.0);
    }

    #[test]
    fn test_separation_force() {
        let me = Vec2::new(50.0, 50.0);
        let push = separation_force(me, [Vec2::new(60.0, 50.0)], 40.0, 0.2);
        assert!(push.x < 0.0);
        assert!((push.magnitude() - 0.2).abs() < 1e-5);

        // Nobody close: no push, and no division by zero on a coincident neighbour
        assert_eq!(separation_force(me, [Vec2::new(200.0, 50.0), me], 40.0, 0.2), Vec2::ZERO);
    }

    #[test]
    fn test_fight_push() {
        let a = Vec2::new(100.0, 100.0);
        let push = fight_push(a, Vec2::new(110.0, 100.0), 14.0, 4.0).unwrap();
        assert!(push.x < 0.0);
        assert!((push.magnitude() - 8.0).abs() < 1e-5);

        assert!(fight_push(a, Vec2::new(120.0, 100.0), 14.0, 4.0).is_none());
        assert!(fight_push(a, a, 14.0, 4.0).is_none());
    }

    #[test]
    fn test_carrion_drop_count_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = [false; 6];
        for _ in 0..200 {
            let n = carrion_drop_count(&mut rng, 3, 5);
            assert!((3..=5).contains(&n));
            seen[n] = true;
        }
        assert!(seen[3] && seen[4] && seen[5]);
        assert_eq!(carrion_drop_count(&mut rng, 4, 4), 4);
    }

    #[test]
    fn test_scatter_position() {
        let arena = Arena::new(100.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let center = Vec2::new(2.0, 98.0);
        for _ in 0..50 {
            let p = scatter_position(&mut rng, center, 30.0, &arena);
            assert!(p.distance(center) <= 30.0 + 1e-3);
            assert!(p.x >= 0.0 && p.x <= 100.0 && p.y >= 0.0 && p.y <= 100.0);
        }
        assert_eq!(scatter_position(&mut rng, center, 0.0, &arena), center);
    }
}
