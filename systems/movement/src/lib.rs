#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement integration and steering rules.
//!
//! [`Movement::handle`] advances every moving entity by one frame: enemies and
//! the boss pursue the player, orbiting bullets are re-steered around the
//! player, and bullets and the rocket integrate their velocity. Bullets that
//! leave firing range or the world are retired here. The steering functions
//! are public because homing targets are only known once the combat scan has
//! run, so the combat system applies them.

use glam::Vec2;
use horde_core::{
    geometry::{clamp_axes, inside_world, unit_toward},
    BulletKind, SessionState,
};
use horde_world::{entities::Bullet, pool::Handle, World};

/// Distance from the player beyond which bullets are retired.
pub const BULLET_RANGE: f32 = 1_000.0;
/// Preferred distance between an orbiting bullet and the player.
pub const ORBIT_RADIUS: f32 = 128.0;
/// Per-axis speed cap for orbiting bullets and the rocket.
pub const MAX_AXIS_SPEED: f32 = 10.0;

const HOMING_PULL: f32 = 3.0;
const HOMING_ACCELERATION: f32 = 0.1;
const ROCKET_BASE_PULL: f32 = 5.0;

/// Enemy pursuit speed at `level`.
#[must_use]
pub fn enemy_speed(level: u32) -> f32 {
    (level / 3).max(1) as f32
}

/// Boss pursuit speed at `level`.
#[must_use]
pub fn boss_speed(level: u32) -> f32 {
    (level as f32 + 1.0) / 3.0
}

/// Returns the velocity of a bullet after one frame of steering.
///
/// `target` is the homing target chosen by the combat scan; kinds that do not
/// home ignore it, and homing kinds keep their velocity when it is absent.
#[must_use]
pub fn steer_bullet(
    kind: BulletKind,
    velocity: Vec2,
    position: Vec2,
    target: Option<Vec2>,
    player: Vec2,
    level: u32,
) -> Vec2 {
    match kind {
        BulletKind::Straight => velocity,
        BulletKind::HomingAccelerate => match target {
            Some(target) => {
                let (unit, _) = unit_toward(position, target);
                velocity + unit * (HOMING_PULL * HOMING_ACCELERATION)
            }
            None => velocity,
        },
        BulletKind::HomingAverage => match target {
            Some(target) => {
                let (unit, _) = unit_toward(position, target);
                let pull = HOMING_PULL + level as f32 / 4.0;
                (velocity + unit * pull) * 0.5
            }
            None => velocity,
        },
        BulletKind::Orbit => steer_orbit(velocity, position, player),
    }
}

/// Circles the player, pulling in when outside the orbit and pushing out when inside.
fn steer_orbit(velocity: Vec2, position: Vec2, player: Vec2) -> Vec2 {
    let (outward, distance) = unit_toward(player, position);
    if outward == Vec2::ZERO {
        return clamp_axes(velocity, MAX_AXIS_SPEED);
    }
    let tangent = outward.perp() * MAX_AXIS_SPEED;
    let correction = (ORBIT_RADIUS - distance).clamp(-MAX_AXIS_SPEED, MAX_AXIS_SPEED);
    clamp_axes(tangent + outward * correction, MAX_AXIS_SPEED)
}

/// Returns the rocket velocity after steering toward `target` for one frame.
#[must_use]
pub fn steer_rocket(velocity: Vec2, position: Vec2, target: Vec2, level: u32) -> Vec2 {
    let (unit, _) = unit_toward(position, target);
    let pull = ROCKET_BASE_PULL + level as f32;
    clamp_axes((velocity + unit * pull) * 0.5, MAX_AXIS_SPEED)
}

/// Reports whether a bullet at `position` is still in play.
#[must_use]
pub fn bullet_in_range(position: Vec2, player: Vec2, world_half_extent: f32) -> bool {
    position.distance(player) <= BULLET_RANGE && inside_world(position, world_half_extent)
}

/// System that integrates one frame of motion.
#[derive(Debug, Default)]
pub struct Movement {
    retired: Vec<Handle<Bullet>>,
}

impl Movement {
    /// Advances every moving entity by one frame while the session runs.
    pub fn handle(&mut self, world: &mut World) {
        if world.session() != SessionState::Running {
            return;
        }
        let parts = world.parts_mut();
        let player = parts.player.position;
        let level = parts.player.level;

        let speed = enemy_speed(level);
        for (_, enemy) in parts.enemies.iter_mut() {
            let (unit, _) = unit_toward(enemy.position, player);
            enemy.position += unit * speed;
        }

        if let Some(boss) = parts.boss.as_mut() {
            let (unit, _) = unit_toward(boss.position, player);
            boss.position += unit * boss_speed(level);
        }

        self.retired.clear();
        for (handle, bullet) in parts.bullets.iter_mut() {
            if bullet.kind == BulletKind::Orbit {
                bullet.velocity = steer_orbit(bullet.velocity, bullet.position, player);
            }
            bullet.position += bullet.velocity;
            if !bullet_in_range(bullet.position, player, parts.world_half_extent) {
                self.retired.push(handle);
            }
        }
        for handle in self.retired.drain(..) {
            let _ = parts.bullets.remove(handle);
        }

        if let Some(rocket) = parts.rocket.as_mut() {
            rocket.position += rocket.velocity;
            if !inside_world(rocket.position, parts.world_half_extent) {
                *parts.rocket = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_speed_uses_integer_thirds() {
        assert_eq!(enemy_speed(0), 1.0);
        assert_eq!(enemy_speed(5), 1.0);
        assert_eq!(enemy_speed(6), 2.0);
        assert_eq!(enemy_speed(10), 3.0);
    }

    #[test]
    fn straight_bullets_ignore_targets() {
        let velocity = Vec2::new(3.0, -4.0);
        let steered = steer_bullet(
            BulletKind::Straight,
            velocity,
            Vec2::ZERO,
            Some(Vec2::new(100.0, 0.0)),
            Vec2::ZERO,
            4,
        );
        assert_eq!(steered, velocity);
    }

    #[test]
    fn homing_accelerate_adds_a_tenth_of_the_pull() {
        let steered = steer_bullet(
            BulletKind::HomingAccelerate,
            Vec2::new(1.0, 1.0),
            Vec2::ZERO,
            Some(Vec2::new(0.0, 50.0)),
            Vec2::ZERO,
            0,
        );
        assert!((steered - Vec2::new(1.0, 1.3)).length() < 1.0e-5);
    }

    #[test]
    fn homing_average_halves_velocity_plus_pull() {
        let steered = steer_bullet(
            BulletKind::HomingAverage,
            Vec2::new(-5.0, 0.0),
            Vec2::ZERO,
            Some(Vec2::new(10.0, 0.0)),
            Vec2::ZERO,
            4,
        );
        assert!((steered - Vec2::new(-0.5, 0.0)).length() < 1.0e-5);
    }

    #[test]
    fn coincident_target_contributes_nothing() {
        let velocity = Vec2::new(2.0, 2.0);
        for kind in [BulletKind::HomingAccelerate, BulletKind::HomingAverage] {
            let steered = steer_bullet(kind, velocity, Vec2::ONE, Some(Vec2::ONE), Vec2::ZERO, 0);
            assert!(steered.is_finite());
        }
        let rocket = steer_rocket(velocity, Vec2::ONE, Vec2::ONE, 3);
        assert_eq!(rocket, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn rocket_velocity_is_clamped() {
        let steered = steer_rocket(Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::new(100.0, 0.0), 40);
        assert_eq!(steered, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn orbit_settles_near_the_orbit_radius() {
        let player = Vec2::new(40.0, -20.0);
        let mut position = player + Vec2::new(300.0, 0.0);
        let mut velocity = Vec2::new(-7.0, 9.0);
        for step in 0..400 {
            velocity = steer_bullet(BulletKind::Orbit, velocity, position, None, player, 0);
            assert!(velocity.x.abs() <= MAX_AXIS_SPEED && velocity.y.abs() <= MAX_AXIS_SPEED);
            position += velocity;
            if step > 100 {
                let radius = position.distance(player);
                assert!(
                    (110.0..150.0).contains(&radius),
                    "radius {radius} at step {step}"
                );
            }
        }
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let player = Vec2::ZERO;
        assert!(bullet_in_range(Vec2::new(1_000.0, 0.0), player, 10_000.0));
        assert!(!bullet_in_range(Vec2::new(1_000.01, 0.0), player, 10_000.0));
        assert!(!bullet_in_range(Vec2::new(10_000.5, 0.0), Vec2::new(10_000.0, 0.0), 10_000.0));
    }
}
