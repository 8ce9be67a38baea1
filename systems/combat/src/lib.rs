#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision and combat resolution for one frame.
//!
//! Pairs are resolved in a fixed order: enemy contact with the player,
//! experience pickup, item pickup, bullets against the boss, bullets against
//! enemies, the rocket against the boss, the rocket against enemies and
//! finally the boss against the player. Every phase sees the results of the
//! phases before it.

mod splash;

use glam::Vec2;
use horde_core::{
    geometry::{circles_overlap, inside_viewport, point_in_circle},
    Event, KillCause, SessionState, BOSS_RADIUS, ENEMY_RADIUS, EXPERIENCE_RADIUS, ITEM_RADIUS,
    PLAYER_RADIUS,
};
use horde_system_movement::{steer_bullet, steer_rocket};
use horde_world::{
    entities::{Boss, Bullet, Enemy, Experience, Item, RocketTarget},
    experience::total_value,
    pool::{Handle, Pool},
    World, WorldParts,
};

/// Health drained from the player per touching enemy per frame.
pub const CONTACT_DAMAGE: i32 = 1;
/// Distance a surviving enemy is knocked back when hit.
pub const RECOIL_DISTANCE: f32 = 4.0;
/// Damage the rocket deals when it strikes the boss.
pub const ROCKET_BOSS_DAMAGE: i32 = 500;

/// Outcome of testing one bullet against the enemy pool.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Engagement {
    Hit(Handle<Enemy>),
    Chase(Vec2),
    Idle,
}

/// What the rocket does this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
enum RocketAction {
    Detonate(Vec2),
    Steer {
        aim: Vec2,
        target: RocketTarget,
    },
    Drift,
}

/// Combat system that resolves collisions, damage, deaths and pickups.
#[derive(Debug, Default)]
pub struct Combat {
    pickups: Vec<Handle<Experience>>,
    items: Vec<Handle<Item>>,
    struck: Vec<Handle<Bullet>>,
    spent: Vec<Handle<Bullet>>,
    doomed: Vec<Handle<Enemy>>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every collision pair for one frame while the session runs.
    pub fn handle(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if world.session() != SessionState::Running {
            return;
        }
        let mut parts = world.parts_mut();
        resolve_contact(&mut parts, out_events);
        self.collect_experience(&mut parts, out_events);
        self.collect_items(&mut parts, out_events);
        self.resolve_bullets_against_boss(&mut parts, out_events);
        self.resolve_bullets_against_enemies(&mut parts, out_events);
        self.resolve_rocket_against_boss(&mut parts, out_events);
        self.resolve_rocket_against_enemies(&mut parts, out_events);
        resolve_boss_contact(&mut parts, out_events);
    }

    fn collect_experience(&mut self, parts: &mut WorldParts<'_>, out_events: &mut Vec<Event>) {
        let player = parts.player.position;
        let reach = parts.player.pickup_reach();
        self.pickups.clear();
        self.pickups.extend(
            parts
                .experience
                .iter()
                .filter(|(_, pickup)| {
                    circles_overlap(pickup.position, EXPERIENCE_RADIUS, player, reach)
                })
                .map(|(handle, _)| handle),
        );
        for handle in self.pickups.drain(..) {
            if let Some(pickup) = parts.experience.remove(handle) {
                parts.player.experience = parts.player.experience.saturating_add(pickup.value);
                out_events.push(Event::ExperienceCollected {
                    value: pickup.value,
                });
            }
        }
    }

    fn collect_items(&mut self, parts: &mut WorldParts<'_>, out_events: &mut Vec<Event>) {
        let player = parts.player.position;
        self.items.clear();
        self.items.extend(
            parts
                .items
                .iter()
                .filter(|(_, item)| circles_overlap(item.position, ITEM_RADIUS, player, PLAYER_RADIUS))
                .map(|(handle, _)| handle),
        );
        for handle in self.items.drain(..) {
            let Some(item) = parts.items.remove(handle) else {
                continue;
            };
            let swept = total_value(parts.experience);
            parts.experience.clear();
            parts.player.experience = parts.player.experience.saturating_add(swept);
            out_events.push(Event::ItemCollected {
                kind: item.kind,
                swept,
            });
        }
    }

    fn resolve_bullets_against_boss(
        &mut self,
        parts: &mut WorldParts<'_>,
        out_events: &mut Vec<Event>,
    ) {
        self.struck.clear();
        let defeated = {
            let Some(boss) = parts.boss.as_mut() else {
                return;
            };
            for (handle, bullet) in parts.bullets.iter_mut() {
                if boss.hp <= 0 {
                    break;
                }
                if !point_in_circle(bullet.position, boss.position, BOSS_RADIUS) {
                    continue;
                }
                boss.hp -= bullet.damage;
                bullet.lifetime = bullet.lifetime.saturating_sub(1);
                self.struck.push(handle);
            }
            if self.struck.is_empty() {
                return;
            }
            if boss.hp > 0 {
                out_events.push(Event::BossDamaged { hp: boss.hp });
            }
            boss.hp <= 0
        };

        for handle in &self.struck {
            if parts
                .bullets
                .get(*handle)
                .is_some_and(|bullet| bullet.lifetime == 0)
            {
                let _ = parts.bullets.remove(*handle);
            }
        }

        if defeated {
            self.defeat_boss(parts, out_events);
        }
    }

    fn resolve_bullets_against_enemies(
        &mut self,
        parts: &mut WorldParts<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let player = parts.player.position;
        let level = parts.player.level;
        let viewport = parts.viewport;
        self.spent.clear();

        // Both passes walk the bullet pool in slot order, so `struck` is sorted.
        for (handle, bullet) in parts.bullets.iter_mut() {
            if self
                .struck
                .binary_search_by_key(&handle.index(), |struck| struck.index())
                .is_ok()
            {
                continue;
            }
            match engage(bullet, parts.enemies, player, viewport) {
                Engagement::Hit(enemy) => {
                    bullet.lifetime = bullet.lifetime.saturating_sub(1);
                    if bullet.lifetime == 0 {
                        self.spent.push(handle);
                    }
                    strike_enemy(
                        parts.enemies,
                        parts.experience,
                        enemy,
                        bullet.damage,
                        bullet.velocity,
                        out_events,
                    );
                }
                Engagement::Chase(target) => {
                    if bullet.kind.homes_on_enemies() {
                        bullet.velocity = steer_bullet(
                            bullet.kind,
                            bullet.velocity,
                            bullet.position,
                            Some(target),
                            player,
                            level,
                        );
                    }
                }
                Engagement::Idle => {}
            }
        }

        for handle in self.spent.drain(..) {
            let _ = parts.bullets.remove(handle);
        }
    }

    fn resolve_rocket_against_boss(
        &mut self,
        parts: &mut WorldParts<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let (Some(rocket), Some(boss)) = (parts.rocket.as_ref(), parts.boss.as_mut()) else {
            return;
        };
        if !point_in_circle(rocket.position, boss.position, BOSS_RADIUS) {
            return;
        }
        let blast = rocket.position;
        boss.hp -= ROCKET_BOSS_DAMAGE;
        let remaining = boss.hp;

        *parts.rocket = None;
        splash::detonate(
            parts.enemies,
            parts.experience,
            parts.explosion,
            blast,
            &mut self.doomed,
            out_events,
        );
        if remaining > 0 {
            out_events.push(Event::BossDamaged { hp: remaining });
        } else {
            self.defeat_boss(parts, out_events);
        }
    }

    fn resolve_rocket_against_enemies(
        &mut self,
        parts: &mut WorldParts<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(rocket) = parts.rocket.as_mut() else {
            return;
        };

        let locked = match rocket.target {
            Some(RocketTarget::Enemy(handle)) => parts
                .enemies
                .get(handle)
                .map(|enemy| (RocketTarget::Enemy(handle), enemy.position)),
            Some(RocketTarget::Boss) => parts
                .boss
                .as_ref()
                .map(|boss| (RocketTarget::Boss, boss.position)),
            None => None,
        };

        let action = match locked {
            Some((RocketTarget::Enemy(_), aim))
                if point_in_circle(rocket.position, aim, ENEMY_RADIUS) =>
            {
                RocketAction::Detonate(rocket.position)
            }
            Some((target, aim)) => RocketAction::Steer { aim, target },
            None => acquire_rocket_target(rocket.position, parts.enemies, parts.boss.as_ref()),
        };

        match action {
            RocketAction::Detonate(blast) => {
                *parts.rocket = None;
                splash::detonate(
                    parts.enemies,
                    parts.experience,
                    parts.explosion,
                    blast,
                    &mut self.doomed,
                    out_events,
                );
            }
            RocketAction::Steer { aim, target } => {
                rocket.velocity =
                    steer_rocket(rocket.velocity, rocket.position, aim, parts.player.level);
                rocket.target = Some(target);
            }
            RocketAction::Drift => rocket.target = None,
        }
    }

    fn defeat_boss(&mut self, parts: &mut WorldParts<'_>, out_events: &mut Vec<Event>) {
        let Some(boss) = parts.boss.take() else {
            return;
        };
        tracing::info!(x = boss.position.x, y = boss.position.y, "boss defeated");
        out_events.push(Event::BossDefeated {
            position: boss.position,
        });
        splash::detonate(
            parts.enemies,
            parts.experience,
            parts.explosion,
            boss.position,
            &mut self.doomed,
            out_events,
        );
        splash::drop_loot(
            parts.experience,
            boss.position,
            boss.experience_value(),
            out_events,
        );
    }
}

fn resolve_contact(parts: &mut WorldParts<'_>, out_events: &mut Vec<Event>) {
    let player = parts.player.position;
    let touching = parts
        .enemies
        .iter()
        .filter(|(_, enemy)| circles_overlap(enemy.position, ENEMY_RADIUS, player, PLAYER_RADIUS))
        .count();
    if touching == 0 {
        return;
    }
    let amount = i32::try_from(touching)
        .unwrap_or(i32::MAX)
        .saturating_mul(CONTACT_DAMAGE);
    parts.player.hp = parts.player.hp.saturating_sub(amount);
    out_events.push(Event::PlayerDamaged {
        amount,
        hp: parts.player.hp,
    });
}

fn resolve_boss_contact(parts: &mut WorldParts<'_>, out_events: &mut Vec<Event>) {
    let Some(boss) = parts.boss.as_ref() else {
        return;
    };
    if boss.position.distance(parts.player.position) >= BOSS_RADIUS {
        return;
    }
    parts.player.hp = 0;
    out_events.push(Event::BossReachedPlayer {
        position: boss.position,
    });
}

/// Tests a bullet against the enemy pool, preferring its close-encounter cache.
///
/// A cached live enemy that the bullet touches is hit; otherwise the nearest
/// cached live enemy becomes the homing target. Only when the cache yields
/// neither does the bullet scan every enemy in slot order, recording each new
/// nearest enemy inside the viewport when the bullet homes.
fn engage(bullet: &mut Bullet, enemies: &Pool<Enemy>, player: Vec2, viewport: Vec2) -> Engagement {
    let mut nearest: Option<(f32, Vec2)> = None;
    for cached in bullet.close_encounters.iter() {
        let Some(enemy) = enemies.get(cached) else {
            continue;
        };
        if point_in_circle(bullet.position, enemy.position, ENEMY_RADIUS) {
            return Engagement::Hit(cached);
        }
        let distance = bullet.position.distance(enemy.position);
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, enemy.position));
        }
    }
    if let Some((_, target)) = nearest {
        return Engagement::Chase(target);
    }

    let homing = bullet.kind.homes_on_enemies();
    for (handle, enemy) in enemies.iter() {
        if point_in_circle(bullet.position, enemy.position, ENEMY_RADIUS) {
            return Engagement::Hit(handle);
        }
        if !homing {
            continue;
        }
        let distance = bullet.position.distance(enemy.position);
        let closer = nearest.map_or(true, |(best, _)| distance < best);
        if closer && inside_viewport(player, viewport, enemy.position) {
            nearest = Some((distance, enemy.position));
            bullet.close_encounters.record(handle);
        }
    }
    nearest.map_or(Engagement::Idle, |(_, target)| Engagement::Chase(target))
}

fn strike_enemy(
    enemies: &mut Pool<Enemy>,
    experience: &mut Pool<Experience>,
    handle: Handle<Enemy>,
    damage: i32,
    bullet_velocity: Vec2,
    out_events: &mut Vec<Event>,
) {
    let Some(enemy) = enemies.get_mut(handle) else {
        return;
    };
    enemy.hp -= damage;
    if enemy.hp > 0 {
        enemy.position -= bullet_velocity.normalize_or_zero() * RECOIL_DISTANCE;
        return;
    }
    splash::kill_enemy(enemies, experience, handle, KillCause::Bullet, out_events);
}

/// Picks the nearest live enemy, or the boss when it is nearer, detonating on contact.
fn acquire_rocket_target(
    position: Vec2,
    enemies: &Pool<Enemy>,
    boss: Option<&Boss>,
) -> RocketAction {
    let mut best: Option<(f32, Vec2, RocketTarget)> = None;
    for (handle, enemy) in enemies.iter() {
        if point_in_circle(position, enemy.position, ENEMY_RADIUS) {
            return RocketAction::Detonate(position);
        }
        let distance = position.distance(enemy.position);
        if best.map_or(true, |(nearest, _, _)| distance < nearest) {
            best = Some((distance, enemy.position, RocketTarget::Enemy(handle)));
        }
    }
    if let Some(boss) = boss {
        let distance = position.distance(boss.position);
        if best.map_or(true, |(nearest, _, _)| distance < nearest) {
            best = Some((distance, boss.position, RocketTarget::Boss));
        }
    }
    best.map_or(RocketAction::Drift, |(_, aim, target)| RocketAction::Steer {
        aim,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::BulletKind;

    fn enemy_pool(positions: &[Vec2]) -> (Pool<Enemy>, Vec<Handle<Enemy>>) {
        let mut pool = Pool::with_capacity(16);
        let handles = positions
            .iter()
            .map(|position| pool.insert(Enemy::new(*position, 30)).expect("slot"))
            .collect();
        (pool, handles)
    }

    #[test]
    fn first_touching_enemy_in_slot_order_is_hit() {
        let (enemies, handles) = enemy_pool(&[
            Vec2::new(400.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(-5.0, 0.0),
        ]);
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, BulletKind::Straight);
        let engagement = engage(&mut bullet, &enemies, Vec2::ZERO, Vec2::splat(1_000.0));
        assert_eq!(engagement, Engagement::Hit(handles[1]));
    }

    #[test]
    fn full_scan_records_each_new_nearest_enemy() {
        let (enemies, handles) = enemy_pool(&[
            Vec2::new(300.0, 0.0),
            Vec2::new(200.0, 0.0),
            Vec2::new(250.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 0.0),
        ]);
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, BulletKind::HomingAverage);
        let engagement = engage(&mut bullet, &enemies, Vec2::ZERO, Vec2::splat(1_000.0));

        assert_eq!(engagement, Engagement::Chase(Vec2::new(100.0, 0.0)));
        let cached: Vec<_> = bullet.close_encounters.iter().collect();
        assert_eq!(cached, vec![handles[0], handles[1], handles[3]]);
    }

    #[test]
    fn enemies_outside_the_viewport_are_not_chased() {
        let (enemies, _) = enemy_pool(&[Vec2::new(700.0, 0.0)]);
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, BulletKind::HomingAccelerate);
        let engagement = engage(&mut bullet, &enemies, Vec2::ZERO, Vec2::splat(1_000.0));
        assert_eq!(engagement, Engagement::Idle);
        assert!(bullet.close_encounters.is_empty());
    }

    #[test]
    fn cached_enemy_short_circuits_the_scan() {
        let (enemies, handles) = enemy_pool(&[Vec2::new(5.0, 0.0), Vec2::new(90.0, 0.0)]);
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, BulletKind::HomingAccelerate);
        bullet.close_encounters.record(handles[1]);

        let engagement = engage(&mut bullet, &enemies, Vec2::ZERO, Vec2::splat(1_000.0));
        assert_eq!(engagement, Engagement::Chase(Vec2::new(90.0, 0.0)));
    }

    #[test]
    fn stale_cache_entries_fall_back_to_the_scan() {
        let mut enemies = Pool::with_capacity(2);
        let handles: Vec<_> = [Vec2::new(60.0, 0.0), Vec2::new(3.0, 0.0)]
            .into_iter()
            .map(|position| enemies.insert(Enemy::new(position, 30)).expect("slot"))
            .collect();
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, BulletKind::HomingAverage);
        bullet.close_encounters.record(handles[0]);
        let _ = enemies.remove(handles[0]);
        let reused = enemies
            .insert(Enemy::new(Vec2::new(50.0, 0.0), 30))
            .expect("slot");
        assert_eq!(reused.index(), handles[0].index());

        let engagement = engage(&mut bullet, &enemies, Vec2::ZERO, Vec2::splat(1_000.0));
        assert_eq!(engagement, Engagement::Hit(handles[1]));
    }

    #[test]
    fn rocket_prefers_the_nearer_of_enemy_and_boss() {
        let (enemies, handles) = enemy_pool(&[Vec2::new(400.0, 0.0), Vec2::new(0.0, 300.0)]);
        let action = acquire_rocket_target(Vec2::ZERO, &enemies, None);
        assert_eq!(
            action,
            RocketAction::Steer {
                aim: Vec2::new(0.0, 300.0),
                target: RocketTarget::Enemy(handles[1]),
            }
        );

        let boss = Boss {
            position: Vec2::new(-200.0, 0.0),
            hp: 10,
            max_hp: 10,
        };
        let action = acquire_rocket_target(Vec2::ZERO, &enemies, Some(&boss));
        assert_eq!(
            action,
            RocketAction::Steer {
                aim: boss.position,
                target: RocketTarget::Boss,
            }
        );

        let empty = Pool::with_capacity(4);
        assert_eq!(
            acquire_rocket_target(Vec2::ZERO, &empty, None),
            RocketAction::Drift
        );
    }
}
