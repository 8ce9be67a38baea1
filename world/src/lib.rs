#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Horde.
//!
//! The [`World`] owns the player, the fixed-capacity entity pools and the
//! rocket and boss singletons. Discrete mutations arrive as
//! [`Command`] values through [`apply`]; the per-frame systems borrow the
//! world mutably through [`World::parts_mut`] to integrate motion and resolve
//! collisions. Renderers and the spawner only read it through [`query`].

pub mod entities;
pub mod experience;
pub mod pool;

use glam::Vec2;
use horde_core::{
    geometry, Command, DefeatCause, Event, PoolKind, SessionState, SimulationConfig,
};

use entities::{Boss, Bullet, Enemy, Experience, Explosion, Item, Player, Rocket};
use pool::Pool;

/// Represents the authoritative Horde world state.
#[derive(Clone, Debug)]
pub struct World {
    config: SimulationConfig,
    session: SessionState,
    frame: u64,
    viewport: Vec2,
    player: Player,
    enemies: Pool<Enemy>,
    bullets: Pool<Bullet>,
    experience: Pool<Experience>,
    items: Pool<Item>,
    rocket: Option<Rocket>,
    boss: Option<Boss>,
    explosion: Option<Explosion>,
}

/// Disjoint mutable borrows of the world handed to per-frame systems.
#[derive(Debug)]
pub struct WorldParts<'a> {
    /// The player.
    pub player: &'a mut Player,
    /// Enemy pool.
    pub enemies: &'a mut Pool<Enemy>,
    /// Bullet pool.
    pub bullets: &'a mut Pool<Bullet>,
    /// Experience pool.
    pub experience: &'a mut Pool<Experience>,
    /// Item pool.
    pub items: &'a mut Pool<Item>,
    /// Rocket singleton.
    pub rocket: &'a mut Option<Rocket>,
    /// Boss singleton.
    pub boss: &'a mut Option<Boss>,
    /// Explosion marker.
    pub explosion: &'a mut Option<Explosion>,
    /// Player-centred viewport.
    pub viewport: Vec2,
    /// Half side length of the world square.
    pub world_half_extent: f32,
}

impl World {
    /// Creates a paused world with empty pools sized by `config`.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let capacity = config.pool_capacity;
        Self {
            session: SessionState::Paused,
            frame: 0,
            viewport: config.viewport(),
            player: Player::new(Vec2::ZERO),
            enemies: Pool::with_capacity(capacity),
            bullets: Pool::with_capacity(capacity),
            experience: Pool::with_capacity(capacity),
            items: Pool::with_capacity(capacity),
            rocket: None,
            boss: None,
            explosion: None,
            config,
        }
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> SessionState {
        self.session
    }

    /// Completed running frames since the session started.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Player-centred viewport.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Enemy pool.
    #[must_use]
    pub fn enemies(&self) -> &Pool<Enemy> {
        &self.enemies
    }

    /// Bullet pool.
    #[must_use]
    pub fn bullets(&self) -> &Pool<Bullet> {
        &self.bullets
    }

    /// Experience pool.
    #[must_use]
    pub fn experience(&self) -> &Pool<Experience> {
        &self.experience
    }

    /// Item pool.
    #[must_use]
    pub fn items(&self) -> &Pool<Item> {
        &self.items
    }

    /// The rocket, if in flight.
    #[must_use]
    pub fn rocket(&self) -> Option<&Rocket> {
        self.rocket.as_ref()
    }

    /// The boss, if present.
    #[must_use]
    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    /// The explosion marker, if visible.
    #[must_use]
    pub fn explosion(&self) -> Option<&Explosion> {
        self.explosion.as_ref()
    }

    /// Splits the world into independently borrowable parts.
    pub fn parts_mut(&mut self) -> WorldParts<'_> {
        WorldParts {
            player: &mut self.player,
            enemies: &mut self.enemies,
            bullets: &mut self.bullets,
            experience: &mut self.experience,
            items: &mut self.items,
            rocket: &mut self.rocket,
            boss: &mut self.boss,
            explosion: &mut self.explosion,
            viewport: self.viewport,
            world_half_extent: self.config.world_half_extent,
        }
    }

    fn reset(&mut self) {
        self.enemies.clear();
        self.bullets.clear();
        self.experience.clear();
        self.items.clear();
        self.rocket = None;
        self.boss = None;
        self.explosion = None;
        self.player = Player::new(Vec2::ZERO);
        self.frame = 0;
    }

    fn transition(&mut self, to: SessionState, out_events: &mut Vec<Event>) {
        let from = self.session;
        if from == to {
            return;
        }
        self.session = to;
        out_events.push(Event::SessionChanged { from, to });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            if world.session != SessionState::Running {
                return;
            }
            world.frame = world.frame.saturating_add(1);
            if let Some(explosion) = world.explosion.as_mut() {
                explosion.frames_remaining = explosion.frames_remaining.saturating_sub(1);
                if explosion.frames_remaining == 0 {
                    world.explosion = None;
                }
            }
            out_events.push(Event::TimeAdvanced { frame: world.frame });
        }
        Command::SetViewport { size } => {
            if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
                world.viewport = size;
            }
        }
        Command::MovePlayer { input } => {
            if world.session != SessionState::Running {
                return;
            }
            let player = &mut world.player;
            let moved = player.position + input.heading() * player.speed();
            player.position = geometry::clamp_to_world(moved, world.config.world_half_extent);
        }
        Command::TogglePause => match world.session {
            SessionState::Paused => world.transition(SessionState::Running, out_events),
            SessionState::Running => world.transition(SessionState::Paused, out_events),
            SessionState::GameOver => {}
        },
        Command::Restart => {
            if world.session != SessionState::GameOver {
                return;
            }
            world.reset();
            tracing::info!("session restarted");
            out_events.push(Event::SessionRestarted);
            world.transition(SessionState::Running, out_events);
        }
        Command::EndSession { cause } => {
            if world.session != SessionState::Running {
                return;
            }
            tracing::info!(
                ?cause,
                frame = world.frame,
                level = world.player.level,
                experience = world.player.experience,
                "player defeated"
            );
            out_events.push(Event::PlayerDefeated { cause });
            world.transition(SessionState::GameOver, out_events);
        }
        Command::SpawnEnemy { position, hp } => {
            match world.enemies.insert(Enemy::new(position, hp)) {
                Ok(handle) => out_events.push(Event::EnemySpawned {
                    slot: handle.index() as u32,
                    position,
                }),
                Err(_) => skip_spawn(PoolKind::Enemy, out_events),
            }
        }
        Command::SpawnBullet {
            position,
            velocity,
            kind,
        } => match world.bullets.insert(Bullet::new(position, velocity, kind)) {
            Ok(handle) => out_events.push(Event::BulletSpawned {
                slot: handle.index() as u32,
                kind,
            }),
            Err(_) => skip_spawn(PoolKind::Bullet, out_events),
        },
        Command::SpawnRocket { position, velocity } => {
            if world.rocket.is_some() {
                return;
            }
            world.rocket = Some(Rocket {
                position,
                velocity,
                target: None,
            });
            out_events.push(Event::RocketLaunched { position });
        }
        Command::SpawnItem { position, kind } => {
            match world.items.insert(entities::Item { position, kind }) {
                Ok(handle) => out_events.push(Event::ItemSpawned {
                    slot: handle.index() as u32,
                    position,
                }),
                Err(_) => skip_spawn(PoolKind::Item, out_events),
            }
        }
        Command::SpawnBoss { position } => {
            if world.boss.is_some() {
                return;
            }
            let hp = world.config.boss_max_hp;
            world.boss = Some(Boss {
                position,
                hp,
                max_hp: hp,
            });
            tracing::info!(x = position.x, y = position.y, hp, "boss spawned");
            out_events.push(Event::BossSpawned { position, hp });
        }
    }
}

fn skip_spawn(pool: PoolKind, out_events: &mut Vec<Event>) {
    tracing::debug!(?pool, "pool full, spawn skipped");
    out_events.push(Event::SpawnSkipped { pool });
}

/// Arms the explosion marker at `position`, replacing any visible one.
pub fn arm_explosion(explosion: &mut Option<Explosion>, position: Vec2) {
    *explosion = Some(Explosion {
        position,
        frames_remaining: horde_core::EXPLOSION_FRAMES,
    });
}

/// Ends the session for the provided reason.
pub fn defeat(world: &mut World, cause: DefeatCause, out_events: &mut Vec<Event>) {
    apply(world, Command::EndSession { cause }, out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use horde_core::{
        BossSnapshot, BulletSnapshot, EnemySnapshot, ExperienceSnapshot, ExplosionSnapshot,
        ItemSnapshot, PlayerSnapshot, RocketSnapshot, SpawnContext, WorldSnapshot, SPLASH_RADIUS,
    };

    use super::{entities::RocketTarget, World};

    /// Captures the values the spawner reads each frame.
    #[must_use]
    pub fn spawn_context(world: &World) -> SpawnContext {
        SpawnContext {
            session: world.session,
            frame: world.frame,
            level: world.player.level,
            player_position: world.player.position,
            viewport: world.viewport,
            world_half_extent: world.config.world_half_extent,
            rocket_alive: world.rocket.is_some(),
            boss_alive: world.boss.is_some(),
        }
    }

    /// Captures a read-only picture of the whole world for rendering.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        let player = &world.player;
        WorldSnapshot {
            session: world.session,
            frame: world.frame,
            viewport: world.viewport,
            player: PlayerSnapshot {
                position: player.position,
                hp: player.hp,
                max_hp: player.max_hp(),
                level: player.level,
                experience: player.experience,
            },
            enemies: world
                .enemies
                .iter()
                .map(|(handle, enemy)| EnemySnapshot {
                    slot: handle.index() as u32,
                    position: enemy.position,
                    hp: enemy.hp,
                    init_hp: enemy.init_hp,
                })
                .collect(),
            bullets: world
                .bullets
                .iter()
                .map(|(handle, bullet)| BulletSnapshot {
                    slot: handle.index() as u32,
                    position: bullet.position,
                    velocity: bullet.velocity,
                    kind: bullet.kind,
                })
                .collect(),
            experience: world
                .experience
                .iter()
                .map(|(_, drop)| ExperienceSnapshot {
                    position: drop.position,
                    value: drop.value,
                    kind: drop.kind,
                })
                .collect(),
            items: world
                .items
                .iter()
                .map(|(_, item)| ItemSnapshot {
                    position: item.position,
                    kind: item.kind,
                })
                .collect(),
            rocket: world.rocket.as_ref().map(|rocket| RocketSnapshot {
                position: rocket.position,
                velocity: rocket.velocity,
                target: rocket.target.and_then(|target| match target {
                    RocketTarget::Enemy(handle) => {
                        world.enemies.get(handle).map(|enemy| enemy.position)
                    }
                    RocketTarget::Boss => world.boss.as_ref().map(|boss| boss.position),
                }),
            }),
            boss: world.boss.as_ref().map(|boss| BossSnapshot {
                position: boss.position,
                hp: boss.hp,
                max_hp: boss.max_hp,
            }),
            explosion: world.explosion.as_ref().map(|explosion| ExplosionSnapshot {
                position: explosion.position,
                radius: SPLASH_RADIUS,
                frames_remaining: explosion.frames_remaining,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::{BulletKind, ItemKind, MoveInput};

    fn running_world(config: SimulationConfig) -> World {
        let mut world = World::new(config);
        let mut events = Vec::new();
        apply(&mut world, Command::TogglePause, &mut events);
        world
    }

    #[test]
    fn new_world_starts_paused_and_empty() {
        let world = World::new(SimulationConfig::default());
        assert_eq!(world.session(), SessionState::Paused);
        assert_eq!(world.frame(), 0);
        assert_eq!(world.enemies().capacity(), 4096);
        assert!(world.enemies().is_empty());
        assert_eq!(world.player().hp, 1_000);
    }

    #[test]
    fn tick_only_advances_running_sessions() {
        let mut world = World::new(SimulationConfig::default());
        let mut events = Vec::new();

        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(world.frame(), 0);
        assert!(events.is_empty());

        apply(&mut world, Command::TogglePause, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(world.frame(), 1);
        assert_eq!(
            events,
            vec![
                Event::SessionChanged {
                    from: SessionState::Paused,
                    to: SessionState::Running,
                },
                Event::TimeAdvanced { frame: 1 },
            ]
        );
    }

    #[test]
    fn full_enemy_pool_skips_spawn() {
        let config = SimulationConfig {
            pool_capacity: 1,
            ..SimulationConfig::default()
        };
        let mut world = World::new(config);
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    position: Vec2::ONE,
                    hp: 20,
                },
                &mut events,
            );
        }
        assert_eq!(world.enemies().len(), 1);
        assert_eq!(
            events.last(),
            Some(&Event::SpawnSkipped {
                pool: PoolKind::Enemy
            })
        );
    }

    #[test]
    fn singletons_ignore_duplicate_spawns() {
        let mut world = World::new(SimulationConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBoss {
                position: Vec2::new(600.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnBoss {
                position: Vec2::new(-600.0, 0.0),
            },
            &mut events,
        );
        let boss = world.boss().expect("boss spawned");
        assert_eq!(boss.position, Vec2::new(600.0, 0.0));
        assert_eq!(boss.hp, 5_000);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn player_movement_is_clamped_to_world() {
        let config = SimulationConfig {
            world_half_extent: 3.0,
            ..SimulationConfig::default()
        };
        let mut world = running_world(config);
        let mut events = Vec::new();
        let input = MoveInput {
            right: true,
            down: true,
            ..MoveInput::default()
        };
        apply(&mut world, Command::MovePlayer { input }, &mut events);
        assert_eq!(world.player().position, Vec2::new(2.0, 2.0));
        apply(&mut world, Command::MovePlayer { input }, &mut events);
        assert_eq!(world.player().position, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn restart_requires_game_over_and_clears_everything() {
        let mut world = running_world(SimulationConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBullet {
                position: Vec2::ZERO,
                velocity: Vec2::X,
                kind: BulletKind::Orbit,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnItem {
                position: Vec2::ONE,
                kind: ItemKind::Magnet,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);

        apply(&mut world, Command::Restart, &mut events);
        assert_eq!(world.bullets().len(), 1, "restart ignored while running");

        defeat(&mut world, DefeatCause::Overrun, &mut events);
        assert_eq!(world.session(), SessionState::GameOver);
        apply(&mut world, Command::TogglePause, &mut events);
        assert_eq!(world.session(), SessionState::GameOver);

        events.clear();
        apply(&mut world, Command::Restart, &mut events);
        assert_eq!(world.session(), SessionState::Running);
        assert_eq!(world.frame(), 0);
        assert!(world.bullets().is_empty());
        assert!(world.items().is_empty());
        assert_eq!(world.player(), &Player::new(Vec2::ZERO));
        assert_eq!(events[0], Event::SessionRestarted);
    }

    #[test]
    fn explosion_marker_fades_after_its_frames() {
        let mut world = running_world(SimulationConfig::default());
        let mut events = Vec::new();
        arm_explosion(world.parts_mut().explosion, Vec2::ZERO);
        for _ in 0..horde_core::EXPLOSION_FRAMES - 1 {
            apply(&mut world, Command::Tick, &mut events);
        }
        assert!(query::snapshot(&world).explosion.is_some());
        apply(&mut world, Command::Tick, &mut events);
        assert!(query::snapshot(&world).explosion.is_none());
    }
}
