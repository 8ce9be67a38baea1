#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting spawn commands.
//!
//! Every spawn family runs on its own frame cadence. Intervals depend on the
//! frame counter or the player level, so they are recomputed every running
//! frame; the pending count is clamped when an interval shrinks.

use glam::Vec2;
use horde_core::{BulletKind, Command, Event, ItemKind, SessionState, SpawnContext};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Enemy interval at the start of a session.
pub const ENEMY_BASE_INTERVAL: u64 = 30;
/// Frames over which the enemy interval ramps down to one.
pub const ENEMY_RAMP_FRAMES: u64 = 3_600;
/// Bullet interval at level zero.
pub const BULLET_BASE_INTERVAL: u64 = 10;
/// Rocket interval at level zero; divided by `level + 1`.
pub const ROCKET_BASE_INTERVAL: u64 = 1_200;
/// Frames between item drops.
pub const ITEM_INTERVAL: u64 = 600;
/// Frames between boss appearances.
pub const BOSS_INTERVAL: u64 = 36_000;

const SPAWN_MARGIN: f32 = 20.0;
const LAUNCH_SPEED: f32 = 10.0;
const MIN_ENEMY_HP: i32 = 5;
const MAX_ENEMY_HP: i32 = 50;

/// Frames between enemy waves at `frame`.
#[must_use]
pub fn enemy_interval(frame: u64) -> u64 {
    let ramp = frame.min(ENEMY_RAMP_FRAMES);
    (ENEMY_BASE_INTERVAL - ENEMY_BASE_INTERVAL * ramp / ENEMY_RAMP_FRAMES).max(1)
}

/// Frames between bullet volleys at `level`.
#[must_use]
pub fn bullet_interval(level: u32) -> u64 {
    BULLET_BASE_INTERVAL.saturating_sub(u64::from(level)).max(1)
}

/// Frames between rocket launches at `level`.
#[must_use]
pub fn rocket_interval(level: u32) -> u64 {
    (ROCKET_BASE_INTERVAL / (u64::from(level) + 1)).max(1)
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Frame countdown for one spawn family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cadence {
    until_next: u64,
    interval: u64,
}

impl Cadence {
    const fn ready() -> Self {
        Self {
            until_next: 0,
            interval: u64::MAX,
        }
    }

    const fn pending(interval: u64) -> Self {
        Self {
            until_next: interval,
            interval,
        }
    }

    /// Counts one running frame, reporting whether the family fires on it.
    fn advance(&mut self, interval: u64) -> bool {
        let interval = interval.max(1);
        if interval < self.interval {
            self.until_next = self.until_next.min(interval - 1);
        }
        self.interval = interval;
        if self.until_next == 0 {
            self.until_next = interval - 1;
            true
        } else {
            self.until_next -= 1;
            false
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cadences {
    enemy: Cadence,
    bullet: Cadence,
    rocket: Cadence,
    item: Cadence,
    boss: Cadence,
}

impl Cadences {
    const fn fresh() -> Self {
        Self {
            enemy: Cadence::ready(),
            bullet: Cadence::ready(),
            rocket: Cadence::ready(),
            item: Cadence::pending(ITEM_INTERVAL),
            boss: Cadence::pending(BOSS_INTERVAL),
        }
    }
}

/// System that turns elapsed running frames into spawn commands.
#[derive(Debug)]
pub struct Spawning {
    cadences: Cadences,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadences: Cadences::fresh(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Rewinds every cadence when `events` contain a restart.
    pub fn observe(&mut self, events: &[Event]) {
        if events
            .iter()
            .any(|event| matches!(event, Event::SessionRestarted))
        {
            self.cadences = Cadences::fresh();
        }
    }

    /// Consumes events and the spawn context to emit spawn commands for one frame.
    pub fn handle(&mut self, events: &[Event], context: &SpawnContext, out: &mut Vec<Command>) {
        self.observe(events);

        if context.session != SessionState::Running {
            return;
        }

        let waves = context.level + 1;

        if self.cadences.enemy.advance(enemy_interval(context.frame)) {
            for _ in 0..waves {
                let position = self.outside_viewport(context);
                let hp = self.rng.gen_range(MIN_ENEMY_HP..=MAX_ENEMY_HP);
                out.push(Command::SpawnEnemy { position, hp });
            }
        }

        if self.cadences.bullet.advance(bullet_interval(context.level)) {
            for _ in 0..waves {
                let velocity = self.launch_velocity();
                let kind = BulletKind::ALL[self.rng.gen_range(0..BulletKind::ALL.len())];
                out.push(Command::SpawnBullet {
                    position: context.player_position,
                    velocity,
                    kind,
                });
            }
        }

        if self.cadences.rocket.advance(rocket_interval(context.level)) {
            if context.rocket_alive {
                tracing::debug!(frame = context.frame, "rocket still in flight, launch skipped");
            } else {
                let velocity = self.launch_velocity();
                out.push(Command::SpawnRocket {
                    position: context.player_position,
                    velocity,
                });
            }
        }

        if self.cadences.item.advance(ITEM_INTERVAL) {
            let extent = context.world_half_extent;
            let position = Vec2::new(
                self.rng.gen_range(-extent..=extent),
                self.rng.gen_range(-extent..=extent),
            );
            out.push(Command::SpawnItem {
                position,
                kind: ItemKind::Magnet,
            });
        }

        if self.cadences.boss.advance(BOSS_INTERVAL) {
            if context.boss_alive {
                tracing::debug!(frame = context.frame, "boss still alive, spawn skipped");
            } else {
                let position = self.outside_viewport(context);
                out.push(Command::SpawnBoss { position });
            }
        }
    }

    fn launch_velocity(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(-LAUNCH_SPEED..=LAUNCH_SPEED),
            self.rng.gen_range(-LAUNCH_SPEED..=LAUNCH_SPEED),
        )
    }

    /// Picks a point just beyond a random edge of the player-centred viewport.
    fn outside_viewport(&mut self, context: &SpawnContext) -> Vec2 {
        let half = context.viewport * 0.5;
        let center = context.player_position;
        let along_x = self.rng.gen_range(-half.x..=half.x);
        let along_y = self.rng.gen_range(-half.y..=half.y);
        let offset = match self.rng.gen_range(0..4) {
            0 => Vec2::new(-half.x - SPAWN_MARGIN, along_y),
            1 => Vec2::new(half.x + SPAWN_MARGIN, along_y),
            2 => Vec2::new(along_x, -half.y - SPAWN_MARGIN),
            _ => Vec2::new(along_x, half.y + SPAWN_MARGIN),
        };
        center + offset
    }
}
