#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the per-frame systems. Adapters and the spawner
//! submit [`Command`] values describing discrete mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values that later phases and adapters react to. Renderers only ever see the
//! read-only [`WorldSnapshot`] captured once per frame.

mod config;
pub mod geometry;
pub mod leveling;

pub use config::{ConfigError, SimulationConfig};
pub use glam::Vec2;

use serde::{Deserialize, Serialize};

/// Title used by adapters when opening a window.
pub const WINDOW_TITLE: &str = "Horde";

/// Number of slots reserved for each entity pool.
pub const POOL_CAPACITY: usize = 4096;
/// Half the side length of the square world; coordinates live in `±WORLD_HALF_EXTENT`.
pub const WORLD_HALF_EXTENT: f32 = 10_000.0;

/// Collision radius of the player.
pub const PLAYER_RADIUS: f32 = 32.0;
/// Collision radius of a regular enemy.
pub const ENEMY_RADIUS: f32 = 16.0;
/// Collision radius of the boss.
pub const BOSS_RADIUS: f32 = 64.0;
/// Collision radius of an experience pickup.
pub const EXPERIENCE_RADIUS: f32 = 8.0;
/// Collision radius of an item pickup.
pub const ITEM_RADIUS: f32 = 16.0;
/// Extra experience pickup reach granted per player level.
pub const PICKUP_REACH_PER_LEVEL: f32 = 2.0;
/// Radius of a rocket or boss detonation.
pub const SPLASH_RADIUS: f32 = 500.0;

/// Health the player starts with at level zero.
pub const PLAYER_BASE_HP: i32 = 1_000;
/// Additional health cap granted per level.
pub const PLAYER_HP_PER_LEVEL: i32 = 100;
/// Player movement per frame at level zero.
pub const PLAYER_BASE_SPEED: f32 = 2.0;

/// Number of close-encounter enemy handles a bullet remembers.
pub const CLOSE_ENCOUNTER_SLOTS: usize = 10;
/// Number of rendered frames an explosion marker stays visible.
pub const EXPLOSION_FRAMES: u32 = 6;

/// Lifecycle of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Simulation is frozen until the player resumes.
    Paused,
    /// Simulation advances one tick per frame.
    Running,
    /// The player was defeated; only a restart resumes play.
    GameOver,
}

/// Projectile families fired automatically by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletKind {
    /// Flies in a straight line.
    Straight,
    /// Curves gradually toward the nearest enemy.
    HomingAccelerate,
    /// Turns sharply toward the nearest enemy by averaging its velocity.
    HomingAverage,
    /// Circles the player.
    Orbit,
}

/// Damage and hit-charge values attached to a bullet kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulletStats {
    /// Hit points removed from the target on every hit.
    pub damage: i32,
    /// Number of hits the bullet survives before it is consumed.
    pub lifetime: u32,
}

const BULLET_STATS: [BulletStats; 4] = [
    BulletStats {
        damage: 10,
        lifetime: 1,
    },
    BulletStats {
        damage: 50,
        lifetime: 1,
    },
    BulletStats {
        damage: 20,
        lifetime: 3,
    },
    BulletStats {
        damage: 15,
        lifetime: 1,
    },
];

impl BulletKind {
    /// Every bullet kind, in table order.
    pub const ALL: [BulletKind; 4] = [
        BulletKind::Straight,
        BulletKind::HomingAccelerate,
        BulletKind::HomingAverage,
        BulletKind::Orbit,
    ];

    /// Returns the damage and lifetime row for this kind.
    #[must_use]
    pub const fn stats(self) -> BulletStats {
        BULLET_STATS[self as usize]
    }

    /// Damage dealt per hit.
    #[must_use]
    pub const fn damage(self) -> i32 {
        self.stats().damage
    }

    /// Hit charges granted at spawn.
    #[must_use]
    pub const fn lifetime(self) -> u32 {
        self.stats().lifetime
    }

    /// Reports whether the kind steers toward enemies and keeps a close-encounter cache.
    #[must_use]
    pub const fn homes_on_enemies(self) -> bool {
        matches!(self, Self::HomingAccelerate | Self::HomingAverage)
    }
}

/// Distinguishes a regular experience drop from the overflow accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceKind {
    /// Value dropped by a single death.
    Single,
    /// Slot zero after it absorbed drops that found no free slot.
    Merged,
}

/// Pickups scattered across the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Collects every live experience pickup in the world.
    Magnet,
}

/// Entity pools that can reject a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Enemy pool.
    Enemy,
    /// Bullet pool.
    Bullet,
    /// Experience pool.
    Experience,
    /// Item pool.
    Item,
}

/// Reason an enemy died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KillCause {
    /// Hit points exhausted by a bullet.
    Bullet,
    /// Caught inside a rocket or boss detonation.
    Splash,
}

/// Reason the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefeatCause {
    /// Health drained to zero by enemy contact.
    Overrun,
    /// Touched the boss.
    BossContact,
}

/// Directional keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveInput {
    /// Move toward negative x.
    pub left: bool,
    /// Move toward positive x.
    pub right: bool,
    /// Move toward negative y.
    pub up: bool,
    /// Move toward positive y.
    pub down: bool,
}

impl MoveInput {
    /// Per-axis heading in `{-1, 0, 1}`; opposing keys cancel out.
    #[must_use]
    pub fn heading(self) -> Vec2 {
        let axis = |negative: bool, positive: bool| match (negative, positive) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }

    /// Reports whether no direction is held.
    #[must_use]
    pub fn is_idle(self) -> bool {
        self.heading() == Vec2::ZERO
    }
}

/// Commands that express all discrete world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Completes a running frame, advancing the frame counter.
    Tick,
    /// Updates the player-centred viewport used for spawn placement and homing.
    SetViewport {
        /// Width and height of the visible area in world units.
        size: Vec2,
    },
    /// Moves the player along the held directions.
    MovePlayer {
        /// Keys held this frame.
        input: MoveInput,
    },
    /// Switches between paused and running.
    TogglePause,
    /// Starts a fresh session after a game over.
    Restart,
    /// Ends the running session.
    EndSession {
        /// Why the player lost.
        cause: DefeatCause,
    },
    /// Requests a new enemy.
    SpawnEnemy {
        /// Initial position.
        position: Vec2,
        /// Initial and maximum hit points.
        hp: i32,
    },
    /// Requests a new bullet.
    SpawnBullet {
        /// Initial position.
        position: Vec2,
        /// Initial velocity per frame.
        velocity: Vec2,
        /// Bullet family.
        kind: BulletKind,
    },
    /// Requests the rocket, ignored while one is alive.
    SpawnRocket {
        /// Launch position.
        position: Vec2,
        /// Launch velocity per frame.
        velocity: Vec2,
    },
    /// Requests a new item.
    SpawnItem {
        /// Item position.
        position: Vec2,
        /// Item kind.
        kind: ItemKind,
    },
    /// Requests the boss, ignored while one is alive.
    SpawnBoss {
        /// Spawn position.
        position: Vec2,
    },
}

/// Events broadcast by the world and systems while a frame resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A running frame completed.
    TimeAdvanced {
        /// Frame counter after the tick.
        frame: u64,
    },
    /// The session moved between states.
    SessionChanged {
        /// State before the transition.
        from: SessionState,
        /// State after the transition.
        to: SessionState,
    },
    /// Every pool and the player were reset for a new session.
    SessionRestarted,
    /// An enemy entered the world.
    EnemySpawned {
        /// Slot index assigned to the enemy.
        slot: u32,
        /// Spawn position.
        position: Vec2,
    },
    /// A bullet was fired.
    BulletSpawned {
        /// Slot index assigned to the bullet.
        slot: u32,
        /// Bullet family.
        kind: BulletKind,
    },
    /// The rocket was launched.
    RocketLaunched {
        /// Launch position.
        position: Vec2,
    },
    /// An item appeared.
    ItemSpawned {
        /// Slot index assigned to the item.
        slot: u32,
        /// Item position.
        position: Vec2,
    },
    /// The boss appeared at full health.
    BossSpawned {
        /// Spawn position.
        position: Vec2,
        /// Starting hit points.
        hp: i32,
    },
    /// A spawn found no free slot and was dropped.
    SpawnSkipped {
        /// Pool that was full.
        pool: PoolKind,
    },
    /// An enemy died.
    EnemyKilled {
        /// Slot the enemy occupied.
        slot: u32,
        /// Position at death.
        position: Vec2,
        /// What killed it.
        cause: KillCause,
    },
    /// Experience was dropped into the world.
    ExperienceDropped {
        /// Dropped value.
        value: u64,
        /// Whether the value was merged into the overflow slot.
        merged: bool,
    },
    /// The player absorbed an experience pickup.
    ExperienceCollected {
        /// Collected value.
        value: u64,
    },
    /// The player picked up an item.
    ItemCollected {
        /// Item kind.
        kind: ItemKind,
        /// Total experience swept up by the item.
        swept: u64,
    },
    /// The rocket or the boss detonated.
    Detonated {
        /// Centre of the blast.
        position: Vec2,
        /// Number of enemies killed by the blast.
        kills: u32,
    },
    /// The boss took damage and survived.
    BossDamaged {
        /// Remaining hit points.
        hp: i32,
    },
    /// The boss was destroyed.
    BossDefeated {
        /// Position at death.
        position: Vec2,
    },
    /// The boss caught the player; the hit is always fatal.
    BossReachedPlayer {
        /// Boss position at contact.
        position: Vec2,
    },
    /// Enemies touching the player drained health.
    PlayerDamaged {
        /// Health removed this frame.
        amount: i32,
        /// Health remaining.
        hp: i32,
    },
    /// The player reached a new level.
    LeveledUp {
        /// New level.
        level: u32,
    },
    /// The player lost.
    PlayerDefeated {
        /// Why the player lost.
        cause: DefeatCause,
    },
}

/// Immutable values the spawner needs from the world each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    /// Current session state.
    pub session: SessionState,
    /// Completed running frames since the session started.
    pub frame: u64,
    /// Current player level.
    pub level: u32,
    /// Current player position.
    pub player_position: Vec2,
    /// Visible area centred on the player.
    pub viewport: Vec2,
    /// Half side length of the world square.
    pub world_half_extent: f32,
    /// Whether the rocket is in flight.
    pub rocket_alive: bool,
    /// Whether the boss is present.
    pub boss_alive: bool,
}

/// Read-only state of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Current health.
    pub hp: i32,
    /// Health cap at the current level.
    pub max_hp: i32,
    /// Current level.
    pub level: u32,
    /// Cumulative experience.
    pub experience: u64,
}

/// Read-only state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Slot index occupied by the enemy.
    pub slot: u32,
    /// Current position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Hit points at spawn.
    pub init_hp: i32,
}

/// Read-only state of a bullet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Slot index occupied by the bullet.
    pub slot: u32,
    /// Current position.
    pub position: Vec2,
    /// Current velocity per frame.
    pub velocity: Vec2,
    /// Bullet family.
    pub kind: BulletKind,
}

/// Read-only state of the rocket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocketSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Current velocity per frame.
    pub velocity: Vec2,
    /// Position of the locked target, if it is still alive.
    pub target: Option<Vec2>,
}

/// Read-only state of an experience pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExperienceSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Experience granted on pickup.
    pub value: u64,
    /// Single drop or overflow accumulator.
    pub kind: ExperienceKind,
}

/// Read-only state of an item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Item kind.
    pub kind: ItemKind,
}

/// Read-only state of the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossSnapshot {
    /// Current position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Hit points at spawn.
    pub max_hp: i32,
}

/// Visual marker left behind by a detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionSnapshot {
    /// Centre of the blast.
    pub position: Vec2,
    /// Blast radius.
    pub radius: f32,
    /// Frames the marker remains visible.
    pub frames_remaining: u32,
}

/// Complete read-only picture of the world handed to renderers once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Current session state.
    pub session: SessionState,
    /// Completed running frames.
    pub frame: u64,
    /// Visible area centred on the player.
    pub viewport: Vec2,
    /// The player.
    pub player: PlayerSnapshot,
    /// Live enemies in slot order.
    pub enemies: Vec<EnemySnapshot>,
    /// Live bullets in slot order.
    pub bullets: Vec<BulletSnapshot>,
    /// Live experience pickups in slot order.
    pub experience: Vec<ExperienceSnapshot>,
    /// Live items in slot order.
    pub items: Vec<ItemSnapshot>,
    /// The rocket, if in flight.
    pub rocket: Option<RocketSnapshot>,
    /// The boss, if present.
    pub boss: Option<BossSnapshot>,
    /// The most recent detonation marker, if still visible.
    pub explosion: Option<ExplosionSnapshot>,
}
