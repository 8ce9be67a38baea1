//! Entity records stored in the world's pools and singletons.

use glam::Vec2;
use horde_core::{
    BulletKind, ExperienceKind, ItemKind, CLOSE_ENCOUNTER_SLOTS, PICKUP_REACH_PER_LEVEL,
    PLAYER_BASE_HP, PLAYER_BASE_SPEED, PLAYER_HP_PER_LEVEL, PLAYER_RADIUS,
};

use crate::pool::Handle;

/// The controllable survivor.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Current position.
    pub position: Vec2,
    /// Current health.
    pub hp: i32,
    /// Cumulative experience collected this session.
    pub experience: u64,
    /// Current level.
    pub level: u32,
}

impl Player {
    /// Creates a level zero player at full health.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            hp: PLAYER_BASE_HP,
            experience: 0,
            level: 0,
        }
    }

    /// Movement per frame along each held direction.
    #[must_use]
    pub fn speed(&self) -> f32 {
        PLAYER_BASE_SPEED + self.level as f32
    }

    /// Health cap at the current level.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        let bonus = i32::try_from(self.level)
            .unwrap_or(i32::MAX)
            .saturating_mul(PLAYER_HP_PER_LEVEL);
        PLAYER_BASE_HP.saturating_add(bonus)
    }

    /// Radius within which experience pickups are collected.
    #[must_use]
    pub fn pickup_reach(&self) -> f32 {
        PLAYER_RADIUS + PICKUP_REACH_PER_LEVEL * self.level as f32
    }
}

/// A pursuing enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Current position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Hit points at spawn; determines the experience drop.
    pub init_hp: i32,
}

impl Enemy {
    /// Creates an enemy at full health.
    #[must_use]
    pub fn new(position: Vec2, hp: i32) -> Self {
        Self {
            position,
            hp,
            init_hp: hp,
        }
    }

    /// Experience dropped on death.
    #[must_use]
    pub fn experience_value(&self) -> u64 {
        u64::try_from(self.init_hp / 10).unwrap_or(0)
    }
}

/// Ring buffer of enemies a homing bullet recently found nearest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CloseEncounters {
    entries: [Option<Handle<Enemy>>; CLOSE_ENCOUNTER_SLOTS],
    cursor: usize,
}

impl CloseEncounters {
    /// Writes `enemy` at the cursor and advances it, overwriting the oldest entry.
    pub fn record(&mut self, enemy: Handle<Enemy>) {
        self.entries[self.cursor] = Some(enemy);
        self.cursor = (self.cursor + 1) % CLOSE_ENCOUNTER_SLOTS;
    }

    /// Recorded handles in buffer order; entries may be stale.
    pub fn iter(&self) -> impl Iterator<Item = Handle<Enemy>> + '_ {
        self.entries.iter().flatten().copied()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Reports whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An auto-fired projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    /// Current position.
    pub position: Vec2,
    /// Velocity per frame.
    pub velocity: Vec2,
    /// Bullet family.
    pub kind: BulletKind,
    /// Remaining hit charges.
    pub lifetime: u32,
    /// Damage per hit.
    pub damage: i32,
    /// Recently nearest enemies, checked before a full scan.
    pub close_encounters: CloseEncounters,
}

impl Bullet {
    /// Creates a bullet with the damage and lifetime of its kind.
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2, kind: BulletKind) -> Self {
        Self {
            position,
            velocity,
            kind,
            lifetime: kind.lifetime(),
            damage: kind.damage(),
            close_encounters: CloseEncounters::default(),
        }
    }
}

/// What the rocket is locked onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RocketTarget {
    /// A regular enemy.
    Enemy(Handle<Enemy>),
    /// The boss.
    Boss,
}

/// The homing rocket; at most one exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Rocket {
    /// Current position.
    pub position: Vec2,
    /// Velocity per frame.
    pub velocity: Vec2,
    /// Locked target, if any.
    pub target: Option<RocketTarget>,
}

/// An experience pickup.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience {
    /// Position in the world.
    pub position: Vec2,
    /// Experience granted on pickup.
    pub value: u64,
    /// Single drop or overflow accumulator.
    pub kind: ExperienceKind,
}

/// A collectable item.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Position in the world.
    pub position: Vec2,
    /// Item kind.
    pub kind: ItemKind,
}

/// The boss; at most one exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    /// Current position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Hit points at spawn.
    pub max_hp: i32,
}

impl Boss {
    /// Experience dropped on defeat.
    #[must_use]
    pub fn experience_value(&self) -> u64 {
        u64::try_from(self.max_hp / 10).unwrap_or(0)
    }
}

/// Fading marker left by a detonation.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    /// Centre of the blast.
    pub position: Vec2,
    /// Ticks until the marker disappears.
    pub frames_remaining: u32,
}
