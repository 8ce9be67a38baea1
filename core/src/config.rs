use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{POOL_CAPACITY, WORLD_HALF_EXTENT};

/// Tunable parameters for a simulation session.
///
/// Every field has a default, so configuration files only need to mention the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of slots in each entity pool.
    pub pool_capacity: usize,
    /// Half side length of the square world.
    pub world_half_extent: f32,
    /// Width of the player-centred viewport in world units.
    pub viewport_width: f32,
    /// Height of the player-centred viewport in world units.
    pub viewport_height: f32,
    /// Hit points the boss spawns with.
    pub boss_max_hp: i32,
    /// Fixed simulation ticks per second.
    pub tick_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pool_capacity: POOL_CAPACITY,
            world_half_extent: WORLD_HALF_EXTENT,
            viewport_width: 1_000.0,
            viewport_height: 1_000.0,
            boss_max_hp: 5_000,
            tick_rate: 60,
        }
    }
}

impl SimulationConfig {
    /// Viewport dimensions as a vector.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }

    /// Checks that every value can drive a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::ZeroPoolCapacity);
        }
        if u32::try_from(self.pool_capacity).is_err() {
            return Err(ConfigError::PoolCapacityTooLarge(self.pool_capacity));
        }
        if !(self.world_half_extent.is_finite() && self.world_half_extent > 0.0) {
            return Err(ConfigError::InvalidWorldExtent(self.world_half_extent));
        }
        let viewport_ok = [self.viewport_width, self.viewport_height]
            .into_iter()
            .all(|side| side.is_finite() && side > 0.0);
        if !viewport_ok {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if self.boss_max_hp <= 0 {
            return Err(ConfigError::InvalidBossHp(self.boss_max_hp));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }
}

/// Errors raised while validating a [`SimulationConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Pools must hold at least one slot.
    #[error("pool capacity must be at least 1")]
    ZeroPoolCapacity,
    /// Slot indices are reported as `u32`.
    #[error("pool capacity must not exceed {max} (received {0})", max = u32::MAX)]
    PoolCapacityTooLarge(usize),
    /// World extent was zero, negative or not finite.
    #[error("world half extent must be positive and finite (received {0})")]
    InvalidWorldExtent(f32),
    /// Viewport had a non-positive or non-finite side.
    #[error("viewport must be positive and finite (received {width}x{height})")]
    InvalidViewport {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// Boss health was not positive.
    #[error("boss max hp must be positive (received {0})")]
    InvalidBossHp(i32),
    /// Tick rate was zero.
    #[error("tick rate must be at least 1")]
    ZeroTickRate,
}
