//! Experience drops with overflow merging.

use glam::Vec2;
use horde_core::ExperienceKind;

use crate::{entities::Experience, pool::Pool};

/// Where a dropped value ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Stored in its own slot.
    Placed,
    /// Added to slot zero because the pool was full.
    Merged,
    /// The pool has no slots at all.
    Discarded,
}

/// Drops `value` experience at `position`.
///
/// When the pool is full the value is folded into slot zero, which is then
/// marked as [`ExperienceKind::Merged`], so the total stored in the pool never
/// shrinks.
pub fn drop_experience(pool: &mut Pool<Experience>, position: Vec2, value: u64) -> DropOutcome {
    let drop = Experience {
        position,
        value,
        kind: ExperienceKind::Single,
    };
    if pool.insert(drop).is_ok() {
        return DropOutcome::Placed;
    }
    match pool.get_index_mut(0) {
        Some(accumulator) => {
            accumulator.value = accumulator.value.saturating_add(value);
            accumulator.kind = ExperienceKind::Merged;
            tracing::debug!(value, total = accumulator.value, "experience pool full, merged drop");
            DropOutcome::Merged
        }
        None => DropOutcome::Discarded,
    }
}

/// Sum of every live experience value.
#[must_use]
pub fn total_value(pool: &Pool<Experience>) -> u64 {
    pool.iter()
        .fold(0_u64, |total, (_, drop)| total.saturating_add(drop.value))
}
