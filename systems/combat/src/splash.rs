use glam::Vec2;
use horde_core::{geometry::point_in_circle, Event, KillCause, PoolKind, SPLASH_RADIUS};
use horde_world::{
    arm_explosion,
    entities::{Enemy, Experience, Explosion},
    experience::{drop_experience, DropOutcome},
    pool::{Handle, Pool},
};

/// Drops experience and reports where it went.
///
/// A pool with no slot for the overflow accumulator loses the drop, which is
/// reported as a skipped spawn.
pub(crate) fn drop_loot(
    experience: &mut Pool<Experience>,
    position: Vec2,
    value: u64,
    out_events: &mut Vec<Event>,
) {
    let event = match drop_experience(experience, position, value) {
        DropOutcome::Placed => Event::ExperienceDropped {
            value,
            merged: false,
        },
        DropOutcome::Merged => Event::ExperienceDropped {
            value,
            merged: true,
        },
        DropOutcome::Discarded => Event::SpawnSkipped {
            pool: PoolKind::Experience,
        },
    };
    out_events.push(event);
}

/// Kills the enemy behind `handle` and drops its experience where it died.
pub(crate) fn kill_enemy(
    enemies: &mut Pool<Enemy>,
    experience: &mut Pool<Experience>,
    handle: Handle<Enemy>,
    cause: KillCause,
    out_events: &mut Vec<Event>,
) {
    let Some(enemy) = enemies.remove(handle) else {
        return;
    };
    out_events.push(Event::EnemyKilled {
        slot: handle.index() as u32,
        position: enemy.position,
        cause,
    });
    drop_loot(experience, enemy.position, enemy.experience_value(), out_events);
}

/// Kills every enemy within the splash radius of `center` and arms the explosion marker.
pub(crate) fn detonate(
    enemies: &mut Pool<Enemy>,
    experience: &mut Pool<Experience>,
    explosion: &mut Option<Explosion>,
    center: Vec2,
    scratch: &mut Vec<Handle<Enemy>>,
    out_events: &mut Vec<Event>,
) {
    scratch.clear();
    scratch.extend(
        enemies
            .iter()
            .filter(|(_, enemy)| point_in_circle(enemy.position, center, SPLASH_RADIUS))
            .map(|(handle, _)| handle),
    );
    let kills = scratch.len() as u32;
    for handle in scratch.drain(..) {
        kill_enemy(enemies, experience, handle, KillCause::Splash, out_events);
    }
    arm_explosion(explosion, center);
    out_events.push(Event::Detonated {
        position: center,
        kills,
    });
}
