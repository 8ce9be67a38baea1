#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! End-of-frame progression: defeat, leveling and health regeneration.

use horde_core::{leveling, DefeatCause, Event, SessionState};
use horde_world::{self as world, World};

/// Health restored per running frame.
pub const REGENERATION_PER_FRAME: i32 = 1;

/// Progression system that settles the player's state after combat.
#[derive(Debug, Default)]
pub struct Progression;

impl Progression {
    /// Creates a new progression system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies defeat, level-ups and regeneration for the frame described by `events`.
    pub fn handle(&mut self, events: &[Event], world: &mut World, out_events: &mut Vec<Event>) {
        if world.session() != SessionState::Running {
            return;
        }

        if world.player().hp <= 0 {
            let cause = if events
                .iter()
                .any(|event| matches!(event, Event::BossReachedPlayer { .. }))
            {
                DefeatCause::BossContact
            } else {
                DefeatCause::Overrun
            };
            world::defeat(world, cause, out_events);
            return;
        }

        let player = world.parts_mut().player;
        if leveling::crossed_next_threshold(player.experience, player.level) {
            player.level = leveling::level_for_experience(player.experience);
            tracing::info!(
                level = player.level,
                experience = player.experience,
                next = leveling::next_threshold(player.level),
                "player leveled up"
            );
            out_events.push(Event::LeveledUp {
                level: player.level,
            });
        }

        player.hp = player
            .hp
            .saturating_add(REGENERATION_PER_FRAME)
            .min(player.max_hp());
    }
}
