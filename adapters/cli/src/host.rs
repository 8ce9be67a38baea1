//! Bridges rendered frames to fixed simulation ticks.

use glam::Vec2;
use horde_core::{Event, MoveInput, SessionState};
use horde_engine::{FrameClock, Simulation, StepInput};
use horde_rendering::{FrameInput, Scene};
use std::time::Duration;

/// Edge-triggered input held until a tick consumes it.
///
/// A frame may run zero ticks; a pause press or resize seen on such a frame
/// is applied on the next tick instead of being lost.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PendingInput {
    pause_pressed: bool,
    viewport: Option<Vec2>,
}

impl PendingInput {
    pub(crate) fn record(&mut self, input: &FrameInput) {
        self.pause_pressed |= input.pause_pressed;
        if input.viewport.is_some() {
            self.viewport = input.viewport;
        }
    }

    pub(crate) fn take(&mut self, movement: MoveInput) -> StepInput {
        StepInput {
            movement,
            pause_pressed: std::mem::take(&mut self.pause_pressed),
            viewport: self.viewport.take(),
        }
    }
}

/// Owns the simulation on behalf of the render loop.
#[derive(Debug)]
pub(crate) struct Host {
    simulation: Simulation,
    clock: FrameClock,
    pending: PendingInput,
    tick_rate: u32,
}

impl Host {
    pub(crate) fn new(simulation: Simulation, tick_rate: u32) -> Self {
        Self {
            simulation,
            clock: FrameClock::new(tick_rate),
            pending: PendingInput::default(),
            tick_rate,
        }
    }

    /// Runs the ticks owed for `elapsed` and refreshes `scene`.
    pub(crate) fn frame(&mut self, elapsed: Duration, input: FrameInput, scene: &mut Scene) {
        self.pending.record(&input);
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            let step = self.pending.take(input.movement);
            for event in self.simulation.step(step) {
                log_event(event);
            }
        }
        scene.update(&self.simulation.snapshot(), self.tick_rate);
    }
}

fn log_event(event: &Event) {
    match event {
        Event::SessionChanged { from, to } => {
            tracing::debug!(?from, ?to, "session changed");
        }
        Event::SessionRestarted => tracing::debug!("session restarted"),
        _ => {}
    }
}

/// Totals collected over a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) kills: u64,
    pub(crate) bosses_defeated: u64,
    pub(crate) level: u32,
    pub(crate) experience: u64,
    pub(crate) session: SessionState,
}

/// Unpauses and steps up to `frames` ticks without input, stopping early
/// when the player is defeated.
pub(crate) fn run_headless(mut simulation: Simulation, frames: u64) -> RunSummary {
    let mut kills = 0;
    let mut bosses_defeated = 0;
    let mut stepped = 0;
    if simulation.session() == SessionState::Paused {
        let _ = simulation.step(StepInput {
            pause_pressed: true,
            ..StepInput::default()
        });
    }

    while stepped < frames {
        let mut defeated = false;
        for event in simulation.step(StepInput::default()) {
            match event {
                Event::EnemyKilled { .. } => kills += 1,
                Event::BossDefeated { .. } => bosses_defeated += 1,
                Event::PlayerDefeated { cause } => {
                    tracing::info!(?cause, frame = stepped, "player defeated");
                    defeated = true;
                }
                _ => {}
            }
        }
        stepped += 1;
        if defeated {
            break;
        }
    }

    let snapshot = simulation.snapshot();
    RunSummary {
        frames: snapshot.frame,
        kills,
        bosses_defeated,
        level: snapshot.player.level,
        experience: snapshot.player.experience,
        session: snapshot.session,
    }
}
