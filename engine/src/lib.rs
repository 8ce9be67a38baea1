#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for the Horde simulation.
//!
//! [`Simulation`] owns the world and every system and runs one fixed tick per
//! [`Simulation::step`]: input commands first, then spawning, movement,
//! combat and progression, and finally the tick that advances the frame
//! counter. Adapters pace steps with a [`FrameClock`].

mod clock;

pub use clock::{FrameClock, DEFAULT_CATCH_UP_LIMIT};

use glam::Vec2;
use horde_core::{Command, Event, MoveInput, SessionState, SimulationConfig, WorldSnapshot};
use horde_system_combat::Combat;
use horde_system_movement::Movement;
use horde_system_progression::Progression;
use horde_system_spawning::{Config as SpawningConfig, Spawning};
use horde_world::{self as world, query, World};

/// Player input sampled for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepInput {
    /// Directions held during the tick.
    pub movement: MoveInput,
    /// Whether the pause key was pressed since the previous tick.
    pub pause_pressed: bool,
    /// New viewport size, when the window was resized.
    pub viewport: Option<Vec2>,
}

/// The world and its systems, advanced one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    movement: Movement,
    combat: Combat,
    progression: Progression,
    commands: Vec<Command>,
    events: Vec<Event>,
    settled: Vec<Event>,
}

impl Simulation {
    /// Creates a paused simulation whose spawner is seeded with `seed`.
    #[must_use]
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        tracing::debug!(?config, seed, "creating simulation");
        Self {
            world: World::new(config),
            spawning: Spawning::new(SpawningConfig::new(seed)),
            movement: Movement::default(),
            combat: Combat::new(),
            progression: Progression::new(),
            commands: Vec::new(),
            events: Vec::new(),
            settled: Vec::new(),
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world for scripted scenarios.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.world.session()
    }

    /// Captures the read-only view handed to renderers.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Runs one tick and returns every event it produced.
    ///
    /// The pause key toggles between paused and running, and restarts the
    /// session after a game over. A step that handles the pause key does
    /// nothing else, so the first simulated frame after a resume or restart
    /// is the next step. Nothing but those transitions happens unless the
    /// session is running.
    pub fn step(&mut self, input: StepInput) -> &[Event] {
        self.events.clear();

        if let Some(size) = input.viewport {
            world::apply(&mut self.world, Command::SetViewport { size }, &mut self.events);
        }

        if input.pause_pressed {
            let command = if self.world.session() == SessionState::GameOver {
                Command::Restart
            } else {
                Command::TogglePause
            };
            world::apply(&mut self.world, command, &mut self.events);
            self.spawning.observe(&self.events);
            return &self.events;
        }

        if self.world.session() != SessionState::Running {
            return &self.events;
        }

        world::apply(
            &mut self.world,
            Command::MovePlayer {
                input: input.movement,
            },
            &mut self.events,
        );

        self.commands.clear();
        let context = query::spawn_context(&self.world);
        self.spawning
            .handle(&self.events, &context, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        self.movement.handle(&mut self.world);
        self.combat.handle(&mut self.world, &mut self.events);

        self.settled.clear();
        self.progression
            .handle(&self.events, &mut self.world, &mut self.settled);
        self.events.append(&mut self.settled);

        world::apply(&mut self.world, Command::Tick, &mut self.events);
        &self.events
    }
}
