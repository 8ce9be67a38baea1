use glam::Vec2;
use horde_core::{Command, Event, SessionState, SimulationConfig, SpawnContext};
use horde_system_spawning::{Config, Spawning, BOSS_INTERVAL, ITEM_INTERVAL};
use horde_world::{self as world, query, World};

fn running_context(frame: u64, level: u32) -> SpawnContext {
    SpawnContext {
        session: SessionState::Running,
        frame,
        level,
        player_position: Vec2::new(100.0, -50.0),
        viewport: Vec2::new(1_000.0, 800.0),
        world_half_extent: 10_000.0,
        rocket_alive: false,
        boss_alive: false,
    }
}

fn count(commands: &[Command], predicate: impl Fn(&Command) -> bool) -> usize {
    commands.iter().filter(|command| predicate(command)).count()
}

#[test]
fn first_running_frame_spawns_enemies_bullets_and_rocket() {
    let mut spawning = Spawning::new(Config::new(0x5eed));
    let mut commands = Vec::new();
    spawning.handle(&[], &running_context(0, 2), &mut commands);

    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnEnemy { .. })),
        3
    );
    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnBullet { .. })),
        3
    );
    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnRocket { .. })),
        1
    );
    assert_eq!(
        count(&commands, |c| matches!(
            c,
            Command::SpawnItem { .. } | Command::SpawnBoss { .. }
        )),
        0
    );
}

#[test]
fn paused_sessions_emit_nothing() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut commands = Vec::new();
    let context = SpawnContext {
        session: SessionState::Paused,
        ..running_context(0, 0)
    };
    for _ in 0..100 {
        spawning.handle(&[], &context, &mut commands);
    }
    assert!(commands.is_empty());
}

#[test]
fn enemies_spawn_just_outside_the_viewport() {
    let mut spawning = Spawning::new(Config::new(99));
    let context = running_context(0, 20);
    let mut commands = Vec::new();
    spawning.handle(&[], &context, &mut commands);

    let half = context.viewport * 0.5;
    for command in &commands {
        if let Command::SpawnEnemy { position, hp } = command {
            assert!((5..=50).contains(hp));
            let offset = (*position - context.player_position).abs();
            let on_vertical_edge = (offset.x - (half.x + 20.0)).abs() < 1.0e-3 && offset.y <= half.y + 1.0e-3;
            let on_horizontal_edge =
                (offset.y - (half.y + 20.0)).abs() < 1.0e-3 && offset.x <= half.x + 1.0e-3;
            assert!(
                on_vertical_edge || on_horizontal_edge,
                "enemy at {position:?} is not on the spawn ring"
            );
        }
    }
}

#[test]
fn bullets_launch_from_the_player_with_bounded_velocity() {
    let mut spawning = Spawning::new(Config::new(3));
    let context = running_context(0, 9);
    let mut commands = Vec::new();
    spawning.handle(&[], &context, &mut commands);

    let mut seen = 0;
    for command in &commands {
        if let Command::SpawnBullet {
            position, velocity, ..
        } = command
        {
            seen += 1;
            assert_eq!(*position, context.player_position);
            assert!(velocity.x.abs() <= 10.0 && velocity.y.abs() <= 10.0);
        }
    }
    assert_eq!(seen, 10);
}

#[test]
fn items_and_bosses_wait_for_their_interval() {
    let mut spawning = Spawning::new(Config::new(11));
    let mut item_frames = Vec::new();
    let mut boss_frames = Vec::new();
    for frame in 0..=BOSS_INTERVAL {
        let mut commands = Vec::new();
        spawning.handle(&[], &running_context(frame, 0), &mut commands);
        for command in &commands {
            match command {
                Command::SpawnItem { position, .. } => {
                    assert!(position.x.abs() <= 10_000.0 && position.y.abs() <= 10_000.0);
                    item_frames.push(frame);
                }
                Command::SpawnBoss { .. } => boss_frames.push(frame),
                _ => {}
            }
        }
    }
    assert_eq!(item_frames.first(), Some(&ITEM_INTERVAL));
    assert_eq!(item_frames.len() as u64, BOSS_INTERVAL / ITEM_INTERVAL);
    assert_eq!(boss_frames, vec![BOSS_INTERVAL]);
}

#[test]
fn live_rocket_suppresses_launch() {
    let mut spawning = Spawning::new(Config::new(1));
    let context = SpawnContext {
        rocket_alive: true,
        ..running_context(0, 0)
    };
    let mut commands = Vec::new();
    spawning.handle(&[], &context, &mut commands);
    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnRocket { .. })),
        0
    );
}

#[test]
fn restart_rewinds_cadences() {
    let mut spawning = Spawning::new(Config::new(5));
    let mut commands = Vec::new();
    spawning.handle(&[], &running_context(0, 0), &mut commands);
    commands.clear();

    spawning.handle(&[], &running_context(1, 0), &mut commands);
    assert!(commands.is_empty(), "cadences are mid-interval");

    spawning.handle(&[Event::SessionRestarted], &running_context(0, 0), &mut commands);
    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnRocket { .. })),
        1
    );
}

#[test]
fn observed_restart_rewinds_cadences_without_spawning() {
    let mut spawning = Spawning::new(Config::new(5));
    let mut commands = Vec::new();
    spawning.handle(&[], &running_context(0, 0), &mut commands);
    commands.clear();

    spawning.observe(&[Event::SessionRestarted]);
    spawning.handle(&[], &running_context(0, 0), &mut commands);
    assert_eq!(
        count(&commands, |c| matches!(c, Command::SpawnRocket { .. })),
        1
    );
}

#[test]
fn same_seed_replays_identically() {
    let mut first = Spawning::new(Config::new(0xfeed));
    let mut second = Spawning::new(Config::new(0xfeed));
    let mut first_commands = Vec::new();
    let mut second_commands = Vec::new();
    for frame in 0..120 {
        first.handle(&[], &running_context(frame, 1), &mut first_commands);
        second.handle(&[], &running_context(frame, 1), &mut second_commands);
    }
    assert!(!first_commands.is_empty());
    assert_eq!(first_commands, second_commands);
}

#[test]
fn spawn_commands_apply_to_world() {
    let mut world = World::new(SimulationConfig::default());
    let mut events = Vec::new();
    world::apply(&mut world, Command::TogglePause, &mut events);

    let mut spawning = Spawning::new(Config::new(42));
    let mut commands = Vec::new();
    spawning.handle(&events, &query::spawn_context(&world), &mut commands);
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(world.enemies().len(), 1);
    assert_eq!(world.bullets().len(), 1);
    assert!(world.rocket().is_some());
}
