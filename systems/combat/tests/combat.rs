use glam::Vec2;
use horde_core::{
    BulletKind, Command, Event, ExperienceKind, ItemKind, KillCause, SimulationConfig,
};
use horde_system_combat::Combat;
use horde_world::{self as world, experience::total_value, World};

fn running_world(config: SimulationConfig) -> World {
    let mut world = World::new(config);
    let mut events = Vec::new();
    world::apply(&mut world, Command::TogglePause, &mut events);
    world
}

fn apply_all(world: &mut World, commands: impl IntoIterator<Item = Command>) {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

fn resolve(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    Combat::new().handle(world, &mut events);
    events
}

fn enemy(position: Vec2, hp: i32) -> Command {
    Command::SpawnEnemy { position, hp }
}

fn bullet(position: Vec2, velocity: Vec2, kind: BulletKind) -> Command {
    Command::SpawnBullet {
        position,
        velocity,
        kind,
    }
}

#[test]
fn surviving_enemy_loses_damage_and_recoils() {
    let mut world = running_world(SimulationConfig::default());
    let target = Vec2::new(400.0, 0.0);
    apply_all(
        &mut world,
        [
            enemy(target, 30),
            bullet(target, Vec2::new(2.0, 0.0), BulletKind::Straight),
        ],
    );

    let _ = resolve(&mut world);

    let (_, survivor) = world.enemies().iter().next().expect("enemy alive");
    assert_eq!(survivor.hp, 20);
    assert_eq!(survivor.position, Vec2::new(396.0, 0.0));
    assert!(world.bullets().is_empty(), "single-charge bullet consumed");
}

#[test]
fn lethal_hit_drops_a_tenth_of_initial_hp() {
    let mut world = running_world(SimulationConfig::default());
    let target = Vec2::new(-300.0, 250.0);
    apply_all(
        &mut world,
        [
            enemy(target, 45),
            bullet(target, Vec2::X, BulletKind::HomingAccelerate),
        ],
    );

    let events = resolve(&mut world);

    assert!(world.enemies().is_empty());
    assert!(events.contains(&Event::EnemyKilled {
        slot: 0,
        position: target,
        cause: KillCause::Bullet,
    }));
    let (_, drop) = world.experience().iter().next().expect("experience dropped");
    assert_eq!(drop.value, 4);
    assert_eq!(drop.position, target);
}

#[test]
fn multi_charge_bullet_survives_until_spent() {
    let mut world = running_world(SimulationConfig::default());
    let target = Vec2::new(600.0, 600.0);
    apply_all(
        &mut world,
        [
            enemy(target, 1_000),
            bullet(target, Vec2::ZERO, BulletKind::HomingAverage),
        ],
    );

    let mut combat = Combat::new();
    let mut events = Vec::new();
    for expected_bullets in [1, 1, 0] {
        combat.handle(&mut world, &mut events);
        assert_eq!(world.bullets().len(), expected_bullets);
    }
    let (_, survivor) = world.enemies().iter().next().expect("enemy alive");
    assert_eq!(survivor.hp, 940);
}

#[test]
fn rocket_splash_spares_enemies_beyond_the_radius() {
    let mut world = running_world(SimulationConfig::default());
    let blast = Vec2::new(3_000.0, 0.0);
    apply_all(
        &mut world,
        [
            enemy(blast + Vec2::new(5.0, 0.0), 30),
            enemy(blast + Vec2::new(0.0, 100.0), 30),
            enemy(blast + Vec2::new(-250.0, 0.0), 30),
            enemy(blast + Vec2::new(0.0, -499.0), 30),
            enemy(blast + Vec2::new(0.0, 500.0), 30),
            enemy(blast + Vec2::new(501.0, 0.0), 30),
            Command::SpawnRocket {
                position: blast,
                velocity: Vec2::ZERO,
            },
        ],
    );

    let events = resolve(&mut world);

    let splash_kills = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::EnemyKilled {
                    cause: KillCause::Splash,
                    ..
                }
            )
        })
        .count();
    assert_eq!(splash_kills, 5);
    assert!(events.contains(&Event::Detonated {
        position: blast,
        kills: 5,
    }));
    assert!(world.rocket().is_none());
    assert_eq!(world.experience().len(), 5);

    let (_, survivor) = world.enemies().iter().next().expect("far enemy alive");
    assert_eq!(world.enemies().len(), 1);
    assert_eq!(survivor.position, blast + Vec2::new(501.0, 0.0));
    assert_eq!(survivor.hp, 30);

    let explosion = world.explosion().expect("explosion armed");
    assert_eq!(explosion.position, blast);
    assert_eq!(explosion.frames_remaining, 6);
}

#[test]
fn rocket_locks_on_and_steers() {
    let mut world = running_world(SimulationConfig::default());
    apply_all(
        &mut world,
        [
            enemy(Vec2::new(2_000.0, 0.0), 30),
            Command::SpawnRocket {
                position: Vec2::new(1_000.0, 0.0),
                velocity: Vec2::new(0.0, 10.0),
            },
        ],
    );

    let _ = resolve(&mut world);

    let rocket = world.rocket().expect("rocket alive");
    assert_eq!(rocket.velocity, Vec2::new(2.5, 5.0));
    assert!(rocket.target.is_some());
}

#[test]
fn pickups_within_reach_are_collected() {
    let mut world = running_world(SimulationConfig::default());
    apply_all(
        &mut world,
        [
            enemy(Vec2::new(30.0, 0.0), 30),
            bullet(Vec2::new(30.0, 0.0), Vec2::X, BulletKind::HomingAccelerate),
        ],
    );
    let _ = resolve(&mut world);
    assert_eq!(world.player().experience, 0, "drop lands after the pickup phase");

    let events = resolve(&mut world);
    assert!(events.contains(&Event::ExperienceCollected { value: 3 }));
    assert_eq!(world.player().experience, 3);
    assert!(world.experience().is_empty());
}

#[test]
fn item_sweeps_every_experience_pickup() {
    let mut world = running_world(SimulationConfig::default());
    let far = [Vec2::new(5_000.0, 0.0), Vec2::new(-5_000.0, 4_000.0)];
    apply_all(
        &mut world,
        [
            enemy(far[0], 50),
            bullet(far[0], Vec2::X, BulletKind::HomingAccelerate),
            enemy(far[1], 20),
            bullet(far[1], Vec2::X, BulletKind::HomingAccelerate),
        ],
    );
    let _ = resolve(&mut world);
    assert_eq!(total_value(world.experience()), 7);

    apply_all(
        &mut world,
        [Command::SpawnItem {
            position: Vec2::new(10.0, 10.0),
            kind: ItemKind::Magnet,
        }],
    );
    let events = resolve(&mut world);

    assert!(events.contains(&Event::ItemCollected {
        kind: ItemKind::Magnet,
        swept: 7,
    }));
    assert_eq!(world.player().experience, 7);
    assert!(world.experience().is_empty());
    assert!(world.items().is_empty());
}

#[test]
fn each_touching_enemy_drains_one_hp() {
    let mut world = running_world(SimulationConfig::default());
    apply_all(
        &mut world,
        [
            enemy(Vec2::new(10.0, 0.0), 30),
            enemy(Vec2::new(0.0, -47.0), 30),
            enemy(Vec2::new(-48.0, 0.0), 30),
            enemy(Vec2::new(0.0, 49.0), 30),
        ],
    );

    let events = resolve(&mut world);

    assert_eq!(world.player().hp, 997);
    assert!(events.contains(&Event::PlayerDamaged { amount: 3, hp: 997 }));
}

#[test]
fn experience_overflow_is_merged_not_lost() {
    let config = SimulationConfig {
        pool_capacity: 3,
        ..SimulationConfig::default()
    };
    let mut world = running_world(config);
    let blast = Vec2::new(4_000.0, 4_000.0);
    let wave = |world: &mut World, count: usize| {
        let mut commands: Vec<Command> = (0..count)
            .map(|index| enemy(blast + Vec2::new(0.0, index as f32 * 10.0), 50))
            .collect();
        commands.push(Command::SpawnRocket {
            position: blast,
            velocity: Vec2::ZERO,
        });
        apply_all(world, commands);
        let _ = resolve(world);
    };

    wave(&mut world, 3);
    assert_eq!(world.experience().len(), 3);
    wave(&mut world, 2);

    assert_eq!(world.experience().len(), 3);
    assert_eq!(total_value(world.experience()), 25);
    let accumulator = world.experience().get_index(0).expect("slot zero alive");
    assert_eq!(accumulator.value, 15);
    assert_eq!(accumulator.kind, ExperienceKind::Merged);
}

#[test]
fn rocket_strike_can_defeat_the_boss() {
    let config = SimulationConfig {
        boss_max_hp: 400,
        ..SimulationConfig::default()
    };
    let mut world = running_world(config);
    let boss_at = Vec2::new(-2_000.0, 0.0);
    apply_all(
        &mut world,
        [
            Command::SpawnBoss { position: boss_at },
            enemy(boss_at + Vec2::new(0.0, 300.0), 30),
            Command::SpawnRocket {
                position: boss_at + Vec2::new(40.0, 0.0),
                velocity: Vec2::ZERO,
            },
        ],
    );

    let events = resolve(&mut world);

    assert!(world.boss().is_none());
    assert!(world.rocket().is_none());
    assert!(world.enemies().is_empty());
    assert!(events.contains(&Event::BossDefeated { position: boss_at }));
    assert!(events.contains(&Event::ExperienceDropped {
        value: 40,
        merged: false,
    }));
}

#[test]
fn bullets_chip_the_boss_and_are_consumed() {
    let mut world = running_world(SimulationConfig::default());
    let boss_at = Vec2::new(0.0, 2_000.0);
    apply_all(
        &mut world,
        [
            Command::SpawnBoss { position: boss_at },
            bullet(boss_at, Vec2::X, BulletKind::Straight),
            bullet(boss_at + Vec2::new(10.0, 10.0), Vec2::X, BulletKind::HomingAverage),
        ],
    );

    let events = resolve(&mut world);

    assert_eq!(world.boss().expect("boss alive").hp, 4_970);
    assert!(events.contains(&Event::BossDamaged { hp: 4_970 }));
    assert_eq!(world.bullets().len(), 1);
}

#[test]
fn bullets_spent_on_the_boss_skip_enemies_that_frame() {
    let mut world = running_world(SimulationConfig::default());
    let boss_at = Vec2::new(0.0, 2_000.0);
    let shielded = boss_at + Vec2::new(30.0, 0.0);
    let exposed = boss_at + Vec2::new(300.0, 0.0);
    apply_all(
        &mut world,
        [
            Command::SpawnBoss { position: boss_at },
            enemy(shielded, 1_000),
            enemy(exposed, 1_000),
            bullet(exposed, Vec2::X, BulletKind::HomingAverage),
            bullet(shielded, Vec2::X, BulletKind::HomingAverage),
            bullet(exposed, Vec2::X, BulletKind::HomingAverage),
            bullet(shielded, Vec2::X, BulletKind::HomingAverage),
        ],
    );

    let _ = resolve(&mut world);

    assert_eq!(world.boss().expect("boss alive").hp, 4_960);
    let hp: Vec<i32> = world.enemies().iter().map(|(_, enemy)| enemy.hp).collect();
    assert_eq!(hp, vec![1_000, 960]);
    assert_eq!(world.bullets().len(), 4);
    assert!(
        world.bullets().iter().all(|(_, bullet)| bullet.lifetime == 2),
        "every bullet spends exactly one charge"
    );
}

#[test]
fn boss_contact_is_fatal() {
    let mut world = running_world(SimulationConfig::default());
    apply_all(
        &mut world,
        [Command::SpawnBoss {
            position: Vec2::new(63.0, 0.0),
        }],
    );

    let events = resolve(&mut world);

    assert_eq!(world.player().hp, 0);
    assert!(events.contains(&Event::BossReachedPlayer {
        position: Vec2::new(63.0, 0.0),
    }));
}
