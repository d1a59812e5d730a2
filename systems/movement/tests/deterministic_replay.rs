use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use focus_defence_core::{
    Command, EnemyCatalog, EnemyKind, Event, PathModel, TileMap, TurretCatalog,
};
use focus_defence_system_movement::Movement;
use focus_defence_world::{self as world, query, World, WorldSettings};
use glam::Vec2;

#[test]
fn deterministic_replay_produces_identical_fingerprints() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.escapes > 0, "script should push at least one enemy off the path");
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    let kinds = [EnemyKind::Goblin, EnemyKind::Troll, EnemyKind::Giant];
    let mut now = Duration::ZERO;
    for tick in 0..600_u32 {
        if tick % 20 == 0 {
            commands.push(Command::SpawnEnemy {
                kind: kinds[(tick / 20) as usize % kinds.len()],
            });
        }
        let dt = Duration::from_millis(u64::from(16 + tick % 5));
        now += dt;
        commands.push(Command::Tick { dt, now });
    }
    commands
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(WorldSettings {
        path: PathModel::new(vec![
            Vec2::new(0.0, 24.0),
            Vec2::new(240.0, 24.0),
            Vec2::new(240.0, 216.0),
            Vec2::new(480.0, 216.0),
        ])
        .unwrap(),
        tiles: TileMap::open(10, 5),
        tile_size: 48.0,
        turrets: TurretCatalog::default(),
        enemies: EnemyCatalog::default(),
        starting_money: 200,
        base_health: 50,
    });
    let mut movement = Movement::new();
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        let view = query::enemy_view(&world);
        let mut moves = Vec::new();
        movement.handle(&events, &view, query::path(&world), &mut moves);
        log.extend(events.iter().map(EventRecord::from));
        for command in moves {
            let mut produced = Vec::new();
            world::apply(&mut world, command, &mut produced);
            log.extend(produced.iter().map(EventRecord::from));
        }
    }

    let enemies = query::enemy_view(&world)
        .into_vec()
        .into_iter()
        .map(|enemy| {
            (
                enemy.id.get(),
                enemy.target_waypoint,
                enemy.position.x.to_bits(),
                enemy.position.y.to_bits(),
            )
        })
        .collect();
    let escapes = log
        .iter()
        .filter(|record| matches!(record, EventRecord::Escaped { .. }))
        .count();

    ReplayOutcome {
        enemies,
        escapes,
        events: log,
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    enemies: Vec<(u32, usize, u32, u32)>,
    escapes: usize,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Time { nanos: u128 },
    Spawned { enemy: u32 },
    Escaped { enemy: u32 },
    Other,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { now, .. } => Self::Time {
                nanos: now.as_nanos(),
            },
            Event::EnemySpawned { enemy, .. } => Self::Spawned { enemy: enemy.get() },
            Event::EnemyEscaped { enemy } => Self::Escaped { enemy: enemy.get() },
            _ => Self::Other,
        }
    }
}
