use std::time::Duration;

use focus_defence_core::{
    Action, ActionError, Command, EnemyCatalog, EnemyId, EnemyKind, Event, PathModel, TileCoord,
    TileMap, TurretCatalog, TurretId, TurretKind,
};
use focus_defence_system_turret_combat::TurretCombat;
use focus_defence_world::{self as world, query, World, WorldSettings};
use glam::Vec2;

fn new_world(starting_money: u32) -> World {
    World::new(WorldSettings {
        path: PathModel::new(vec![Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0)]).unwrap(),
        tiles: TileMap::open(10, 10),
        tile_size: 48.0,
        turrets: TurretCatalog::default(),
        enemies: EnemyCatalog::default(),
        starting_money,
        base_health: 10,
    })
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn spawn_goblin_at(world: &mut World, position: Vec2) -> EnemyId {
    let events = apply_all(
        world,
        vec![Command::SpawnEnemy {
            kind: EnemyKind::Goblin,
        }],
    );
    let Some(Event::EnemySpawned { enemy, .. }) = events.first() else {
        panic!("expected a spawn event, got {events:?}");
    };
    let _ = apply_all(
        world,
        vec![Command::MoveEnemy {
            enemy: *enemy,
            position,
            target_waypoint: 1,
        }],
    );
    *enemy
}

fn fire_when_ready(world: &mut World, now: Duration) -> Vec<Event> {
    let mut events = apply_all(
        world,
        vec![Command::Tick {
            dt: Duration::from_millis(100),
            now,
        }],
    );
    let mut commands = Vec::new();
    TurretCombat::new().handle(&events, &query::turret_view(world), &mut commands);
    events.extend(apply_all(world, commands));
    events
}

#[test]
fn mortar_splash_hits_only_enemies_strictly_inside_the_radius() {
    let mut world = new_world(500);
    let _ = apply_all(
        &mut world,
        vec![Command::PurchaseTurret {
            kind: TurretKind::Mortar,
            tile: TileCoord::new(0, 0),
        }],
    );
    let primary = spawn_goblin_at(&mut world, Vec2::new(0.0, 0.0));
    let near = spawn_goblin_at(&mut world, Vec2::new(40.0, 0.0));
    let far = spawn_goblin_at(&mut world, Vec2::new(60.0, 0.0));
    let turret = TurretId::new(0);
    let _ = apply_all(
        &mut world,
        vec![Command::LockTarget {
            turret,
            enemy: primary,
        }],
    );

    let events = fire_when_ready(&mut world, Duration::from_millis(1_600));

    assert!(events.contains(&Event::TurretFired {
        turret,
        kind: TurretKind::Mortar,
        target: primary,
        splash_hits: 1,
    }));
    let view = query::enemy_view(&world);
    assert_eq!(view.get(primary).unwrap().health, 20);
    assert_eq!(view.get(near).unwrap().health, 20);
    assert_eq!(view.get(far).unwrap().health, 50);
    assert_eq!(
        query::turret_view(&world).get(turret).unwrap().last_shot,
        Duration::from_millis(1_600)
    );
}

#[test]
fn lethal_shot_clears_the_target_and_pays_the_bounty_once() {
    let mut world = new_world(100);
    let _ = apply_all(
        &mut world,
        vec![Command::PurchaseTurret {
            kind: TurretKind::Shortbow,
            tile: TileCoord::new(1, 0),
        }],
    );
    assert_eq!(query::money(&world), 0);
    let enemy = spawn_goblin_at(&mut world, Vec2::new(72.0, 60.0));
    let turret = TurretId::new(0);
    let _ = apply_all(&mut world, vec![Command::LockTarget { turret, enemy }]);

    let mut now = Duration::ZERO;
    let mut kills = 0;
    for _ in 0..40 {
        now += Duration::from_millis(100);
        let _ = fire_when_ready(&mut world, now);
        let swept = apply_all(&mut world, vec![Command::CollectBounties]);
        kills += swept
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count();
    }

    assert_eq!(kills, 1);
    assert_eq!(query::money(&world), 10);
    assert_eq!(query::enemy_count(&world), 0);
    assert_eq!(query::turret_view(&world).get(turret).unwrap().target, None);
    let ledger = query::ledger(&world);
    assert_eq!(ledger.enemies_killed(), 1);
    assert_eq!(ledger.money_earned(), 10);
    assert_eq!(ledger.money_spent(), 100);
}

#[test]
fn purchase_without_funds_changes_nothing() {
    let mut world = new_world(90);
    let tile = TileCoord::new(2, 2);
    let events = apply_all(
        &mut world,
        vec![Command::PurchaseTurret {
            kind: TurretKind::Shortbow,
            tile,
        }],
    );

    assert_eq!(
        events,
        vec![Event::ActionRejected {
            action: Action::Purchase {
                kind: TurretKind::Shortbow,
                tile,
            },
            reason: ActionError::InsufficientResources {
                required: 100,
                available: 90,
            },
        }]
    );
    assert_eq!(query::money(&world), 90);
    assert_eq!(query::turret_count(&world), 0);
}

#[test]
fn occupied_and_blocked_tiles_are_rejected() {
    let mut world = World::new(WorldSettings {
        tiles: TileMap::from_layout(&["..#"]).unwrap(),
        ..settings_for_layout()
    });
    let events = apply_all(
        &mut world,
        vec![
            Command::PurchaseTurret {
                kind: TurretKind::Shortbow,
                tile: TileCoord::new(0, 0),
            },
            Command::PurchaseTurret {
                kind: TurretKind::Longbow,
                tile: TileCoord::new(0, 0),
            },
            Command::PurchaseTurret {
                kind: TurretKind::Longbow,
                tile: TileCoord::new(2, 0),
            },
        ],
    );

    let reasons: Vec<ActionError> = events
        .iter()
        .filter_map(|event| match event {
            Event::ActionRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![ActionError::TileOccupied, ActionError::NotBuildable]
    );
    assert_eq!(query::money(&world), 900);
    assert_eq!(query::selected_turret(&world), Some(TurretId::new(0)));
}

#[test]
fn upgrade_stops_at_the_level_limit() {
    let mut world = new_world(1_000);
    let turret = TurretId::new(0);
    let _ = apply_all(
        &mut world,
        vec![Command::PurchaseTurret {
            kind: TurretKind::Shortbow,
            tile: TileCoord::new(3, 3),
        }],
    );
    assert_eq!(query::upgrade_price(&world, turret), Some(120));

    let events = apply_all(&mut world, vec![Command::UpgradeTurret { turret }]);
    assert_eq!(
        events,
        vec![Event::TurretUpgraded {
            turret,
            level: 2,
            cost: 120,
        }]
    );
    let snapshot = query::turret_view(&world).get(turret).cloned().unwrap();
    assert_eq!(snapshot.damage, 30);
    assert_eq!(snapshot.upgrade_cost, None);
    assert_eq!(query::money(&world), 780);

    let events = apply_all(&mut world, vec![Command::UpgradeTurret { turret }]);
    assert_eq!(
        events,
        vec![Event::ActionRejected {
            action: Action::Upgrade { turret },
            reason: ActionError::MaxLevel,
        }]
    );
    assert_eq!(query::turret_view(&world).get(turret).unwrap().level, 2);
    assert_eq!(query::money(&world), 780);
}

fn settings_for_layout() -> WorldSettings {
    WorldSettings {
        path: PathModel::new(vec![Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0)]).unwrap(),
        tiles: TileMap::open(1, 1),
        tile_size: 48.0,
        turrets: TurretCatalog::default(),
        enemies: EnemyCatalog::default(),
        starting_money: 1_000,
        base_health: 10,
    }
}
