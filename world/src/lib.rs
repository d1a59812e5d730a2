#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Focus Defence.

mod enemies;
mod ledger;
mod turrets;

use std::time::Duration;

use focus_defence_core::{
    Action, ActionError, Command, EnemyCatalog, EnemyId, Event, Multipliers, Outcome, PathModel,
    TileCoord, TileMap, TurretCatalog, TurretId, TurretKind,
};
use tracing::{debug, info, trace};

use enemies::{heading_degrees, Enemy};
use turrets::TurretRegistry;

pub use ledger::Ledger;

/// Static description of a level and its starting resources.
#[derive(Clone, Debug)]
pub struct WorldSettings {
    /// Path walked by every enemy.
    pub path: PathModel,
    /// Grid of buildable tiles.
    pub tiles: TileMap,
    /// Side length of a tile in pixels.
    pub tile_size: f32,
    /// Turret stat table.
    pub turrets: TurretCatalog,
    /// Enemy stat table.
    pub enemies: EnemyCatalog,
    /// Money available when the match starts.
    pub starting_money: u32,
    /// Escapes the base survives.
    pub base_health: u32,
}

/// Represents the authoritative Focus Defence world state.
#[derive(Debug)]
pub struct World {
    settings: WorldSettings,
    multipliers: Multipliers,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    turrets: TurretRegistry,
    money: u32,
    base_health: u32,
    outcome: Outcome,
    waves_started: bool,
    now: Duration,
    selected_tile: Option<TileCoord>,
    selected_turret: Option<TurretId>,
    ledger: Ledger,
}

impl World {
    /// Creates a world with no enemies or turrets and full resources.
    #[must_use]
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            money: settings.starting_money,
            base_health: settings.base_health,
            settings,
            multipliers: Multipliers::default(),
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            turrets: TurretRegistry::new(),
            outcome: Outcome::InProgress,
            waves_started: false,
            now: Duration::ZERO,
            selected_tile: None,
            selected_turret: None,
            ledger: Ledger::default(),
        }
    }

    fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    fn remove_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|enemy| enemy.id == id)?;
        self.turrets.forget_enemy(id);
        Some(self.enemies.remove(index))
    }

    fn set_outcome(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_over() {
            return;
        }
        self.outcome = outcome;
        info!(?outcome, money = self.money, base_health = self.base_health, "match ended");
        out_events.push(Event::OutcomeChanged { outcome });
    }

    fn reject(&self, action: Action, reason: ActionError, out_events: &mut Vec<Event>) {
        debug!(?action, %reason, "action rejected");
        out_events.push(Event::ActionRejected { action, reason });
    }

    fn charge(&mut self, cost: u32) {
        self.money -= cost;
        self.ledger.record_spend(cost);
    }

    fn select(&mut self, tile: Option<TileCoord>, out_events: &mut Vec<Event>) {
        let tile = tile.filter(|tile| self.settings.tiles.is_buildable(*tile));
        self.selected_tile = tile;
        self.selected_turret = tile.and_then(|tile| self.turrets.at_tile(tile).map(|t| t.id));
        out_events.push(Event::TileSelected {
            tile,
            turret: self.selected_turret,
        });
    }

    fn purchase(&mut self, kind: TurretKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        let action = Action::Purchase { kind, tile };
        let cost = self
            .multipliers
            .purchase_price(self.settings.turrets.cost(kind));
        let rejection = if self.outcome.is_over() {
            Some(ActionError::SessionEnded)
        } else if !self.settings.tiles.is_buildable(tile) {
            Some(ActionError::NotBuildable)
        } else if self.money < cost {
            Some(ActionError::InsufficientResources {
                required: cost,
                available: self.money,
            })
        } else if self.turrets.at_tile(tile).is_some() {
            Some(ActionError::TileOccupied)
        } else {
            None
        };
        if let Some(reason) = rejection {
            self.reject(action, reason, out_events);
            return;
        }

        self.charge(cost);
        let turret = self.turrets.insert(
            kind,
            tile,
            self.settings.tile_size,
            self.now,
            &self.settings.turrets,
            &self.multipliers,
        );
        debug!(turret = turret.get(), kind = kind.label(), cost, "turret purchased");
        out_events.push(Event::TurretPurchased {
            turret,
            kind,
            tile,
            cost,
        });
        self.select(Some(tile), out_events);
    }

    fn upgrade(&mut self, turret: TurretId, out_events: &mut Vec<Event>) {
        let action = Action::Upgrade { turret };
        let rejection = if self.outcome.is_over() {
            Err(ActionError::SessionEnded)
        } else {
            match self.turrets.get(turret) {
                None => Err(ActionError::UnknownTurret),
                Some(state) => match self.settings.turrets.upgrade_cost(state.kind, state.level) {
                    None => Err(ActionError::MaxLevel),
                    Some(base) => {
                        let cost = self.multipliers.upgrade_price(base);
                        if self.money < cost {
                            Err(ActionError::InsufficientResources {
                                required: cost,
                                available: self.money,
                            })
                        } else {
                            Ok(cost)
                        }
                    }
                },
            }
        };
        let cost = match rejection {
            Ok(cost) => cost,
            Err(reason) => {
                self.reject(action, reason, out_events);
                return;
            }
        };

        let Some(state) = self.turrets.get_mut(turret) else {
            return;
        };
        if !state.upgrade(&self.settings.turrets, &self.multipliers) {
            return;
        }
        let level = state.level;
        self.charge(cost);
        debug!(turret = turret.get(), level, cost, "turret upgraded");
        out_events.push(Event::TurretUpgraded {
            turret,
            level,
            cost,
        });
    }

    fn fire(&mut self, turret_id: TurretId, out_events: &mut Vec<Event>) {
        let Some(turret) = self.turrets.get(turret_id) else {
            return;
        };
        let (kind, origin, damage, splash_radius) =
            (turret.kind, turret.position, turret.damage, turret.splash_radius);
        let Some(target) = turret.target else {
            return;
        };
        let Some(primary) = self.enemy(target).filter(|enemy| !enemy.is_dead()) else {
            if let Some(turret) = self.turrets.get_mut(turret_id) {
                turret.target = None;
            }
            return;
        };
        let impact = primary.position;

        let mut splash_hits = 0;
        let mut killed = false;
        for enemy in &mut self.enemies {
            if enemy.id == target {
                enemy.apply_damage(damage);
                killed = enemy.is_dead();
            } else if splash_radius > 0.0 && enemy.position.distance(impact) < splash_radius {
                enemy.apply_damage(damage);
                splash_hits += 1;
            }
        }

        let now = self.now;
        if let Some(turret) = self.turrets.get_mut(turret_id) {
            turret.last_shot = now;
            if let Some(angle) = heading_degrees(origin, impact) {
                turret.angle = angle;
            }
            if killed {
                turret.target = None;
            }
        }
        trace!(
            turret = turret_id.get(),
            enemy = target.get(),
            damage,
            splash_hits,
            "shot"
        );
        out_events.push(Event::TurretFired {
            turret: turret_id,
            kind,
            target,
            splash_hits,
        });
    }

    fn collect_bounties(&mut self, out_events: &mut Vec<Event>) {
        let fallen: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.is_dead())
            .map(|enemy| enemy.id)
            .collect();
        for id in fallen {
            let Some(enemy) = self.remove_enemy(id) else {
                continue;
            };
            self.money = self.money.saturating_add(enemy.reward);
            self.ledger.record_kill(enemy.reward);
            out_events.push(Event::EnemyKilled {
                enemy: id,
                kind: enemy.kind,
                reward: enemy.reward,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, now } => {
            if world.outcome.is_over() {
                return;
            }
            world.now = now;
            world.ledger.record_time(dt);
            out_events.push(Event::TimeAdvanced { dt, now });
        }
        Command::StartWaves => {
            if world.waves_started || world.outcome.is_over() {
                return;
            }
            world.waves_started = true;
            out_events.push(Event::WavesStarted);
        }
        Command::SpawnEnemy { kind } => {
            if world.outcome.is_over() {
                return;
            }
            let id = world.next_enemy_id;
            world.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
            let path = &world.settings.path;
            let mut enemy = Enemy::spawn(id, kind, world.settings.enemies.profile(kind), path.start());
            if let Some(next) = path.get(1) {
                enemy.face(next);
            }
            world.enemies.push(enemy);
            out_events.push(Event::EnemySpawned { enemy: id, kind });
        }
        Command::MoveEnemy {
            enemy,
            position,
            target_waypoint,
        } => {
            let path_len = world.settings.path.len();
            let heading = world.settings.path.get(target_waypoint);
            if let Some(state) = world.enemy_mut(enemy) {
                state.target_waypoint = target_waypoint.max(state.target_waypoint).min(path_len);
                state.position = position;
                if let Some(next) = heading {
                    state.face(next);
                }
            }
        }
        Command::EscapeEnemy { enemy } => {
            if world.outcome.is_over() || world.remove_enemy(enemy).is_none() {
                return;
            }
            world.base_health = world.base_health.saturating_sub(1);
            out_events.push(Event::EnemyEscaped { enemy });
            out_events.push(Event::BaseDamaged {
                remaining: world.base_health,
            });
            if world.base_health == 0 {
                world.set_outcome(Outcome::Defeat, out_events);
            }
        }
        Command::LockTarget { turret, enemy } => {
            let Some(target) = world.enemy(enemy).map(|target| target.position) else {
                return;
            };
            if let Some(state) = world.turrets.get_mut(turret) {
                state.target = Some(enemy);
                if let Some(angle) = heading_degrees(state.position, target) {
                    state.angle = angle;
                }
                trace!(turret = turret.get(), enemy = enemy.get(), "new target locked");
                out_events.push(Event::TargetLocked { turret, enemy });
            }
        }
        Command::ReleaseTarget { turret } => {
            if let Some(enemy) = world
                .turrets
                .get_mut(turret)
                .and_then(|state| state.target.take())
            {
                trace!(turret = turret.get(), enemy = enemy.get(), "target lost");
                out_events.push(Event::TargetLost { turret, enemy });
            }
        }
        Command::FireTurret { turret } => world.fire(turret, out_events),
        Command::CollectBounties => world.collect_bounties(out_events),
        Command::PurchaseTurret { kind, tile } => world.purchase(kind, tile, out_events),
        Command::UpgradeTurret { turret } => world.upgrade(turret, out_events),
        Command::SelectTile { tile } => world.select(tile, out_events),
        Command::SetMultipliers { multipliers } => world.multipliers = multipliers,
        Command::DeclareVictory => world.set_outcome(Outcome::Victory, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use focus_defence_core::{
        EnemyView, Multipliers, Outcome, PathModel, TileCoord, TileMap, TurretCatalog, TurretId,
        TurretKind, TurretView,
    };

    use super::{Ledger, World};

    /// Captures a read-only view of the enemies on the path, in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed turrets, in construction order.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        let catalog = &world.settings.turrets;
        TurretView::from_snapshots(
            world
                .turrets
                .iter()
                .map(|turret| turret.snapshot(catalog))
                .collect(),
        )
    }

    /// Number of enemies currently on the path.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of turrets placed on the map.
    #[must_use]
    pub fn turret_count(world: &World) -> usize {
        world.turrets.len()
    }

    /// Money available for purchases and upgrades.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Money the world was created with.
    #[must_use]
    pub fn starting_money(world: &World) -> u32 {
        world.settings.starting_money
    }

    /// Escapes the base can still absorb.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.base_health
    }

    /// Current lifecycle state of the match.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.outcome
    }

    /// Reports whether the wave clock was started.
    #[must_use]
    pub fn waves_started(world: &World) -> bool {
        world.waves_started
    }

    /// Clock reading recorded by the latest tick.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Path walked by every enemy.
    #[must_use]
    pub fn path(world: &World) -> &PathModel {
        &world.settings.path
    }

    /// Grid of buildable tiles.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.settings.tiles
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub fn tile_size(world: &World) -> f32 {
        world.settings.tile_size
    }

    /// Turret stat table in use.
    #[must_use]
    pub fn turret_catalog(world: &World) -> &TurretCatalog {
        &world.settings.turrets
    }

    /// Multipliers applied to purchases and upgrades.
    #[must_use]
    pub fn multipliers(world: &World) -> Multipliers {
        world.multipliers
    }

    /// Price of buying a turret after multipliers.
    #[must_use]
    pub fn purchase_price(world: &World, kind: TurretKind) -> u32 {
        world
            .multipliers
            .purchase_price(world.settings.turrets.cost(kind))
    }

    /// Price of the turret's next upgrade after multipliers, if it can level up.
    #[must_use]
    pub fn upgrade_price(world: &World, turret: TurretId) -> Option<u32> {
        let state = world.turrets.get(turret)?;
        world
            .settings
            .turrets
            .upgrade_cost(state.kind, state.level)
            .map(|base| world.multipliers.upgrade_price(base))
    }

    /// Turret standing on the tile, if any.
    #[must_use]
    pub fn turret_at(world: &World, tile: TileCoord) -> Option<TurretId> {
        world.turrets.at_tile(tile).map(|turret| turret.id)
    }

    /// Tile currently selected by the player.
    #[must_use]
    pub fn selected_tile(world: &World) -> Option<TileCoord> {
        world.selected_tile
    }

    /// Turret standing on the selected tile, if any.
    #[must_use]
    pub fn selected_turret(world: &World) -> Option<TurretId> {
        world.selected_turret
    }

    /// Match statistics accumulated so far.
    #[must_use]
    pub fn ledger(world: &World) -> Ledger {
        world.ledger
    }
}
