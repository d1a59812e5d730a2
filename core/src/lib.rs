#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Focus Defence simulation.
//!
//! This crate defines the message surface that connects the session
//! orchestrator, the authoritative world, and pure systems. The session submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

mod catalog;
mod error;
mod path;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use catalog::{
    EnemyCatalog, EnemyKind, EnemyProfile, Multipliers, TurretCatalog, TurretKind, TurretSpec,
    TurretStats, DEFAULT_LEVEL_LIMIT,
};
pub use error::{ActionError, ConfigurationError};
pub use path::{PathModel, TileMap, BUILDABLE_TILE_ID};

/// Side length of a single square tile measured in pixels.
pub const DEFAULT_TILE_SIZE: f32 = 48.0;

/// Facing angle assigned to turrets that have never aimed at anything.
pub const DEFAULT_TURRET_FACING: f32 = 90.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Clock reading after the tick, used for cooldown bookkeeping.
        now: Duration,
    },
    /// Requests that the wave clock begins running.
    StartWaves,
    /// Requests that a new enemy enters the path at its first waypoint.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Records the outcome of an enemy advancing along the path.
    MoveEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Position reached after the move, in pixels.
        position: Vec2,
        /// Index of the waypoint the enemy is now heading towards.
        target_waypoint: usize,
    },
    /// Reports that an enemy ran past the final waypoint.
    EscapeEnemy {
        /// Identifier of the escaping enemy.
        enemy: EnemyId,
    },
    /// Locks a turret onto an enemy.
    LockTarget {
        /// Turret acquiring the target.
        turret: TurretId,
        /// Enemy that becomes the turret's target.
        enemy: EnemyId,
    },
    /// Drops the current target of a turret because it left range.
    ReleaseTarget {
        /// Turret losing its target.
        turret: TurretId,
    },
    /// Fires a turret at its current target.
    FireTurret {
        /// Turret that shoots.
        turret: TurretId,
    },
    /// Removes every enemy whose health dropped to zero and pays its reward.
    CollectBounties,
    /// Requests construction of a turret on a tile.
    PurchaseTurret {
        /// Kind of turret to build.
        kind: TurretKind,
        /// Tile the turret should occupy.
        tile: TileCoord,
    },
    /// Requests that a turret advances to its next level.
    UpgradeTurret {
        /// Turret to upgrade.
        turret: TurretId,
    },
    /// Changes the tile selected by the player.
    SelectTile {
        /// Newly selected tile, or `None` to clear the selection.
        tile: Option<TileCoord>,
    },
    /// Replaces the economy multipliers used by future purchases and upgrades.
    SetMultipliers {
        /// Multipliers supplied by the town layer.
        multipliers: Multipliers,
    },
    /// Ends the match in the defender's favour.
    DeclareVictory,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Clock reading after the tick.
        now: Duration,
    },
    /// Announces that the wave clock started running.
    WavesStarted,
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy reached the end of the path and was removed.
    EnemyEscaped {
        /// Identifier of the escaped enemy.
        enemy: EnemyId,
    },
    /// Reports that the base lost health because of an escape.
    BaseDamaged {
        /// Base health left after the hit.
        remaining: u32,
    },
    /// Reports that a turret locked onto a new target.
    TargetLocked {
        /// Turret that acquired the target.
        turret: TurretId,
        /// Enemy that became the target.
        enemy: EnemyId,
    },
    /// Reports that a turret's target left its range.
    TargetLost {
        /// Turret that lost its target.
        turret: TurretId,
        /// Enemy that was previously targeted.
        enemy: EnemyId,
    },
    /// Confirms that a turret fired at its target.
    TurretFired {
        /// Turret that fired.
        turret: TurretId,
        /// Kind of the firing turret.
        kind: TurretKind,
        /// Primary target of the shot.
        target: EnemyId,
        /// Number of additional enemies caught by splash damage.
        splash_hits: u32,
    },
    /// Reports that an enemy died and its bounty was paid.
    EnemyKilled {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Kind of the dead enemy.
        kind: EnemyKind,
        /// Money granted for the kill.
        reward: u32,
    },
    /// Confirms that a turret was bought and placed.
    TurretPurchased {
        /// Identifier assigned to the new turret.
        turret: TurretId,
        /// Kind of turret that was built.
        kind: TurretKind,
        /// Tile occupied by the turret.
        tile: TileCoord,
        /// Money deducted for the purchase.
        cost: u32,
    },
    /// Confirms that a turret advanced a level.
    TurretUpgraded {
        /// Turret that was upgraded.
        turret: TurretId,
        /// Level reached after the upgrade.
        level: u8,
        /// Money deducted for the upgrade.
        cost: u32,
    },
    /// Reports that a player action was rejected without side effects.
    ActionRejected {
        /// Action that was attempted.
        action: Action,
        /// Specific reason the action failed.
        reason: ActionError,
    },
    /// Reports the new tile selection.
    TileSelected {
        /// Selected tile, if any.
        tile: Option<TileCoord>,
        /// Turret standing on the selected tile, if any.
        turret: Option<TurretId>,
    },
    /// Announces that the match reached a terminal outcome.
    OutcomeChanged {
        /// Outcome that became active.
        outcome: Outcome,
    },
}

/// Player actions that can be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Purchase of a turret on a tile.
    Purchase {
        /// Requested turret kind.
        kind: TurretKind,
        /// Requested tile.
        tile: TileCoord,
    },
    /// Upgrade of an existing turret.
    Upgrade {
        /// Turret the player tried to upgrade.
        turret: TurretId,
    },
}

/// Lifecycle of a single defence match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The match is still being played.
    #[default]
    InProgress,
    /// The base ran out of health.
    Defeat,
    /// The match clock ran out with every enemy dealt with.
    Victory,
}

impl Outcome {
    /// Reports whether the match reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the turret identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Pixel coordinates of the tile centre.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * tile_size,
            (self.row as f32 + 0.5) * tile_size,
        )
    }

    /// Resolves the tile containing the provided pixel position.
    ///
    /// Negative or non-finite coordinates resolve to `None`.
    #[must_use]
    pub fn containing(position: Vec2, tile_size: f32) -> Option<Self> {
        if tile_size <= 0.0 || !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let column = (position.x / tile_size).floor() as u32;
        let row = (position.y / tile_size).floor() as u32;
        Some(Self::new(column, row))
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current position in pixels.
    pub position: Vec2,
    /// Index of the waypoint the enemy is heading towards.
    pub target_waypoint: usize,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Current health; may be negative until bounties are collected.
    pub health: i32,
    /// Health the enemy spawned with.
    pub max_health: u32,
    /// Money granted when the enemy dies.
    pub reward: u32,
    /// Heading towards the next waypoint in degrees, for rendering.
    pub angle: f32,
}

impl EnemySnapshot {
    /// Fraction of health left, clamped to `0.0..=1.0` for health bars.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Reports whether the enemy has been killed but not yet collected.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Read-only snapshot describing all enemies on the path.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Identifiers are allocated monotonically, so ordering by identifier
    /// reproduces spawn order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single enemy by identifier.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single turret's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret by the world.
    pub id: TurretId,
    /// Kind of turret that was built.
    pub kind: TurretKind,
    /// Tile occupied by the turret.
    pub tile: TileCoord,
    /// Pixel position of the turret centre.
    pub position: Vec2,
    /// Current level, starting at 1.
    pub level: u8,
    /// Targeting range in pixels.
    pub range: f32,
    /// Minimum time between two shots.
    pub cooldown: Duration,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Radius of splash damage around the primary target; zero disables it.
    pub splash_radius: f32,
    /// Clock reading of the last shot (or of construction).
    pub last_shot: Duration,
    /// Enemy currently targeted, if any.
    pub target: Option<EnemyId>,
    /// Facing angle in degrees, for rendering.
    pub angle: f32,
    /// Base cost of the next upgrade, or `None` at the level limit.
    pub upgrade_cost: Option<u32>,
}

impl TurretSnapshot {
    /// Reports whether the cooldown elapsed at the provided clock reading.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_shot) > self.cooldown
    }
}

/// Read-only snapshot describing all turrets placed on the map.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single turret by identifier.
    #[must_use]
    pub fn get(&self, turret: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots
            .binary_search_by_key(&turret, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

/// Monotonic time source used for cooldown and match-time bookkeeping.
pub trait Clock {
    /// Informs the clock that the simulation advanced by `dt`.
    ///
    /// Wall-clock implementations may ignore this.
    fn advance(&mut self, dt: Duration);

    /// Current clock reading measured from an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Clock driven exclusively by simulation ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulatedClock {
    now: Duration,
}

impl SimulatedClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }
}

impl Clock for SimulatedClock {
    fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    fn now(&self) -> Duration {
        self.now
    }
}

/// Fire-and-forget sound triggers raised by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Shortbow turret shot.
    BowShot,
    /// Longbow turret shot.
    LongbowShot,
    /// Mortar shell impact.
    MortarExplosion,
    /// Turret bought.
    Purchase,
    /// Turret upgraded.
    Upgrade,
    /// Enemy slipped past the defences.
    EnemyEscape,
    /// Base destroyed.
    GameOver,
    /// Match won.
    Victory,
}

impl AudioCue {
    /// Name of the sound asset associated with the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BowShot => "bow_shot",
            Self::LongbowShot => "longbow_shot",
            Self::MortarExplosion => "mortar_explosion",
            Self::Purchase => "purchase",
            Self::Upgrade => "upgrade",
            Self::EnemyEscape => "enemy_escape",
            Self::GameOver => "game_over",
            Self::Victory => "victory",
        }
    }

    /// Derives the cue, if any, that accompanies a world event.
    ///
    /// A fatal escape reports `BaseDamaged { remaining: 0 }` followed by
    /// [`Outcome::Defeat`]; only the latter produces a cue.
    #[must_use]
    pub const fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::TurretFired { kind, .. } => Some(match kind {
                TurretKind::Shortbow => Self::BowShot,
                TurretKind::Longbow => Self::LongbowShot,
                TurretKind::Mortar => Self::MortarExplosion,
            }),
            Event::TurretPurchased { .. } => Some(Self::Purchase),
            Event::TurretUpgraded { .. } => Some(Self::Upgrade),
            Event::BaseDamaged { remaining } if *remaining > 0 => Some(Self::EnemyEscape),
            Event::OutcomeChanged {
                outcome: Outcome::Defeat,
            } => Some(Self::GameOver),
            Event::OutcomeChanged {
                outcome: Outcome::Victory,
            } => Some(Self::Victory),
            _ => None,
        }
    }
}

/// Consumer of audio cues; playback must never block the simulation.
pub trait AudioSink {
    /// Triggers playback of the provided cue.
    fn play(&mut self, cue: AudioCue);
}

/// Audio sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

#[cfg(test)]
mod tests {
    use super::{
        AudioCue, Clock, EnemyId, EnemyKind, EnemySnapshot, Event, Outcome, SimulatedClock,
        TileCoord, TurretId, TurretKind, TurretSnapshot,
    };
    use glam::Vec2;
    use std::time::Duration;

    fn enemy(health: i32, max_health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(1),
            kind: EnemyKind::Goblin,
            position: Vec2::ZERO,
            target_waypoint: 1,
            speed: 120.0,
            health,
            max_health,
            reward: 10,
            angle: 0.0,
        }
    }

    #[test]
    fn tile_center_sits_half_a_tile_in() {
        let center = TileCoord::new(2, 3).center(48.0);
        assert_eq!(center, Vec2::new(120.0, 168.0));
    }

    #[test]
    fn containing_tile_floors_pixel_coordinates() {
        assert_eq!(
            TileCoord::containing(Vec2::new(100.0, 47.9), 48.0),
            Some(TileCoord::new(2, 0))
        );
        assert_eq!(TileCoord::containing(Vec2::new(-1.0, 5.0), 48.0), None);
    }

    #[test]
    fn health_ratio_is_clamped() {
        assert!((enemy(25, 50).health_ratio() - 0.5).abs() < f32::EPSILON);
        assert_eq!(enemy(-10, 50).health_ratio(), 0.0);
        assert!(enemy(0, 50).is_dead());
    }

    #[test]
    fn cooldown_requires_strictly_more_time_than_configured() {
        let turret = TurretSnapshot {
            id: TurretId::new(0),
            kind: TurretKind::Shortbow,
            tile: TileCoord::new(0, 0),
            position: Vec2::ZERO,
            level: 1,
            range: 130.0,
            cooldown: Duration::from_millis(1_000),
            damage: 25,
            splash_radius: 0.0,
            last_shot: Duration::from_millis(500),
            target: None,
            angle: 90.0,
            upgrade_cost: Some(120),
        };
        assert!(!turret.is_ready(Duration::from_millis(1_500)));
        assert!(turret.is_ready(Duration::from_millis(1_501)));
        assert!(!turret.is_ready(Duration::ZERO));
    }

    #[test]
    fn simulated_clock_accumulates_ticks() {
        let mut clock = SimulatedClock::new();
        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(17));
        assert_eq!(clock.now(), Duration::from_millis(33));
    }

    #[test]
    fn fatal_escape_only_plays_game_over() {
        assert_eq!(
            AudioCue::for_event(&Event::BaseDamaged { remaining: 3 }),
            Some(AudioCue::EnemyEscape)
        );
        assert_eq!(AudioCue::for_event(&Event::BaseDamaged { remaining: 0 }), None);
        assert_eq!(
            AudioCue::for_event(&Event::OutcomeChanged {
                outcome: Outcome::Defeat
            }),
            Some(AudioCue::GameOver)
        );
        assert_eq!(AudioCue::GameOver.name(), "game_over");
    }
}
