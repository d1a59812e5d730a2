//! Session configuration loaded from TOML.

use std::time::Duration;

use focus_defence_core::{
    ConfigurationError, EnemyCatalog, EnemyKind, EnemyProfile, Multipliers, PathModel, TileMap,
    TurretCatalog, TurretKind, TurretSpec, TurretStats, BUILDABLE_TILE_ID, DEFAULT_LEVEL_LIMIT,
    DEFAULT_TILE_SIZE,
};
use focus_defence_system_waves::WaveSchedule;
use focus_defence_world::WorldSettings;
use glam::Vec2;
use serde::Deserialize;

const DEFAULT_LAYOUT: [&str; 10] = [
    "...............",
    "...............",
    "PPPPPPPP.......",
    ".......P.......",
    ".......P.......",
    ".......P.......",
    ".......P.......",
    ".......PPPPPPPP",
    "...............",
    "...............",
];

const DEFAULT_WAYPOINTS: [[f32; 2]; 4] = [[0.0, 120.0], [360.0, 120.0], [360.0, 360.0], [720.0, 360.0]];

/// Errors raised while loading a [`SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The document parsed but describes an unplayable level.
    #[error("invalid session config: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// Top-level session configuration. Every field falls back to the stock game.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Match length in seconds.
    pub game_duration_secs: u64,
    /// Money available at the start of the match.
    pub starting_money: u32,
    /// Escapes the base survives.
    pub base_health: u32,
    /// Highest level turrets may reach.
    pub level_limit: u8,
    /// Wave cadence.
    pub waves: WavesConfig,
    /// Town bonuses applied to the match.
    pub multipliers: Multipliers,
    /// Map geometry.
    pub level: LevelConfig,
    /// Turret table overrides.
    pub turrets: TurretsConfig,
    /// Enemy table overrides.
    pub enemies: EnemiesConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game_duration_secs: 300,
            starting_money: 200,
            base_health: 10,
            level_limit: DEFAULT_LEVEL_LIMIT,
            waves: WavesConfig::default(),
            multipliers: Multipliers::default(),
            level: LevelConfig::default(),
            turrets: TurretsConfig::default(),
            enemies: EnemiesConfig::default(),
        }
    }
}

/// Wave cadence in milliseconds.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WavesConfig {
    /// Delay before the first wave.
    pub initial_delay_ms: u64,
    /// Time between the starts of consecutive waves.
    pub wave_interval_ms: u64,
    /// Time between spawns within a wave.
    pub spawn_delay_ms: u64,
}

impl Default for WavesConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5_000,
            wave_interval_ms: 30_000,
            spawn_delay_ms: 500,
        }
    }
}

/// Map geometry: tile grid and enemy path.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Tile side length in pixels.
    pub tile_size: f32,
    /// Rows of the tile grid; `.` marks buildable ground.
    pub layout: Vec<String>,
    /// Raw Tiled layer; takes precedence over `layout` when present.
    pub tile_ids: Option<TileIdsConfig>,
    /// Path waypoints as `[x, y]` pixel pairs.
    pub waypoints: Vec<[f32; 2]>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            layout: DEFAULT_LAYOUT.iter().map(|row| (*row).to_owned()).collect(),
            tile_ids: None,
            waypoints: DEFAULT_WAYPOINTS.to_vec(),
        }
    }
}

/// Row-major tile ids exported by the Tiled editor.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileIdsConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Tile ids, `columns * rows` entries.
    pub ids: Vec<u32>,
    /// Id marking buildable ground.
    #[serde(default = "default_buildable_id")]
    pub buildable_id: u32,
}

fn default_buildable_id() -> u32 {
    BUILDABLE_TILE_ID
}

/// Optional per-kind turret overrides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurretsConfig {
    /// Shortbow override.
    pub shortbow: Option<TurretConfig>,
    /// Longbow override.
    pub longbow: Option<TurretConfig>,
    /// Mortar override.
    pub mortar: Option<TurretConfig>,
}

/// Price and levels of one turret kind.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurretConfig {
    /// Purchase price.
    pub cost: u32,
    /// Level entries, level 1 first.
    pub levels: Vec<TurretLevelConfig>,
}

/// Statistics of one turret level.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurretLevelConfig {
    /// Range in pixels.
    pub range: f32,
    /// Cooldown in milliseconds.
    pub cooldown_ms: u64,
    /// Damage per shot.
    pub damage: u32,
    /// Splash radius in pixels.
    #[serde(default)]
    pub splash_radius: f32,
    /// Price of upgrading into this level.
    #[serde(default)]
    pub upgrade_cost: Option<u32>,
}

/// Optional per-kind enemy overrides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemiesConfig {
    /// Goblin override.
    pub goblin: Option<EnemyConfig>,
    /// Troll override.
    pub troll: Option<EnemyConfig>,
    /// Giant override.
    pub giant: Option<EnemyConfig>,
}

/// Profile of one enemy kind.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyConfig {
    /// Sprite sheet name; defaults to the kind's label.
    pub sprite: Option<String>,
    /// Spawn health.
    pub max_health: u32,
    /// Speed in pixels per second.
    pub speed: f32,
    /// Bounty.
    pub reward: u32,
}

/// Validated pieces needed to build a session.
#[derive(Clone, Debug)]
pub struct SessionParts {
    /// Level and starting resources.
    pub settings: WorldSettings,
    /// Wave cadence and match length.
    pub schedule: WaveSchedule,
    /// Town bonuses.
    pub multipliers: Multipliers,
}

impl SessionConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Validates the configuration and resolves defaults.
    pub fn build(&self) -> Result<SessionParts, ConfigError> {
        let level = &self.level;
        if !level.tile_size.is_finite() || level.tile_size <= 0.0 {
            return Err(ConfigurationError::InvalidTileSize.into());
        }

        let tiles = match &level.tile_ids {
            Some(raw) => TileMap::from_tile_ids(raw.columns, raw.rows, &raw.ids, raw.buildable_id)?,
            None => TileMap::from_layout(level.layout.as_slice())?,
        };
        let path = PathModel::new(
            level
                .waypoints
                .iter()
                .map(|[x, y]| Vec2::new(*x, *y))
                .collect(),
        )?;

        let settings = WorldSettings {
            path,
            tiles,
            tile_size: level.tile_size,
            turrets: self.turret_catalog()?,
            enemies: self.enemy_catalog()?,
            starting_money: self.starting_money,
            base_health: self.base_health,
        };
        let schedule = WaveSchedule {
            initial_delay: Duration::from_millis(self.waves.initial_delay_ms),
            wave_interval: Duration::from_millis(self.waves.wave_interval_ms),
            spawn_delay: Duration::from_millis(self.waves.spawn_delay_ms),
            game_duration: Duration::from_secs(self.game_duration_secs),
        };

        Ok(SessionParts {
            settings,
            schedule,
            multipliers: self.multipliers,
        })
    }

    fn turret_catalog(&self) -> Result<TurretCatalog, ConfigurationError> {
        let stock = TurretCatalog::default();
        let spec = |kind: TurretKind, custom: &Option<TurretConfig>| match custom {
            None => stock.spec(kind).clone(),
            Some(custom) => TurretSpec {
                cost: custom.cost,
                levels: custom
                    .levels
                    .iter()
                    .map(|level| TurretStats {
                        range: level.range,
                        cooldown: Duration::from_millis(level.cooldown_ms),
                        damage: level.damage,
                        splash_radius: level.splash_radius,
                        upgrade_cost: level.upgrade_cost,
                    })
                    .collect(),
            },
        };
        TurretCatalog::new(
            [
                spec(TurretKind::Shortbow, &self.turrets.shortbow),
                spec(TurretKind::Longbow, &self.turrets.longbow),
                spec(TurretKind::Mortar, &self.turrets.mortar),
            ],
            self.level_limit,
        )
    }

    fn enemy_catalog(&self) -> Result<EnemyCatalog, ConfigurationError> {
        let stock = EnemyCatalog::default();
        let profile = |kind: EnemyKind, custom: &Option<EnemyConfig>| match custom {
            None => stock.profile(kind).clone(),
            Some(custom) => EnemyProfile {
                sprite: custom
                    .sprite
                    .clone()
                    .unwrap_or_else(|| kind.label().to_owned()),
                max_health: custom.max_health,
                speed: custom.speed,
                reward: custom.reward,
            },
        };
        EnemyCatalog::new([
            profile(EnemyKind::Goblin, &self.enemies.goblin),
            profile(EnemyKind::Troll, &self.enemies.troll),
            profile(EnemyKind::Giant, &self.enemies.giant),
        ])
    }
}
