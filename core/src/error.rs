use serde::{Deserialize, Serialize};

use crate::{EnemyKind, TurretKind};

/// Fatal problems detected while loading levels and stat tables.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// The path needs a start and an end.
    #[error("path requires at least 2 waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints that were supplied.
        count: usize,
    },
    /// A waypoint contained NaN or infinite coordinates.
    #[error("waypoint {index} is not a finite point")]
    NonFiniteWaypoint {
        /// Position of the offending waypoint.
        index: usize,
    },
    /// A turret kind lacks statistics for a reachable level.
    #[error("no {} stats for level {level}", .kind.label())]
    MissingTurretStats {
        /// Turret kind with the gap.
        kind: TurretKind,
        /// Level that has no entry.
        level: u8,
    },
    /// A reachable level carries no upgrade price.
    #[error("{} level {level} has no upgrade cost", .kind.label())]
    MissingUpgradeCost {
        /// Turret kind with the gap.
        kind: TurretKind,
        /// Level whose upgrade price is missing.
        level: u8,
    },
    /// A level entry carries a negative or non-finite range.
    #[error("{} level {level} has an invalid range", .kind.label())]
    InvalidRange {
        /// Turret kind with the bad entry.
        kind: TurretKind,
        /// Level of the bad entry.
        level: u8,
    },
    /// Turrets must be allowed at least one level.
    #[error("level limit must be at least 1, got {limit}")]
    InvalidLevelLimit {
        /// Configured limit.
        limit: u8,
    },
    /// Enemies must spawn with some health.
    #[error("{} must have a non-zero max health", .kind.label())]
    ZeroMaxHealth {
        /// Enemy kind with the bad profile.
        kind: EnemyKind,
    },
    /// Enemies must move forward.
    #[error("{} must have a positive finite speed", .kind.label())]
    InvalidSpeed {
        /// Enemy kind with the bad profile.
        kind: EnemyKind,
    },
    /// Layout rows must share a width.
    #[error("layout row {row} has {actual} tiles, expected {expected}")]
    RaggedLayout {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// Raw tile ids must fill the grid exactly.
    #[error("expected {expected} tile ids, got {actual}")]
    TileCountMismatch {
        /// `columns * rows`.
        expected: usize,
        /// Number of ids supplied.
        actual: usize,
    },
    /// Tiles must have a positive finite size.
    #[error("tile size must be positive")]
    InvalidTileSize,
}

/// Reasons a player action was refused. The world is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum ActionError {
    /// Not enough money for the action.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientResources {
        /// Price of the action after multipliers.
        required: u32,
        /// Money available at the time of the request.
        available: u32,
    },
    /// The tile is blocked or outside the map.
    #[error("tile is not buildable")]
    NotBuildable,
    /// Another turret already stands on the tile.
    #[error("tile is already occupied")]
    TileOccupied,
    /// The turret reached the level limit.
    #[error("turret is already at the maximum level")]
    MaxLevel,
    /// No turret with the requested identifier exists.
    #[error("unknown turret")]
    UnknownTurret,
    /// The match has already been won or lost.
    #[error("session has ended")]
    SessionEnded,
}
