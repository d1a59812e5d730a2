//! Static level geometry: the enemy path and the buildable tile grid.

use glam::Vec2;

use crate::{ConfigurationError, TileCoord};

/// Tile id marking buildable ground in Tiled exports.
pub const BUILDABLE_TILE_ID: u32 = 43;

/// Ordered, immutable list of waypoints enemies walk along.
#[derive(Clone, Debug, PartialEq)]
pub struct PathModel {
    waypoints: Vec<Vec2>,
}

impl PathModel {
    /// Validates the waypoint list. Insertion order defines walking direction.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, ConfigurationError> {
        if waypoints.len() < 2 {
            return Err(ConfigurationError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        if let Some(index) = waypoints.iter().position(|point| !point.is_finite()) {
            return Err(ConfigurationError::NonFiniteWaypoint { index });
        }
        Ok(Self { waypoints })
    }

    /// All waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Number of waypoints; always at least 2.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Spawn point of every enemy.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Waypoint at `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }
}

/// Rectangular grid recording which tiles accept turrets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    buildable: Vec<bool>,
}

impl TileMap {
    /// Builds a map from text rows where `.` marks buildable ground.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigurationError> {
        let expected = rows
            .first()
            .map_or(0, |row| row.as_ref().chars().count());
        let mut buildable = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != expected {
                return Err(ConfigurationError::RaggedLayout {
                    row: index,
                    expected,
                    actual,
                });
            }
            buildable.extend(row.chars().map(|glyph| glyph == '.'));
        }
        Ok(Self {
            columns: expected as u32,
            rows: rows.len() as u32,
            buildable,
        })
    }

    /// Builds a map from row-major tile ids; `buildable_id` marks buildable ground.
    pub fn from_tile_ids(
        columns: u32,
        rows: u32,
        ids: &[u32],
        buildable_id: u32,
    ) -> Result<Self, ConfigurationError> {
        let expected = columns as usize * rows as usize;
        if ids.len() != expected {
            return Err(ConfigurationError::TileCountMismatch {
                expected,
                actual: ids.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            buildable: ids.iter().map(|id| *id == buildable_id).collect(),
        })
    }

    /// Map on which every tile is buildable.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            buildable: vec![true; columns as usize * rows as usize],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the tile lies inside the map and accepts turrets.
    #[must_use]
    pub fn is_buildable(&self, tile: TileCoord) -> bool {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return false;
        }
        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        self.buildable.get(index).copied().unwrap_or(false)
    }

    /// Every buildable tile in row-major order.
    pub fn buildable_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns.max(1);
        self.buildable
            .iter()
            .enumerate()
            .filter(|(_, buildable)| **buildable)
            .map(move |(index, _)| {
                TileCoord::new(index as u32 % columns, index as u32 / columns)
            })
    }
}
