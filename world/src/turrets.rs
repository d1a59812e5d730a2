//! Authoritative turret state management utilities.

use std::time::Duration;

use glam::Vec2;

use focus_defence_core::{
    EnemyId, Multipliers, TileCoord, TurretCatalog, TurretId, TurretKind, TurretSnapshot,
    DEFAULT_TURRET_FACING,
};

/// Turret stored inside the world with its multiplier-adjusted statistics.
#[derive(Clone, Debug)]
pub(crate) struct Turret {
    pub(crate) id: TurretId,
    pub(crate) kind: TurretKind,
    pub(crate) tile: TileCoord,
    pub(crate) position: Vec2,
    pub(crate) level: u8,
    pub(crate) range: f32,
    pub(crate) cooldown: Duration,
    pub(crate) damage: u32,
    pub(crate) splash_radius: f32,
    pub(crate) last_shot: Duration,
    pub(crate) target: Option<EnemyId>,
    pub(crate) angle: f32,
}

impl Turret {
    fn refresh_stats(&mut self, catalog: &TurretCatalog, multipliers: &Multipliers) {
        let stats = catalog.stats(self.kind, self.level);
        self.range = stats.range;
        self.cooldown = multipliers.scaled_cooldown(stats.cooldown);
        self.damage = multipliers.scaled_damage(stats.damage);
        self.splash_radius = stats.splash_radius;
    }

    /// Advances one level and reloads the level's statistics.
    ///
    /// Returns `false` without touching the turret at the level limit.
    pub(crate) fn upgrade(&mut self, catalog: &TurretCatalog, multipliers: &Multipliers) -> bool {
        if self.level >= catalog.level_limit() {
            return false;
        }
        self.level += 1;
        self.refresh_stats(catalog, multipliers);
        true
    }

    pub(crate) fn snapshot(&self, catalog: &TurretCatalog) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            position: self.position,
            level: self.level,
            range: self.range,
            cooldown: self.cooldown,
            damage: self.damage,
            splash_radius: self.splash_radius,
            last_shot: self.last_shot,
            target: self.target,
            angle: self.angle,
            upgrade_cost: catalog.upgrade_cost(self.kind, self.level),
        }
    }
}

/// Registry that stores turrets and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TurretRegistry {
    entries: Vec<Turret>,
    next_turret_id: TurretId,
}

impl TurretRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_turret_id: TurretId::new(0),
        }
    }

    /// Builds a level 1 turret; its cooldown starts counting at `now`.
    pub(crate) fn insert(
        &mut self,
        kind: TurretKind,
        tile: TileCoord,
        tile_size: f32,
        now: Duration,
        catalog: &TurretCatalog,
        multipliers: &Multipliers,
    ) -> TurretId {
        let id = self.next_turret_id;
        self.next_turret_id = TurretId::new(id.get().saturating_add(1));
        let mut turret = Turret {
            id,
            kind,
            tile,
            position: tile.center(tile_size),
            level: 1,
            range: 0.0,
            cooldown: Duration::ZERO,
            damage: 0,
            splash_radius: 0.0,
            last_shot: now,
            target: None,
            angle: DEFAULT_TURRET_FACING,
        };
        turret.refresh_stats(catalog, multipliers);
        self.entries.push(turret);
        id
    }

    pub(crate) fn get(&self, id: TurretId) -> Option<&Turret> {
        self.entries.iter().find(|turret| turret.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TurretId) -> Option<&mut Turret> {
        self.entries.iter_mut().find(|turret| turret.id == id)
    }

    pub(crate) fn at_tile(&self, tile: TileCoord) -> Option<&Turret> {
        self.entries.iter().find(|turret| turret.tile == tile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Turret> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clears every target lock held on `enemy`.
    pub(crate) fn forget_enemy(&mut self, enemy: EnemyId) {
        for turret in &mut self.entries {
            if turret.target == Some(enemy) {
                turret.target = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_shortbow(multipliers: &Multipliers) -> (TurretRegistry, TurretId) {
        let mut registry = TurretRegistry::new();
        let id = registry.insert(
            TurretKind::Shortbow,
            TileCoord::new(1, 2),
            48.0,
            Duration::from_secs(3),
            &TurretCatalog::default(),
            multipliers,
        );
        (registry, id)
    }

    #[test]
    fn new_turret_sits_on_its_tile_centre() {
        let (registry, id) = registry_with_shortbow(&Multipliers::default());
        let turret = registry.get(id).unwrap();
        assert_eq!(turret.position, Vec2::new(72.0, 120.0));
        assert_eq!(turret.last_shot, Duration::from_secs(3));
        assert_eq!(turret.angle, DEFAULT_TURRET_FACING);
        assert_eq!(registry.at_tile(TileCoord::new(1, 2)).map(|t| t.id), Some(id));
    }

    #[test]
    fn upgrade_refreshes_damage_with_multipliers() {
        let multipliers = Multipliers {
            damage: 2.0,
            cooldown: 0.5,
            ..Multipliers::default()
        };
        let catalog = TurretCatalog::default();
        let (mut registry, id) = registry_with_shortbow(&multipliers);
        let turret = registry.get_mut(id).unwrap();
        assert_eq!(turret.damage, 50);

        assert!(turret.upgrade(&catalog, &multipliers));
        assert_eq!(turret.level, 2);
        assert_eq!(turret.damage, 60);
        assert_eq!(turret.cooldown, Duration::from_millis(425));
        assert_eq!(turret.range, 140.0);

        assert!(!turret.upgrade(&catalog, &multipliers));
        assert_eq!(turret.level, 2);
    }

    #[test]
    fn identifiers_are_allocated_in_order() {
        let (mut registry, first) = registry_with_shortbow(&Multipliers::default());
        let second = registry.insert(
            TurretKind::Mortar,
            TileCoord::new(0, 0),
            48.0,
            Duration::ZERO,
            &TurretCatalog::default(),
            &Multipliers::default(),
        );
        assert!(first < second);
        assert_eq!(registry.len(), 2);
    }
}
