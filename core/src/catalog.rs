//! Stat tables for turrets and enemies together with the economy multipliers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Highest level a turret may reach unless configured otherwise.
pub const DEFAULT_LEVEL_LIMIT: u8 = 2;

/// Kinds of turrets that can be purchased.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretKind {
    /// Cheap short-range archer.
    Shortbow,
    /// Slow long-range archer.
    Longbow,
    /// Artillery dealing splash damage.
    Mortar,
}

impl TurretKind {
    /// Every turret kind in catalog order.
    pub const ALL: [Self; 3] = [Self::Shortbow, Self::Longbow, Self::Mortar];

    /// Position of the kind inside fixed-size tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Shortbow => 0,
            Self::Longbow => 1,
            Self::Mortar => 2,
        }
    }

    /// Lowercase label used in logs and configuration files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shortbow => "shortbow",
            Self::Longbow => "longbow",
            Self::Mortar => "mortar",
        }
    }
}

/// Kinds of enemies that walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fast and fragile.
    Goblin,
    /// Medium speed and health.
    Troll,
    /// Slow and tough.
    Giant,
}

impl EnemyKind {
    /// Every enemy kind in catalog order.
    pub const ALL: [Self; 3] = [Self::Goblin, Self::Troll, Self::Giant];

    /// Position of the kind inside fixed-size tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Goblin => 0,
            Self::Troll => 1,
            Self::Giant => 2,
        }
    }

    /// Lowercase label used in logs and configuration files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Goblin => "goblin",
            Self::Troll => "troll",
            Self::Giant => "giant",
        }
    }
}

/// Combat statistics of a turret at one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretStats {
    /// Targeting range in pixels.
    pub range: f32,
    /// Minimum time between shots.
    pub cooldown: Duration,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Splash radius in pixels; zero disables splash damage.
    pub splash_radius: f32,
    /// Price of upgrading into this level, if the level can be reached.
    pub upgrade_cost: Option<u32>,
}

impl TurretStats {
    const fn new(
        range: f32,
        cooldown_ms: u64,
        damage: u32,
        splash_radius: f32,
        upgrade_cost: Option<u32>,
    ) -> Self {
        Self {
            range,
            cooldown: Duration::from_millis(cooldown_ms),
            damage,
            splash_radius,
            upgrade_cost,
        }
    }
}

/// Purchase price and per-level statistics of one turret kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TurretSpec {
    /// Base purchase price before multipliers.
    pub cost: u32,
    /// Statistics for level 1, 2, and so on.
    pub levels: Vec<TurretStats>,
}

/// Validated turret stat table indexed by kind and level.
#[derive(Clone, Debug, PartialEq)]
pub struct TurretCatalog {
    specs: [TurretSpec; 3],
    level_limit: u8,
}

impl TurretCatalog {
    /// Validates and wraps the provided per-kind specifications.
    ///
    /// `specs` is indexed by [`TurretKind::index`]. Every kind must provide
    /// statistics up to `level_limit`, and each level above the first must
    /// carry the cost of upgrading into it.
    pub fn new(specs: [TurretSpec; 3], level_limit: u8) -> Result<Self, ConfigurationError> {
        if level_limit == 0 {
            return Err(ConfigurationError::InvalidLevelLimit { limit: level_limit });
        }

        for kind in TurretKind::ALL {
            let spec = &specs[kind.index()];
            if spec.levels.len() < usize::from(level_limit) {
                return Err(ConfigurationError::MissingTurretStats {
                    kind,
                    level: spec.levels.len() as u8 + 1,
                });
            }
            for (index, stats) in spec.levels.iter().enumerate() {
                if !stats.range.is_finite() || stats.range < 0.0 {
                    return Err(ConfigurationError::InvalidRange {
                        kind,
                        level: index as u8 + 1,
                    });
                }
            }
            for level in 2..=level_limit {
                if spec.levels[usize::from(level) - 1].upgrade_cost.is_none() {
                    return Err(ConfigurationError::MissingUpgradeCost { kind, level });
                }
            }
        }

        Ok(Self { specs, level_limit })
    }

    /// Highest level any turret may reach.
    #[must_use]
    pub const fn level_limit(&self) -> u8 {
        self.level_limit
    }

    /// Price and level table of a turret kind.
    #[must_use]
    pub fn spec(&self, kind: TurretKind) -> &TurretSpec {
        &self.specs[kind.index()]
    }

    /// Base purchase price of a turret kind.
    #[must_use]
    pub fn cost(&self, kind: TurretKind) -> u32 {
        self.specs[kind.index()].cost
    }

    /// Statistics of a turret kind at the given level, clamped to the valid range.
    #[must_use]
    pub fn stats(&self, kind: TurretKind, level: u8) -> &TurretStats {
        let level = level.clamp(1, self.level_limit);
        &self.specs[kind.index()].levels[usize::from(level) - 1]
    }

    /// Base price of advancing from `level` to the next one.
    ///
    /// Returns `None` once the level limit is reached.
    #[must_use]
    pub fn upgrade_cost(&self, kind: TurretKind, level: u8) -> Option<u32> {
        if level >= self.level_limit {
            return None;
        }
        self.stats(kind, level.saturating_add(1)).upgrade_cost
    }
}

impl Default for TurretCatalog {
    fn default() -> Self {
        let shortbow = TurretSpec {
            cost: 100,
            levels: vec![
                TurretStats::new(130.0, 1_000, 25, 0.0, Some(80)),
                TurretStats::new(140.0, 850, 30, 0.0, Some(120)),
                TurretStats::new(150.0, 700, 35, 0.0, None),
            ],
        };
        let longbow = TurretSpec {
            cost: 150,
            levels: vec![
                TurretStats::new(250.0, 2_500, 60, 0.0, Some(120)),
                TurretStats::new(350.0, 2_300, 75, 0.0, Some(180)),
                TurretStats::new(450.0, 2_100, 90, 0.0, None),
            ],
        };
        let mortar = TurretSpec {
            cost: 200,
            levels: vec![
                TurretStats::new(150.0, 1_500, 30, 50.0, Some(150)),
                TurretStats::new(155.0, 1_350, 35, 55.0, Some(200)),
                TurretStats::new(160.0, 1_200, 40, 60.0, None),
            ],
        };
        Self {
            specs: [shortbow, longbow, mortar],
            level_limit: DEFAULT_LEVEL_LIMIT,
        }
    }
}

/// Static description of one enemy kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Name of the sprite sheet used by renderers.
    pub sprite: String,
    /// Health the enemy spawns with.
    pub max_health: u32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Money granted when the enemy dies.
    pub reward: u32,
}

/// Validated enemy table indexed by kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyCatalog {
    profiles: [EnemyProfile; 3],
}

impl EnemyCatalog {
    /// Validates the provided profiles, indexed by [`EnemyKind::index`].
    pub fn new(profiles: [EnemyProfile; 3]) -> Result<Self, ConfigurationError> {
        for kind in EnemyKind::ALL {
            let profile = &profiles[kind.index()];
            if profile.max_health == 0 {
                return Err(ConfigurationError::ZeroMaxHealth { kind });
            }
            if !profile.speed.is_finite() || profile.speed <= 0.0 {
                return Err(ConfigurationError::InvalidSpeed { kind });
            }
        }
        Ok(Self { profiles })
    }

    /// Profile of the requested enemy kind.
    #[must_use]
    pub fn profile(&self, kind: EnemyKind) -> &EnemyProfile {
        &self.profiles[kind.index()]
    }
}

impl Default for EnemyCatalog {
    fn default() -> Self {
        let profile = |sprite: &str, max_health, speed, reward| EnemyProfile {
            sprite: sprite.to_owned(),
            max_health,
            speed,
            reward,
        };
        Self {
            profiles: [
                profile("goblin", 50, 120.0, 10),
                profile("troll", 120, 80.0, 25),
                profile("giant", 250, 50.0, 50),
            ],
        }
    }
}

/// Scaling factors granted by the town's buildings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    /// Factor applied to turret purchase prices.
    pub purchase_cost: f64,
    /// Factor applied to upgrade prices.
    pub upgrade_cost: f64,
    /// Factor applied to turret cooldowns.
    pub cooldown: f64,
    /// Factor applied to turret damage.
    pub damage: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            purchase_cost: 1.0,
            upgrade_cost: 1.0,
            cooldown: 1.0,
            damage: 1.0,
        }
    }
}

impl Multipliers {
    /// Derives multipliers from the levels of the town's wheat farm, smithy
    /// and archery range.
    #[must_use]
    pub fn from_building_levels(wheat: u32, smithing: u32, range: u32) -> Self {
        Self {
            purchase_cost: 1.0 - 0.05 * f64::from(wheat),
            upgrade_cost: 1.0 - 0.05 * f64::from(smithing),
            cooldown: 1.0 - 0.03 * f64::from(range),
            damage: 1.0 + 0.02 * f64::from(range),
        }
    }

    /// Discounted purchase price.
    #[must_use]
    pub fn purchase_price(&self, base: u32) -> u32 {
        scale(base, self.purchase_cost)
    }

    /// Discounted upgrade price.
    #[must_use]
    pub fn upgrade_price(&self, base: u32) -> u32 {
        scale(base, self.upgrade_cost)
    }

    /// Cooldown after applying the cooldown factor, truncated to milliseconds.
    #[must_use]
    pub fn scaled_cooldown(&self, cooldown: Duration) -> Duration {
        let millis = u32::try_from(cooldown.as_millis()).unwrap_or(u32::MAX);
        Duration::from_millis(u64::from(scale(millis, self.cooldown)))
    }

    /// Damage after applying the damage factor.
    #[must_use]
    pub fn scaled_damage(&self, damage: u32) -> u32 {
        scale(damage, self.damage)
    }
}

fn scale(base: u32, factor: f64) -> u32 {
    let scaled = (f64::from(base) * factor).floor();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_cost_reads_the_next_level_entry() {
        let catalog = TurretCatalog::default();
        assert_eq!(catalog.upgrade_cost(TurretKind::Shortbow, 1), Some(120));
        assert_eq!(catalog.upgrade_cost(TurretKind::Mortar, 1), Some(200));
        assert_eq!(catalog.upgrade_cost(TurretKind::Shortbow, 2), None);
    }

    #[test]
    fn stats_are_clamped_to_the_level_limit() {
        let catalog = TurretCatalog::default();
        assert_eq!(catalog.stats(TurretKind::Longbow, 9).range, 350.0);
        assert_eq!(catalog.stats(TurretKind::Longbow, 0).range, 250.0);
    }

    #[test]
    fn level_limit_beyond_priced_levels_is_rejected() {
        let defaults = TurretCatalog::default();
        let error = TurretCatalog::new(defaults.specs.clone(), 3).unwrap_err();
        assert_eq!(
            error,
            ConfigurationError::MissingUpgradeCost {
                kind: TurretKind::Shortbow,
                level: 3,
            }
        );
        let error = TurretCatalog::new(defaults.specs, 4).unwrap_err();
        assert_eq!(
            error,
            ConfigurationError::MissingTurretStats {
                kind: TurretKind::Shortbow,
                level: 4,
            }
        );
    }

    #[test]
    fn enemy_catalog_rejects_zero_health() {
        let mut profiles = EnemyCatalog::default().profiles;
        profiles[EnemyKind::Troll.index()].max_health = 0;
        assert_eq!(
            EnemyCatalog::new(profiles).unwrap_err(),
            ConfigurationError::ZeroMaxHealth {
                kind: EnemyKind::Troll
            }
        );
    }

    #[test]
    fn building_levels_translate_into_discounts() {
        let multipliers = Multipliers::from_building_levels(2, 1, 5);
        assert_eq!(multipliers.purchase_price(100), 90);
        assert_eq!(multipliers.upgrade_price(120), 114);
        assert_eq!(
            multipliers.scaled_cooldown(Duration::from_millis(1_000)),
            Duration::from_millis(850)
        );
        assert_eq!(multipliers.scaled_damage(25), 27);
    }

    #[test]
    fn neutral_multipliers_leave_prices_untouched() {
        let multipliers = Multipliers::default();
        assert_eq!(multipliers.purchase_price(150), 150);
        assert_eq!(multipliers.scaled_damage(60), 60);
    }
}
