//! Seeded player stand-in that buys and upgrades turrets along the path.

use focus_defence_core::{TileCoord, TurretId, TurretKind};
use focus_defence_session::DefenseSession;
use focus_defence_world::query;
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Build sites further than this many tiles from the path are ignored.
const SITE_REACH_TILES: f32 = 2.0;

/// What the autopilot did on one decision step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    Purchased {
        kind: TurretKind,
        tile: TileCoord,
        turret: TurretId,
    },
    Upgraded {
        turret: TurretId,
        level: u8,
    },
    Waited,
}

/// Deterministic decision maker driven by a ChaCha stream.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    sites: Vec<TileCoord>,
    upgrade_bias: f64,
}

impl Autopilot {
    /// Collects build sites near the session's path, closest first.
    pub(crate) fn new(seed: u64, session: &DefenseSession) -> Self {
        let world = session.world();
        let tile_size = query::tile_size(world);
        let waypoints = query::path(world).waypoints();
        let reach = SITE_REACH_TILES * tile_size;

        let mut ranked: Vec<(f32, TileCoord)> = query::tile_map(world)
            .buildable_tiles()
            .filter_map(|tile| {
                let distance = distance_to_path(tile.center(tile_size), waypoints);
                (distance <= reach).then_some((distance, tile))
            })
            .collect();
        ranked.sort_by(|(left, left_tile), (right, right_tile)| {
            left.total_cmp(right).then_with(|| left_tile.cmp(right_tile))
        });

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sites: ranked.into_iter().map(|(_, tile)| tile).collect(),
            upgrade_bias: 0.35,
        }
    }

    /// Candidate build sites in preference order.
    pub(crate) fn sites(&self) -> &[TileCoord] {
        &self.sites
    }

    /// Spends money on one purchase or upgrade if anything is affordable.
    pub(crate) fn step(&mut self, session: &mut DefenseSession) -> Decision {
        if self.rng.gen_bool(self.upgrade_bias) {
            if let Some(decision) = self.try_upgrade(session) {
                return decision;
            }
        }
        if let Some(decision) = self.try_purchase(session) {
            return decision;
        }
        self.try_upgrade(session).unwrap_or(Decision::Waited)
    }

    fn try_purchase(&mut self, session: &mut DefenseSession) -> Option<Decision> {
        let money = query::money(session.world());
        let affordable: Vec<TurretKind> = TurretKind::ALL
            .into_iter()
            .filter(|kind| query::purchase_price(session.world(), *kind) <= money)
            .collect();
        let kind = *affordable.choose(&mut self.rng)?;
        let tile = self
            .sites
            .iter()
            .copied()
            .find(|tile| query::turret_at(session.world(), *tile).is_none())?;

        match session.purchase(kind, tile) {
            Ok(turret) => {
                debug!(kind = kind.label(), ?tile, "autopilot purchased turret");
                Some(Decision::Purchased { kind, tile, turret })
            }
            Err(error) => {
                debug!(%error, "autopilot purchase rejected");
                None
            }
        }
    }

    fn try_upgrade(&mut self, session: &mut DefenseSession) -> Option<Decision> {
        let money = query::money(session.world());
        let candidates: Vec<TurretId> = query::turret_view(session.world())
            .iter()
            .map(|turret| turret.id)
            .filter(|turret| {
                query::upgrade_price(session.world(), *turret).is_some_and(|price| price <= money)
            })
            .collect();
        let turret = *candidates.choose(&mut self.rng)?;

        match session.upgrade(turret) {
            Ok(level) => {
                debug!(turret = turret.get(), level, "autopilot upgraded turret");
                Some(Decision::Upgraded { turret, level })
            }
            Err(error) => {
                debug!(%error, "autopilot upgrade rejected");
                None
            }
        }
    }
}

fn distance_to_path(point: Vec2, waypoints: &[Vec2]) -> f32 {
    waypoints
        .windows(2)
        .map(|segment| distance_to_segment(point, segment[0], segment[1]))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared == 0.0 {
        return point.distance(start);
    }
    let along = ((point - start).dot(span) / length_squared).max(0.0).min(1.0);
    point.distance(start + span * along)
}
