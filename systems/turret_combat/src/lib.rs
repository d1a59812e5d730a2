#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands for turrets whose cooldown elapsed.

use focus_defence_core::{Command, Event, TurretView};

/// Turret combat system that queues firing commands for ready turrets.
#[derive(Debug, Default)]
pub struct TurretCombat {
    scratch: Vec<Command>,
}

impl TurretCombat {
    /// Creates a new turret combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireTurret` for every armed turret that is ready at the
    /// clock reading of the latest `TimeAdvanced` event.
    pub fn handle(&mut self, events: &[Event], turrets: &TurretView, out: &mut Vec<Command>) {
        let Some(now) = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { now, .. } => Some(*now),
            _ => None,
        }) else {
            return;
        };

        self.scratch.clear();
        for turret in turrets.iter() {
            if turret.target.is_some() && turret.is_ready(now) {
                self.scratch.push(Command::FireTurret { turret: turret.id });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_defence_core::{EnemyId, TileCoord, TurretId, TurretKind, TurretSnapshot};
    use glam::Vec2;
    use std::time::Duration;

    fn snapshot(id: u32, last_shot_ms: u64, target: Option<u32>) -> TurretSnapshot {
        TurretSnapshot {
            id: TurretId::new(id),
            kind: TurretKind::Longbow,
            tile: TileCoord::new(id, 0),
            position: Vec2::ZERO,
            level: 1,
            range: 250.0,
            cooldown: Duration::from_millis(2_500),
            damage: 60,
            splash_radius: 0.0,
            last_shot: Duration::from_millis(last_shot_ms),
            target: target.map(EnemyId::new),
            angle: 90.0,
            upgrade_cost: Some(180),
        }
    }

    fn tick_at(now_ms: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(16),
            now: Duration::from_millis(now_ms),
        }
    }

    #[test]
    fn only_ready_armed_turrets_fire() {
        let mut system = TurretCombat::new();
        let turrets = TurretView::from_snapshots(vec![
            snapshot(1, 0, Some(4)),
            snapshot(2, 500, Some(4)),
            snapshot(3, 0, None),
        ]);
        let mut out = Vec::new();

        system.handle(&[tick_at(2_600)], &turrets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireTurret {
                turret: TurretId::new(1)
            }]
        );
    }

    #[test]
    fn exact_cooldown_is_not_enough() {
        let mut system = TurretCombat::new();
        let turrets = TurretView::from_snapshots(vec![snapshot(1, 100, Some(2))]);
        let mut out = Vec::new();

        system.handle(&[tick_at(2_600)], &turrets, &mut out);
        assert!(out.is_empty());

        system.handle(&[tick_at(2_601)], &turrets, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn silent_without_time_events() {
        let mut system = TurretCombat::new();
        let turrets = TurretView::from_snapshots(vec![snapshot(1, 0, Some(2))]);
        let mut out = Vec::new();

        system.handle(&[Event::WavesStarted], &turrets, &mut out);
        assert!(out.is_empty());
    }
}
