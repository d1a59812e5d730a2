#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps turret targets in range.

use focus_defence_core::{Command, EnemyId, EnemyView, TurretSnapshot, TurretView};

/// Turret targeting system that emits lock and release commands.
#[derive(Debug, Default)]
pub struct TurretTargeting {
    scratch: Vec<Command>,
}

impl TurretTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits commands that update the targets of every turret.
    ///
    /// A turret whose target left range releases it and waits for the next
    /// tick before scanning again. An idle turret locks onto the last enemy,
    /// in spawn order, that stands strictly inside its range.
    pub fn handle(&mut self, turrets: &TurretView, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for turret in turrets.iter() {
            match turret.target {
                Some(target) => {
                    let in_range = enemies
                        .get(target)
                        .is_some_and(|enemy| turret.position.distance(enemy.position) < turret.range);
                    if !in_range {
                        self.scratch.push(Command::ReleaseTarget { turret: turret.id });
                    }
                }
                None => {
                    if let Some(enemy) = last_in_range(turret, enemies) {
                        self.scratch.push(Command::LockTarget {
                            turret: turret.id,
                            enemy,
                        });
                    }
                }
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn last_in_range(turret: &TurretSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    enemies
        .iter()
        .filter(|enemy| !enemy.is_dead())
        .filter(|enemy| turret.position.distance(enemy.position) < turret.range)
        .last()
        .map(|enemy| enemy.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_defence_core::{EnemyKind, EnemySnapshot, TileCoord, TurretId, TurretKind};
    use glam::Vec2;
    use std::time::Duration;

    fn turret(target: Option<u32>) -> TurretSnapshot {
        TurretSnapshot {
            id: TurretId::new(1),
            kind: TurretKind::Shortbow,
            tile: TileCoord::new(0, 0),
            position: Vec2::ZERO,
            level: 1,
            range: 100.0,
            cooldown: Duration::from_millis(1_000),
            damage: 25,
            splash_radius: 0.0,
            last_shot: Duration::ZERO,
            target: target.map(EnemyId::new),
            angle: 90.0,
            upgrade_cost: Some(120),
        }
    }

    fn enemy(id: u32, x: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Goblin,
            position: Vec2::new(x, 0.0),
            target_waypoint: 1,
            speed: 120.0,
            health: 50,
            max_health: 50,
            reward: 10,
            angle: 0.0,
        }
    }

    fn run(turret: TurretSnapshot, enemies: Vec<EnemySnapshot>) -> Vec<Command> {
        let mut system = TurretTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TurretView::from_snapshots(vec![turret]),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn idle_turret_locks_onto_the_last_enemy_in_range() {
        let out = run(
            turret(None),
            vec![enemy(3, 10.0), enemy(4, 90.0), enemy(5, 150.0)],
        );
        assert_eq!(
            out,
            vec![Command::LockTarget {
                turret: TurretId::new(1),
                enemy: EnemyId::new(4),
            }]
        );
    }

    #[test]
    fn range_boundary_is_exclusive() {
        assert!(run(turret(None), vec![enemy(1, 100.0)]).is_empty());
    }

    #[test]
    fn dead_enemies_are_not_acquired() {
        let mut corpse = enemy(2, 20.0);
        corpse.health = -5;
        let out = run(turret(None), vec![enemy(1, 10.0), corpse]);
        assert_eq!(
            out,
            vec![Command::LockTarget {
                turret: TurretId::new(1),
                enemy: EnemyId::new(1),
            }]
        );
    }

    #[test]
    fn target_leaving_range_is_released_without_reacquiring() {
        let out = run(turret(Some(7)), vec![enemy(6, 10.0), enemy(7, 101.0)]);
        assert_eq!(
            out,
            vec![Command::ReleaseTarget {
                turret: TurretId::new(1)
            }]
        );
    }

    #[test]
    fn target_in_range_is_kept() {
        assert!(run(turret(Some(7)), vec![enemy(6, 10.0), enemy(7, 99.0)]).is_empty());
    }
}
