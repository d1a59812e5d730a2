#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along the waypoint path.

use std::time::Duration;

use focus_defence_core::{Command, EnemyView, Event, PathModel};
use glam::Vec2;

/// Result of advancing a single enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// The enemy is still on the path.
    Moved {
        /// Position after the step.
        position: Vec2,
        /// Waypoint the enemy heads for next; equals the path length once the
        /// final waypoint was reached.
        target_waypoint: usize,
    },
    /// The enemy had already reached the final waypoint and leaves the map.
    Escaped,
}

/// Moves a point towards `path[target_waypoint]` by at most `speed * dt`.
///
/// Overshooting steps snap onto the waypoint and advance the index instead of
/// carrying the remainder over to the next segment.
#[must_use]
pub fn advance(
    position: Vec2,
    target_waypoint: usize,
    speed: f32,
    dt: Duration,
    path: &PathModel,
) -> Advance {
    let Some(target) = path.get(target_waypoint) else {
        return Advance::Escaped;
    };

    let step = speed * dt.as_secs_f32();
    let delta = target - position;
    let distance = delta.length();

    if distance >= step {
        return Advance::Moved {
            position: position + delta.normalize_or_zero() * step,
            target_waypoint,
        };
    }

    Advance::Moved {
        position: if distance > 0.0 { target } else { position },
        target_waypoint: target_waypoint + 1,
    }
}

/// Pure system that reacts to time events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `MoveEnemy` or `EscapeEnemy` per enemy for every tick in `events`.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        path: &PathModel,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        let mut dt = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt: step, .. } = event {
                ticked = true;
                dt = dt.saturating_add(*step);
            }
        }
        if !ticked || enemies.is_empty() {
            return;
        }

        self.scratch.clear();
        for enemy in enemies.iter() {
            let command = match advance(
                enemy.position,
                enemy.target_waypoint,
                enemy.speed,
                dt,
                path,
            ) {
                Advance::Moved {
                    position,
                    target_waypoint,
                } => Command::MoveEnemy {
                    enemy: enemy.id,
                    position,
                    target_waypoint,
                },
                Advance::Escaped => Command::EscapeEnemy { enemy: enemy.id },
            };
            self.scratch.push(command);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> PathModel {
        PathModel::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ])
        .unwrap()
    }

    #[test]
    fn partial_step_moves_along_the_segment() {
        let result = advance(
            Vec2::ZERO,
            1,
            50.0,
            Duration::from_millis(500),
            &straight_path(),
        );
        assert_eq!(
            result,
            Advance::Moved {
                position: Vec2::new(25.0, 0.0),
                target_waypoint: 1
            }
        );
    }

    #[test]
    fn overshooting_snaps_to_the_waypoint() {
        let result = advance(
            Vec2::new(90.0, 0.0),
            1,
            120.0,
            Duration::from_millis(100),
            &straight_path(),
        );
        assert_eq!(
            result,
            Advance::Moved {
                position: Vec2::new(100.0, 0.0),
                target_waypoint: 2
            }
        );
    }

    #[test]
    fn standing_on_the_waypoint_only_advances_the_index() {
        let result = advance(
            Vec2::new(100.0, 100.0),
            2,
            10.0,
            Duration::from_millis(16),
            &straight_path(),
        );
        assert_eq!(
            result,
            Advance::Moved {
                position: Vec2::new(100.0, 100.0),
                target_waypoint: 3
            }
        );
    }

    #[test]
    fn past_final_waypoint_escapes_without_moving() {
        let result = advance(
            Vec2::new(100.0, 100.0),
            3,
            10.0,
            Duration::from_millis(16),
            &straight_path(),
        );
        assert_eq!(result, Advance::Escaped);
    }

    #[test]
    fn silent_without_time_events() {
        let mut movement = Movement::new();
        let mut out = Vec::new();
        movement.handle(&[Event::WavesStarted], &EnemyView::default(), &straight_path(), &mut out);
        assert!(out.is_empty());
    }
}
