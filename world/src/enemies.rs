//! Enemy state stored inside the world.

use glam::Vec2;

use focus_defence_core::{EnemyId, EnemyKind, EnemyProfile, EnemySnapshot};

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) target_waypoint: usize,
    pub(crate) speed: f32,
    pub(crate) health: i32,
    pub(crate) max_health: u32,
    pub(crate) reward: u32,
    pub(crate) angle: f32,
}

impl Enemy {
    /// Places a fresh enemy on the first waypoint, heading for the second.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, profile: &EnemyProfile, start: Vec2) -> Self {
        Self {
            id,
            kind,
            position: start,
            target_waypoint: 1,
            speed: profile.speed,
            health: i32::try_from(profile.max_health).unwrap_or(i32::MAX),
            max_health: profile.max_health,
            reward: profile.reward,
            angle: 0.0,
        }
    }

    /// Subtracts damage; health may go negative until bounties are collected.
    pub(crate) fn apply_damage(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(amount);
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Points the enemy at `towards`; a zero-length heading keeps the old angle.
    pub(crate) fn face(&mut self, towards: Vec2) {
        if let Some(angle) = heading_degrees(self.position, towards) {
            self.angle = angle;
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            target_waypoint: self.target_waypoint,
            speed: self.speed,
            health: self.health,
            max_health: self.max_health,
            reward: self.reward,
            angle: self.angle,
        }
    }
}

/// Screen-space heading from `from` to `to` in degrees, with y pointing down.
pub(crate) fn heading_degrees(from: Vec2, to: Vec2) -> Option<f32> {
    let delta = to - from;
    if delta.length_squared() == 0.0 {
        return None;
    }
    Some((-delta.y).atan2(delta.x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_defence_core::EnemyCatalog;

    #[test]
    fn damage_can_push_health_below_zero() {
        let catalog = EnemyCatalog::default();
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Goblin,
            catalog.profile(EnemyKind::Goblin),
            Vec2::ZERO,
        );
        enemy.apply_damage(30);
        assert!(!enemy.is_dead());
        enemy.apply_damage(30);
        assert_eq!(enemy.health, -10);
        assert!(enemy.is_dead());
    }

    #[test]
    fn heading_uses_screen_coordinates() {
        let up = heading_degrees(Vec2::new(0.0, 10.0), Vec2::ZERO).unwrap();
        assert!((up - 90.0).abs() < 1e-4);
        assert!(heading_degrees(Vec2::ONE, Vec2::ONE).is_none());
    }
}
