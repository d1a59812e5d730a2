//! Match statistics accumulated by the world.

use std::time::Duration;

/// Running totals reported at the end of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ledger {
    enemies_killed: u32,
    money_spent: u32,
    money_earned: u32,
    time_played: Duration,
}

impl Ledger {
    /// Number of enemies whose bounty was collected.
    #[must_use]
    pub const fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    /// Money spent on purchases and upgrades.
    #[must_use]
    pub const fn money_spent(&self) -> u32 {
        self.money_spent
    }

    /// Money earned from bounties.
    #[must_use]
    pub const fn money_earned(&self) -> u32 {
        self.money_earned
    }

    /// Simulated time that elapsed while the match was running.
    #[must_use]
    pub const fn time_played(&self) -> Duration {
        self.time_played
    }

    pub(crate) fn record_spend(&mut self, amount: u32) {
        self.money_spent = self.money_spent.saturating_add(amount);
    }

    pub(crate) fn record_kill(&mut self, reward: u32) {
        self.enemies_killed = self.enemies_killed.saturating_add(1);
        self.money_earned = self.money_earned.saturating_add(reward);
    }

    pub(crate) fn record_time(&mut self, dt: Duration) {
        self.time_played = self.time_played.saturating_add(dt);
    }
}
