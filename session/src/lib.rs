#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates a Focus Defence match.
//!
//! [`DefenseSession`] owns the authoritative world and the pure systems. Each
//! [`DefenseSession::tick`] advances the clock and then runs the wave manager,
//! enemy movement, turret targeting, turret combat and the bounty sweep in that
//! order, applying every command batch before the next system reads the world.

mod config;

use std::time::Duration;

use focus_defence_core::{
    ActionError, AudioCue, AudioSink, Clock, Command, EnemyId, EnemyKind, EnemySnapshot, Event,
    Multipliers, Outcome, SilentAudio, SimulatedClock, TileCoord, TurretId, TurretKind,
    TurretSnapshot,
};
use focus_defence_system_movement::Movement;
use focus_defence_system_turret_combat::TurretCombat;
use focus_defence_system_turret_targeting::TurretTargeting;
use focus_defence_system_waves::{WaveManager, WaveSchedule};
use focus_defence_world::{self as world, query, World, WorldSettings};
use tracing::{debug, info};

pub use config::{
    ConfigError, EnemiesConfig, EnemyConfig, LevelConfig, SessionConfig, SessionParts,
    TileIdsConfig, TurretConfig, TurretLevelConfig, TurretsConfig, WavesConfig,
};

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Money available.
    pub money: u32,
    /// Escapes the base can still absorb.
    pub base_health: u32,
    /// Number of waves started.
    pub wave_number: u32,
    /// Match time since the wave clock started.
    pub elapsed: Duration,
    /// Match time left.
    pub remaining: Duration,
    /// Enemies on the path in spawn order.
    pub enemies: Vec<EnemySnapshot>,
    /// Turrets in construction order.
    pub turrets: Vec<TurretSnapshot>,
    /// Tile selected by the player.
    pub selected_tile: Option<TileCoord>,
    /// Turret on the selected tile.
    pub selected_turret: Option<TurretId>,
    /// Whether ticks are currently ignored.
    pub paused: bool,
    /// Lifecycle of the match.
    pub outcome: Outcome,
}

/// Statistics gathered over one match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchStats {
    /// Waves that were started.
    pub waves_completed: u32,
    /// Enemies whose bounty was collected.
    pub enemies_killed: u32,
    /// Money spent on turrets and upgrades.
    pub money_spent: u32,
    /// Money earned from bounties.
    pub money_earned: u32,
    /// Simulated time the match ran for.
    pub time_played: Duration,
}

/// Result of a finished match handed back to the town layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionReport {
    /// How the match ended.
    pub outcome: Outcome,
    /// Money gained over the starting amount, or zero.
    pub reward: u32,
    /// Match statistics.
    pub stats: MatchStats,
}

/// A single wave-defence match.
#[derive(Debug)]
pub struct DefenseSession<C = SimulatedClock, A = SilentAudio> {
    settings: WorldSettings,
    schedule: WaveSchedule,
    multipliers: Multipliers,
    world: World,
    waves: WaveManager,
    movement: Movement,
    targeting: TurretTargeting,
    combat: TurretCombat,
    clock: C,
    audio: A,
    paused: bool,
    recent: Vec<Event>,
}

impl DefenseSession {
    /// Creates a session driven by simulated time and without sound.
    #[must_use]
    pub fn new(settings: WorldSettings, schedule: WaveSchedule) -> Self {
        Self::with_parts(settings, schedule, SimulatedClock::new(), SilentAudio)
    }

    /// Builds a session from a validated configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        let parts = config.build()?;
        let mut session = Self::new(parts.settings, parts.schedule);
        session.set_multipliers(parts.multipliers);
        Ok(session)
    }
}

impl<C: Clock, A: AudioSink> DefenseSession<C, A> {
    /// Creates a session with a custom clock and audio sink.
    pub fn with_parts(settings: WorldSettings, schedule: WaveSchedule, clock: C, audio: A) -> Self {
        let mut session = Self {
            world: World::new(settings.clone()),
            settings,
            schedule,
            multipliers: Multipliers::default(),
            waves: WaveManager::new(schedule),
            movement: Movement::new(),
            targeting: TurretTargeting::new(),
            combat: TurretCombat::new(),
            clock,
            audio,
            paused: false,
            recent: Vec::new(),
        };
        session.sync_clock();
        session
    }

    fn sync_clock(&mut self) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: Duration::ZERO,
                now: self.clock.now(),
            },
            &mut events,
        );
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        for event in &events {
            if let Some(cue) = AudioCue::for_event(event) {
                self.audio.play(cue);
            }
        }
        self.recent.extend(events.iter().cloned());
        events
    }

    /// Advances the match by `dt`. Paused or finished sessions ignore ticks.
    pub fn tick(&mut self, dt: Duration) {
        self.recent.clear();
        if self.paused || query::outcome(&self.world).is_over() {
            return;
        }

        self.clock.advance(dt);
        let now = self.clock.now();
        let time_events = self.execute(vec![Command::Tick { dt, now }]);

        let mut commands = Vec::new();
        self.waves
            .handle(&time_events, query::enemy_count(&self.world), &mut commands);
        let _ = self.execute(commands);

        let mut commands = Vec::new();
        self.movement.handle(
            &time_events,
            &query::enemy_view(&self.world),
            query::path(&self.world),
            &mut commands,
        );
        let _ = self.execute(commands);

        let mut commands = Vec::new();
        self.targeting.handle(
            &query::turret_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        let _ = self.execute(commands);

        let mut commands = Vec::new();
        self.combat
            .handle(&time_events, &query::turret_view(&self.world), &mut commands);
        let _ = self.execute(commands);

        let _ = self.execute(vec![Command::CollectBounties]);
    }

    /// Starts the wave clock. Ignored once started or after the match ended.
    pub fn start_waves(&mut self) {
        self.recent.clear();
        let events = self.execute(vec![Command::StartWaves]);
        if events.contains(&Event::WavesStarted) {
            info!(
                initial_delay_ms = self.schedule.initial_delay.as_millis() as u64,
                "wave clock started"
            );
            let mut commands = Vec::new();
            self.waves
                .handle(&events, query::enemy_count(&self.world), &mut commands);
            let _ = self.execute(commands);
        }
    }

    /// Buys a turret and selects it.
    pub fn purchase(&mut self, kind: TurretKind, tile: TileCoord) -> Result<TurretId, ActionError> {
        self.recent.clear();
        let events = self.execute(vec![Command::PurchaseTurret { kind, tile }]);
        resolve(&events, |event| match event {
            Event::TurretPurchased { turret, .. } => Some(*turret),
            _ => None,
        })
    }

    /// Upgrades a turret, returning the level it reached.
    pub fn upgrade(&mut self, turret: TurretId) -> Result<u8, ActionError> {
        self.recent.clear();
        let events = self.execute(vec![Command::UpgradeTurret { turret }]);
        resolve(&events, |event| match event {
            Event::TurretUpgraded { level, .. } => Some(*level),
            _ => None,
        })
    }

    /// Selects a tile; blocked tiles clear the selection. Returns the turret on it.
    pub fn select_tile(&mut self, tile: Option<TileCoord>) -> Option<TurretId> {
        self.recent.clear();
        let _ = self.execute(vec![Command::SelectTile { tile }]);
        query::selected_turret(&self.world)
    }

    /// Pauses or resumes the match.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    /// Reports whether ticks are ignored.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replaces the town multipliers used by future purchases and upgrades.
    pub fn set_multipliers(&mut self, multipliers: Multipliers) {
        self.multipliers = multipliers;
        let _ = self.execute(vec![Command::SetMultipliers { multipliers }]);
    }

    /// Places an enemy at the path start outside the wave schedule.
    pub fn spawn_enemy(&mut self, kind: EnemyKind) -> Option<EnemyId> {
        self.recent.clear();
        let events = self.execute(vec![Command::SpawnEnemy { kind }]);
        events.iter().find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
    }

    /// Discards the match and starts over with the same level and multipliers.
    pub fn restart(&mut self) {
        self.world = World::new(self.settings.clone());
        self.waves = WaveManager::new(self.schedule);
        self.movement = Movement::new();
        self.targeting = TurretTargeting::new();
        self.combat = TurretCombat::new();
        self.paused = false;
        self.recent.clear();
        self.sync_clock();
        let multipliers = self.multipliers;
        self.set_multipliers(multipliers);
    }

    /// Hands the result of a finished match back and restarts the session.
    ///
    /// Returns `None` while the match is still in progress.
    pub fn conclude(&mut self) -> Option<SessionReport> {
        let outcome = query::outcome(&self.world);
        if !outcome.is_over() {
            return None;
        }
        let ledger = query::ledger(&self.world);
        let report = SessionReport {
            outcome,
            reward: query::money(&self.world).saturating_sub(query::starting_money(&self.world)),
            stats: MatchStats {
                waves_completed: self.waves.wave_number(),
                enemies_killed: ledger.enemies_killed(),
                money_spent: ledger.money_spent(),
                money_earned: ledger.money_earned(),
                time_played: ledger.time_played(),
            },
        };
        info!(?report, "session concluded");
        self.restart();
        Some(report)
    }

    /// Captures the state needed to render the match.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            money: query::money(&self.world),
            base_health: query::base_health(&self.world),
            wave_number: self.waves.wave_number(),
            elapsed: self.waves.elapsed(),
            remaining: self.waves.remaining(),
            enemies: query::enemy_view(&self.world).into_vec(),
            turrets: query::turret_view(&self.world).into_vec(),
            selected_tile: query::selected_tile(&self.world),
            selected_turret: query::selected_turret(&self.world),
            paused: self.paused,
            outcome: query::outcome(&self.world),
        }
    }

    /// Current lifecycle of the match.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        query::outcome(&self.world)
    }

    /// Read-only access to the authoritative world for detailed queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Wave scheduler state.
    #[must_use]
    pub fn waves(&self) -> &WaveManager {
        &self.waves
    }

    /// Events produced by the latest tick or player action.
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.recent
    }

    /// Audio sink receiving the session's cues.
    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }
}

fn resolve<T>(events: &[Event], accept: impl Fn(&Event) -> Option<T>) -> Result<T, ActionError> {
    for event in events {
        if let Some(value) = accept(event) {
            return Ok(value);
        }
        if let Event::ActionRejected { reason, .. } = event {
            return Err(*reason);
        }
    }
    Err(ActionError::SessionEnded)
}
