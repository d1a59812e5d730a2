#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that decides when enemies enter the path and when
//! the defender has won.

use std::time::Duration;

use focus_defence_core::{Command, EnemyKind, Event};
use tracing::info;

/// Timing parameters of the wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveSchedule {
    /// Delay between starting the clock and the first wave.
    pub initial_delay: Duration,
    /// Time between the starts of consecutive waves.
    pub wave_interval: Duration,
    /// Time between two spawns of the same wave.
    pub spawn_delay: Duration,
    /// Match length; no wave starts after it elapsed.
    pub game_duration: Duration,
}

impl Default for WaveSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            wave_interval: Duration::from_secs(30),
            spawn_delay: Duration::from_millis(500),
            game_duration: Duration::from_secs(300),
        }
    }
}

/// Lifecycle of the wave clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// The clock has not been started.
    #[default]
    NotStarted,
    /// Waves are being scheduled.
    Running,
    /// The match duration elapsed with the path cleared.
    Victory,
}

/// Pure system that emits `SpawnEnemy` and `DeclareVictory` commands.
#[derive(Debug)]
pub struct WaveManager {
    schedule: WaveSchedule,
    phase: WavePhase,
    elapsed: Duration,
    next_wave_at: Duration,
    next_spawn_at: Duration,
    wave_number: u32,
    current_wave: Vec<EnemyKind>,
    cursor: usize,
    spawning: bool,
}

impl WaveManager {
    /// Creates an idle wave manager using the provided schedule.
    #[must_use]
    pub fn new(schedule: WaveSchedule) -> Self {
        Self {
            schedule,
            phase: WavePhase::NotStarted,
            elapsed: Duration::ZERO,
            next_wave_at: schedule.initial_delay,
            next_spawn_at: Duration::ZERO,
            wave_number: 0,
            current_wave: Vec::new(),
            cursor: 0,
            spawning: false,
        }
    }

    /// Consumes world events and emits wave commands.
    ///
    /// `enemies_alive` is the number of enemies on the path when the events
    /// were produced.
    pub fn handle(&mut self, events: &[Event], enemies_alive: usize, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::WavesStarted => self.start(),
                Event::TimeAdvanced { dt, .. } => self.update(*dt, enemies_alive, out),
                _ => {}
            }
        }
    }

    fn start(&mut self) {
        if self.phase != WavePhase::NotStarted {
            return;
        }
        self.phase = WavePhase::Running;
        self.elapsed = Duration::ZERO;
        self.next_wave_at = self.schedule.initial_delay;
    }

    fn update(&mut self, dt: Duration, enemies_alive: usize, out: &mut Vec<Command>) {
        if self.phase != WavePhase::Running {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.elapsed >= self.schedule.game_duration {
            if !self.spawning && enemies_alive == 0 {
                self.phase = WavePhase::Victory;
                info!(waves = self.wave_number, "all waves survived");
                out.push(Command::DeclareVictory);
            }
            return;
        }

        if !self.spawning {
            if self.elapsed >= self.next_wave_at {
                self.start_next_wave();
            }
        } else if self.cursor < self.current_wave.len() {
            if self.elapsed >= self.next_spawn_at {
                let kind = self.current_wave[self.cursor];
                self.cursor += 1;
                self.next_spawn_at = self.elapsed.saturating_add(self.schedule.spawn_delay);
                out.push(Command::SpawnEnemy { kind });
            }
        } else {
            self.spawning = false;
        }
    }

    fn start_next_wave(&mut self) {
        self.wave_number = self.wave_number.saturating_add(1);
        self.current_wave = generate_wave(self.wave_number);
        self.cursor = 0;
        self.spawning = true;
        self.next_spawn_at = self.elapsed;
        self.next_wave_at = self.elapsed.saturating_add(self.schedule.wave_interval);
        info!(
            wave = self.wave_number,
            enemies = self.current_wave.len(),
            "wave started"
        );
    }

    /// Number of waves started so far.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Reports whether the current wave still has enemies to release.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Match time accumulated since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Match time left before the duration runs out.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.schedule.game_duration.saturating_sub(self.elapsed)
    }

    /// Timing parameters in use.
    #[must_use]
    pub fn schedule(&self) -> WaveSchedule {
        self.schedule
    }
}

/// Lists the enemies of the 1-based wave `number` in spawn order.
#[must_use]
pub fn generate_wave(number: u32) -> Vec<EnemyKind> {
    let (goblins, trolls, giants) = match number {
        0 => (0, 0, 0),
        1 => (5, 0, 0),
        2 => (3, 2, 0),
        3 => (2, 2, 1),
        _ => {
            let base = number - 3;
            (2 + base, 2 + base / 2, 1 + base / 3)
        }
    };
    let counts = [
        (EnemyKind::Goblin, goblins),
        (EnemyKind::Troll, trolls),
        (EnemyKind::Giant, giants),
    ];
    counts
        .into_iter()
        .flat_map(|(kind, count)| std::iter::repeat(kind).take(count as usize))
        .collect()
}
