#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Focus Defence match.
//!
//! ```bash
//! focus-defence --config adapters/cli/levels/meadow.toml --seed 7
//! RUST_LOG=debug focus-defence --wheat 2 --smithing 1
//! ```

mod autopilot;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use focus_defence_core::{Event, Multipliers};
use focus_defence_session::{DefenseSession, SessionConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::autopilot::{Autopilot, Decision};

#[derive(Debug, Parser)]
#[command(name = "focus-defence", version, about = "Plays a headless Focus Defence match")]
struct Args {
    /// Session configuration in TOML; the stock level is used when omitted.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Seed for the autopilot's choices.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 50)]
    dt_ms: u64,

    /// Autopilot decision interval in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    think_ms: u64,

    /// Give up after this many simulated seconds.
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,

    /// Wheat farm level; lowers purchase prices.
    #[arg(long)]
    wheat: Option<u32>,

    /// Smithy level; lowers upgrade prices.
    #[arg(long)]
    smithing: Option<u32>,

    /// Archery range level; speeds up and strengthens turrets.
    #[arg(long)]
    range: Option<u32>,
}

impl Args {
    fn load_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                SessionConfig::from_toml_str(&source)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => SessionConfig::default(),
        };
        if self.wheat.is_some() || self.smithing.is_some() || self.range.is_some() {
            config.multipliers = Multipliers::from_building_levels(
                self.wheat.unwrap_or(0),
                self.smithing.unwrap_or(0),
                self.range.unwrap_or(0),
            );
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if args.dt_ms == 0 {
        bail!("--dt-ms must be positive");
    }
    let config = args.load_config()?;
    let mut session =
        DefenseSession::from_config(&config).context("failed to build the session")?;
    let mut autopilot = Autopilot::new(args.seed, &session);
    info!(
        seed = args.seed,
        sites = autopilot.sites().len(),
        "autopilot ready"
    );

    let step = Duration::from_millis(args.dt_ms);
    let think = Duration::from_millis(args.think_ms.max(args.dt_ms));
    let limit = Duration::from_secs(args.max_seconds);
    let mut simulated = Duration::ZERO;
    let mut since_thought = think;

    session.start_waves();
    while !session.outcome().is_over() && simulated < limit {
        if since_thought >= think {
            since_thought = Duration::ZERO;
            log_decision(autopilot.step(&mut session));
        }
        session.tick(step);
        simulated += step;
        since_thought += step;
        for event in session.recent_events() {
            if let Event::EnemyEscaped { enemy } = event {
                debug!(enemy = enemy.get(), "enemy reached the base");
            }
        }
    }

    let snapshot = session.snapshot();
    let Some(report) = session.conclude() else {
        println!(
            "match still running after {}s: wave {}, base {}, money {}",
            simulated.as_secs(),
            snapshot.wave_number,
            snapshot.base_health,
            snapshot.money
        );
        return Ok(());
    };

    println!("outcome: {:?}", report.outcome);
    println!("reward: {}", report.reward);
    println!("waves: {}", report.stats.waves_completed);
    println!("kills: {}", report.stats.enemies_killed);
    println!(
        "money: spent {} earned {}",
        report.stats.money_spent, report.stats.money_earned
    );
    println!("time played: {:.1}s", report.stats.time_played.as_secs_f32());
    Ok(())
}

fn log_decision(decision: Decision) {
    match decision {
        Decision::Purchased { kind, tile, turret } => info!(
            kind = kind.label(),
            column = tile.column(),
            row = tile.row(),
            turret = turret.get(),
            "turret purchased"
        ),
        Decision::Upgraded { turret, level } => {
            info!(turret = turret.get(), level, "turret upgraded");
        }
        Decision::Waited => {}
    }
}
