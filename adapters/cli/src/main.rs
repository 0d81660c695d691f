#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Rampart stage headlessly.

mod save_code;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rampart_core::{Command, MetaEffects, StageConfig, StageOutcome};
use rampart_system_analytics::{Analytics, ProgressRecord, SaveTrigger};
use rampart_world::{self as world, query, TickInputs, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stage used when no `--stage` file is given.
const BUILTIN_STAGE: &str = include_str!("../stages/meadow.toml");
/// Fixed wall-clock duration of one simulation tick.
const TICK_MS: f32 = 50.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Rampart stage runner", long_about = None)]
struct Args {
    /// Path to a stage TOML file (defaults to the builtin stage)
    #[arg(long)]
    stage: Option<PathBuf>,

    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 6_000)]
    ticks: u32,

    /// Game speed multiplier; zero pauses the simulation
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Start the next wave automatically whenever the stage is idle
    #[arg(long)]
    auto_waves: bool,

    /// Print the progress record as a save code when the run ends
    #[arg(long)]
    save_code: bool,

    /// Resume best-wave and star progress from an earlier save code
    #[arg(long)]
    resume: Option<String>,
}

/// Entry point for the Rampart command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let stage = load_stage(args.stage.as_ref())?;
    let record = match &args.resume {
        Some(code) => {
            let record = save_code::decode(code).context("failed to read the save code")?;
            if record.stage != stage.name {
                bail!(
                    "save code belongs to stage '{}', not '{}'",
                    record.stage,
                    stage.name
                );
            }
            record
        }
        None => ProgressRecord::new(stage.name.clone()),
    };

    let mut world = World::new(stage, MetaEffects::default(), Vec::new())
        .context("stage configuration is invalid")?;
    println!("{}", query::welcome_banner(&world));

    let mut analytics = Analytics::new(record);
    run(&mut world, &mut analytics, &args);
    print_summary(&world);

    if args.save_code {
        let code = save_code::encode(analytics.record())
            .context("failed to encode the progress record")?;
        println!("{code}");
    }
    Ok(())
}

fn load_stage(path: Option<&PathBuf>) -> Result<StageConfig> {
    let Some(path) = path else {
        return toml::from_str(BUILTIN_STAGE).context("builtin stage is malformed");
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stage at {}", path.display()))?;
    toml::from_str(&source)
        .with_context(|| format!("Failed to parse stage TOML at {}", path.display()))
}

fn opening_commands(world: &World) -> Vec<Command> {
    query::context(world)
        .stage()
        .opening
        .iter()
        .map(|tower| Command::PlaceTower {
            kind: tower.kind,
            position: tower.position,
        })
        .collect()
}

fn run(world: &mut World, analytics: &mut Analytics, args: &Args) {
    let mut commands = opening_commands(world);
    let mut events = Vec::new();
    let mut triggers = Vec::new();

    for _ in 0..args.ticks {
        if args.auto_waves && query::can_start_wave(world) {
            commands.push(Command::StartWave);
        }
        let inputs = TickInputs {
            dt_ms: TICK_MS,
            speed: args.speed,
            commands: std::mem::take(&mut commands),
        };

        events.clear();
        world::tick(world, &inputs, &mut events);

        triggers.clear();
        analytics.handle(query::snapshot(world), &events, &mut triggers);
        for trigger in &triggers {
            match trigger {
                SaveTrigger::NewBestWave { wave } => {
                    info!(target: "rampart::cli", wave, "progress.new_best_wave");
                }
                SaveTrigger::StageComplete { stars } => {
                    info!(target: "rampart::cli", stars, "progress.stage_complete");
                }
                SaveTrigger::GameOver { wave } => {
                    info!(target: "rampart::cli", wave, "progress.game_over");
                }
            }
        }

        if query::outcome(world).is_some() {
            break;
        }
    }
}

fn print_summary(world: &World) {
    let snapshot = query::snapshot(world);
    let stats = query::statistics(world);
    let economy = query::economy(world);
    let outcome = match query::outcome(world) {
        Some(StageOutcome::Victory { stars }) => format!("victory ({stars} stars)"),
        Some(StageOutcome::Defeat) => "defeat".to_owned(),
        None => "in progress".to_owned(),
    };

    println!("stage:          {}", query::context(world).stage().name);
    println!("outcome:        {outcome}");
    println!("ticks:          {}", snapshot.tick);
    println!("waves cleared:  {}", stats.waves_cleared);
    println!("lives:          {}", economy.lives);
    println!("gold:           {}", economy.gold);
    println!("kills:          {}", stats.kills);
    println!("leaks:          {}", stats.leaks);
    println!("damage dealt:   {:.1}", stats.damage_dealt);
    println!("critical hits:  {}", stats.critical_hits);
    println!("bosses:         {}", stats.bosses_defeated);
    println!("enemies alive:  {}", query::enemies(world).len());
    println!("director:       {:?}", query::director(world).mode);
}
