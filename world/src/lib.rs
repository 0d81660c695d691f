#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Rampart.
//!
//! The world owns the validated stage, the caller-supplied meta effects and
//! augments, and the latest [`Snapshot`]. Each tick clones the previous
//! snapshot, applies the queued commands and runs the combat pipeline over
//! the copy, so the previous snapshot is never mutated.

mod commands;
mod pipeline;

use rampart_core::{
    chain_reaction, crit_chance, interest_rate, sniper_splash, Augment, Command, ConfigError,
    Event, MetaEffects, Path, Snapshot, SplashSpec, StageConfig, WELCOME_BANNER,
};

use crate::pipeline::Pipeline;

/// Validated, immutable inputs shared by every tick of a stage.
#[derive(Clone, Debug)]
pub struct StageContext {
    stage: StageConfig,
    path: Path,
    meta: MetaEffects,
    augments: Vec<Augment>,
    crit_chance: f32,
    splash: Option<SplashSpec>,
    interest_rate: f32,
    chain_reaction: f32,
}

impl StageContext {
    /// Validates `stage` and derives the run-wide modifiers.
    pub fn new(
        stage: StageConfig,
        meta: MetaEffects,
        augments: Vec<Augment>,
    ) -> Result<Self, ConfigError> {
        stage.validate()?;
        let path = Path::new(stage.path.clone());
        Ok(Self {
            crit_chance: crit_chance(&meta, &augments),
            splash: sniper_splash(&augments),
            interest_rate: interest_rate(&meta, &augments),
            chain_reaction: chain_reaction(&augments),
            stage,
            path,
            meta,
            augments,
        })
    }

    /// Stage configuration.
    #[must_use]
    pub fn stage(&self) -> &StageConfig {
        &self.stage
    }

    /// Path enemies walk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Everything the caller supplies for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickInputs {
    /// Wall-clock tick duration in milliseconds.
    pub dt_ms: f32,
    /// Game speed; zero pauses the simulation.
    pub speed: f32,
    /// Commands applied in order before the pipeline runs.
    pub commands: Vec<Command>,
}

impl TickInputs {
    /// Tick at normal speed with no commands.
    #[must_use]
    pub fn running(dt_ms: f32) -> Self {
        Self {
            dt_ms,
            speed: 1.0,
            commands: Vec::new(),
        }
    }

    /// Adds a command to the tick.
    #[must_use]
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

/// Result of advancing one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// New authoritative snapshot.
    pub snapshot: Snapshot,
    /// Events raised during the tick, in pipeline order.
    pub events: Vec<Event>,
}

/// Advances `previous` by one tick without touching it.
#[must_use]
pub fn advance(previous: &Snapshot, context: &StageContext, inputs: &TickInputs) -> TickOutcome {
    Pipeline::default().run(previous, context, inputs)
}

/// Represents the authoritative Rampart world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    context: StageContext,
    snapshot: Snapshot,
    pipeline: Pipeline,
}

impl World {
    /// Creates a world at the start of `stage`.
    pub fn new(
        stage: StageConfig,
        meta: MetaEffects,
        augments: Vec<Augment>,
    ) -> Result<Self, ConfigError> {
        let context = StageContext::new(stage, meta, augments)?;
        let snapshot = Snapshot::initial(context.stage());
        Ok(Self {
            banner: WELCOME_BANNER,
            context,
            snapshot,
            pipeline: Pipeline::default(),
        })
    }
}

/// Advances the world by one tick, appending the raised events to `out_events`.
pub fn tick(world: &mut World, inputs: &TickInputs, out_events: &mut Vec<Event>) {
    let outcome = world
        .pipeline
        .run(&world.snapshot, &world.context, inputs);
    world.snapshot = outcome.snapshot;
    out_events.extend(outcome.events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rampart_core::{
        DirectorState, Economy, Enemy, RunStatistics, Snapshot, StageOutcome, Tower, TowerId,
        WaveState, WaveStatus,
    };

    use super::{StageContext, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Latest authoritative snapshot.
    #[must_use]
    pub fn snapshot(world: &World) -> &Snapshot {
        &world.snapshot
    }

    /// Validated stage context.
    #[must_use]
    pub fn context(world: &World) -> &StageContext {
        &world.context
    }

    /// Enemies currently on the path.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.snapshot.enemies
    }

    /// Placed towers with the stats resolved during the last tick.
    #[must_use]
    pub fn towers(world: &World) -> &[Tower] {
        &world.snapshot.towers
    }

    /// Tower with `id`, if placed.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<&Tower> {
        world.snapshot.tower(id)
    }

    /// Gold and lives.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.snapshot.economy
    }

    /// Wave counters.
    #[must_use]
    pub fn wave(world: &World) -> WaveState {
        world.snapshot.wave
    }

    /// Director hysteresis state.
    #[must_use]
    pub fn director(world: &World) -> DirectorState {
        world.snapshot.director
    }

    /// Run statistics.
    #[must_use]
    pub fn statistics(world: &World) -> &RunStatistics {
        &world.snapshot.stats
    }

    /// Terminal outcome, once the stage is won or lost.
    #[must_use]
    pub fn outcome(world: &World) -> Option<StageOutcome> {
        world.snapshot.outcome
    }

    /// Reports whether a `StartWave` command would start a wave right now.
    #[must_use]
    pub fn can_start_wave(world: &World) -> bool {
        let wave = world.snapshot.wave;
        world.snapshot.outcome.is_none()
            && wave.status == WaveStatus::Idle
            && (wave.number as usize) < world.context.stage().waves.len()
    }
}
