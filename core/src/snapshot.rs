//! Immutable per-tick state snapshot and its bookkeeping records.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    DirectorModifiers, DirectorTuning, Enemy, EnemyId, EnemyKind, Hazard, HazardId, Projectile,
    ProjectileId, StageConfig, Tower, TowerId,
};

/// Lifecycle status of the current wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveStatus {
    /// Between waves.
    #[default]
    Idle,
    /// Spawn queue still has entries.
    Spawning,
    /// Everything spawned; waiting for the path to empty.
    Clearing,
}

/// Wave counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// One-based number of the current or last started wave.
    pub number: u32,
    /// Lifecycle status.
    pub status: WaveStatus,
    /// Lives lost since the wave started.
    pub lives_lost_this_wave: u32,
    /// Consecutive waves cleared without losing a life.
    pub clean_streak: u32,
    /// Waves cleared so far.
    pub cleared: u32,
}

/// Difficulty director mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectorMode {
    /// Neutral scaling.
    #[default]
    Neutral,
    /// Harder spawns, richer rewards.
    Pressure,
    /// Softer spawns, slower enemy abilities.
    Relief,
}

/// Director hysteresis state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorState {
    /// Active mode.
    pub mode: DirectorMode,
    /// First proposal of a different mode awaiting confirmation.
    pub pending: Option<DirectorMode>,
    /// Consecutive evaluations spent in pressure.
    pub pressure_streak: u32,
}

impl DirectorState {
    /// Scaling of the active mode, including pressure escalation.
    #[must_use]
    pub fn modifiers(&self, tuning: &DirectorTuning) -> DirectorModifiers {
        match self.mode {
            DirectorMode::Neutral => DirectorModifiers::NEUTRAL,
            DirectorMode::Relief => tuning.relief,
            DirectorMode::Pressure => {
                let escalation = (tuning.escalation_step * self.pressure_streak as f32)
                    .min(tuning.escalation_cap)
                    .max(0.0);
                DirectorModifiers {
                    spawn_health: tuning.pressure.spawn_health + escalation,
                    gold_bonus: tuning.pressure.gold_bonus + escalation,
                    cooldown: tuning.pressure.cooldown,
                }
            }
        }
    }
}

/// Gold and lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    /// Spendable gold.
    pub gold: u32,
    /// Lives remaining.
    pub lives: u32,
    /// Lives cap.
    pub max_lives: u32,
}

impl Economy {
    /// Remaining lives as a fraction of the cap.
    #[must_use]
    pub fn lives_fraction(&self) -> f32 {
        if self.max_lives == 0 {
            return 0.0;
        }
        self.lives as f32 / self.max_lives as f32
    }
}

/// Running totals for one tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerRecord {
    /// Kills credited.
    pub kills: u32,
    /// Damage dealt.
    pub damage: f32,
}

/// Run-wide statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Enemies killed.
    pub kills: u32,
    /// Enemies that reached the end of the path.
    pub leaks: u32,
    /// Damage dealt to enemies.
    pub damage_dealt: f32,
    /// Gold earned from kills, bosses and interest.
    pub gold_earned: u64,
    /// Critical hits landed.
    pub critical_hits: u32,
    /// Enemy shields broken.
    pub shields_broken: u32,
    /// Bosses defeated.
    pub bosses_defeated: u32,
    /// Waves cleared.
    pub waves_cleared: u32,
    /// Wall-clock milliseconds spent paused.
    pub paused_ms: f64,
    /// Per-tower totals, kept after a tower is sold.
    pub towers: BTreeMap<TowerId, TowerRecord>,
}

impl RunStatistics {
    /// Records damage dealt by `source`.
    pub fn record_damage(&mut self, source: Option<TowerId>, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.damage_dealt += amount;
        if let Some(tower) = source {
            self.towers.entry(tower).or_default().damage += amount;
        }
    }

    /// Records a kill credited to `source`.
    pub fn record_kill(&mut self, source: Option<TowerId>) {
        self.kills += 1;
        if let Some(tower) = source {
            self.towers.entry(tower).or_default().kills += 1;
        }
    }
}

/// Monotonic identifier source; identifiers are never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    enemy: u32,
    tower: u32,
    projectile: u32,
    hazard: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            enemy: 1,
            tower: 1,
            projectile: 1,
            hazard: 1,
        }
    }
}

impl IdAllocator {
    /// Allocates the next enemy identifier.
    pub fn next_enemy(&mut self) -> EnemyId {
        let id = EnemyId::new(self.enemy);
        self.enemy = self.enemy.wrapping_add(1);
        id
    }

    /// Allocates the next tower identifier.
    pub fn next_tower(&mut self) -> TowerId {
        let id = TowerId::new(self.tower);
        self.tower = self.tower.wrapping_add(1);
        id
    }

    /// Allocates the next projectile identifier.
    pub fn next_projectile(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.projectile);
        self.projectile = self.projectile.wrapping_add(1);
        id
    }

    /// Allocates the next hazard identifier.
    pub fn next_hazard(&mut self) -> HazardId {
        let id = HazardId::new(self.hazard);
        self.hazard = self.hazard.wrapping_add(1);
        id
    }
}

/// What a queued spawn produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEntry {
    /// A regular enemy.
    Enemy(EnemyKind),
    /// The stage boss.
    Boss,
}

/// Spawn scheduled by the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingSpawn {
    /// Milliseconds until the spawn is due.
    pub remaining_ms: f32,
    /// What to spawn.
    pub entry: SpawnEntry,
}

/// Terminal state of a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageOutcome {
    /// Every wave cleared.
    Victory {
        /// Star rating between 1 and 3.
        stars: u8,
    },
    /// Lives ran out.
    Defeat,
}

/// Authoritative simulation state at the end of a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks advanced so far, paused ticks included.
    pub tick: u64,
    /// Scaled simulation time elapsed.
    pub elapsed_ms: f64,
    /// Enemies on the path, including dead ones awaiting death processing.
    pub enemies: Vec<Enemy>,
    /// Placed towers.
    pub towers: Vec<Tower>,
    /// Projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Active hazard fields.
    pub hazards: Vec<Hazard>,
    /// Wave counters.
    pub wave: WaveState,
    /// Director hysteresis state.
    pub director: DirectorState,
    /// Gold and lives.
    pub economy: Economy,
    /// Run statistics.
    pub stats: RunStatistics,
    /// Identifier source.
    pub ids: IdAllocator,
    /// Random stream for critical rolls.
    pub rng: ChaCha8Rng,
    /// Spawns scheduled by the current wave.
    pub spawn_queue: Vec<PendingSpawn>,
    /// Set once the stage is won or lost.
    pub outcome: Option<StageOutcome>,
}

impl Snapshot {
    /// Initial snapshot for a stage, before any command.
    #[must_use]
    pub fn initial(config: &StageConfig) -> Self {
        Self {
            tick: 0,
            elapsed_ms: 0.0,
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            hazards: Vec::new(),
            wave: WaveState::default(),
            director: DirectorState::default(),
            economy: Economy {
                gold: config.starting_gold,
                lives: config.starting_lives,
                max_lives: config.starting_lives,
            },
            stats: RunStatistics::default(),
            ids: IdAllocator::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            spawn_queue: Vec::new(),
            outcome: None,
        }
    }

    /// Reports whether the boss is currently on the path.
    #[must_use]
    pub fn boss_present(&self) -> bool {
        self.enemies.iter().any(|enemy| enemy.boss.is_some())
    }

    /// Tower with `id`, if placed.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|tower| tower.id == id)
    }
}
