#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart combat simulation.
//!
//! This crate defines the data model and message surface that connects the
//! authoritative world, the pure per-tick systems and adapters. Adapters
//! submit [`Command`] values describing desired mutations, the world applies
//! them and runs the tick pipeline over an immutable [`Snapshot`], and every
//! observable consequence is reported as an [`Event`] for achievement
//! evaluators, persistence and UI layers to consume.

mod boss;
mod config;
mod enemy;
mod geometry;
mod hazard;
mod projectile;
mod snapshot;
mod status;
mod tower;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use boss::{
    BossAbility, BossAbilityConfig, BossBuff, BossConfig, BossPhase, BossState, DisableField,
    MinionTrigger,
};
pub use config::{
    chain_reaction, crit_chance, interest_rate, sniper_splash, Augment, AugmentKind, ConfigError,
    DirectorModifiers, DirectorTuning, EconomyTuning, MetaEffects, OpeningTower, SpawnGroup,
    SplashSpec, StageConfig, WaveDefinition,
};
pub use enemy::{
    clamp_damage, find_live, BlastProfile, Enemy, EnemyKind, MendProfile, MendPulse,
    PhaseProfile, Phasing, ShieldProfile,
};
pub use geometry::{
    compare_path_rank, distance_to_segment, within_radius, Bounds, Path, PathAdvance,
    TargetPriority,
};
pub use hazard::{Hazard, HazardEffect};
pub use projectile::{BurnSpec, ChainSpec, DamagePayload, MarkSpec, Projectile, ProjectileBehavior};
pub use snapshot::{
    DirectorMode, DirectorState, Economy, IdAllocator, PendingSpawn, RunStatistics, Snapshot,
    SpawnEntry, StageOutcome, TowerRecord, WaveState, WaveStatus,
};
pub use status::{Debuff, DebuffKind, Debuffs, Shield};
pub use tower::{
    AbilityKind, AbilityState, Delivery, Passive, PassiveKind, Specialization, Tower, TowerKind,
    TowerStats, BLIZZARD_FREEZE_MS, CHAIN_FRACTION, CHAIN_RADIUS, CHAIN_TARGETS,
    INCENDIARY_DPS, INCENDIARY_DURATION_MS, MARK_DURATION_MS, MARK_MULTIPLIER, MAX_LEVEL,
    RAPID_FIRE_MULTIPLIER,
};

/// Canonical banner emitted when a run starts.
pub const WELCOME_BANNER: &str = "Rampart holds the line.";

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a hazard field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardId(u32);

impl HazardId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible external mutations.
///
/// Legality and affordability are checked by the caller; the world only
/// ignores commands that reference towers it does not know.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Starts the next wave; ignored unless the wave status is idle.
    StartWave,
    /// Places a tower and charges its cost.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Center of the new tower.
        position: Vec2,
    },
    /// Removes a tower and refunds part of its investment.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Upgrades a tower by one level and charges the upgrade cost.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Chooses a tech branch for a max-level tower.
    Specialize {
        /// Tower to specialize.
        tower: TowerId,
        /// Branch to take.
        specialization: Specialization,
    },
    /// Changes how a tower orders its candidates.
    SetTargetPriority {
        /// Tower to configure.
        tower: TowerId,
        /// New ordering policy.
        priority: TargetPriority,
    },
    /// Activates a tower's ability if it is off cooldown.
    ActivateAbility {
        /// Tower whose ability fires.
        tower: TowerId,
    },
    /// Deploys a hazard field.
    DeployHazard {
        /// Field center.
        position: Vec2,
        /// Field radius.
        radius: f32,
        /// Field lifetime.
        duration_ms: f32,
        /// Effect on enemies inside.
        effect: HazardEffect,
    },
    /// Spawns an enemy at the path start outside the wave schedule.
    SpawnEnemy {
        /// Kind to spawn.
        kind: EnemyKind,
    },
}

/// Marker describing how a hit landed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum HitMarker {
    /// Damage reached the enemy.
    Damage {
        /// Damage after every modifier, shield absorption included.
        amount: f32,
        /// Whether the hit was a critical.
        critical: bool,
    },
    /// The boss shield blocked the hit.
    Blocked,
    /// The enemy was phased and ignored the hit.
    Immune,
    /// The hit attached a mark instead of dealing damage.
    Marked,
}

/// Origin of an ability activation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilitySource {
    /// A tower ability.
    Tower {
        /// Tower that activated.
        tower: TowerId,
        /// Ability that fired.
        ability: AbilityKind,
    },
    /// A boss ability.
    Boss {
        /// The boss.
        enemy: EnemyId,
        /// Ability that fired.
        ability: BossAbility,
    },
}

/// Events broadcast by the world while advancing a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A wave started spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Whether the wave brings the boss.
        boss: bool,
    },
    /// An enemy entered the path.
    EnemySpawned {
        /// Identifier of the new enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKind,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Identifier of the new tower.
        tower: TowerId,
        /// Kind of the new tower.
        kind: TowerKind,
    },
    /// A tower was upgraded.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Level reached.
        level: u8,
    },
    /// A tower was sold.
    TowerSold {
        /// Sold tower.
        tower: TowerId,
        /// Gold refunded.
        refund: u32,
    },
    /// A direct, area or secondary hit landed on an enemy.
    EnemyHit {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Tower credited with the hit.
        source: Option<TowerId>,
        /// How the hit landed.
        marker: HitMarker,
    },
    /// An enemy shield was driven to zero.
    ShieldBroken {
        /// Enemy whose shield broke.
        enemy: EnemyId,
    },
    /// A regular enemy died and paid its reward.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Tower that landed the last hit.
        tower: Option<TowerId>,
        /// Gold paid.
        reward: u32,
    },
    /// An enemy walked off the end of the path.
    EnemyLeaked {
        /// Enemy that leaked.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Lives taken.
        lives_lost: u32,
    },
    /// A splitter broke into offspring.
    EnemySplit {
        /// Splitter that died.
        parent: EnemyId,
        /// Offspring spawned at the death point.
        offspring: Vec<EnemyId>,
    },
    /// Towers were disabled by a blast.
    TowersDisabled {
        /// Enemy that caused the blast.
        source: EnemyId,
        /// Towers caught in the blast.
        towers: Vec<TowerId>,
        /// Disable duration.
        duration_ms: f32,
    },
    /// A support enemy pulsed its heal.
    SupportPulse {
        /// Healer.
        enemy: EnemyId,
        /// Number of allies that regained health.
        healed: u32,
    },
    /// A tower or boss ability fired.
    AbilityUsed {
        /// Who fired which ability.
        source: AbilitySource,
    },
    /// The boss entered a new phase.
    BossPhaseChanged {
        /// The boss.
        enemy: EnemyId,
        /// Phase entered.
        phase: usize,
    },
    /// A health-threshold minion trigger fired.
    BossMinionsTriggered {
        /// The boss.
        enemy: EnemyId,
        /// Index of the trigger in the boss configuration.
        trigger: usize,
        /// Minions spawned.
        minions: Vec<EnemyId>,
    },
    /// The boss reached zero health and began its death sequence.
    BossDeathSequenceStarted {
        /// The boss.
        enemy: EnemyId,
    },
    /// The boss death sequence completed.
    BossDefeated {
        /// The boss.
        enemy: EnemyId,
        /// Gold paid.
        reward: u32,
    },
    /// The path emptied after the wave finished spawning.
    WaveComplete {
        /// Wave number.
        wave: u32,
        /// Lives lost during the wave.
        lives_lost: u32,
        /// Gold paid as interest.
        interest: u32,
        /// Lives restored by regeneration.
        lives_restored: u32,
    },
    /// The director switched modes.
    DirectorModeChanged {
        /// Mode before the switch.
        from: DirectorMode,
        /// Mode after the switch.
        to: DirectorMode,
    },
    /// The final wave was cleared.
    StageComplete {
        /// Star rating.
        stars: u8,
    },
    /// Lives ran out.
    GameOver {
        /// Wave during which the stage was lost.
        wave: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    fn stage() -> StageConfig {
        StageConfig {
            name: "round-trip".to_owned(),
            seed: 11,
            bounds: Bounds::new(640.0, 360.0),
            path: vec![Vec2::new(0.0, 180.0), Vec2::new(640.0, 180.0)],
            starting_gold: 250,
            starting_lives: 20,
            waves: vec![WaveDefinition {
                groups: vec![SpawnGroup {
                    kind: EnemyKind::Grunt,
                    count: 4,
                    interval_ms: 800.0,
                    delay_ms: 0.0,
                }],
                boss: false,
            }],
            boss: None,
            economy: EconomyTuning::default(),
            director: DirectorTuning::default(),
            opening: Vec::new(),
        }
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
        assert_round_trip(&TowerId::new(7));
        assert_round_trip(&ProjectileId::new(3));
        assert_round_trip(&HazardId::new(9));
    }

    #[test]
    fn events_round_trip_through_bincode() {
        assert_round_trip(&Event::EnemyHit {
            enemy: EnemyId::new(1),
            source: Some(TowerId::new(2)),
            marker: HitMarker::Damage {
                amount: 12.5,
                critical: true,
            },
        });
        assert_round_trip(&Event::EnemySplit {
            parent: EnemyId::new(4),
            offspring: vec![EnemyId::new(5), EnemyId::new(6)],
        });
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let config = stage();
        let mut snapshot = Snapshot::initial(&config);
        let path = Path::new(config.path.clone());
        let id = snapshot.ids.next_enemy();
        snapshot
            .enemies
            .push(Enemy::spawn(id, EnemyKind::Shielded, &path, 1.0));
        let tower = snapshot.ids.next_tower();
        snapshot
            .towers
            .push(Tower::place(tower, TowerKind::Frost, Vec2::new(100.0, 150.0)));
        assert_round_trip(&snapshot);
    }

    #[test]
    fn progress_critical_structs_round_trip_through_bincode() {
        let mut stats = RunStatistics::default();
        stats.record_kill(Some(TowerId::new(1)));
        assert_round_trip(&stats);
        assert_round_trip(&StageOutcome::Victory { stars: 3 });
    }
}
