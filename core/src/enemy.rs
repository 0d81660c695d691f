//! Enemy kinds, their stat table and the live enemy record.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{BossConfig, BossState, Debuffs, EnemyId, Path, Shield, TowerId};

/// Closed set of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow with a large health pool.
    Brute,
    /// Reduces direct hits by a flat amount.
    Armored,
    /// Carries a regenerating absorbing shield.
    Shielded,
    /// Support unit that periodically heals nearby enemies.
    Mender,
    /// Alternates between walking and a charge that ends in a teleport.
    Phaser,
    /// Breaks into spawnlings on death.
    Splitter,
    /// Offspring of a splitter.
    Spawnling,
    /// Disables nearby towers when it dies.
    Bomber,
    /// The stage boss; its stats come from the stage's boss configuration.
    Boss,
}

/// Static shield parameters for shield-bearing kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShieldProfile {
    /// Maximum shield points.
    pub capacity: f32,
    /// No-damage window before regeneration starts.
    pub regen_delay_ms: f32,
    /// Points restored per second after the delay.
    pub regen_per_second: f32,
}

/// Static parameters of the phasing charge/teleport cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseProfile {
    /// Milliseconds spent walking between charges.
    pub walk_ms: f32,
    /// Milliseconds spent charging, immune and stationary.
    pub charge_ms: f32,
    /// Path distance covered by the teleport.
    pub jump_distance: f32,
}

/// Static parameters of a mender's healing pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MendProfile {
    /// Health restored to each enemy caught by the pulse.
    pub amount: f32,
    /// Pulse radius in world units.
    pub radius: f32,
    /// Milliseconds between pulses before director scaling.
    pub interval_ms: f32,
}

/// Static parameters of a bomber's death blast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlastProfile {
    /// Radius of the blast in world units.
    pub radius: f32,
    /// How long towers caught in the blast stay disabled.
    pub disable_ms: f32,
}

impl EnemyKind {
    /// Base maximum health before director scaling.
    #[must_use]
    pub const fn base_health(self) -> f32 {
        match self {
            Self::Grunt => 100.0,
            Self::Runner => 60.0,
            Self::Brute => 400.0,
            Self::Armored => 180.0,
            Self::Shielded => 120.0,
            Self::Mender => 140.0,
            Self::Phaser => 110.0,
            Self::Splitter => 200.0,
            Self::Spawnling => 50.0,
            Self::Bomber => 150.0,
            Self::Boss => 0.0,
        }
    }

    /// Base walking speed in world units per second.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Grunt => 60.0,
            Self::Runner => 110.0,
            Self::Brute => 40.0,
            Self::Armored => 50.0,
            Self::Shielded => 55.0,
            Self::Mender => 50.0,
            Self::Phaser => 65.0,
            Self::Splitter => 50.0,
            Self::Spawnling => 80.0,
            Self::Bomber => 55.0,
            Self::Boss => 0.0,
        }
    }

    /// Gold paid for a kill before multipliers.
    #[must_use]
    pub const fn base_reward(self) -> u32 {
        match self {
            Self::Grunt => 10,
            Self::Runner => 8,
            Self::Brute => 25,
            Self::Armored => 18,
            Self::Shielded => 20,
            Self::Mender => 22,
            Self::Phaser => 20,
            Self::Splitter => 15,
            Self::Spawnling => 3,
            Self::Bomber => 20,
            Self::Boss => 0,
        }
    }

    /// Flat reduction applied to direct hits, if the kind is armored.
    #[must_use]
    pub const fn armor(self) -> Option<f32> {
        match self {
            Self::Armored => Some(10.0),
            _ => None,
        }
    }

    /// Shield parameters, if the kind spawns with a shield.
    #[must_use]
    pub const fn shield(self) -> Option<ShieldProfile> {
        match self {
            Self::Shielded => Some(ShieldProfile {
                capacity: 80.0,
                regen_delay_ms: 3_000.0,
                regen_per_second: 20.0,
            }),
            _ => None,
        }
    }

    /// Phasing cycle parameters, if the kind phases.
    #[must_use]
    pub const fn phasing(self) -> Option<PhaseProfile> {
        match self {
            Self::Phaser => Some(PhaseProfile {
                walk_ms: 2_500.0,
                charge_ms: 1_000.0,
                jump_distance: 120.0,
            }),
            _ => None,
        }
    }

    /// Healing pulse parameters, if the kind is a support unit.
    #[must_use]
    pub const fn mend(self) -> Option<MendProfile> {
        match self {
            Self::Mender => Some(MendProfile {
                amount: 25.0,
                radius: 90.0,
                interval_ms: 2_500.0,
            }),
            _ => None,
        }
    }

    /// Number of spawnlings released on death.
    #[must_use]
    pub const fn split_count(self) -> u32 {
        match self {
            Self::Splitter => 3,
            _ => 0,
        }
    }

    /// Death blast parameters, if the kind is volatile.
    #[must_use]
    pub const fn blast(self) -> Option<BlastProfile> {
        match self {
            Self::Bomber => Some(BlastProfile {
                radius: 100.0,
                disable_ms: 3_000.0,
            }),
            _ => None,
        }
    }
}

/// Sub-state of a phasing enemy's cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Phasing {
    /// Walking normally until the timer elapses.
    Walking {
        /// Milliseconds until the next charge starts.
        remaining_ms: f32,
    },
    /// Stationary and immune to direct hits until the teleport fires.
    Charging {
        /// Milliseconds until the teleport.
        remaining_ms: f32,
    },
}

/// Countdown to a mender's next healing pulse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MendPulse {
    /// Milliseconds until the next pulse.
    pub remaining_ms: f32,
}

/// Live enemy record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Identifier allocated at spawn.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Current health; never above `max_health`.
    pub health: f32,
    /// Maximum health after spawn scaling.
    pub max_health: f32,
    /// Unmodified walking speed.
    pub base_speed: f32,
    /// Gold paid on kill before multipliers.
    pub reward: u32,
    /// Current world position.
    pub position: Vec2,
    /// Path segment being walked.
    pub segment: usize,
    /// Distance covered along the current segment.
    pub progress: f32,
    /// Timed debuffs.
    pub debuffs: Debuffs,
    /// Milliseconds of forced freeze left.
    pub frozen_ms: f32,
    /// Absorbing shield, absent for kinds without one.
    pub shield: Option<Shield>,
    /// Phasing cycle, absent for non-phasing kinds.
    pub phasing: Option<Phasing>,
    /// Healing pulse countdown, absent for non-support kinds.
    pub mend: Option<MendPulse>,
    /// Boss sub-record; present on exactly the boss.
    pub boss: Option<BossState>,
    /// Tower that landed the most recent damaging hit.
    pub last_hit_by: Option<TowerId>,
}

impl Enemy {
    /// Spawns a regular enemy at the start of `path`.
    #[must_use]
    pub fn spawn(id: EnemyId, kind: EnemyKind, path: &Path, health_multiplier: f32) -> Self {
        let max_health = (kind.base_health() * sanitize_multiplier(health_multiplier)).max(1.0);
        Self {
            id,
            kind,
            health: max_health,
            max_health,
            base_speed: kind.base_speed(),
            reward: kind.base_reward(),
            position: path.start(),
            segment: 0,
            progress: 0.0,
            debuffs: Debuffs::default(),
            frozen_ms: 0.0,
            shield: kind.shield().map(|profile| {
                Shield::full(
                    profile.capacity,
                    profile.regen_delay_ms,
                    profile.regen_per_second,
                )
            }),
            phasing: kind.phasing().map(|profile| Phasing::Walking {
                remaining_ms: profile.walk_ms,
            }),
            mend: kind.mend().map(|profile| MendPulse {
                remaining_ms: profile.interval_ms,
            }),
            boss: None,
            last_hit_by: None,
        }
    }

    /// Spawns the stage boss at the start of `path`.
    #[must_use]
    pub fn boss(id: EnemyId, config: &BossConfig, path: &Path, health_multiplier: f32) -> Self {
        let max_health = (config.health * sanitize_multiplier(health_multiplier)).max(1.0);
        Self {
            id,
            kind: EnemyKind::Boss,
            health: max_health,
            max_health,
            base_speed: config.speed,
            reward: config.reward,
            position: path.start(),
            segment: 0,
            progress: 0.0,
            debuffs: Debuffs::default(),
            frozen_ms: 0.0,
            shield: None,
            phasing: None,
            mend: None,
            boss: Some(BossState::new(config)),
            last_hit_by: None,
        }
    }

    /// Places the enemy at a path location, keeping its position in sync.
    pub fn place_at(&mut self, path: &Path, segment: usize, progress: f32) {
        self.segment = segment;
        self.progress = progress;
        self.position = path.position_at(segment, progress);
    }

    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Reports whether the enemy is mid-charge and immune to direct hits.
    #[must_use]
    pub fn is_phased(&self) -> bool {
        matches!(self.phasing, Some(Phasing::Charging { .. }))
    }

    /// Current health as a fraction of maximum, always within `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 || !self.max_health.is_finite() {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Extra radius added to range checks: boss size, or zero.
    #[must_use]
    pub fn hit_radius(&self) -> f32 {
        self.boss.as_ref().map_or(0.0, |boss| boss.size)
    }

    /// Factor applied to damage by boss resistance; `Some(0.0)` while shielded.
    #[must_use]
    pub fn boss_damage_factor(&self) -> Option<f32> {
        self.boss.as_ref().map(BossState::damage_factor)
    }

    /// Subtracts `amount` from health, treating negative or NaN input as zero.
    ///
    /// Returns the amount actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let amount = clamp_damage(amount);
        let before = self.health.max(0.0);
        self.health = (self.health - amount).max(0.0);
        before - self.health
    }

    /// Restores up to `amount` health without exceeding the maximum.
    ///
    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + clamp_damage(amount)).min(self.max_health);
        self.health - before
    }
}

/// Clamps an intermediate damage value to a finite, non-negative amount.
#[must_use]
pub fn clamp_damage(amount: f32) -> f32 {
    if amount.is_finite() {
        amount.max(0.0)
    } else if amount == f32::INFINITY {
        f32::MAX
    } else {
        0.0
    }
}

fn sanitize_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

/// Returns the index of the live enemy with `id`, or `None` when it is gone or dead.
#[must_use]
pub fn find_live(enemies: &[Enemy], id: EnemyId) -> Option<usize> {
    enemies
        .iter()
        .position(|enemy| enemy.id == id && enemy.is_alive())
}
