//! Boss configuration tables and the boss sub-record carried by the boss enemy.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EnemyKind;

/// Static configuration for a stage's boss encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Maximum health before director scaling.
    pub health: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Gold paid once the death sequence completes.
    pub reward: u32,
    /// Body radius; added to tower range checks.
    pub size: f32,
    /// Lives lost when the boss walks off the path.
    pub leak_damage: u32,
    /// Duration of the death sequence during which enemy movement is frozen.
    pub death_sequence_ms: f32,
    /// Phases in entry order with descending health thresholds.
    #[serde(default)]
    pub phases: Vec<BossPhase>,
    /// Cooldown-gated abilities.
    #[serde(default)]
    pub abilities: Vec<BossAbilityConfig>,
    /// One-shot minion waves keyed on health fraction.
    #[serde(default)]
    pub minion_triggers: Vec<MinionTrigger>,
}

impl BossConfig {
    /// Phase parameters for `index`, falling back to neutral phase-0 behaviour.
    #[must_use]
    pub fn phase(&self, index: usize) -> BossPhase {
        self.phases.get(index).copied().unwrap_or(BossPhase::BASELINE)
    }

    /// Highest phase whose threshold is at or above `fraction`; phase 0 when none match.
    #[must_use]
    pub fn phase_for_fraction(&self, fraction: f32) -> usize {
        self.phases
            .iter()
            .enumerate()
            .filter(|(_, phase)| fraction <= phase.threshold)
            .map(|(index, _)| index)
            .max()
            .unwrap_or(0)
    }
}

/// Health-threshold phase of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossPhase {
    /// Health fraction at or below which the phase is entered.
    pub threshold: f32,
    /// Multiplier applied to the boss's walking speed.
    pub speed_multiplier: f32,
    /// Fraction of incoming damage ignored.
    pub damage_resistance: f32,
}

impl BossPhase {
    /// Neutral phase used when the phase table has no entry.
    pub const BASELINE: Self = Self {
        threshold: 1.0,
        speed_multiplier: 1.0,
        damage_resistance: 0.0,
    };
}

/// Ability entry in the boss's ability table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossAbilityConfig {
    /// Effect of the ability.
    pub ability: BossAbility,
    /// Cooldown applied each time the ability fires, before director scaling.
    pub cooldown_ms: f32,
    /// Lowest phase index in which the ability may fire.
    #[serde(default)]
    pub unlock_phase: usize,
}

/// Closed set of boss ability effects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BossAbility {
    /// Spawns minions beside the boss.
    Summon {
        /// Kind of minion.
        kind: EnemyKind,
        /// Number of minions.
        count: u32,
    },
    /// Makes the boss immune to damage for a while.
    Shield {
        /// Shield lifetime.
        duration_ms: f32,
    },
    /// Temporary speed boost.
    Haste {
        /// Speed multiplier while active.
        multiplier: f32,
        /// Buff lifetime.
        duration_ms: f32,
    },
    /// Temporary health regeneration.
    Regenerate {
        /// Health restored per second.
        per_second: f32,
        /// Buff lifetime.
        duration_ms: f32,
    },
    /// Projects a field that keeps towers inside it disabled.
    DisableField {
        /// Field radius.
        radius: f32,
        /// Field lifetime.
        duration_ms: f32,
    },
}

/// Health-fraction trigger that releases minions once.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinionTrigger {
    /// Fires the first tick health fraction is at or below this value.
    pub health_fraction: f32,
    /// Kind of minion.
    pub kind: EnemyKind,
    /// Number of minions.
    pub count: u32,
}

/// Temporary buff on the boss, decaying independently of ability cooldowns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BossBuff {
    /// Speed boost.
    Haste {
        /// Speed multiplier.
        multiplier: f32,
        /// Milliseconds left.
        remaining_ms: f32,
    },
    /// Health regeneration.
    Regenerate {
        /// Health restored per second.
        per_second: f32,
        /// Milliseconds left.
        remaining_ms: f32,
    },
}

impl BossBuff {
    /// Milliseconds left on the buff.
    #[must_use]
    pub const fn remaining_ms(&self) -> f32 {
        match self {
            Self::Haste { remaining_ms, .. } | Self::Regenerate { remaining_ms, .. } => {
                *remaining_ms
            }
        }
    }
}

/// Tower-disabling area projected by the boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisableField {
    /// Field center.
    pub center: Vec2,
    /// Field radius.
    pub radius: f32,
    /// Milliseconds the field persists.
    pub remaining_ms: f32,
}

/// Boss sub-record carried by the unique boss enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    /// Current phase index; never decreases.
    pub phase: usize,
    /// Speed multiplier of the current phase.
    pub speed_multiplier: f32,
    /// Damage resistance of the current phase.
    pub damage_resistance: f32,
    /// Body radius used for range checks.
    pub size: f32,
    /// Remaining cooldown per entry of the ability table.
    pub cooldowns: Vec<f32>,
    /// Milliseconds of self-shield left; zero when unshielded.
    pub shield_ms: f32,
    /// Indices of minion triggers that already fired.
    pub triggered: BTreeSet<usize>,
    /// Active temporary buffs.
    pub buffs: Vec<BossBuff>,
    /// Active disable fields.
    pub fields: Vec<DisableField>,
    /// Countdown of the death sequence once health reached zero.
    pub death_sequence_ms: Option<f32>,
}

impl BossState {
    /// Fresh boss record in phase 0 with every ability on its initial cooldown.
    #[must_use]
    pub fn new(config: &BossConfig) -> Self {
        let phase = config.phase(0);
        Self {
            phase: 0,
            speed_multiplier: phase.speed_multiplier,
            damage_resistance: phase.damage_resistance,
            size: config.size.max(0.0),
            cooldowns: config
                .abilities
                .iter()
                .map(|entry| entry.cooldown_ms.max(0.0))
                .collect(),
            shield_ms: 0.0,
            triggered: BTreeSet::new(),
            buffs: Vec::new(),
            fields: Vec::new(),
            death_sequence_ms: None,
        }
    }

    /// Reports whether the self-shield is up.
    #[must_use]
    pub fn is_shielded(&self) -> bool {
        self.shield_ms > 0.0
    }

    /// Reports whether the boss is playing out its death sequence.
    #[must_use]
    pub fn in_death_sequence(&self) -> bool {
        self.death_sequence_ms.is_some()
    }

    /// Multiplier applied to incoming damage.
    #[must_use]
    pub fn damage_factor(&self) -> f32 {
        if self.is_shielded() {
            return 0.0;
        }
        (1.0 - self.damage_resistance).clamp(0.0, 1.0)
    }

    /// Combined phase and haste speed multiplier.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        self.buffs
            .iter()
            .fold(self.speed_multiplier.max(0.0), |factor, buff| match buff {
                BossBuff::Haste { multiplier, .. } => factor * multiplier.max(0.0),
                BossBuff::Regenerate { .. } => factor,
            })
    }
}
