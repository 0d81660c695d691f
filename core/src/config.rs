//! Static stage configuration, meta effects and augments.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BossConfig, Bounds, EnemyKind, Specialization, TowerKind};

/// Errors raised while validating a stage configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The path cannot be walked.
    #[error("stage path needs at least two waypoints, found {found}")]
    TooFewWaypoints {
        /// Number of waypoints provided.
        found: usize,
    },
    /// Two consecutive waypoints coincide.
    #[error("path segment {segment} has zero length")]
    DegenerateSegment {
        /// Index of the offending segment.
        segment: usize,
    },
    /// The stage would be lost before it starts.
    #[error("starting lives must be positive")]
    NoLives,
    /// A boss wave exists but no boss is configured.
    #[error("wave {wave} is a boss wave but the stage has no boss configuration")]
    MissingBoss {
        /// One-based wave number.
        wave: usize,
    },
    /// Boss phase thresholds must strictly descend.
    #[error("boss phase {phase} threshold {threshold} does not descend from the previous phase")]
    PhaseOrder {
        /// Index of the offending phase.
        phase: usize,
        /// Threshold found.
        threshold: f32,
    },
    /// A numeric field is NaN or infinite.
    #[error("field `{field}` must be a finite number")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Group of identical enemies inside a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Kind of enemy spawned.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Nominal gap between consecutive spawns.
    pub interval_ms: f32,
    /// Delay before the group's first spawn, measured from wave start.
    #[serde(default)]
    pub delay_ms: f32,
}

/// Composition of one wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Spawn groups in authoring order.
    #[serde(default)]
    pub groups: Vec<SpawnGroup>,
    /// Appends the stage boss after the last group.
    #[serde(default)]
    pub boss: bool,
}

/// Economy knobs applied between waves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Life regeneration fires every this many cleared waves; zero disables it.
    pub life_regen_interval: u32,
    /// Lives restored per regeneration.
    pub life_regen_amount: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            life_regen_interval: 5,
            life_regen_amount: 1,
        }
    }
}

/// Scaling applied by the active director mode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectorModifiers {
    /// Multiplier on spawned enemy health.
    pub spawn_health: f32,
    /// Multiplier on kill rewards.
    pub gold_bonus: f32,
    /// Multiplier on enemy and boss ability cooldowns.
    pub cooldown: f32,
}

impl DirectorModifiers {
    /// Identity modifiers used in neutral mode.
    pub const NEUTRAL: Self = Self {
        spawn_health: 1.0,
        gold_bonus: 1.0,
        cooldown: 1.0,
    };
}

/// Thresholds and modifiers driving the difficulty director.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Consecutive zero-loss waves required for pressure.
    pub pressure_clean_waves: u32,
    /// Minimum gold for pressure.
    pub pressure_min_gold: u32,
    /// Minimum lives fraction for pressure.
    pub pressure_min_lives_fraction: f32,
    /// Relief is proposed below this lives fraction.
    pub relief_lives_fraction: f32,
    /// Relief is proposed when a wave costs at least this many lives.
    pub relief_lives_lost: u32,
    /// Modifiers while in pressure.
    pub pressure: DirectorModifiers,
    /// Modifiers while in relief.
    pub relief: DirectorModifiers,
    /// Escalation added per pressure wave.
    pub escalation_step: f32,
    /// Cap on accumulated escalation.
    pub escalation_cap: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            pressure_clean_waves: 2,
            pressure_min_gold: 300,
            pressure_min_lives_fraction: 0.8,
            relief_lives_fraction: 0.4,
            relief_lives_lost: 3,
            pressure: DirectorModifiers {
                spawn_health: 1.2,
                gold_bonus: 1.15,
                cooldown: 0.85,
            },
            relief: DirectorModifiers {
                spawn_health: 0.85,
                gold_bonus: 1.0,
                cooldown: 1.15,
            },
            escalation_step: 0.05,
            escalation_cap: 0.5,
        }
    }
}

/// Tower the stage places before the first wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpeningTower {
    /// Kind of tower.
    pub kind: TowerKind,
    /// Tower center.
    pub position: Vec2,
}

/// Complete static description of a stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Human-readable stage name; also the progress record key.
    pub name: String,
    /// Seed for every random stream of the run.
    #[serde(default)]
    pub seed: u64,
    /// Playfield rectangle.
    pub bounds: Bounds,
    /// Waypoints enemies walk, first to last.
    pub path: Vec<Vec2>,
    /// Gold available before the first wave.
    pub starting_gold: u32,
    /// Lives available before the first wave; also the lives cap.
    pub starting_lives: u32,
    /// Waves in play order.
    pub waves: Vec<WaveDefinition>,
    /// Boss encounter used by boss waves.
    #[serde(default)]
    pub boss: Option<BossConfig>,
    /// Between-wave economy knobs.
    #[serde(default)]
    pub economy: EconomyTuning,
    /// Difficulty director tuning.
    #[serde(default)]
    pub director: DirectorTuning,
    /// Tower layout placed before the first wave.
    #[serde(default)]
    pub opening: Vec<OpeningTower>,
}

impl StageConfig {
    /// Checks structural invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                found: self.path.len(),
            });
        }
        for (index, pair) in self.path.windows(2).enumerate() {
            if !pair[0].is_finite() || !pair[1].is_finite() {
                return Err(ConfigError::NonFinite { field: "path" });
            }
            if pair[0].distance(pair[1]) <= f32::EPSILON {
                return Err(ConfigError::DegenerateSegment { segment: index });
            }
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if !self.bounds.width.is_finite() || !self.bounds.height.is_finite() {
            return Err(ConfigError::NonFinite { field: "bounds" });
        }
        for (index, wave) in self.waves.iter().enumerate() {
            if wave.boss && self.boss.is_none() {
                return Err(ConfigError::MissingBoss { wave: index + 1 });
            }
            let finite = wave
                .groups
                .iter()
                .all(|group| group.interval_ms.is_finite() && group.delay_ms.is_finite());
            if !finite {
                return Err(ConfigError::NonFinite {
                    field: "waves.groups",
                });
            }
        }
        if let Some(boss) = &self.boss {
            validate_boss(boss)?;
        }
        Ok(())
    }
}

fn validate_boss(boss: &BossConfig) -> Result<(), ConfigError> {
    let numbers = [
        boss.health,
        boss.speed,
        boss.size,
        boss.death_sequence_ms,
    ];
    if numbers.iter().any(|value| !value.is_finite()) {
        return Err(ConfigError::NonFinite { field: "boss" });
    }
    let mut previous = f32::INFINITY;
    for (index, phase) in boss.phases.iter().enumerate() {
        if !phase.threshold.is_finite() || phase.threshold >= previous {
            return Err(ConfigError::PhaseOrder {
                phase: index,
                threshold: phase.threshold,
            });
        }
        previous = phase.threshold;
    }
    Ok(())
}

/// Resolved meta-progression effects supplied by the calling layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaEffects {
    /// Global tower damage multiplier.
    pub damage_multiplier: f32,
    /// Global tower range multiplier.
    pub range_multiplier: f32,
    /// Global tower fire-rate multiplier.
    pub fire_rate_multiplier: f32,
    /// Multiplier on kill rewards.
    pub kill_gold_multiplier: f32,
    /// Interest rate applied on wave clear.
    pub interest_rate: f32,
    /// Base critical-hit probability.
    pub crit_chance: f32,
    /// Extra lives restored by each life regeneration.
    pub life_regen_bonus: u32,
}

impl Default for MetaEffects {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            range_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            kill_gold_multiplier: 1.0,
            interest_rate: 0.0,
            crit_chance: 0.0,
            life_regen_bonus: 0,
        }
    }
}

/// Effect of a run augment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AugmentKind {
    /// Adds a fraction to effective damage.
    Damage {
        /// Fraction added, e.g. `0.15` for +15%.
        percent: f32,
    },
    /// Adds a fraction to effective range.
    Range {
        /// Fraction added.
        percent: f32,
    },
    /// Adds a fraction to effective fire rate.
    FireRate {
        /// Fraction added.
        percent: f32,
    },
    /// Adds to the wave-clear interest rate.
    Interest {
        /// Rate added.
        rate: f32,
    },
    /// Adds to the critical-hit probability.
    CritChance {
        /// Probability added.
        chance: f32,
    },
    /// Sniper hits splash onto nearby enemies.
    SniperSplash {
        /// Splash radius.
        radius: f32,
        /// Fraction of resolved damage dealt by the splash.
        fraction: f32,
    },
    /// Splitter offspring spawn weakened.
    ChainReaction {
        /// Fraction of offspring health removed.
        health_reduction: f32,
    },
}

/// Run augment, optionally restricted to a tower kind and specialization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Augment {
    /// Effect of the augment.
    pub kind: AugmentKind,
    /// Restricts stat augments to one tower kind.
    #[serde(default)]
    pub tower: Option<TowerKind>,
    /// Restricts stat augments to one specialization.
    #[serde(default)]
    pub specialization: Option<Specialization>,
}

impl Augment {
    /// Unrestricted augment.
    #[must_use]
    pub const fn global(kind: AugmentKind) -> Self {
        Self {
            kind,
            tower: None,
            specialization: None,
        }
    }

    /// Reports whether the augment's filters match a tower.
    #[must_use]
    pub fn applies_to(&self, kind: TowerKind, specialization: Option<Specialization>) -> bool {
        let kind_matches = self.tower.map_or(true, |wanted| wanted == kind);
        let spec_matches = self
            .specialization
            .map_or(true, |wanted| Some(wanted) == specialization);
        kind_matches && spec_matches
    }
}

/// Splash parameters granted to sniper hits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplashSpec {
    /// Splash radius.
    pub radius: f32,
    /// Fraction of resolved damage dealt to each splashed enemy.
    pub fraction: f32,
}

/// Summed interest rate from meta effects and interest augments.
#[must_use]
pub fn interest_rate(meta: &MetaEffects, augments: &[Augment]) -> f32 {
    augments
        .iter()
        .fold(meta.interest_rate, |rate, augment| match augment.kind {
            AugmentKind::Interest { rate: extra } => rate + extra,
            _ => rate,
        })
        .max(0.0)
}

/// Critical-hit probability clamped to `0.0..=1.0`.
#[must_use]
pub fn crit_chance(meta: &MetaEffects, augments: &[Augment]) -> f32 {
    let chance = augments
        .iter()
        .fold(meta.crit_chance, |chance, augment| match augment.kind {
            AugmentKind::CritChance { chance: extra } => chance + extra,
            _ => chance,
        });
    if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Strongest sniper splash among the augments, if any.
#[must_use]
pub fn sniper_splash(augments: &[Augment]) -> Option<SplashSpec> {
    augments
        .iter()
        .filter_map(|augment| match augment.kind {
            AugmentKind::SniperSplash { radius, fraction }
                if radius > 0.0 && fraction > 0.0 =>
            {
                Some(SplashSpec { radius, fraction })
            }
            _ => None,
        })
        .max_by(|a, b| a.fraction.total_cmp(&b.fraction))
}

/// Summed chain-reaction health reduction, capped at 90%.
#[must_use]
pub fn chain_reaction(augments: &[Augment]) -> f32 {
    augments
        .iter()
        .map(|augment| match augment.kind {
            AugmentKind::ChainReaction { health_reduction } => health_reduction.max(0.0),
            _ => 0.0,
        })
        .sum::<f32>()
        .min(0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BossPhase;

    fn stage() -> StageConfig {
        StageConfig {
            name: "test".to_owned(),
            seed: 7,
            bounds: Bounds::new(400.0, 300.0),
            path: vec![Vec2::new(0.0, 150.0), Vec2::new(400.0, 150.0)],
            starting_gold: 200,
            starting_lives: 20,
            waves: vec![WaveDefinition::default()],
            boss: None,
            economy: EconomyTuning::default(),
            director: DirectorTuning::default(),
            opening: Vec::new(),
        }
    }

    #[test]
    fn valid_stage_passes() {
        assert_eq!(stage().validate(), Ok(()));
    }

    #[test]
    fn short_or_degenerate_paths_are_rejected() {
        let mut config = stage();
        config.path.truncate(1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewWaypoints { found: 1 })
        );
        let mut config = stage();
        config.path.push(Vec2::new(400.0, 150.0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DegenerateSegment { segment: 1 })
        );
    }

    #[test]
    fn boss_wave_requires_boss_config() {
        let mut config = stage();
        config.waves.push(WaveDefinition {
            groups: Vec::new(),
            boss: true,
        });
        assert_eq!(config.validate(), Err(ConfigError::MissingBoss { wave: 2 }));
    }

    #[test]
    fn phase_thresholds_must_descend() {
        let mut config = stage();
        config.boss = Some(BossConfig {
            health: 500.0,
            speed: 30.0,
            reward: 100,
            size: 20.0,
            leak_damage: 5,
            death_sequence_ms: 1_000.0,
            phases: vec![
                BossPhase::BASELINE,
                BossPhase {
                    threshold: 0.5,
                    ..BossPhase::BASELINE
                },
                BossPhase {
                    threshold: 0.7,
                    ..BossPhase::BASELINE
                },
            ],
            abilities: Vec::new(),
            minion_triggers: Vec::new(),
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PhaseOrder { phase: 2, .. })
        ));
    }

    #[test]
    fn augment_filters_match_kind_and_specialization() {
        let augment = Augment {
            kind: AugmentKind::Damage { percent: 0.1 },
            tower: Some(TowerKind::Sniper),
            specialization: Some(Specialization::Offense),
        };
        assert!(augment.applies_to(TowerKind::Sniper, Some(Specialization::Offense)));
        assert!(!augment.applies_to(TowerKind::Sniper, None));
        assert!(!augment.applies_to(TowerKind::Arrow, Some(Specialization::Offense)));
    }

    #[test]
    fn derived_rates_sum_meta_and_augments() {
        let meta = MetaEffects {
            interest_rate: 0.05,
            crit_chance: 0.9,
            ..MetaEffects::default()
        };
        let augments = [
            Augment::global(AugmentKind::Interest { rate: 0.03 }),
            Augment::global(AugmentKind::CritChance { chance: 0.5 }),
            Augment::global(AugmentKind::ChainReaction {
                health_reduction: 0.6,
            }),
            Augment::global(AugmentKind::ChainReaction {
                health_reduction: 0.6,
            }),
        ];
        assert!((interest_rate(&meta, &augments) - 0.08).abs() < 1e-6);
        assert_eq!(crit_chance(&meta, &augments), 1.0);
        assert!((chain_reaction(&augments) - 0.9).abs() < 1e-6);
    }
}
