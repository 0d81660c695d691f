#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that recomputes tower effective stats from their immutable base.
//!
//! Effective stats are never accumulated tick over tick: every call starts
//! from [`Tower::base`] and composes global meta multipliers, nearby auras,
//! the tower's own active buff and matching augments by product. Resolving
//! twice with the same inputs always yields the same output.

use glam::Vec2;
use rampart_core::{
    within_radius, Augment, AugmentKind, MetaEffects, PassiveKind, Tower, TowerStats,
};

/// Advances ability cooldown/activity counters and disable countdowns by `dt_ms`.
pub fn advance_tower_timers(towers: &mut [Tower], dt_ms: f32) {
    for tower in towers {
        if let Some(ability) = tower.ability.as_mut() {
            ability.tick(dt_ms);
        }
        tower.disabled_ms = (tower.disabled_ms - dt_ms).max(0.0);
    }
}

/// Computes the effective stats of `tower` given every placed tower.
#[must_use]
pub fn resolve_tower(
    tower: &Tower,
    towers: &[Tower],
    augments: &[Augment],
    meta: &MetaEffects,
) -> TowerStats {
    if tower.is_disabled() {
        return TowerStats::ZERO;
    }

    let mut damage = tower.base.damage * multiplier(meta.damage_multiplier);
    let mut range = tower.base.range * multiplier(meta.range_multiplier);
    let mut fire_rate = tower.base.fire_rate * multiplier(meta.fire_rate_multiplier);

    for other in towers {
        if other.id == tower.id || other.is_disabled() {
            continue;
        }
        let Some(passive) = other.passive() else {
            continue;
        };
        if !within_radius(other.position, tower.position, passive.radius) {
            continue;
        }
        match passive.kind {
            PassiveKind::DamageAura => damage *= multiplier(passive.multiplier),
            PassiveKind::FireRateAura => fire_rate *= multiplier(passive.multiplier),
            PassiveKind::SlowAura | PassiveKind::RootAura => {}
        }
    }

    fire_rate *= tower.self_fire_rate_multiplier();

    let mut bonus = AugmentBonus::default();
    for augment in augments
        .iter()
        .filter(|augment| augment.applies_to(tower.kind, tower.specialization))
    {
        bonus.add(augment.kind);
    }

    TowerStats {
        damage: damage * (1.0 + bonus.damage),
        range: range * (1.0 + bonus.range),
        fire_rate: fire_rate * (1.0 + bonus.fire_rate),
    }
}

/// Returns a copy of `towers` with every effective stat block recomputed.
#[must_use]
pub fn resolve_all(towers: &[Tower], augments: &[Augment], meta: &MetaEffects) -> Vec<Tower> {
    towers
        .iter()
        .map(|tower| {
            let mut resolved = tower.clone();
            resolved.effective = resolve_tower(tower, towers, augments, meta);
            resolved
        })
        .collect()
}

/// Weakest slow or root multiplier covering `position`, `1.0` when none does.
#[must_use]
pub fn slow_factor_at(position: Vec2, towers: &[Tower]) -> f32 {
    towers
        .iter()
        .filter(|tower| !tower.is_disabled())
        .filter_map(|tower| {
            let passive = tower.passive()?;
            let slows = matches!(passive.kind, PassiveKind::SlowAura | PassiveKind::RootAura);
            (slows && within_radius(tower.position, position, passive.radius))
                .then(|| passive.multiplier.clamp(0.0, 1.0))
        })
        .fold(1.0, f32::min)
}

#[derive(Debug, Default)]
struct AugmentBonus {
    damage: f32,
    range: f32,
    fire_rate: f32,
}

impl AugmentBonus {
    fn add(&mut self, kind: AugmentKind) {
        match kind {
            AugmentKind::Damage { percent } => self.damage += percentage(percent),
            AugmentKind::Range { percent } => self.range += percentage(percent),
            AugmentKind::FireRate { percent } => self.fire_rate += percentage(percent),
            AugmentKind::Interest { .. }
            | AugmentKind::CritChance { .. }
            | AugmentKind::SniperSplash { .. }
            | AugmentKind::ChainReaction { .. } => {}
        }
    }
}

fn multiplier(value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        1.0
    }
}

fn percentage(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
