#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hazard fields: damage-over-time and pull zones that act independently of
//! towers and expire by countdown.

use rampart_core::{within_radius, Enemy, Hazard, HazardEffect, Path};
use tracing::debug;

/// Read-only inputs for one hazard step.
#[derive(Clone, Copy, Debug)]
pub struct HazardContext<'a> {
    /// Scaled tick duration in milliseconds.
    pub dt_ms: f32,
    /// Path walked by enemies, used by pull fields.
    pub path: &'a Path,
    /// Set while the boss death sequence freezes enemy movement.
    pub movement_frozen: bool,
}

/// Applies every active hazard to the enemies inside it and expires spent fields.
///
/// Returns the total damage dealt by burn fields.
pub fn advance_hazards(
    hazards: &mut Vec<Hazard>,
    enemies: &mut [Enemy],
    ctx: &HazardContext<'_>,
) -> f32 {
    let mut damage = 0.0;
    for hazard in hazards.iter_mut() {
        let active_ms = ctx.dt_ms.min(hazard.remaining_ms).max(0.0);
        for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            if !within_radius(hazard.position, enemy.position, hazard.radius + enemy.hit_radius())
            {
                continue;
            }
            match hazard.effect {
                HazardEffect::Burn { damage_per_second } => {
                    let factor = enemy.boss_damage_factor().unwrap_or(1.0);
                    let amount = damage_per_second.max(0.0) * active_ms / 1_000.0 * factor;
                    damage += enemy.apply_damage(amount);
                }
                HazardEffect::Pull { strength } => {
                    if enemy.boss.is_some() || ctx.movement_frozen {
                        continue;
                    }
                    let distance = strength.max(0.0) * active_ms / 1_000.0;
                    let (segment, progress) =
                        ctx.path.retreat(enemy.segment, enemy.progress, distance);
                    enemy.place_at(ctx.path, segment, progress);
                }
            }
        }
        hazard.remaining_ms -= ctx.dt_ms;
    }

    let before = hazards.len();
    hazards.retain(|hazard| !hazard.is_expired());
    let expired = before - hazards.len();
    if expired > 0 {
        debug!(target: "rampart::hazards", expired, "hazards.expired");
    }
    damage
}
