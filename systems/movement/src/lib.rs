#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy motion and self-status: path following, speed modifiers, phasing,
//! shield regeneration, debuff ticking and leak detection.

use rampart_core::{
    DebuffKind, Enemy, EnemyKind, Event, Path, PathAdvance, Phasing, Tower, TowerId,
};
use rampart_system_stat_resolver::slow_factor_at;
use tracing::debug;

/// Read-only inputs for one motion step.
#[derive(Clone, Copy, Debug)]
pub struct MotionContext<'a> {
    /// Scaled tick duration in milliseconds.
    pub dt_ms: f32,
    /// Path every enemy walks.
    pub path: &'a Path,
    /// Towers after stat resolution, used for slow and root auras.
    pub towers: &'a [Tower],
    /// Set while the boss death sequence freezes enemy movement.
    pub movement_frozen: bool,
    /// Lives taken when the boss leaks.
    pub boss_leak_damage: u32,
}

/// Aggregate results of a motion step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionOutcome {
    /// Lives lost to leaks this step.
    pub lives_lost: u32,
    /// Number of enemies that leaked.
    pub leaks: u32,
    /// Burn damage dealt this step, keyed by the tower that applied the burn.
    pub burn_damage: Vec<(Option<TowerId>, f32)>,
}

/// Moves every living enemy, ticks its timers and removes leaks.
///
/// Dead enemies are kept untouched so death processing can observe them
/// later in the tick. Each leak is reported exactly once and the leaking
/// enemy is removed from the returned set in the same step.
pub fn advance_enemies(
    enemies: &mut Vec<Enemy>,
    ctx: &MotionContext<'_>,
    out: &mut Vec<Event>,
) -> MotionOutcome {
    let mut outcome = MotionOutcome::default();
    let mut survivors = Vec::with_capacity(enemies.len());

    for mut enemy in enemies.drain(..) {
        if !enemy.is_alive() {
            survivors.push(enemy);
            continue;
        }

        tick_status(&mut enemy, ctx.dt_ms, &mut outcome);
        if !enemy.is_alive() {
            survivors.push(enemy);
            continue;
        }

        let frozen = enemy.frozen_ms > 0.0;
        enemy.frozen_ms = (enemy.frozen_ms - ctx.dt_ms).max(0.0);

        if ctx.movement_frozen {
            survivors.push(enemy);
            continue;
        }

        let multiplier = speed_multiplier(&enemy, ctx, frozen);
        if multiplier <= 0.0 {
            survivors.push(enemy);
            continue;
        }

        let step = match advance_phasing(&mut enemy, ctx) {
            PhaseStep::Walk => walk(&mut enemy, ctx, multiplier),
            PhaseStep::Hold => Step::Stayed,
            PhaseStep::Teleported(step) => step,
        };

        match step {
            Step::Stayed => survivors.push(enemy),
            Step::Exited => {
                let lives_lost = if enemy.kind == EnemyKind::Boss {
                    ctx.boss_leak_damage
                } else {
                    1
                };
                outcome.lives_lost = outcome.lives_lost.saturating_add(lives_lost);
                outcome.leaks += 1;
                debug!(
                    target: "rampart::movement",
                    enemy = enemy.id.get(),
                    lives_lost,
                    "enemy.leaked"
                );
                out.push(Event::EnemyLeaked {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    lives_lost,
                });
            }
        }
    }

    *enemies = survivors;
    outcome
}

fn tick_status(enemy: &mut Enemy, dt_ms: f32, outcome: &mut MotionOutcome) {
    let burn_source = enemy.debuffs.iter().find_map(|debuff| match debuff.kind {
        DebuffKind::Burn { .. } => Some(debuff.source),
        DebuffKind::Mark { .. } => None,
    });
    let burn = enemy.debuffs.tick(dt_ms);
    if burn > 0.0 {
        let factor = enemy.boss_damage_factor().unwrap_or(1.0);
        let removed = enemy.apply_damage(burn * factor);
        if removed > 0.0 {
            outcome.burn_damage.push((burn_source.flatten(), removed));
        }
    }
    if let Some(shield) = enemy.shield.as_mut() {
        shield.tick(dt_ms);
    }
}

enum PhaseStep {
    Walk,
    Hold,
    Teleported(Step),
}

enum Step {
    Stayed,
    Exited,
}

fn advance_phasing(enemy: &mut Enemy, ctx: &MotionContext<'_>) -> PhaseStep {
    let (Some(phasing), Some(profile)) = (enemy.phasing, enemy.kind.phasing()) else {
        return PhaseStep::Walk;
    };
    match phasing {
        Phasing::Walking { remaining_ms } => {
            let remaining_ms = remaining_ms - ctx.dt_ms;
            if remaining_ms > 0.0 {
                enemy.phasing = Some(Phasing::Walking { remaining_ms });
                PhaseStep::Walk
            } else {
                enemy.phasing = Some(Phasing::Charging {
                    remaining_ms: profile.charge_ms,
                });
                PhaseStep::Hold
            }
        }
        Phasing::Charging { remaining_ms } => {
            let remaining_ms = remaining_ms - ctx.dt_ms;
            if remaining_ms > 0.0 {
                enemy.phasing = Some(Phasing::Charging { remaining_ms });
                return PhaseStep::Hold;
            }
            enemy.phasing = Some(Phasing::Walking {
                remaining_ms: profile.walk_ms,
            });
            PhaseStep::Teleported(follow_path(enemy, ctx.path, profile.jump_distance))
        }
    }
}

/// Combined speed multiplier for this tick; zero stops walking and phasing alike.
fn speed_multiplier(enemy: &Enemy, ctx: &MotionContext<'_>, frozen: bool) -> f32 {
    if frozen {
        return 0.0;
    }
    let multiplier = enemy
        .boss
        .as_ref()
        .map_or(1.0, |boss| boss.speed_factor())
        * slow_factor_at(enemy.position, ctx.towers);
    if multiplier.is_finite() {
        multiplier.max(0.0)
    } else {
        0.0
    }
}

fn walk(enemy: &mut Enemy, ctx: &MotionContext<'_>, multiplier: f32) -> Step {
    let distance = enemy.base_speed.max(0.0) * multiplier * ctx.dt_ms / 1_000.0;
    follow_path(enemy, ctx.path, distance)
}

fn follow_path(enemy: &mut Enemy, path: &Path, distance: f32) -> Step {
    match path.advance(enemy.segment, enemy.progress, distance) {
        PathAdvance::Moving {
            segment,
            progress,
            position,
        } => {
            enemy.segment = segment;
            enemy.progress = progress;
            enemy.position = position;
            Step::Stayed
        }
        PathAdvance::Exited => Step::Exited,
    }
}
