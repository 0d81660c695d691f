#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Death and loot resolution: rewards, splitting, bomber blasts and the
//! hand-off of a dying boss to its death sequence.

use rampart_core::{
    within_radius, Enemy, EnemyKind, Event, IdAllocator, Path, Tower, TowerId,
};
use tracing::debug;

/// Read-only inputs for death processing.
#[derive(Clone, Copy, Debug)]
pub struct DeathContext<'a> {
    /// Path on which offspring are placed.
    pub path: &'a Path,
    /// Director reward multiplier.
    pub gold_bonus: f32,
    /// Meta kill-gold multiplier.
    pub kill_multiplier: f32,
    /// Fraction of offspring health removed by chain-reaction augments.
    pub chain_reaction: f32,
    /// Director spawn-health multiplier applied to offspring.
    pub spawn_health: f32,
    /// Length of the boss death sequence.
    pub boss_death_sequence_ms: f32,
}

/// Totals produced by one death pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeathOutcome {
    /// Gold paid for kills.
    pub gold: u32,
    /// Regular enemies removed.
    pub kills: u32,
}

/// Removes every dead regular enemy, paying its reward and applying its death effect.
///
/// A dead boss is not removed: it enters its death sequence once and stays
/// in the live set until the boss system completes the countdown.
pub fn resolve_deaths(
    enemies: &mut Vec<Enemy>,
    towers: &mut [Tower],
    ids: &mut IdAllocator,
    ctx: &DeathContext<'_>,
    out: &mut Vec<Event>,
) -> DeathOutcome {
    let mut outcome = DeathOutcome::default();
    let mut survivors = Vec::with_capacity(enemies.len());
    let mut offspring = Vec::new();

    for mut enemy in enemies.drain(..) {
        if enemy.is_alive() {
            survivors.push(enemy);
            continue;
        }

        if let Some(boss) = enemy.boss.as_mut() {
            if boss.death_sequence_ms.is_none() {
                boss.death_sequence_ms = Some(ctx.boss_death_sequence_ms.max(0.0));
                boss.buffs.clear();
                boss.fields.clear();
                boss.shield_ms = 0.0;
                debug!(target: "rampart::death", enemy = enemy.id.get(), "boss.dying");
                out.push(Event::BossDeathSequenceStarted { enemy: enemy.id });
            }
            survivors.push(enemy);
            continue;
        }

        let reward = scaled_reward(enemy.reward, ctx.gold_bonus * ctx.kill_multiplier);
        outcome.gold = outcome.gold.saturating_add(reward);
        outcome.kills += 1;
        debug!(
            target: "rampart::death",
            enemy = enemy.id.get(),
            reward,
            "enemy.killed"
        );
        out.push(Event::EnemyKilled {
            enemy: enemy.id,
            kind: enemy.kind,
            tower: enemy.last_hit_by,
            reward,
        });

        split(&enemy, ids, ctx, &mut offspring, out);
        blast(&enemy, towers, out);
    }

    survivors.append(&mut offspring);
    *enemies = survivors;
    outcome
}

/// Rounds `reward × multiplier`, treating unusable multipliers as neutral.
#[must_use]
pub fn scaled_reward(reward: u32, multiplier: f32) -> u32 {
    let multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
        multiplier
    } else {
        1.0
    };
    (reward as f32 * multiplier).round() as u32
}

fn split(
    parent: &Enemy,
    ids: &mut IdAllocator,
    ctx: &DeathContext<'_>,
    offspring: &mut Vec<Enemy>,
    out: &mut Vec<Event>,
) {
    let count = parent.kind.split_count();
    if count == 0 {
        return;
    }
    let health = ctx.spawn_health * (1.0 - ctx.chain_reaction.clamp(0.0, 0.9));
    let mut children = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut child = Enemy::spawn(ids.next_enemy(), EnemyKind::Spawnling, ctx.path, health);
        child.place_at(ctx.path, parent.segment, parent.progress);
        out.push(Event::EnemySpawned {
            enemy: child.id,
            kind: child.kind,
        });
        children.push(child.id);
        offspring.push(child);
    }
    out.push(Event::EnemySplit {
        parent: parent.id,
        offspring: children,
    });
}

fn blast(enemy: &Enemy, towers: &mut [Tower], out: &mut Vec<Event>) {
    let Some(profile) = enemy.kind.blast() else {
        return;
    };
    let mut caught: Vec<TowerId> = Vec::new();
    for tower in towers.iter_mut() {
        if within_radius(enemy.position, tower.position, profile.radius) {
            tower.disabled_ms = tower.disabled_ms.max(profile.disable_ms);
            caught.push(tower.id);
        }
    }
    if caught.is_empty() {
        return;
    }
    debug!(
        target: "rampart::death",
        enemy = enemy.id.get(),
        towers = caught.len(),
        "bomber.blast"
    );
    out.push(Event::TowersDisabled {
        source: enemy.id,
        towers: caught,
        duration_ms: profile.disable_ms,
    });
}
