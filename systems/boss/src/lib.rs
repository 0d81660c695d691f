#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boss state machine: monotonic phases, cooldown-gated abilities, buffs,
//! disable fields, one-shot minion triggers and the death sequence.

use rampart_core::{
    within_radius, AbilitySource, BossAbility, BossBuff, BossConfig, DisableField, Enemy,
    EnemyId, EnemyKind, Event, IdAllocator, Path, Tower,
};
use tracing::{debug, info, warn};

/// Read-only inputs for one boss step.
#[derive(Clone, Copy, Debug)]
pub struct BossContext<'a> {
    /// Scaled tick duration in milliseconds.
    pub dt_ms: f32,
    /// Stage boss configuration, if the stage has one.
    pub config: Option<&'a BossConfig>,
    /// Path on which minions are placed.
    pub path: &'a Path,
    /// Director cooldown multiplier applied when an ability resets.
    pub cooldown_multiplier: f32,
    /// Director spawn-health multiplier applied to minions.
    pub spawn_health: f32,
    /// Combined director and meta multiplier applied to the boss reward.
    pub gold_multiplier: f32,
}

/// Results of one boss step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BossOutcome {
    /// Gold paid when the death sequence completed.
    pub gold: u32,
    /// Set when the boss was removed this step.
    pub defeated: bool,
}

/// Advances the boss carried by `enemies`, if any.
pub fn advance_boss(
    enemies: &mut Vec<Enemy>,
    towers: &mut [Tower],
    ids: &mut IdAllocator,
    ctx: &BossContext<'_>,
    out: &mut Vec<Event>,
) -> BossOutcome {
    let Some(index) = enemies.iter().position(|enemy| enemy.boss.is_some()) else {
        return BossOutcome::default();
    };
    let Some(config) = ctx.config else {
        warn!(target: "rampart::boss", "boss.config_missing");
        return BossOutcome::default();
    };
    if let Some(outcome) = advance_death_sequence(enemies, index, config, ctx, out) {
        return outcome;
    }
    let mut spawned = Vec::new();
    advance_phase(&mut enemies[index], config, out);
    advance_timers(&mut enemies[index], ctx.dt_ms);
    trigger_minions(&mut enemies[index], config, ids, ctx, &mut spawned, out);
    use_abilities(&mut enemies[index], config, ids, ctx, &mut spawned, out);
    apply_fields(&enemies[index], towers);
    enemies.append(&mut spawned);
    BossOutcome::default()
}
fn advance_death_sequence(
    enemies: &mut Vec<Enemy>,
    index: usize,
    config: &BossConfig,
    ctx: &BossContext<'_>,
    out: &mut Vec<Event>,
) -> Option<BossOutcome> {
    let boss = enemies[index].boss.as_mut()?;
    let remaining = boss.death_sequence_ms? - ctx.dt_ms;
    if remaining > 0.0 {
        boss.death_sequence_ms = Some(remaining);
        return Some(BossOutcome::default());
    }
    let enemy = enemies.remove(index);
    let multiplier = if ctx.gold_multiplier.is_finite() && ctx.gold_multiplier >= 0.0 {
        ctx.gold_multiplier
    } else {
        1.0
    };
    let reward = (config.reward as f32 * multiplier).round() as u32;
    info!(target: "rampart::boss", enemy = enemy.id.get(), reward, "boss.defeated");
    out.push(Event::BossDefeated {
        enemy: enemy.id,
        reward,
    });
    Some(BossOutcome {
        gold: reward,
        defeated: true,
    })
}
fn advance_phase(enemy: &mut Enemy, config: &BossConfig, out: &mut Vec<Event>) {
    let target = config.phase_for_fraction(enemy.health_fraction());
    let Some(boss) = enemy.boss.as_mut() else {
        return;
    };
    if target <= boss.phase {
        return;
    }
    let phase = config.phase(target);
    boss.phase = target;
    boss.speed_multiplier = phase.speed_multiplier;
    boss.damage_resistance = phase.damage_resistance;
    info!(target: "rampart::boss", enemy = enemy.id.get(), phase = target, "boss.phase_changed");
    out.push(Event::BossPhaseChanged {
        enemy: enemy.id,
        phase: target,
    });
}
fn advance_timers(enemy: &mut Enemy, dt_ms: f32) {
    let Some(boss) = enemy.boss.as_mut() else {
        return;
    };
    boss.shield_ms = (boss.shield_ms - dt_ms).max(0.0);
    let mut regen = 0.0;
    for buff in &mut boss.buffs {
        match buff {
            BossBuff::Haste { remaining_ms, .. } => *remaining_ms -= dt_ms,
            BossBuff::Regenerate {
                per_second,
                remaining_ms,
            } => {
                regen += per_second.max(0.0) * dt_ms.min(*remaining_ms).max(0.0) / 1_000.0;
                *remaining_ms -= dt_ms;
            }
        }
    }
    boss.buffs.retain(|buff| buff.remaining_ms() > 0.0);
    for field in &mut boss.fields {
        field.remaining_ms -= dt_ms;
    }
    boss.fields.retain(|field| field.remaining_ms > 0.0);
    if regen > 0.0 {
        let _ = enemy.heal(regen);
    }
}
fn trigger_minions(
    enemy: &mut Enemy,
    config: &BossConfig,
    ids: &mut IdAllocator,
    ctx: &BossContext<'_>,
    spawned: &mut Vec<Enemy>,
    out: &mut Vec<Event>,
) {
    let fraction = enemy.health_fraction();
    let (id, segment, progress) = (enemy.id, enemy.segment, enemy.progress);
    let Some(boss) = enemy.boss.as_mut() else {
        return;
    };
    for (index, trigger) in config.minion_triggers.iter().enumerate() {
        if fraction > trigger.health_fraction || boss.triggered.contains(&index) {
            continue;
        }
        let _ = boss.triggered.insert(index);
        let minions = summon(
            trigger.kind,
            trigger.count,
            (segment, progress),
            ids,
            ctx,
            spawned,
            out,
        );
        debug!(target: "rampart::boss", enemy = id.get(), trigger = index, "boss.minions");
        out.push(Event::BossMinionsTriggered {
            enemy: id,
            trigger: index,
            minions,
        });
    }
}

fn use_abilities(
    enemy: &mut Enemy,
    config: &BossConfig,
    ids: &mut IdAllocator,
    ctx: &BossContext<'_>,
    spawned: &mut Vec<Enemy>,
    out: &mut Vec<Event>,
) {
    let (id, segment, progress, position) =
        (enemy.id, enemy.segment, enemy.progress, enemy.position);
    let Some(boss) = enemy.boss.as_mut() else {
        return;
    };
    let scale = if ctx.cooldown_multiplier.is_finite() && ctx.cooldown_multiplier > 0.0 {
        ctx.cooldown_multiplier
    } else {
        1.0
    };
    boss.cooldowns.resize(config.abilities.len(), 0.0);

    for (index, entry) in config.abilities.iter().enumerate() {
        let cooldown = &mut boss.cooldowns[index];
        *cooldown = (*cooldown - ctx.dt_ms).max(0.0);
        if *cooldown > 0.0 || boss.phase < entry.unlock_phase || boss.shield_ms > 0.0 {
            continue;
        }
        *cooldown = entry.cooldown_ms.max(0.0) * scale;

        match entry.ability {
            BossAbility::Summon { kind, count } => {
                if kind == EnemyKind::Boss {
                    warn!(target: "rampart::boss", "boss.summon_boss_ignored");
                    continue;
                }
                let _ = summon(kind, count, (segment, progress), ids, ctx, spawned, out);
            }
            BossAbility::Shield { duration_ms } => boss.shield_ms = duration_ms.max(0.0),
            BossAbility::Haste {
                multiplier,
                duration_ms,
            } => {
                boss.buffs
                    .retain(|buff| !matches!(buff, BossBuff::Haste { .. }));
                boss.buffs.push(BossBuff::Haste {
                    multiplier,
                    remaining_ms: duration_ms,
                });
            }
            BossAbility::Regenerate {
                per_second,
                duration_ms,
            } => {
                boss.buffs
                    .retain(|buff| !matches!(buff, BossBuff::Regenerate { .. }));
                boss.buffs.push(BossBuff::Regenerate {
                    per_second,
                    remaining_ms: duration_ms,
                });
            }
            BossAbility::DisableField {
                radius,
                duration_ms,
            } => boss.fields.push(DisableField {
                center: position,
                radius,
                remaining_ms: duration_ms,
            }),
        }
        debug!(target: "rampart::boss", enemy = id.get(), ability = index, "boss.ability");
        out.push(Event::AbilityUsed {
            source: AbilitySource::Boss {
                enemy: id,
                ability: entry.ability,
            },
        });
    }
}

fn summon(
    kind: EnemyKind,
    count: u32,
    (segment, progress): (usize, f32),
    ids: &mut IdAllocator,
    ctx: &BossContext<'_>,
    spawned: &mut Vec<Enemy>,
    out: &mut Vec<Event>,
) -> Vec<EnemyId> {
    if kind == EnemyKind::Boss {
        return Vec::new();
    }
    let mut minions = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut minion = Enemy::spawn(ids.next_enemy(), kind, ctx.path, ctx.spawn_health);
        minion.place_at(ctx.path, segment, progress);
        out.push(Event::EnemySpawned {
            enemy: minion.id,
            kind,
        });
        minions.push(minion.id);
        spawned.push(minion);
    }
    minions
}

/// Keeps every tower inside an active field disabled for at least the field's remaining time.
fn apply_fields(enemy: &Enemy, towers: &mut [Tower]) {
    let Some(boss) = enemy.boss.as_ref() else {
        return;
    };
    for field in &boss.fields {
        for tower in towers.iter_mut() {
            if within_radius(field.center, tower.position, field.radius) {
                tower.disabled_ms = tower.disabled_ms.max(field.remaining_ms);
            }
        }
    }
}
