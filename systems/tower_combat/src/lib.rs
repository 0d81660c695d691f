#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile flight and the single-target, area and piercing impact pipeline.

use glam::Vec2;
use rampart_core::{
    clamp_damage, distance_to_segment, find_live, within_radius, Bounds, DamagePayload, Debuff,
    DebuffKind, Enemy, EnemyId, Event, HitMarker, Projectile, SplashSpec, TowerId, TowerKind,
};
use rand::Rng;
use tracing::debug;

/// Extra corridor half-width within which a piercing shot strikes an enemy.
pub const PIERCE_WIDTH: f32 = 8.0;

/// Run-wide modifiers that apply to every hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatContext {
    /// Probability that a direct or area hit is critical.
    pub crit_chance: f32,
    /// Splash granted to sniper hits by augments.
    pub splash: Option<SplashSpec>,
    /// Playfield rectangle; piercing shots leaving it are discarded.
    pub bounds: Bounds,
}

/// How a payload reaches the enemy being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// Single-target hit from a projectile, hitscan or pierce.
    Direct,
    /// One enemy caught in a blast.
    Area,
}

/// Resolves one hit of `payload` on the enemy at `index`.
///
/// Dead or missing enemies are ignored. Area hits skip the phase immunity,
/// chain, armor and splash steps.
pub fn resolve_hit<R: Rng>(
    enemies: &mut [Enemy],
    index: usize,
    payload: &DamagePayload,
    kind: HitKind,
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    let Some(target) = enemies.get(index) else {
        return;
    };
    if !target.is_alive() {
        return;
    }
    let target_id = target.id;
    let target_position = target.position;
    let direct = kind == HitKind::Direct;

    if direct && target.is_phased() {
        out.push(hit_event(target_id, payload.source, HitMarker::Immune));
        return;
    }

    let base = clamp_damage(payload.damage);
    let critical = ctx.crit_chance > 0.0 && rng.gen::<f32>() < ctx.crit_chance;
    let mut damage = if critical { base * 2.0 } else { base };

    let behavior = payload.behavior;
    if let Some(mark) = behavior.mark {
        enemies[index].debuffs.apply(Debuff {
            kind: DebuffKind::Mark {
                multiplier: mark.multiplier,
            },
            remaining_ms: mark.duration_ms,
            source: payload.source,
        });
        out.push(hit_event(target_id, payload.source, HitMarker::Marked));
        return;
    }

    if let Some(burn) = behavior.burn {
        enemies[index].debuffs.apply(Debuff {
            kind: DebuffKind::Burn {
                damage_per_second: burn.damage_per_second,
            },
            remaining_ms: burn.duration_ms,
            source: payload.source,
        });
    }

    if direct {
        if let Some(chain) = behavior.chain {
            let jumps = nearest_others(
                enemies,
                index,
                target_position,
                chain.radius,
                chain.targets as usize,
            );
            for jump in jumps {
                secondary_hit(&mut enemies[jump], base * chain.fraction, payload.source, out);
            }
        }
    }

    let enemy = &mut enemies[index];
    if let Some(multiplier) = enemy.debuffs.mark_multiplier() {
        damage *= multiplier;
    }

    if direct && behavior.burn.is_none() {
        if let Some(armor) = enemy.kind.armor() {
            damage = (damage - armor).max(1.0);
        }
    }

    if let Some(boss) = &enemy.boss {
        if boss.is_shielded() {
            out.push(hit_event(target_id, payload.source, HitMarker::Blocked));
            return;
        }
        damage *= boss.damage_factor();
    }
    let resolved = clamp_damage(damage);

    let mut absorbed = 0.0;
    let mut remaining = resolved;
    if let Some(shield) = enemy.shield.as_mut() {
        let (overflow, broke) = shield.absorb(remaining);
        absorbed = remaining - overflow;
        remaining = overflow;
        if broke {
            out.push(Event::ShieldBroken { enemy: target_id });
        }
    }

    let removed = enemy.apply_damage(remaining);
    if payload.source.is_some() {
        enemy.last_hit_by = payload.source;
    }
    out.push(hit_event(
        target_id,
        payload.source,
        HitMarker::Damage {
            amount: absorbed + removed,
            critical,
        },
    ));

    if direct && payload.source_kind == Some(TowerKind::Sniper) {
        if let Some(splash) = ctx.splash {
            let splashed = nearest_others(
                enemies,
                index,
                target_position,
                splash.radius,
                usize::MAX,
            );
            for other in splashed {
                secondary_hit(
                    &mut enemies[other],
                    resolved * splash.fraction,
                    payload.source,
                    out,
                );
            }
        }
    }
}

/// Resolves `payload` as an area hit on every living enemy within `radius` of `center`.
pub fn resolve_area<R: Rng>(
    enemies: &mut [Enemy],
    center: Vec2,
    radius: f32,
    payload: &DamagePayload,
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    let caught: Vec<usize> = enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| {
            enemy.is_alive() && within_radius(center, enemy.position, radius + enemy.hit_radius())
        })
        .map(|(index, _)| index)
        .collect();
    for index in caught {
        resolve_hit(enemies, index, payload, HitKind::Area, ctx, rng, out);
    }
}

/// Resolves a hitscan shot; a target that is already gone makes the shot fizzle.
pub fn resolve_instant<R: Rng>(
    enemies: &mut [Enemy],
    target: EnemyId,
    payload: &DamagePayload,
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    if let Some(index) = find_live(enemies, target) {
        resolve_hit(enemies, index, payload, HitKind::Direct, ctx, rng, out);
    }
}

/// Moves every projectile by one tick and resolves the impacts it reaches.
///
/// Homing shots whose target is gone, or that outrun their travel budget,
/// are dropped; area shells burst instead, at the target's last known
/// position or where the budget ran out. Piercing shots fly straight
/// and survive until they leave the playfield or exhaust their travel budget.
pub fn advance_projectiles<R: Rng>(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    dt_ms: f32,
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    let before = projectiles.len();
    let mut survivors = Vec::with_capacity(before);
    for mut projectile in projectiles.drain(..) {
        let step = projectile.speed.max(0.0) * dt_ms / 1_000.0;
        let keep = if projectile.payload.behavior.pierce {
            fly_piercing(&mut projectile, step, enemies, ctx, rng, out)
        } else {
            fly_homing(&mut projectile, step, enemies, ctx, rng, out)
        };
        if keep {
            survivors.push(projectile);
        }
    }
    *projectiles = survivors;

    let finished = before - projectiles.len();
    if finished > 0 {
        debug!(
            target: "rampart::combat",
            finished,
            in_flight = projectiles.len(),
            "projectiles.finished"
        );
    }
}

fn fly_homing<R: Rng>(
    projectile: &mut Projectile,
    step: f32,
    enemies: &mut [Enemy],
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> bool {
    let Some(index) = find_live(enemies, projectile.target) else {
        let at = projectile.last_known;
        detonate(projectile, at, enemies, ctx, rng, out);
        return false;
    };

    let target = enemies[index].position;
    projectile.last_known = target;
    let remaining = projectile.position.distance(target);
    if remaining <= step {
        projectile.position = target;
        match projectile.payload.behavior.area {
            Some(radius) => resolve_area(enemies, target, radius, &projectile.payload, ctx, rng, out),
            None => resolve_hit(
                enemies,
                index,
                &projectile.payload,
                HitKind::Direct,
                ctx,
                rng,
                out,
            ),
        }
        return false;
    }

    projectile.position += (target - projectile.position) / remaining * step;
    projectile.travelled += step;
    if projectile.travelled <= projectile.max_travel {
        return true;
    }
    let at = projectile.position;
    detonate(projectile, at, enemies, ctx, rng, out);
    false
}

/// Ends a homing shot that never reached its target; area shells burst at `at`.
fn detonate<R: Rng>(
    projectile: &mut Projectile,
    at: Vec2,
    enemies: &mut [Enemy],
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) {
    projectile.position = at;
    if let Some(radius) = projectile.payload.behavior.area {
        resolve_area(enemies, at, radius, &projectile.payload, ctx, rng, out);
    }
}

fn fly_piercing<R: Rng>(
    projectile: &mut Projectile,
    step: f32,
    enemies: &mut [Enemy],
    ctx: &CombatContext,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> bool {
    let start = projectile.position;
    let end = start + projectile.heading * step;

    let mut crossed: Vec<(f32, EnemyId, usize)> = enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_alive() && !projectile.hit.contains(&enemy.id))
        .filter(|(_, enemy)| {
            distance_to_segment(enemy.position, start, end) <= enemy.hit_radius() + PIERCE_WIDTH
        })
        .map(|(index, enemy)| ((enemy.position - start).dot(projectile.heading), enemy.id, index))
        .collect();
    crossed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    for (_, id, index) in crossed {
        let _ = projectile.hit.insert(id);
        resolve_hit(
            enemies,
            index,
            &projectile.payload,
            HitKind::Direct,
            ctx,
            rng,
            out,
        );
    }

    projectile.position = end;
    projectile.travelled += step;
    ctx.bounds.contains(end) && projectile.travelled <= projectile.max_travel && step > 0.0
}

/// Living enemies other than `exclude` within `radius` of `center`, nearest first.
fn nearest_others(
    enemies: &[Enemy],
    exclude: usize,
    center: Vec2,
    radius: f32,
    limit: usize,
) -> Vec<usize> {
    let mut nearby: Vec<(f32, EnemyId, usize)> = enemies
        .iter()
        .enumerate()
        .filter(|(index, enemy)| *index != exclude && enemy.is_alive())
        .filter(|(_, enemy)| within_radius(center, enemy.position, radius + enemy.hit_radius()))
        .map(|(index, enemy)| (center.distance(enemy.position), enemy.id, index))
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    nearby.into_iter().take(limit).map(|(_, _, index)| index).collect()
}

/// Flat secondary damage: no crit, armor or shield, but boss shield and
/// resistance and phase immunity still apply.
fn secondary_hit(enemy: &mut Enemy, damage: f32, source: Option<TowerId>, out: &mut Vec<Event>) {
    if enemy.is_phased() {
        out.push(hit_event(enemy.id, source, HitMarker::Immune));
        return;
    }
    let factor = match &enemy.boss {
        Some(boss) if boss.is_shielded() => {
            out.push(hit_event(enemy.id, source, HitMarker::Blocked));
            return;
        }
        Some(boss) => boss.damage_factor(),
        None => 1.0,
    };
    let removed = enemy.apply_damage(damage * factor);
    if source.is_some() {
        enemy.last_hit_by = source;
    }
    out.push(hit_event(
        enemy.id,
        source,
        HitMarker::Damage {
            amount: removed,
            critical: false,
        },
    ));
}

fn hit_event(enemy: EnemyId, source: Option<TowerId>, marker: HitMarker) -> Event {
    Event::EnemyHit {
        enemy,
        source,
        marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{
        BossConfig, BossPhase, ChainSpec, EnemyKind, MarkSpec, Path, Phasing, ProjectileBehavior,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn path() -> Path {
        Path::new(vec![Vec2::ZERO, Vec2::new(500.0, 0.0)])
    }

    fn enemy(id: u32, kind: EnemyKind, x: f32) -> Enemy {
        let path = path();
        let mut enemy = Enemy::spawn(EnemyId::new(id), kind, &path, 1.0);
        enemy.place_at(&path, 0, x);
        enemy
    }

    fn ctx() -> CombatContext {
        CombatContext {
            crit_chance: 0.0,
            splash: None,
            bounds: Bounds::new(500.0, 500.0),
        }
    }

    fn shot(damage: f32) -> DamagePayload {
        DamagePayload {
            source: Some(TowerId::new(1)),
            source_kind: Some(TowerKind::Arrow),
            ..DamagePayload::flat(damage)
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn damage_markers(events: &[Event]) -> Vec<(EnemyId, f32)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyHit {
                    enemy,
                    marker: HitMarker::Damage { amount, .. },
                    ..
                } => Some((*enemy, *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn armor_reduces_direct_hits_with_a_floor_of_one() {
        let mut enemies = vec![enemy(1, EnemyKind::Armored, 10.0)];
        let mut events = Vec::new();
        resolve_hit(&mut enemies, 0, &shot(60.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 130.0);
        assert_eq!(enemies[0].last_hit_by, Some(TowerId::new(1)));

        resolve_hit(&mut enemies, 0, &shot(4.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 129.0);
    }

    #[test]
    fn area_hits_ignore_armor() {
        let mut enemies = vec![enemy(1, EnemyKind::Armored, 10.0)];
        let mut events = Vec::new();
        resolve_hit(&mut enemies, 0, &shot(60.0), HitKind::Area, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 120.0);
    }

    #[test]
    fn shield_absorbs_before_health() {
        let mut enemies = vec![enemy(1, EnemyKind::Shielded, 10.0)];
        let mut events = Vec::new();

        resolve_hit(&mut enemies, 0, &shot(50.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 120.0);
        assert_eq!(enemies[0].shield.map(|shield| shield.value), Some(30.0));

        resolve_hit(&mut enemies, 0, &shot(45.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 105.0);
        assert!(enemies[0].shield.map_or(false, |shield| shield.broken));
        assert!(events.contains(&Event::ShieldBroken {
            enemy: EnemyId::new(1)
        }));
        assert_eq!(
            damage_markers(&events),
            vec![(EnemyId::new(1), 50.0), (EnemyId::new(1), 45.0)]
        );
    }

    #[test]
    fn phased_enemies_are_immune_to_direct_hits_only() {
        let mut phaser = enemy(1, EnemyKind::Phaser, 10.0);
        phaser.phasing = Some(Phasing::Charging { remaining_ms: 400.0 });
        let mut enemies = vec![phaser];
        let mut events = Vec::new();

        resolve_hit(&mut enemies, 0, &shot(30.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 110.0);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemyHit {
                marker: HitMarker::Immune,
                ..
            }]
        ));

        resolve_hit(&mut enemies, 0, &shot(30.0), HitKind::Area, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 80.0);
    }

    #[test]
    fn mark_replaces_damage_and_amplifies_later_hits() {
        let mut enemies = vec![enemy(1, EnemyKind::Grunt, 10.0)];
        let mut events = Vec::new();
        let marking = DamagePayload {
            behavior: ProjectileBehavior {
                mark: Some(MarkSpec {
                    multiplier: 1.5,
                    duration_ms: 5_000.0,
                }),
                ..ProjectileBehavior::default()
            },
            ..shot(90.0)
        };

        resolve_hit(&mut enemies, 0, &marking, HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 100.0);

        resolve_hit(&mut enemies, 0, &shot(20.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 70.0);
    }

    #[test]
    fn certain_crit_doubles_damage() {
        let mut enemies = vec![enemy(1, EnemyKind::Grunt, 10.0)];
        let mut events = Vec::new();
        let ctx = CombatContext {
            crit_chance: 1.0,
            ..ctx()
        };
        resolve_hit(&mut enemies, 0, &shot(20.0), HitKind::Direct, &ctx, &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 60.0);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemyHit {
                marker: HitMarker::Damage { critical: true, .. },
                ..
            }]
        ));
    }

    #[test]
    fn chain_jumps_to_nearest_others_with_flat_half_damage() {
        let mut enemies = vec![
            enemy(1, EnemyKind::Grunt, 100.0),
            enemy(2, EnemyKind::Armored, 160.0),
            enemy(3, EnemyKind::Grunt, 120.0),
            enemy(4, EnemyKind::Grunt, 250.0),
            enemy(5, EnemyKind::Shielded, 80.0),
        ];
        let mut events = Vec::new();
        let chained = DamagePayload {
            behavior: ProjectileBehavior {
                chain: Some(ChainSpec {
                    targets: 2,
                    radius: 90.0,
                    fraction: 0.5,
                }),
                ..ProjectileBehavior::default()
            },
            ..shot(30.0)
        };

        resolve_hit(&mut enemies, 0, &chained, HitKind::Direct, &ctx(), &mut rng(), &mut events);

        assert_eq!(enemies[0].health, 70.0);
        assert_eq!(enemies[1].health, 180.0, "third nearest is out of jumps");
        assert_eq!(enemies[2].health, 85.0);
        assert_eq!(enemies[3].health, 100.0);
        assert_eq!(enemies[4].health, 105.0, "secondary damage skips the shield");
        assert_eq!(enemies[4].shield.map(|shield| shield.value), Some(80.0));
    }

    #[test]
    fn boss_shield_blocks_and_resistance_scales() {
        let path = path();
        let config = BossConfig {
            health: 1_000.0,
            speed: 20.0,
            reward: 100,
            size: 20.0,
            leak_damage: 5,
            death_sequence_ms: 1_000.0,
            phases: vec![BossPhase {
                threshold: 1.0,
                speed_multiplier: 1.0,
                damage_resistance: 0.25,
            }],
            abilities: Vec::new(),
            minion_triggers: Vec::new(),
        };
        let mut enemies = vec![Enemy::boss(EnemyId::new(7), &config, &path, 1.0)];
        let mut events = Vec::new();

        resolve_hit(&mut enemies, 0, &shot(100.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 925.0);

        if let Some(boss) = enemies[0].boss.as_mut() {
            boss.shield_ms = 500.0;
        }
        resolve_hit(&mut enemies, 0, &shot(100.0), HitKind::Direct, &ctx(), &mut rng(), &mut events);
        assert_eq!(enemies[0].health, 925.0);
        assert!(matches!(
            events.last(),
            Some(Event::EnemyHit {
                marker: HitMarker::Blocked,
                ..
            })
        ));
    }

    #[test]
    fn sniper_splash_is_a_fraction_of_resolved_damage() {
        let mut enemies = vec![
            enemy(1, EnemyKind::Armored, 100.0),
            enemy(2, EnemyKind::Grunt, 130.0),
            enemy(3, EnemyKind::Grunt, 300.0),
        ];
        let mut events = Vec::new();
        let ctx = CombatContext {
            splash: Some(SplashSpec {
                radius: 50.0,
                fraction: 0.5,
            }),
            ..ctx()
        };
        let sniper = DamagePayload {
            source_kind: Some(TowerKind::Sniper),
            ..shot(90.0)
        };

        resolve_hit(&mut enemies, 0, &sniper, HitKind::Direct, &ctx, &mut rng(), &mut events);

        assert_eq!(enemies[0].health, 100.0);
        assert_eq!(enemies[1].health, 60.0);
        assert_eq!(enemies[2].health, 100.0);
    }

    #[test]
    fn area_burst_hits_everything_in_radius() {
        let mut enemies = vec![
            enemy(1, EnemyKind::Grunt, 100.0),
            enemy(2, EnemyKind::Grunt, 150.0),
            enemy(3, EnemyKind::Grunt, 161.0),
        ];
        let mut events = Vec::new();
        resolve_area(
            &mut enemies,
            Vec2::new(100.0, 0.0),
            60.0,
            &shot(45.0),
            &ctx(),
            &mut rng(),
            &mut events,
        );
        assert_eq!(enemies[0].health, 55.0);
        assert_eq!(enemies[1].health, 55.0);
        assert_eq!(enemies[2].health, 100.0);
    }
}
