use rampart_core::{BossState, Event, HitMarker, Snapshot, Tower, TowerId};
use rampart_system_boss::{advance_boss, BossContext};
use rampart_system_death::{resolve_deaths, DeathContext};
use rampart_system_director::{conclude_tick, DirectorContext};
use rampart_system_hazards::{advance_hazards, HazardContext};
use rampart_system_movement::{advance_enemies, MotionContext};
use rampart_system_spawning::{spawn_due, SpawnContext};
use rampart_system_stat_resolver::{advance_tower_timers, resolve_all};
use rampart_system_support::Support;
use rampart_system_tower_combat::{advance_projectiles, resolve_instant, CombatContext};
use rampart_system_tower_targeting::{FireOrder, TowerTargeting};
use tracing::debug;

use crate::{commands, StageContext, TickInputs, TickOutcome};

/// Stage systems with their reusable scratch buffers.
#[derive(Debug, Default)]
pub(crate) struct Pipeline {
    targeting: TowerTargeting,
    support: Support,
    orders: Vec<FireOrder>,
}

impl Pipeline {
    /// Runs one tick over a copy of `previous`.
    pub(crate) fn run(
        &mut self,
        previous: &Snapshot,
        context: &StageContext,
        inputs: &TickInputs,
    ) -> TickOutcome {
        let mut snapshot = previous.clone();
        let mut events = Vec::new();
        if snapshot.outcome.is_some() {
            return TickOutcome { snapshot, events };
        }

        snapshot.tick = snapshot.tick.saturating_add(1);
        let raw_dt = non_negative(inputs.dt_ms);
        let dt = raw_dt * non_negative(inputs.speed);
        let modifiers = snapshot.director.modifiers(&context.stage.director);

        for command in &inputs.commands {
            commands::apply(
                &mut snapshot,
                context,
                modifiers.spawn_health,
                *command,
                &mut events,
            );
        }

        if dt <= 0.0 {
            snapshot.stats.paused_ms += f64::from(raw_dt);
            tally(&mut snapshot, &events);
            return TickOutcome { snapshot, events };
        }
        snapshot.elapsed_ms += f64::from(dt);

        let stage = &context.stage;
        let path = &context.path;
        let gold_multiplier = modifiers.gold_bonus * context.meta.kill_gold_multiplier;

        spawn_due(
            &mut snapshot,
            &SpawnContext {
                stage,
                path,
                spawn_health: modifiers.spawn_health,
            },
            dt,
            &mut events,
        );

        advance_tower_timers(&mut snapshot.towers, dt);
        snapshot.towers = resolve_all(&snapshot.towers, &context.augments, &context.meta);

        let movement_frozen = snapshot.enemies.iter().any(|enemy| {
            enemy
                .boss
                .as_ref()
                .map_or(false, BossState::in_death_sequence)
        });

        let motion = advance_enemies(
            &mut snapshot.enemies,
            &MotionContext {
                dt_ms: dt,
                path,
                towers: &snapshot.towers,
                movement_frozen,
                boss_leak_damage: stage.boss.as_ref().map_or(1, |boss| boss.leak_damage),
            },
            &mut events,
        );
        snapshot.economy.lives = snapshot.economy.lives.saturating_sub(motion.lives_lost);
        snapshot.wave.lives_lost_this_wave = snapshot
            .wave
            .lives_lost_this_wave
            .saturating_add(motion.lives_lost);
        for (source, amount) in motion.burn_damage {
            credit_damage(&mut snapshot, source, amount);
        }

        self.support
            .handle(&mut snapshot.enemies, dt, modifiers.cooldown, &mut events);

        let scorched = advance_hazards(
            &mut snapshot.hazards,
            &mut snapshot.enemies,
            &HazardContext {
                dt_ms: dt,
                path,
                movement_frozen,
            },
        );
        credit_damage(&mut snapshot, None, scorched);

        let combat = CombatContext {
            crit_chance: context.crit_chance,
            splash: context.splash,
            bounds: stage.bounds,
        };
        self.orders.clear();
        self.targeting.handle(
            &mut snapshot.towers,
            &snapshot.enemies,
            &mut snapshot.ids,
            dt,
            &mut self.orders,
        );
        for order in self.orders.drain(..) {
            match order {
                FireOrder::Instant {
                    target, payload, ..
                } => resolve_instant(
                    &mut snapshot.enemies,
                    target,
                    &payload,
                    &combat,
                    &mut snapshot.rng,
                    &mut events,
                ),
                FireOrder::Launch(projectile) => snapshot.projectiles.push(projectile),
            }
        }

        advance_projectiles(
            &mut snapshot.projectiles,
            &mut snapshot.enemies,
            dt,
            &combat,
            &mut snapshot.rng,
            &mut events,
        );

        let deaths = resolve_deaths(
            &mut snapshot.enemies,
            &mut snapshot.towers,
            &mut snapshot.ids,
            &DeathContext {
                path,
                gold_bonus: modifiers.gold_bonus,
                kill_multiplier: context.meta.kill_gold_multiplier,
                chain_reaction: context.chain_reaction,
                spawn_health: modifiers.spawn_health,
                boss_death_sequence_ms: stage
                    .boss
                    .as_ref()
                    .map_or(0.0, |boss| boss.death_sequence_ms),
            },
            &mut events,
        );
        snapshot.economy.gold = snapshot.economy.gold.saturating_add(deaths.gold);

        let boss = advance_boss(
            &mut snapshot.enemies,
            &mut snapshot.towers,
            &mut snapshot.ids,
            &BossContext {
                dt_ms: dt,
                config: stage.boss.as_ref(),
                path,
                cooldown_multiplier: modifiers.cooldown,
                spawn_health: modifiers.spawn_health,
                gold_multiplier,
            },
            &mut events,
        );
        snapshot.economy.gold = snapshot.economy.gold.saturating_add(boss.gold);

        conclude_tick(
            &mut snapshot,
            &DirectorContext {
                stage,
                interest_rate: context.interest_rate,
                life_regen_bonus: context.meta.life_regen_bonus,
            },
            &mut events,
        );

        tally(&mut snapshot, &events);
        debug!(
            target: "rampart::world",
            tick = snapshot.tick,
            enemies = snapshot.enemies.len(),
            projectiles = snapshot.projectiles.len(),
            events = events.len(),
            "tick.advanced"
        );
        TickOutcome { snapshot, events }
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Folds the tick's events into the run statistics and per-tower totals.
fn tally(snapshot: &mut Snapshot, events: &[Event]) {
    for event in events {
        match event {
            Event::EnemyHit {
                source,
                marker: HitMarker::Damage { amount, critical },
                ..
            } => {
                credit_damage(snapshot, *source, *amount);
                if *critical {
                    snapshot.stats.critical_hits += 1;
                }
            }
            Event::ShieldBroken { .. } => snapshot.stats.shields_broken += 1,
            Event::EnemyKilled { tower, reward, .. } => {
                snapshot.stats.record_kill(*tower);
                snapshot.stats.gold_earned += u64::from(*reward);
                if let Some(credited) = tower_mut(&mut snapshot.towers, *tower) {
                    credited.kills += 1;
                }
            }
            Event::EnemyLeaked { .. } => snapshot.stats.leaks += 1,
            Event::BossDefeated { reward, .. } => {
                snapshot.stats.bosses_defeated += 1;
                snapshot.stats.gold_earned += u64::from(*reward);
            }
            Event::WaveComplete { interest, .. } => {
                snapshot.stats.waves_cleared += 1;
                snapshot.stats.gold_earned += u64::from(*interest);
            }
            _ => {}
        }
    }
}

fn credit_damage(snapshot: &mut Snapshot, source: Option<TowerId>, amount: f32) {
    if amount <= 0.0 {
        return;
    }
    snapshot.stats.record_damage(source, amount);
    if let Some(tower) = tower_mut(&mut snapshot.towers, source) {
        tower.damage_dealt += amount;
    }
}

fn tower_mut(towers: &mut [Tower], id: Option<TowerId>) -> Option<&mut Tower> {
    let id = id?;
    towers.iter_mut().find(|tower| tower.id == id)
}
