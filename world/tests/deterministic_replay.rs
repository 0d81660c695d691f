use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use glam::Vec2;
use rampart_core::{
    BossAbility, BossAbilityConfig, BossConfig, BossPhase, Bounds, Command, DirectorTuning,
    EconomyTuning, EnemyKind, Event, MetaEffects, MinionTrigger, Snapshot, SpawnGroup,
    StageConfig, TowerKind, WaveDefinition,
};
use rampart_world::{self as world, query, TickInputs, World};

const TICK_MS: f32 = 50.0;
const TICKS: usize = 1_200;

#[test]
fn deterministic_replay_reproduces_events_and_snapshots() {
    let first = replay();
    let second = replay();

    assert_eq!(first.events, second.events, "event stream diverged");
    assert_eq!(first.snapshot, second.snapshot, "snapshot diverged");
    assert_eq!(
        first.fingerprint(),
        second.fingerprint(),
        "fingerprint mismatch"
    );

    let stats = &first.snapshot.stats;
    assert!(
        stats.kills + stats.leaks > 0,
        "scripted run must resolve at least one enemy"
    );
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { wave: 1, .. })));
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    snapshot: Snapshot,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            format!("{event:?}").hash(&mut hasher);
        }
        self.snapshot.tick.hash(&mut hasher);
        self.snapshot.economy.gold.hash(&mut hasher);
        self.snapshot.economy.lives.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay() -> ReplayOutcome {
    let meta = MetaEffects {
        crit_chance: 0.25,
        ..MetaEffects::default()
    };
    let mut world = World::new(scripted_stage(), meta, Vec::new()).expect("valid stage");
    let mut events = Vec::new();

    let mut opening = TickInputs::running(TICK_MS);
    for (kind, x, y) in [
        (TowerKind::Arrow, 120.0, 140.0),
        (TowerKind::Cannon, 260.0, 60.0),
        (TowerKind::Sniper, 400.0, 140.0),
    ] {
        opening = opening.with(Command::PlaceTower {
            kind,
            position: Vec2::new(x, y),
        });
    }
    world::tick(&mut world, &opening, &mut events);

    for _ in 0..TICKS {
        let mut inputs = TickInputs::running(TICK_MS);
        if query::can_start_wave(&world) {
            inputs = inputs.with(Command::StartWave);
        }
        world::tick(&mut world, &inputs, &mut events);
        if query::outcome(&world).is_some() {
            break;
        }
    }

    ReplayOutcome {
        events,
        snapshot: query::snapshot(&world).clone(),
    }
}

fn scripted_stage() -> StageConfig {
    let group = |kind, count, interval_ms, delay_ms| SpawnGroup {
        kind,
        count,
        interval_ms,
        delay_ms,
    };
    StageConfig {
        name: "replay".to_owned(),
        seed: 0x5eed,
        bounds: Bounds::new(600.0, 200.0),
        path: vec![
            Vec2::new(0.0, 100.0),
            Vec2::new(300.0, 100.0),
            Vec2::new(300.0, 180.0),
            Vec2::new(600.0, 180.0),
        ],
        starting_gold: 600,
        starting_lives: 20,
        waves: vec![
            WaveDefinition {
                groups: vec![group(EnemyKind::Grunt, 4, 600.0, 0.0)],
                boss: false,
            },
            WaveDefinition {
                groups: vec![
                    group(EnemyKind::Runner, 3, 400.0, 0.0),
                    group(EnemyKind::Armored, 2, 900.0, 500.0),
                ],
                boss: false,
            },
            WaveDefinition {
                groups: vec![
                    group(EnemyKind::Shielded, 2, 700.0, 0.0),
                    group(EnemyKind::Splitter, 1, 0.0, 800.0),
                ],
                boss: true,
            },
        ],
        boss: Some(BossConfig {
            health: 900.0,
            speed: 30.0,
            reward: 150,
            size: 14.0,
            leak_damage: 5,
            death_sequence_ms: 1_500.0,
            phases: vec![
                BossPhase::BASELINE,
                BossPhase {
                    threshold: 0.5,
                    speed_multiplier: 1.3,
                    damage_resistance: 0.2,
                },
            ],
            abilities: vec![
                BossAbilityConfig {
                    ability: BossAbility::Haste {
                        multiplier: 1.5,
                        duration_ms: 1_000.0,
                    },
                    cooldown_ms: 4_000.0,
                    unlock_phase: 0,
                },
                BossAbilityConfig {
                    ability: BossAbility::Summon {
                        kind: EnemyKind::Runner,
                        count: 2,
                    },
                    cooldown_ms: 5_000.0,
                    unlock_phase: 1,
                },
            ],
            minion_triggers: vec![MinionTrigger {
                health_fraction: 0.25,
                kind: EnemyKind::Grunt,
                count: 2,
            }],
        }),
        economy: EconomyTuning::default(),
        director: DirectorTuning::default(),
        opening: Vec::new(),
    }
}
