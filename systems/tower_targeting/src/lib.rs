#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks deterministic targets for every ready tower and
//! turns each pick into a shot.

use std::cmp::Ordering;

use rampart_core::{
    compare_path_rank, within_radius, AbilityKind, BurnSpec, ChainSpec, DamagePayload, Delivery,
    Enemy, EnemyId, IdAllocator, MarkSpec, Projectile, ProjectileBehavior, TargetPriority, Tower,
    TowerId, CHAIN_FRACTION, CHAIN_RADIUS, CHAIN_TARGETS, INCENDIARY_DPS, INCENDIARY_DURATION_MS,
    MARK_DURATION_MS, MARK_MULTIPLIER,
};
use tracing::debug;

/// Projectiles are discarded after covering this many tower ranges.
pub const MAX_TRAVEL_RANGES: f32 = 2.5;

/// Shot produced by a tower this tick.
#[derive(Clone, Debug, PartialEq)]
pub enum FireOrder {
    /// Hitscan shot resolved against `target` within the same tick.
    Instant {
        /// Firing tower.
        tower: TowerId,
        /// Enemy struck.
        target: EnemyId,
        /// Damage snapshot taken at fire time.
        payload: DamagePayload,
    },
    /// Projectile launched toward its target.
    Launch(Projectile),
}

/// Tower targeting system that reuses its candidate buffer between ticks.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty candidate buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts down fire cooldowns and fires every ready tower that has a target.
    ///
    /// Towers that are disabled, never fire, or find nothing in range keep a
    /// zero cooldown and fire as soon as a target appears. Ties are broken by
    /// lower enemy identifier.
    pub fn handle(
        &mut self,
        towers: &mut [Tower],
        enemies: &[Enemy],
        ids: &mut IdAllocator,
        dt_ms: f32,
        out: &mut Vec<FireOrder>,
    ) {
        let before = out.len();
        for tower in towers.iter_mut() {
            tower.fire_cooldown_ms = (tower.fire_cooldown_ms - dt_ms).max(0.0);
            if tower.fire_cooldown_ms > 0.0 || tower.is_disabled() {
                continue;
            }
            if matches!(tower.kind.delivery(), Delivery::None) {
                continue;
            }
            let Some(interval) = tower.effective.cooldown_ms() else {
                continue;
            };

            self.prepare_candidates(tower, enemies);
            let Some(best) = self.best(tower.priority) else {
                continue;
            };
            let target = &enemies[best.index];

            tower.fire_cooldown_ms = interval;
            out.push(fire(tower, target, ids));
        }

        let fired = out.len() - before;
        if fired > 0 {
            debug!(target: "rampart::targeting", fired, "towers.fired");
        }
    }

    fn prepare_candidates(&mut self, tower: &Tower, enemies: &[Enemy]) {
        self.candidates.clear();
        for (index, enemy) in enemies.iter().enumerate() {
            if !enemy.is_alive() {
                continue;
            }
            let reach = tower.effective.range + enemy.hit_radius();
            if !within_radius(tower.position, enemy.position, reach) {
                continue;
            }
            self.candidates.push(Candidate {
                index,
                id: enemy.id,
                segment: enemy.segment,
                progress: enemy.progress,
                health: enemy.health,
            });
        }
    }

    fn best(&self, priority: TargetPriority) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for candidate in &self.candidates {
            match &mut best {
                Some(existing) => {
                    if candidate.precedes(existing, priority) {
                        *existing = *candidate;
                    }
                }
                None => best = Some(*candidate),
            }
        }
        best
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    index: usize,
    id: EnemyId,
    segment: usize,
    progress: f32,
    health: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self, priority: TargetPriority) -> bool {
        let ordering = match priority {
            TargetPriority::First => compare_path_rank(
                (self.segment, self.progress),
                (other.segment, other.progress),
            ),
            TargetPriority::Strongest => other.health.total_cmp(&self.health),
            TargetPriority::Weakest => self.health.total_cmp(&other.health),
        };
        match ordering {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.id < other.id,
        }
    }
}

fn fire(tower: &Tower, target: &Enemy, ids: &mut IdAllocator) -> FireOrder {
    let payload = payload(tower);
    match tower.kind.delivery() {
        Delivery::Projectile { speed } | Delivery::Artillery { speed, .. } => {
            FireOrder::Launch(Projectile::launch(
                ids.next_projectile(),
                tower.position,
                target.id,
                target.position,
                speed,
                payload,
                tower.effective.range * MAX_TRAVEL_RANGES,
            ))
        }
        Delivery::Instant | Delivery::None => FireOrder::Instant {
            tower: tower.id,
            target: target.id,
            payload,
        },
    }
}

/// Damage snapshot a tower attaches to its next shot.
#[must_use]
pub fn payload(tower: &Tower) -> DamagePayload {
    let mut behavior = ProjectileBehavior::default();
    match tower.active_ability() {
        Some(AbilityKind::Piercing) => behavior.pierce = true,
        Some(AbilityKind::ChainLightning) => {
            behavior.chain = Some(ChainSpec {
                targets: CHAIN_TARGETS,
                radius: CHAIN_RADIUS,
                fraction: CHAIN_FRACTION,
            });
        }
        Some(AbilityKind::MarkTarget) => {
            behavior.mark = Some(MarkSpec {
                multiplier: MARK_MULTIPLIER,
                duration_ms: MARK_DURATION_MS,
            });
        }
        Some(AbilityKind::Incendiary) => {
            behavior.burn = Some(BurnSpec {
                damage_per_second: INCENDIARY_DPS,
                duration_ms: INCENDIARY_DURATION_MS,
            });
        }
        Some(AbilityKind::RapidFire | AbilityKind::Blizzard) | None => {}
    }
    if let Delivery::Artillery { blast_radius, .. } = tower.kind.delivery() {
        behavior.area = Some(blast_radius);
    }
    DamagePayload {
        damage: tower.effective.damage,
        source: Some(tower.id),
        source_kind: Some(tower.kind),
        behavior,
    }
}
