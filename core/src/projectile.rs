//! Damage payloads and in-flight projectiles.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{EnemyId, ProjectileId, TowerId, TowerKind};

/// Chain-jump parameters resolved at fire time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Maximum number of additional enemies struck.
    pub targets: u32,
    /// Search radius around the primary target.
    pub radius: f32,
    /// Fraction of the payload damage dealt by each jump.
    pub fraction: f32,
}

/// Mark-application parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    /// Damage multiplier attached to the target.
    pub multiplier: f32,
    /// Lifetime of the mark.
    pub duration_ms: f32,
}

/// Burn-application parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BurnSpec {
    /// Burn damage per second.
    pub damage_per_second: f32,
    /// Lifetime of the burn.
    pub duration_ms: f32,
}

/// Behaviour flags a shot carries from the moment it is fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileBehavior {
    /// Passes through enemies instead of stopping at the first.
    pub pierce: bool,
    /// Jumps to nearby enemies on hit.
    pub chain: Option<ChainSpec>,
    /// Bursts over this radius on impact.
    pub area: Option<f32>,
    /// Marks instead of damaging.
    pub mark: Option<MarkSpec>,
    /// Ignites the target.
    pub burn: Option<BurnSpec>,
}

/// Damage snapshot taken when a shot is fired.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamagePayload {
    /// Damage before impact modifiers.
    pub damage: f32,
    /// Tower credited with the hit.
    pub source: Option<TowerId>,
    /// Archetype of the firing tower.
    pub source_kind: Option<TowerKind>,
    /// Special-ability flags.
    pub behavior: ProjectileBehavior,
}

impl DamagePayload {
    /// Plain payload with no behaviour flags and no source.
    #[must_use]
    pub fn flat(damage: f32) -> Self {
        Self {
            damage,
            source: None,
            source_kind: None,
            behavior: ProjectileBehavior::default(),
        }
    }
}

/// Projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier allocated at launch.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec2,
    /// Enemy the projectile was fired at.
    pub target: EnemyId,
    /// Last position at which the target was observed alive.
    pub last_known: Vec2,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage carried by the projectile.
    pub payload: DamagePayload,
    /// Unit direction used by piercing shots, which fly straight.
    pub heading: Vec2,
    /// Enemies already struck by a piercing shot.
    pub hit: BTreeSet<EnemyId>,
    /// Distance covered so far.
    pub travelled: f32,
    /// Travel budget after which the projectile is discarded.
    pub max_travel: f32,
}

impl Projectile {
    /// Launches a projectile from `origin` toward `target_position`.
    #[must_use]
    pub fn launch(
        id: ProjectileId,
        origin: Vec2,
        target: EnemyId,
        target_position: Vec2,
        speed: f32,
        payload: DamagePayload,
        max_travel: f32,
    ) -> Self {
        Self {
            id,
            position: origin,
            target,
            last_known: target_position,
            speed,
            payload,
            heading: (target_position - origin).normalize_or_zero(),
            hit: BTreeSet::new(),
            travelled: 0.0,
            max_travel,
        }
    }
}
