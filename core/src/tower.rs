//! Tower kinds, their compiled-in stat tables and the live tower record.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{TargetPriority, TowerId};

/// Highest upgrade level a tower can reach.
pub const MAX_LEVEL: u8 = 3;

/// Fire-rate multiplier granted while rapid fire is active.
pub const RAPID_FIRE_MULTIPLIER: f32 = 3.0;

/// Damage multiplier attached by a marking shot.
pub const MARK_MULTIPLIER: f32 = 1.5;

/// Lifetime of the mark debuff.
pub const MARK_DURATION_MS: f32 = 5_000.0;

/// How long a blizzard freezes enemies in range.
pub const BLIZZARD_FREEZE_MS: f32 = 2_000.0;

/// Maximum number of extra targets struck by chain lightning.
pub const CHAIN_TARGETS: u32 = 3;

/// Radius searched for chain lightning jumps.
pub const CHAIN_RADIUS: f32 = 90.0;

/// Fraction of hit damage carried by every chain jump.
pub const CHAIN_FRACTION: f32 = 0.5;

/// Burn damage per second applied by incendiary shots.
pub const INCENDIARY_DPS: f32 = 15.0;

/// Lifetime of the incendiary burn.
pub const INCENDIARY_DURATION_MS: f32 = 3_000.0;

/// Damage, range and fire rate of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage dealt per shot.
    pub damage: f32,
    /// Targeting range in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
}

impl TowerStats {
    /// Unusable stats exposed by disabled towers.
    pub const ZERO: Self = Self {
        damage: 0.0,
        range: 0.0,
        fire_rate: 0.0,
    };

    /// Milliseconds between shots, or `None` when the tower cannot fire.
    #[must_use]
    pub fn cooldown_ms(&self) -> Option<f32> {
        if self.fire_rate.is_finite() && self.fire_rate > 0.0 && self.range > 0.0 {
            Some(1_000.0 / self.fire_rate)
        } else {
            None
        }
    }
}

/// How a tower's shot reaches its target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Delivery {
    /// Homing projectile.
    Projectile {
        /// Travel speed in world units per second.
        speed: f32,
    },
    /// Shell that bursts over an area at the impact point.
    Artillery {
        /// Travel speed in world units per second.
        speed: f32,
        /// Radius of the burst.
        blast_radius: f32,
    },
    /// Hitscan resolved in the firing tick.
    Instant,
    /// The tower never fires.
    None,
}

/// Passive aura category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveKind {
    /// Multiplies the damage of nearby towers.
    DamageAura,
    /// Multiplies the fire rate of nearby towers.
    FireRateAura,
    /// Slows enemies walking through the aura.
    SlowAura,
    /// Stops enemies walking through the aura.
    RootAura,
}

/// Passive aura emitted by a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    /// Category of the aura.
    pub kind: PassiveKind,
    /// Multiplier applied to whatever the aura affects.
    pub multiplier: f32,
    /// Aura radius in world units.
    pub radius: f32,
}

/// Tech branch chosen at the final upgrade level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    /// Raw damage branch.
    Offense,
    /// Crowd-control branch.
    Control,
}

/// Player-activated tower abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Shots fly straight through every enemy they cross.
    Piercing,
    /// Fire rate is tripled.
    RapidFire,
    /// Shots mark their target for extra damage instead of hurting it.
    MarkTarget,
    /// Freezes every enemy in range on activation.
    Blizzard,
    /// Hits jump to nearby enemies.
    ChainLightning,
    /// Shots set their target on fire.
    Incendiary,
}

impl AbilityKind {
    /// How long the ability stays active after activation.
    #[must_use]
    pub const fn duration_ms(self) -> f32 {
        match self {
            Self::Piercing => 5_000.0,
            Self::RapidFire => 4_000.0,
            Self::MarkTarget | Self::ChainLightning | Self::Incendiary => 6_000.0,
            Self::Blizzard => 0.0,
        }
    }

    /// Cooldown started on activation.
    #[must_use]
    pub const fn cooldown_ms(self) -> f32 {
        match self {
            Self::Piercing | Self::Incendiary => 15_000.0,
            Self::RapidFire | Self::Blizzard => 20_000.0,
            Self::MarkTarget => 18_000.0,
            Self::ChainLightning => 16_000.0,
        }
    }
}

/// Cooldown and activity counters of a tower's ability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    /// Ability owned by the tower.
    pub kind: AbilityKind,
    /// Milliseconds until the ability can be activated again.
    pub cooldown_ms: f32,
    /// Milliseconds the ability remains active.
    pub active_ms: f32,
}

impl AbilityState {
    /// Ready-to-use ability of the provided kind.
    #[must_use]
    pub const fn ready(kind: AbilityKind) -> Self {
        Self {
            kind,
            cooldown_ms: 0.0,
            active_ms: 0.0,
        }
    }

    /// Reports whether the ability's effect is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_ms > 0.0
    }

    /// Reports whether the ability can be activated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_ms <= 0.0
    }

    /// Starts the ability; returns `false` while it is still cooling down.
    pub fn activate(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active_ms = self.kind.duration_ms();
        self.cooldown_ms = self.kind.cooldown_ms();
        true
    }

    /// Advances both counters by `dt_ms`, flooring at zero.
    pub fn tick(&mut self, dt_ms: f32) {
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);
        self.active_ms = (self.active_ms - dt_ms).max(0.0);
    }
}

/// Closed set of tower archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap single-target shooter.
    Arrow,
    /// Slow artillery with splash.
    Cannon,
    /// Long-range hitscan.
    Sniper,
    /// Slows enemies in range.
    Frost,
    /// Hitscan lightning.
    Tesla,
    /// Rapid short-range fire.
    Flame,
    /// Support tower that buffs its neighbours.
    Beacon,
}

impl TowerKind {
    /// Level-one stats of the kind.
    #[must_use]
    pub const fn base_stats(self) -> TowerStats {
        let (damage, range, fire_rate) = match self {
            Self::Arrow => (20.0, 150.0, 1.5),
            Self::Cannon => (45.0, 130.0, 0.6),
            Self::Sniper => (90.0, 300.0, 0.4),
            Self::Frost => (8.0, 120.0, 1.0),
            Self::Tesla => (30.0, 120.0, 0.8),
            Self::Flame => (12.0, 100.0, 2.0),
            Self::Beacon => (0.0, 0.0, 0.0),
        };
        TowerStats {
            damage,
            range,
            fire_rate,
        }
    }

    /// Stats after upgrading to `level`, clamped to `1..=MAX_LEVEL`.
    #[must_use]
    pub fn stats_at_level(self, level: u8) -> TowerStats {
        let steps = f32::from(level.clamp(1, MAX_LEVEL) - 1);
        let base = self.base_stats();
        TowerStats {
            damage: base.damage * (1.0 + 0.35 * steps),
            range: base.range * (1.0 + 0.10 * steps),
            fire_rate: base.fire_rate * (1.0 + 0.15 * steps),
        }
    }

    /// How shots of this kind travel.
    #[must_use]
    pub const fn delivery(self) -> Delivery {
        match self {
            Self::Arrow => Delivery::Projectile { speed: 400.0 },
            Self::Cannon => Delivery::Artillery {
                speed: 250.0,
                blast_radius: 60.0,
            },
            Self::Sniper | Self::Tesla => Delivery::Instant,
            Self::Frost => Delivery::Projectile { speed: 350.0 },
            Self::Flame => Delivery::Projectile { speed: 300.0 },
            Self::Beacon => Delivery::None,
        }
    }

    /// Ability owned by the kind, if any.
    #[must_use]
    pub const fn ability(self) -> Option<AbilityKind> {
        match self {
            Self::Arrow => Some(AbilityKind::Piercing),
            Self::Cannon => Some(AbilityKind::RapidFire),
            Self::Sniper => Some(AbilityKind::MarkTarget),
            Self::Frost => Some(AbilityKind::Blizzard),
            Self::Tesla => Some(AbilityKind::ChainLightning),
            Self::Flame => Some(AbilityKind::Incendiary),
            Self::Beacon => None,
        }
    }

    /// Gold required to place the kind.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Arrow => 100,
            Self::Cannon => 150,
            Self::Sniper => 200,
            Self::Frost => 120,
            Self::Tesla => 180,
            Self::Flame => 140,
            Self::Beacon => 160,
        }
    }

    /// Gold required for each upgrade level.
    #[must_use]
    pub const fn upgrade_cost(self) -> u32 {
        self.cost() * 3 / 4
    }
}

/// Live tower record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Identifier allocated at placement.
    pub id: TowerId,
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Center of the tower.
    pub position: Vec2,
    /// Stats from the kind table at the current level; rewritten only on placement and upgrade.
    pub base: TowerStats,
    /// Stats recomputed from `base` every tick.
    pub effective: TowerStats,
    /// Upgrade level in `1..=MAX_LEVEL`.
    pub level: u8,
    /// Tech branch, chosen once at the final level.
    pub specialization: Option<Specialization>,
    /// Ability counters for kinds that own an ability.
    pub ability: Option<AbilityState>,
    /// Milliseconds the tower stays disabled.
    pub disabled_ms: f32,
    /// Milliseconds until the next shot.
    pub fire_cooldown_ms: f32,
    /// Target ordering policy.
    pub priority: TargetPriority,
    /// Gold spent on placement and upgrades.
    pub invested_gold: u32,
    /// Kills credited to the tower.
    pub kills: u32,
    /// Damage dealt by the tower over its lifetime.
    pub damage_dealt: f32,
}

impl Tower {
    /// Places a level-one tower.
    #[must_use]
    pub fn place(id: TowerId, kind: TowerKind, position: Vec2) -> Self {
        let base = kind.stats_at_level(1);
        Self {
            id,
            kind,
            position,
            base,
            effective: base,
            level: 1,
            specialization: None,
            ability: kind.ability().map(AbilityState::ready),
            disabled_ms: 0.0,
            fire_cooldown_ms: 0.0,
            priority: TargetPriority::default(),
            invested_gold: kind.cost(),
            kills: 0,
            damage_dealt: 0.0,
        }
    }

    /// Raises the level by one, returning the gold charged, or `None` at max level.
    pub fn upgrade(&mut self) -> Option<u32> {
        if self.level >= MAX_LEVEL {
            return None;
        }
        self.level += 1;
        self.base = self.kind.stats_at_level(self.level);
        let cost = self.kind.upgrade_cost();
        self.invested_gold = self.invested_gold.saturating_add(cost);
        Some(cost)
    }

    /// Chooses a tech branch; only allowed once and only at max level.
    pub fn specialize(&mut self, specialization: Specialization) -> bool {
        if self.level < MAX_LEVEL || self.specialization.is_some() {
            return false;
        }
        self.specialization = Some(specialization);
        true
    }

    /// Gold refunded when the tower is sold.
    #[must_use]
    pub const fn sell_refund(&self) -> u32 {
        self.invested_gold / 10 * 7 + self.invested_gold % 10 * 7 / 10
    }

    /// Reports whether the tower is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled_ms > 0.0
    }

    /// Returns the ability if it is currently running.
    #[must_use]
    pub fn active_ability(&self) -> Option<AbilityKind> {
        self.ability
            .filter(AbilityState::is_active)
            .map(|state| state.kind)
    }

    /// Fire-rate multiplier from the tower's own active buff.
    #[must_use]
    pub fn self_fire_rate_multiplier(&self) -> f32 {
        match self.active_ability() {
            Some(AbilityKind::RapidFire) => RAPID_FIRE_MULTIPLIER,
            _ => 1.0,
        }
    }

    /// Aura emitted by the tower, taking its specialization into account.
    #[must_use]
    pub fn passive(&self) -> Option<Passive> {
        let range = self.base.range;
        match (self.kind, self.specialization) {
            (TowerKind::Frost, Some(Specialization::Control)) => Some(Passive {
                kind: PassiveKind::RootAura,
                multiplier: 0.0,
                radius: range * 0.5,
            }),
            (TowerKind::Frost, Some(Specialization::Offense)) => Some(Passive {
                kind: PassiveKind::SlowAura,
                multiplier: 0.45,
                radius: range,
            }),
            (TowerKind::Frost, None) => Some(Passive {
                kind: PassiveKind::SlowAura,
                multiplier: 0.6,
                radius: range,
            }),
            (TowerKind::Beacon, Some(Specialization::Control)) => Some(Passive {
                kind: PassiveKind::FireRateAura,
                multiplier: 1.2,
                radius: 120.0,
            }),
            (TowerKind::Beacon, Some(Specialization::Offense)) => Some(Passive {
                kind: PassiveKind::DamageAura,
                multiplier: 1.4,
                radius: 120.0,
            }),
            (TowerKind::Beacon, None) => Some(Passive {
                kind: PassiveKind::DamageAura,
                multiplier: 1.25,
                radius: 120.0,
            }),
            _ => None,
        }
    }
}
