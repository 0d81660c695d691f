//! Timed modifiers attached to enemies and the absorbing shield layer.

use serde::{Deserialize, Serialize};

use crate::TowerId;

/// Kind of timed debuff an enemy can carry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DebuffKind {
    /// Damage over time applied straight to health.
    Burn {
        /// Health removed per second while the burn lasts.
        damage_per_second: f32,
    },
    /// Multiplies the damage of every later direct hit.
    Mark {
        /// Factor applied to incoming hit damage.
        multiplier: f32,
    },
}

impl DebuffKind {
    fn same_family(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Burn { .. }, Self::Burn { .. }) | (Self::Mark { .. }, Self::Mark { .. })
        )
    }
}

/// Debuff instance with its remaining lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Debuff {
    /// Effect carried by the debuff.
    pub kind: DebuffKind,
    /// Milliseconds until the debuff expires.
    pub remaining_ms: f32,
    /// Tower that applied the debuff, if any.
    pub source: Option<TowerId>,
}

/// Active debuffs on a single enemy; at most one of each family.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Debuffs {
    entries: Vec<Debuff>,
}

impl Debuffs {
    /// Attaches a debuff, replacing any existing one of the same family.
    pub fn apply(&mut self, debuff: Debuff) {
        if debuff.remaining_ms <= 0.0 {
            return;
        }
        self.entries
            .retain(|existing| !existing.kind.same_family(&debuff.kind));
        self.entries.push(debuff);
    }

    /// Damage multiplier from an active mark, if one is present.
    #[must_use]
    pub fn mark_multiplier(&self) -> Option<f32> {
        self.entries.iter().find_map(|debuff| match debuff.kind {
            DebuffKind::Mark { multiplier } if multiplier.is_finite() && multiplier > 0.0 => {
                Some(multiplier)
            }
            _ => None,
        })
    }

    /// Advances every debuff by `dt_ms`, returning burn damage accrued over the step.
    ///
    /// Burns that expire mid-step only deal damage for the time they had left.
    pub fn tick(&mut self, dt_ms: f32) -> f32 {
        let mut burn = 0.0;
        for debuff in &mut self.entries {
            let active = dt_ms.min(debuff.remaining_ms).max(0.0);
            if let DebuffKind::Burn { damage_per_second } = debuff.kind {
                burn += damage_per_second.max(0.0) * active / 1_000.0;
            }
            debuff.remaining_ms -= dt_ms;
        }
        self.entries.retain(|debuff| debuff.remaining_ms > 0.0);
        burn
    }

    /// Iterator over the active debuffs.
    pub fn iter(&self) -> impl Iterator<Item = &Debuff> {
        self.entries.iter()
    }

    /// Reports whether no debuff is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Absorbing shield carried by shield-bearing enemies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    /// Current shield points.
    pub value: f32,
    /// Maximum shield points.
    pub capacity: f32,
    /// Set once the shield is driven to zero; cleared when regen resets it.
    pub broken: bool,
    /// Milliseconds elapsed since the last hit.
    pub since_hit_ms: f32,
    /// Uninterrupted no-damage window required before regeneration.
    pub regen_delay_ms: f32,
    /// Points restored per second once the delay has elapsed.
    pub regen_per_second: f32,
}

impl Shield {
    /// Creates a full shield.
    #[must_use]
    pub const fn full(capacity: f32, regen_delay_ms: f32, regen_per_second: f32) -> Self {
        Self {
            value: capacity,
            capacity,
            broken: false,
            since_hit_ms: 0.0,
            regen_delay_ms,
            regen_per_second,
        }
    }

    /// Records a hit, restarting the regen delay window.
    pub fn note_hit(&mut self) {
        self.since_hit_ms = 0.0;
    }

    /// Deducts `damage` from the shield and returns the overflow that reaches health.
    ///
    /// The second value reports whether this hit broke the shield.
    pub fn absorb(&mut self, damage: f32) -> (f32, bool) {
        self.note_hit();
        if self.broken || self.value <= 0.0 || damage <= 0.0 {
            return (damage.max(0.0), false);
        }
        let absorbed = damage.min(self.value);
        self.value = (self.value - absorbed).max(0.0);
        let broke = self.value <= 0.0;
        if broke {
            self.value = 0.0;
            self.broken = true;
        }
        (damage - absorbed, broke)
    }

    /// Advances the regen timer by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f32) {
        self.since_hit_ms += dt_ms;
        if self.since_hit_ms < self.regen_delay_ms {
            return;
        }
        if self.broken {
            self.broken = false;
            self.value = self.capacity;
        } else if self.value < self.capacity {
            let restored = self.regen_per_second.max(0.0) * dt_ms / 1_000.0;
            self.value = (self.value + restored).min(self.capacity);
        }
    }
}
