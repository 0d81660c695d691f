//! Timed area effects independent of towers and enemies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::HazardId;

/// Effect applied to enemies inside a hazard.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum HazardEffect {
    /// Damage over time.
    Burn {
        /// Health removed per second.
        damage_per_second: f32,
    },
    /// Drags enemies back along the path.
    Pull {
        /// Path distance retreated per second.
        strength: f32,
    },
}

/// Hazard field on the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    /// Identifier allocated at deployment.
    pub id: HazardId,
    /// Field center.
    pub position: Vec2,
    /// Field radius.
    pub radius: f32,
    /// Milliseconds until the field expires.
    pub remaining_ms: f32,
    /// Effect on enemies inside the field.
    pub effect: HazardEffect,
}

impl Hazard {
    /// Reports whether the field has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}
