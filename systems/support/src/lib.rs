#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic area heals emitted by support enemies.

use glam::Vec2;
use rampart_core::{within_radius, Enemy, EnemyId, Event};
use tracing::debug;

/// Support-unit system that reuses its pulse buffer between ticks.
#[derive(Debug, Default)]
pub struct Support {
    pulses: Vec<Pulse>,
}

#[derive(Clone, Copy, Debug)]
struct Pulse {
    healer: EnemyId,
    center: Vec2,
    radius: f32,
    amount: f32,
}

impl Support {
    /// Creates a support system with an empty pulse buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts down every healer and resolves the pulses that come due.
    ///
    /// Pulse intervals are scaled by `cooldown_multiplier`, the director's
    /// enemy ability cooldown factor. Healers never heal themselves.
    pub fn handle(
        &mut self,
        enemies: &mut [Enemy],
        dt_ms: f32,
        cooldown_multiplier: f32,
        out: &mut Vec<Event>,
    ) {
        self.pulses.clear();
        let cooldown_multiplier = if cooldown_multiplier.is_finite() && cooldown_multiplier > 0.0 {
            cooldown_multiplier
        } else {
            1.0
        };

        for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            let (Some(pulse), Some(profile)) = (enemy.mend.as_mut(), enemy.kind.mend()) else {
                continue;
            };
            pulse.remaining_ms -= dt_ms;
            if pulse.remaining_ms > 0.0 {
                continue;
            }
            pulse.remaining_ms = profile.interval_ms * cooldown_multiplier;
            self.pulses.push(Pulse {
                healer: enemy.id,
                center: enemy.position,
                radius: profile.radius,
                amount: profile.amount,
            });
        }

        for pulse in &self.pulses {
            let mut healed: u32 = 0;
            for ally in enemies
                .iter_mut()
                .filter(|ally| ally.id != pulse.healer && ally.is_alive())
            {
                if within_radius(pulse.center, ally.position, pulse.radius)
                    && ally.heal(pulse.amount) > 0.0
                {
                    healed += 1;
                }
            }
            debug!(
                target: "rampart::support",
                healer = pulse.healer.get(),
                healed,
                "support.pulse"
            );
            out.push(Event::SupportPulse {
                enemy: pulse.healer,
                healed,
            });
        }
    }
}
