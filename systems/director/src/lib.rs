#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave lifecycle bookkeeping and the difficulty director.
//!
//! The director runs last in every tick. It detects the moment a clearing
//! wave empties the path, pays interest, restores lives on the configured
//! cadence and re-evaluates the difficulty mode. A mode only changes when
//! the same target is proposed on two consecutive evaluations.

use rampart_core::{
    DirectorMode, DirectorState, DirectorTuning, Event, Snapshot, StageConfig, StageOutcome,
    WaveStatus,
};
use tracing::{debug, info};

const BASIS_POINTS: u64 = 10_000;

/// Read-only inputs for the end-of-tick pass.
#[derive(Clone, Copy, Debug)]
pub struct DirectorContext<'a> {
    /// Stage being played.
    pub stage: &'a StageConfig,
    /// Combined meta and augment interest rate.
    pub interest_rate: f32,
    /// Extra lives granted by each regeneration.
    pub life_regen_bonus: u32,
}

/// Observations the director bases its proposal on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSignals {
    /// Remaining lives as a fraction of the cap.
    pub lives_fraction: f32,
    /// Lives lost during the wave that just finished.
    pub lives_lost: u32,
    /// Consecutive waves cleared without losses.
    pub clean_streak: u32,
    /// Gold held after interest.
    pub gold: u32,
}

/// Mode the signals argue for, ignoring hysteresis.
///
/// Relief outranks pressure when both are eligible.
#[must_use]
pub fn propose(signals: &WaveSignals, tuning: &DirectorTuning) -> DirectorMode {
    if signals.lives_fraction < tuning.relief_lives_fraction
        || signals.lives_lost >= tuning.relief_lives_lost
    {
        return DirectorMode::Relief;
    }
    if signals.clean_streak >= tuning.pressure_clean_waves
        && signals.gold >= tuning.pressure_min_gold
        && signals.lives_fraction >= tuning.pressure_min_lives_fraction
    {
        return DirectorMode::Pressure;
    }
    DirectorMode::Neutral
}

/// Feeds one proposal through the hysteresis slot.
///
/// Returns the previous mode when the active mode switched.
pub fn evaluate(state: &mut DirectorState, proposal: DirectorMode) -> Option<DirectorMode> {
    let previous = state.mode;
    if proposal == state.mode {
        state.pending = None;
    } else if state.pending == Some(proposal) {
        state.mode = proposal;
        state.pending = None;
    } else {
        state.pending = Some(proposal);
    }

    if state.mode == DirectorMode::Pressure && previous == DirectorMode::Pressure {
        state.pressure_streak = state.pressure_streak.saturating_add(1);
    } else {
        state.pressure_streak = 0;
    }

    (state.mode != previous).then_some(previous)
}

/// Interest paid on `gold` at `rate`, rounded down.
///
/// The rate is quantized to basis points so the payout does not depend on
/// float rounding of large balances.
#[must_use]
pub fn interest(gold: u32, rate: f32) -> u32 {
    if !rate.is_finite() || rate <= 0.0 {
        return 0;
    }
    let points = (f64::from(rate) * BASIS_POINTS as f64).round() as u64;
    let paid = u64::from(gold).saturating_mul(points) / BASIS_POINTS;
    u32::try_from(paid).unwrap_or(u32::MAX)
}

/// Star rating for a won stage.
#[must_use]
pub fn star_rating(lives_fraction: f32) -> u8 {
    if lives_fraction >= 0.9 {
        3
    } else if lives_fraction >= 0.5 {
        2
    } else {
        1
    }
}

/// Closes the tick: game over, wave completion, economy and director.
pub fn conclude_tick(snapshot: &mut Snapshot, ctx: &DirectorContext<'_>, out: &mut Vec<Event>) {
    if snapshot.outcome.is_some() {
        return;
    }

    if snapshot.economy.lives == 0 {
        snapshot.outcome = Some(StageOutcome::Defeat);
        info!(
            target: "rampart::director",
            wave = snapshot.wave.number,
            "stage.defeat"
        );
        out.push(Event::GameOver {
            wave: snapshot.wave.number,
        });
        return;
    }

    let cleared = snapshot.wave.status == WaveStatus::Clearing
        && snapshot.spawn_queue.is_empty()
        && snapshot.enemies.is_empty();
    if !cleared {
        return;
    }

    complete_wave(snapshot, ctx, out);

    if snapshot.wave.number as usize >= ctx.stage.waves.len() {
        let stars = star_rating(snapshot.economy.lives_fraction());
        snapshot.outcome = Some(StageOutcome::Victory { stars });
        info!(target: "rampart::director", stars, "stage.victory");
        out.push(Event::StageComplete { stars });
    }
}

fn complete_wave(snapshot: &mut Snapshot, ctx: &DirectorContext<'_>, out: &mut Vec<Event>) {
    let wave = &mut snapshot.wave;
    let economy = &mut snapshot.economy;

    wave.status = WaveStatus::Idle;
    wave.cleared = wave.cleared.saturating_add(1);
    let lives_lost = wave.lives_lost_this_wave;
    wave.lives_lost_this_wave = 0;
    wave.clean_streak = if lives_lost == 0 {
        wave.clean_streak.saturating_add(1)
    } else {
        0
    };

    let paid = interest(economy.gold, ctx.interest_rate);
    economy.gold = economy.gold.saturating_add(paid);

    let tuning = &ctx.stage.economy;
    let mut restored = 0;
    if tuning.life_regen_interval > 0 && wave.cleared % tuning.life_regen_interval == 0 {
        let amount = tuning.life_regen_amount.saturating_add(ctx.life_regen_bonus);
        restored = amount.min(economy.max_lives.saturating_sub(economy.lives));
        economy.lives += restored;
    }

    info!(
        target: "rampart::director",
        wave = wave.number,
        lives_lost,
        interest = paid,
        lives_restored = restored,
        "wave.complete"
    );
    out.push(Event::WaveComplete {
        wave: wave.number,
        lives_lost,
        interest: paid,
        lives_restored: restored,
    });

    let signals = WaveSignals {
        lives_fraction: economy.lives_fraction(),
        lives_lost,
        clean_streak: wave.clean_streak,
        gold: economy.gold,
    };
    let proposal = propose(&signals, &ctx.stage.director);
    debug!(
        target: "rampart::director",
        proposal = ?proposal,
        pending = ?snapshot.director.pending,
        "director.proposed"
    );
    if let Some(from) = evaluate(&mut snapshot.director, proposal) {
        let to = snapshot.director.mode;
        info!(target: "rampart::director", from = ?from, to = ?to, "director.switched");
        out.push(Event::DirectorModeChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rampart_core::{Bounds, EconomyTuning, Enemy, EnemyKind, Path, WaveDefinition};

    fn stage(waves: usize) -> StageConfig {
        StageConfig {
            name: "director".to_owned(),
            seed: 3,
            bounds: Bounds::new(400.0, 200.0),
            path: vec![Vec2::new(0.0, 100.0), Vec2::new(400.0, 100.0)],
            starting_gold: 500,
            starting_lives: 20,
            waves: vec![WaveDefinition::default(); waves],
            boss: None,
            economy: EconomyTuning::default(),
            director: DirectorTuning::default(),
            opening: Vec::new(),
        }
    }

    fn clearing(snapshot: &mut Snapshot, number: u32) {
        snapshot.wave.number = number;
        snapshot.wave.status = WaveStatus::Clearing;
    }

    fn ctx(stage: &StageConfig, interest_rate: f32) -> DirectorContext<'_> {
        DirectorContext {
            stage,
            interest_rate,
            life_regen_bonus: 0,
        }
    }

    fn pressure_signals() -> WaveSignals {
        WaveSignals {
            lives_fraction: 1.0,
            lives_lost: 0,
            clean_streak: 4,
            gold: 400,
        }
    }

    fn relief_signals() -> WaveSignals {
        WaveSignals {
            lives_lost: 3,
            clean_streak: 0,
            ..pressure_signals()
        }
    }

    #[test]
    fn relief_outranks_pressure() {
        let tuning = DirectorTuning::default();
        assert_eq!(propose(&pressure_signals(), &tuning), DirectorMode::Pressure);
        let both = WaveSignals {
            lives_fraction: 0.3,
            ..pressure_signals()
        };
        assert_eq!(propose(&both, &tuning), DirectorMode::Relief);
        let poor = WaveSignals {
            gold: 299,
            ..pressure_signals()
        };
        assert_eq!(propose(&poor, &tuning), DirectorMode::Neutral);
    }

    #[test]
    fn single_relief_wave_between_pressure_waves_does_not_switch() {
        let tuning = DirectorTuning::default();
        let mut state = DirectorState::default();

        assert_eq!(evaluate(&mut state, propose(&pressure_signals(), &tuning)), None);
        assert_eq!(
            evaluate(&mut state, propose(&pressure_signals(), &tuning)),
            Some(DirectorMode::Neutral)
        );
        assert_eq!(state.mode, DirectorMode::Pressure);

        assert_eq!(evaluate(&mut state, propose(&relief_signals(), &tuning)), None);
        assert_eq!(state.pending, Some(DirectorMode::Relief));
        assert_eq!(evaluate(&mut state, propose(&pressure_signals(), &tuning)), None);
        assert_eq!(state.mode, DirectorMode::Pressure);
        assert_eq!(state.pending, None);
    }

    #[test]
    fn pressure_streak_grows_only_while_staying_in_pressure() {
        let mut state = DirectorState::default();
        let _ = evaluate(&mut state, DirectorMode::Pressure);
        let _ = evaluate(&mut state, DirectorMode::Pressure);
        assert_eq!(state.pressure_streak, 0);
        let _ = evaluate(&mut state, DirectorMode::Pressure);
        let _ = evaluate(&mut state, DirectorMode::Pressure);
        assert_eq!(state.pressure_streak, 2);
        let _ = evaluate(&mut state, DirectorMode::Neutral);
        let _ = evaluate(&mut state, DirectorMode::Neutral);
        assert_eq!(state.mode, DirectorMode::Neutral);
        assert_eq!(state.pressure_streak, 0);
    }

    #[test]
    fn interest_rounds_down_in_basis_points() {
        assert_eq!(interest(500, 0.08), 40);
        assert_eq!(interest(999, 0.05), 49);
        assert_eq!(interest(500, 0.0), 0);
        assert_eq!(interest(500, f32::NAN), 0);
        assert_eq!(interest(u32::MAX, 10.0), u32::MAX);
    }

    #[test]
    fn clearing_the_path_completes_the_wave_and_pays_interest() {
        let stage = stage(3);
        let mut snapshot = Snapshot::initial(&stage);
        clearing(&mut snapshot, 1);
        let mut events = Vec::new();

        conclude_tick(&mut snapshot, &ctx(&stage, 0.08), &mut events);

        assert_eq!(snapshot.economy.gold, 540);
        assert_eq!(snapshot.wave.status, WaveStatus::Idle);
        assert_eq!(snapshot.wave.cleared, 1);
        assert_eq!(snapshot.wave.clean_streak, 1);
        assert_eq!(
            events,
            vec![Event::WaveComplete {
                wave: 1,
                lives_lost: 0,
                interest: 40,
                lives_restored: 0,
            }]
        );
        assert_eq!(snapshot.outcome, None);
    }

    #[test]
    fn wave_stays_open_while_enemies_remain() {
        let stage = stage(3);
        let mut snapshot = Snapshot::initial(&stage);
        clearing(&mut snapshot, 1);
        let path = Path::new(stage.path.clone());
        let id = snapshot.ids.next_enemy();
        snapshot
            .enemies
            .push(Enemy::spawn(id, EnemyKind::Grunt, &path, 1.0));
        let mut events = Vec::new();

        conclude_tick(&mut snapshot, &ctx(&stage, 0.08), &mut events);

        assert_eq!(snapshot.wave.status, WaveStatus::Clearing);
        assert!(events.is_empty());
    }

    #[test]
    fn lives_regenerate_on_interval_up_to_the_cap() {
        let stage = stage(10);
        let mut snapshot = Snapshot::initial(&stage);
        snapshot.economy.lives = 19;
        snapshot.wave.cleared = 4;
        clearing(&mut snapshot, 5);
        let mut events = Vec::new();
        let ctx = DirectorContext {
            life_regen_bonus: 2,
            ..ctx(&stage, 0.0)
        };

        conclude_tick(&mut snapshot, &ctx, &mut events);

        assert_eq!(snapshot.economy.lives, 20);
        assert!(matches!(
            events.first(),
            Some(Event::WaveComplete {
                lives_restored: 1,
                ..
            })
        ));
    }

    #[test]
    fn final_wave_awards_stars() {
        let stage = stage(2);
        let mut snapshot = Snapshot::initial(&stage);
        snapshot.economy.lives = 12;
        clearing(&mut snapshot, 2);
        let mut events = Vec::new();

        conclude_tick(&mut snapshot, &ctx(&stage, 0.0), &mut events);

        assert_eq!(snapshot.outcome, Some(StageOutcome::Victory { stars: 2 }));
        assert_eq!(events.last(), Some(&Event::StageComplete { stars: 2 }));
        assert_eq!(star_rating(0.9), 3);
        assert_eq!(star_rating(0.49), 1);
    }

    #[test]
    fn running_out_of_lives_ends_the_stage_once() {
        let stage = stage(2);
        let mut snapshot = Snapshot::initial(&stage);
        snapshot.economy.lives = 0;
        clearing(&mut snapshot, 1);
        let mut events = Vec::new();

        conclude_tick(&mut snapshot, &ctx(&stage, 0.0), &mut events);
        conclude_tick(&mut snapshot, &ctx(&stage, 0.0), &mut events);

        assert_eq!(snapshot.outcome, Some(StageOutcome::Defeat));
        assert_eq!(events, vec![Event::GameOver { wave: 1 }]);
    }
}
