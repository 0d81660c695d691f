use rampart_core::{
    within_radius, AbilityKind, AbilitySource, Command, EnemyKind, Event, Hazard, Snapshot,
    Tower, TowerId, BLIZZARD_FREEZE_MS,
};
use rampart_system_spawning::{spawn, start_wave, SpawnContext};
use tracing::{debug, warn};

use crate::StageContext;

/// Applies one command to `snapshot`.
///
/// Affordability is the caller's concern: gold is charged and refunded with
/// saturating arithmetic. Commands naming an unknown tower are ignored.
pub(crate) fn apply(
    snapshot: &mut Snapshot,
    context: &StageContext,
    spawn_health: f32,
    command: Command,
    out: &mut Vec<Event>,
) {
    match command {
        Command::StartWave => {
            let _ = start_wave(snapshot, context.stage(), out);
        }
        Command::PlaceTower { kind, position } => {
            let tower = Tower::place(snapshot.ids.next_tower(), kind, position);
            snapshot.economy.gold = snapshot.economy.gold.saturating_sub(kind.cost());
            out.push(Event::TowerPlaced {
                tower: tower.id,
                kind,
            });
            snapshot.towers.push(tower);
        }
        Command::SellTower { tower } => {
            let Some(index) = snapshot.towers.iter().position(|candidate| candidate.id == tower)
            else {
                return ignored(command);
            };
            let sold = snapshot.towers.remove(index);
            let refund = sold.sell_refund();
            snapshot.economy.gold = snapshot.economy.gold.saturating_add(refund);
            out.push(Event::TowerSold { tower, refund });
        }
        Command::UpgradeTower { tower } => {
            let Some(target) = tower_mut(snapshot, command) else {
                return;
            };
            let Some(cost) = target.upgrade() else {
                return;
            };
            let level = target.level;
            snapshot.economy.gold = snapshot.economy.gold.saturating_sub(cost);
            out.push(Event::TowerUpgraded { tower, level });
        }
        Command::Specialize {
            tower,
            specialization,
        } => {
            if let Some(target) = tower_mut(snapshot, command) {
                let chosen = target.specialize(specialization);
                debug!(
                    target: "rampart::world",
                    tower = tower.get(),
                    chosen,
                    "tower.specialized"
                );
            }
        }
        Command::SetTargetPriority { tower, priority } => {
            if let Some(target) = tower_mut(snapshot, command) {
                target.priority = priority;
            }
        }
        Command::ActivateAbility { tower } => activate(snapshot, command, tower, out),
        Command::DeployHazard {
            position,
            radius,
            duration_ms,
            effect,
        } => {
            let usable = radius.is_finite()
                && radius > 0.0
                && duration_ms.is_finite()
                && duration_ms > 0.0
                && position.is_finite();
            if !usable {
                return ignored(command);
            }
            let id = snapshot.ids.next_hazard();
            debug!(target: "rampart::world", hazard = id.get(), "hazard.deployed");
            snapshot.hazards.push(Hazard {
                id,
                position,
                radius,
                remaining_ms: duration_ms,
                effect,
            });
        }
        Command::SpawnEnemy { kind } => {
            if kind == EnemyKind::Boss {
                warn!(target: "rampart::world", "spawn.boss_by_command");
                return;
            }
            let ctx = SpawnContext {
                stage: context.stage(),
                path: context.path(),
                spawn_health,
            };
            let _ = spawn(&mut snapshot.enemies, &mut snapshot.ids, kind, &ctx, out);
        }
    }
}

fn activate(snapshot: &mut Snapshot, command: Command, tower: TowerId, out: &mut Vec<Event>) {
    let Some(target) = tower_mut(snapshot, command) else {
        return;
    };
    if target.is_disabled() {
        return;
    }
    let Some(ability) = target.ability.as_mut() else {
        return;
    };
    if !ability.activate() {
        return;
    }
    let kind = ability.kind;
    let center = target.position;
    let range = target.effective.range.max(target.base.range);

    if kind == AbilityKind::Blizzard {
        for enemy in snapshot
            .enemies
            .iter_mut()
            .filter(|enemy| enemy.is_alive() && enemy.boss.is_none())
        {
            if within_radius(center, enemy.position, range + enemy.hit_radius()) {
                enemy.frozen_ms = enemy.frozen_ms.max(BLIZZARD_FREEZE_MS);
            }
        }
    }

    out.push(Event::AbilityUsed {
        source: AbilitySource::Tower {
            tower,
            ability: kind,
        },
    });
}

fn tower_mut(snapshot: &mut Snapshot, command: Command) -> Option<&mut Tower> {
    let id = match command {
        Command::SellTower { tower }
        | Command::UpgradeTower { tower }
        | Command::Specialize { tower, .. }
        | Command::SetTargetPriority { tower, .. }
        | Command::ActivateAbility { tower } => tower,
        _ => return None,
    };
    let found = snapshot.towers.iter_mut().find(|tower| tower.id == id);
    if found.is_none() {
        ignored(command);
    }
    found
}

fn ignored(command: Command) {
    debug!(target: "rampart::world", command = ?command, "command.ignored");
}
