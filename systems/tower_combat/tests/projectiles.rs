use glam::Vec2;
use rampart_core::{
    Bounds, DamagePayload, Enemy, EnemyId, EnemyKind, Event, HitMarker, Path, Projectile,
    ProjectileBehavior, ProjectileId, TowerId, TowerKind,
};
use rampart_system_tower_combat::{advance_projectiles, CombatContext};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn path() -> Path {
    Path::new(vec![Vec2::new(0.0, 100.0), Vec2::new(400.0, 100.0)])
}

fn enemy(id: u32, x: f32) -> Enemy {
    let path = path();
    let mut enemy = Enemy::spawn(EnemyId::new(id), EnemyKind::Grunt, &path, 1.0);
    enemy.place_at(&path, 0, x);
    enemy
}

fn ctx() -> CombatContext {
    CombatContext {
        crit_chance: 0.0,
        splash: None,
        bounds: Bounds::new(400.0, 200.0),
    }
}

fn payload(damage: f32, behavior: ProjectileBehavior) -> DamagePayload {
    DamagePayload {
        damage,
        source: Some(TowerId::new(3)),
        source_kind: Some(TowerKind::Arrow),
        behavior,
    }
}

fn launch(origin: Vec2, target: &Enemy, speed: f32, payload: DamagePayload) -> Projectile {
    Projectile::launch(
        ProjectileId::new(1),
        origin,
        target.id,
        target.position,
        speed,
        payload,
        1_000.0,
    )
}

fn hits(events: &[Event]) -> Vec<EnemyId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyHit {
                enemy,
                marker: HitMarker::Damage { .. },
                ..
            } => Some(*enemy),
            _ => None,
        })
        .collect()
}

#[test]
fn homing_shot_travels_then_impacts() {
    let mut enemies = vec![enemy(1, 100.0)];
    let mut projectiles = vec![launch(
        Vec2::new(100.0, 0.0),
        &enemies[0],
        400.0,
        payload(20.0, ProjectileBehavior::default()),
    )];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    advance_projectiles(&mut projectiles, &mut enemies, 200.0, &ctx(), &mut rng, &mut events);
    assert_eq!(projectiles.len(), 1);
    assert!(projectiles[0].position.distance(Vec2::new(100.0, 80.0)) < 1e-3);
    assert!(events.is_empty());

    advance_projectiles(&mut projectiles, &mut enemies, 200.0, &ctx(), &mut rng, &mut events);
    assert!(projectiles.is_empty());
    assert_eq!(hits(&events), vec![EnemyId::new(1)]);
    assert_eq!(enemies[0].health, 80.0);
}

#[test]
fn orphaned_plain_shot_is_dropped_without_effect() {
    let mut enemies = vec![enemy(1, 100.0), enemy(2, 104.0)];
    let mut projectiles = vec![launch(
        Vec2::new(100.0, 0.0),
        &enemies[0],
        100.0,
        payload(20.0, ProjectileBehavior::default()),
    )];
    let _ = enemies[0].apply_damage(500.0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    advance_projectiles(&mut projectiles, &mut enemies, 50.0, &ctx(), &mut rng, &mut events);

    assert!(projectiles.is_empty());
    assert!(events.is_empty());
    assert_eq!(enemies[1].health, 100.0);
}

#[test]
fn orphaned_shell_bursts_at_last_known_position() {
    let mut enemies = vec![enemy(1, 100.0), enemy(2, 130.0), enemy(3, 300.0)];
    let mut projectiles = vec![launch(
        Vec2::new(100.0, 0.0),
        &enemies[0],
        100.0,
        payload(
            45.0,
            ProjectileBehavior {
                area: Some(60.0),
                ..ProjectileBehavior::default()
            },
        ),
    )];
    let _ = enemies.remove(0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    advance_projectiles(&mut projectiles, &mut enemies, 50.0, &ctx(), &mut rng, &mut events);

    assert!(projectiles.is_empty());
    assert_eq!(hits(&events), vec![EnemyId::new(2)]);
    assert_eq!(enemies[0].health, 55.0);
    assert_eq!(enemies[1].health, 100.0);
}

#[test]
fn shell_that_outruns_its_travel_budget_bursts_where_it_stops() {
    let mut enemies = vec![enemy(1, 350.0), enemy(2, 150.0)];
    let mut projectiles = vec![Projectile::launch(
        ProjectileId::new(1),
        Vec2::new(100.0, 100.0),
        enemies[0].id,
        enemies[0].position,
        100.0,
        payload(
            45.0,
            ProjectileBehavior {
                area: Some(20.0),
                ..ProjectileBehavior::default()
            },
        ),
        40.0,
    )];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    advance_projectiles(&mut projectiles, &mut enemies, 500.0, &ctx(), &mut rng, &mut events);

    assert!(projectiles.is_empty());
    assert_eq!(hits(&events), vec![EnemyId::new(2)]);
    assert_eq!(enemies[0].health, 100.0);
    assert_eq!(enemies[1].health, 55.0);
}

#[test]
fn piercing_shot_hits_each_enemy_once_and_leaves_the_field() {
    let mut enemies = vec![enemy(1, 150.0), enemy(2, 100.0), enemy(3, 250.0)];
    let first = enemies[1].clone();
    let mut projectiles = vec![launch(
        Vec2::new(50.0, 100.0),
        &first,
        400.0,
        payload(
            20.0,
            ProjectileBehavior {
                pierce: true,
                ..ProjectileBehavior::default()
            },
        ),
    )];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    advance_projectiles(&mut projectiles, &mut enemies, 300.0, &ctx(), &mut rng, &mut events);
    assert_eq!(hits(&events), vec![EnemyId::new(2), EnemyId::new(1)]);
    assert_eq!(projectiles.len(), 1);

    advance_projectiles(&mut projectiles, &mut enemies, 1_000.0, &ctx(), &mut rng, &mut events);
    assert_eq!(
        hits(&events),
        vec![EnemyId::new(2), EnemyId::new(1), EnemyId::new(3)]
    );
    assert!(projectiles.is_empty(), "shot left the playfield");
    assert!(enemies.iter().all(|enemy| enemy.health == 80.0));
}
