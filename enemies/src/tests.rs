use {
    crate::*,
    rand::{SeedableRng, rngs::StdRng},
};

#[derive(Component)]
struct TestResult {
    kind: EnemyKind,
}

fn setup() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(states::SimulationPhasePlugin)
        .add_plugins(system_schedule::SchedulePlugin)
        .add_plugins(EnemiesPlugin);
    app.add_observer(|trigger: On<EnemyKilled>, mut commands: Commands| {
        commands.spawn(TestResult {
            kind: trigger.event().kind,
        });
    });
    app
}

fn spawn_enemy(app: &mut App, kind: EnemyKind) -> Entity {
    app.world_mut()
        .spawn((Enemy, kind, Health::new(kind.base_health())))
        .id()
}

#[test]
fn kill_is_rewarded_once() {
    let mut app = setup();
    let enemy = spawn_enemy(&mut app, EnemyKind::Pentagon);

    for _ in 0..3 {
        app.world_mut().trigger(DamageEnemy {
            target: enemy,
            amount: 5.0,
            source: DamageSource::Lightning,
        });
    }
    app.update();

    let mut query = app.world_mut().query::<&TestResult>();
    let results: Vec<_> = query.iter(app.world()).collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, EnemyKind::Pentagon);
    assert_eq!(app.world().resource::<Score>().0, 100);
    assert!(app.world().get_entity(enemy).is_err());
}

#[test]
fn damage_below_health_only_wounds() {
    let mut app = setup();
    let enemy = spawn_enemy(&mut app, EnemyKind::StarElite);

    app.world_mut().trigger(DamageEnemy {
        target: enemy,
        amount: 3.0,
        source: DamageSource::Missile,
    });
    app.update();

    let health = app.world().get::<Health>(enemy).expect("enemy is alive");
    assert_eq!(health.current, 9.0);
    assert_eq!(app.world().resource::<Score>().0, 0);
}

#[test]
fn spawner_is_armed_at_startup() {
    let mut app = setup();
    app.update();

    let scheduler = app.world().resource::<TaskScheduler>();
    assert_eq!(scheduler.owned_by(&TaskOwner::Spawner).count(), 1);
    assert!(scheduler.contains_kind(&TaskKind::EnemySpawn));

    let mut scheduler = app.world_mut().resource_mut::<TaskScheduler>();
    arm_spawner(&mut scheduler, &SpawnConfig::default());
    assert_eq!(scheduler.owned_by(&TaskOwner::Spawner).count(), 1);
}

#[test]
fn spawn_positions_stay_on_the_ring() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = SpawnConfig::default();
    let center = Vec2::new(100.0, -50.0);

    for _ in 0..100 {
        let distance = spawn_position(center, &config, &mut rng).distance(center);
        assert!((399.9..=700.1).contains(&distance), "{distance}");
    }
}

#[test]
fn spawn_task_spawns_near_the_player() {
    let mut app = setup();
    app.world_mut().spawn(Player);
    app.world_mut().trigger(TaskFired {
        id: system_schedule::TaskId(0),
        kind: TaskKind::EnemySpawn,
        owner: Some(TaskOwner::Spawner),
    });
    app.update();

    let mut query = app.world_mut().query_filtered::<&Transform, With<Enemy>>();
    let positions: Vec<_> = query.iter(app.world()).collect();
    assert_eq!(positions.len(), 1);
    assert!(positions[0].translation.truncate().length() >= 399.9);
}
