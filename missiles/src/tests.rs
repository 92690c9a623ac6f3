use {
    crate::*,
    enemy_components::{Enemy, EnemyKind, Health},
    skills_assets::SkillAction,
    states::SimulationPhasePlugin,
    system_schedule::SchedulePlugin,
    std::time::Duration,
};

#[derive(Component)]
struct TestResult {
    target: Entity,
    amount: f32,
    source: DamageSource,
}

#[derive(Component)]
struct MissileHitResult;

fn setup() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<PlayerSkills>()
        .add_plugins((SimulationPhasePlugin, SchedulePlugin, MissilesPlugin));
    app.insert_resource(MissileConfig {
        wobble_amplitude: 0.0,
        ..default()
    });
    app.add_observer(|trigger: On<DamageEnemy>, mut commands: Commands| {
        let event = trigger.event();
        commands.spawn(TestResult {
            target: event.target,
            amount: event.amount,
            source: event.source,
        });
    });
    app.add_observer(|_: On<MissileHit>, mut commands: Commands| {
        commands.spawn(MissileHitResult);
    });
    app.world_mut().spawn(Player);
    app.update();
    app
}

fn advance(app: &mut App, millis: u64) {
    let mut time = app.world().resource::<Time>().clone();
    time.advance_by(Duration::from_millis(millis));
    app.world_mut().insert_resource(time);
    app.update();
    // Bare updates after this one must not replay the step.
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::ZERO);
}

fn grant_missiles(app: &mut App, launch: u32, bounce: u32) {
    {
        let mut skills = app.world_mut().resource_mut::<PlayerSkills>();
        skills.stacks.insert(skill_ids::GUIDED_MISSILE.to_string(), launch);
        skills.stacks.insert(skill_ids::BOUNCING_MISSILE.to_string(), bounce);
    }
    app.world_mut().trigger(SkillActionApplied {
        action: SkillAction::ActivateGuidedMissile,
        stacks: launch,
    });
}

fn pending_launches(app: &App) -> usize {
    app.world()
        .resource::<TaskScheduler>()
        .owned_by(&TaskOwner::Launcher)
        .filter(|task| matches!(task.kind, TaskKind::MissileLaunch { .. }))
        .count()
}

#[test]
fn missile_skill_recomputes_launcher_stacks() {
    let mut app = setup();

    app.world_mut().trigger(SkillActionApplied {
        action: SkillAction::ElectricChainAttack,
        stacks: 1,
    });
    assert!(!app.world().resource::<MissileLauncher>().is_active());

    grant_missiles(&mut app, 12, 1);

    let launcher = app.world().resource::<MissileLauncher>();
    assert_eq!(launcher.launch_stack, 10);
    assert_eq!(launcher.bounce_stack, 1);
}

#[test]
fn volley_launches_paired_missiles_that_hit() {
    let mut app = setup();
    let enemy = app
        .world_mut()
        .spawn((
            Enemy,
            EnemyKind::Drone,
            Health::new(100.0),
            Transform::from_xyz(150.0, 0.0, 0.0),
        ))
        .id();
    grant_missiles(&mut app, 1, 0);

    advance(&mut app, 3000);
    assert_eq!(pending_launches(&app), 2);

    advance(&mut app, 16);
    advance(&mut app, 120);
    assert_eq!(app.world().resource::<MissilePool>().active_count(), 2);

    for _ in 0..120 {
        advance(&mut app, 16);
    }

    let mut query = app.world_mut().query::<&TestResult>();
    let hits: Vec<_> = query.iter(app.world()).collect();
    assert!(!hits.is_empty());
    for hit in hits {
        assert_eq!(hit.target, enemy);
        assert_eq!(hit.amount, 3.0);
        assert_eq!(hit.source, DamageSource::Missile);
    }
    let mut query = app.world_mut().query::<&MissileHitResult>();
    assert!(query.iter(app.world()).count() > 0);
}

#[test]
fn volley_is_skipped_while_selecting_a_skill() {
    let mut app = setup();
    app.world_mut().spawn((Enemy, Health::new(3.0), Transform::from_xyz(100.0, 0.0, 0.0)));
    grant_missiles(&mut app, 3, 0);
    *app.world_mut().resource_mut::<SimulationPhase>() = SimulationPhase::SelectingSkill;

    advance(&mut app, 3000);

    assert_eq!(pending_launches(&app), 0);
    assert_eq!(app.world().resource::<MissilePool>().active_count(), 0);
}

#[test]
fn no_enemies_in_range_means_no_volley() {
    let mut app = setup();
    app.world_mut().spawn((Enemy, Health::new(3.0), Transform::from_xyz(1000.0, 0.0, 0.0)));
    grant_missiles(&mut app, 3, 0);

    advance(&mut app, 3000);

    assert_eq!(pending_launches(&app), 0);
}
