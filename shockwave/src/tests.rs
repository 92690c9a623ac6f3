use {
    crate::*,
    enemy_components::{Enemy, EnemyKind, Health},
    skill_events::SkillActionApplied,
    skills_assets::SkillAction,
    states::SimulationPhasePlugin,
    system_schedule::SchedulePlugin,
};

#[derive(Component)]
struct TestResult {
    target: Entity,
    source: DamageSource,
}

fn setup() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<PlayerStats>()
        .init_resource::<PlayerSkills>()
        .add_plugins((SimulationPhasePlugin, SchedulePlugin, ShockwavePlugin));
    app.add_observer(|trigger: On<DamageEnemy>, mut commands: Commands| {
        let event = trigger.event();
        commands.spawn(TestResult {
            target: event.target,
            source: event.source,
        });
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

fn spawn_enemy(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Enemy,
            Health::new(100.0),
            EnemyKind::Drone,
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

fn hits(app: &mut App) -> Vec<(Entity, DamageSource)> {
    let mut query = app.world_mut().query::<&TestResult>();
    query
        .iter(app.world())
        .map(|result| (result.target, result.source))
        .collect()
}

#[test]
fn pulse_hits_enemies_in_radius_and_blocks_overlap() {
    let mut app = setup();
    let near = spawn_enemy(&mut app, Vec2::new(300.0, 0.0));
    let far = spawn_enemy(&mut app, Vec2::new(900.0, 0.0));

    app.world_mut()
        .trigger(PerformShockwave::new(ShockwaveSource::LevelUp));
    app.world_mut()
        .trigger(PerformShockwave::new(ShockwaveSource::Auto));
    app.update();

    assert_eq!(hits(&mut app), vec![(near, DamageSource::Shockwave)]);
    let knockback = app.world().get::<Knockback>(near).expect("knocked back");
    assert_eq!(knockback.0, Vec2::new(1400.0, 0.0));
    assert!(app.world().get::<Knockback>(far).is_none());

    advance(&mut app, 350);
    assert!(!app.world().resource::<ShockwaveState>().active);
}

#[test]
fn double_shockwave_echoes_once_and_larger() {
    let mut app = setup();
    app.world_mut()
        .resource_mut::<PlayerSkills>()
        .grant_behavior(DOUBLE_SHOCKWAVE);
    let far = spawn_enemy(&mut app, Vec2::new(1000.0, 0.0));

    app.world_mut()
        .trigger(PerformShockwave::new(ShockwaveSource::LevelUp));
    app.update();
    assert!(hits(&mut app).is_empty());
    assert!(app.world().resource::<ShockwaveState>().echo_pending);

    advance(&mut app, 400);
    advance(&mut app, 700);

    assert_eq!(hits(&mut app), vec![(far, DamageSource::Shockwave)]);
    assert!(!app.world().resource::<ShockwaveState>().echo_pending);

    // The echo itself does not schedule another echo.
    advance(&mut app, 2000);
    assert_eq!(hits(&mut app).len(), 1);
}

#[test]
fn manual_cast_respects_cooldown() {
    let mut app = setup();

    app.world_mut()
        .trigger(PerformShockwave::new(ShockwaveSource::Manual));
    app.update();
    assert_eq!(
        app.world().resource::<ShockwaveState>().cooldown,
        Duration::from_secs(15)
    );

    advance(&mut app, 500);
    let before = app.world().resource::<ShockwaveState>().cooldown;
    app.world_mut().trigger(PerformShockwave::new(ShockwaveSource::Manual));
    assert_eq!(app.world().resource::<ShockwaveState>().cooldown, before);

    app.world_mut().trigger(PickupCollected {
        position: Vec2::ZERO,
    });
    assert_eq!(
        app.world().resource::<ShockwaveState>().cooldown,
        before - Duration::from_millis(100)
    );
}

#[test]
fn pickup_reduction_stops_at_the_floor() {
    let mut state = ShockwaveState {
        cooldown: Duration::from_millis(1050),
        ..default()
    };
    let floor = Duration::from_millis(1000);

    state.reduce_cooldown(Duration::from_millis(100), floor);
    assert_eq!(state.cooldown, floor);

    state.cooldown = Duration::from_millis(400);
    state.reduce_cooldown(Duration::from_millis(100), floor);
    assert_eq!(state.cooldown, Duration::from_millis(400));
}

#[test]
fn electric_field_pulses_inside_its_radius() {
    let mut app = setup();
    let inside = spawn_enemy(&mut app, Vec2::new(100.0, 0.0));
    spawn_enemy(&mut app, Vec2::new(200.0, 0.0));

    app.world_mut().trigger(SkillActionApplied {
        action: SkillAction::ActivateElectricField,
        stacks: 2,
    });
    app.world_mut().trigger(SkillActionApplied {
        action: SkillAction::ActivateElectricField,
        stacks: 3,
    });
    app.update();

    let scheduler = app.world().resource::<TaskScheduler>();
    assert_eq!(scheduler.owned_by(&TaskOwner::ElectricField).count(), 1);

    advance(&mut app, 500);

    // Radius at three stacks is 140.
    assert_eq!(hits(&mut app), vec![(inside, DamageSource::ElectricField)]);
}
