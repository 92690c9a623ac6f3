use {
    bevy::prelude::*,
    enemy_components::{Enemy, EnemyKind, Health, Knockback},
    enemy_events::*,
    player_components::{Player, player_position},
    rand::{Rng, seq::IndexedRandom},
    states::simulation_running,
    std::{f32::consts::TAU, time::Duration},
    system_schedule::{GameSchedule, TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

#[cfg(test)]
mod tests;

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EnemyEventsPlugin)
            .init_resource::<SpawnConfig>()
            .init_resource::<Score>()
            .register_type::<Enemy>()
            .register_type::<Health>()
            .register_type::<EnemyKind>()
            .register_type::<Knockback>()
            .register_type::<Score>()
            .add_systems(Startup, arm_spawner_on_startup)
            .add_systems(
                Update,
                apply_knockback
                    .in_set(GameSchedule::PerformAction)
                    .run_if(simulation_running),
            )
            .add_observer(on_damage_enemy)
            .add_observer(on_score_awarded)
            .add_observer(on_spawn_task);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnConfig {
    pub interval: Duration,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1200),
            min_distance: 400.0,
            max_distance: 700.0,
        }
    }
}

#[derive(Resource, Reflect, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct Score(pub u32);

/// Per-second fraction of knockback velocity lost.
const KNOCKBACK_DAMPING: f32 = 6.0;
const KNOCKBACK_REST_SPEED: f32 = 5.0;

/// Registers the recurring spawn task. Called at startup and after a restart.
pub fn arm_spawner(scheduler: &mut TaskScheduler, config: &SpawnConfig) {
    scheduler.cancel_owned(&TaskOwner::Spawner);
    scheduler.schedule_repeating(config.interval, TaskKind::EnemySpawn, Some(TaskOwner::Spawner));
}

fn arm_spawner_on_startup(mut scheduler: ResMut<TaskScheduler>, config: Res<SpawnConfig>) {
    arm_spawner(&mut scheduler, &config);
}

fn spawn_weight(kind: &EnemyKind) -> u32 {
    match kind {
        EnemyKind::Drone => 40,
        EnemyKind::Striker => 25,
        EnemyKind::Bruiser => 20,
        EnemyKind::Pentagon => 8,
        EnemyKind::Elite => 4,
        EnemyKind::StarElite => 3,
    }
}

/// Random point on the ring `[min_distance, max_distance]` around `center`.
pub fn spawn_position(center: Vec2, config: &SpawnConfig, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.random_range(0.0..TAU);
    let distance = rng.random_range(config.min_distance..=config.max_distance);
    center + Vec2::from_angle(angle) * distance
}

fn on_spawn_task(
    trigger: On<TaskFired>,
    mut commands: Commands,
    config: Res<SpawnConfig>,
    players: Query<&Transform, With<Player>>,
) {
    if trigger.event().kind != TaskKind::EnemySpawn {
        return;
    }
    let Some(center) = player_position(&players) else {
        return;
    };

    let mut rng = rand::rng();
    let kind = EnemyKind::ALL
        .choose_weighted(&mut rng, spawn_weight)
        .copied()
        .unwrap_or_default();
    let position = spawn_position(center, &config, &mut rng);

    trace!(?kind, ?position, "spawning enemy");
    commands.spawn((
        Enemy,
        kind,
        Health::new(kind.base_health()),
        Transform::from_translation(position.extend(0.0)),
    ));
}

/// The only place enemy health goes down. A kill is rewarded once: later hits
/// on the same enemy in the same frame find it already dead and are ignored.
pub fn on_damage_enemy(
    trigger: On<DamageEnemy>,
    mut commands: Commands,
    mut enemies: Query<(&mut Health, &Transform, &EnemyKind), With<Enemy>>,
) {
    let event = trigger.event();
    let Ok((mut health, transform, kind)) = enemies.get_mut(event.target) else {
        return;
    };
    if !health.is_alive() {
        return;
    }

    health.current -= event.amount;
    let position = transform.translation.truncate();
    commands.trigger(DamageNumberShown {
        position,
        amount: event.amount,
        source: event.source,
    });

    if health.is_alive() {
        return;
    }

    debug!(enemy = ?event.target, ?kind, source = ?event.source, "enemy killed");
    commands.trigger(EnemyKilled {
        entity: event.target,
        position,
        kind: *kind,
    });
    commands.trigger(ScoreAwarded {
        points: kind.points(),
    });
    commands.trigger(PickupSpawnRequested { position });
    commands.entity(event.target).despawn();
}

fn on_score_awarded(trigger: On<ScoreAwarded>, mut score: ResMut<Score>) {
    score.0 += trigger.event().points;
}

fn apply_knockback(
    time: Res<Time>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Transform, &mut Knockback), With<Enemy>>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut knockback) in query.iter_mut() {
        transform.translation += (knockback.0 * dt).extend(0.0);
        knockback.0 *= (1.0 - KNOCKBACK_DAMPING * dt).max(0.0);
        if knockback.0.length() < KNOCKBACK_REST_SPEED {
            commands.entity(entity).remove::<Knockback>();
        }
    }
}
