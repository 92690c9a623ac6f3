use {
    bevy::prelude::*,
    chain_lightning::ChainLightning,
    enemies::{Score, SpawnConfig, arm_spawner},
    enemy_components::Enemy,
    missiles::{MissileLauncher, MissileLauncherConfig, MissilePool, arm_launcher},
    pickups::EnergyOrb,
    player_components::{Player, PlayerBody},
    shockwave::{ElectricField, ShockwaveState},
    skill_events::RestartRun,
    skill_resources::{Experience, PlayerSkills, SkillOffer},
    stat_resources::{PlayerStats, StatKey, StatModifiers},
    states::SimulationPhase,
    system_schedule::TaskScheduler,
};

pub fn spawn_player(mut commands: Commands) {
    info!("spawning player");
    commands.spawn((Player, Name::new("Player")));
}

/// Drops everything the player earned this run: skills, stat modifiers,
/// experience and score.
#[allow(clippy::too_many_arguments)]
pub fn reset_progress(
    _trigger: On<RestartRun>,
    mut skills: ResMut<PlayerSkills>,
    mut offer: ResMut<SkillOffer>,
    mut stats: ResMut<PlayerStats>,
    mut modifiers: ResMut<StatModifiers>,
    mut experience: ResMut<Experience>,
    mut score: ResMut<Score>,
    mut phase: ResMut<SimulationPhase>,
    mut shockwave: ResMut<ShockwaveState>,
    mut launcher: ResMut<MissileLauncher>,
) {
    for key in StatKey::ALL {
        if let Some(base) = modifiers.base(key) {
            stats.set(key, base);
        }
    }
    modifiers.recapture(&stats);

    skills.reset();
    offer.clear();
    *experience = Experience::default();
    *score = Score::default();
    *phase = SimulationPhase::Running;
    *shockwave = ShockwaveState::default();
    *launcher = MissileLauncher::default();
    info!("run progress reset");
}

/// Clears the field and every pending task, then re-arms the recurring ones.
#[allow(clippy::too_many_arguments)]
pub fn reset_world(
    _trigger: On<RestartRun>,
    mut commands: Commands,
    mut scheduler: ResMut<TaskScheduler>,
    mut pool: ResMut<MissilePool>,
    mut chains: ResMut<ChainLightning>,
    spawn_config: Res<SpawnConfig>,
    launcher_config: Res<MissileLauncherConfig>,
    enemies: Query<Entity, With<Enemy>>,
    orbs: Query<Entity, With<EnergyOrb>>,
    mut players: Query<(Entity, &mut Transform, &mut PlayerBody), With<Player>>,
) {
    scheduler.clear();
    let missiles = pool.release_all();
    chains.clear();

    let mut despawned = 0;
    for entity in enemies.iter().chain(orbs.iter()) {
        commands.entity(entity).despawn();
        despawned += 1;
    }

    for (entity, mut transform, mut body) in &mut players {
        transform.translation = Vec3::ZERO;
        *body = PlayerBody::default();
        commands.entity(entity).remove::<ElectricField>();
    }

    arm_spawner(&mut scheduler, &spawn_config);
    arm_launcher(&mut scheduler, &launcher_config);
    debug!(missiles, despawned, "world cleared for a new run");
}
