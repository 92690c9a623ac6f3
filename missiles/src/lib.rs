mod launcher;
mod missile;
mod pool;

pub use {launcher::*, missile::*, pool::*};

#[cfg(test)]
mod tests;

use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery},
    enemy_events::{DamageEnemy, DamageSource, EnemyElectrified, ImpactFlash},
    player_components::{Player, player_position},
    skill_events::{MissileHit, SkillActionApplied},
    skill_resources::PlayerSkills,
    skills_assets::skill_ids,
    states::{SimulationPhase, simulation_running},
    system_schedule::{GameSchedule, TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

pub struct MissilesPlugin;

impl Plugin for MissilesPlugin {
    fn build(&self, app: &mut App) {
        let launcher = MissileLauncherConfig::default();
        app.insert_resource(MissilePool::new(launcher.pool_capacity, launcher.max_active))
            .insert_resource(launcher)
            .init_resource::<MissileConfig>()
            .init_resource::<MissileLauncher>()
            .register_type::<MissileLauncher>()
            .add_systems(Startup, arm_launcher_on_startup)
            .add_systems(
                Update,
                advance_missiles
                    .in_set(GameSchedule::PerformAction)
                    .run_if(simulation_running),
            )
            .add_observer(on_missile_skill)
            .add_observer(on_missile_volley)
            .add_observer(on_missile_launch);
    }
}

/// Replaces any running volley timer with a fresh one.
pub fn arm_launcher(scheduler: &mut TaskScheduler, config: &MissileLauncherConfig) {
    scheduler.cancel_owned(&TaskOwner::Launcher);
    scheduler.schedule_repeating(
        config.interval,
        TaskKind::MissileVolley,
        Some(TaskOwner::Launcher),
    );
}

fn arm_launcher_on_startup(
    mut scheduler: ResMut<TaskScheduler>,
    config: Res<MissileLauncherConfig>,
) {
    arm_launcher(&mut scheduler, &config);
}

fn on_missile_skill(
    trigger: On<SkillActionApplied>,
    skills: Res<PlayerSkills>,
    config: Res<MissileLauncherConfig>,
    mut launcher: ResMut<MissileLauncher>,
) {
    if !trigger.event().action.is_missile_action() {
        return;
    }

    launcher.update_stacks(
        skills.stack(skill_ids::GUIDED_MISSILE),
        skills.stack(skill_ids::BOUNCING_MISSILE),
        &config,
    );
    info!(
        launch = launcher.launch_stack,
        bounce = launcher.bounce_stack,
        "missile launcher updated"
    );
}

fn on_missile_volley(
    trigger: On<TaskFired>,
    phase: Res<SimulationPhase>,
    launcher: Res<MissileLauncher>,
    config: Res<MissileLauncherConfig>,
    mut scheduler: ResMut<TaskScheduler>,
    players: Query<&Transform, With<Player>>,
    enemies: EnemyQuery,
) {
    if trigger.event().kind != TaskKind::MissileVolley {
        return;
    }
    if !launcher.is_active() || phase.is_selecting() {
        return;
    }
    let Some(player) = player_position(&players) else {
        return;
    };

    let field = EnemyField::from_query(&enemies);
    let launches = launcher.plan_volley(player, &field, &config);
    if launches.is_empty() {
        trace!("no missile targets in range");
        return;
    }

    debug!(
        shots = launches.len(),
        bounce = launcher.bounce_stack,
        "missile volley"
    );
    for launch in launches {
        scheduler.schedule_once(
            launch.delay,
            TaskKind::MissileLaunch {
                origin: launch.origin,
                target: launch.target,
                bounce: launcher.bounce_stack,
            },
            Some(TaskOwner::Launcher),
        );
    }
}

fn on_missile_launch(
    trigger: On<TaskFired>,
    config: Res<MissileConfig>,
    mut pool: ResMut<MissilePool>,
    enemies: EnemyQuery,
) {
    let TaskKind::MissileLaunch {
        origin,
        target,
        bounce,
    } = trigger.event().kind
    else {
        return;
    };

    let field = EnemyField::from_query(&enemies);
    if let Some(slot) = pool.spawn(origin, target, bounce, &field, &config) {
        trace!(slot, ?target, "missile launched");
    }
}

fn advance_missiles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<MissileConfig>,
    mut pool: ResMut<MissilePool>,
    enemies: EnemyQuery,
) {
    if pool.active_count() == 0 {
        return;
    }

    let mut field = EnemyField::from_query(&enemies);
    let mut rng = rand::rng();
    for event in pool.advance(time.delta_secs(), &mut field, &config, &mut rng) {
        match event {
            MissileEvent::Hit {
                slot,
                target,
                position,
                damage,
            } => {
                trace!(slot, ?target, "missile hit");
                commands.trigger(EnemyElectrified { entity: target });
                commands.trigger(DamageEnemy {
                    target,
                    amount: damage,
                    source: DamageSource::Missile,
                });
                commands.trigger(MissileHit { target, position });
            }
            MissileEvent::Grazed { position, .. } => {
                commands.trigger(ImpactFlash { position });
            }
            MissileEvent::Expired {
                slot,
                position,
                reason,
            } => {
                trace!(slot, ?reason, "missile expired");
                commands.trigger(ImpactFlash { position });
            }
        }
    }
}
