mod dash;
mod session;
mod storm;

pub use {dash::*, session::*, storm::*};


use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery},
    enemy_events::{BulletHit, DamageEnemy, DamageSource, EnemyElectrified},
    rand::Rng,
    skill_events::MissileHit,
    skill_resources::PlayerSkills,
    skills_assets::{SkillAction, skill_ids},
    states::simulation_running,
    std::time::Duration,
    system_schedule::{GameSchedule, TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

pub struct ChainLightningPlugin;

impl Plugin for ChainLightningPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChainLightning>()
            .init_resource::<ChainLightningConfig>()
            .init_resource::<StormConfig>()
            .register_type::<ChainLightning>()
            .add_systems(
                Update,
                expire_stale_chains
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(simulation_running),
            )
            .add_observer(on_start_chain)
            .add_observer(on_chain_jump)
            .add_observer(proc_electric_chain)
            .add_observer(proc_missile_chain)
            .add_observer(dash::proc_dash_lightning)
            .add_observer(storm::on_lightning_storm)
            .add_observer(storm::on_lightning_strike);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ChainLightningConfig {
    pub max_concurrent: usize,
    pub session_timeout: Duration,
    pub electric_chain_chance: f64,
    pub missile_chain_chance: f64,
    /// Enemies this close to a lightning dash path are struck.
    pub dash_path_radius: f32,
    pub dash_damage: f32,
}

impl Default for ChainLightningConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            session_timeout: Duration::from_secs(10),
            electric_chain_chance: 0.5,
            missile_chain_chance: 0.2,
            dash_path_radius: 85.0,
            dash_damage: 3.0,
        }
    }
}

/// Start a chain on `target`, the bolt coming from `origin`.
#[derive(Event, Debug, Clone, Copy)]
pub struct StartChainLightning {
    pub target: Entity,
    pub origin: Vec2,
    pub config: ChainConfig,
}

fn on_start_chain(
    trigger: On<StartChainLightning>,
    mut commands: Commands,
    config: Res<ChainLightningConfig>,
    mut chains: ResMut<ChainLightning>,
    mut scheduler: ResMut<TaskScheduler>,
    enemies: EnemyQuery,
) {
    let event = trigger.event();
    let mut field = EnemyField::from_query(&enemies);
    let id = match chains.start(
        event.target,
        event.origin,
        event.config,
        &field,
        config.max_concurrent,
    ) {
        Ok(id) => id,
        Err(reason) => {
            debug!(target = ?event.target, ?reason, "chain lightning refused");
            return;
        }
    };

    debug!(chain = id, max_jumps = event.config.max_jumps, "chain lightning started");
    run_strike(&mut commands, &mut chains, &mut scheduler, &mut field, id);
}

fn on_chain_jump(
    trigger: On<TaskFired>,
    mut commands: Commands,
    mut chains: ResMut<ChainLightning>,
    mut scheduler: ResMut<TaskScheduler>,
    enemies: EnemyQuery,
) {
    let TaskKind::ChainJump { session } = trigger.event().kind else {
        return;
    };
    let mut field = EnemyField::from_query(&enemies);
    run_strike(&mut commands, &mut chains, &mut scheduler, &mut field, session);
}

fn run_strike(
    commands: &mut Commands,
    chains: &mut ChainLightning,
    scheduler: &mut TaskScheduler,
    field: &mut EnemyField,
    id: u32,
) {
    let Some(strike) = chains.strike(id, field) else {
        debug!(chain = id, "chain target gone, chain ended");
        scheduler.cancel_owned(&TaskOwner::Chain(id));
        return;
    };

    trace!(chain = id, target = ?strike.target, damage = strike.damage, "chain strike");
    commands.trigger(EnemyElectrified {
        entity: strike.target,
    });
    commands.trigger(DamageEnemy {
        target: strike.target,
        amount: strike.damage,
        source: DamageSource::Lightning,
    });

    match strike.next_in {
        Some(delay) => {
            scheduler.schedule_once(
                delay,
                TaskKind::ChainJump { session: id },
                Some(TaskOwner::Chain(id)),
            );
        }
        None => debug!(chain = id, "chain lightning finished"),
    }
}

fn expire_stale_chains(
    time: Res<Time>,
    config: Res<ChainLightningConfig>,
    mut chains: ResMut<ChainLightning>,
    mut scheduler: ResMut<TaskScheduler>,
) {
    for id in chains.expire(time.delta(), config.session_timeout) {
        warn!(chain = id, "chain lightning timed out");
        scheduler.cancel_owned(&TaskOwner::Chain(id));
    }
}

fn proc_electric_chain(
    trigger: On<BulletHit>,
    mut commands: Commands,
    skills: Res<PlayerSkills>,
    config: Res<ChainLightningConfig>,
) {
    if !skills.has_behavior(SkillAction::ElectricChainAttack.tag()) {
        return;
    }
    if !rand::rng().random_bool(config.electric_chain_chance) {
        return;
    }

    let event = trigger.event();
    commands.trigger(StartChainLightning {
        target: event.enemy,
        origin: event.position,
        config: ChainConfig::electric_chain(skills.stack(skill_ids::ELECTRIC_CHAIN)),
    });
}

fn proc_missile_chain(
    trigger: On<MissileHit>,
    mut commands: Commands,
    skills: Res<PlayerSkills>,
    config: Res<ChainLightningConfig>,
) {
    if !skills.has_behavior(SkillAction::ActivateMissileChainLightning.tag()) {
        return;
    }
    if !rand::rng().random_bool(config.missile_chain_chance) {
        return;
    }

    let event = trigger.event();
    commands.trigger(StartChainLightning {
        target: event.target,
        origin: event.position,
        config: ChainConfig::missile_chain(skills.stack(skill_ids::MISSILE_CHAIN_LIGHTNING)),
    });
}
