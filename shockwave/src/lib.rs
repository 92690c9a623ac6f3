mod field;

pub use field::*;

#[cfg(test)]
mod tests;

use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery, Knockback},
    enemy_events::{DamageEnemy, DamageSource, ImpactFlash},
    player_components::{Player, player_position},
    skill_events::{PerformShockwave, PickupCollected, ShockwaveSource},
    skill_resources::PlayerSkills,
    stat_resources::PlayerStats,
    states::{SimulationPhase, simulation_running},
    std::time::Duration,
    system_schedule::{GameSchedule, TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

pub const DOUBLE_SHOCKWAVE: &str = "double_shockwave";

pub struct ShockwavePlugin;

impl Plugin for ShockwavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShockwaveConfig>()
            .init_resource::<ShockwaveState>()
            .init_resource::<ElectricFieldConfig>()
            .register_type::<ShockwaveState>()
            .register_type::<ElectricField>()
            .add_systems(
                Update,
                tick_cooldown
                    .in_set(GameSchedule::FrameStart)
                    .run_if(simulation_running),
            )
            .add_observer(on_perform_shockwave)
            .add_observer(on_shockwave_task)
            .add_observer(on_pickup_collected)
            .add_observer(field::on_field_activated)
            .add_observer(field::on_field_pulse);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ShockwaveConfig {
    pub damage: f32,
    pub knockback: f32,
    pub echo_delay: Duration,
    pub echo_scale: f32,
    /// How long one pulse blocks the next.
    pub active_window: Duration,
    pub pickup_cooldown_reduction: Duration,
    /// Pickups never shorten the remaining cooldown below this.
    pub cooldown_floor: Duration,
}

impl Default for ShockwaveConfig {
    fn default() -> Self {
        Self {
            damage: 0.5,
            knockback: 1400.0,
            echo_delay: Duration::from_secs(1),
            echo_scale: 1.3,
            active_window: Duration::from_millis(300),
            pickup_cooldown_reduction: Duration::from_millis(100),
            cooldown_floor: Duration::from_millis(1000),
        }
    }
}

/// At most one pulse runs at a time; a second request inside the window is dropped.
#[derive(Resource, Reflect, Default, Debug, Clone)]
#[reflect(Resource)]
pub struct ShockwaveState {
    pub active: bool,
    pub echo_pending: bool,
    /// Time left before a manual cast is allowed again.
    pub cooldown: Duration,
}

impl ShockwaveState {
    pub fn is_ready(&self) -> bool {
        self.cooldown.is_zero()
    }

    /// Shortens the remaining cooldown without pushing it under `floor`.
    pub fn reduce_cooldown(&mut self, amount: Duration, floor: Duration) {
        if self.cooldown <= floor {
            return;
        }
        self.cooldown = self.cooldown.saturating_sub(amount).max(floor);
    }
}

fn tick_cooldown(time: Res<Time>, mut state: ResMut<ShockwaveState>) {
    state.cooldown = state.cooldown.saturating_sub(time.delta());
}

#[allow(clippy::too_many_arguments)]
fn on_perform_shockwave(
    trigger: On<PerformShockwave>,
    mut commands: Commands,
    mut state: ResMut<ShockwaveState>,
    mut scheduler: ResMut<TaskScheduler>,
    config: Res<ShockwaveConfig>,
    stats: Res<PlayerStats>,
    skills: Res<PlayerSkills>,
    players: Query<&Transform, With<Player>>,
    enemies: EnemyQuery,
) {
    let event = trigger.event();
    if state.active {
        debug!(source = ?event.source, "shockwave already running, request dropped");
        return;
    }
    if event.source == ShockwaveSource::Manual && !state.is_ready() {
        debug!(remaining = ?state.cooldown, "shockwave on cooldown");
        return;
    }
    let Some(center) = player_position(&players) else {
        return;
    };

    state.active = true;
    scheduler.schedule_once(
        config.active_window,
        TaskKind::ShockwaveWindowEnd,
        Some(TaskOwner::Shockwave),
    );
    if event.source == ShockwaveSource::Manual {
        state.cooldown = Duration::from_secs_f32(stats.lightning_wave_cooldown / 1000.0);
    }

    let radius = stats.lightning_wave_radius * event.scale;
    let field = EnemyField::from_query(&enemies);
    let hits = field.within_radius(center, radius);
    debug!(source = ?event.source, radius, hits = hits.len(), "shockwave");

    commands.trigger(ImpactFlash { position: center });
    for enemy in hits {
        let direction = (enemy.position - center).normalize_or(Vec2::X);
        commands
            .entity(enemy.entity)
            .insert(Knockback(direction * config.knockback));
        commands.trigger(DamageEnemy {
            target: enemy.entity,
            amount: config.damage,
            source: DamageSource::Shockwave,
        });
    }

    if event.source != ShockwaveSource::Echo
        && skills.has_behavior(DOUBLE_SHOCKWAVE)
        && !state.echo_pending
    {
        state.echo_pending = true;
        scheduler.schedule_once(
            config.echo_delay,
            TaskKind::EchoShockwave {
                scale: config.echo_scale,
            },
            Some(TaskOwner::Shockwave),
        );
    }
}

fn on_shockwave_task(
    trigger: On<TaskFired>,
    mut commands: Commands,
    mut state: ResMut<ShockwaveState>,
    phase: Res<SimulationPhase>,
) {
    match trigger.event().kind {
        TaskKind::ShockwaveWindowEnd => state.active = false,
        TaskKind::EchoShockwave { scale } => {
            state.echo_pending = false;
            commands.trigger(PerformShockwave {
                scale,
                source: ShockwaveSource::Echo,
            });
        }
        TaskKind::AutoShockwave if phase.is_running() => {
            commands.trigger(PerformShockwave::new(ShockwaveSource::Auto));
        }
        _ => {}
    }
}

fn on_pickup_collected(
    _trigger: On<PickupCollected>,
    mut state: ResMut<ShockwaveState>,
    config: Res<ShockwaveConfig>,
) {
    state.reduce_cooldown(config.pickup_cooldown_reduction, config.cooldown_floor);
}
