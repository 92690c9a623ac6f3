use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery},
    enemy_events::{DamageEnemy, DamageSource, EnemyElectrified, ImpactFlash},
    player_components::{Player, player_position},
    rand::{Rng, seq::IndexedRandom},
    states::SimulationPhase,
    std::{f32::consts::TAU, time::Duration},
    system_schedule::{TaskFired, TaskKind, TaskScheduler},
};

/// Random lightning strikes around the player while the storm buff lasts.
#[derive(Resource, Debug, Clone)]
pub struct StormConfig {
    pub strike_spacing: Duration,
    /// Strikes prefer a live enemy this close to the player.
    pub search_radius: f32,
    pub jitter: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            strike_spacing: Duration::from_millis(100),
            search_radius: 300.0,
            jitter: 30.0,
            min_distance: 100.0,
            max_distance: 300.0,
        }
    }
}

/// Time between storm waves at `level`.
pub fn storm_interval(level: u32) -> Duration {
    let millis = 3000u64.saturating_sub(level as u64 * 500).max(1000);
    Duration::from_millis(millis)
}

pub fn strike_damage(level: u32) -> f32 {
    12.0 + level as f32 * 3.0
}

pub fn strike_radius(level: u32) -> f32 {
    80.0 + level as f32 * 20.0
}

/// Lands near a random enemy close to the player, or on open ground nearby.
pub fn pick_strike_position(
    center: Vec2,
    field: &EnemyField,
    config: &StormConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    let nearby = field.within_radius(center, config.search_radius);
    if let Some(enemy) = nearby.choose(rng) {
        let jitter = Vec2::new(
            rng.random_range(-config.jitter..=config.jitter),
            rng.random_range(-config.jitter..=config.jitter),
        );
        return enemy.position + jitter;
    }

    let angle = rng.random_range(0.0..TAU);
    let distance = rng.random_range(config.min_distance..=config.max_distance);
    center + Vec2::from_angle(angle) * distance
}

pub(crate) fn on_lightning_storm(
    trigger: On<TaskFired>,
    phase: Res<SimulationPhase>,
    config: Res<StormConfig>,
    mut scheduler: ResMut<TaskScheduler>,
    players: Query<&Transform, With<Player>>,
    enemies: EnemyQuery,
) {
    let event = trigger.event();
    let TaskKind::LightningStorm { level } = event.kind else {
        return;
    };
    if !phase.is_running() {
        return;
    }
    let Some(center) = player_position(&players) else {
        return;
    };

    let field = EnemyField::from_query(&enemies);
    let mut rng = rand::rng();
    for index in 0..level {
        let position = pick_strike_position(center, &field, &config, &mut rng);
        // Strikes share the storm's owner so they die with the buff.
        scheduler.schedule_once(
            config.strike_spacing * index,
            TaskKind::LightningStrike {
                position,
                damage: strike_damage(level),
                range: strike_radius(level),
            },
            event.owner.clone(),
        );
    }
    debug!(level, strikes = level, "lightning storm wave");
}

pub(crate) fn on_lightning_strike(
    trigger: On<TaskFired>,
    mut commands: Commands,
    enemies: EnemyQuery,
) {
    let TaskKind::LightningStrike {
        position,
        damage,
        range,
    } = trigger.event().kind
    else {
        return;
    };

    commands.trigger(ImpactFlash { position });
    let field = EnemyField::from_query(&enemies);
    for enemy in field.within_radius(position, range) {
        commands.trigger(EnemyElectrified {
            entity: enemy.entity,
        });
        commands.trigger(DamageEnemy {
            target: enemy.entity,
            amount: damage,
            source: DamageSource::Lightning,
        });
    }
}
