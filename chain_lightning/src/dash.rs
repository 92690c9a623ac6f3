use {
    crate::{ChainConfig, ChainLightningConfig, StartChainLightning},
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery, EnemySnapshot},
    enemy_events::{DamageEnemy, DamageSource, EnemyElectrified},
    skill_events::DashPerformed,
    skill_resources::PlayerSkills,
};

/// Behavior tag granted by the `dash_lightning` card.
pub const DASH_ELECTRIFY: &str = "dash_electrify";

const PATH_SEGMENTS: u32 = 12;

/// Live enemies within `radius` of the dash path, each paired with the first
/// path point that reached it.
pub fn enemies_along_path(
    field: &EnemyField,
    from: Vec2,
    to: Vec2,
    radius: f32,
) -> Vec<(EnemySnapshot, Vec2)> {
    let mut hit: Vec<(EnemySnapshot, Vec2)> = Vec::new();
    for step in 0..=PATH_SEGMENTS {
        let point = from.lerp(to, step as f32 / PATH_SEGMENTS as f32);
        for enemy in field.within_radius(point, radius) {
            if hit.iter().all(|(seen, _)| seen.entity != enemy.entity) {
                hit.push((enemy, point));
            }
        }
    }
    hit
}

pub(crate) fn proc_dash_lightning(
    trigger: On<DashPerformed>,
    mut commands: Commands,
    skills: Res<PlayerSkills>,
    config: Res<ChainLightningConfig>,
    enemies: EnemyQuery,
) {
    if !skills.has_behavior(DASH_ELECTRIFY) {
        return;
    }

    let event = trigger.event();
    let field = EnemyField::from_query(&enemies);
    let struck = enemies_along_path(&field, event.from, event.to, config.dash_path_radius);
    debug!(enemies = struck.len(), "lightning dash");

    for (enemy, point) in struck {
        commands.trigger(EnemyElectrified {
            entity: enemy.entity,
        });
        commands.trigger(DamageEnemy {
            target: enemy.entity,
            amount: config.dash_damage,
            source: DamageSource::Lightning,
        });
        commands.trigger(StartChainLightning {
            target: enemy.entity,
            origin: point,
            config: ChainConfig::dash(config.dash_damage),
        });
    }
}
