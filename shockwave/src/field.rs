use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemyQuery},
    enemy_events::{DamageEnemy, DamageSource, EnemyElectrified},
    player_components::Player,
    skill_events::SkillActionApplied,
    skills_assets::SkillAction,
    std::time::Duration,
    system_schedule::{TaskFired, TaskKind, TaskOwner, TaskScheduler},
};

#[derive(Resource, Debug, Clone)]
pub struct ElectricFieldConfig {
    pub base_radius: f32,
    pub radius_per_stack: f32,
    pub damage: f32,
    pub tick: Duration,
    pub max_stacks: u32,
}

impl Default for ElectricFieldConfig {
    fn default() -> Self {
        Self {
            base_radius: 80.0,
            radius_per_stack: 30.0,
            damage: 12.0,
            tick: Duration::from_millis(500),
            max_stacks: 3,
        }
    }
}

/// Damaging aura around the player.
#[derive(Component, Reflect, Default, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ElectricField {
    pub stacks: u32,
}

impl ElectricField {
    pub fn radius(&self, config: &ElectricFieldConfig) -> f32 {
        config.base_radius + self.stacks.saturating_sub(1) as f32 * config.radius_per_stack
    }
}

pub(crate) fn on_field_activated(
    trigger: On<SkillActionApplied>,
    mut commands: Commands,
    mut scheduler: ResMut<TaskScheduler>,
    config: Res<ElectricFieldConfig>,
    players: Query<Entity, With<Player>>,
) {
    let event = trigger.event();
    if event.action != SkillAction::ActivateElectricField {
        return;
    }
    let Ok(player) = players.single() else {
        return;
    };

    let field = ElectricField {
        stacks: event.stacks.clamp(1, config.max_stacks),
    };
    info!(stacks = field.stacks, radius = field.radius(&config), "electric field active");
    commands.entity(player).insert(field);

    if scheduler.owned_by(&TaskOwner::ElectricField).next().is_none() {
        scheduler.schedule_repeating(
            config.tick,
            TaskKind::ElectricFieldPulse,
            Some(TaskOwner::ElectricField),
        );
    }
}

pub(crate) fn on_field_pulse(
    trigger: On<TaskFired>,
    mut commands: Commands,
    config: Res<ElectricFieldConfig>,
    players: Query<(&Transform, &ElectricField), With<Player>>,
    enemies: EnemyQuery,
) {
    if trigger.event().kind != TaskKind::ElectricFieldPulse {
        return;
    }
    let Ok((transform, field)) = players.single() else {
        return;
    };

    let center = transform.translation.truncate();
    let snapshot = EnemyField::from_query(&enemies);
    for enemy in snapshot.within_radius(center, field.radius(&config)) {
        commands.trigger(EnemyElectrified {
            entity: enemy.entity,
        });
        commands.trigger(DamageEnemy {
            target: enemy.entity,
            amount: config.damage,
            source: DamageSource::ElectricField,
        });
    }
}
