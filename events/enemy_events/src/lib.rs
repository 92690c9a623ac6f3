use {bevy::prelude::*, enemy_components::EnemyKind};

pub struct EnemyEventsPlugin;

impl Plugin for EnemyEventsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EnemyKilled>()
            .register_type::<BulletHit>()
            .register_type::<DamageSource>();
    }
}

/// Which system dealt the damage; picks the damage-number color.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamageSource {
    #[default]
    Missile,
    Lightning,
    Shockwave,
    ElectricField,
}

/// Request to damage one enemy. The damage observer is the only place enemy
/// health goes down, so kill rewards are granted exactly once.
#[derive(Event, Debug, Clone)]
pub struct DamageEnemy {
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
}

#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Default)]
pub struct EnemyKilled {
    pub entity: Entity,
    pub position: Vec2,
    pub kind: EnemyKind,
}

impl Default for EnemyKilled {
    fn default() -> Self {
        Self {
            entity: Entity::PLACEHOLDER,
            position: Vec2::ZERO,
            kind: EnemyKind::default(),
        }
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ScoreAwarded {
    pub points: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PickupSpawnRequested {
    pub position: Vec2,
}

/// Visual hook: floating damage number.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageNumberShown {
    pub position: Vec2,
    pub amount: f32,
    pub source: DamageSource,
}

/// Visual hook: electric crackle on an enemy.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyElectrified {
    pub entity: Entity,
}

/// Visual hook: impact flash with no gameplay effect.
#[derive(Event, Debug, Clone, Copy)]
pub struct ImpactFlash {
    pub position: Vec2,
}

/// A regular bullet connected with an enemy. Hit detection lives outside this
/// workspace; on-hit skills listen for it.
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Default)]
pub struct BulletHit {
    pub enemy: Entity,
    pub position: Vec2,
}

impl Default for BulletHit {
    fn default() -> Self {
        Self {
            enemy: Entity::PLACEHOLDER,
            position: Vec2::ZERO,
        }
    }
}
