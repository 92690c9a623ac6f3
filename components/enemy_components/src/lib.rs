mod field;

pub use field::*;

use bevy::prelude::*;

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
#[require(Transform, Health, EnemyKind)]
pub struct Enemy;

#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Enemy archetype. Drives kill score, spawn health and how attractive the
/// enemy is as a chain-lightning jump target.
#[derive(Component, Reflect, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[reflect(Component, Default)]
pub enum EnemyKind {
    #[default]
    Drone,
    Striker,
    Bruiser,
    Pentagon,
    Elite,
    StarElite,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Drone,
        EnemyKind::Striker,
        EnemyKind::Bruiser,
        EnemyKind::Pentagon,
        EnemyKind::Elite,
        EnemyKind::StarElite,
    ];

    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Drone => 10,
            EnemyKind::Striker => 20,
            EnemyKind::Bruiser => 30,
            EnemyKind::Pentagon => 100,
            EnemyKind::Elite => 500,
            EnemyKind::StarElite => 400,
        }
    }

    pub fn base_health(self) -> f32 {
        match self {
            EnemyKind::Drone | EnemyKind::Striker | EnemyKind::Bruiser => 3.0,
            EnemyKind::Pentagon => 8.0,
            EnemyKind::Elite => 6.0,
            EnemyKind::StarElite => 12.0,
        }
    }

    /// Flat bonus added to a chain-lightning candidate's score.
    pub fn chain_priority(self) -> f32 {
        match self {
            EnemyKind::StarElite => 40.0,
            EnemyKind::Elite => 30.0,
            EnemyKind::Pentagon => 20.0,
            EnemyKind::Drone | EnemyKind::Striker | EnemyKind::Bruiser => 10.0,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Drone | EnemyKind::Striker | EnemyKind::Bruiser => 24.0,
            EnemyKind::Pentagon => 36.0,
            EnemyKind::Elite | EnemyKind::StarElite => 48.0,
        }
    }
}

/// Velocity impulse applied by area attacks; decays every frame.
#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct Knockback(pub Vec2);
