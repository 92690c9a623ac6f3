mod modifiers;

pub use modifiers::*;

use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Every player stat a modifier can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
pub enum StatKey {
    PlayerSpeed,
    PlayerAcceleration,
    PlayerDrag,
    FireRate,
    BulletSpeed,
    BulletCount,
    FireRange,
    PlayerHealth,
    MaxPlayerHealth,
    DashCooldown,
    LightningWaveCooldown,
    LightningWaveRadius,
    BulletDamage,
    BulletKnockback,
    BulletAccuracy,
    BulletSize,
    ExplosionRadiusMultiplier,
}

impl StatKey {
    pub const ALL: [StatKey; 17] = [
        StatKey::PlayerSpeed,
        StatKey::PlayerAcceleration,
        StatKey::PlayerDrag,
        StatKey::FireRate,
        StatKey::BulletSpeed,
        StatKey::BulletCount,
        StatKey::FireRange,
        StatKey::PlayerHealth,
        StatKey::MaxPlayerHealth,
        StatKey::DashCooldown,
        StatKey::LightningWaveCooldown,
        StatKey::LightningWaveRadius,
        StatKey::BulletDamage,
        StatKey::BulletKnockback,
        StatKey::BulletAccuracy,
        StatKey::BulletSize,
        StatKey::ExplosionRadiusMultiplier,
    ];

    /// Name used in modifier ids and logs.
    pub fn name(self) -> &'static str {
        match self {
            StatKey::PlayerSpeed => "playerSpeed",
            StatKey::PlayerAcceleration => "playerAcceleration",
            StatKey::PlayerDrag => "playerDrag",
            StatKey::FireRate => "fireRate",
            StatKey::BulletSpeed => "bulletSpeed",
            StatKey::BulletCount => "bulletCount",
            StatKey::FireRange => "fireRange",
            StatKey::PlayerHealth => "playerHealth",
            StatKey::MaxPlayerHealth => "maxPlayerHealth",
            StatKey::DashCooldown => "dashCooldown",
            StatKey::LightningWaveCooldown => "lightningWaveCooldown",
            StatKey::LightningWaveRadius => "lightningWaveRadius",
            StatKey::BulletDamage => "bulletDamage",
            StatKey::BulletKnockback => "bulletKnockback",
            StatKey::BulletAccuracy => "bulletAccuracy",
            StatKey::BulletSize => "bulletSize",
            StatKey::ExplosionRadiusMultiplier => "explosionRadiusMultiplier",
        }
    }

    /// Stats mirrored into the player's physics body whenever they change.
    pub fn is_physics_bound(self) -> bool {
        matches!(self, StatKey::PlayerSpeed | StatKey::PlayerDrag)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum ModifierOp {
    #[default]
    Add,
    Multiply,
}

/// Live stat values read by every gameplay system.
///
/// Only [`StatModifiers`] writes derived values here; the base snapshot it
/// captures at run start is never touched again.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct PlayerStats {
    pub player_speed: f32,
    pub player_acceleration: f32,
    pub player_drag: f32,
    /// Milliseconds between shots.
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_count: f32,
    pub fire_range: f32,
    pub player_health: f32,
    pub max_player_health: f32,
    /// Milliseconds.
    pub dash_cooldown: f32,
    /// Milliseconds.
    pub lightning_wave_cooldown: f32,
    pub lightning_wave_radius: f32,
    pub bullet_damage: f32,
    pub bullet_knockback: f32,
    pub bullet_accuracy: f32,
    pub bullet_size: f32,
    pub explosion_radius_multiplier: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            player_speed: 400.0,
            player_acceleration: 1200.0,
            player_drag: 900.0,
            fire_rate: 200.0,
            bullet_speed: 700.0,
            bullet_count: 1.0,
            fire_range: 300.0,
            player_health: 3.0,
            max_player_health: 3.0,
            dash_cooldown: 4000.0,
            lightning_wave_cooldown: 15000.0,
            lightning_wave_radius: 800.0,
            bullet_damage: 1.0,
            bullet_knockback: 1.0,
            bullet_accuracy: 1.0,
            bullet_size: 1.0,
            explosion_radius_multiplier: 1.0,
        }
    }
}

impl PlayerStats {
    pub fn get(&self, key: StatKey) -> f32 {
        match key {
            StatKey::PlayerSpeed => self.player_speed,
            StatKey::PlayerAcceleration => self.player_acceleration,
            StatKey::PlayerDrag => self.player_drag,
            StatKey::FireRate => self.fire_rate,
            StatKey::BulletSpeed => self.bullet_speed,
            StatKey::BulletCount => self.bullet_count,
            StatKey::FireRange => self.fire_range,
            StatKey::PlayerHealth => self.player_health,
            StatKey::MaxPlayerHealth => self.max_player_health,
            StatKey::DashCooldown => self.dash_cooldown,
            StatKey::LightningWaveCooldown => self.lightning_wave_cooldown,
            StatKey::LightningWaveRadius => self.lightning_wave_radius,
            StatKey::BulletDamage => self.bullet_damage,
            StatKey::BulletKnockback => self.bullet_knockback,
            StatKey::BulletAccuracy => self.bullet_accuracy,
            StatKey::BulletSize => self.bullet_size,
            StatKey::ExplosionRadiusMultiplier => self.explosion_radius_multiplier,
        }
    }

    pub fn set(&mut self, key: StatKey, value: f32) {
        let slot = match key {
            StatKey::PlayerSpeed => &mut self.player_speed,
            StatKey::PlayerAcceleration => &mut self.player_acceleration,
            StatKey::PlayerDrag => &mut self.player_drag,
            StatKey::FireRate => &mut self.fire_rate,
            StatKey::BulletSpeed => &mut self.bullet_speed,
            StatKey::BulletCount => &mut self.bullet_count,
            StatKey::FireRange => &mut self.fire_range,
            StatKey::PlayerHealth => &mut self.player_health,
            StatKey::MaxPlayerHealth => &mut self.max_player_health,
            StatKey::DashCooldown => &mut self.dash_cooldown,
            StatKey::LightningWaveCooldown => &mut self.lightning_wave_cooldown,
            StatKey::LightningWaveRadius => &mut self.lightning_wave_radius,
            StatKey::BulletDamage => &mut self.bullet_damage,
            StatKey::BulletKnockback => &mut self.bullet_knockback,
            StatKey::BulletAccuracy => &mut self.bullet_accuracy,
            StatKey::BulletSize => &mut self.bullet_size,
            StatKey::ExplosionRadiusMultiplier => &mut self.explosion_radius_multiplier,
        };
        *slot = value;
    }

    /// Restores one point of health (or `amount`), never above the maximum.
    pub fn heal(&mut self, amount: f32) -> f32 {
        self.player_health = (self.player_health + amount).min(self.max_player_health);
        self.player_health
    }
}
