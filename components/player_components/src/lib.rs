use bevy::prelude::*;

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
#[require(Transform, PlayerBody)]
pub struct Player;

/// Movement limits the physics integration reads. Mirrors the `playerSpeed`
/// and `playerDrag` stats.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct PlayerBody {
    pub max_velocity: f32,
    pub drag: f32,
    pub velocity: Vec2,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self {
            max_velocity: 400.0,
            drag: 900.0,
            velocity: Vec2::ZERO,
        }
    }
}

/// Position of the single player entity, if one exists.
pub fn player_position(players: &Query<&Transform, With<Player>>) -> Option<Vec2> {
    players
        .single()
        .ok()
        .map(|transform| transform.translation.truncate())
}
