use {
    bevy::prelude::*,
    enemy_components::EnemyField,
    std::{f32::consts::TAU, time::Duration},
};

#[derive(Resource, Debug, Clone)]
pub struct MissileLauncherConfig {
    pub interval: Duration,
    pub search_radius: f32,
    pub max_launch_stack: u32,
    pub max_bounce_stack: u32,
    pub pool_capacity: usize,
    pub max_active: usize,
    /// Delay added per target within one volley.
    pub stagger: Duration,
    /// Gap between the two shots fired at the same target.
    pub pair_delay: Duration,
    pub ring_radius: f32,
    /// Sideways spread of the paired shots.
    pub pair_offset: f32,
}

impl Default for MissileLauncherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            search_radius: 400.0,
            max_launch_stack: 10,
            max_bounce_stack: 3,
            pool_capacity: 100,
            max_active: 60,
            stagger: Duration::from_millis(50),
            pair_delay: Duration::from_millis(100),
            ring_radius: 20.0,
            pair_offset: 12.5,
        }
    }
}

/// Stack levels driving the periodic volley. Derived from the player's skill
/// stacks every time a missile skill is applied.
#[derive(Resource, Reflect, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct MissileLauncher {
    pub launch_stack: u32,
    pub bounce_stack: u32,
}

/// One missile the volley wants in the air after `delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedLaunch {
    pub origin: Vec2,
    pub target: Entity,
    pub delay: Duration,
}

impl MissileLauncher {
    pub fn update_stacks(&mut self, launch: u32, bounce: u32, config: &MissileLauncherConfig) {
        self.launch_stack = launch.min(config.max_launch_stack);
        self.bounce_stack = bounce.min(config.max_bounce_stack);
    }

    pub fn is_active(&self) -> bool {
        self.launch_stack > 0
    }

    /// Two staggered shots at each of the nearest `launch_stack` enemies in
    /// range, fired from a ring around the player.
    pub fn plan_volley(
        &self,
        player: Vec2,
        field: &EnemyField,
        config: &MissileLauncherConfig,
    ) -> Vec<PlannedLaunch> {
        let mut targets = field.within_radius(player, config.search_radius);
        targets.sort_by(|a, b| {
            a.position
                .distance_squared(player)
                .total_cmp(&b.position.distance_squared(player))
        });

        let count = (self.launch_stack as usize).min(targets.len());
        let mut launches = Vec::with_capacity(count * 2);
        for (i, target) in targets.iter().take(count).enumerate() {
            let angle = i as f32 / count as f32 * TAU;
            let origin = player + Vec2::from_angle(angle) * config.ring_radius;
            let side = (target.position - origin).normalize_or(Vec2::X).perp() * config.pair_offset;
            let delay = config.stagger * i as u32;

            launches.push(PlannedLaunch {
                origin: origin + side,
                target: target.entity,
                delay,
            });
            launches.push(PlannedLaunch {
                origin: origin - side,
                target: target.entity,
                delay: delay + config.pair_delay,
            });
        }
        launches
    }
}
