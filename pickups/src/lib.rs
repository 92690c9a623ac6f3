use {
    bevy::prelude::*,
    enemy_events::PickupSpawnRequested,
    player_components::{Player, player_position},
    rand::Rng,
    skill_events::{CollectAllPickups, LevelUp, PickupCollected},
    skill_resources::Experience,
    states::simulation_running,
    std::time::Duration,
    system_schedule::GameSchedule,
};

pub struct PickupsPlugin;

impl Plugin for PickupsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickupConfig>()
            .init_resource::<Experience>()
            .register_type::<EnergyOrb>()
            .register_type::<Attraction>()
            .register_type::<Experience>()
            .add_systems(
                Update,
                (collect_nearby_orbs, advance_attraction)
                    .in_set(GameSchedule::Effect)
                    .run_if(simulation_running),
            )
            .add_observer(spawn_energy_orb)
            .add_observer(attract_all_orbs);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PickupConfig {
    pub experience: u32,
    pub collect_radius: f32,
    /// Delay added per orb when everything is pulled at once.
    pub attraction_stagger: Duration,
    pub attraction_duration: Duration,
    /// Max offset of the curve's control point from the midpoint, per axis.
    pub control_jitter: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            experience: 20,
            collect_radius: 30.0,
            attraction_stagger: Duration::from_millis(50),
            attraction_duration: Duration::from_millis(600),
            control_jitter: 50.0,
        }
    }
}

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
#[require(Transform)]
pub struct EnergyOrb;

/// Curved flight toward the player. The orb is collected on arrival.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct Attraction {
    pub start: Vec2,
    pub control: Vec2,
    pub elapsed: Duration,
    pub delay: Duration,
    pub duration: Duration,
}

impl Attraction {
    /// Fraction of the flight completed, 0 while still waiting out the delay.
    pub fn progress(&self) -> f32 {
        let flown = self.elapsed.saturating_sub(self.delay);
        if self.duration.is_zero() {
            return 1.0;
        }
        (flown.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn position(&self, end: Vec2) -> Vec2 {
        quadratic_bezier(self.start, self.control, end, self.progress())
    }

    pub fn arrived(&self) -> bool {
        self.progress() >= 1.0
    }
}

pub fn quadratic_bezier(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

fn spawn_energy_orb(trigger: On<PickupSpawnRequested>, mut commands: Commands) {
    let position = trigger.event().position;
    commands.spawn((EnergyOrb, Transform::from_translation(position.extend(0.0))));
}

fn attract_all_orbs(
    _trigger: On<CollectAllPickups>,
    mut commands: Commands,
    config: Res<PickupConfig>,
    players: Query<&Transform, With<Player>>,
    orbs: Query<(Entity, &Transform), (With<EnergyOrb>, Without<Attraction>)>,
) {
    let Some(player) = player_position(&players) else {
        return;
    };

    let mut rng = rand::rng();
    let mut count = 0;
    for (index, (entity, transform)) in orbs.iter().enumerate() {
        let start = transform.translation.truncate();
        let jitter = Vec2::new(
            rng.random_range(-config.control_jitter..=config.control_jitter),
            rng.random_range(-config.control_jitter..=config.control_jitter),
        );
        commands.entity(entity).insert(Attraction {
            start,
            control: start.midpoint(player) + jitter,
            elapsed: Duration::ZERO,
            delay: config.attraction_stagger * index as u32,
            duration: config.attraction_duration,
        });
        count += 1;
    }
    info!(orbs = count, "pulling every energy orb to the player");
}

/// Grants experience for one orb and reports the pickup.
pub fn collect_pickup(
    commands: &mut Commands,
    orb: Entity,
    position: Vec2,
    experience: &mut Experience,
    config: &PickupConfig,
) {
    commands.entity(orb).despawn();
    commands.trigger(PickupCollected { position });
    if experience.gain(config.experience) {
        commands.trigger(LevelUp);
    }
}

fn collect_nearby_orbs(
    mut commands: Commands,
    config: Res<PickupConfig>,
    mut experience: ResMut<Experience>,
    players: Query<&Transform, With<Player>>,
    orbs: Query<(Entity, &Transform), (With<EnergyOrb>, Without<Attraction>)>,
) {
    let Some(player) = player_position(&players) else {
        return;
    };

    for (entity, transform) in orbs.iter() {
        let position = transform.translation.truncate();
        if position.distance(player) <= config.collect_radius {
            collect_pickup(&mut commands, entity, position, &mut experience, &config);
        }
    }
}

fn advance_attraction(
    time: Res<Time>,
    mut commands: Commands,
    config: Res<PickupConfig>,
    mut experience: ResMut<Experience>,
    players: Query<&Transform, (With<Player>, Without<EnergyOrb>)>,
    mut orbs: Query<(Entity, &mut Transform, &mut Attraction), With<EnergyOrb>>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let player = player.translation.truncate();

    for (entity, mut transform, mut attraction) in orbs.iter_mut() {
        attraction.elapsed += time.delta();
        let position = attraction.position(player);
        transform.translation = position.extend(transform.translation.z);

        if attraction.arrived() {
            collect_pickup(&mut commands, entity, position, &mut experience, &config);
        }
    }
}
