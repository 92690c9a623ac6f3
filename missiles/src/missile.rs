use {
    bevy::prelude::*,
    enemy_components::{EnemyField, EnemySnapshot},
    rand::Rng,
    std::{
        collections::HashSet,
        f32::consts::{PI, TAU},
        time::Duration,
    },
};

/// Flight tuning shared by every guided missile.
#[derive(Resource, Debug, Clone)]
pub struct MissileConfig {
    pub speed_min: f32,
    pub speed_max: f32,
    pub launch_speed: f32,
    /// Radians per second.
    pub turn_rate: f32,
    /// Fraction of the gap to the desired speed closed each tick.
    pub easing: f32,
    pub wobble_amplitude: f32,
    pub wobble_frequency: f32,
    pub bounce_radius: f32,
    /// Added to the launcher's bounce stack on every launch.
    pub base_bounce_bonus: u32,
    pub hit_cooldown: Duration,
    pub launch_phase: Duration,
    pub max_lifetime: Duration,
    pub damage: f32,
    pub bounce_back_force: f32,
    pub bounce_recovery: Duration,
    pub wandering_timeout: Duration,
    pub lemniscate_scale: f32,
    pub rescan_interval: Duration,
    pub detection_radius: f32,
    pub confirmation_delay: Duration,
    pub contact_radius: f32,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            speed_min: 180.0,
            speed_max: 420.0,
            launch_speed: 260.0,
            turn_rate: 8.0,
            easing: 0.15,
            wobble_amplitude: 45.0,
            wobble_frequency: 8.0,
            bounce_radius: 220.0,
            base_bounce_bonus: 2,
            hit_cooldown: Duration::from_millis(84),
            launch_phase: Duration::from_millis(200),
            max_lifetime: Duration::from_secs(6),
            damage: 3.0,
            bounce_back_force: 2.5,
            bounce_recovery: Duration::from_millis(400),
            wandering_timeout: Duration::from_secs(4),
            lemniscate_scale: 250.0,
            rescan_interval: Duration::from_millis(500),
            detection_radius: 300.0,
            confirmation_delay: Duration::from_millis(500),
            contact_radius: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissileState {
    /// Free pool slot.
    #[default]
    Inactive,
    /// Straight flight at the target before homing engages.
    Launching,
    Seeking,
    /// Riding the recoil of a hit until the hit cooldown ends.
    Bouncing,
    /// No target; patrolling a figure-eight until something shows up.
    Wandering,
}

/// Result of advancing one missile by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissileStep {
    Idle,
    Flying,
    /// The missile must go back to the pool.
    Expired(ExpireReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireReason {
    Lifetime,
    WanderTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissileContact {
    /// Not armed, or a non-target already flashed.
    Ignored,
    /// Touched something that is not the target. Visual only.
    Grazed,
    /// Struck the target: deal damage.
    Hit,
}

#[derive(Debug, Clone, Default)]
struct Wander {
    center: Vec2,
    phase: f32,
    elapsed: f32,
    since_scan: f32,
    /// Enemy seen on a rescan and how long it has stayed in sight.
    sighting: Option<(Entity, f32)>,
}

/// One homing projectile.
///
/// Holds no entity handles beyond enemy ids; every tick re-reads positions
/// from the [`EnemyField`] snapshot and treats a missing id as a dead target.
#[derive(Debug, Clone, Default)]
pub struct GuidedMissile {
    state: MissileState,
    target: Option<Entity>,
    position: Vec2,
    velocity: Vec2,
    bounce_left: i32,
    visited: HashSet<Entity>,
    current_speed: f32,
    lifetime: f32,
    wobble_time: f32,
    hit_cooldown: f32,
    launch_elapsed: f32,
    recovery: Option<f32>,
    last_graze: Option<Entity>,
    wander: Wander,
}

impl GuidedMissile {
    /// Arms the missile at `origin` aimed at `target`. Refused when the target
    /// is not alive or the missile is already in flight.
    pub fn launch(
        &mut self,
        origin: Vec2,
        target: Entity,
        bounce: u32,
        field: &EnemyField,
        config: &MissileConfig,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(enemy) = field.get(target) else {
            return false;
        };

        *self = Self {
            state: MissileState::Launching,
            target: Some(target),
            position: origin,
            bounce_left: (bounce + config.base_bounce_bonus) as i32,
            current_speed: config.launch_speed,
            ..default()
        };
        self.velocity = (enemy.position - origin).normalize_or(Vec2::X) * config.launch_speed;
        true
    }

    pub fn update(
        &mut self,
        dt: f32,
        field: &EnemyField,
        config: &MissileConfig,
        rng: &mut impl Rng,
    ) -> MissileStep {
        if !self.is_active() {
            return MissileStep::Idle;
        }

        self.lifetime += dt;
        self.wobble_time += dt;
        self.hit_cooldown = (self.hit_cooldown - dt).max(0.0);
        self.tick_recovery(dt, config);

        if self.lifetime > config.max_lifetime.as_secs_f32() {
            return MissileStep::Expired(ExpireReason::Lifetime);
        }

        let target = self.target.and_then(|entity| field.get(entity)).copied();
        if self.state != MissileState::Wandering && target.is_none() {
            trace!(state = ?self.state, "missile lost its target");
            self.enter_wandering(rng);
            self.integrate(dt);
            return MissileStep::Flying;
        }

        match (self.state, target) {
            (MissileState::Launching, Some(target)) => {
                self.velocity = (target.position - self.position).normalize_or(self.heading())
                    * self.current_speed;
                self.launch_elapsed += dt;
                if self.launch_elapsed >= config.launch_phase.as_secs_f32() {
                    self.state = MissileState::Seeking;
                }
            }
            (MissileState::Seeking, Some(target)) => self.steer(target.position, dt, config),
            (MissileState::Bouncing, _) => {
                if self.hit_cooldown <= 0.0 {
                    self.state = MissileState::Seeking;
                }
            }
            (MissileState::Wandering, _) => {
                if self.wander(dt, field, config, rng) {
                    return MissileStep::Expired(ExpireReason::WanderTimeout);
                }
            }
            _ => {}
        }

        self.integrate(dt);
        MissileStep::Flying
    }

    /// Resolves touching `enemy`. Only the current target takes damage, and
    /// only while seeking with the hit cooldown elapsed.
    pub fn on_contact(
        &mut self,
        enemy: &EnemySnapshot,
        field: &EnemyField,
        config: &MissileConfig,
        rng: &mut impl Rng,
    ) -> MissileContact {
        if self.state != MissileState::Seeking || self.hit_cooldown > 0.0 {
            return MissileContact::Ignored;
        }
        if self.target != Some(enemy.entity) {
            if self.last_graze == Some(enemy.entity) {
                return MissileContact::Ignored;
            }
            self.last_graze = Some(enemy.entity);
            return MissileContact::Grazed;
        }

        self.bounce_left -= 1;
        self.visited.insert(enemy.entity);
        self.hit_cooldown = config.hit_cooldown.as_secs_f32();
        self.wander.elapsed = 0.0;
        self.state = MissileState::Bouncing;
        self.bounce_back(enemy.position, config);

        if self.bounce_left < 0 {
            trace!("missile out of bounces");
            self.enter_wandering(rng);
            return MissileContact::Hit;
        }

        match self.find_bounce_target(enemy, field, config) {
            Some(next) => self.target = Some(next),
            None => {
                trace!("no bounce target in range");
                self.enter_wandering(rng);
            }
        }
        MissileContact::Hit
    }

    /// Nearest enemy around the struck one, preferring ones this missile has
    /// not hit yet.
    pub fn find_bounce_target(
        &self,
        struck: &EnemySnapshot,
        field: &EnemyField,
        config: &MissileConfig,
    ) -> Option<Entity> {
        let other = |enemy: &EnemySnapshot| enemy.entity != struck.entity;
        field
            .nearest(struck.position, config.bounce_radius, |enemy| {
                other(enemy) && !self.visited.contains(&enemy.entity)
            })
            .or_else(|| field.nearest(struck.position, config.bounce_radius, other))
            .map(|enemy| enemy.entity)
    }

    fn steer(&mut self, target: Vec2, dt: f32, config: &MissileConfig) {
        let to_target = target - self.position;
        let perpendicular = to_target.perp().normalize_or_zero();
        let wobble = (self.wobble_time * config.wobble_frequency).sin() * config.wobble_amplitude;
        let aim = target + perpendicular * wobble;

        let desired = (aim - self.position).to_angle();
        let heading = rotate_towards(self.heading().to_angle(), desired, config.turn_rate * dt);

        let alignment = wrap_angle(desired - heading).cos();
        let target_speed = lerp(config.speed_min, config.speed_max, (alignment + 1.0) * 0.5);
        self.current_speed = lerp(self.current_speed, target_speed, config.easing);
        self.velocity = Vec2::from_angle(heading) * self.current_speed;
    }

    fn bounce_back(&mut self, struck: Vec2, config: &MissileConfig) {
        let away = (self.position - struck).normalize_or(-self.heading());
        self.current_speed = config.speed_max * (config.bounce_back_force + 0.5);
        self.velocity = away * self.current_speed;
        self.recovery = Some(config.bounce_recovery.as_secs_f32());
    }

    fn tick_recovery(&mut self, dt: f32, config: &MissileConfig) {
        let Some(left) = self.recovery.as_mut() else {
            return;
        };
        *left -= dt;
        if *left > 0.0 {
            return;
        }
        self.recovery = None;
        if matches!(self.state, MissileState::Seeking | MissileState::Bouncing) {
            self.current_speed = config.speed_min;
        }
    }

    fn enter_wandering(&mut self, rng: &mut impl Rng) {
        self.state = MissileState::Wandering;
        self.target = None;
        self.wander = Wander {
            center: self.position,
            phase: rng.random_range(0.0..TAU),
            ..default()
        };
    }

    /// Returns `true` once the wandering timeout is reached.
    fn wander(
        &mut self,
        dt: f32,
        field: &EnemyField,
        config: &MissileConfig,
        rng: &mut impl Rng,
    ) -> bool {
        self.wander.elapsed += dt;
        if self.wander.elapsed >= config.wandering_timeout.as_secs_f32() {
            return true;
        }
        if self.reacquire(dt, field, config) {
            return false;
        }

        self.wander.phase += dt * 2.0;
        let point = self.wander.center + lemniscate(config.lemniscate_scale, self.wander.phase);
        let desired = (point - self.position).to_angle();
        let heading = rotate_towards(
            self.heading().to_angle(),
            desired,
            config.turn_rate * 0.9 * dt,
        );
        let speed = config.speed_min * 0.9 + (self.wander.phase * 0.5).sin() * 30.0;
        self.velocity = Vec2::from_angle(heading) * speed;

        if self.position.distance(self.wander.center) > config.lemniscate_scale * 2.5 {
            self.wander.center = self.position
                + Vec2::new(rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0));
        }
        false
    }

    /// Rescans on a fixed interval and commits to an enemy once it has stayed
    /// in sight for the confirmation delay. A missile without bounces left
    /// never reacquires.
    fn reacquire(&mut self, dt: f32, field: &EnemyField, config: &MissileConfig) -> bool {
        if self.bounce_left < 0 {
            return false;
        }

        if let Some((entity, held)) = self.wander.sighting {
            self.wander.sighting = field.is_alive(entity).then_some((entity, held + dt));
        }

        self.wander.since_scan += dt;
        if self.wander.since_scan >= config.rescan_interval.as_secs_f32() {
            self.wander.since_scan = 0.0;
            let sighted = field
                .nearest(self.position, config.detection_radius, |enemy| {
                    !self.visited.contains(&enemy.entity)
                })
                .map(|enemy| enemy.entity);
            self.wander.sighting = match (sighted, self.wander.sighting) {
                (Some(entity), Some((held_entity, held))) if entity == held_entity => {
                    Some((entity, held))
                }
                (Some(entity), _) => Some((entity, 0.0)),
                (None, _) => None,
            };
        }

        let Some((entity, held)) = self.wander.sighting else {
            return false;
        };
        if held < config.confirmation_delay.as_secs_f32() {
            return false;
        }

        trace!(target = ?entity, "wandering missile reacquired a target");
        self.target = Some(entity);
        self.state = MissileState::Seeking;
        self.current_speed = config.launch_speed;
        self.wander = Wander::default();
        true
    }

    fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    fn heading(&self) -> Vec2 {
        self.velocity.normalize_or(Vec2::X)
    }

    /// Back to a blank pool slot.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.state != MissileState::Inactive
    }

    pub fn state(&self) -> MissileState {
        self.state
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn bounce_left(&self) -> i32 {
        self.bounce_left
    }

    pub fn has_visited(&self, enemy: Entity) -> bool {
        self.visited.contains(&enemy)
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }
}

/// Point on a lemniscate of Bernoulli with half-width `scale` at parameter `t`.
pub fn lemniscate(scale: f32, t: f32) -> Vec2 {
    let (sin, cos) = t.sin_cos();
    let denominator = 1.0 + sin * sin;
    Vec2::new(scale * cos / denominator, scale * cos * sin / denominator)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

fn rotate_towards(current: f32, desired: f32, max_step: f32) -> f32 {
    current + wrap_angle(desired - current).clamp(-max_step, max_step)
}
