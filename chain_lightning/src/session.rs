use {
    bevy::{platform::collections::HashMap, prelude::*},
    enemy_components::{EnemyField, EnemySnapshot},
    std::time::Duration,
};

/// Shape of one chain: how far, how often and how hard it jumps.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ChainConfig {
    /// Total number of strikes, the initial one included.
    pub max_jumps: u32,
    pub max_range: f32,
    pub damage: f32,
    pub damage_decay: f32,
    pub jump_delay: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_jumps: 5,
            max_range: 200.0,
            damage: 15.0,
            damage_decay: 0.8,
            jump_delay: Duration::from_millis(150),
        }
    }
}

impl ChainConfig {
    /// Bullet-hit proc of the `electric_chain` skill at `level` stacks.
    pub fn electric_chain(level: u32) -> Self {
        Self {
            max_jumps: (level + 2).min(3),
            max_range: 150.0 + level as f32 * 25.0,
            damage: 8.0 + level as f32 * 2.0,
            damage_decay: 0.85,
            jump_delay: Duration::from_millis(120),
        }
    }

    /// Chain spawned from every enemy a lightning dash passes through.
    pub fn dash(dash_damage: f32) -> Self {
        Self {
            max_jumps: 3,
            max_range: 150.0,
            damage: dash_damage + 2.0,
            damage_decay: 0.8,
            jump_delay: Duration::from_millis(120),
        }
    }

    /// Missile-hit proc of `missile_chain_lightning` at `stacks`.
    pub fn missile_chain(stacks: u32) -> Self {
        Self {
            max_jumps: stacks.min(2),
            max_range: 150.0,
            damage: 20.0,
            damage_decay: 0.9,
            jump_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct ChainSession {
    pub id: u32,
    /// Every enemy struck or about to be struck, in order.
    pub targets: Vec<Entity>,
    pub current_jump: u32,
    pub current_damage: f32,
    pub config: ChainConfig,
    /// Where the bolt leaves from on the next strike.
    pub origin: Vec2,
    /// Simulation time spent running, frozen while the world is paused.
    pub age: Duration,
}

/// One strike that just happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStrike {
    pub target: Entity,
    pub from: Vec2,
    pub position: Vec2,
    pub damage: f32,
    /// Delay before the next strike, `None` if the chain ended with this one.
    pub next_in: Option<Duration>,
}

/// Why a chain request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRefused {
    TooManyChains,
    TargetAlreadyChaining,
    TargetDead,
}

/// Every running chain and the enemies they hold.
///
/// An enemy belongs to at most one running chain; it can be picked again only
/// after that chain ends.
#[derive(Resource, Reflect, Default, Debug)]
#[reflect(Resource)]
pub struct ChainLightning {
    sessions: HashMap<u32, ChainSession>,
    claimed: HashMap<Entity, u32>,
    next_id: u32,
}

/// Higher is better: closer, tougher, nearly dead.
pub fn target_score(enemy: &EnemySnapshot, distance: f32, max_range: f32) -> f32 {
    let proximity = (max_range - distance) / max_range * 50.0;
    let finish_bonus = (10.0 - enemy.health).max(0.0) * 2.0;
    proximity + enemy.kind.chain_priority() + finish_bonus
}

impl ChainLightning {
    pub fn start(
        &mut self,
        initial: Entity,
        origin: Vec2,
        config: ChainConfig,
        field: &EnemyField,
        max_concurrent: usize,
    ) -> Result<u32, ChainRefused> {
        if self.sessions.len() >= max_concurrent {
            return Err(ChainRefused::TooManyChains);
        }
        if self.claimed.contains_key(&initial) {
            return Err(ChainRefused::TargetAlreadyChaining);
        }
        if !field.is_alive(initial) {
            return Err(ChainRefused::TargetDead);
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.claimed.insert(initial, id);
        self.sessions.insert(
            id,
            ChainSession {
                id,
                targets: vec![initial],
                current_jump: 0,
                current_damage: config.damage,
                config,
                origin,
                age: Duration::ZERO,
            },
        );
        Ok(id)
    }

    /// Best next target around `from`, skipping this chain's targets and any
    /// enemy held by another chain.
    pub fn find_next_target(
        &self,
        session: &ChainSession,
        from: Vec2,
        field: &EnemyField,
    ) -> Option<EnemySnapshot> {
        let max_range = session.config.max_range;
        field
            .live()
            .filter(|enemy| !session.targets.contains(&enemy.entity))
            .filter(|enemy| !self.claimed.contains_key(&enemy.entity))
            .map(|enemy| (enemy, enemy.position.distance(from)))
            .filter(|(_, distance)| *distance <= max_range)
            .map(|(enemy, distance)| (enemy, target_score(enemy, distance, max_range)))
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(enemy, _)| *enemy)
    }

    /// Strikes the session's current target and lines up the next one.
    ///
    /// Damage is recorded in `field` so later reads this frame see the kill.
    /// Returns `None` and ends the session if the target is gone.
    pub fn strike(&mut self, id: u32, field: &mut EnemyField) -> Option<ChainStrike> {
        let session = self.sessions.get(&id)?;
        let Some(target) = session
            .targets
            .last()
            .and_then(|entity| field.get(*entity))
            .copied()
        else {
            self.end(id);
            return None;
        };

        let damage = session.current_damage;
        let from = session.origin;
        field.damage(target.entity, damage);

        let next = self.find_next_target(session, target.position, field);
        let session = self.sessions.get_mut(&id)?;
        let can_continue = session.current_jump + 1 < session.config.max_jumps;

        let next_in = match next {
            Some(next) if can_continue => {
                session.targets.push(next.entity);
                session.current_jump += 1;
                session.current_damage *= session.config.damage_decay;
                session.origin = target.position;
                self.claimed.insert(next.entity, id);
                Some(session.config.jump_delay)
            }
            _ => {
                self.end(id);
                None
            }
        };

        Some(ChainStrike {
            target: target.entity,
            from,
            position: target.position,
            damage,
            next_in,
        })
    }

    /// Drops a session and releases every enemy it claimed.
    pub fn end(&mut self, id: u32) -> bool {
        let Some(session) = self.sessions.remove(&id) else {
            return false;
        };
        for target in session.targets {
            if self.claimed.get(&target) == Some(&id) {
                self.claimed.remove(&target);
            }
        }
        true
    }

    /// Ages every session by `delta` and ends those older than `timeout`.
    /// Returns the ended ids.
    pub fn expire(&mut self, delta: Duration, timeout: Duration) -> Vec<u32> {
        let mut stale = Vec::new();
        for session in self.sessions.values_mut() {
            session.age += delta;
            if session.age > timeout {
                stale.push(session.id);
            }
        }
        for id in &stale {
            self.end(*id);
        }
        stale
    }

    pub fn session(&self, id: u32) -> Option<&ChainSession> {
        self.sessions.get(&id)
    }

    pub fn is_claimed(&self, entity: Entity) -> bool {
        self.claimed.contains_key(&entity)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.claimed.clear();
    }
}
