use {
    crate::{ExpireReason, GuidedMissile, MissileConfig, MissileContact, MissileStep},
    bevy::prelude::*,
    enemy_components::EnemyField,
    rand::Rng,
};

/// Something the simulation has to act on after a pool tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissileEvent {
    Hit {
        slot: usize,
        target: Entity,
        position: Vec2,
        damage: f32,
    },
    Grazed {
        slot: usize,
        position: Vec2,
    },
    Expired {
        slot: usize,
        position: Vec2,
        reason: ExpireReason,
    },
}

/// Fixed arena of missile slots with a free list. Launching takes a free slot,
/// expiry hands it back; no missile is allocated during a run.
#[derive(Resource, Debug)]
pub struct MissilePool {
    slots: Vec<GuidedMissile>,
    free: Vec<usize>,
    max_active: usize,
}

impl MissilePool {
    pub fn new(capacity: usize, max_active: usize) -> Self {
        Self {
            slots: vec![GuidedMissile::default(); capacity],
            // Popped from the back, so slot 0 is handed out first.
            free: (0..capacity).rev().collect(),
            max_active: max_active.min(capacity),
        }
    }

    /// Launches a missile from a free slot. `None` when the active cap is
    /// reached or the target is already dead.
    pub fn spawn(
        &mut self,
        origin: Vec2,
        target: Entity,
        bounce: u32,
        field: &EnemyField,
        config: &MissileConfig,
    ) -> Option<usize> {
        if self.active_count() >= self.max_active {
            debug!(
                active = self.active_count(),
                max = self.max_active,
                "missile pool exhausted"
            );
            return None;
        }

        let slot = self.free.pop()?;
        if self.slots[slot].launch(origin, target, bounce, field, config) {
            Some(slot)
        } else {
            debug!(?target, "missile launch refused, target is gone");
            self.free.push(slot);
            None
        }
    }

    /// Returns `slot` to the free list. Releasing a free slot does nothing.
    pub fn release(&mut self, slot: usize) -> bool {
        let Some(missile) = self.slots.get_mut(slot) else {
            return false;
        };
        if !missile.is_active() {
            return false;
        }
        missile.reset();
        self.free.push(slot);
        true
    }

    pub fn release_all(&mut self) -> usize {
        (0..self.slots.len())
            .filter(|slot| self.release(*slot))
            .count()
    }

    /// Moves every active missile one tick and resolves its contacts.
    ///
    /// Hits lower health in `field` right away, so missiles later in the same
    /// tick do not chase an enemy that is already dead.
    pub fn advance(
        &mut self,
        dt: f32,
        field: &mut EnemyField,
        config: &MissileConfig,
        rng: &mut impl Rng,
    ) -> Vec<MissileEvent> {
        let mut events = Vec::new();

        for slot in 0..self.slots.len() {
            let missile = &mut self.slots[slot];
            match missile.update(dt, field, config, rng) {
                MissileStep::Idle => continue,
                MissileStep::Expired(reason) => {
                    let position = missile.position();
                    self.release(slot);
                    events.push(MissileEvent::Expired {
                        slot,
                        position,
                        reason,
                    });
                    continue;
                }
                MissileStep::Flying => {}
            }

            let touching = field.within_radius(missile.position(), config.contact_radius);
            let Some(enemy) = touching
                .iter()
                .find(|enemy| Some(enemy.entity) == missile.target())
                .or(touching.first())
                .copied()
            else {
                continue;
            };

            match missile.on_contact(&enemy, field, config, rng) {
                MissileContact::Hit => {
                    field.damage(enemy.entity, config.damage);
                    events.push(MissileEvent::Hit {
                        slot,
                        target: enemy.entity,
                        position: enemy.position,
                        damage: config.damage,
                    });
                }
                MissileContact::Grazed => events.push(MissileEvent::Grazed {
                    slot,
                    position: enemy.position,
                }),
                MissileContact::Ignored => {}
            }
        }

        events
    }

    pub fn get(&self, slot: usize) -> Option<&GuidedMissile> {
        self.slots.get(slot).filter(|missile| missile.is_active())
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &GuidedMissile)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, missile)| missile.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::MissileState,
        enemy_components::{EnemyKind, EnemySnapshot},
        rand::{SeedableRng, rngs::StdRng},
    };

    fn enemies(world: &mut World, positions: &[Vec2]) -> (EnemyField, Vec<Entity>) {
        let entities: Vec<Entity> = positions.iter().map(|_| world.spawn_empty().id()).collect();
        let field = positions
            .iter()
            .zip(&entities)
            .map(|(position, entity)| EnemySnapshot {
                entity: *entity,
                position: *position,
                health: 3.0,
                kind: EnemyKind::Drone,
            })
            .collect();
        (field, entities)
    }

    #[test]
    fn active_cap_refuses_new_launches() {
        let mut world = World::new();
        let (field, e) = enemies(&mut world, &[Vec2::new(100.0, 0.0)]);
        let config = MissileConfig::default();
        let mut pool = MissilePool::new(4, 2);

        assert_eq!(pool.spawn(Vec2::ZERO, e[0], 0, &field, &config), Some(0));
        assert_eq!(pool.spawn(Vec2::ZERO, e[0], 0, &field, &config), Some(1));
        assert_eq!(pool.spawn(Vec2::ZERO, e[0], 0, &field, &config), None);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn dead_target_keeps_the_slot_free() {
        let mut world = World::new();
        let (mut field, e) = enemies(&mut world, &[Vec2::new(100.0, 0.0)]);
        field.damage(e[0], 5.0);
        let mut pool = MissilePool::new(2, 2);

        assert_eq!(pool.spawn(Vec2::ZERO, e[0], 0, &field, &MissileConfig::default()), None);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let mut world = World::new();
        let (field, e) = enemies(&mut world, &[Vec2::new(100.0, 0.0)]);
        let config = MissileConfig::default();
        let mut pool = MissilePool::new(2, 2);
        let slot = pool
            .spawn(Vec2::ZERO, e[0], 0, &field, &config)
            .expect("slot available");

        assert!(pool.release(slot));
        assert!(!pool.release(slot));
        assert!(!pool.release(99));
        assert_eq!(pool.active_count(), 0);

        // The freed slot comes back clean.
        assert_eq!(pool.spawn(Vec2::ZERO, e[0], 1, &field, &config), Some(slot));
        let missile = pool.get(slot).expect("active");
        assert_eq!(missile.state(), MissileState::Launching);
        assert_eq!(missile.bounce_left(), 3);
        assert!(!missile.has_visited(e[0]));
    }

    #[test]
    fn wandering_missile_is_released_exactly_once() {
        let mut world = World::new();
        let (mut field, e) = enemies(&mut world, &[Vec2::new(300.0, 0.0)]);
        let config = MissileConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut pool = MissilePool::new(2, 2);
        pool.spawn(Vec2::ZERO, e[0], 0, &field, &config);
        field.damage(e[0], 5.0);

        let mut expired = 0;
        for _ in 0..400 {
            for event in pool.advance(1.0 / 60.0, &mut field, &config, &mut rng) {
                if let MissileEvent::Expired { reason, .. } = event {
                    assert_eq!(reason, ExpireReason::WanderTimeout);
                    expired += 1;
                }
            }
        }

        assert_eq!(expired, 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn hit_is_reported_and_applied_to_the_field() {
        let mut world = World::new();
        let (mut field, e) = enemies(&mut world, &[Vec2::new(120.0, 0.0), Vec2::new(250.0, 0.0)]);
        let config = MissileConfig {
            wobble_amplitude: 0.0,
            ..default()
        };
        let mut rng = StdRng::seed_from_u64(12);
        let mut pool = MissilePool::new(2, 2);
        let slot = pool
            .spawn(Vec2::ZERO, e[0], 1, &field, &config)
            .expect("slot available");

        let mut hits = Vec::new();
        for _ in 0..300 {
            for event in pool.advance(1.0 / 60.0, &mut field, &config, &mut rng) {
                if let MissileEvent::Hit { target, damage, .. } = event {
                    hits.push((target, damage));
                }
            }
            if !hits.is_empty() {
                break;
            }
        }

        assert_eq!(hits, vec![(e[0], 3.0)]);
        // Three health minus three damage.
        assert!(!field.is_alive(e[0]));
        let missile = pool.get(slot).expect("still flying");
        assert_eq!(missile.bounce_left(), 2);
        assert_eq!(missile.target(), Some(e[1]));
    }
}
