use {
    crate::{Enemy, EnemyKind, Health},
    bevy::prelude::*,
};

/// Every system that targets enemies reads them through this query.
pub type EnemyQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Transform,
        &'static Health,
        &'static EnemyKind,
    ),
    With<Enemy>,
>;

/// Read-only view of one enemy taken at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub health: f32,
    pub kind: EnemyKind,
}

impl EnemySnapshot {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Per-tick snapshot of the enemy collection.
///
/// Queries always return new lists; damage dealt through [`EnemyField::damage`]
/// only lowers the snapshot's health so later readers in the same tick see the
/// kill, while the real despawn happens through the damage observer.
#[derive(Debug, Clone, Default)]
pub struct EnemyField {
    enemies: Vec<EnemySnapshot>,
}

impl FromIterator<EnemySnapshot> for EnemyField {
    fn from_iter<I: IntoIterator<Item = EnemySnapshot>>(iter: I) -> Self {
        Self {
            enemies: iter.into_iter().collect(),
        }
    }
}

impl EnemyField {
    pub fn from_query(enemies: &EnemyQuery) -> Self {
        enemies
            .iter()
            .map(|(entity, transform, health, kind)| EnemySnapshot {
                entity,
                position: transform.translation.truncate(),
                health: health.current,
                kind: *kind,
            })
            .collect()
    }

    pub fn live(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    /// The enemy if it is still alive.
    pub fn get(&self, entity: Entity) -> Option<&EnemySnapshot> {
        self.live().find(|enemy| enemy.entity == entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn within_radius(&self, center: Vec2, radius: f32) -> Vec<EnemySnapshot> {
        self.live()
            .filter(|enemy| enemy.position.distance(center) <= radius)
            .copied()
            .collect()
    }

    /// Nearest live enemy within `radius` of `center` accepted by `filter`.
    pub fn nearest(
        &self,
        center: Vec2,
        radius: f32,
        filter: impl Fn(&EnemySnapshot) -> bool,
    ) -> Option<EnemySnapshot> {
        self.live()
            .filter(|enemy| filter(enemy))
            .map(|enemy| (enemy, enemy.position.distance(center)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(enemy, _)| *enemy)
    }

    /// Lowers the snapshot's health. Returns `true` if this hit killed it.
    pub fn damage(&mut self, entity: Entity, amount: f32) -> bool {
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.entity == entity && enemy.is_alive())
        else {
            return false;
        };
        enemy.health -= amount;
        !enemy.is_alive()
    }

    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live().next().is_none()
    }
}
