use {
    crate::{ModifierOp, PlayerStats, StatKey},
    bevy::prelude::*,
    std::collections::HashMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Modifier {
    pub op: ModifierOp,
    pub value: f32,
}

/// Keyed modifiers layered over a base snapshot of [`PlayerStats`].
///
/// Derived value = `max(1, (base + Σ add) × Π multiply)`. Adds are always
/// summed before any multiplier applies, whatever order they were inserted in.
#[derive(Resource, Reflect, Default, Debug)]
#[reflect(Resource)]
pub struct StatModifiers {
    base: HashMap<StatKey, f32>,
    modifiers: HashMap<StatKey, HashMap<String, Modifier>>,
}

impl StatModifiers {
    pub fn capture(stats: &PlayerStats) -> Self {
        let mut engine = Self::default();
        engine.recapture(stats);
        engine
    }

    /// Replaces the base snapshot and drops every modifier.
    pub fn recapture(&mut self, stats: &PlayerStats) {
        self.modifiers.clear();
        self.base = StatKey::ALL
            .into_iter()
            .map(|key| (key, stats.get(key)))
            .collect();
    }

    pub fn base(&self, key: StatKey) -> Option<f32> {
        self.base.get(&key).copied()
    }

    /// Inserts or overwrites modifier `id` on `key`, recomputes it and writes
    /// the result into `stats`. Returns `None` when `key` has no base value.
    pub fn add_modifier(
        &mut self,
        stats: &mut PlayerStats,
        key: StatKey,
        id: impl Into<String>,
        op: ModifierOp,
        value: f32,
    ) -> Option<f32> {
        if !self.base.contains_key(&key) {
            return None;
        }
        self.modifiers
            .entry(key)
            .or_default()
            .insert(id.into(), Modifier { op, value });
        self.publish(stats, key)
    }

    /// Removes modifier `id` from `key` and republishes the stat. Removing an
    /// id that was never added leaves the value unchanged.
    pub fn remove_modifier(&mut self, stats: &mut PlayerStats, key: StatKey, id: &str) -> Option<f32> {
        if let Some(table) = self.modifiers.get_mut(&key) {
            table.remove(id);
            if table.is_empty() {
                self.modifiers.remove(&key);
            }
        }
        self.publish(stats, key)
    }

    pub fn derive(&self, key: StatKey) -> Option<f32> {
        let base = self.base(key)?;
        let Some(table) = self.modifiers.get(&key) else {
            return Some(base.max(1.0));
        };

        let added: f32 = table
            .values()
            .filter(|modifier| modifier.op == ModifierOp::Add)
            .map(|modifier| modifier.value)
            .sum();
        let multiplier: f32 = table
            .values()
            .filter(|modifier| modifier.op == ModifierOp::Multiply)
            .map(|modifier| modifier.value)
            .product();

        Some(((base + added) * multiplier).max(1.0))
    }

    fn publish(&self, stats: &mut PlayerStats, key: StatKey) -> Option<f32> {
        let value = self.derive(key)?;
        stats.set(key, value);
        Some(value)
    }

    pub fn has_modifier(&self, key: StatKey, id: &str) -> bool {
        self.modifiers
            .get(&key)
            .is_some_and(|table| table.contains_key(id))
    }

    pub fn modifier_count(&self, key: StatKey) -> usize {
        self.modifiers.get(&key).map_or(0, HashMap::len)
    }

    pub fn modifier_ids(&self, key: StatKey) -> impl Iterator<Item = &str> {
        self.modifiers
            .get(&key)
            .into_iter()
            .flat_map(|table| table.keys().map(String::as_str))
    }
}
