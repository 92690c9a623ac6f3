use {
    bevy::prelude::*,
    stat_resources::{ModifierOp, StatKey},
};

/// Inserts or overwrites a keyed modifier on one stat.
#[derive(Event, Debug, Clone)]
pub struct AddStatModifier {
    pub stat: StatKey,
    pub id: String,
    pub op: ModifierOp,
    pub value: f32,
}

#[derive(Event, Debug, Clone)]
pub struct RemoveStatModifier {
    pub stat: StatKey,
    pub id: String,
}

/// Emitted after a stat's derived value was recomputed and published.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StatChanged {
    pub stat: StatKey,
    pub value: f32,
}
