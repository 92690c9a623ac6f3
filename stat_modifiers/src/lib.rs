use {
    bevy::prelude::*,
    player_components::{Player, PlayerBody},
    stat_events::*,
    stat_resources::{PlayerStats, StatKey, StatModifiers},
};

pub struct StatModifiersPlugin;

impl Plugin for StatModifiersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerStats>()
            .register_type::<PlayerStats>()
            .register_type::<StatModifiers>()
            .add_systems(PreStartup, capture_base_stats)
            .add_observer(on_add_stat_modifier)
            .add_observer(on_remove_stat_modifier)
            .add_observer(sync_player_body);
    }
}

/// Snapshots the starting stats. Base values are never written again until a
/// run restart recaptures them.
pub fn capture_base_stats(mut commands: Commands, stats: Res<PlayerStats>) {
    debug!("capturing base player stats");
    commands.insert_resource(StatModifiers::capture(&stats));
}

fn on_add_stat_modifier(
    trigger: On<AddStatModifier>,
    mut commands: Commands,
    mut engine: ResMut<StatModifiers>,
    mut stats: ResMut<PlayerStats>,
) {
    let event = trigger.event();
    let Some(value) =
        engine.add_modifier(&mut stats, event.stat, event.id.clone(), event.op, event.value)
    else {
        warn!(stat = %event.stat, id = %event.id, "no base value for stat, modifier ignored");
        return;
    };

    debug!(
        stat = %event.stat,
        id = %event.id,
        op = ?event.op,
        value = event.value,
        derived = value,
        "added stat modifier"
    );
    commands.trigger(StatChanged {
        stat: event.stat,
        value,
    });
}

fn on_remove_stat_modifier(
    trigger: On<RemoveStatModifier>,
    mut commands: Commands,
    mut engine: ResMut<StatModifiers>,
    mut stats: ResMut<PlayerStats>,
) {
    let event = trigger.event();
    let Some(value) = engine.remove_modifier(&mut stats, event.stat, &event.id) else {
        return;
    };

    debug!(stat = %event.stat, id = %event.id, derived = value, "removed stat modifier");
    commands.trigger(StatChanged {
        stat: event.stat,
        value,
    });
}

/// Pushes movement stats into the physics body.
fn sync_player_body(trigger: On<StatChanged>, mut bodies: Query<&mut PlayerBody, With<Player>>) {
    let event = trigger.event();
    if !event.stat.is_physics_bound() {
        return;
    }

    for mut body in bodies.iter_mut() {
        match event.stat {
            StatKey::PlayerSpeed => body.max_velocity = event.value,
            StatKey::PlayerDrag => body.drag = event.value,
            _ => {}
        }
    }
}
