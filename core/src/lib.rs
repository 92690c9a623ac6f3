use {
    bevy::prelude::*,
    chain_lightning::ChainLightningPlugin,
    enemies::EnemiesPlugin,
    missiles::MissilesPlugin,
    pickups::PickupsPlugin,
    player_components::Player,
    shockwave::ShockwavePlugin,
    skills::SkillsPlugin,
    stat_modifiers::StatModifiersPlugin,
    states::SimulationPhasePlugin,
    system_schedule::SchedulePlugin,
};

mod systems;


pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SchedulePlugin,
            SimulationPhasePlugin,
            StatModifiersPlugin,
            EnemiesPlugin,
            PickupsPlugin,
            ShockwavePlugin,
            ChainLightningPlugin,
            MissilesPlugin,
            SkillsPlugin,
        ))
        .register_type::<Player>()
        .add_systems(Startup, (setup_camera, systems::spawn_player))
        .add_observer(systems::reset_progress)
        .add_observer(systems::reset_world);
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
