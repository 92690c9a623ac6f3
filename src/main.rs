use {
    arc_core::CorePlugin,
    bevy::{log::LogPlugin, prelude::*},
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins.set(LogPlugin {
                filter: "error,arc_core=info,\
                    skills=debug,\
                    skills_assets=info,\
                    stat_modifiers=debug,\
                    missiles=info,\
                    chain_lightning=debug,\
                    shockwave=debug,\
                    pickups=info,\
                    enemies=info"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            }),
        )
        .add_plugins(CorePlugin)
        .run();
}
